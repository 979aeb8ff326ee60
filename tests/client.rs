//! End-to-end client behavior against a scripted local HTTP server:
//! header injection, rate-limit tracking, 429 backoff, and response
//! normalization.

mod common;

use std::time::{Duration, Instant};

use common::{ENV_MUTEX, ScriptedServer, http_response, ok_json, set_env_guard};
use ghl_cli::{CallOpts, GhlClient, GhlError, Method, UploadFile};
use serde_json::json;

const BASE_URL_OVERRIDE_ENV: &str = "GHL_BASE_URL_OVERRIDE";

fn client_with(location: Option<&str>) -> GhlClient {
    GhlClient::new(
        "test-token".to_string(),
        location.map(str::to_string),
        "2021-07-28".to_string(),
    )
}

#[test]
fn get_sends_auth_headers_and_injects_location() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![ok_json(r#"{"contacts": [{"id": "c-1"}]}"#)]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(Some("loc-1"));
    let response = client
        .get(
            "/contacts/",
            &[("limit", Some("20".to_string())), ("query", None)],
            &CallOpts::default(),
        )
        .unwrap();
    assert_eq!(response["contacts"][0]["id"], "c-1");

    let requests = server.join();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.starts_with("GET /contacts/?"));
    assert!(request.contains("limit=20"));
    assert!(request.contains("locationId=loc-1"));
    // None-valued query entries are stripped before the call.
    assert!(!request.contains("query="));
    assert!(request.contains("authorization: Bearer test-token")
        || request.contains("Authorization: Bearer test-token"));
    assert!(request.contains("version: 2021-07-28") || request.contains("Version: 2021-07-28"));
}

#[test]
fn caller_supplied_location_key_wins() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![ok_json("{}")]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(Some("loc-default"));
    client
        .get(
            "/contacts/",
            &[("locationId", Some("loc-explicit".to_string()))],
            &CallOpts::default(),
        )
        .unwrap();

    let requests = server.join();
    assert!(requests[0].contains("locationId=loc-explicit"));
    assert!(!requests[0].contains("loc-default"));
}

#[test]
fn snake_case_location_param_variant() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![ok_json(r#"{"opportunities": []}"#)]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(Some("loc-9"));
    client
        .get("/opportunities/search", &[], &CallOpts::snake_location())
        .unwrap();

    let requests = server.join();
    assert!(requests[0].contains("location_id=loc-9"));
}

#[test]
fn no_location_injected_when_disabled_or_unknown() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![ok_json("{}"), ok_json("{}")]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(Some("loc-1"));
    client
        .get("/contacts/c-1/notes", &[], &CallOpts::without_location())
        .unwrap();
    let mut bare = client_with(None);
    bare.get("/contacts/", &[], &CallOpts::default()).unwrap();

    let requests = server.join();
    assert!(!requests[0].contains("locationId"));
    assert!(!requests[1].contains("locationId"));
}

#[test]
fn retries_429_then_succeeds() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let responses = vec![
        http_response(
            429,
            "Too Many Requests",
            &[
                ("x-ratelimit-max", "100"),
                ("x-ratelimit-remaining", "0"),
                ("x-ratelimit-interval-milliseconds", "50"),
            ],
            "",
        ),
        http_response(
            200,
            "OK",
            &[
                ("Content-Type", "application/json"),
                ("x-ratelimit-max", "100"),
                ("x-ratelimit-remaining", "99"),
                ("x-ratelimit-interval-milliseconds", "50"),
            ],
            r#"{"ok": true}"#,
        ),
    ];
    let server = ScriptedServer::spawn(responses);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    let started = Instant::now();
    let response = client.get("/ping", &[], &CallOpts::default()).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(response["ok"], true);
    // Backoff is at least interval/1000 (50 ms) plus the fixed buffer.
    assert!(elapsed >= Duration::from_millis(140), "elapsed {elapsed:?}");
    assert_eq!(server.join().len(), 2);
    assert_eq!(client.rate_limit_info().unwrap().remaining, 99);
}

#[test]
fn raises_rate_limit_error_after_final_attempt() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let rate_limited = || {
        http_response(
            429,
            "Too Many Requests",
            &[
                ("x-ratelimit-max", "100"),
                ("x-ratelimit-remaining", "0"),
                ("x-ratelimit-interval-milliseconds", "50"),
            ],
            "",
        )
    };
    let server = ScriptedServer::spawn(vec![rate_limited(), rate_limited(), rate_limited()]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    let err = client.get("/ping", &[], &CallOpts::default()).unwrap_err();
    match err {
        GhlError::RateLimited { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected RateLimited, got {other:?}"),
    }
    // Exactly max_retries attempts were made, no more.
    assert_eq!(server.join().len(), 3);
}

#[test]
fn single_429_with_one_retry_budget_fails_fast() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![http_response(429, "Too Many Requests", &[], "")]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    let opts = CallOpts {
        max_retries: 1,
        ..CallOpts::default()
    };
    let started = Instant::now();
    let err = client.get("/ping", &[], &opts).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(err.status_code(), Some(429));
    assert_eq!(server.join().len(), 1);
}

#[test]
fn non_429_errors_are_not_retried() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![http_response(
        500,
        "Internal Server Error",
        &[("Content-Type", "application/json")],
        r#"{"message": "boom", "statusCode": 500}"#,
    )]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    let err = client.get("/ping", &[], &CallOpts::default()).unwrap_err();
    match err {
        GhlError::Api {
            status,
            message,
            body,
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
            assert_eq!(body.unwrap()["statusCode"], 500);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(server.join().len(), 1);
}

#[test]
fn error_message_falls_back_to_error_field_then_raw_text() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![
        http_response(
            403,
            "Forbidden",
            &[("Content-Type", "application/json")],
            r#"{"error": "Forbidden"}"#,
        ),
        http_response(502, "Bad Gateway", &[], "upstream unavailable"),
    ]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    let err = client.get("/a", &[], &CallOpts::default()).unwrap_err();
    match err {
        GhlError::Api { status, message, .. } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Forbidden");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    let err = client.get("/b", &[], &CallOpts::default()).unwrap_err();
    match err {
        GhlError::Api {
            status,
            message,
            body,
        } => {
            assert_eq!(status, 502);
            assert_eq!(message, "upstream unavailable");
            assert!(body.is_none());
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn responses_without_rate_limit_headers_keep_tracked_state() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![
        http_response(
            200,
            "OK",
            &[
                ("Content-Type", "application/json"),
                ("x-ratelimit-max", "100"),
                ("x-ratelimit-remaining", "42"),
                ("x-ratelimit-interval-milliseconds", "10000"),
            ],
            "{}",
        ),
        ok_json("{}"),
    ]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    client.get("/first", &[], &CallOpts::default()).unwrap();
    let before = client.rate_limit_info().cloned().unwrap();
    assert_eq!(before.remaining, 42);

    client.get("/second", &[], &CallOpts::default()).unwrap();
    let after = client.rate_limit_info().cloned().unwrap();
    assert_eq!(before, after);
}

#[test]
fn low_remaining_quota_inserts_proactive_delay() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![
        http_response(
            200,
            "OK",
            &[
                ("Content-Type", "application/json"),
                ("x-ratelimit-max", "100"),
                ("x-ratelimit-remaining", "3"),
            ],
            "{}",
        ),
        ok_json("{}"),
    ]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    client.get("/first", &[], &CallOpts::default()).unwrap();
    let started = Instant::now();
    client.get("/second", &[], &CallOpts::default()).unwrap();
    // The second call still sees remaining < 5 and slows down before
    // returning.
    assert!(started.elapsed() >= Duration::from_millis(450));
}

#[test]
fn status_204_yields_empty_object() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![
        "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string(),
    ]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    let response = client
        .delete("/contacts/c-1", &[], &CallOpts::default())
        .unwrap();
    assert_eq!(response, json!({}));
}

#[test]
fn non_json_success_body_is_wrapped() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![http_response(
        200,
        "OK",
        &[("Content-Type", "text/plain")],
        "pong",
    )]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    let response = client.get("/ping", &[], &CallOpts::default()).unwrap();
    assert_eq!(response, json!({"text": "pong"}));
}

#[test]
fn files_switch_the_request_to_multipart() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![ok_json(r#"{"uploaded": true}"#)]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    let response = client
        .request(
            Method::POST,
            "/medias/upload-file",
            &[],
            Some(&json!({"name": "picture"})),
            &[UploadFile {
                field: "file".to_string(),
                file_name: "pic.png".to_string(),
                bytes: b"FILEDATA".to_vec(),
            }],
            &CallOpts::without_location(),
        )
        .unwrap();
    assert_eq!(response["uploaded"], true);

    let requests = server.join();
    let request = &requests[0];
    assert!(request.contains("multipart/form-data; boundary="));
    assert!(request.contains("name=\"file\""));
    assert!(request.contains("filename=\"pic.png\""));
    assert!(request.contains("FILEDATA"));
    assert!(request.contains("name=\"name\""));
    assert!(request.contains("picture"));
}

#[test]
fn close_releases_the_connection_and_later_calls_recreate_it() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let server = ScriptedServer::spawn(vec![ok_json("{}"), ok_json("{}")]);
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some(&server.url));

    let mut client = client_with(None);
    client.get("/one", &[], &CallOpts::default()).unwrap();
    client.close();
    client.get("/two", &[], &CallOpts::default()).unwrap();
    assert_eq!(server.join().len(), 2);
}

#[test]
fn transport_errors_propagate_without_retry() {
    let _guard = ENV_MUTEX.lock().unwrap();
    // Nothing is listening on this port.
    let _env = set_env_guard(BASE_URL_OVERRIDE_ENV, Some("http://127.0.0.1:9"));

    let mut client = client_with(None);
    let err = client.get("/ping", &[], &CallOpts::default()).unwrap_err();
    assert!(matches!(err, GhlError::Transport(_)));
    assert_eq!(err.status_code(), None);
}
