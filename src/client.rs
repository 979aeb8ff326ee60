pub use reqwest::Method;

use reqwest::blocking::multipart;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::error::{GhlError, Result};

pub const BASE_URL: &str = "https://services.leadconnectorhq.com";
const BASE_URL_OVERRIDE_ENV: &str = "GHL_BASE_URL_OVERRIDE";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: usize = 3;

/// Presence of any of these headers marks a response as carrying rate-limit
/// data. Some endpoints (customFields, customValues) omit them entirely;
/// overwriting tracked state with defaults in that case would corrupt it.
const RATE_LIMIT_PROBE_HEADERS: [&str; 3] = [
    "x-ratelimit-remaining",
    "x-ratelimit-max",
    "x-ratelimit-limit",
];

/// Quota floor below which every call inserts a short delay, so bursty
/// sequential calls do not exhaust the window.
const LOW_WATER_MARK: u32 = 5;
const LOW_WATER_DELAY: Duration = Duration::from_millis(500);

/// Extra wait added on top of the computed 429 backoff.
const RETRY_BUFFER_SECS: f64 = 0.1;

const RATE_LIMITED_MESSAGE: &str = "Rate limited. Please wait and try again.";

/// Rate-limit window state parsed from response headers. Ephemeral; derived
/// fresh from each response that carries the headers, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset: Option<f64>,
    pub interval_ms: u64,
}

impl Default for RateLimitInfo {
    fn default() -> Self {
        Self {
            limit: 100,
            remaining: 100,
            reset: None,
            interval_ms: 10_000,
        }
    }
}

impl RateLimitInfo {
    pub fn has_rate_limit_headers(headers: &HeaderMap) -> bool {
        RATE_LIMIT_PROBE_HEADERS
            .iter()
            .any(|name| headers.contains_key(*name))
    }

    /// Parse the GoHighLevel rate-limit headers (X-RateLimit-Max,
    /// X-RateLimit-Remaining, X-RateLimit-Interval-Milliseconds), defaulting
    /// each missing value.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let defaults = Self::default();
        let limit = header_number(headers, "x-ratelimit-max")
            .or_else(|| header_number(headers, "x-ratelimit-limit"))
            .unwrap_or(defaults.limit);
        let remaining =
            header_number(headers, "x-ratelimit-remaining").unwrap_or(defaults.remaining);
        let interval_ms = header_number(headers, "x-ratelimit-interval-milliseconds")
            .or_else(|| header_number(headers, "x-ratelimit-interval-ms"))
            .unwrap_or(defaults.interval_ms);
        let reset = header_number::<f64>(headers, "x-ratelimit-reset").filter(|t| *t > 0.0);
        Self {
            limit,
            remaining,
            reset,
            interval_ms,
        }
    }

    /// How long to wait before retrying a 429: the full window interval, or
    /// until the advertised reset time if that is later, plus a small buffer.
    fn retry_wait(&self) -> Duration {
        let mut wait = self.interval_ms as f64 / 1000.0;
        if let Some(reset) = self.reset {
            wait = wait.max(reset - epoch_secs());
        }
        Duration::from_secs_f64(wait + RETRY_BUFFER_SECS)
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Query-parameter key used when injecting the location. Endpoints are split
/// between the two spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationParam {
    #[default]
    LocationId,
    LocationIdSnake,
}

impl LocationParam {
    fn key(self) -> &'static str {
        match self {
            LocationParam::LocationId => "locationId",
            LocationParam::LocationIdSnake => "location_id",
        }
    }
}

/// Per-call knobs for [`GhlClient::request`].
#[derive(Debug, Clone)]
pub struct CallOpts {
    /// Add the client's location to the query string (off for nested routes
    /// that carry it in the path).
    pub include_location_id: bool,
    pub location_param: LocationParam,
    pub max_retries: usize,
}

impl Default for CallOpts {
    fn default() -> Self {
        Self {
            include_location_id: true,
            location_param: LocationParam::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl CallOpts {
    pub fn without_location() -> Self {
        Self {
            include_location_id: false,
            ..Self::default()
        }
    }

    pub fn snake_location() -> Self {
        Self {
            location_param: LocationParam::LocationIdSnake,
            ..Self::default()
        }
    }
}

/// Query parameters with optional values; `None` entries are dropped before
/// the request is issued.
pub type Query<'a> = [(&'a str, Option<String>)];

/// A file to send as one part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Blocking HTTP client for the GoHighLevel API.
///
/// Injects auth/version headers and the location parameter, tracks the
/// server's rate-limit window from response headers, sleeps and retries on
/// 429, and normalizes response shapes. All waiting happens inline on the
/// calling thread; rate-limit state is per instance, not shared (each client
/// tracks only what it has personally observed).
///
/// The underlying connection pool is created lazily on first use and
/// released by [`GhlClient::close`] or when the client is dropped, on every
/// exit path.
pub struct GhlClient {
    token: String,
    location_id: Option<String>,
    api_version: String,
    http: Option<reqwest::blocking::Client>,
    rate_limit_info: Option<RateLimitInfo>,
}

impl GhlClient {
    pub fn new(token: String, location_id: Option<String>, api_version: String) -> Self {
        Self {
            token,
            location_id,
            api_version,
            http: None,
            rate_limit_info: None,
        }
    }

    /// Latest rate-limit info observed by this instance (for display).
    pub fn rate_limit_info(&self) -> Option<&RateLimitInfo> {
        self.rate_limit_info.as_ref()
    }

    pub fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }

    /// Release the underlying connection pool. Subsequent calls recreate it.
    pub fn close(&mut self) {
        self.http = None;
    }

    fn http(&mut self) -> Result<&reqwest::blocking::Client> {
        let client = match self.http.take() {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::new();
                let bearer = format!("Bearer {}", self.token);
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&bearer)
                        .map_err(|_| GhlError::Auth("API token is not a valid header value".to_string()))?,
                );
                headers.insert(
                    "Version",
                    HeaderValue::from_str(&self.api_version).map_err(|_| {
                        GhlError::Auth("API version is not a valid header value".to_string())
                    })?,
                );
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
                reqwest::blocking::Client::builder()
                    .timeout(DEFAULT_TIMEOUT)
                    .default_headers(headers)
                    .build()?
            }
        };
        Ok(self.http.insert(client))
    }

    /// Issue a request against `base_url` + `path`, retrying 429s.
    ///
    /// The loop's only exits are returns: it either hands back a parsed body,
    /// raises the typed error for the final 429, or propagates an API or
    /// transport error, so retry exhaustion has no fall-through state.
    pub fn request(
        &mut self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
        files: &[UploadFile],
        opts: &CallOpts,
    ) -> Result<Value> {
        let mut params: Vec<(String, String)> = query
            .iter()
            .filter_map(|(key, value)| value.clone().map(|value| (key.to_string(), value)))
            .collect();
        if opts.include_location_id {
            if let Some(location) = &self.location_id {
                let key = opts.location_param.key();
                if !params.iter().any(|(existing, _)| existing == key) {
                    params.push((key.to_string(), location.clone()));
                }
            }
        }
        let url = format!("{}{}", self.base_url(), path);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut builder = self.http()?.request(method.clone(), &url).query(&params);
            if files.is_empty() {
                if let Some(body) = body {
                    builder = builder.json(body);
                }
            } else {
                // Form fields + file parts; the transport sets the multipart
                // Content-Type with its boundary.
                builder = builder.multipart(build_form(body, files));
            }
            debug!(%method, path, attempt, "request");
            let response = builder.send()?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();

            if RateLimitInfo::has_rate_limit_headers(&headers) {
                self.rate_limit_info = Some(RateLimitInfo::from_headers(&headers));
            }

            if status == 429 {
                if attempt >= opts.max_retries {
                    return Err(GhlError::RateLimited {
                        attempts: attempt,
                        message: RATE_LIMITED_MESSAGE.to_string(),
                    });
                }
                let info = self
                    .rate_limit_info
                    .clone()
                    .unwrap_or_else(|| RateLimitInfo::from_headers(&headers));
                let wait = info.retry_wait();
                debug!(?wait, attempt, "rate limited, backing off");
                thread::sleep(wait);
                continue;
            }

            if let Some(info) = &self.rate_limit_info {
                if info.remaining < LOW_WATER_MARK {
                    debug!(remaining = info.remaining, "near rate limit, slowing down");
                    thread::sleep(LOW_WATER_DELAY);
                }
            }

            return handle_response(status, response);
        }
    }

    pub fn get(&mut self, path: &str, query: &Query, opts: &CallOpts) -> Result<Value> {
        self.request(Method::GET, path, query, None, &[], opts)
    }

    pub fn post(&mut self, path: &str, body: Option<&Value>, opts: &CallOpts) -> Result<Value> {
        self.request(Method::POST, path, &[], body, &[], opts)
    }

    pub fn put(&mut self, path: &str, body: Option<&Value>, opts: &CallOpts) -> Result<Value> {
        self.request(Method::PUT, path, &[], body, &[], opts)
    }

    pub fn patch(&mut self, path: &str, body: Option<&Value>, opts: &CallOpts) -> Result<Value> {
        self.request(Method::PATCH, path, &[], body, &[], opts)
    }

    pub fn delete(&mut self, path: &str, query: &Query, opts: &CallOpts) -> Result<Value> {
        self.request(Method::DELETE, path, query, None, &[], opts)
    }

    fn base_url(&self) -> String {
        std::env::var(BASE_URL_OVERRIDE_ENV).unwrap_or_else(|_| BASE_URL.to_string())
    }
}

fn build_form(body: Option<&Value>, files: &[UploadFile]) -> multipart::Form {
    let mut form = multipart::Form::new();
    if let Some(Value::Object(fields)) = body {
        for (key, value) in fields {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            form = form.text(key.clone(), text);
        }
    }
    for file in files {
        let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        form = form.part(file.field.clone(), part);
    }
    form
}

/// Normalize a non-429 response: typed error for 4xx/5xx, empty object for
/// 204, parsed JSON otherwise with a `{"text": …}` wrapper as the fallback.
fn handle_response(status: u16, response: reqwest::blocking::Response) -> Result<Value> {
    if status >= 400 {
        let text = response.text().unwrap_or_default();
        let body: Option<Value> = serde_json::from_str(&text).ok();
        let message = error_message(status, &text, body.as_ref());
        return Err(GhlError::Api {
            status,
            message,
            body,
        });
    }
    if status == 204 {
        return Ok(Value::Object(Map::new()));
    }
    let text = response.text()?;
    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(_) => Ok(serde_json::json!({ "text": text })),
    }
}

fn error_message(status: u16, text: &str, body: Option<&Value>) -> String {
    if let Some(body) = body {
        for key in ["message", "error"] {
            if let Some(found) = body.get(key) {
                let rendered = match found {
                    Value::String(text) => text.clone(),
                    Value::Null => continue,
                    other => other.to_string(),
                };
                if !rendered.is_empty() {
                    return rendered;
                }
            }
        }
        return body.to_string();
    }
    if text.is_empty() {
        format!("HTTP {status}")
    } else {
        text.to_string()
    }
}

impl Drop for GhlClient {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(
                reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn detects_rate_limit_headers() {
        assert!(RateLimitInfo::has_rate_limit_headers(&headers(&[(
            "x-ratelimit-remaining",
            "42"
        )])));
        assert!(RateLimitInfo::has_rate_limit_headers(&headers(&[(
            "x-ratelimit-max",
            "100"
        )])));
        assert!(!RateLimitInfo::has_rate_limit_headers(&headers(&[(
            "content-type",
            "application/json"
        )])));
    }

    #[test]
    fn parses_headers_with_fallback_names() {
        let info = RateLimitInfo::from_headers(&headers(&[
            ("x-ratelimit-max", "200"),
            ("x-ratelimit-remaining", "7"),
            ("x-ratelimit-interval-milliseconds", "5000"),
        ]));
        assert_eq!(info.limit, 200);
        assert_eq!(info.remaining, 7);
        assert_eq!(info.interval_ms, 5000);
        assert!(info.reset.is_none());

        let info = RateLimitInfo::from_headers(&headers(&[
            ("x-ratelimit-limit", "50"),
            ("x-ratelimit-interval-ms", "2000"),
        ]));
        assert_eq!(info.limit, 50);
        assert_eq!(info.remaining, 100);
        assert_eq!(info.interval_ms, 2000);
    }

    #[test]
    fn parses_reset_only_when_positive() {
        let info =
            RateLimitInfo::from_headers(&headers(&[("x-ratelimit-reset", "1700000000.5")]));
        assert_eq!(info.reset, Some(1_700_000_000.5));
        let info = RateLimitInfo::from_headers(&headers(&[("x-ratelimit-reset", "0")]));
        assert!(info.reset.is_none());
        let info = RateLimitInfo::from_headers(&headers(&[("x-ratelimit-reset", "soon")]));
        assert!(info.reset.is_none());
    }

    #[test]
    fn retry_wait_covers_at_least_the_interval() {
        let info = RateLimitInfo {
            interval_ms: 2000,
            reset: None,
            ..RateLimitInfo::default()
        };
        let wait = info.retry_wait();
        assert!(wait >= Duration::from_secs_f64(2.0 + RETRY_BUFFER_SECS));

        let info = RateLimitInfo {
            interval_ms: 1000,
            reset: Some(epoch_secs() + 4.0),
            ..RateLimitInfo::default()
        };
        assert!(info.retry_wait() >= Duration::from_secs_f64(3.5));
    }

    #[test]
    fn error_message_prefers_message_then_error_field() {
        let body: Value = serde_json::json!({"message": "bad request"});
        assert_eq!(error_message(400, "raw", Some(&body)), "bad request");
        let body: Value = serde_json::json!({"error": "Unauthorized"});
        assert_eq!(error_message(401, "raw", Some(&body)), "Unauthorized");
        let body: Value = serde_json::json!({"message": ["one", "two"]});
        assert_eq!(error_message(422, "raw", Some(&body)), r#"["one","two"]"#);
        let body: Value = serde_json::json!({"statusCode": 500});
        assert_eq!(
            error_message(500, "raw", Some(&body)),
            r#"{"statusCode":500}"#
        );
        assert_eq!(error_message(502, "upstream down", None), "upstream down");
        assert_eq!(error_message(500, "", None), "HTTP 500");
    }

    #[test]
    fn location_param_keys() {
        assert_eq!(LocationParam::LocationId.key(), "locationId");
        assert_eq!(LocationParam::LocationIdSnake.key(), "location_id");
    }
}
