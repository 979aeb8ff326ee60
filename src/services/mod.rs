//! Service layer shared by the CLI commands: one function per API
//! operation, each a single HTTP call plus response unwrapping.
//!
//! The API wraps payloads under an endpoint-specific key, or sometimes
//! returns them unwrapped; [`unwrap_item`] and [`unwrap_list`] encode that
//! fallback order once instead of probing ad hoc at every call site.

use serde_json::Value;

pub mod calendars;
pub mod contacts;
pub mod conversations;
pub mod custom_fields;
pub mod locations;
pub mod opportunities;
pub mod pipelines;
pub mod tags;
pub mod tasks;
pub mod users;
pub mod workflows;

/// Pull a single record out of `response[key]`, falling back to the whole
/// response when the key is absent.
pub(crate) fn unwrap_item(mut response: Value, key: &str) -> Value {
    match response.get_mut(key) {
        Some(found) => found.take(),
        None => response,
    }
}

/// Pull a list out of the first present key, tolerating a single unwrapped
/// record or a null. Missing keys yield an empty list.
pub(crate) fn unwrap_list(mut response: Value, keys: &[&str]) -> Vec<Value> {
    for key in keys {
        if let Some(found) = response.get_mut(*key) {
            return match found.take() {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                other => vec![other],
            };
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwrap_item_prefers_key_then_whole_body() {
        let wrapped = json!({"contact": {"id": "c-1"}});
        assert_eq!(unwrap_item(wrapped, "contact"), json!({"id": "c-1"}));
        let bare = json!({"id": "c-2"});
        assert_eq!(unwrap_item(bare.clone(), "contact"), bare);
    }

    #[test]
    fn unwrap_list_follows_fallback_order() {
        let response = json!({"tasks": [{"id": 1}]});
        assert_eq!(unwrap_list(response, &["tasks", "task"]), vec![json!({"id": 1})]);
        let response = json!({"task": {"id": 2}});
        assert_eq!(unwrap_list(response, &["tasks", "task"]), vec![json!({"id": 2})]);
        let response = json!({"tasks": null});
        assert!(unwrap_list(response, &["tasks"]).is_empty());
        let response = json!({"unrelated": true});
        assert!(unwrap_list(response, &["tasks"]).is_empty());
    }
}
