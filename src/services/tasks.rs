//! Location-level task search (POST /locations/:locationId/tasks/search).

use serde_json::{Map, Value, json};

use super::unwrap_list;
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

/// Filters for the location-level task search. `status` is one of
/// `pending` / `completed` / `None` for all.
#[derive(Debug, Default)]
pub struct TaskSearch {
    pub assignee_id: Option<String>,
    pub status: Option<String>,
    pub query: Option<String>,
    pub contact_ids: Vec<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

pub fn search_tasks(
    client: &mut GhlClient,
    location_id: &str,
    search: &TaskSearch,
) -> Result<Vec<Value>> {
    let mut body = Map::new();
    if let Some(assignee) = &search.assignee_id {
        body.insert("assignedTo".to_string(), json!([assignee]));
    }
    match search.status.as_deref() {
        Some("pending") => {
            body.insert("completed".to_string(), json!(false));
        }
        Some("completed") => {
            body.insert("completed".to_string(), json!(true));
        }
        _ => {}
    }
    if let Some(query) = search.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        body.insert("query".to_string(), json!(query));
    }
    if !search.contact_ids.is_empty() {
        body.insert("contactId".to_string(), json!(search.contact_ids));
    }
    if let Some(limit) = search.limit {
        body.insert("limit".to_string(), json!(limit));
    }
    if let Some(skip) = search.skip {
        body.insert("skip".to_string(), json!(skip));
    }
    let response = client.post(
        &format!("/locations/{location_id}/tasks/search"),
        Some(&Value::Object(body)),
        &CallOpts::without_location(),
    )?;
    let raw = unwrap_list(response, &["tasks", "task"]);
    Ok(raw.into_iter().map(normalize_task).collect())
}

/// The search endpoint returns `_id`, `contactDetails`, and
/// `assignedToUserDetails`; flatten those into the shape the rest of the
/// tool expects (`id`, `contactName`, `assigneeName`).
fn normalize_task(mut task: Value) -> Value {
    let Some(map) = task.as_object_mut() else {
        return task;
    };
    if !map.contains_key("id") {
        if let Some(id) = map.get("_id").cloned() {
            map.insert("id".to_string(), id);
        }
    }
    if let Some(name) = detail_name(map.get("contactDetails")) {
        map.insert("contactName".to_string(), json!(name));
    }
    if let Some(details) = map.get("assignedToUserDetails") {
        if let Some(name) = detail_name(Some(details)) {
            map.insert("assigneeName".to_string(), json!(name));
        } else if let Some(id) = details.get("id").and_then(Value::as_str) {
            map.insert("assigneeName".to_string(), json!(id));
        }
    }
    task
}

fn detail_name(details: Option<&Value>) -> Option<String> {
    let details = details?.as_object()?;
    let part = |key: &str| {
        details
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string()
    };
    let name = format!("{} {}", part("firstName"), part("lastName"))
        .trim()
        .to_string();
    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_task_fills_id_and_names() {
        let task = normalize_task(json!({
            "_id": "t-1",
            "title": "Call back",
            "contactDetails": {"firstName": "Ada", "lastName": "Lovelace"},
            "assignedToUserDetails": {"firstName": "Grace", "lastName": ""},
        }));
        assert_eq!(task["id"], "t-1");
        assert_eq!(task["contactName"], "Ada Lovelace");
        assert_eq!(task["assigneeName"], "Grace");
    }

    #[test]
    fn normalize_task_keeps_existing_id_and_skips_empty_details() {
        let task = normalize_task(json!({
            "id": "keep",
            "_id": "ignore",
            "contactDetails": {},
            "assignedToUserDetails": {"id": "u-9"},
        }));
        assert_eq!(task["id"], "keep");
        assert!(task.get("contactName").is_none());
        assert_eq!(task["assigneeName"], "u-9");
    }

    #[test]
    fn normalize_task_passes_non_objects_through() {
        assert_eq!(normalize_task(json!("oops")), json!("oops"));
    }
}
