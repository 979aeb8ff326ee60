//! Contact operations: CRUD, search, tags, notes, and per-contact tasks.

use chrono::{Duration, Utc};
use serde_json::{Map, Value, json};

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

/// Fields accepted when creating a contact. At least an email or a phone is
/// required by the API.
#[derive(Debug, Default)]
pub struct NewContact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub source: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update; only present fields are sent.
#[derive(Debug, Default)]
pub struct ContactUpdate {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub source: Option<String>,
    /// `[{ id, key, field_value }]` custom field values, sent inline in the
    /// update body.
    pub custom_fields: Option<Value>,
}

pub fn list_contacts(
    client: &mut GhlClient,
    limit: u32,
    query: Option<&str>,
) -> Result<Vec<Value>> {
    let response = client.get(
        "/contacts/",
        &[
            ("limit", Some(limit.to_string())),
            ("query", query.map(str::to_string)),
        ],
        &CallOpts::default(),
    )?;
    Ok(unwrap_list(response, &["contacts"]))
}

pub fn get_contact(client: &mut GhlClient, contact_id: &str) -> Result<Value> {
    let response = client.get(&format!("/contacts/{contact_id}"), &[], &CallOpts::default())?;
    Ok(unwrap_item(response, "contact"))
}

pub fn create_contact(
    client: &mut GhlClient,
    location_id: &str,
    contact: &NewContact,
) -> Result<Value> {
    let mut body = Map::new();
    body.insert("locationId".to_string(), json!(location_id));
    insert_opt(&mut body, "email", &contact.email);
    insert_opt(&mut body, "phone", &contact.phone);
    insert_opt(&mut body, "firstName", &contact.first_name);
    insert_opt(&mut body, "lastName", &contact.last_name);
    insert_opt(&mut body, "name", &contact.name);
    insert_opt(&mut body, "companyName", &contact.company_name);
    insert_opt(&mut body, "source", &contact.source);
    if !contact.tags.is_empty() {
        body.insert("tags".to_string(), json!(contact.tags));
    }
    let response = client.post("/contacts/", Some(&Value::Object(body)), &CallOpts::default())?;
    Ok(unwrap_item(response, "contact"))
}

pub fn update_contact(
    client: &mut GhlClient,
    contact_id: &str,
    update: &ContactUpdate,
) -> Result<Value> {
    let mut body = Map::new();
    insert_opt(&mut body, "email", &update.email);
    insert_opt(&mut body, "phone", &update.phone);
    insert_opt(&mut body, "firstName", &update.first_name);
    insert_opt(&mut body, "lastName", &update.last_name);
    insert_opt(&mut body, "companyName", &update.company_name);
    insert_opt(&mut body, "source", &update.source);
    if let Some(custom_fields) = &update.custom_fields {
        body.insert("customFields".to_string(), custom_fields.clone());
    }
    let response = client.put(
        &format!("/contacts/{contact_id}"),
        Some(&Value::Object(body)),
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "contact"))
}

pub fn delete_contact(client: &mut GhlClient, contact_id: &str) -> Result<()> {
    client.delete(&format!("/contacts/{contact_id}"), &[], &CallOpts::default())?;
    Ok(())
}

pub fn search_contacts(client: &mut GhlClient, query: &str, limit: u32) -> Result<Vec<Value>> {
    let response = client.get(
        "/contacts/",
        &[
            ("query", Some(query.to_string())),
            ("limit", Some(limit.to_string())),
        ],
        &CallOpts::default(),
    )?;
    Ok(unwrap_list(response, &["contacts"]))
}

/// Filtered search via POST `/contacts/search`: tags combine as AND
/// `contains` filters, the assignee as an `eq` filter.
pub fn contacts_search(
    client: &mut GhlClient,
    location_id: &str,
    page: u32,
    page_limit: u32,
    query: Option<&str>,
    tags: &[String],
    assigned_to: Option<&str>,
) -> Result<Vec<Value>> {
    let mut filters: Vec<Value> = Vec::new();
    if let Some(assigned_to) = assigned_to {
        filters.push(json!({"field": "assignedTo", "operator": "eq", "value": assigned_to}));
    }
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() {
            filters.push(json!({"field": "tags", "operator": "contains", "value": tag}));
        }
    }

    let mut body = Map::new();
    body.insert("locationId".to_string(), json!(location_id));
    body.insert("page".to_string(), json!(page));
    body.insert("pageLimit".to_string(), json!(page_limit));
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        body.insert("query".to_string(), json!(query));
    }
    if !filters.is_empty() {
        body.insert(
            "filters".to_string(),
            json!([{"group": "AND", "filters": filters}]),
        );
    }
    let response = client.post(
        "/contacts/search",
        Some(&Value::Object(body)),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_list(response, &["contacts"]))
}

/// Add tags to a contact, merging with whatever is already there.
pub fn add_tag(client: &mut GhlClient, contact_id: &str, tags: &[String]) -> Result<()> {
    let contact = get_contact(client, contact_id)?;
    let mut merged = existing_tags(&contact);
    for tag in tags {
        if !merged.iter().any(|existing| existing == tag) {
            merged.push(tag.clone());
        }
    }
    client.put(
        &format!("/contacts/{contact_id}"),
        Some(&json!({"tags": merged})),
        &CallOpts::default(),
    )?;
    Ok(())
}

pub fn remove_tag(client: &mut GhlClient, contact_id: &str, tags: &[String]) -> Result<()> {
    let contact = get_contact(client, contact_id)?;
    let remaining: Vec<String> = existing_tags(&contact)
        .into_iter()
        .filter(|existing| !tags.contains(existing))
        .collect();
    client.put(
        &format!("/contacts/{contact_id}"),
        Some(&json!({"tags": remaining})),
        &CallOpts::default(),
    )?;
    Ok(())
}

fn existing_tags(contact: &Value) -> Vec<String> {
    contact
        .get("tags")
        .and_then(|tags| tags.as_array())
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| tag.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn list_notes(client: &mut GhlClient, contact_id: &str) -> Result<Vec<Value>> {
    let response = client.get(
        &format!("/contacts/{contact_id}/notes"),
        &[],
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_list(response, &["notes"]))
}

pub fn add_note(client: &mut GhlClient, contact_id: &str, body: &str) -> Result<Value> {
    let response = client.post(
        &format!("/contacts/{contact_id}/notes"),
        Some(&json!({"body": body})),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "note"))
}

/// Fields for a new per-contact task. The API requires title, dueDate
/// (ISO 8601), and completed.
#[derive(Debug, Default)]
pub struct NewTask {
    pub body: Option<String>,
    pub due_date: Option<String>,
    pub completed: bool,
    pub assigned_to: Option<String>,
}

pub fn list_tasks(client: &mut GhlClient, contact_id: &str) -> Result<Vec<Value>> {
    let response = client.get(
        &format!("/contacts/{contact_id}/tasks"),
        &[],
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_list(response, &["tasks"]))
}

pub fn create_task(
    client: &mut GhlClient,
    contact_id: &str,
    title: &str,
    task: &NewTask,
) -> Result<Value> {
    let due_date = task.due_date.clone().unwrap_or_else(default_due_date);
    let mut body = Map::new();
    body.insert("title".to_string(), json!(title));
    body.insert("dueDate".to_string(), json!(due_date));
    body.insert("completed".to_string(), json!(task.completed));
    insert_opt(&mut body, "body", &task.body);
    insert_opt(&mut body, "assignedTo", &task.assigned_to);
    let response = client.post(
        &format!("/contacts/{contact_id}/tasks"),
        Some(&Value::Object(body)),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "task"))
}

pub fn get_task(client: &mut GhlClient, contact_id: &str, task_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/contacts/{contact_id}/tasks/{task_id}"),
        &[],
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "task"))
}

pub fn update_task(
    client: &mut GhlClient,
    contact_id: &str,
    task_id: &str,
    title: Option<&str>,
    due_date: Option<&str>,
) -> Result<Value> {
    let mut body = Map::new();
    if let Some(title) = title {
        body.insert("title".to_string(), json!(title));
    }
    if let Some(due_date) = due_date {
        body.insert("dueDate".to_string(), json!(due_date));
    }
    if body.is_empty() {
        return get_task(client, contact_id, task_id);
    }
    let response = client.put(
        &format!("/contacts/{contact_id}/tasks/{task_id}"),
        Some(&Value::Object(body)),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "task"))
}

pub fn delete_task(client: &mut GhlClient, contact_id: &str, task_id: &str) -> Result<()> {
    client.delete(
        &format!("/contacts/{contact_id}/tasks/{task_id}"),
        &[],
        &CallOpts::without_location(),
    )?;
    Ok(())
}

pub fn set_task_completed(
    client: &mut GhlClient,
    contact_id: &str,
    task_id: &str,
    completed: bool,
) -> Result<Value> {
    let response = client.put(
        &format!("/contacts/{contact_id}/tasks/{task_id}/completed"),
        Some(&json!({"completed": completed})),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "task"))
}

/// Tasks need a due date; default to a week out at noon UTC.
fn default_due_date() -> String {
    (Utc::now() + Duration::days(7))
        .format("%Y-%m-%dT12:00:00Z")
        .to_string()
}

fn insert_opt(body: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        body.insert(key.to_string(), json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn existing_tags_tolerates_shapes() {
        assert_eq!(
            existing_tags(&json!({"tags": ["a", "b"]})),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(existing_tags(&json!({"tags": null})).is_empty());
        assert!(existing_tags(&json!({})).is_empty());
    }

    #[test]
    fn default_due_date_is_iso_noon() {
        let due = default_due_date();
        assert!(due.ends_with("T12:00:00Z"));
        assert_eq!(due.len(), "2024-01-01T12:00:00Z".len());
    }
}
