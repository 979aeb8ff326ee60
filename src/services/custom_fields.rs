//! Custom field definitions and per-contact custom values.

use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

/// Field types with a fixed option set (dropdowns, radios, multi-selects).
/// The API reports dataType `SINGLE_OPTIONS` / `MULTI_OPTIONS`, older shapes
/// use fieldType/type.
const SELECTION_FIELD_TYPES: [&str; 14] = [
    "dropdown",
    "dropdown_single",
    "single_option",
    "single_options",
    "multi_options",
    "select",
    "radio",
    "multiselect",
    "multiple_options",
    "multiple_option",
    "single select",
    "multi select",
    "single_select",
    "multi_select",
];

/// Custom fields hidden from listings and editing ("Notes" overlaps the
/// contact-notes feature).
const HIDDEN_FIELD_KEYS: [&str; 1] = ["contact.notes"];
const HIDDEN_FIELD_NAMES: [&str; 1] = ["notes"];

/// List custom field definitions for a location, contact-scoped only.
pub fn list_custom_fields(client: &mut GhlClient, location_id: &str) -> Result<Vec<Value>> {
    let response = client.get(
        &format!("/locations/{location_id}/customFields"),
        &[],
        &CallOpts::without_location(),
    )?;
    let fields = unwrap_list(response, &["customFields", "fields"]);
    Ok(fields
        .into_iter()
        .filter(is_contact_field)
        .filter(|field| !is_hidden_field(field))
        .collect())
}

fn is_contact_field(field: &Value) -> bool {
    match field.get("entityType").or_else(|| field.get("model")) {
        Some(Value::String(entity)) => entity == "contact",
        _ => true,
    }
}

fn is_hidden_field(field: &Value) -> bool {
    let key = string_at(field, &["fieldKey", "key"]).to_lowercase();
    if !key.is_empty() && HIDDEN_FIELD_KEYS.contains(&key.as_str()) {
        return true;
    }
    let name = string_at(field, &["name", "label"]).to_lowercase();
    !name.is_empty() && HIDDEN_FIELD_NAMES.contains(&name.as_str())
}

fn string_at(value: &Value, keys: &[&str]) -> String {
    for key in keys {
        if let Some(found) = value.get(*key).and_then(Value::as_str) {
            let trimmed = found.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    String::new()
}

/// List custom values for a location, optionally narrowed to one contact.
pub fn list_custom_values(
    client: &mut GhlClient,
    location_id: &str,
    contact_id: Option<&str>,
) -> Result<Vec<Value>> {
    let response = client.get(
        &format!("/locations/{location_id}/customValues"),
        &[("contactId", contact_id.map(str::to_string))],
        &CallOpts::without_location(),
    )?;
    let values = unwrap_list(response, &["customValues", "values"]);
    // The API may ignore the filter and return every value.
    if let Some(contact_id) = contact_id {
        return Ok(values
            .into_iter()
            .filter(|value| {
                value.get("contactId").and_then(Value::as_str) == Some(contact_id)
            })
            .collect());
    }
    Ok(values)
}

pub fn create_custom_value(
    client: &mut GhlClient,
    location_id: &str,
    custom_field_id: &str,
    contact_id: &str,
    value: &str,
) -> Result<Value> {
    let response = client.post(
        &format!("/locations/{location_id}/customValues"),
        Some(&json!({
            "customFieldId": custom_field_id,
            "contactId": contact_id,
            "value": value,
        })),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "customValue"))
}

pub fn update_custom_value(
    client: &mut GhlClient,
    location_id: &str,
    custom_value_id: &str,
    value: &str,
) -> Result<Value> {
    let response = client.put(
        &format!("/locations/{location_id}/customValues/{custom_value_id}"),
        Some(&json!({"value": value})),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "customValue"))
}

/// Create or update custom values for a contact: fields with an existing
/// value record are updated, the rest created.
pub fn save_custom_values(
    client: &mut GhlClient,
    location_id: &str,
    contact_id: &str,
    values: &BTreeMap<String, String>,
    value_id_by_field: &BTreeMap<String, String>,
) -> Result<()> {
    for (field_id, value) in values {
        match value_id_by_field.get(field_id) {
            Some(value_id) => {
                update_custom_value(client, location_id, value_id, value)?;
            }
            None => {
                create_custom_value(client, location_id, field_id, contact_id, value)?;
            }
        }
    }
    Ok(())
}

/// True when this field has a fixed set of options.
pub fn field_has_options(field: &Value) -> bool {
    if !raw_options(field).is_empty() {
        return true;
    }
    let field_type = string_at(field, &["fieldType", "type", "dataType"]).to_lowercase();
    SELECTION_FIELD_TYPES.contains(&field_type.as_str())
}

/// Extract `(label, value)` options from a selection field, covering the
/// shapes the API has been seen to return: plain strings,
/// `{name|label|option, value|id}`, and nested `data`/`config` objects.
pub fn get_field_options(field: &Value) -> Vec<(String, String)> {
    raw_options(field)
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some((text.clone(), text.clone())),
            Value::Object(map) => {
                let label = first_string(map, &["name", "label", "value", "id", "option"]);
                let value = first_string(map, &["value", "id", "name", "key", "option"]);
                if label.is_empty() && value.is_empty() {
                    None
                } else if value.is_empty() {
                    Some((label.clone(), label))
                } else if label.is_empty() {
                    Some((value.clone(), value))
                } else {
                    Some((label, value))
                }
            }
            _ => None,
        })
        .collect()
}

fn raw_options(field: &Value) -> Vec<Value> {
    for key in ["picklistOptions", "options", "optionsList", "dropdownOptions"] {
        if let Some(Value::Array(options)) = field.get(key) {
            if !options.is_empty() {
                return options.clone();
            }
        }
    }
    for nested_key in ["data", "metadata", "config"] {
        if let Some(nested) = field.get(nested_key) {
            for key in ["options", "optionsList"] {
                if let Some(Value::Array(options)) = nested.get(key) {
                    if !options.is_empty() {
                        return options.clone();
                    }
                }
            }
        }
    }
    Vec::new()
}

fn first_string(map: &Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        if let Some(Value::String(text)) = map.get(*key) {
            if !text.is_empty() {
                return text.clone();
            }
        }
    }
    String::new()
}

/// Custom field values embedded in a contact record, keyed by field id.
pub fn extract_custom_values_from_contact(contact: &Value) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    for key in ["customField", "customFieldValues", "customFields"] {
        let Some(Value::Array(entries)) = contact.get(key) else {
            continue;
        };
        for entry in entries {
            let Some(fid) = entry
                .get("id")
                .or_else(|| entry.get("customFieldId"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            let value = entry.get("value").or_else(|| entry.get("values"));
            result.insert(fid.to_string(), render_value(value));
        }
    }
    if let Some(Value::Object(data)) = contact.get("customData") {
        for (key, value) in data {
            if !value.is_null() {
                result.insert(key.clone(), render_value(Some(value)));
            }
        }
    }
    result
}

/// Map customFieldId -> customValue record id, for updates.
pub fn build_custom_value_id_map(custom_values: &[Value]) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    for record in custom_values {
        let field_id = record
            .get("customFieldId")
            .and_then(Value::as_str)
            .or_else(|| {
                record
                    .get("customField")
                    .and_then(|field| field.get("id"))
                    .and_then(Value::as_str)
            });
        if let (Some(field_id), Some(id)) =
            (field_id, record.get("id").and_then(Value::as_str))
        {
            result.insert(field_id.to_string(), id.to_string());
        }
    }
    result
}

/// field id -> value, merging the customValues API with contact-embedded
/// data (API wins) and padding every defined field with an entry.
pub fn build_custom_values_map(
    contact: &Value,
    custom_values: &[Value],
    field_definitions: &[Value],
) -> BTreeMap<String, String> {
    let field_ids: BTreeSet<String> = field_definitions
        .iter()
        .filter_map(|field| {
            field
                .get("id")
                .or_else(|| field.get("customFieldId"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect();

    let mut result = BTreeMap::new();
    for record in custom_values {
        let field_id = record
            .get("customFieldId")
            .and_then(Value::as_str)
            .or_else(|| {
                record
                    .get("customField")
                    .and_then(|field| field.get("id"))
                    .and_then(Value::as_str)
            });
        if let Some(field_id) = field_id.filter(|id| field_ids.contains(*id)) {
            let value = record.get("value").or_else(|| record.get("values"));
            result.insert(field_id.to_string(), render_value(value));
        }
    }
    for (field_id, value) in extract_custom_values_from_contact(contact) {
        if field_ids.contains(&field_id) {
            result.entry(field_id).or_insert(value);
        }
    }
    for field_id in field_ids {
        result.entry(field_id).or_default();
    }
    result
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .first()
            .map(|item| render_value(Some(item)))
            .unwrap_or_default(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
