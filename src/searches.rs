use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::common::{self, Paths};
use crate::error::Result;

/// A saved contact search: a named set of filters reusable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

pub fn list_saved_searches(paths: &Paths) -> Vec<SavedSearch> {
    common::read_json_or_default(&paths.searches)
}

/// Append a saved search, replacing any existing record with the same id.
pub fn save_search(
    paths: &Paths,
    name: &str,
    tags: Vec<String>,
    assigned_to: Option<String>,
    query: Option<String>,
    id: Option<String>,
) -> Result<SavedSearch> {
    let mut searches = list_saved_searches(paths);
    if let Some(id) = id.as_deref() {
        searches.retain(|search| search.id != id);
    }
    let record = SavedSearch {
        id: id.unwrap_or_else(|| new_search_id(name)),
        name: name.trim().to_string(),
        tags,
        assigned_to,
        query: query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
    };
    searches.push(record.clone());
    write_searches(paths, &searches)?;
    Ok(record)
}

/// Remove a saved search by id. Returns whether anything was removed.
pub fn delete_saved_search(paths: &Paths, search_id: &str) -> Result<bool> {
    let mut searches = list_saved_searches(paths);
    let before = searches.len();
    searches.retain(|search| search.id != search_id);
    if searches.len() == before {
        return Ok(false);
    }
    write_searches(paths, &searches)?;
    Ok(true)
}

pub fn get_saved_search(paths: &Paths, search_id: &str) -> Option<SavedSearch> {
    list_saved_searches(paths)
        .into_iter()
        .find(|search| search.id == search_id)
}

fn write_searches(paths: &Paths, searches: &[SavedSearch]) -> Result<()> {
    let json = serde_json::to_string_pretty(searches).unwrap_or_else(|_| "[]".to_string());
    common::write_secure(&paths.searches, json.as_bytes())
}

/// FNV-1a over the name plus the current time; unique enough for a local,
/// single-user list.
fn new_search_id(name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in name.bytes().chain(nanos.to_le_bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{hash:016x}")
}
