//! Location-level tag management.

use serde_json::{Value, json};

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

pub fn list_tags(client: &mut GhlClient) -> Result<Vec<Value>> {
    let response = client.get("/locations/tags", &[], &CallOpts::default())?;
    Ok(unwrap_list(response, &["tags"]))
}

pub fn get_tag(client: &mut GhlClient, tag_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/locations/tags/{tag_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "tag"))
}

pub fn create_tag(client: &mut GhlClient, name: &str) -> Result<Value> {
    let response = client.post(
        "/locations/tags",
        Some(&json!({"name": name})),
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "tag"))
}

pub fn delete_tag(client: &mut GhlClient, tag_id: &str) -> Result<()> {
    client.delete(
        &format!("/locations/tags/{tag_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(())
}
