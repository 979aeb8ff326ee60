//! Location (sub-account) lookups.

use serde_json::Value;

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

/// List locations visible to this token.
pub fn list_locations(client: &mut GhlClient, limit: u32) -> Result<Vec<Value>> {
    let response = client.get(
        "/locations/search",
        &[("limit", Some(limit.to_string()))],
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_list(response, &["locations"]))
}

pub fn get_location(client: &mut GhlClient, location_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/locations/{location_id}"),
        &[],
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "location"))
}
