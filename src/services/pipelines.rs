//! Pipeline and stage lookups.

use serde_json::Value;

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

pub fn list_pipelines(client: &mut GhlClient) -> Result<Vec<Value>> {
    let response = client.get("/opportunities/pipelines", &[], &CallOpts::default())?;
    Ok(unwrap_list(response, &["pipelines"]))
}

/// Get a pipeline by ID; the body includes its stages.
pub fn get_pipeline(client: &mut GhlClient, pipeline_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/opportunities/pipelines/{pipeline_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "pipeline"))
}

pub fn list_stages(client: &mut GhlClient, pipeline_id: &str) -> Result<Vec<Value>> {
    let pipeline = get_pipeline(client, pipeline_id)?;
    Ok(unwrap_list(pipeline, &["stages"]))
}
