//! Workflow listings and contact enrollment.

use serde_json::json;
use serde_json::Value;

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

pub fn list_workflows(client: &mut GhlClient) -> Result<Vec<Value>> {
    let response = client.get("/workflows/", &[], &CallOpts::default())?;
    Ok(unwrap_list(response, &["workflows"]))
}

pub fn get_workflow(client: &mut GhlClient, workflow_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/workflows/{workflow_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "workflow"))
}

/// Enroll a contact into a workflow.
pub fn enroll_contact(
    client: &mut GhlClient,
    workflow_id: &str,
    contact_id: &str,
) -> Result<Value> {
    client.post(
        &format!("/workflows/{workflow_id}/enroll"),
        Some(&json!({"contactId": contact_id})),
        &CallOpts::default(),
    )
}
