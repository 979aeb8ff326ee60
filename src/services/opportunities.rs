//! Opportunity (pipeline deal) operations.

use serde_json::{Map, Value, json};

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

/// Optional filters for [`list_opportunities`]. The search endpoint only
/// accepts a location, so these are applied client-side.
#[derive(Debug, Default)]
pub struct OpportunityFilter {
    pub pipeline_id: Option<String>,
    pub stage_id: Option<String>,
    pub status: Option<String>,
    pub contact_id: Option<String>,
    pub limit: usize,
    pub skip: usize,
}

pub fn list_opportunities(
    client: &mut GhlClient,
    filter: &OpportunityFilter,
) -> Result<Vec<Value>> {
    let location = client.location_id().map(str::to_string);
    let response = client.get(
        "/opportunities/search",
        &[("location_id", location)],
        &CallOpts::without_location(),
    )?;
    let raw = unwrap_list(response, &["opportunities"]);
    let limit = if filter.limit == 0 { 20 } else { filter.limit };
    let matched: Vec<Value> = raw
        .into_iter()
        .filter(|opp| matches_filter(opp, filter))
        .collect();
    Ok(matched
        .into_iter()
        .skip(filter.skip)
        .take(limit)
        .collect())
}

fn matches_filter(opp: &Value, filter: &OpportunityFilter) -> bool {
    if let Some(contact_id) = &filter.contact_id {
        if opp.get("contactId").and_then(Value::as_str) != Some(contact_id) {
            return false;
        }
    }
    if let Some(pipeline_id) = &filter.pipeline_id {
        if opp.get("pipelineId").and_then(Value::as_str) != Some(pipeline_id) {
            return false;
        }
    }
    if let Some(stage_id) = &filter.stage_id {
        if opp.get("pipelineStageId").and_then(Value::as_str) != Some(stage_id) {
            return false;
        }
    }
    if let Some(status) = &filter.status {
        let found = opp
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !found.eq_ignore_ascii_case(status) {
            return false;
        }
    }
    true
}

pub fn get_opportunity(client: &mut GhlClient, opportunity_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/opportunities/{opportunity_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "opportunity"))
}

#[derive(Debug)]
pub struct NewOpportunity {
    pub contact_id: String,
    pub pipeline_id: String,
    pub stage_id: String,
    pub name: String,
    pub status: String,
    pub monetary_value: Option<f64>,
    pub source: Option<String>,
}

pub fn create_opportunity(
    client: &mut GhlClient,
    location_id: &str,
    opportunity: &NewOpportunity,
) -> Result<Value> {
    let mut body = Map::new();
    body.insert("locationId".to_string(), json!(location_id));
    body.insert("contactId".to_string(), json!(opportunity.contact_id));
    body.insert("pipelineId".to_string(), json!(opportunity.pipeline_id));
    body.insert("pipelineStageId".to_string(), json!(opportunity.stage_id));
    body.insert("name".to_string(), json!(opportunity.name));
    body.insert("status".to_string(), json!(opportunity.status));
    if let Some(value) = opportunity.monetary_value {
        body.insert("monetaryValue".to_string(), json!(value));
    }
    if let Some(source) = &opportunity.source {
        body.insert("source".to_string(), json!(source));
    }
    let response = client.post(
        "/opportunities/",
        Some(&Value::Object(body)),
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "opportunity"))
}

#[derive(Debug, Default)]
pub struct OpportunityUpdate {
    pub name: Option<String>,
    pub monetary_value: Option<f64>,
    pub status: Option<String>,
    pub source: Option<String>,
}

pub fn update_opportunity(
    client: &mut GhlClient,
    opportunity_id: &str,
    update: &OpportunityUpdate,
) -> Result<Value> {
    let mut body = Map::new();
    if let Some(name) = &update.name {
        body.insert("name".to_string(), json!(name));
    }
    if let Some(value) = update.monetary_value {
        body.insert("monetaryValue".to_string(), json!(value));
    }
    if let Some(status) = &update.status {
        body.insert("status".to_string(), json!(status));
    }
    if let Some(source) = &update.source {
        body.insert("source".to_string(), json!(source));
    }
    let response = client.put(
        &format!("/opportunities/{opportunity_id}"),
        Some(&Value::Object(body)),
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "opportunity"))
}

pub fn move_opportunity(
    client: &mut GhlClient,
    opportunity_id: &str,
    stage_id: &str,
) -> Result<Value> {
    let response = client.put(
        &format!("/opportunities/{opportunity_id}"),
        Some(&json!({"pipelineStageId": stage_id})),
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "opportunity"))
}

pub fn delete_opportunity(client: &mut GhlClient, opportunity_id: &str) -> Result<()> {
    client.delete(
        &format!("/opportunities/{opportunity_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(())
}

pub fn mark_won(client: &mut GhlClient, opportunity_id: &str) -> Result<()> {
    set_status(client, opportunity_id, "won")
}

pub fn mark_lost(client: &mut GhlClient, opportunity_id: &str) -> Result<()> {
    set_status(client, opportunity_id, "lost")
}

fn set_status(client: &mut GhlClient, opportunity_id: &str, status: &str) -> Result<()> {
    client.put(
        &format!("/opportunities/{opportunity_id}/status"),
        Some(&json!({"status": status})),
        &CallOpts::default(),
    )?;
    Ok(())
}
