//! Calendars, free slots, and appointments.

use serde_json::{Map, Value, json};

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

pub fn list_calendars(client: &mut GhlClient) -> Result<Vec<Value>> {
    let response = client.get("/calendars/", &[], &CallOpts::default())?;
    Ok(unwrap_list(response, &["calendars"]))
}

pub fn get_calendar(client: &mut GhlClient, calendar_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/calendars/{calendar_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "calendar"))
}

pub fn free_slots(
    client: &mut GhlClient,
    calendar_id: &str,
    start_date: &str,
    end_date: Option<&str>,
) -> Result<Vec<Value>> {
    let response = client.get(
        &format!("/calendars/{calendar_id}/free-slots"),
        &[
            ("startDate", Some(start_date.to_string())),
            ("endDate", end_date.map(str::to_string)),
        ],
        &CallOpts::default(),
    )?;
    Ok(unwrap_list(response, &["slots"]))
}

pub fn list_appointments(
    client: &mut GhlClient,
    calendar_id: Option<&str>,
    contact_id: Option<&str>,
) -> Result<Vec<Value>> {
    let response = client.get(
        "/calendars/events/appointments",
        &[
            ("calendarId", calendar_id.map(str::to_string)),
            ("contactId", contact_id.map(str::to_string)),
        ],
        &CallOpts::default(),
    )?;
    Ok(unwrap_list(response, &["appointments", "events"]))
}

pub fn get_appointment(client: &mut GhlClient, appointment_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/calendars/events/appointments/{appointment_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "appointment"))
}

#[derive(Debug)]
pub struct NewAppointment {
    pub calendar_id: String,
    pub contact_id: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub title: Option<String>,
}

pub fn create_appointment(
    client: &mut GhlClient,
    location_id: &str,
    appointment: &NewAppointment,
) -> Result<Value> {
    let mut body = Map::new();
    body.insert("locationId".to_string(), json!(location_id));
    body.insert("calendarId".to_string(), json!(appointment.calendar_id));
    body.insert("contactId".to_string(), json!(appointment.contact_id));
    body.insert("startTime".to_string(), json!(appointment.start_time));
    if let Some(end_time) = &appointment.end_time {
        body.insert("endTime".to_string(), json!(end_time));
    }
    if let Some(title) = &appointment.title {
        body.insert("title".to_string(), json!(title));
    }
    let response = client.post(
        "/calendars/events/appointments",
        Some(&Value::Object(body)),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "appointment"))
}

pub fn update_appointment(
    client: &mut GhlClient,
    appointment_id: &str,
    title: Option<&str>,
    start_time: Option<&str>,
    end_time: Option<&str>,
) -> Result<Value> {
    let mut body = Map::new();
    if let Some(title) = title {
        body.insert("title".to_string(), json!(title));
    }
    if let Some(start_time) = start_time {
        body.insert("startTime".to_string(), json!(start_time));
    }
    if let Some(end_time) = end_time {
        body.insert("endTime".to_string(), json!(end_time));
    }
    let response = client.put(
        &format!("/calendars/events/appointments/{appointment_id}"),
        Some(&Value::Object(body)),
        &CallOpts::without_location(),
    )?;
    Ok(unwrap_item(response, "appointment"))
}

pub fn delete_appointment(client: &mut GhlClient, appointment_id: &str) -> Result<()> {
    client.delete(
        &format!("/calendars/events/appointments/{appointment_id}"),
        &[],
        &CallOpts::without_location(),
    )?;
    Ok(())
}
