//! Conversations and outbound messages.

use serde_json::{Map, Value, json};

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

pub fn list_conversations(
    client: &mut GhlClient,
    limit: u32,
    contact_id: Option<&str>,
) -> Result<Vec<Value>> {
    let response = client.get(
        "/conversations/search",
        &[
            ("limit", Some(limit.to_string())),
            ("contactId", contact_id.map(str::to_string)),
        ],
        &CallOpts::default(),
    )?;
    Ok(unwrap_list(response, &["conversations"]))
}

pub fn get_conversation(client: &mut GhlClient, conversation_id: &str) -> Result<Value> {
    let response = client.get(
        &format!("/conversations/{conversation_id}"),
        &[],
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "conversation"))
}

pub fn list_messages(
    client: &mut GhlClient,
    conversation_id: &str,
    limit: u32,
) -> Result<Vec<Value>> {
    let response = client.get(
        &format!("/conversations/{conversation_id}/messages"),
        &[("limit", Some(limit.to_string()))],
        &CallOpts::default(),
    )?;
    Ok(unwrap_list(response, &["messages"]))
}

pub fn search_conversations(client: &mut GhlClient, query: &str, limit: u32) -> Result<Vec<Value>> {
    let response = client.get(
        "/conversations/search",
        &[
            ("q", Some(query.to_string())),
            ("limit", Some(limit.to_string())),
        ],
        &CallOpts::default(),
    )?;
    Ok(unwrap_list(response, &["conversations"]))
}

/// Outbound message channel. The API spells these `SMS` and `Email`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Sms,
    Email,
}

impl MessageKind {
    pub fn api_name(self) -> &'static str {
        match self {
            MessageKind::Sms => "SMS",
            MessageKind::Email => "Email",
        }
    }
}

pub fn send_message(
    client: &mut GhlClient,
    contact_id: &str,
    kind: MessageKind,
    message: &str,
    subject: Option<&str>,
) -> Result<Value> {
    let mut body = Map::new();
    body.insert("contactId".to_string(), json!(contact_id));
    body.insert("type".to_string(), json!(kind.api_name()));
    body.insert("message".to_string(), json!(message));
    if let Some(subject) = subject {
        body.insert("subject".to_string(), json!(subject));
    }
    let response = client.post(
        "/conversations/messages",
        Some(&Value::Object(body)),
        &CallOpts::default(),
    )?;
    Ok(unwrap_item(response, "message"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_kind_uses_api_spelling() {
        assert_eq!(MessageKind::Sms.api_name(), "SMS");
        assert_eq!(MessageKind::Email.api_name(), "Email");
    }
}
