//! `ghl conversations …`

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output::{print_item, print_items, print_success};
use crate::services::conversations::{self, MessageKind};

const LIST_COLUMNS: [(&str, &str); 4] = [
    ("id", "ID"),
    ("contactId", "Contact"),
    ("type", "Type"),
    ("lastMessageBody", "Last Message"),
];

const MESSAGE_COLUMNS: [(&str, &str); 5] = [
    ("id", "ID"),
    ("type", "Type"),
    ("direction", "Direction"),
    ("body", "Body"),
    ("dateAdded", "Date"),
];

#[derive(Args)]
pub struct ConversationsArgs {
    #[command(subcommand)]
    pub command: ConversationsCommand,
}

#[derive(Subcommand)]
pub enum ConversationsCommand {
    /// List conversations
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long = "contact")]
        contact_id: Option<String>,
    },
    /// Get a conversation by ID
    Get { conversation_id: String },
    /// List messages in a conversation
    Messages {
        conversation_id: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Search conversations
    Search {
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Send an SMS or email to a contact
    Send {
        #[arg(long = "contact")]
        contact_id: String,
        /// sms or email
        #[arg(long = "type", value_parser = ["sms", "email"], default_value = "sms")]
        kind: String,
        #[arg(long)]
        message: String,
        /// Email subject (email only)
        #[arg(long)]
        subject: Option<String>,
    },
}

pub fn run(args: ConversationsArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let mut client = ctx.client()?;
    match args.command {
        ConversationsCommand::List { limit, contact_id } => {
            let items =
                conversations::list_conversations(&mut client, limit, contact_id.as_deref())?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        ConversationsCommand::Get { conversation_id } => {
            let conversation = conversations::get_conversation(&mut client, &conversation_id)?;
            print_item(&conversation, format);
        }
        ConversationsCommand::Messages {
            conversation_id,
            limit,
        } => {
            let messages = conversations::list_messages(&mut client, &conversation_id, limit)?;
            print_items(&messages, &MESSAGE_COLUMNS, format);
        }
        ConversationsCommand::Search { query, limit } => {
            let items = conversations::search_conversations(&mut client, &query, limit)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        ConversationsCommand::Send {
            contact_id,
            kind,
            message,
            subject,
        } => {
            let kind = match kind.as_str() {
                "email" => MessageKind::Email,
                _ => MessageKind::Sms,
            };
            let sent = conversations::send_message(
                &mut client,
                &contact_id,
                kind,
                &message,
                subject.as_deref(),
            )?;
            print_success("Message sent");
            print_item(&sent, format);
        }
    }
    Ok(())
}
