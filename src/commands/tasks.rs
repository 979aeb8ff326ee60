//! `ghl tasks …`: location-level task search.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output::print_items;
use crate::services::tasks::{self, TaskSearch};

const LIST_COLUMNS: [(&str, &str); 6] = [
    ("id", "ID"),
    ("title", "Title"),
    ("dueDate", "Due"),
    ("completed", "Done"),
    ("contactName", "Contact"),
    ("assigneeName", "Assignee"),
];

#[derive(Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Subcommand)]
pub enum TasksCommand {
    /// Search tasks across the location
    Search {
        #[arg(long)]
        query: Option<String>,
        /// pending or completed; omit for all
        #[arg(long, value_parser = ["pending", "completed"])]
        status: Option<String>,
        #[arg(long = "assigned-to")]
        assignee_id: Option<String>,
        /// Contact ID to filter by; repeatable
        #[arg(long = "contact")]
        contact_ids: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        skip: Option<u32>,
    },
}

pub fn run(args: TasksArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let location_id = ctx.require_location()?;
    let mut client = ctx.client()?;
    match args.command {
        TasksCommand::Search {
            query,
            status,
            assignee_id,
            contact_ids,
            limit,
            skip,
        } => {
            let items = tasks::search_tasks(
                &mut client,
                &location_id,
                &TaskSearch {
                    assignee_id,
                    status,
                    query,
                    contact_ids,
                    limit,
                    skip,
                },
            )?;
            print_items(&items, &LIST_COLUMNS, format);
        }
    }
    Ok(())
}
