//! `ghl searches …`: saved contact filter sets, runnable by id.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use super::{Ctx, confirm, print_aborted};
use crate::output::{print_items, print_success};
use crate::searches;
use crate::services::contacts;

const LIST_COLUMNS: [(&str, &str); 5] = [
    ("id", "ID"),
    ("name", "Name"),
    ("tags", "Tags"),
    ("assignedTo", "Assignee"),
    ("query", "Query"),
];

const CONTACT_COLUMNS: [(&str, &str); 6] = [
    ("id", "ID"),
    ("firstName", "First"),
    ("lastName", "Last"),
    ("email", "Email"),
    ("phone", "Phone"),
    ("tags", "Tags"),
];

#[derive(Args)]
pub struct SearchesArgs {
    #[command(subcommand)]
    pub command: SearchesCommand,
}

#[derive(Subcommand)]
pub enum SearchesCommand {
    /// List saved searches
    List,
    /// Save a search (use --id to update an existing one)
    Save {
        name: String,
        /// Tag filter; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "assigned-to")]
        assigned_to: Option<String>,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Run a saved search against the contacts API
    Run {
        search_id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long = "page-limit", default_value_t = 50)]
        page_limit: u32,
    },
    /// Delete a saved search
    Delete {
        search_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(args: SearchesArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    match args.command {
        SearchesCommand::List => {
            let items: Vec<serde_json::Value> = searches::list_saved_searches(ctx.store.paths())
                .iter()
                .map(|search| json!(search))
                .collect();
            print_items(&items, &LIST_COLUMNS, format);
        }
        SearchesCommand::Save {
            name,
            tags,
            assigned_to,
            query,
            id,
        } => {
            let record =
                searches::save_search(ctx.store.paths(), &name, tags, assigned_to, query, id)?;
            print_success(&format!("Saved search '{}' ({})", record.name, record.id));
        }
        SearchesCommand::Run {
            search_id,
            page,
            page_limit,
        } => {
            let search = searches::get_saved_search(ctx.store.paths(), &search_id)
                .ok_or_else(|| anyhow::anyhow!("No saved search with id '{search_id}'"))?;
            let location_id = ctx.require_location()?;
            let mut client = ctx.client()?;
            let items = contacts::contacts_search(
                &mut client,
                &location_id,
                page,
                page_limit,
                search.query.as_deref(),
                &search.tags,
                search.assigned_to.as_deref(),
            )?;
            print_items(&items, &CONTACT_COLUMNS, format);
        }
        SearchesCommand::Delete { search_id, yes } => {
            if !confirm("Delete this saved search?", yes)? {
                print_aborted();
                return Ok(());
            }
            if searches::delete_saved_search(ctx.store.paths(), &search_id)? {
                print_success("Saved search deleted");
            } else {
                anyhow::bail!("No saved search with id '{search_id}'");
            }
        }
    }
    Ok(())
}
