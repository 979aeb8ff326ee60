//! `ghl tags …`: location-level tags.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Ctx, confirm, print_aborted};
use crate::output::{print_item, print_items, print_success};
use crate::services::tags;

const LIST_COLUMNS: [(&str, &str); 2] = [("id", "ID"), ("name", "Name")];

#[derive(Args)]
pub struct TagsArgs {
    #[command(subcommand)]
    pub command: TagsCommand,
}

#[derive(Subcommand)]
pub enum TagsCommand {
    /// List tags for the location
    List,
    /// Get a tag by ID
    Get { tag_id: String },
    /// Create a tag
    Create { name: String },
    /// Delete a tag
    Delete {
        tag_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(args: TagsArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let mut client = ctx.client()?;
    match args.command {
        TagsCommand::List => {
            let items = tags::list_tags(&mut client)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        TagsCommand::Get { tag_id } => {
            let tag = tags::get_tag(&mut client, &tag_id)?;
            print_item(&tag, format);
        }
        TagsCommand::Create { name } => {
            let tag = tags::create_tag(&mut client, &name)?;
            print_success("Tag created");
            print_item(&tag, format);
        }
        TagsCommand::Delete { tag_id, yes } => {
            if !confirm("Delete this tag? This cannot be undone.", yes)? {
                print_aborted();
                return Ok(());
            }
            tags::delete_tag(&mut client, &tag_id)?;
            print_success("Tag deleted");
        }
    }
    Ok(())
}
