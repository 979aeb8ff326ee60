//! `ghl locations …`

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::config::ConfigUpdate;
use crate::output::{print_item, print_items, print_success};
use crate::services::locations;

const LIST_COLUMNS: [(&str, &str); 3] = [("id", "ID"), ("name", "Name"), ("city", "City")];

#[derive(Args)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub command: LocationsCommand,
}

#[derive(Subcommand)]
pub enum LocationsCommand {
    /// List locations visible to this token
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Get a location by ID
    Get { location_id: String },
    /// Set the default location
    Switch { location_id: String },
    /// Show the current default location
    Current,
}

pub fn run(args: LocationsArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    match args.command {
        LocationsCommand::List { limit } => {
            let mut client = ctx.client()?;
            let items = locations::list_locations(&mut client, limit)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        LocationsCommand::Get { location_id } => {
            let mut client = ctx.client()?;
            let location = locations::get_location(&mut client, &location_id)?;
            print_item(&location, format);
        }
        LocationsCommand::Switch { location_id } => {
            ctx.store.update_config(ConfigUpdate {
                location_id: Some(location_id.clone()),
                ..Default::default()
            })?;
            print_success(&format!("Switched to location: {location_id}"));
        }
        LocationsCommand::Current => {
            let location = ctx.require_location()?;
            println!("{location}");
        }
    }
    Ok(())
}
