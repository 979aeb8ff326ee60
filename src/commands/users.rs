//! `ghl users …`

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output::{print_item, print_items};
use crate::services::users;

const LIST_COLUMNS: [(&str, &str); 4] = [
    ("id", "ID"),
    ("name", "Name"),
    ("email", "Email"),
    ("role", "Role"),
];

#[derive(Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List users in the location
    List,
    /// Get a user by ID
    Get { user_id: String },
    /// Show the authenticated user
    Me,
    /// Search users by name or email
    Search { query: String },
}

pub fn run(args: UsersArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let mut client = ctx.client()?;
    match args.command {
        UsersCommand::List => {
            let items = users::list_users(&mut client)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        UsersCommand::Get { user_id } => {
            let user = users::get_user(&mut client, &user_id)?;
            print_item(&user, format);
        }
        UsersCommand::Me => {
            let user = users::current_user(&mut client)?;
            print_item(&user, format);
        }
        UsersCommand::Search { query } => {
            let items = users::search_users(&mut client, &query)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
    }
    Ok(())
}
