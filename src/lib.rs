use clap::{FromArgMatches, error::ErrorKind};

use crate::cli::{Cli, Commands, command_with_examples};
use crate::commands::Ctx;
use crate::config::ConfigStore;

pub mod cli;
pub mod client;
pub mod commands;
pub mod common;
pub mod config;
pub mod error;
pub mod output;
pub mod searches;
pub mod services;
#[cfg(test)]
mod test_utils;

pub use client::{CallOpts, GhlClient, LocationParam, Method, RateLimitInfo, UploadFile};
pub use config::{Config, ConfigStore as Store, ConfigUpdate, Profile};
pub use error::{GhlError, Result};
pub use output::OutputFormat;

pub fn run_cli() {
    let args: Vec<std::ffi::OsString> = std::env::args_os().collect();
    if let Err(err) = run_cli_with_args(args) {
        output::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run_cli_with_args(args: Vec<std::ffi::OsString>) -> anyhow::Result<()> {
    if args.len() == 1 {
        println!("ghl {}", env!("CARGO_PKG_VERSION"));
        println!();
        let mut cmd = command_with_examples();
        let _ = cmd.print_help();
        println!();
        return Ok(());
    }
    let matches = match command_with_examples().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = err.print();
                return Ok(());
            }
            return Err(anyhow::anyhow!(err.to_string()));
        }
    };
    let cli = Cli::from_arg_matches(&matches).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    output::set_plain(cli.plain);
    let store = ConfigStore::open()?;
    let mut ctx = Ctx::new(store, cli.output_override());
    dispatch(cli.command, &mut ctx)
}

fn dispatch(command: Commands, ctx: &mut Ctx) -> anyhow::Result<()> {
    match command {
        Commands::Config(args) => commands::config_cmd::run(args, ctx),
        Commands::Contacts(args) => commands::contacts::run(args, ctx),
        Commands::Opportunities(args) => commands::opportunities::run(args, ctx),
        Commands::Pipelines(args) => commands::pipelines::run(args, ctx),
        Commands::Tasks(args) => commands::tasks::run(args, ctx),
        Commands::Users(args) => commands::users::run(args, ctx),
        Commands::CustomFields(args) => commands::custom_fields::run(args, ctx),
        Commands::Calendars(args) => commands::calendars::run(args, ctx),
        Commands::Conversations(args) => commands::conversations::run(args, ctx),
        Commands::Workflows(args) => commands::workflows::run(args, ctx),
        Commands::Tags(args) => commands::tags::run(args, ctx),
        Commands::Locations(args) => commands::locations::run(args, ctx),
        Commands::Searches(args) => commands::searches::run(args, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn run_cli_with_args_prints_help_for_bare_invocation() {
        let args = vec![OsString::from("ghl")];
        run_cli_with_args(args).unwrap();
    }

    #[test]
    fn run_cli_with_args_display_help() {
        let args = vec![OsString::from("ghl"), OsString::from("--help")];
        run_cli_with_args(args).unwrap();
    }

    #[test]
    fn run_cli_with_args_rejects_unknown_command() {
        let args = vec![OsString::from("ghl"), OsString::from("frobnicate")];
        let err = run_cli_with_args(args).unwrap_err();
        assert!(err.to_string().contains("error"));
    }
}
