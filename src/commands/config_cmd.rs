//! `ghl config …`: tokens, default location, output format, and profiles.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::{Ctx, confirm, print_aborted, prompt_secret, prompt_text};
use crate::config::ConfigUpdate;
use crate::output::{self, OutputFormat, print_success, style_text};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Set the API token (prompted when omitted)
    SetToken {
        token: Option<String>,
        /// Store the token in the system keyring
        #[arg(long)]
        keyring: bool,
    },
    /// Set the default location (sub-account) ID
    SetLocation { location_id: String },
    /// Set the default output format
    SetFormat {
        #[arg(value_parser = ["table", "json", "csv"])]
        format: String,
    },
    /// Show current configuration
    Show,
    /// Clear stored configuration
    Clear {
        /// Clear the stored API token
        #[arg(long)]
        token: bool,
        /// Clear all configuration
        #[arg(long)]
        all: bool,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Manage profiles (token + location pairs); switch with `use`
    #[command(subcommand)]
    Profiles(ProfilesCommand),
}

#[derive(Subcommand)]
pub enum ProfilesCommand {
    /// List profiles and mark the active one
    List,
    /// Add a profile (or update if the name exists)
    Add {
        name: String,
        /// API token (prompted when omitted)
        #[arg(long, short = 't')]
        token: Option<String>,
        /// Location ID (prompted when omitted)
        #[arg(long, short = 'l')]
        location_id: Option<String>,
    },
    /// Switch to this profile; remembered for next time
    Use { name: String },
    /// Remove a profile
    Remove {
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(args: ConfigArgs, ctx: &mut Ctx) -> Result<()> {
    match args.command {
        ConfigCommand::SetToken { token, keyring } => set_token(ctx, token, keyring),
        ConfigCommand::SetLocation { location_id } => {
            ctx.store.update_config(ConfigUpdate {
                location_id: Some(location_id.clone()),
                ..Default::default()
            })?;
            print_success(&format!("Default location set to: {location_id}"));
            Ok(())
        }
        ConfigCommand::SetFormat { format } => {
            let format = OutputFormat::from_name(&format)
                .ok_or_else(|| anyhow::anyhow!("unknown format: {format}"))?;
            ctx.store.update_config(ConfigUpdate {
                output_format: Some(format),
                ..Default::default()
            })?;
            print_success(&format!("Default output format set to: {}", format.as_str()));
            Ok(())
        }
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Clear { token, all, yes } => clear(ctx, token, all, yes),
        ConfigCommand::Profiles(command) => profiles(ctx, command),
    }
}

fn set_token(ctx: &mut Ctx, token: Option<String>, keyring: bool) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => prompt_secret("Enter your GoHighLevel API token")?,
    };
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }
    ctx.store.set_token(token, keyring)?;
    print_success("API token saved successfully");
    Ok(())
}

fn show(ctx: &mut Ctx) -> Result<()> {
    let use_color = output::use_color_stdout();
    let active = ctx.store.active_profile_name();
    let token = ctx.store.get_token();
    let location = ctx.store.get_location_id();
    let config = ctx.store.config().clone();

    let label = |text: &str| style_text(text, use_color, |t| t.cyan());
    println!();
    println!("{}", style_text("GHL CLI Configuration", use_color, |t| t.bold()));
    println!();
    if let Some(active) = active {
        let name = style_text(&active, use_color, |t| t.green());
        println!("  {}  {name}", label("Active profile:"));
    }
    println!(
        "  {}    {}",
        label("Location ID:"),
        location.unwrap_or_else(|| "Not set".to_string())
    );
    println!("  {}    {}", label("API Version:"), config.api_version);
    println!(
        "  {}  {}",
        label("Output Format:"),
        config.output_format.as_str()
    );
    let token_status = if token.is_some() {
        style_text("Configured", use_color, |t| t.green())
    } else {
        style_text("Not set", use_color, |t| t.red())
    };
    println!("  {}      {token_status}", label("API Token:"));
    println!();
    let paths = ctx.store.paths();
    let footer = format!(
        "  Config: {}\n  Profiles: {}",
        paths.config.display(),
        paths.profiles.display()
    );
    println!("{}", style_text(&footer, use_color, |t| t.dimmed()));
    println!();
    Ok(())
}

fn clear(ctx: &mut Ctx, token: bool, all: bool, yes: bool) -> Result<()> {
    if !token && !all {
        anyhow::bail!("Specify --token or --all to clear configuration");
    }
    if !confirm("Are you sure you want to clear the configuration?", yes)? {
        print_aborted();
        return Ok(());
    }
    if all {
        ctx.store.clear_token()?;
        ctx.store.clear_profiles()?;
        let config_path = ctx.store.paths().config.clone();
        crate::common::remove_if_exists(&config_path)?;
        print_success("All configuration cleared");
    } else {
        ctx.store.clear_token()?;
        print_success("API token cleared");
    }
    Ok(())
}

fn profiles(ctx: &mut Ctx, command: ProfilesCommand) -> Result<()> {
    match command {
        ProfilesCommand::List => {
            let items = ctx.store.list_profiles();
            let use_color = output::use_color_stdout();
            if items.is_empty() {
                println!();
                println!(
                    "{}",
                    style_text(
                        "No profiles yet. Add one with: ghl config profiles add <name>",
                        use_color,
                        |t| t.dimmed()
                    )
                );
                println!();
                return Ok(());
            }
            println!();
            println!("{}", style_text("Profiles", use_color, |t| t.bold()));
            println!();
            for (name, is_active) in items {
                if is_active {
                    let mark = style_text("*", use_color, |t| t.green());
                    println!("  {name} {mark}");
                } else {
                    println!("  {name}");
                }
            }
            println!();
            println!(
                "{}",
                style_text("  * = active (used by default)", use_color, |t| t.dimmed())
            );
            println!();
            Ok(())
        }
        ProfilesCommand::Add {
            name,
            token,
            location_id,
        } => {
            let token = match token {
                Some(token) => token,
                None => prompt_secret("API token")?,
            };
            let location_id = match location_id {
                Some(location_id) => location_id,
                None => prompt_text("Location ID")?,
            };
            let token = token.trim();
            let location_id = location_id.trim();
            if token.is_empty() {
                anyhow::bail!("Token cannot be empty");
            }
            if location_id.is_empty() {
                anyhow::bail!("Location ID cannot be empty");
            }
            ctx.store
                .add_or_update_profile(name.trim(), token, location_id)?;
            print_success(&format!("Profile '{name}' saved"));
            Ok(())
        }
        ProfilesCommand::Use { name } => {
            ctx.store.set_active_profile(&name)?;
            print_success(&format!("Switched to profile: {name}"));
            Ok(())
        }
        ProfilesCommand::Remove { name, yes } => {
            if !confirm("Remove this profile?", yes)? {
                print_aborted();
                return Ok(());
            }
            ctx.store.remove_profile(&name)?;
            print_success(&format!("Profile '{name}' removed"));
            Ok(())
        }
    }
}
