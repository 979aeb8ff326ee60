//! CLI command groups. Each module owns its clap argument types and a
//! `run` entry point; everything talks to the API through [`Ctx`].

use anyhow::Result;
use colored::Colorize;

use crate::client::GhlClient;
use crate::config::ConfigStore;
use crate::error::GhlError;
use crate::output::{self, OutputFormat};

pub mod calendars;
pub mod config_cmd;
pub mod contacts;
pub mod conversations;
pub mod custom_fields;
pub mod locations;
pub mod opportunities;
pub mod pipelines;
pub mod searches;
pub mod tags;
pub mod tasks;
pub mod users;
pub mod workflows;

const NO_TOKEN_HINT: &str =
    "No API token configured. Run `ghl config set-token` first.";
const NO_LOCATION_HINT: &str =
    "No location ID configured. Run `ghl config set-location <location_id>` first.";

/// Per-invocation context: the opened store plus the resolved output format
/// (CLI flag beats the configured default).
pub struct Ctx {
    pub store: ConfigStore,
    pub format: OutputFormat,
}

impl Ctx {
    pub fn new(mut store: ConfigStore, format_override: Option<OutputFormat>) -> Self {
        let format = format_override.unwrap_or(store.config().output_format);
        Self { store, format }
    }

    /// Build an API client from the store's effective credentials.
    pub fn client(&mut self) -> Result<GhlClient> {
        let token = self
            .store
            .get_token()
            .ok_or_else(|| GhlError::Auth(NO_TOKEN_HINT.to_string()))?;
        let location_id = self.store.get_location_id();
        let api_version = self.store.config().api_version.clone();
        Ok(GhlClient::new(token, location_id, api_version))
    }

    /// Location is required for most writes; fail early with a hint.
    pub fn require_location(&mut self) -> Result<String> {
        self.store
            .get_location_id()
            .ok_or_else(|| GhlError::Auth(NO_LOCATION_HINT.to_string()).into())
    }
}

/// Ask before a destructive operation. `--yes` skips the prompt; Esc/Ctrl-C
/// count as a "no".
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    match inquire::Confirm::new(prompt).with_default(false).prompt() {
        Ok(answer) => Ok(answer),
        Err(
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted,
        ) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub fn print_aborted() {
    let use_color = output::use_color_stdout();
    println!(
        "{}",
        output::style_text("Aborted.", use_color, |t| t.dimmed().italic())
    );
}

/// Prompt for a secret when it was not passed as an argument.
pub fn prompt_secret(message: &str) -> Result<String> {
    let value = inquire::Password::new(message)
        .without_confirmation()
        .prompt()?;
    Ok(value)
}

pub fn prompt_text(message: &str) -> Result<String> {
    Ok(inquire::Text::new(message).prompt()?)
}
