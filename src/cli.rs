use clap::{Command, CommandFactory, Parser, Subcommand};

use crate::commands::{
    calendars::CalendarsArgs, config_cmd::ConfigArgs, contacts::ContactsArgs,
    conversations::ConversationsArgs, custom_fields::CustomFieldsArgs, locations::LocationsArgs,
    opportunities::OpportunitiesArgs, pipelines::PipelinesArgs, searches::SearchesArgs,
    tags::TagsArgs, tasks::TasksArgs, users::UsersArgs, workflows::WorkflowsArgs,
};
use crate::output::OutputFormat;

/// Command-line interface for the GoHighLevel API v2: contacts, pipelines,
/// calendars, conversations, and more from the terminal.
#[derive(Parser)]
#[command(name = "ghl", author, version, about, color = clap::ColorChoice::Never)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
    /// Output as CSV
    #[arg(long, global = true, conflicts_with = "json")]
    pub csv: bool,
    /// Output only IDs
    #[arg(long, short = 'q', global = true, conflicts_with_all = ["json", "csv"])]
    pub quiet: bool,
    /// Disable styling and separators
    #[arg(long, global = true)]
    pub plain: bool,
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output format forced on the command line, if any.
    pub fn output_override(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else if self.csv {
            Some(OutputFormat::Csv)
        } else if self.quiet {
            Some(OutputFormat::Quiet)
        } else {
            None
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration and profiles
    Config(ConfigArgs),
    /// Manage contacts
    Contacts(ContactsArgs),
    /// Manage opportunities
    Opportunities(OpportunitiesArgs),
    /// Inspect pipelines and stages
    Pipelines(PipelinesArgs),
    /// Search tasks across the location
    Tasks(TasksArgs),
    /// Look up users
    Users(UsersArgs),
    /// Custom field definitions and values
    #[command(name = "custom-fields")]
    CustomFields(CustomFieldsArgs),
    /// Calendars, slots, and appointments
    Calendars(CalendarsArgs),
    /// Conversations and messages
    Conversations(ConversationsArgs),
    /// Workflows and enrollment
    Workflows(WorkflowsArgs),
    /// Location-level tags
    Tags(TagsArgs),
    /// Locations (sub-accounts)
    Locations(LocationsArgs),
    /// Saved contact searches
    Searches(SearchesArgs),
}

pub fn command_with_examples() -> Command {
    let mut cmd = Cli::command();
    cmd = cmd.after_help(examples_root("ghl"));
    cmd
}

fn examples_root(name: &str) -> String {
    format!(
        "Examples:\n  {name} config set-token\n  {name} config set-location <location_id>\n  {name} contacts list\n  {name} contacts search \"smith\" --json\n  {name} opportunities list --pipeline <id>\n  {name} config profiles add work"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_global_format_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ghl", "contacts", "list", "--json"]).unwrap();
        assert_eq!(cli.output_override(), Some(OutputFormat::Json));

        let cli = Cli::try_parse_from(["ghl", "tags", "list", "--csv"]).unwrap();
        assert_eq!(cli.output_override(), Some(OutputFormat::Csv));

        let cli = Cli::try_parse_from(["ghl", "users", "list", "-q"]).unwrap();
        assert_eq!(cli.output_override(), Some(OutputFormat::Quiet));

        let cli = Cli::try_parse_from(["ghl", "users", "list"]).unwrap();
        assert_eq!(cli.output_override(), None);
    }

    #[test]
    fn cli_rejects_conflicting_format_flags() {
        assert!(Cli::try_parse_from(["ghl", "users", "list", "--json", "--csv"]).is_err());
        assert!(Cli::try_parse_from(["ghl", "users", "list", "--json", "-q"]).is_err());
    }

    #[test]
    fn command_tree_is_well_formed() {
        command_with_examples().debug_assert();
    }
}
