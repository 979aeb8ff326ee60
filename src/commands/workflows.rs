//! `ghl workflows …`

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output::{print_item, print_items, print_success};
use crate::services::workflows;

const LIST_COLUMNS: [(&str, &str); 3] = [("id", "ID"), ("name", "Name"), ("status", "Status")];

#[derive(Args)]
pub struct WorkflowsArgs {
    #[command(subcommand)]
    pub command: WorkflowsCommand,
}

#[derive(Subcommand)]
pub enum WorkflowsCommand {
    /// List workflows
    List,
    /// Get a workflow by ID
    Get { workflow_id: String },
    /// Enroll a contact into a workflow
    Trigger {
        workflow_id: String,
        #[arg(long = "contact")]
        contact_id: String,
    },
}

pub fn run(args: WorkflowsArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let mut client = ctx.client()?;
    match args.command {
        WorkflowsCommand::List => {
            let items = workflows::list_workflows(&mut client)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        WorkflowsCommand::Get { workflow_id } => {
            let workflow = workflows::get_workflow(&mut client, &workflow_id)?;
            print_item(&workflow, format);
        }
        WorkflowsCommand::Trigger {
            workflow_id,
            contact_id,
        } => {
            workflows::enroll_contact(&mut client, &workflow_id, &contact_id)?;
            print_success("Contact enrolled in workflow");
        }
    }
    Ok(())
}
