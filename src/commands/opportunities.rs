//! `ghl opportunities …`

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Ctx, confirm, print_aborted};
use crate::output::{print_item, print_items, print_success};
use crate::services::opportunities::{
    self, NewOpportunity, OpportunityFilter, OpportunityUpdate,
};

const LIST_COLUMNS: [(&str, &str); 6] = [
    ("id", "ID"),
    ("name", "Name"),
    ("status", "Status"),
    ("monetaryValue", "Value"),
    ("pipelineId", "Pipeline"),
    ("pipelineStageId", "Stage"),
];

#[derive(Args)]
pub struct OpportunitiesArgs {
    #[command(subcommand)]
    pub command: OpportunitiesCommand,
}

#[derive(Subcommand)]
pub enum OpportunitiesCommand {
    /// List opportunities with optional filters
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long = "pipeline")]
        pipeline_id: Option<String>,
        #[arg(long = "stage")]
        stage_id: Option<String>,
        /// open, won, lost, or abandoned
        #[arg(long)]
        status: Option<String>,
        #[arg(long = "contact")]
        contact_id: Option<String>,
    },
    /// Get an opportunity by ID
    Get { opportunity_id: String },
    /// Create an opportunity
    Create {
        #[arg(long = "contact")]
        contact_id: String,
        #[arg(long = "pipeline")]
        pipeline_id: String,
        #[arg(long = "stage")]
        stage_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "open")]
        status: String,
        #[arg(long = "value")]
        monetary_value: Option<f64>,
        #[arg(long)]
        source: Option<String>,
    },
    /// Update an opportunity; only the given fields change
    Update {
        opportunity_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "value")]
        monetary_value: Option<f64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        source: Option<String>,
    },
    /// Move an opportunity to another stage
    Move {
        opportunity_id: String,
        #[arg(long = "stage")]
        stage_id: String,
    },
    /// Mark an opportunity won
    Won { opportunity_id: String },
    /// Mark an opportunity lost
    Lost { opportunity_id: String },
    /// Delete an opportunity
    Delete {
        opportunity_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(args: OpportunitiesArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let mut client = ctx.client()?;
    match args.command {
        OpportunitiesCommand::List {
            limit,
            skip,
            pipeline_id,
            stage_id,
            status,
            contact_id,
        } => {
            let items = opportunities::list_opportunities(
                &mut client,
                &OpportunityFilter {
                    pipeline_id,
                    stage_id,
                    status,
                    contact_id,
                    limit,
                    skip,
                },
            )?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        OpportunitiesCommand::Get { opportunity_id } => {
            let opportunity = opportunities::get_opportunity(&mut client, &opportunity_id)?;
            print_item(&opportunity, format);
        }
        OpportunitiesCommand::Create {
            contact_id,
            pipeline_id,
            stage_id,
            name,
            status,
            monetary_value,
            source,
        } => {
            let location_id = ctx.require_location()?;
            let opportunity = opportunities::create_opportunity(
                &mut client,
                &location_id,
                &NewOpportunity {
                    contact_id,
                    pipeline_id,
                    stage_id,
                    name,
                    status,
                    monetary_value,
                    source,
                },
            )?;
            print_success("Opportunity created");
            print_item(&opportunity, format);
        }
        OpportunitiesCommand::Update {
            opportunity_id,
            name,
            monetary_value,
            status,
            source,
        } => {
            let opportunity = opportunities::update_opportunity(
                &mut client,
                &opportunity_id,
                &OpportunityUpdate {
                    name,
                    monetary_value,
                    status,
                    source,
                },
            )?;
            print_success("Opportunity updated");
            print_item(&opportunity, format);
        }
        OpportunitiesCommand::Move {
            opportunity_id,
            stage_id,
        } => {
            opportunities::move_opportunity(&mut client, &opportunity_id, &stage_id)?;
            print_success("Opportunity moved");
        }
        OpportunitiesCommand::Won { opportunity_id } => {
            opportunities::mark_won(&mut client, &opportunity_id)?;
            print_success("Opportunity marked won");
        }
        OpportunitiesCommand::Lost { opportunity_id } => {
            opportunities::mark_lost(&mut client, &opportunity_id)?;
            print_success("Opportunity marked lost");
        }
        OpportunitiesCommand::Delete {
            opportunity_id,
            yes,
        } => {
            if !confirm("Delete this opportunity? This cannot be undone.", yes)? {
                print_aborted();
                return Ok(());
            }
            opportunities::delete_opportunity(&mut client, &opportunity_id)?;
            print_success("Opportunity deleted");
        }
    }
    Ok(())
}
