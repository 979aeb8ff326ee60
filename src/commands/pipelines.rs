//! `ghl pipelines …`

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output::{print_item, print_items};
use crate::services::pipelines;

const LIST_COLUMNS: [(&str, &str); 2] = [("id", "ID"), ("name", "Name")];
const STAGE_COLUMNS: [(&str, &str); 3] =
    [("id", "ID"), ("name", "Name"), ("position", "Position")];

#[derive(Args)]
pub struct PipelinesArgs {
    #[command(subcommand)]
    pub command: PipelinesCommand,
}

#[derive(Subcommand)]
pub enum PipelinesCommand {
    /// List pipelines for the location
    List,
    /// Get a pipeline by ID (includes its stages)
    Get { pipeline_id: String },
    /// List stages in a pipeline
    Stages { pipeline_id: String },
}

pub fn run(args: PipelinesArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let mut client = ctx.client()?;
    match args.command {
        PipelinesCommand::List => {
            let items = pipelines::list_pipelines(&mut client)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        PipelinesCommand::Get { pipeline_id } => {
            let pipeline = pipelines::get_pipeline(&mut client, &pipeline_id)?;
            print_item(&pipeline, format);
        }
        PipelinesCommand::Stages { pipeline_id } => {
            let stages = pipelines::list_stages(&mut client, &pipeline_id)?;
            print_items(&stages, &STAGE_COLUMNS, format);
        }
    }
    Ok(())
}
