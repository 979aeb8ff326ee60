//! `ghl custom-fields …`: field definitions and per-contact values.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output::{print_item, print_items, print_success};
use crate::services::custom_fields;

const FIELD_COLUMNS: [(&str, &str); 4] = [
    ("id", "ID"),
    ("name", "Name"),
    ("fieldKey", "Key"),
    ("dataType", "Type"),
];

const VALUE_COLUMNS: [(&str, &str); 4] = [
    ("id", "ID"),
    ("customFieldId", "Field"),
    ("contactId", "Contact"),
    ("value", "Value"),
];

#[derive(Args)]
pub struct CustomFieldsArgs {
    #[command(subcommand)]
    pub command: CustomFieldsCommand,
}

#[derive(Subcommand)]
pub enum CustomFieldsCommand {
    /// List contact custom field definitions
    List,
    /// Show the options of a selection field
    Options { field_id: String },
    /// List custom values, optionally for one contact
    Values {
        #[arg(long = "contact")]
        contact_id: Option<String>,
    },
    /// Set a custom value for a contact
    Set {
        #[arg(long = "contact")]
        contact_id: String,
        #[arg(long = "field")]
        field_id: String,
        value: String,
    },
}

pub fn run(args: CustomFieldsArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let location_id = ctx.require_location()?;
    let mut client = ctx.client()?;
    match args.command {
        CustomFieldsCommand::List => {
            let fields = custom_fields::list_custom_fields(&mut client, &location_id)?;
            print_items(&fields, &FIELD_COLUMNS, format);
        }
        CustomFieldsCommand::Options { field_id } => {
            let fields = custom_fields::list_custom_fields(&mut client, &location_id)?;
            let field = fields
                .iter()
                .find(|field| {
                    field.get("id").and_then(serde_json::Value::as_str) == Some(field_id.as_str())
                })
                .ok_or_else(|| anyhow::anyhow!("No custom field with id '{field_id}'"))?;
            if !custom_fields::field_has_options(field) {
                anyhow::bail!("Field '{field_id}' has no fixed option set");
            }
            let options: Vec<serde_json::Value> = custom_fields::get_field_options(field)
                .into_iter()
                .map(|(label, value)| serde_json::json!({"id": value, "label": label}))
                .collect();
            print_items(&options, &[("id", "Value"), ("label", "Label")], format);
        }
        CustomFieldsCommand::Values { contact_id } => {
            let values = custom_fields::list_custom_values(
                &mut client,
                &location_id,
                contact_id.as_deref(),
            )?;
            print_items(&values, &VALUE_COLUMNS, format);
        }
        CustomFieldsCommand::Set {
            contact_id,
            field_id,
            value,
        } => {
            let existing =
                custom_fields::list_custom_values(&mut client, &location_id, Some(&contact_id))?;
            let id_map = custom_fields::build_custom_value_id_map(&existing);
            let record = match id_map.get(&field_id) {
                Some(value_id) => custom_fields::update_custom_value(
                    &mut client,
                    &location_id,
                    value_id,
                    &value,
                )?,
                None => custom_fields::create_custom_value(
                    &mut client,
                    &location_id,
                    &field_id,
                    &contact_id,
                    &value,
                )?,
            };
            print_success("Custom value saved");
            print_item(&record, format);
        }
    }
    Ok(())
}
