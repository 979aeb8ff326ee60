//! `ghl calendars …` with the `appointments` subgroup.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Ctx, confirm, print_aborted};
use crate::output::{print_item, print_items, print_success};
use crate::services::calendars::{self, NewAppointment};

const LIST_COLUMNS: [(&str, &str); 2] = [("id", "ID"), ("name", "Name")];
const SLOT_COLUMNS: [(&str, &str); 2] = [("startTime", "Start"), ("endTime", "End")];
const APPOINTMENT_COLUMNS: [(&str, &str); 5] = [
    ("id", "ID"),
    ("title", "Title"),
    ("startTime", "Start"),
    ("endTime", "End"),
    ("contactId", "Contact"),
];

#[derive(Args)]
pub struct CalendarsArgs {
    #[command(subcommand)]
    pub command: CalendarsCommand,
}

#[derive(Subcommand)]
pub enum CalendarsCommand {
    /// List calendars
    List,
    /// Get a calendar by ID
    Get { calendar_id: String },
    /// Show available slots for a calendar
    Slots {
        calendar_id: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
    /// Manage appointments
    #[command(subcommand)]
    Appointments(AppointmentsCommand),
}

#[derive(Subcommand)]
pub enum AppointmentsCommand {
    /// List appointments
    List {
        #[arg(long = "calendar")]
        calendar_id: Option<String>,
        #[arg(long = "contact")]
        contact_id: Option<String>,
    },
    /// Get an appointment by ID
    Get { appointment_id: String },
    /// Book an appointment
    Create {
        #[arg(long = "calendar")]
        calendar_id: String,
        #[arg(long = "contact")]
        contact_id: String,
        /// Slot start time (ISO 8601)
        #[arg(long = "slot")]
        start_time: String,
        #[arg(long = "end")]
        end_time: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Update an appointment
    Update {
        appointment_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "slot")]
        start_time: Option<String>,
        #[arg(long = "end")]
        end_time: Option<String>,
    },
    /// Cancel an appointment
    Delete {
        appointment_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(args: CalendarsArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let mut client = ctx.client()?;
    match args.command {
        CalendarsCommand::List => {
            let items = calendars::list_calendars(&mut client)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        CalendarsCommand::Get { calendar_id } => {
            let calendar = calendars::get_calendar(&mut client, &calendar_id)?;
            print_item(&calendar, format);
        }
        CalendarsCommand::Slots {
            calendar_id,
            start,
            end,
        } => {
            let slots =
                calendars::free_slots(&mut client, &calendar_id, &start, end.as_deref())?;
            print_items(&slots, &SLOT_COLUMNS, format);
        }
        CalendarsCommand::Appointments(command) => match command {
            AppointmentsCommand::List {
                calendar_id,
                contact_id,
            } => {
                let items = calendars::list_appointments(
                    &mut client,
                    calendar_id.as_deref(),
                    contact_id.as_deref(),
                )?;
                print_items(&items, &APPOINTMENT_COLUMNS, format);
            }
            AppointmentsCommand::Get { appointment_id } => {
                let appointment = calendars::get_appointment(&mut client, &appointment_id)?;
                print_item(&appointment, format);
            }
            AppointmentsCommand::Create {
                calendar_id,
                contact_id,
                start_time,
                end_time,
                title,
            } => {
                let location_id = ctx.require_location()?;
                let appointment = calendars::create_appointment(
                    &mut client,
                    &location_id,
                    &NewAppointment {
                        calendar_id,
                        contact_id,
                        start_time,
                        end_time,
                        title,
                    },
                )?;
                print_success("Appointment created");
                print_item(&appointment, format);
            }
            AppointmentsCommand::Update {
                appointment_id,
                title,
                start_time,
                end_time,
            } => {
                let appointment = calendars::update_appointment(
                    &mut client,
                    &appointment_id,
                    title.as_deref(),
                    start_time.as_deref(),
                    end_time.as_deref(),
                )?;
                print_success("Appointment updated");
                print_item(&appointment, format);
            }
            AppointmentsCommand::Delete {
                appointment_id,
                yes,
            } => {
                if !confirm("Delete this appointment? This cannot be undone.", yes)? {
                    print_aborted();
                    return Ok(());
                }
                calendars::delete_appointment(&mut client, &appointment_id)?;
                print_success("Appointment deleted");
            }
        },
    }
    Ok(())
}
