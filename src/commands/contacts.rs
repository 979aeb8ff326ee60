//! `ghl contacts …`

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Ctx, confirm, print_aborted};
use crate::output::{print_item, print_items, print_success};
use crate::services::contacts::{self, ContactUpdate, NewContact, NewTask};

const LIST_COLUMNS: [(&str, &str); 6] = [
    ("id", "ID"),
    ("firstName", "First"),
    ("lastName", "Last"),
    ("email", "Email"),
    ("phone", "Phone"),
    ("tags", "Tags"),
];

const NOTE_COLUMNS: [(&str, &str); 3] = [("id", "ID"), ("body", "Body"), ("dateAdded", "Added")];

const TASK_COLUMNS: [(&str, &str); 4] = [
    ("id", "ID"),
    ("title", "Title"),
    ("dueDate", "Due"),
    ("completed", "Done"),
];

#[derive(Args)]
pub struct ContactsArgs {
    #[command(subcommand)]
    pub command: ContactsCommand,
}

#[derive(Subcommand)]
pub enum ContactsCommand {
    /// List contacts in the location
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Filter by name, email, or phone
        #[arg(long)]
        query: Option<String>,
    },
    /// Get a contact by ID
    Get { contact_id: String },
    /// Create a contact (requires at least --email or --phone)
    Create {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long = "first-name")]
        first_name: Option<String>,
        #[arg(long = "last-name")]
        last_name: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "company")]
        company_name: Option<String>,
        #[arg(long)]
        source: Option<String>,
        /// Tag to apply; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Update a contact; only the given fields change
    Update {
        contact_id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long = "first-name")]
        first_name: Option<String>,
        #[arg(long = "last-name")]
        last_name: Option<String>,
        #[arg(long = "company")]
        company_name: Option<String>,
        #[arg(long)]
        source: Option<String>,
    },
    /// Delete a contact
    Delete {
        contact_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Search contacts by name, email, or phone
    Search {
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Filtered search (tags AND together, assignee exact)
    Filter {
        #[arg(long)]
        query: Option<String>,
        /// Tag the contact must have; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "assigned-to")]
        assigned_to: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long = "page-limit", default_value_t = 50)]
        page_limit: u32,
    },
    /// Add tags to a contact (merges with existing)
    Tag {
        contact_id: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Remove tags from a contact
    Untag {
        contact_id: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// List notes for a contact
    Notes { contact_id: String },
    /// Add a note to a contact
    AddNote { contact_id: String, body: String },
    /// Manage a contact's tasks
    #[command(subcommand)]
    Tasks(ContactTasksCommand),
}

#[derive(Subcommand)]
pub enum ContactTasksCommand {
    /// List tasks for a contact
    List { contact_id: String },
    /// Create a task (due date defaults to a week out)
    Create {
        contact_id: String,
        title: String,
        #[arg(long)]
        body: Option<String>,
        /// ISO 8601 due date
        #[arg(long = "due")]
        due_date: Option<String>,
        #[arg(long = "assigned-to")]
        assigned_to: Option<String>,
    },
    /// Update a task's title or due date
    Update {
        contact_id: String,
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "due")]
        due_date: Option<String>,
    },
    /// Mark a task completed (or pending with --undo)
    Complete {
        contact_id: String,
        task_id: String,
        #[arg(long)]
        undo: bool,
    },
    /// Delete a task
    Delete {
        contact_id: String,
        task_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(args: ContactsArgs, ctx: &mut Ctx) -> Result<()> {
    let format = ctx.format;
    let mut client = ctx.client()?;
    match args.command {
        ContactsCommand::List { limit, query } => {
            let items = contacts::list_contacts(&mut client, limit, query.as_deref())?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        ContactsCommand::Get { contact_id } => {
            let contact = contacts::get_contact(&mut client, &contact_id)?;
            print_item(&contact, format);
        }
        ContactsCommand::Create {
            email,
            phone,
            first_name,
            last_name,
            name,
            company_name,
            source,
            tags,
        } => {
            if email.is_none() && phone.is_none() {
                anyhow::bail!("Provide at least --email or --phone");
            }
            let location_id = ctx.require_location()?;
            let contact = contacts::create_contact(
                &mut client,
                &location_id,
                &NewContact {
                    email,
                    phone,
                    first_name,
                    last_name,
                    name,
                    company_name,
                    source,
                    tags,
                },
            )?;
            print_success("Contact created");
            print_item(&contact, format);
        }
        ContactsCommand::Update {
            contact_id,
            email,
            phone,
            first_name,
            last_name,
            company_name,
            source,
        } => {
            let contact = contacts::update_contact(
                &mut client,
                &contact_id,
                &ContactUpdate {
                    email,
                    phone,
                    first_name,
                    last_name,
                    company_name,
                    source,
                    custom_fields: None,
                },
            )?;
            print_success("Contact updated");
            print_item(&contact, format);
        }
        ContactsCommand::Delete { contact_id, yes } => {
            if !confirm("Delete this contact? This cannot be undone.", yes)? {
                print_aborted();
                return Ok(());
            }
            contacts::delete_contact(&mut client, &contact_id)?;
            print_success("Contact deleted");
        }
        ContactsCommand::Search { query, limit } => {
            let items = contacts::search_contacts(&mut client, &query, limit)?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        ContactsCommand::Filter {
            query,
            tags,
            assigned_to,
            page,
            page_limit,
        } => {
            let location_id = ctx.require_location()?;
            let items = contacts::contacts_search(
                &mut client,
                &location_id,
                page,
                page_limit,
                query.as_deref(),
                &tags,
                assigned_to.as_deref(),
            )?;
            print_items(&items, &LIST_COLUMNS, format);
        }
        ContactsCommand::Tag { contact_id, tags } => {
            contacts::add_tag(&mut client, &contact_id, &tags)?;
            print_success("Tags added");
        }
        ContactsCommand::Untag { contact_id, tags } => {
            contacts::remove_tag(&mut client, &contact_id, &tags)?;
            print_success("Tags removed");
        }
        ContactsCommand::Notes { contact_id } => {
            let notes = contacts::list_notes(&mut client, &contact_id)?;
            print_items(&notes, &NOTE_COLUMNS, format);
        }
        ContactsCommand::AddNote { contact_id, body } => {
            let note = contacts::add_note(&mut client, &contact_id, &body)?;
            print_success("Note added");
            print_item(&note, format);
        }
        ContactsCommand::Tasks(command) => run_tasks(command, &mut client, format)?,
    }
    Ok(())
}

fn run_tasks(
    command: ContactTasksCommand,
    client: &mut crate::client::GhlClient,
    format: crate::output::OutputFormat,
) -> Result<()> {
    match command {
        ContactTasksCommand::List { contact_id } => {
            let tasks = contacts::list_tasks(client, &contact_id)?;
            print_items(&tasks, &TASK_COLUMNS, format);
        }
        ContactTasksCommand::Create {
            contact_id,
            title,
            body,
            due_date,
            assigned_to,
        } => {
            let task = contacts::create_task(
                client,
                &contact_id,
                &title,
                &NewTask {
                    body,
                    due_date,
                    completed: false,
                    assigned_to,
                },
            )?;
            print_success("Task created");
            print_item(&task, format);
        }
        ContactTasksCommand::Update {
            contact_id,
            task_id,
            title,
            due_date,
        } => {
            let task = contacts::update_task(
                client,
                &contact_id,
                &task_id,
                title.as_deref(),
                due_date.as_deref(),
            )?;
            print_success("Task updated");
            print_item(&task, format);
        }
        ContactTasksCommand::Complete {
            contact_id,
            task_id,
            undo,
        } => {
            contacts::set_task_completed(client, &contact_id, &task_id, !undo)?;
            print_success(if undo {
                "Task marked pending"
            } else {
                "Task completed"
            });
        }
        ContactTasksCommand::Delete {
            contact_id,
            task_id,
            yes,
        } => {
            if !confirm("Delete this task? This cannot be undone.", yes)? {
                print_aborted();
                return Ok(());
            }
            contacts::delete_task(client, &contact_id, &task_id)?;
            print_success("Task deleted");
        }
    }
    Ok(())
}
