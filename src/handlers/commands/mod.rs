//! Command handlers module
//!
//! This module parses console commands and dispatches them to the services.

pub mod help;
pub mod events;
pub mod registrations;
pub mod admin;

use std::str::FromStr;
use chrono::{DateTime, Utc};
use tracing::{debug, error};
use crate::database::store::EventStore;
use crate::models::UserRole;
use crate::services::ServiceFactory;
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::parse_timestamp;

/// All available console commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Users,
    Events,
    Event { event_id: i64 },
    Participants { event_id: i64 },
    Dashboard { user_id: i64 },
    Register { event_id: i64, user_id: i64 },
    Cancel { registration_id: i64 },
    CheckIn { registration_id: i64 },
    Confirm { registration_id: i64 },
    Decline { registration_id: i64 },
    NoShow { registration_id: i64 },
    Approve { admin_id: i64, event_id: i64 },
    Reject { admin_id: i64, event_id: i64 },
    AddUser { username: String, role: UserRole, email: String, full_name: String },
    CreateEvent {
        actor_id: i64,
        total_slots: i32,
        event_date: DateTime<Utc>,
        registration_deadline: DateTime<Utc>,
        title: String,
    },
    Submit { actor_id: i64, event_id: i64 },
}

fn parse_id(args: &[&str], index: usize, name: &str) -> Result<i64> {
    let raw = args
        .get(index)
        .ok_or_else(|| EventDeskError::InvalidInput(format!("Missing argument: {}", name)))?;
    raw.parse::<i64>()
        .map_err(|_| EventDeskError::InvalidInput(format!("Invalid {}: {}", name, raw)))
}

fn parse_arg<'a>(args: &[&'a str], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .copied()
        .ok_or_else(|| EventDeskError::InvalidInput(format!("Missing argument: {}", name)))
}

fn parse_time(args: &[&str], index: usize, name: &str) -> Result<DateTime<Utc>> {
    let raw = parse_arg(args, index, name)?;
    parse_timestamp(raw).ok_or_else(|| EventDeskError::InvalidInput(format!("Invalid {}: {}", name, raw)))
}

/// Everything from `index` on, joined back with single spaces
fn rest(args: &[&str], index: usize, name: &str) -> Result<String> {
    if args.len() <= index {
        return Err(EventDeskError::InvalidInput(format!("Missing argument: {}", name)));
    }
    Ok(args[index..].join(" "))
}

impl FromStr for Command {
    type Err = EventDeskError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| EventDeskError::InvalidInput("Empty command".to_string()))?
            .to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match name.as_str() {
            "help" => Command::Help,
            "users" => Command::Users,
            "events" => Command::Events,
            "event" => Command::Event { event_id: parse_id(&args, 0, "event_id")? },
            "participants" => Command::Participants { event_id: parse_id(&args, 0, "event_id")? },
            "dashboard" => Command::Dashboard { user_id: parse_id(&args, 0, "user_id")? },
            "register" => Command::Register {
                event_id: parse_id(&args, 0, "event_id")?,
                user_id: parse_id(&args, 1, "user_id")?,
            },
            "cancel" => Command::Cancel { registration_id: parse_id(&args, 0, "registration_id")? },
            "checkin" => Command::CheckIn { registration_id: parse_id(&args, 0, "registration_id")? },
            "confirm" => Command::Confirm { registration_id: parse_id(&args, 0, "registration_id")? },
            "decline" => Command::Decline { registration_id: parse_id(&args, 0, "registration_id")? },
            "noshow" => Command::NoShow { registration_id: parse_id(&args, 0, "registration_id")? },
            "approve" => Command::Approve {
                admin_id: parse_id(&args, 0, "admin_id")?,
                event_id: parse_id(&args, 1, "event_id")?,
            },
            "reject" => Command::Reject {
                admin_id: parse_id(&args, 0, "admin_id")?,
                event_id: parse_id(&args, 1, "event_id")?,
            },
            "adduser" => Command::AddUser {
                username: parse_arg(&args, 0, "username")?.to_string(),
                role: parse_arg(&args, 1, "role")?.parse()?,
                email: parse_arg(&args, 2, "email")?.to_string(),
                full_name: rest(&args, 3, "full_name")?,
            },
            "create" => Command::CreateEvent {
                actor_id: parse_id(&args, 0, "actor_id")?,
                total_slots: i32::try_from(parse_id(&args, 1, "total_slots")?)
                    .map_err(|_| EventDeskError::InvalidInput("total_slots out of range".to_string()))?,
                event_date: parse_time(&args, 2, "event_date")?,
                registration_deadline: parse_time(&args, 3, "registration_deadline")?,
                title: rest(&args, 4, "title")?,
            },
            "submit" => Command::Submit {
                actor_id: parse_id(&args, 0, "actor_id")?,
                event_id: parse_id(&args, 1, "event_id")?,
            },
            other => return Err(EventDeskError::InvalidInput(format!("Unknown command: {}", other))),
        };

        Ok(command)
    }
}

/// Main command dispatcher
pub async fn handle_command<S: EventStore>(services: &ServiceFactory<S>, cmd: Command) -> Result<String> {
    debug!(command = ?cmd, "Dispatching command");
    match cmd {
        Command::Help => Ok(help::help_text().to_string()),
        Command::Users => admin::handle_users(services).await,
        Command::Events => events::handle_events_list(services).await,
        Command::Event { event_id } => events::handle_event_details(services, event_id).await,
        Command::Participants { event_id } => registrations::handle_participants(services, event_id).await,
        Command::Dashboard { user_id } => registrations::handle_dashboard(services, user_id).await,
        Command::Register { event_id, user_id } => registrations::handle_register(services, event_id, user_id).await,
        Command::Cancel { registration_id } => registrations::handle_cancel(services, registration_id).await,
        Command::CheckIn { registration_id } => registrations::handle_check_in(services, registration_id).await,
        Command::Confirm { registration_id } => registrations::handle_confirm(services, registration_id).await,
        Command::Decline { registration_id } => registrations::handle_decline(services, registration_id).await,
        Command::NoShow { registration_id } => registrations::handle_no_show(services, registration_id).await,
        Command::Approve { admin_id, event_id } => admin::handle_approve(services, admin_id, event_id).await,
        Command::Reject { admin_id, event_id } => admin::handle_reject(services, admin_id, event_id).await,
        Command::AddUser { username, role, email, full_name } => {
            admin::handle_add_user(services, username, role, email, full_name).await
        }
        Command::CreateEvent { actor_id, total_slots, event_date, registration_deadline, title } => {
            events::handle_create_event(services, actor_id, total_slots, event_date, registration_deadline, title).await
        }
        Command::Submit { actor_id, event_id } => events::handle_submit(services, actor_id, event_id).await,
    }
}

/// Parse and run one console line; failures are rendered as text
pub async fn handle_line<S: EventStore>(services: &ServiceFactory<S>, line: &str) -> String {
    let result = match line.parse::<Command>() {
        Ok(cmd) => handle_command(services, cmd).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(reply) => reply,
        Err(e) => {
            if e.is_recoverable() {
                debug!(error = %e, "Command rejected");
            } else {
                error!(error = %e, severity = %e.severity(), "Command failed");
            }
            format!("Error: {}", e)
        }
    }
}
