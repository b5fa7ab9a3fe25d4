use apron_core::models::{BagStatus, Role, StaffRole};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "apron")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Airport ground operations desk")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// One line typed into `apron shell`
#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Dashboard counters, flight readiness and the current session
    Summary,
    /// Start a session
    SignIn { username: String, password: String },
    /// End the current session
    SignOut,
    /// Set a new password for an account
    ResetPassword {
        username: String,
        password: String,
        confirm: String,
    },
    /// Create a staff or passenger account
    AddUser {
        username: String,
        password: String,
        role: Role,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Schedule a flight
    AddFlight {
        flight_no: String,
        origin: String,
        destination: String,
        /// RFC 3339, e.g. 2025-01-10T14:30:00Z
        departs: DateTime<Utc>,
        gate: String,
    },
    /// Remove a flight; its passengers stay on record
    RemoveFlight { flight_no: String },
    /// Book a passenger onto a flight
    AddPassenger {
        flight_no: String,
        ticket: String,
        luggage: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Airline desk check-in by ticket number
    CheckIn { ticket: String },
    /// Gate boarding for the given flight
    Board { ticket: String, flight_no: String },
    /// Ramp loading for the given flight
    LoadBag { flight_no: String, luggage: String },
    /// Record a manual bag scan
    BagStatus {
        luggage: String,
        status: BagStatus,
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Bag history, newest first
    Track { luggage: String },
    /// Passenger's own flight and gate
    GateInfo { ticket: String },
    /// Passengers booked on a flight
    Manifest { flight_no: String },
    /// Send a message to every member of a role
    Message {
        to: StaffRole,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        body: Vec<String>,
    },
    /// Messages addressed to a role
    Inbox { role: StaffRole },
    /// Live notifications, newest first
    Notifications,
    /// Dismiss a notification before it expires
    Dismiss { id: String },
    /// Interactive session over one store; notifications expire in the background
    Shell,
}
