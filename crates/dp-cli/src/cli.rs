//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Day planner.
///
/// Keeps a local calendar of events, warns about scheduling conflicts, and
/// lays out each day's timed events in side-by-side columns.
#[derive(Debug, Parser)]
#[command(name = "dp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an event and report any conflicts.
    Add(AddArgs),

    /// Change fields of an existing event.
    Edit(EditArgs),

    /// Delete an event.
    Rm {
        /// Event ID.
        id: String,
    },

    /// Show one event and its conflicts.
    Show {
        /// Event ID.
        id: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List events, optionally limited to a date range.
    List {
        /// First date to include (e.g., 2024-03-01, today, "3 days ago").
        #[arg(long)]
        from: Option<String>,

        /// Last date to include. Defaults to --from when only that is given.
        #[arg(long)]
        to: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the agenda and column layout for one day.
    Day {
        /// Date to show. Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the agenda for the Sunday-to-Saturday week containing a date.
    Week {
        /// Any date in the week. Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the events that conflict with an event.
    Conflicts {
        /// Event ID.
        id: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show database location and event counts.
    Status,
}

/// Arguments for `dp add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Event title.
    #[arg(long)]
    pub title: String,

    /// Start (e.g., 2024-03-01T09:00, "2024-03-01 09:00", "tomorrow 14:30").
    /// Optional for all-day events.
    #[arg(long)]
    pub start: Option<String>,

    /// End. Timed events without an end last one hour.
    #[arg(long)]
    pub end: Option<String>,

    /// Mark as an all-day event.
    #[arg(long)]
    pub all_day: bool,

    /// Display color as #RRGGBB. Defaults to the configured color.
    #[arg(long)]
    pub color: Option<String>,

    /// Longer description.
    #[arg(long)]
    pub description: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `dp edit`.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Event ID.
    pub id: String,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// New start.
    #[arg(long)]
    pub start: Option<String>,

    /// New end.
    #[arg(long, conflicts_with = "clear_end")]
    pub end: Option<String>,

    /// Remove the end time, so the event lasts one hour.
    #[arg(long)]
    pub clear_end: bool,

    /// Make the event all-day.
    #[arg(long, conflicts_with = "timed")]
    pub all_day: bool,

    /// Make the event timed.
    #[arg(long)]
    pub timed: bool,

    /// New color as #RRGGBB.
    #[arg(long)]
    pub color: Option<String>,

    /// New description.
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description.
    #[arg(long)]
    pub clear_description: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}
