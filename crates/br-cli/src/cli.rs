//! Command-line argument definitions.

use std::path::PathBuf;

use br_core::Category;
use clap::{Args, Parser, Subcommand};

/// Interval tracker.
///
/// Shows how long it has been since the last logged BR and keeps the log.
#[derive(Debug, Parser)]
#[command(name = "br", version, about, long_about = None)]
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
    /// Show the time elapsed since the last entry.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List every entry, most recent first.
    History {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Record the origin entry that starts the log.
    Start {
        #[command(flatten)]
        when: WhenArgs,
    },

    /// Record a new entry.
    Add {
        /// Entry category (tiktok, porno, imagination).
        #[arg(long)]
        category: Option<Category>,

        #[command(flatten)]
        when: WhenArgs,
    },

    /// Delete an entry by id.
    Delete {
        /// Entry id as shown by `br history`.
        id: String,
    },

    /// Keep printing the elapsed time until interrupted.
    Watch {
        /// Stop after this many ticks.
        #[arg(long)]
        ticks: Option<u64>,
    },
}

/// When an entry happened.
///
/// Unset picker fields keep their value from the current local time.
#[derive(Debug, Clone, Default, Args)]
pub struct WhenArgs {
    /// Entry time: RFC 3339, local `YYYY-MM-DDTHH:MM`, or relative ("2 hours ago").
    #[arg(long, conflicts_with_all = ["day", "month", "year", "hour", "minute"])]
    pub at: Option<String>,

    /// Day of month (1-31). Days past the end of the month roll over.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day: Option<u32>,

    /// Month (1-12).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Year (2000-2100).
    #[arg(long, value_parser = clap::value_parser!(u32).range(2000..=2100))]
    pub year: Option<u32>,

    /// Hour (0-23).
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
    pub hour: Option<u32>,

    /// Minute (0-59).
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=59))]
    pub minute: Option<u32>,
}
