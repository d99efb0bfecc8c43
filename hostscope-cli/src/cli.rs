//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hostscope_core::ProcessSortKey;

/// `hostscope` command-line interface for host statistics
#[derive(Parser)]
#[command(name = "hostscope")]
#[command(author, version, about = "Host statistics from the command line")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Take one snapshot of current statistics and print it
    #[command(about = "Refresh once and print memory, network, and processes")]
    Snapshot {
        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,

        /// Number of processes to include
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Process ranking key
        #[arg(short, long, default_value = "cpu", value_enum)]
        sort: SortOrder,
    },

    /// Poll continuously and print one line per tick
    #[command(about = "Poll on an interval and stream results")]
    Watch {
        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,

        /// Poll interval in milliseconds
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Stop after this many printed ticks (default: run until killed)
        #[arg(short, long)]
        ticks: Option<u64>,
    },

    /// Print the system identity
    #[command(about = "Show CPU model, OS, and host name")]
    Identity {
        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,
    },
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
}

/// Process ranking key exposed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Rank by CPU usage
    Cpu,
    /// Rank by memory usage
    Memory,
}

impl From<SortOrder> for ProcessSortKey {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Cpu => Self::Cpu,
            SortOrder::Memory => Self::Memory,
        }
    }
}
