use crate::types::{ExportFormat, LogLevel, ReportFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "voxmeter")]
#[command(about = "Reconstruct per-turn latency breakdowns from voice pipeline event logs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to voxmeter.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a recorded event log and print the latency table
    Report {
        /// JSONL event log
        log: PathBuf,

        #[arg(long, default_value = "plain")]
        format: ReportFormat,
    },

    /// Follow a live event log and print each turn as it closes
    Watch {
        /// Event log file, or a directory to pick the most recent log from
        path: PathBuf,

        /// Override the watcher poll interval
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },

    /// Export the completed-turn ledger as structured data
    Export {
        /// JSONL event log
        log: PathBuf,

        #[arg(long, default_value = "json")]
        format: ExportFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
