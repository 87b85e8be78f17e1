//! Command-line interface definition and parsing.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tender_core::models::{ReportKind, TenderId, UserId};

/// Command-line arguments for the tender daemon.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short, long, env = "APP_CONFIG")]
    pub config: Option<PathBuf>,

    /// What to do; runs the scheduler when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// The daemon's commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq, Default)]
pub enum Commands {
    /// Run the auto-close scheduler until interrupted
    #[default]
    Run,

    /// Run a single auto-close pass and print its summary as JSON
    CloseDue {
        /// Maximum number of tenders to consider (defaults to the configured batch size)
        #[arg(long)]
        batch_size: Option<u32>,
    },

    /// Print a tender's report
    ExportReport {
        /// The tender
        tender: TenderId,

        /// The buyer requesting the report
        #[arg(long)]
        requester: UserId,

        /// Which report
        #[arg(long, default_value = "opening", value_parser = parse_kind)]
        kind: ReportKind,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,
    },

    /// Print a freshly generated sealing key as hex
    GenerateKey,
}

/// How an exported report is printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Pretty-printed JSON rows
    Json,
    /// Comma-separated values with a header row
    Csv,
}

fn parse_kind(value: &str) -> Result<ReportKind, String> {
    value.parse().map_err(|error| format!("{error}"))
}

impl Cli {
    /// Parse command-line arguments.
    pub fn import() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}
