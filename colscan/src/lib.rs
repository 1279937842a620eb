//! Command-line surface for colscan.
//!
//! Argument parsing and the command implementations live in the library so
//! they can be exercised without spawning the binary.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use colscan_core::logging::LogFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "colscan")]
#[command(about = "PII column classifier and database scanner")]
#[command(version)]
#[command(long_about = "
colscan - Name-based PII discovery for relational databases

Classifies columns by name alone against weighted regular-expression rules
and rolls the results up into a per-database risk level.

SECURITY FEATURES:
- Catalog metadata only; row data is never read
- Read-only database sessions
- Credentials are never logged

EXAMPLES:
  colscan classify email_address user_ssn created_at
  colscan scan --database-url mysql://scanner@localhost/crm --output crm.json
  colscan patterns --patterns ./my-patterns.json
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(
        long,
        global = true,
        env = "COLSCAN_LOG_FORMAT",
        default_value = "text",
        value_parser = parse_log_format
    )]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify column names and print the outcomes as JSON
    Classify {
        /// Column names to classify
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,

        #[command(flatten)]
        patterns: PatternArgs,
    },
    /// Scan a MySQL database and emit the scan result as JSON
    Scan(ScanArgs),
    /// List the compiled rule set in evaluation order
    Patterns {
        #[command(flatten)]
        patterns: PatternArgs,
    },
    /// List information types and their risk tiers
    Types,
}

#[derive(Debug, Args)]
pub struct PatternArgs {
    /// JSON pattern file replacing the built-in rules
    #[arg(long = "patterns", env = "COLSCAN_PATTERNS", value_name = "FILE")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: String,

    #[command(flatten)]
    pub patterns: PatternArgs,

    /// Write the scan result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    s.parse::<LogFormat>().map_err(|e| e.to_string())
}
