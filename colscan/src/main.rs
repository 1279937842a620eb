//! colscan binary.
//!
//! # Security Guarantees
//! - Read-only database sessions, catalog metadata only
//! - No credentials stored or logged

use clap::Parser;
use colscan::commands;
use colscan::{Cli, Command};
use colscan_core::{Result, logging::init_logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet, cli.global.log_format)?;

    match cli.command {
        Command::Classify { names, patterns } => {
            let outcomes = commands::classify(&names, patterns.path.as_deref()).await?;
            commands::write_json(&outcomes, None).await
        }
        Command::Scan(args) => {
            info!("Starting scan...");
            let scan = commands::scan(&args.database_url, args.patterns.path.as_deref())
                .await
                .map_err(|e| {
                    error!("Scan could not start: {}", e);
                    e
                })?;
            info!(
                "Scan {} finished as {} ({} columns, risk {})",
                scan.id, scan.status, scan.summary.total_columns, scan.summary.risk_level
            );
            commands::write_json(&scan, args.output.as_deref()).await?;
            commands::ensure_succeeded(&scan)
        }
        Command::Patterns { patterns } => {
            for rule in commands::patterns(patterns.path.as_deref()).await? {
                println!(
                    "{:>3}  {:<20} {:<40} {}",
                    rule.priority, rule.information_type.as_str(), rule.pattern, rule.description
                );
            }
            Ok(())
        }
        Command::Types => {
            for listing in commands::types() {
                println!("{:<20} {:?}", listing.information_type.as_str(), listing.risk_tier);
            }
            Ok(())
        }
    }
}
