//! Eclaire CLI - Behavior-based financial analysis
//!
//! Usage:
//!   eclaire analyze --file snapshot.json            Analyze a snapshot
//!   eclaire analyze --csv ledger.csv --income 5000  Analyze an expense ledger
//!   eclaire scenario --file snapshot.json --family spending_reduction --value 12
//!   eclaire rules                                   Show the rule table
//!   eclaire serve --port 3000                       Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let engine = commands::build_engine(cli.rules.as_deref())?;

    match cli.command {
        Commands::Analyze { input, json } => commands::cmd_analyze(&engine, &input, json),
        Commands::Scenario {
            input,
            family,
            value,
            rule,
            json,
        } => commands::cmd_scenario(&engine, &input, &family, value, rule.as_deref(), json),
        Commands::Rules => commands::cmd_rules(&engine),
        Commands::Serve {
            port,
            host,
            cache_size,
        } => commands::cmd_serve(engine, &host, port, cache_size).await,
    }
}
