//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Eclaire - Behavior-based financial analysis
#[derive(Parser)]
#[command(name = "eclaire")]
#[command(about = "Explainable savings, spending and risk analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Rule table to use instead of the built-in one (TOML)
    ///
    /// Without this flag, ~/.local/share/eclaire/config/rules.toml is used
    /// when present.
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a snapshot and print metrics, outcomes and recommended actions
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a what-if adjustment
    Scenario {
        #[command(flatten)]
        input: InputArgs,

        /// Scenario family: spending_reduction, trading_exposure,
        /// emergency_buffer, investment_consistency, income_change, generic
        #[arg(long)]
        family: String,

        /// Adjustment value in the family's unit
        #[arg(long, allow_hyphen_values = true)]
        value: f64,

        /// Clamp to this rule's safe bounds (e.g. R001)
        #[arg(long)]
        rule: Option<String>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// List the loaded rule table
    Rules,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Number of cached analysis results (0 disables the cache)
        ///
        /// Overrides ECLAIRE_CACHE_CAPACITY.
        #[arg(long)]
        cache_size: Option<usize>,
    },
}

/// Where the snapshot comes from, plus profile overrides
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// JSON file: a summary request, a ledger snapshot, or
    /// {"snapshot": ..., "profile": ...}
    #[arg(short, long, conflicts_with = "csv", required_unless_present = "csv")]
    pub file: Option<PathBuf>,

    /// Expense ledger CSV (columns: id,amount,category,description,date)
    #[arg(long, requires = "income")]
    pub csv: Option<PathBuf>,

    /// Income over the ledger's horizon (required with --csv)
    #[arg(long)]
    pub income: Option<f64>,

    /// Capital currently allocated to trading
    #[arg(long)]
    pub trading_capital: Option<f64>,

    /// Liquid funds available as a buffer (defaults to income)
    #[arg(long)]
    pub investable_funds: Option<f64>,

    /// Risk profile: conservative, moderate, aggressive
    #[arg(long)]
    pub risk: Option<String>,

    /// Income type: salary, freelance, business, mixed
    #[arg(long)]
    pub income_type: Option<String>,

    /// Goals, comma-separated (e.g. retirement,emergency-fund)
    #[arg(long, value_delimiter = ',')]
    pub goals: Vec<String>,
}
