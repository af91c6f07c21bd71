//! Command implementations
//!
//! Each submodule contains related command handlers.

mod analyze;
mod input;
mod rules;
mod scenario;
mod serve;

pub use analyze::*;
pub use input::*;
pub use rules::*;
pub use scenario::*;
pub use serve::*;

use std::path::Path;

use anyhow::{Context, Result};
use eclaire_core::AnalysisEngine;

/// Build the engine from `--rules` or the default locations
///
/// An explicit path must load; the data-dir override falls back to the
/// built-in table on its own.
pub fn build_engine(rules: Option<&Path>) -> Result<AnalysisEngine> {
    match rules {
        Some(path) => AnalysisEngine::with_rules_path(path)
            .with_context(|| format!("Failed to load rule table {}", path.display())),
        None => Ok(AnalysisEngine::load()?),
    }
}
