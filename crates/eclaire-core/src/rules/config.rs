//! Rule table loading
//!
//! The table is resolved in two layers:
//! 1. Override in the data dir (~/.local/share/eclaire/config/rules.toml)
//! 2. Embedded default (compiled into the binary)
//!
//! An explicit path (`--rules`) skips both and must exist.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use super::types::Rule;
use crate::error::{Error, Result};
use crate::template::unknown_placeholders;

/// Embedded default rule table
pub(crate) const DEFAULT_RULES: &str = include_str!("../../../../config/rules.toml");

/// Data-dir override path
pub fn default_rules_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("eclaire").join("config").join("rules.toml"))
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    rules: Vec<Rule>,
}

/// Parse and validate a TOML rule table
pub(crate) fn parse_rules(content: &str) -> Result<Vec<Rule>> {
    let raw: RawTable = toml::from_str(content)?;
    validate(&raw.rules)?;
    Ok(raw.rules)
}

/// Read a table from an explicit path
pub(crate) fn read_rules(path: &Path) -> Result<Vec<Rule>> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read rules {}: {}", path.display(), e))
    })?;
    let rules = parse_rules(&content)?;
    info!(path = %path.display(), count = rules.len(), "Loaded rule table");
    Ok(rules)
}

/// Override if present and valid, otherwise the embedded table
pub(crate) fn load_rules() -> Result<(Vec<Rule>, Option<PathBuf>)> {
    if let Some(path) = default_rules_path() {
        if path.exists() {
            match read_rules(&path) {
                Ok(rules) => return Ok((rules, Some(path))),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring rule override");
                }
            }
        }
    }

    Ok((parse_rules(DEFAULT_RULES)?, None))
}

/// Structural checks run once at load
pub(crate) fn validate(rules: &[Rule]) -> Result<()> {
    if rules.is_empty() {
        return Err(Error::Config("rule table is empty".into()));
    }

    let mut seen = HashSet::new();
    for rule in rules {
        let id = rule.id.trim();
        if id.is_empty() {
            return Err(Error::Config("rule with empty id".into()));
        }
        if !seen.insert(id) {
            return Err(Error::Config(format!("duplicate rule id {}", id)));
        }
        if rule.when.is_empty() {
            return Err(Error::Config(format!("{}: no conditions", id)));
        }
        if rule.when.iter().any(|c| !c.value.is_finite()) {
            return Err(Error::Config(format!("{}: non-finite threshold", id)));
        }

        let action = &rule.action;
        if action.id.trim().is_empty() {
            return Err(Error::Config(format!("{}: action has no id", id)));
        }
        if !(action.step.is_finite() && action.step > 0.0) {
            return Err(Error::Config(format!("{}: step must be > 0", id)));
        }
        if !(action.min.is_finite() && action.max.is_finite() && action.min <= action.max) {
            return Err(Error::Config(format!("{}: min must be <= max", id)));
        }
        let (lo, hi) = action.family.hard_bounds();
        if action.min < lo || action.max > hi {
            return Err(Error::Config(format!(
                "{}: bounds [{}, {}] outside {} range [{}, {}]",
                id, action.min, action.max, action.family, lo, hi
            )));
        }
        if let Some(target) = action.target {
            if !(action.min..=action.max).contains(&target) {
                return Err(Error::Config(format!(
                    "{}: target {} outside [{}, {}]",
                    id, target, action.min, action.max
                )));
            }
        }

        for text in [&rule.title, &rule.reason, &rule.explanation, &action.label] {
            let unknown = unknown_placeholders(text);
            if !unknown.is_empty() {
                return Err(Error::Config(format!(
                    "{}: unknown placeholder(s) {}",
                    id,
                    unknown.join(", ")
                )));
            }
        }
    }

    Ok(())
}
