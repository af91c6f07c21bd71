//! Rule engine
//!
//! A static table of threshold rules over the metric set, filtered by the
//! user's profile and by how much history backs the metrics.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eclaire_core::rules::RuleTable;
//!
//! let table = RuleTable::load()?;
//! let triggered = table.evaluate(&report.metrics, &profile, &report.quality);
//! ```

pub mod config;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::metrics::{DataQuality, MetricSet};
use crate::models::UserProfile;

pub use config::default_rules_path;
pub use types::{
    ActionSpec, Comparison, Condition, IncomeFilter, Priority, ProfileFilter, Rule, RuleCategory,
    TriggeredRule,
};

/// The loaded, read-only rule table
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    source: Option<PathBuf>,
}

impl RuleTable {
    /// The embedded default table
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            rules: config::parse_rules(config::DEFAULT_RULES)?,
            source: None,
        })
    }

    /// Data-dir override if present and valid, otherwise the embedded table
    pub fn load() -> Result<Self> {
        let (rules, source) = config::load_rules()?;
        Ok(Self { rules, source })
    }

    /// Load from an explicit file
    pub fn with_path(path: &Path) -> Result<Self> {
        Ok(Self {
            rules: config::read_rules(path)?,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(Self {
            rules: config::parse_rules(content)?,
            source: None,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// File the table came from, `None` for the embedded one
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose predicate holds, priority descending then id ascending.
    ///
    /// Nothing fires on an empty ledger.
    pub fn evaluate(
        &self,
        metrics: &MetricSet,
        profile: &UserProfile,
        quality: &DataQuality,
    ) -> Vec<TriggeredRule<'_>> {
        if quality.no_data {
            return Vec::new();
        }

        let mut triggered: Vec<TriggeredRule<'_>> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(metrics, profile, quality.periods))
            .map(|rule| TriggeredRule { rule })
            .collect();

        triggered.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.id().cmp(b.id()))
        });

        debug!(
            evaluated = self.rules.len(),
            triggered = triggered.len(),
            "Evaluated rules"
        );

        triggered
    }
}
