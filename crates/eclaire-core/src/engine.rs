//! Analysis engine
//!
//! Composes the metric calculator, rule engine, recommendation synthesizer and
//! probability estimator into one stateless call. The engine holds nothing but
//! the read-only rule table, so a single instance can be shared across threads.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::contract::AnalysisRequest;
use crate::error::{Error, Result};
use crate::metrics::{compute_metrics, DataQuality, MetricSet};
use crate::models::{FinancialSnapshot, UserProfile};
use crate::probability::{estimate_outcomes, OutcomeEstimate, OutcomeProbabilities, RiskTier};
use crate::recommend::{synthesize, BeforeAfter, RecommendedAction};
use crate::rules::RuleTable;
use crate::scenario::{Adjustment, ScenarioOutcome};

/// Everything presentation needs for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metrics: MetricSet,
    pub probabilities: OutcomeProbabilities,
    pub risk: RiskTier,
    pub data_quality: DataQuality,
    /// Priority descending, then rule id ascending
    pub recommended_actions: Vec<RecommendedAction>,
}

#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    rules: RuleTable,
}

impl AnalysisEngine {
    /// Engine with the embedded rule table
    pub fn new() -> Result<Self> {
        Ok(Self::with_rules(RuleTable::builtin()?))
    }

    /// Engine with the data-dir override table if there is one
    pub fn load() -> Result<Self> {
        Ok(Self::with_rules(RuleTable::load()?))
    }

    pub fn with_rules_path(path: &Path) -> Result<Self> {
        Ok(Self::with_rules(RuleTable::with_path(path)?))
    }

    pub fn with_rules(rules: RuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Analyze one snapshot.
    ///
    /// Invalid input is rejected before any work is done. An empty ledger
    /// yields zero metrics, a fully neutral distribution and no actions.
    pub fn analyze(
        &self,
        snapshot: &FinancialSnapshot,
        profile: &UserProfile,
    ) -> Result<AnalysisResult> {
        let report = compute_metrics(snapshot)?;

        if report.quality.no_data {
            debug!("Empty ledger, returning no-data result");
            return Ok(AnalysisResult {
                metrics: report.metrics,
                probabilities: OutcomeProbabilities::neutral_only(),
                risk: RiskTier::Low,
                data_quality: report.quality,
                recommended_actions: Vec::new(),
            });
        }

        let triggered = self
            .rules
            .evaluate(&report.metrics, profile, &report.quality);
        let recommended_actions = synthesize(&triggered, &report, snapshot, profile)?;
        let baseline = estimate_outcomes(&report.metrics, None);

        debug!(
            periods = report.quality.periods,
            actions = recommended_actions.len(),
            loss = baseline.probabilities.loss,
            gain = baseline.probabilities.gain,
            risk = %baseline.risk,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            metrics: report.metrics,
            probabilities: baseline.probabilities,
            risk: baseline.risk,
            data_quality: report.quality,
            recommended_actions,
        })
    }

    /// Analyze a summary request (see [`AnalysisRequest::to_snapshot`])
    pub fn analyze_request(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let snapshot = request.to_snapshot()?;
        self.analyze(&snapshot, &request.profile)
    }

    /// Evaluate one what-if adjustment against a snapshot.
    ///
    /// When the adjustment names a rule, its value is clamped to that rule's
    /// safe bounds and the outcome carries the rule's before/after projection.
    /// Otherwise the family's hard bounds apply.
    pub fn evaluate_scenario(
        &self,
        snapshot: &FinancialSnapshot,
        profile: &UserProfile,
        adjustment: &Adjustment,
    ) -> Result<ScenarioOutcome> {
        let before = compute_metrics(snapshot)?;

        if !adjustment.value.is_finite() {
            return Err(Error::InvalidInput(format!(
                "{} adjustment must be a finite number",
                adjustment.family
            )));
        }

        let rule = match &adjustment.rule {
            Some(id) => {
                let rule = self
                    .rules
                    .get(id)
                    .ok_or_else(|| Error::InvalidInput(format!("Unknown rule: {}", id)))?;
                if rule.action.family != adjustment.family {
                    return Err(Error::InvalidInput(format!(
                        "Rule {} adjusts {}, not {}",
                        id, rule.action.family, adjustment.family
                    )));
                }
                Some(rule)
            }
            None => None,
        };

        let value = match rule {
            Some(rule) => rule.action.clamp(adjustment.value),
            None => {
                let (lo, hi) = adjustment.family.hard_bounds();
                adjustment.value.clamp(lo, hi)
            }
        };
        let applied = Adjustment {
            value,
            ..adjustment.clone()
        };

        let projected = applied.apply(snapshot)?;
        let after = compute_metrics(&projected)?;

        let delta = applied.delta();
        let estimate = if before.quality.no_data {
            OutcomeEstimate {
                probabilities: OutcomeProbabilities::neutral_only(),
                risk: delta.risk_tier(),
            }
        } else {
            estimate_outcomes(&before.metrics, Some(&delta))
        };

        let before_after = rule.map(|rule| {
            let display = rule.action.display;
            BeforeAfter {
                before: display.render(snapshot, &before.metrics),
                after: display.render(&projected, &after.metrics),
                metric: display.label().to_string(),
            }
        });

        debug!(
            family = %applied.family,
            requested = adjustment.value,
            value,
            risk = %estimate.risk,
            profile = %profile.risk_profile,
            "Evaluated scenario"
        );

        Ok(ScenarioOutcome {
            clamped: value != adjustment.value,
            adjustment: applied,
            before: before.metrics,
            after: after.metrics,
            estimate,
            before_after,
        })
    }
}
