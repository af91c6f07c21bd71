//! Recommendation synthesizer
//!
//! Turns triggered rules into ranked, explainable actions. Each action carries
//! one bounded slider whose default position is projected through the same
//! metric formulas as the overview, and an outcome estimate for that position.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::metrics::{compute_metrics, format_money, MetricKind, MetricReport};
use crate::models::{ExpenseCategory, FinancialSnapshot, UserProfile};
use crate::probability::{estimate_outcomes, OutcomeEstimate, ScenarioFamily};
use crate::rules::{Priority, Rule, RuleCategory, TriggeredRule};
use crate::scenario::Adjustment;
use crate::template::render;

/// A labelled, already formatted figure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricValue {
    pub label: String,
    pub value: String,
}

impl MetricValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Projection of one display metric at the slider's default position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeAfter {
    pub before: String,
    pub after: String,
    pub metric: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Slider,
}

/// The bounded parameter a user may explore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveControl {
    #[serde(rename = "type")]
    pub kind: ControlKind,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default_value: f64,
    pub unit: String,
    /// Formatted as-is value of the action's display metric
    pub current_value: String,
    /// Family to use when previewing a slider position
    pub scenario: ScenarioFamily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    pub id: String,
    pub title: String,
    pub category: RuleCategory,
    pub priority: Priority,
    pub reason: String,
    pub explanation: String,
    pub metrics: Vec<MetricValue>,
    /// Every triggered rule of this category, ascending
    pub rules: Vec<String>,
    pub before_after: BeforeAfter,
    pub interactive: InteractiveControl,
    /// Estimate at the slider's default position
    pub outcome: OutcomeEstimate,
}

/// Build one action per category from the triggered rules.
///
/// `triggered` must be ordered priority descending then id ascending, as
/// returned by [`RuleTable::evaluate`](crate::rules::RuleTable::evaluate).
/// Output keeps that order.
pub fn synthesize(
    triggered: &[TriggeredRule<'_>],
    report: &MetricReport,
    snapshot: &FinancialSnapshot,
    profile: &UserProfile,
) -> Result<Vec<RecommendedAction>> {
    let mut cited: BTreeMap<RuleCategory, BTreeSet<&str>> = BTreeMap::new();
    for t in triggered {
        cited.entry(t.category()).or_default().insert(t.id());
    }

    let mut seen = BTreeSet::new();
    let mut actions = Vec::new();
    for t in triggered {
        if !seen.insert(t.category()) {
            continue;
        }
        let rules = cited
            .get(&t.category())
            .map(|ids| ids.iter().map(|id| id.to_string()).collect())
            .unwrap_or_default();
        actions.push(build_action(t.rule, rules, report, snapshot, profile)?);
    }

    debug!(
        triggered = triggered.len(),
        actions = actions.len(),
        "Synthesized recommendations"
    );

    Ok(actions)
}

fn build_action(
    rule: &Rule,
    rules: Vec<String>,
    report: &MetricReport,
    snapshot: &FinancialSnapshot,
    profile: &UserProfile,
) -> Result<RecommendedAction> {
    let action = &rule.action;
    let default_value = action.default_value();
    let adjustment = Adjustment::new(action.family, default_value).for_rule(&rule.id);

    let projected = adjustment.apply(snapshot)?;
    let after = compute_metrics(&projected)?;

    let current = action.display.render(snapshot, &report.metrics);
    let before_after = BeforeAfter {
        before: current.clone(),
        after: action.display.render(&projected, &after.metrics),
        metric: action.display.label().to_string(),
    };

    let values = template_values(rule, report, snapshot, profile);

    Ok(RecommendedAction {
        id: action.id.clone(),
        title: render(&rule.title, &values),
        category: rule.category,
        priority: rule.priority,
        reason: render(&rule.reason, &values),
        explanation: render(&rule.explanation, &values),
        metrics: supporting_metrics(rule, report),
        rules,
        before_after,
        interactive: InteractiveControl {
            kind: ControlKind::Slider,
            label: render(&action.label, &values),
            min: action.min,
            max: action.max,
            step: action.step,
            default_value,
            unit: action.unit.clone(),
            current_value: current,
            scenario: action.family,
        },
        outcome: estimate_outcomes(&report.metrics, Some(&adjustment.delta())),
    })
}

/// Each metric the rule's conditions read, then the headline threshold
fn supporting_metrics(rule: &Rule, report: &MetricReport) -> Vec<MetricValue> {
    let mut kinds: Vec<MetricKind> = Vec::new();
    for condition in &rule.when {
        if !kinds.contains(&condition.metric) {
            kinds.push(condition.metric);
        }
    }

    let mut metrics: Vec<MetricValue> = kinds
        .into_iter()
        .map(|kind| MetricValue::new(kind.label(), kind.format(report.metrics.get(kind))))
        .collect();

    if let Some(headline) = rule.when.first() {
        metrics.push(MetricValue::new(
            "Threshold",
            headline.metric.format(headline.value),
        ));
    }
    if report.quality.low_confidence {
        metrics.push(MetricValue::new(
            "History",
            format!("{} month(s), low confidence", report.quality.periods),
        ));
    }

    metrics
}

fn template_values(
    rule: &Rule,
    report: &MetricReport,
    snapshot: &FinancialSnapshot,
    profile: &UserProfile,
) -> BTreeMap<&'static str, String> {
    let m = &report.metrics;
    let mut values = BTreeMap::new();

    for kind in MetricKind::all() {
        values.insert(kind.as_str(), kind.format(m.get(*kind)));
    }
    values.insert("monthly_savings", format_money(m.savings_ratio * snapshot.income));
    values.insert(
        "discretionary_total",
        format_money(snapshot.category_total(ExpenseCategory::Discretionary)),
    );
    values.insert("trading_capital", format_money(snapshot.trading_capital));
    values.insert("investable_funds", format_money(snapshot.investable_funds));
    values.insert("income", format_money(snapshot.income));
    values.insert("periods", report.quality.periods.to_string());
    values.insert("risk_profile", profile.risk_profile.as_str().to_string());
    values.insert("income_type", profile.income_type.as_str().to_string());

    if let Some(headline) = rule.when.first() {
        values.insert("threshold", headline.metric.format(headline.value));
    }

    let action = &rule.action;
    values.insert("min", format_step(action.min));
    values.insert("max", format_step(action.max));
    values.insert("target", format_step(action.default_value()));
    values.insert("unit", action.unit.clone());

    values
}

/// `12` rather than `12.0`, `0.5` as is
fn format_step(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
