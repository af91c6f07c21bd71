//! Rule table types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::metrics::{MetricKind, MetricSet};
use crate::models::{Goal, IncomeType, RiskProfile, UserProfile};
use crate::probability::ScenarioFamily;
use crate::scenario::DisplayMetric;

/// Rule priority. `High` rules are hard threshold breaches, `Medium` are
/// distance-to-target checks, `Low` are maintain-course affirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Area of the user's finances a rule speaks about. Recommended actions are
/// deduplicated per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Spending,
    Savings,
    Trading,
    EmergencyFund,
    Patterns,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Spending => "spending",
            RuleCategory::Savings => "savings",
            RuleCategory::Trading => "trading",
            RuleCategory::EmergencyFund => "emergency_fund",
            RuleCategory::Patterns => "patterns",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "spending" => Ok(RuleCategory::Spending),
            "savings" => Ok(RuleCategory::Savings),
            "trading" => Ok(RuleCategory::Trading),
            "emergency_fund" => Ok(RuleCategory::EmergencyFund),
            "patterns" => Ok(RuleCategory::Patterns),
            _ => Err(format!("Unknown rule category: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Ge => "≥",
            Comparison::Lt => "<",
            Comparison::Le => "≤",
        }
    }
}

/// `metric <op> value`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub metric: MetricKind,
    pub op: Comparison,
    pub value: f64,
}

impl Condition {
    pub fn holds(&self, metrics: &MetricSet) -> bool {
        self.op.holds(metrics.get(self.metric), self.value)
    }

    /// e.g. `discretionary_percentage > 15.0%`
    pub fn describe(&self) -> String {
        format!(
            "{} {} {}",
            self.metric.as_str(),
            self.op.symbol(),
            self.metric.format(self.value)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeFilter {
    #[default]
    Any,
    Salary,
    Variable,
}

impl IncomeFilter {
    pub fn matches(&self, income: IncomeType) -> bool {
        match self {
            IncomeFilter::Any => true,
            IncomeFilter::Salary => !income.is_variable(),
            IncomeFilter::Variable => income.is_variable(),
        }
    }
}

/// Which users a rule applies to. The default matches everyone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileFilter {
    /// Empty means any risk profile
    #[serde(default)]
    pub risk_profiles: Vec<RiskProfile>,
    #[serde(default)]
    pub income: IncomeFilter,
    #[serde(default)]
    pub requires_goal: Option<Goal>,
}

impl ProfileFilter {
    pub fn matches(&self, profile: &UserProfile) -> bool {
        let risk_ok =
            self.risk_profiles.is_empty() || self.risk_profiles.contains(&profile.risk_profile);
        let goal_ok = self.requires_goal.map_or(true, |g| profile.has_goal(g));
        risk_ok && goal_ok && self.income.matches(profile.income_type)
    }
}

/// The bounded adjustment a rule offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Stable action id shown to presentation (e.g. `REDUCE_DISCRETIONARY`)
    pub id: String,
    pub family: ScenarioFamily,
    /// Slider label
    pub label: String,
    pub unit: String,
    /// Safe bounds
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Default position; midpoint snapped to `step` when absent
    #[serde(default)]
    pub target: Option<f64>,
    /// Metric shown in the before/after projection
    pub display: DisplayMetric,
}

impl ActionSpec {
    pub fn default_value(&self) -> f64 {
        match self.target {
            Some(target) => target,
            None => {
                let mid = (self.min + self.max) / 2.0;
                let snapped = self.min + ((mid - self.min) / self.step).round() * self.step;
                snapped.clamp(self.min, self.max)
            }
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// A threshold rule over the metric set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub category: RuleCategory,
    pub priority: Priority,
    pub title: String,
    /// Template, see [`crate::template`]
    pub reason: String,
    /// Template, see [`crate::template`]
    pub explanation: String,
    /// All must hold. The first one is the rule's headline threshold.
    pub when: Vec<Condition>,
    #[serde(default)]
    pub profile: ProfileFilter,
    /// Minimum calendar months of history
    #[serde(default)]
    pub min_periods: usize,
    pub action: ActionSpec,
}

impl Rule {
    /// Value of the headline condition
    pub fn threshold(&self) -> Option<f64> {
        self.when.first().map(|c| c.value)
    }

    pub fn matches(&self, metrics: &MetricSet, profile: &UserProfile, periods: usize) -> bool {
        periods >= self.min_periods
            && self.profile.matches(profile)
            && self.when.iter().all(|c| c.holds(metrics))
    }
}

/// A rule whose predicate held for the current metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggeredRule<'a> {
    pub rule: &'a Rule,
}

impl<'a> TriggeredRule<'a> {
    pub fn id(&self) -> &'a str {
        &self.rule.id
    }

    pub fn priority(&self) -> Priority {
        self.rule.priority
    }

    pub fn category(&self) -> RuleCategory {
        self.rule.category
    }
}
