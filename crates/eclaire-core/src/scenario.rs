//! What-if adjustments
//!
//! An [`Adjustment`] is applied to a copy of the snapshot; metrics are then
//! recomputed with the same [`compute_metrics`](crate::metrics::compute_metrics)
//! used for the as-is view, so a slider preview can never disagree with the
//! overview numbers.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::{format_money, format_months, format_percent, MetricSet};
use crate::models::{ExpenseCategory, FinancialSnapshot};
use crate::probability::{OutcomeEstimate, ScenarioDelta, ScenarioFamily};
use crate::recommend::BeforeAfter;

/// A hypothetical signed change to one parameter of the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub family: ScenarioFamily,
    pub value: f64,
    /// Rule whose safe bounds apply, if the adjustment comes from an action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Adjustment {
    pub fn new(family: ScenarioFamily, value: f64) -> Self {
        Self {
            family,
            value,
            rule: None,
        }
    }

    pub fn for_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule = Some(rule_id.into());
        self
    }

    pub fn delta(&self) -> ScenarioDelta {
        ScenarioDelta::new(self.family, self.value)
    }

    /// Copy of `snapshot` with the adjustment applied.
    ///
    /// The value is clamped to the family's hard bounds first.
    pub fn apply(&self, snapshot: &FinancialSnapshot) -> Result<FinancialSnapshot> {
        snapshot.validate()?;
        if !self.value.is_finite() {
            return Err(Error::InvalidInput(format!(
                "{} adjustment must be a finite number",
                self.family
            )));
        }
        let (lo, hi) = self.family.hard_bounds();
        let value = self.value.clamp(lo, hi);

        let mut adjusted = snapshot.clone();
        match self.family {
            ScenarioFamily::SpendingReduction => {
                let factor = 1.0 - value / 100.0;
                // Months emptied by the cut still count as periods
                adjusted.span = snapshot.covered_span();
                for expense in adjusted
                    .expenses
                    .iter_mut()
                    .filter(|e| e.category == ExpenseCategory::Discretionary)
                {
                    expense.amount *= factor;
                }
                adjusted.expenses.retain(|e| e.amount > 0.0);
            }
            ScenarioFamily::TradingExposure => {
                let removed = value / 100.0 * snapshot.income;
                adjusted.trading_capital = (snapshot.trading_capital - removed).max(0.0);
            }
            ScenarioFamily::EmergencyBuffer => {
                let periods = snapshot.period_totals();
                if !periods.is_empty() {
                    let average = periods.iter().sum::<f64>() / periods.len() as f64;
                    adjusted.investable_funds =
                        (snapshot.investable_funds + value * average).max(0.0);
                }
            }
            ScenarioFamily::InvestmentConsistency => {
                adjusted.investable_funds += value / 100.0 * snapshot.income;
            }
            ScenarioFamily::IncomeChange => {
                adjusted.income = snapshot.income * (1.0 + value / 100.0);
            }
            ScenarioFamily::Generic => {}
        }

        Ok(adjusted)
    }
}

/// Metric a before/after projection is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMetric {
    /// Money kept per period
    Savings,
    SavingsRate,
    DiscretionaryShare,
    DiscretionarySpending,
    TradingExposure,
    EmergencyFundMonths,
    InvestableFunds,
    ExpenseVolatility,
}

impl DisplayMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::SavingsRate => "savings_rate",
            Self::DiscretionaryShare => "discretionary_share",
            Self::DiscretionarySpending => "discretionary_spending",
            Self::TradingExposure => "trading_exposure",
            Self::EmergencyFundMonths => "emergency_fund_months",
            Self::InvestableFunds => "investable_funds",
            Self::ExpenseVolatility => "expense_volatility",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Savings => "Monthly savings",
            Self::SavingsRate => "Savings rate",
            Self::DiscretionaryShare => "Discretionary share",
            Self::DiscretionarySpending => "Discretionary spending",
            Self::TradingExposure => "Trading exposure",
            Self::EmergencyFundMonths => "Emergency fund",
            Self::InvestableFunds => "Investable funds",
            Self::ExpenseVolatility => "Expense volatility",
        }
    }

    pub fn value(&self, snapshot: &FinancialSnapshot, metrics: &MetricSet) -> f64 {
        match self {
            Self::Savings => metrics.savings_ratio * snapshot.income,
            Self::SavingsRate => metrics.savings_ratio,
            Self::DiscretionaryShare => metrics.discretionary_percentage,
            Self::DiscretionarySpending => metrics.discretionary_percentage * snapshot.income,
            Self::TradingExposure => metrics.trading_exposure,
            Self::EmergencyFundMonths => metrics.emergency_fund_months,
            Self::InvestableFunds => snapshot.investable_funds,
            Self::ExpenseVolatility => metrics.expense_volatility,
        }
    }

    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Savings | Self::DiscretionarySpending | Self::InvestableFunds => {
                format_money(value)
            }
            Self::SavingsRate | Self::DiscretionaryShare | Self::TradingExposure => {
                format_percent(value)
            }
            Self::EmergencyFundMonths => format_months(value),
            Self::ExpenseVolatility => format!("{:.2}", value),
        }
    }

    /// Formatted value for one snapshot
    pub fn render(&self, snapshot: &FinancialSnapshot, metrics: &MetricSet) -> String {
        self.format(self.value(snapshot, metrics))
    }
}

/// Result of evaluating one adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// The adjustment as applied, after clamping
    pub adjustment: Adjustment,
    /// True when the requested value was outside the safe bounds
    pub clamped: bool,
    pub before: MetricSet,
    pub after: MetricSet,
    pub estimate: OutcomeEstimate,
    /// Projection in the rule's display metric, when wired to a rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_after: Option<BeforeAfter>,
}
