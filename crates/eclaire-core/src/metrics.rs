//! Metric calculator
//!
//! Derives normalized ratios from a snapshot. Every other component (rules,
//! probabilities, before/after projections, scenario previews) reads numbers
//! through [`compute_metrics`] so that all surfaces agree.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{ExpenseCategory, FinancialSnapshot};

/// Derived financial ratios for one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSet {
    /// max(0, income - expenses) / income
    pub savings_ratio: f64,
    /// discretionary spending / income
    pub discretionary_percentage: f64,
    /// Coefficient of variation of monthly totals (0 with < 2 months)
    pub expense_volatility: f64,
    /// trading capital / income
    pub trading_exposure: f64,
    /// investable funds / average monthly expenses
    pub emergency_fund_months: f64,
}

impl MetricSet {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::SavingsRatio => self.savings_ratio,
            MetricKind::DiscretionaryPercentage => self.discretionary_percentage,
            MetricKind::ExpenseVolatility => self.expense_volatility,
            MetricKind::TradingExposure => self.trading_exposure,
            MetricKind::EmergencyFundMonths => self.emergency_fund_months,
        }
    }
}

/// Names of the metrics rules can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    SavingsRatio,
    DiscretionaryPercentage,
    ExpenseVolatility,
    TradingExposure,
    EmergencyFundMonths,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SavingsRatio => "savings_ratio",
            Self::DiscretionaryPercentage => "discretionary_percentage",
            Self::ExpenseVolatility => "expense_volatility",
            Self::TradingExposure => "trading_exposure",
            Self::EmergencyFundMonths => "emergency_fund_months",
        }
    }

    pub fn all() -> &'static [MetricKind] {
        &[
            Self::SavingsRatio,
            Self::DiscretionaryPercentage,
            Self::ExpenseVolatility,
            Self::TradingExposure,
            Self::EmergencyFundMonths,
        ]
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::SavingsRatio => "Savings rate",
            Self::DiscretionaryPercentage => "Discretionary spending",
            Self::ExpenseVolatility => "Expense volatility",
            Self::TradingExposure => "Trading exposure",
            Self::EmergencyFundMonths => "Emergency fund coverage",
        }
    }

    /// Format a value of this metric for display
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::SavingsRatio | Self::DiscretionaryPercentage | Self::TradingExposure => {
                format_percent(value)
            }
            Self::ExpenseVolatility => format!("{:.2}", value),
            Self::EmergencyFundMonths => format_months(value),
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MetricKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown metric: {}", s))
    }
}

/// How much the metrics can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataQuality {
    /// Calendar months the ledger covers, including months without expenses
    pub periods: usize,
    pub expense_count: usize,
    /// Fewer than two periods: volatility is a defined zero, not "no volatility"
    pub low_confidence: bool,
    /// Empty ledger: render an "add data" state instead of insights
    pub no_data: bool,
}

/// Metrics plus the data quality flags they were computed under
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricReport {
    pub metrics: MetricSet,
    pub quality: DataQuality,
}

/// Compute all metrics for a snapshot.
///
/// Fails only on malformed input (see [`FinancialSnapshot::validate`]).
/// An empty ledger is not an error: every metric is zero and `no_data` is set.
pub fn compute_metrics(snapshot: &FinancialSnapshot) -> Result<MetricReport> {
    snapshot.validate()?;

    if snapshot.expenses.is_empty() {
        return Ok(MetricReport {
            metrics: MetricSet::default(),
            quality: DataQuality {
                periods: 0,
                expense_count: 0,
                low_confidence: true,
                no_data: true,
            },
        });
    }

    let income = snapshot.income;
    let total = snapshot.total_expenses();
    let discretionary = snapshot.category_total(ExpenseCategory::Discretionary);
    let periods = snapshot.period_totals();

    let average_period = periods.iter().sum::<f64>() / periods.len() as f64;
    let emergency_fund_months = if average_period > 0.0 {
        snapshot.investable_funds / average_period
    } else {
        0.0
    };

    let metrics = MetricSet {
        savings_ratio: round4((income - total).max(0.0) / income),
        discretionary_percentage: round4(discretionary / income),
        expense_volatility: round4(coefficient_of_variation(&periods)),
        trading_exposure: round4(snapshot.trading_capital / income),
        emergency_fund_months: round4(emergency_fund_months),
    };

    let quality = DataQuality {
        periods: periods.len(),
        expense_count: snapshot.expenses.len(),
        low_confidence: periods.len() < 2,
        no_data: false,
    };

    debug!(
        savings_ratio = metrics.savings_ratio,
        discretionary = metrics.discretionary_percentage,
        volatility = metrics.expense_volatility,
        exposure = metrics.trading_exposure,
        periods = quality.periods,
        "Computed metrics"
    );

    Ok(MetricReport { metrics, quality })
}

/// Population standard deviation over mean. 0 with fewer than two values.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Ratio as a percentage clamped to [0, 100] for display
pub fn display_percent(ratio: f64) -> f64 {
    (ratio * 100.0).clamp(0.0, 100.0)
}

pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", display_percent(ratio))
}

pub fn format_months(months: f64) -> String {
    format!("{:.1} months", months.max(0.0))
}

/// Format a money amount as `$1,234` (negative as `-$1,234`)
pub fn format_money(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
