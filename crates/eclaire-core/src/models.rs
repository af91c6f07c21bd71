//! Domain models for Eclaire

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Spending category of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Essentials,
    Discretionary,
    Investments,
    Trading,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Essentials => "essentials",
            Self::Discretionary => "discretionary",
            Self::Investments => "investments",
            Self::Trading => "trading",
        }
    }

    pub fn all() -> &'static [ExpenseCategory] {
        &[
            Self::Essentials,
            Self::Discretionary,
            Self::Investments,
            Self::Trading,
        ]
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "essentials" | "essential" => Ok(Self::Essentials),
            "discretionary" => Ok(Self::Discretionary),
            "investments" | "investment" => Ok(Self::Investments),
            "trading" => Ok(Self::Trading),
            _ => Err(format!("Unknown expense category: {}", s)),
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ledger entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        id: impl Into<String>,
        amount: f64,
        category: ExpenseCategory,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            category,
            description: description.into(),
            date,
        }
    }

    /// Calendar month this expense belongs to
    pub fn period(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }
}

/// Longest ledger the engine accepts (100 years)
pub const MAX_PERIODS: u32 = 1200;

/// Calendar months a ledger covers, whether or not each had expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpan {
    /// Any day of the first month
    pub start: NaiveDate,
    pub months: u32,
}

impl PeriodSpan {
    pub fn new(start: NaiveDate, months: u32) -> Self {
        Self { start, months }
    }

    fn first(&self) -> i64 {
        month_index(self.start.year(), self.start.month())
    }

    fn last(&self) -> i64 {
        self.first() + i64::from(self.months) - 1
    }
}

fn month_index(year: i32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

/// Point-in-time financial input to the engine.
///
/// `income` is the declared income for the same horizon the ledger covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub income: f64,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub trading_capital: f64,
    #[serde(default)]
    pub investable_funds: f64,
    /// Months covered beyond the ones expenses fall in. Without it the ledger
    /// runs from its first to its last expense month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<PeriodSpan>,
}

impl FinancialSnapshot {
    pub fn new(income: f64) -> Self {
        Self {
            income,
            expenses: Vec::new(),
            trading_capital: 0.0,
            investable_funds: 0.0,
            span: None,
        }
    }

    pub fn with_expense(mut self, expense: Expense) -> Self {
        self.expenses.push(expense);
        self
    }

    pub fn with_trading_capital(mut self, amount: f64) -> Self {
        self.trading_capital = amount;
        self
    }

    pub fn with_investable_funds(mut self, amount: f64) -> Self {
        self.investable_funds = amount;
        self
    }

    pub fn with_span(mut self, span: PeriodSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    pub fn category_total(&self, category: ExpenseCategory) -> f64 {
        self.expenses
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.amount)
            .sum()
    }

    /// Smallest span holding both the declared span and every expense month
    pub fn covered_span(&self) -> Option<PeriodSpan> {
        let mut bounds = self
            .span
            .filter(|s| s.months > 0)
            .map(|s| (s.first(), s.last()));
        for expense in &self.expenses {
            let (year, month) = expense.period();
            let index = month_index(year, month);
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(index), hi.max(index)),
                None => (index, index),
            });
        }

        let (lo, hi) = bounds?;
        let year = i32::try_from(lo.div_euclid(12)).ok()?;
        let month = u32::try_from(lo.rem_euclid(12) + 1).ok()?;
        Some(PeriodSpan {
            start: NaiveDate::from_ymd_opt(year, month, 1)?,
            months: u32::try_from(hi - lo + 1).ok()?,
        })
    }

    /// Expense totals per calendar month of the covered span, oldest first.
    /// Months without expenses count as zero.
    pub fn period_totals(&self) -> Vec<f64> {
        let Some(span) = self.covered_span() else {
            return Vec::new();
        };
        let first = span.first();
        let mut totals = vec![0.0; span.months as usize];
        for expense in &self.expenses {
            let (year, month) = expense.period();
            let offset = month_index(year, month) - first;
            if let Some(slot) = usize::try_from(offset).ok().and_then(|i| totals.get_mut(i)) {
                *slot += expense.amount;
            }
        }
        totals
    }

    /// Reject anything the metric formulas cannot handle
    pub fn validate(&self) -> Result<()> {
        if !self.income.is_finite() || self.income <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "income must be a positive number (got {})",
                self.income
            )));
        }
        if !self.trading_capital.is_finite() || self.trading_capital < 0.0 {
            return Err(Error::InvalidInput(format!(
                "trading_capital must be non-negative (got {})",
                self.trading_capital
            )));
        }
        if !self.investable_funds.is_finite() || self.investable_funds < 0.0 {
            return Err(Error::InvalidInput(format!(
                "investable_funds must be non-negative (got {})",
                self.investable_funds
            )));
        }

        if let Some(span) = &self.span {
            if span.months == 0 {
                return Err(Error::InvalidInput("span must cover at least one month".into()));
            }
        }

        let mut seen = BTreeSet::new();
        for expense in &self.expenses {
            if expense.id.trim().is_empty() {
                return Err(Error::InvalidInput("expense id must not be empty".into()));
            }
            if !seen.insert(expense.id.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate expense id: {}",
                    expense.id
                )));
            }
            if !expense.amount.is_finite() || expense.amount <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "expense {} must have a positive amount (got {})",
                    expense.id, expense.amount
                )));
            }
        }

        if let Some(span) = self.covered_span() {
            if span.months > MAX_PERIODS {
                return Err(Error::InvalidInput(format!(
                    "ledger spans {} months (at most {})",
                    span.months, MAX_PERIODS
                )));
            }
        }

        Ok(())
    }
}

/// Stated tolerance for risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

impl std::str::FromStr for RiskProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            _ => Err(format!("Unknown risk profile: {}", s)),
        }
    }
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How income arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    #[default]
    Salary,
    Freelance,
    Business,
    Mixed,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Freelance => "freelance",
            Self::Business => "business",
            Self::Mixed => "mixed",
        }
    }

    /// Anything other than a salary needs a larger buffer
    pub fn is_variable(&self) -> bool {
        !matches!(self, Self::Salary)
    }
}

impl std::str::FromStr for IncomeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "salary" => Ok(Self::Salary),
            "freelance" => Ok(Self::Freelance),
            "business" => Ok(Self::Business),
            "mixed" => Ok(Self::Mixed),
            _ => Err(format!("Unknown income type: {}", s)),
        }
    }
}

impl std::fmt::Display for IncomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Financial goals a user can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[serde(alias = "emergency-fund")]
    EmergencyFund,
    Retirement,
    Home,
    Education,
    Travel,
    #[serde(alias = "debt-free")]
    DebtFree,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmergencyFund => "emergency_fund",
            Self::Retirement => "retirement",
            Self::Home => "home",
            Self::Education => "education",
            Self::Travel => "travel",
            Self::DebtFree => "debt_free",
        }
    }
}

impl std::str::FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "emergency_fund" => Ok(Self::EmergencyFund),
            "retirement" => Ok(Self::Retirement),
            "home" => Ok(Self::Home),
            "education" => Ok(Self::Education),
            "travel" => Ok(Self::Travel),
            "debt_free" => Ok(Self::DebtFree),
            _ => Err(format!("Unknown goal: {}", s)),
        }
    }
}

/// The user's declared profile, used by rule filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub risk_profile: RiskProfile,
    #[serde(default)]
    pub income_type: IncomeType,
    #[serde(default)]
    pub goals: BTreeSet<Goal>,
}

impl UserProfile {
    pub fn new(risk_profile: RiskProfile, income_type: IncomeType) -> Self {
        Self {
            risk_profile,
            income_type,
            goals: BTreeSet::new(),
        }
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.insert(goal);
        self
    }

    pub fn has_goal(&self, goal: Goal) -> bool {
        self.goals.contains(&goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_period_totals_group_by_month() {
        use ExpenseCategory::*;
        let snapshot = FinancialSnapshot::new(5000.0)
            .with_expense(Expense::new("a", 100.0, Essentials, "rent", at(2026, 1, 3)))
            .with_expense(Expense::new("b", 50.0, Discretionary, "cafe", at(2026, 1, 20)))
            .with_expense(Expense::new("c", 80.0, Essentials, "rent", at(2026, 2, 3)))
            .with_expense(Expense::new("d", 10.0, Trading, "fees", at(2025, 12, 30)));

        assert_eq!(snapshot.period_totals(), vec![10.0, 150.0, 80.0]);
        assert_eq!(snapshot.category_total(ExpenseCategory::Essentials), 180.0);
        assert_eq!(snapshot.total_expenses(), 240.0);
    }

    #[test]
    fn test_period_totals_fill_gaps_and_span() {
        use ExpenseCategory::*;
        let snapshot = FinancialSnapshot::new(5000.0)
            .with_expense(Expense::new("a", 100.0, Essentials, "rent", at(2026, 1, 3)))
            .with_expense(Expense::new("b", 300.0, Essentials, "rent", at(2026, 3, 3)));
        assert_eq!(snapshot.period_totals(), vec![100.0, 0.0, 300.0]);

        let start = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let spanned = snapshot.with_span(PeriodSpan::new(start, 5));
        assert_eq!(spanned.period_totals(), vec![0.0, 100.0, 0.0, 300.0, 0.0]);
        assert_eq!(spanned.covered_span(), Some(PeriodSpan::new(start, 5)));
    }

    #[test]
    fn test_span_validation() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let empty = FinancialSnapshot::new(100.0).with_span(PeriodSpan::new(start, 0));
        assert!(empty.validate().unwrap_err().is_invalid_input());

        let endless = FinancialSnapshot::new(100.0).with_span(PeriodSpan::new(start, 5000));
        assert!(endless.validate().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_validate_rejects_bad_amounts() {
        let snapshot = FinancialSnapshot::new(5000.0).with_expense(Expense::new(
            "a",
            -5.0,
            ExpenseCategory::Essentials,
            "",
            at(2026, 1, 1),
        ));
        assert!(snapshot.validate().unwrap_err().is_invalid_input());

        let snapshot = FinancialSnapshot::new(5000.0).with_expense(Expense::new(
            "a",
            f64::NAN,
            ExpenseCategory::Essentials,
            "",
            at(2026, 1, 1),
        ));
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let e = Expense::new("same", 5.0, ExpenseCategory::Essentials, "", at(2026, 1, 1));
        let snapshot = FinancialSnapshot::new(5000.0)
            .with_expense(e.clone())
            .with_expense(e);
        let err = snapshot.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_non_positive_income() {
        assert!(FinancialSnapshot::new(0.0).validate().is_err());
        assert!(FinancialSnapshot::new(-1.0).validate().is_err());
        assert!(FinancialSnapshot::new(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_profile_deserializes_ui_goal_ids() {
        let profile: UserProfile = serde_json::from_str(
            r#"{
                "risk_profile": "conservative",
                "income_type": "freelance",
                "goals": ["emergency-fund", "retirement"]
            }"#,
        )
        .unwrap();
        assert_eq!(profile.risk_profile, RiskProfile::Conservative);
        assert!(profile.income_type.is_variable());
        assert!(profile.has_goal(Goal::EmergencyFund));
        assert!(profile.has_goal(Goal::Retirement));
        assert!(!profile.has_goal(Goal::Home));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "Discretionary".parse::<ExpenseCategory>().unwrap(),
            ExpenseCategory::Discretionary
        );
        assert!("groceries".parse::<ExpenseCategory>().is_err());
    }
}
