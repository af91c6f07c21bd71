//! Request contract
//!
//! The summary payload presentation sends: declared income, a list of monthly
//! expense totals and how much of it was discretionary. It is expanded into a
//! ledger snapshot so that it flows through exactly the same metric formulas
//! as a full expense ledger.

use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseCategory, FinancialSnapshot, PeriodSpan, UserProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub income: f64,
    /// One total per month, oldest first
    #[serde(default)]
    pub monthly_expenses: Vec<f64>,
    /// Discretionary part of the sum of `monthly_expenses`
    #[serde(default)]
    pub discretionary_expenses: f64,
    #[serde(default)]
    pub trading_capital: f64,
    /// Defaults to `income` when omitted
    #[serde(default)]
    pub investable_funds: Option<f64>,
    #[serde(default)]
    pub profile: UserProfile,
}

impl AnalysisRequest {
    pub fn new(income: f64, monthly_expenses: Vec<f64>, discretionary_expenses: f64) -> Self {
        Self {
            income,
            monthly_expenses,
            discretionary_expenses,
            trading_capital: 0.0,
            investable_funds: None,
            profile: UserProfile::default(),
        }
    }

    /// Expand into a ledger snapshot.
    ///
    /// Month `i` is dated the first of the i-th month after 2000-01 so the
    /// result is deterministic. Discretionary spending is spread across months
    /// in proportion to each month's total. Every listed month is a period,
    /// including months with a zero total.
    pub fn to_snapshot(&self) -> Result<FinancialSnapshot> {
        if !self.discretionary_expenses.is_finite() || self.discretionary_expenses < 0.0 {
            return Err(Error::InvalidInput(format!(
                "discretionary_expenses must be non-negative (got {})",
                self.discretionary_expenses
            )));
        }
        for (i, amount) in self.monthly_expenses.iter().enumerate() {
            if !amount.is_finite() || *amount < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "monthly_expenses[{}] must be non-negative (got {})",
                    i, amount
                )));
            }
        }

        let total: f64 = self.monthly_expenses.iter().sum();
        if self.discretionary_expenses > total {
            return Err(Error::InvalidInput(format!(
                "discretionary_expenses ({}) exceeds total expenses ({})",
                self.discretionary_expenses, total
            )));
        }

        let mut snapshot = FinancialSnapshot::new(self.income)
            .with_trading_capital(self.trading_capital)
            .with_investable_funds(self.investable_funds.unwrap_or(self.income));

        if !self.monthly_expenses.is_empty() {
            let months = u32::try_from(self.monthly_expenses.len())
                .map_err(|_| Error::InvalidInput("too many months".into()))?;
            let start = NaiveDate::from_ymd_opt(2000, 1, 1)
                .ok_or_else(|| Error::InvalidInput("invalid epoch".into()))?;
            snapshot.span = Some(PeriodSpan::new(start, months));
        }

        let share = if total > 0.0 {
            self.discretionary_expenses / total
        } else {
            0.0
        };

        for (i, amount) in self.monthly_expenses.iter().enumerate() {
            let date = month_start(i)?;
            let discretionary = amount * share;
            let essentials = amount - discretionary;

            if essentials > 0.0 {
                snapshot.expenses.push(Expense::new(
                    format!("m{}-essentials", i),
                    essentials,
                    ExpenseCategory::Essentials,
                    "Monthly essentials",
                    date,
                ));
            }
            if discretionary > 0.0 {
                snapshot.expenses.push(Expense::new(
                    format!("m{}-discretionary", i),
                    discretionary,
                    ExpenseCategory::Discretionary,
                    "Monthly discretionary",
                    date,
                ));
            }
        }

        snapshot.validate()?;
        Ok(snapshot)
    }
}

fn month_start(offset: usize) -> Result<DateTime<Utc>> {
    let epoch = Utc
        .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::InvalidInput("invalid epoch".into()))?;
    let months = u32::try_from(offset)
        .map_err(|_| Error::InvalidInput("too many months".into()))?;
    epoch
        .checked_add_months(Months::new(months))
        .ok_or_else(|| Error::InvalidInput("too many months".into()))
}
