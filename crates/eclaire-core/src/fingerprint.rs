//! Snapshot fingerprints for external result caches
//!
//! Two snapshots with the same fingerprint produce the same analysis. Expense
//! order and descriptions do not affect the result, so they do not affect the
//! fingerprint either.

use sha2::{Digest, Sha256};

use crate::models::{FinancialSnapshot, UserProfile};

/// SHA-256 hex digest over the normalized snapshot and profile
pub fn fingerprint(snapshot: &FinancialSnapshot, profile: &UserProfile) -> String {
    let mut hasher = Sha256::new();

    hasher.update(normalize(snapshot.income).as_bytes());
    hasher.update(b"|");
    hasher.update(normalize(snapshot.trading_capital).as_bytes());
    hasher.update(b"|");
    hasher.update(normalize(snapshot.investable_funds).as_bytes());

    if let Some(span) = snapshot.covered_span() {
        hasher.update(b"|");
        hasher.update(span.start.format("%Y-%m").to_string().as_bytes());
        hasher.update(b"+");
        hasher.update(span.months.to_string().as_bytes());
    }

    let mut expenses: Vec<_> = snapshot.expenses.iter().collect();
    expenses.sort_by(|a, b| a.id.cmp(&b.id));
    for expense in expenses {
        hasher.update(b"\n");
        hasher.update(expense.id.as_bytes());
        hasher.update(b"|");
        hasher.update(normalize(expense.amount).as_bytes());
        hasher.update(b"|");
        hasher.update(expense.category.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(expense.date.format("%Y-%m").to_string().as_bytes());
    }

    hasher.update(b"\n");
    hasher.update(profile.risk_profile.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(profile.income_type.as_str().as_bytes());
    for goal in &profile.goals {
        hasher.update(b"|");
        hasher.update(goal.as_str().as_bytes());
    }

    hex::encode(hasher.finalize())
}

/// Amounts at 4 decimals, so float noise below the metric precision is ignored
fn normalize(value: f64) -> String {
    format!("{:.4}", value)
}
