//! Loading snapshots from JSON and CSV files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use eclaire_core::{
    AnalysisRequest, Expense, ExpenseCategory, FinancialSnapshot, Goal, IncomeType, RiskProfile,
    UserProfile,
};

use crate::cli::InputArgs;

/// `{"snapshot": ..., "profile": ...}`, the shape the ledger endpoint takes
#[derive(Debug, Deserialize)]
struct LedgerFile {
    snapshot: FinancialSnapshot,
    #[serde(default)]
    profile: UserProfile,
}

/// One row of an expense ledger CSV
#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(default)]
    id: String,
    amount: f64,
    category: String,
    #[serde(default)]
    description: String,
    date: String,
}

/// Resolve the input flags into a snapshot and profile
pub fn load_input(args: &InputArgs) -> Result<(FinancialSnapshot, UserProfile)> {
    let (mut snapshot, mut profile) = match (&args.file, &args.csv) {
        (Some(path), _) => read_json_input(path)?,
        (None, Some(path)) => {
            let income = args
                .income
                .context("--income is required when reading a CSV ledger")?;
            let mut snapshot = FinancialSnapshot::new(income).with_investable_funds(income);
            snapshot.expenses = read_ledger_csv(path)?;
            (snapshot, UserProfile::default())
        }
        (None, None) => bail!("Provide a snapshot with --file or a ledger with --csv"),
    };

    if let Some(income) = args.income {
        snapshot.income = income;
    }
    if let Some(capital) = args.trading_capital {
        snapshot.trading_capital = capital;
    }
    if let Some(funds) = args.investable_funds {
        snapshot.investable_funds = funds;
    }

    apply_profile_flags(&mut profile, args)?;

    Ok((snapshot, profile))
}

/// Read a JSON file in any of the accepted shapes:
/// a summary request (has `monthly_expenses`), a ledger file (has
/// `snapshot`), or a bare snapshot
pub fn read_json_input(path: &Path) -> Result<(FinancialSnapshot, UserProfile)> {
    let mut content = String::new();
    File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .read_to_string(&mut content)?;

    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if value.get("monthly_expenses").is_some() {
        let request: AnalysisRequest = serde_json::from_value(value)?;
        debug!(months = request.monthly_expenses.len(), "Read summary request");
        return Ok((request.to_snapshot()?, request.profile));
    }

    if value.get("snapshot").is_some() {
        let file: LedgerFile = serde_json::from_value(value)?;
        debug!(expenses = file.snapshot.expenses.len(), "Read ledger file");
        return Ok((file.snapshot, file.profile));
    }

    let snapshot: FinancialSnapshot = serde_json::from_value(value)?;
    debug!(expenses = snapshot.expenses.len(), "Read snapshot");
    Ok((snapshot, UserProfile::default()))
}

/// Read an expense ledger CSV with columns `id,amount,category,description,date`
///
/// `id` and `description` may be empty; a missing id becomes `row-N`.
pub fn read_ledger_csv(path: &Path) -> Result<Vec<Expense>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut expenses = Vec::new();
    for (i, row) in reader.deserialize::<LedgerRow>().enumerate() {
        let line = i + 2;
        let row = row.with_context(|| format!("Invalid ledger row at line {}", line))?;

        let category: ExpenseCategory = row
            .category
            .parse()
            .map_err(|e: String| anyhow::anyhow!("line {}: {}", line, e))?;
        let date = parse_date(&row.date).with_context(|| format!("line {}", line))?;
        let id = if row.id.is_empty() {
            format!("row-{}", i + 1)
        } else {
            row.id
        };

        expenses.push(Expense::new(id, row.amount, category, row.description, date));
    }

    debug!("Parsed {} ledger rows", expenses.len());
    Ok(expenses)
}

/// RFC 3339 timestamps or plain dates (taken as midnight UTC)
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%d", // 2026-01-15
        "%m/%d/%Y", // 01/15/2026
    ];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    bail!("Unable to parse date: {}", s)
}

fn apply_profile_flags(profile: &mut UserProfile, args: &InputArgs) -> Result<()> {
    if let Some(risk) = &args.risk {
        profile.risk_profile = risk.parse::<RiskProfile>().map_err(anyhow::Error::msg)?;
    }
    if let Some(income_type) = &args.income_type {
        profile.income_type = income_type
            .parse::<IncomeType>()
            .map_err(anyhow::Error::msg)?;
    }
    for goal in &args.goals {
        let goal = goal.trim();
        if goal.is_empty() {
            continue;
        }
        profile.goals.insert(goal.parse::<Goal>().map_err(anyhow::Error::msg)?);
    }
    Ok(())
}
