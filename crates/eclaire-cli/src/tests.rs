//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use eclaire_core::{AnalysisEngine, ExpenseCategory, Goal, IncomeType, RiskProfile};
use tempfile::NamedTempFile;

use crate::cli::{Cli, Commands, InputArgs};
use crate::commands;

fn engine() -> AnalysisEngine {
    AnalysisEngine::new().unwrap()
}

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn file_input(path: PathBuf) -> InputArgs {
    InputArgs {
        file: Some(path),
        ..Default::default()
    }
}

const REQUEST_JSON: &str = r#"{
    "income": 5000,
    "monthly_expenses": [4000],
    "discretionary_expenses": 800,
    "profile": {"risk_profile": "conservative"}
}"#;

const LEDGER_CSV: &str = "id,amount,category,description,date
rent-1,1800,essentials,Rent,2026-01-01
,450,discretionary,Dinner out,2026-01-14
rent-2,1800,essentials,Rent,2026-02-01T00:00:00Z
cinema,120,discretionary,Cinema,02/20/2026
";

// ========== Input Loading Tests ==========

#[test]
fn test_load_summary_request() {
    let file = write_temp(".json", REQUEST_JSON);
    let (snapshot, profile) = commands::load_input(&file_input(file.path().into())).unwrap();

    assert_eq!(snapshot.income, 5000.0);
    assert_eq!(snapshot.investable_funds, 5000.0);
    assert_eq!(snapshot.category_total(ExpenseCategory::Discretionary), 800.0);
    assert_eq!(profile.risk_profile, RiskProfile::Conservative);
}

#[test]
fn test_load_ledger_file() {
    let file = write_temp(
        ".json",
        r#"{
            "snapshot": {
                "income": 3000,
                "expenses": [{
                    "id": "a",
                    "amount": 500,
                    "category": "essentials",
                    "date": "2026-03-01T00:00:00Z"
                }]
            },
            "profile": {"income_type": "freelance"}
        }"#,
    );
    let (snapshot, profile) = commands::load_input(&file_input(file.path().into())).unwrap();

    assert_eq!(snapshot.expenses.len(), 1);
    assert_eq!(profile.income_type, IncomeType::Freelance);
}

#[test]
fn test_load_bare_snapshot() {
    let file = write_temp(".json", r#"{"income": 2000, "trading_capital": 100}"#);
    let (snapshot, _) = commands::load_input(&file_input(file.path().into())).unwrap();
    assert_eq!(snapshot.trading_capital, 100.0);
    assert!(snapshot.expenses.is_empty());
}

#[test]
fn test_flags_override_file() {
    let file = write_temp(".json", REQUEST_JSON);
    let input = InputArgs {
        file: Some(file.path().into()),
        trading_capital: Some(750.0),
        risk: Some("aggressive".into()),
        goals: vec!["retirement".into(), "emergency-fund".into()],
        ..Default::default()
    };
    let (snapshot, profile) = commands::load_input(&input).unwrap();

    assert_eq!(snapshot.trading_capital, 750.0);
    assert_eq!(profile.risk_profile, RiskProfile::Aggressive);
    assert!(profile.has_goal(Goal::Retirement));
    assert!(profile.has_goal(Goal::EmergencyFund));
}

#[test]
fn test_unknown_profile_flag_rejected() {
    let file = write_temp(".json", REQUEST_JSON);
    let input = InputArgs {
        file: Some(file.path().into()),
        risk: Some("reckless".into()),
        ..Default::default()
    };
    assert!(commands::load_input(&input).is_err());
}

#[test]
fn test_invalid_json_rejected() {
    let file = write_temp(".json", "{not json");
    assert!(commands::load_input(&file_input(file.path().into())).is_err());
}

#[test]
fn test_read_ledger_csv() {
    let file = write_temp(".csv", LEDGER_CSV);
    let expenses = commands::read_ledger_csv(file.path()).unwrap();

    assert_eq!(expenses.len(), 4);
    assert_eq!(expenses[0].id, "rent-1");
    assert_eq!(expenses[1].id, "row-2");
    assert_eq!(expenses[1].category, ExpenseCategory::Discretionary);
    assert_eq!(expenses[3].period(), (2026, 2));
}

#[test]
fn test_csv_bad_category_rejected() {
    let file = write_temp(
        ".csv",
        "id,amount,category,description,date\na,10,luxury,Yacht,2026-01-01\n",
    );
    let err = commands::read_ledger_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_csv_bad_date_rejected() {
    let file = write_temp(
        ".csv",
        "id,amount,category,description,date\na,10,essentials,Rent,someday\n",
    );
    assert!(commands::read_ledger_csv(file.path()).is_err());
}

#[test]
fn test_csv_requires_income() {
    let file = write_temp(".csv", LEDGER_CSV);
    let input = InputArgs {
        csv: Some(file.path().into()),
        ..Default::default()
    };
    assert!(commands::load_input(&input).is_err());
}

#[test]
fn test_parse_date_formats() {
    assert!(commands::parse_date("2026-01-15").is_ok());
    assert!(commands::parse_date("01/15/2026").is_ok());
    assert!(commands::parse_date("2026-01-15T08:30:00+02:00").is_ok());
    assert!(commands::parse_date("15 Jan").is_err());
}

// ========== Command Tests ==========

#[test]
fn test_cmd_analyze_request() {
    let file = write_temp(".json", REQUEST_JSON);
    let input = file_input(file.path().into());
    assert!(commands::cmd_analyze(&engine(), &input, false).is_ok());
    assert!(commands::cmd_analyze(&engine(), &input, true).is_ok());
}

#[test]
fn test_cmd_analyze_csv() {
    let file = write_temp(".csv", LEDGER_CSV);
    let input = InputArgs {
        csv: Some(file.path().into()),
        income: Some(8000.0),
        trading_capital: Some(2000.0),
        ..Default::default()
    };
    assert!(commands::cmd_analyze(&engine(), &input, false).is_ok());
}

#[test]
fn test_cmd_analyze_empty_ledger() {
    let file = write_temp(".json", r#"{"income": 2000}"#);
    let result = commands::cmd_analyze(&engine(), &file_input(file.path().into()), false);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_analyze_invalid_income() {
    let file = write_temp(".json", r#"{"income": 0, "monthly_expenses": [100]}"#);
    let result = commands::cmd_analyze(&engine(), &file_input(file.path().into()), false);
    assert!(result.is_err());
}

#[test]
fn test_cmd_scenario() {
    let file = write_temp(".json", REQUEST_JSON);
    let input = file_input(file.path().into());

    let result = commands::cmd_scenario(
        &engine(),
        &input,
        "spending_reduction",
        40.0,
        Some("R001"),
        false,
    );
    assert!(result.is_ok());

    let result = commands::cmd_scenario(&engine(), &input, "income-change", -5.0, None, true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_scenario_unknown_family() {
    let file = write_temp(".json", REQUEST_JSON);
    let input = file_input(file.path().into());
    let result = commands::cmd_scenario(&engine(), &input, "lottery", 1.0, None, false);
    assert!(result.is_err());
}

#[test]
fn test_cmd_scenario_unknown_rule() {
    let file = write_temp(".json", REQUEST_JSON);
    let input = file_input(file.path().into());
    let result = commands::cmd_scenario(
        &engine(),
        &input,
        "spending_reduction",
        10.0,
        Some("R999"),
        false,
    );
    assert!(result.is_err());
}

#[test]
fn test_cmd_rules() {
    assert!(commands::cmd_rules(&engine()).is_ok());
}

#[test]
fn test_build_engine_missing_path() {
    let result = commands::build_engine(Some(std::path::Path::new("/nonexistent/rules.toml")));
    assert!(result.is_err());
}

#[test]
fn test_build_engine_default() {
    let engine = commands::build_engine(None).unwrap();
    assert!(!engine.rules().is_empty());
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_analyze_args() {
    let cli = Cli::try_parse_from([
        "eclaire",
        "analyze",
        "--csv",
        "ledger.csv",
        "--income",
        "5000",
        "--goals",
        "retirement,home",
        "--json",
    ])
    .unwrap();

    match cli.command {
        Commands::Analyze { input, json } => {
            assert!(json);
            assert_eq!(input.income, Some(5000.0));
            assert_eq!(input.goals, vec!["retirement", "home"]);
        }
        _ => panic!("expected analyze"),
    }
}

#[test]
fn test_parse_requires_input() {
    assert!(Cli::try_parse_from(["eclaire", "analyze"]).is_err());
    assert!(Cli::try_parse_from(["eclaire", "analyze", "--csv", "ledger.csv"]).is_err());
}

#[test]
fn test_parse_negative_scenario_value() {
    let cli = Cli::try_parse_from([
        "eclaire",
        "scenario",
        "--file",
        "s.json",
        "--family",
        "income_change",
        "--value",
        "-10",
    ])
    .unwrap();

    match cli.command {
        Commands::Scenario { value, .. } => assert_eq!(value, -10.0),
        _ => panic!("expected scenario"),
    }
}
