//! Integration tests for eclaire-core
//!
//! These tests exercise the full snapshot → metrics → rules → actions workflow
//! through the public API only.

use chrono::{TimeZone, Utc};
use eclaire_core::{
    Adjustment, AnalysisEngine, AnalysisRequest, Expense, ExpenseCategory, FinancialSnapshot,
    Goal, IncomeType, Priority, RiskProfile, RuleCategory, RuleTable, ScenarioFamily,
    UserProfile,
};

/// Six months of a household with irregular spending and a trading account
fn household_ledger() -> FinancialSnapshot {
    let monthly = [
        (1, 2100.0, 450.0),
        (2, 2100.0, 2400.0),
        (3, 2150.0, 300.0),
        (4, 2150.0, 3400.0),
        (5, 2200.0, 350.0),
        (6, 2200.0, 600.0),
    ];

    let mut snapshot = FinancialSnapshot::new(24_000.0)
        .with_trading_capital(7_500.0)
        .with_investable_funds(3_000.0);

    for (month, essentials, discretionary) in monthly {
        let date = Utc.with_ymd_and_hms(2026, month, 15, 0, 0, 0).unwrap();
        snapshot = snapshot
            .with_expense(Expense::new(
                format!("rent-{}", month),
                essentials,
                ExpenseCategory::Essentials,
                "Rent and bills",
                date,
            ))
            .with_expense(Expense::new(
                format!("fun-{}", month),
                discretionary,
                ExpenseCategory::Discretionary,
                "Dining and travel",
                date,
            ));
    }

    snapshot
}

fn engine() -> AnalysisEngine {
    AnalysisEngine::new().expect("embedded rule table is valid")
}

// =============================================================================
// Request contract
// =============================================================================

#[test]
fn test_discretionary_example_end_to_end() {
    let request = AnalysisRequest::new(5000.0, vec![4000.0], 800.0);
    let result = engine().analyze_request(&request).unwrap();

    assert_eq!(result.metrics.discretionary_percentage, 0.16);
    assert_eq!(result.metrics.savings_ratio, 0.2);

    let action = &result.recommended_actions[0];
    assert_eq!(action.priority, Priority::High);
    assert_eq!(action.category, RuleCategory::Spending);
    assert_eq!(action.rules, vec!["R001"]);
    assert_eq!(action.interactive.min, 10.0);
    assert_eq!(action.interactive.max, 15.0);
    let default = action.interactive.default_value;
    assert!((10.0..=15.0).contains(&default));
}

#[test]
fn test_request_json_round_trip_through_engine() {
    let request: AnalysisRequest = serde_json::from_str(
        r#"{
            "income": 5000,
            "monthly_expenses": [4000],
            "discretionary_expenses": 800,
            "profile": {"risk_profile": "aggressive", "income_type": "freelance",
                        "goals": ["emergency-fund"]}
        }"#,
    )
    .unwrap();

    assert_eq!(request.profile.risk_profile, RiskProfile::Aggressive);
    assert!(request.profile.has_goal(Goal::EmergencyFund));

    let result = engine().analyze_request(&request).unwrap();
    // Aggressive profiles are not nudged on a 16% discretionary share
    assert!(result
        .recommended_actions
        .iter()
        .all(|a| a.category != RuleCategory::Spending));
}

#[test]
fn test_zero_income_is_rejected_not_nan() {
    let request = AnalysisRequest::new(0.0, vec![100.0], 0.0);
    let err = engine().analyze_request(&request).unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(err.kind(), "invalid_input");
}

// =============================================================================
// Engine properties
// =============================================================================

#[test]
fn test_identical_snapshots_serialize_identically() {
    let engine = engine();
    let profile = UserProfile::new(RiskProfile::Moderate, IncomeType::Mixed);

    let first = engine.analyze(&household_ledger(), &profile).unwrap();
    let second = engine.analyze(&household_ledger(), &profile).unwrap();
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn test_household_ledger_actions() {
    let result = engine()
        .analyze(&household_ledger(), &UserProfile::default())
        .unwrap();

    assert_eq!(result.data_quality.periods, 6);
    assert!(!result.data_quality.low_confidence);
    assert!(result.metrics.expense_volatility > 0.25);
    assert!(result.metrics.trading_exposure > 0.30);

    let categories: Vec<RuleCategory> = result
        .recommended_actions
        .iter()
        .map(|a| a.category)
        .collect();
    assert!(categories.contains(&RuleCategory::Patterns));
    assert!(categories.contains(&RuleCategory::Trading));

    // One action per category, ordered by priority then rule id
    let mut seen = std::collections::BTreeSet::new();
    for action in &result.recommended_actions {
        assert!(seen.insert(action.category), "duplicate {}", action.category);
    }
    for pair in result.recommended_actions.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.priority > b.priority || (a.priority == b.priority && a.rules[0] < b.rules[0]));
    }

    // Trading cites both the high and the medium rule
    let trading = result
        .recommended_actions
        .iter()
        .find(|a| a.category == RuleCategory::Trading)
        .unwrap();
    assert_eq!(trading.priority, Priority::High);
    assert_eq!(trading.rules, vec!["R023", "R024"]);
}

#[test]
fn test_probabilities_always_sum_to_100() {
    let engine = engine();
    let profile = UserProfile::default();

    for income in [3_000.0, 12_000.0, 24_000.0, 80_000.0] {
        let mut snapshot = household_ledger();
        snapshot.income = income;
        let result = engine.analyze(&snapshot, &profile).unwrap();
        assert_eq!(result.probabilities.total(), 100);
        for action in &result.recommended_actions {
            assert_eq!(action.outcome.probabilities.total(), 100);
        }

        for family in ScenarioFamily::all() {
            for value in [-50.0, -5.0, 0.0, 5.0, 25.0, 75.0] {
                let outcome = engine
                    .evaluate_scenario(&snapshot, &profile, &Adjustment::new(*family, value))
                    .unwrap();
                assert_eq!(outcome.estimate.probabilities.total(), 100);
            }
        }
    }
}

#[test]
fn test_savings_ratio_bounded() {
    let mut snapshot = household_ledger();
    snapshot.income = 1_000.0;
    let result = engine()
        .analyze(&snapshot, &UserProfile::default())
        .unwrap();
    assert_eq!(result.metrics.savings_ratio, 0.0);

    let result = engine()
        .analyze(&household_ledger(), &UserProfile::default())
        .unwrap();
    assert!(result.metrics.savings_ratio >= 0.0 && result.metrics.savings_ratio <= 1.0);
}

#[test]
fn test_spending_slider_gain_non_decreasing() {
    let engine = engine();
    let profile = UserProfile::default();
    let snapshot = household_ledger();

    let mut previous = 0;
    for step in 10..=15 {
        let adjustment =
            Adjustment::new(ScenarioFamily::SpendingReduction, step as f64).for_rule("R001");
        let outcome = engine
            .evaluate_scenario(&snapshot, &profile, &adjustment)
            .unwrap();
        assert!(outcome.estimate.probabilities.gain >= previous);
        previous = outcome.estimate.probabilities.gain;
    }
}

#[test]
fn test_empty_ledger_is_not_an_error() {
    let result = engine()
        .analyze(&FinancialSnapshot::new(2_500.0), &UserProfile::default())
        .unwrap();
    assert!(result.data_quality.no_data);
    assert!(result.recommended_actions.is_empty());
    assert_eq!(result.probabilities.neutral, 100);
}

// =============================================================================
// Rule table overrides
// =============================================================================

#[test]
fn test_custom_rule_table_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    std::fs::write(
        &path,
        r#"
[[rules]]
id = "X100"
category = "savings"
priority = "medium"
title = "Save a little more"
reason = "Savings rate is {savings_ratio}"
explanation = "Aim for {threshold}"
when = [{ metric = "savings_ratio", op = "lt", value = 0.5 }]

[rules.action]
id = "SAVE_MORE"
family = "spending_reduction"
label = "Reduce discretionary spending by"
unit = "%"
min = 1
max = 9
step = 2
display = "savings_rate"
"#,
    )
    .unwrap();

    let engine = AnalysisEngine::with_rules(RuleTable::with_path(&path).unwrap());
    let result = engine
        .analyze(&household_ledger(), &UserProfile::default())
        .unwrap();

    assert_eq!(result.recommended_actions.len(), 1);
    let action = &result.recommended_actions[0];
    assert_eq!(action.id, "SAVE_MORE");
    assert_eq!(action.explanation, "Aim for 50.0%");
    // midpoint 5 snapped to the step grid starting at 1
    assert_eq!(action.interactive.default_value, 5.0);
}

#[test]
fn test_broken_rule_table_is_config_error() {
    let err = RuleTable::from_toml("[[rules]]\nid = 3").unwrap_err();
    assert_eq!(err.kind(), "config");
}
