//! Scenario command

use anyhow::Result;

use eclaire_core::{Adjustment, AnalysisEngine, MetricKind, ScenarioFamily, ScenarioOutcome};

use crate::cli::InputArgs;

use super::analyze::format_probabilities;
use super::load_input;

pub fn cmd_scenario(
    engine: &AnalysisEngine,
    input: &InputArgs,
    family: &str,
    value: f64,
    rule: Option<&str>,
    json: bool,
) -> Result<()> {
    let family: ScenarioFamily = family.parse().map_err(anyhow::Error::msg)?;
    let (snapshot, profile) = load_input(input)?;

    let mut adjustment = Adjustment::new(family, value);
    if let Some(rule) = rule {
        adjustment = adjustment.for_rule(rule);
    }

    let outcome = engine.evaluate_scenario(&snapshot, &profile, &adjustment)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_outcome(&outcome, value);
    Ok(())
}

fn print_outcome(outcome: &ScenarioOutcome, requested: f64) {
    let adjustment = &outcome.adjustment;

    println!("🔮 What if: {} {}", adjustment.family, adjustment.value);
    if outcome.clamped {
        println!(
            "   ⚠️  {} is outside the safe range, using {}",
            requested, adjustment.value
        );
    }
    if let Some(rule) = &adjustment.rule {
        println!("   Bounded by rule {}", rule);
    }

    println!();
    println!("   {:<26} {:>10} {:>10}", "", "Before", "After");
    for kind in MetricKind::all() {
        println!(
            "   {:<26} {:>10} {:>10}",
            format!("{}:", kind.label()),
            kind.format(outcome.before.get(*kind)),
            kind.format(outcome.after.get(*kind))
        );
    }

    if let Some(projection) = &outcome.before_after {
        println!();
        println!(
            "   {}: {} → {}",
            projection.metric, projection.before, projection.after
        );
    }

    println!();
    println!(
        "🎲 {}   Risk: {}",
        format_probabilities(&outcome.estimate.probabilities),
        outcome.estimate.risk
    );
}
