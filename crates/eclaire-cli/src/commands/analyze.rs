//! Analyze command

use anyhow::Result;

use eclaire_core::{
    AnalysisEngine, AnalysisResult, MetricKind, OutcomeProbabilities, RecommendedAction,
};

use crate::cli::InputArgs;

use super::load_input;

pub fn cmd_analyze(engine: &AnalysisEngine, input: &InputArgs, json: bool) -> Result<()> {
    let (snapshot, profile) = load_input(input)?;
    let result = engine.analyze(&snapshot, &profile)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result(&result);
    Ok(())
}

fn print_result(result: &AnalysisResult) {
    if result.data_quality.no_data {
        println!("📭 No expenses yet.");
        println!("   Add expenses to get personalized insights.");
        return;
    }

    println!("📊 Financial overview");
    println!("   ─────────────────────────────────────");
    for kind in MetricKind::all() {
        println!(
            "   {:<26} {:>10}",
            format!("{}:", kind.label()),
            kind.format(result.metrics.get(*kind))
        );
    }
    let quality = &result.data_quality;
    if quality.low_confidence {
        println!(
            "   ⚠️  {} month(s) of history, low confidence",
            quality.periods
        );
    } else {
        println!("   {} months of history", quality.periods);
    }

    println!();
    println!("🎲 Next period (behavior-based, not a market forecast)");
    println!(
        "   {}   Risk: {}",
        format_probabilities(&result.probabilities),
        result.risk
    );

    println!();
    if result.recommended_actions.is_empty() {
        println!("✅ No recommended actions. Keep it up!");
        return;
    }

    println!("💡 Recommended actions");
    for action in &result.recommended_actions {
        print_action(action);
    }
}

fn print_action(action: &RecommendedAction) {
    let control = &action.interactive;

    println!();
    println!(
        "   [{}] {} ({})",
        action.priority.as_str().to_uppercase(),
        action.title,
        action.rules.join(", ")
    );
    println!("      {}", action.reason);
    for metric in &action.metrics {
        println!("      • {}: {}", metric.label, metric.value);
    }
    println!(
        "      🎚️  {}: {}-{} {} (default {})",
        control.label, control.min, control.max, control.unit, control.default_value
    );
    println!(
        "      {}: {} → {}",
        action.before_after.metric, action.before_after.before, action.before_after.after
    );
    println!(
        "      {}   Risk: {}",
        format_probabilities(&action.outcome.probabilities),
        action.outcome.risk
    );
}

pub(crate) fn format_probabilities(p: &OutcomeProbabilities) -> String {
    format!("Loss {}% · Neutral {}% · Gain {}%", p.loss, p.neutral, p.gain)
}
