//! Rules command

use anyhow::Result;

use eclaire_core::AnalysisEngine;

pub fn cmd_rules(engine: &AnalysisEngine) -> Result<()> {
    let table = engine.rules();

    match table.source() {
        Some(path) => println!("📜 Rule table: {} ({} rules)", path.display(), table.len()),
        None => println!("📜 Rule table: built-in ({} rules)", table.len()),
    }
    println!();

    for rule in table.rules() {
        let when: Vec<String> = rule.when.iter().map(|c| c.describe()).collect();

        println!(
            "   {} [{}] {:<10} {}",
            rule.id,
            rule.priority.as_str().to_uppercase(),
            rule.category.as_str(),
            rule.title
        );
        println!("      when {}", when.join(" and "));
        if rule.min_periods > 1 {
            println!("      needs {} months of history", rule.min_periods);
        }
        println!(
            "      slider {} ({}): {}-{} {}",
            rule.action.id,
            rule.action.family,
            rule.action.min,
            rule.action.max,
            rule.action.unit
        );
    }

    Ok(())
}
