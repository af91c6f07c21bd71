//! `{placeholder}` interpolation for rule reason/explanation text

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

/// Placeholders a rule template may use
pub const KNOWN_PLACEHOLDERS: &[&str] = &[
    "savings_ratio",
    "discretionary_percentage",
    "expense_volatility",
    "trading_exposure",
    "emergency_fund_months",
    "monthly_savings",
    "discretionary_total",
    "trading_capital",
    "investable_funds",
    "income",
    "periods",
    "threshold",
    "risk_profile",
    "income_type",
    "min",
    "max",
    "target",
    "unit",
];

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("valid regex"))
}

/// Names referenced by a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    placeholder_re()
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Placeholders in `template` that are not in [`KNOWN_PLACEHOLDERS`]
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|name| !KNOWN_PLACEHOLDERS.contains(name))
        .map(String::from)
        .collect()
}

/// Substitute values. Names without a value are left as written.
pub fn render(template: &str, values: &BTreeMap<&str, String>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            values
                .get(name)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let mut values = BTreeMap::new();
        values.insert("discretionary_percentage", "16.0%".to_string());
        values.insert("risk_profile", "moderate".to_string());

        let out = render(
            "Discretionary spending is {discretionary_percentage} for a {risk_profile} profile",
            &values,
        );
        assert_eq!(out, "Discretionary spending is 16.0% for a moderate profile");
    }

    #[test]
    fn test_missing_value_left_in_place() {
        let out = render("Target {target}", &BTreeMap::new());
        assert_eq!(out, "Target {target}");
    }

    #[test]
    fn test_unknown_placeholders() {
        assert!(unknown_placeholders("Save {monthly_savings} a month").is_empty());
        assert_eq!(unknown_placeholders("Hi {name}, {income}"), vec!["name"]);
        // Braces around non-identifiers are plain text
        assert!(unknown_placeholders("{ 12 } {A}").is_empty());
    }
}
