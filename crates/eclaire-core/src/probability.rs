//! Probability estimator
//!
//! Maps a metric set to a three-way outcome distribution (loss / neutral / gain)
//! and a qualitative risk tier. The distribution is behavior-based: it reflects
//! the user's own savings and spending patterns, never market forecasts.
//!
//! ## Baseline
//!
//! A stability score in [-2, 2] selects one row of a fixed table:
//!
//! | score | loss | neutral | gain |
//! |-------|------|---------|------|
//! |   2   |  15  |   25    |  60  |
//! |   1   |  25  |   35    |  40  |
//! |   0   |  40  |   35    |  25  |
//! |  -1   |  55  |   30    |  15  |
//! |  -2   |  70  |   20    |  10  |
//!
//! ## Scenarios
//!
//! Each scenario family shifts loss and gain linearly with the adjustment,
//! clamped to [5, ceiling]. Neutral takes whatever is left but never less than
//! 5; if loss and gain leave less than that, their parts above 5 shrink
//! proportionally first.

use serde::{Deserialize, Serialize};

use crate::metrics::MetricSet;

/// Lowest share any bucket may show under a scenario
pub const BUCKET_FLOOR: f64 = 5.0;

/// Outcome distribution in whole percentages, always summing to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub loss: u8,
    pub neutral: u8,
    pub gain: u8,
}

impl OutcomeProbabilities {
    /// Build from unrounded loss/gain shares.
    ///
    /// Non-negative shares that overflow 100 are rescaled proportionally.
    /// Rounding residue lands in `neutral`.
    pub fn from_shares(loss: f64, gain: f64) -> Self {
        Self::with_neutral_floor(loss, gain, 0.0)
    }

    /// Like [`from_shares`](Self::from_shares), but keeps at least `floor`
    /// for every bucket. Loss and gain are raised to the floor, and when they
    /// leave less than `floor` for neutral only their parts above the floor
    /// shrink, proportionally.
    pub fn with_neutral_floor(loss: f64, gain: f64, floor: f64) -> Self {
        let floor = if floor.is_finite() {
            floor.clamp(0.0, 100.0 / 3.0)
        } else {
            0.0
        };
        let mut loss = if loss.is_finite() { loss.max(floor) } else { floor };
        let mut gain = if gain.is_finite() { gain.max(floor) } else { floor };

        let budget = 100.0 - floor;
        let combined = loss + gain;
        if combined > budget {
            let scale = (budget - 2.0 * floor) / (combined - 2.0 * floor);
            loss = floor + (loss - floor) * scale;
            gain = floor + (gain - floor) * scale;
        }

        // When both round up, loss gives the point back so neutral keeps its floor
        let ceiling = budget.floor() as u8;
        let gain = (gain.round() as u8).min(ceiling);
        let loss = (loss.round() as u8).min(ceiling - gain);
        Self {
            loss,
            neutral: 100 - loss - gain,
            gain,
        }
    }

    /// Nothing to reason about: everything is neutral
    pub fn neutral_only() -> Self {
        Self {
            loss: 0,
            neutral: 100,
            gain: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.loss as u32 + self.neutral as u32 + self.gain as u32
    }
}

/// Remaining safe margin of a trajectory or adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kinds of hypothetical adjustment, each with its own response curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioFamily {
    /// Percent of discretionary spending cut (negative = spend more)
    SpendingReduction,
    /// Percentage points of trading exposure removed (negative = add exposure)
    TradingExposure,
    /// Months of expenses added to the emergency buffer
    EmergencyBuffer,
    /// Percent of income committed to regular investing
    InvestmentConsistency,
    /// Percent change in income
    IncomeChange,
    /// Unitless adjustment with a symmetric curve
    Generic,
}

impl ScenarioFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpendingReduction => "spending_reduction",
            Self::TradingExposure => "trading_exposure",
            Self::EmergencyBuffer => "emergency_buffer",
            Self::InvestmentConsistency => "investment_consistency",
            Self::IncomeChange => "income_change",
            Self::Generic => "generic",
        }
    }

    pub fn all() -> &'static [ScenarioFamily] {
        &[
            Self::SpendingReduction,
            Self::TradingExposure,
            Self::EmergencyBuffer,
            Self::InvestmentConsistency,
            Self::IncomeChange,
            Self::Generic,
        ]
    }

    /// Widest adjustment the family accepts at all
    pub fn hard_bounds(&self) -> (f64, f64) {
        match self {
            Self::SpendingReduction => (-100.0, 100.0),
            Self::TradingExposure => (-100.0, 100.0),
            Self::EmergencyBuffer => (-24.0, 24.0),
            Self::InvestmentConsistency => (0.0, 100.0),
            Self::IncomeChange => (-90.0, 200.0),
            Self::Generic => (-100.0, 100.0),
        }
    }

    fn curve(&self) -> ResponseCurve {
        match self {
            Self::SpendingReduction => ResponseCurve {
                loss_slope: -0.5,
                gain_slope: 0.75,
                ceiling: 75.0,
                moderate_at: 25.0,
                high_at: 40.0,
            },
            Self::TradingExposure => ResponseCurve {
                loss_slope: -0.6,
                gain_slope: -0.1,
                ceiling: 80.0,
                moderate_at: 5.0,
                high_at: 15.0,
            },
            Self::EmergencyBuffer => ResponseCurve {
                loss_slope: -4.0,
                gain_slope: 2.0,
                ceiling: 75.0,
                moderate_at: 1.0,
                high_at: 3.0,
            },
            Self::InvestmentConsistency => ResponseCurve {
                loss_slope: -0.3,
                gain_slope: 0.8,
                ceiling: 80.0,
                moderate_at: 15.0,
                high_at: 25.0,
            },
            Self::IncomeChange => ResponseCurve {
                loss_slope: -0.8,
                gain_slope: 0.6,
                ceiling: 80.0,
                moderate_at: 10.0,
                high_at: 20.0,
            },
            Self::Generic => ResponseCurve {
                loss_slope: -1.0,
                gain_slope: 1.0,
                ceiling: 75.0,
                moderate_at: 20.0,
                high_at: 35.0,
            },
        }
    }

    /// Adjustment oriented so that larger means less safe margin
    fn stress(&self, magnitude: f64) -> f64 {
        match self {
            // Deep cuts are hard to sustain, and so is spending more
            Self::SpendingReduction => magnitude.abs(),
            // Drawing down protection is the risky direction
            Self::TradingExposure | Self::EmergencyBuffer | Self::IncomeChange => -magnitude,
            Self::InvestmentConsistency => magnitude,
            Self::Generic => magnitude.abs(),
        }
    }
}

impl std::fmt::Display for ScenarioFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScenarioFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ScenarioFamily::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| format!("Unknown scenario family: {}", s))
    }
}

/// A hypothetical signed change to one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDelta {
    pub family: ScenarioFamily,
    pub magnitude: f64,
}

impl ScenarioDelta {
    pub fn new(family: ScenarioFamily, magnitude: f64) -> Self {
        Self { family, magnitude }
    }

    /// Risk tier from family-specific cut points on the adjustment itself
    pub fn risk_tier(&self) -> RiskTier {
        let curve = self.family.curve();
        let stress = self.family.stress(self.magnitude);
        if stress >= curve.high_at {
            RiskTier::High
        } else if stress >= curve.moderate_at {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ResponseCurve {
    /// Change in loss share per unit of adjustment
    loss_slope: f64,
    /// Change in gain share per unit of adjustment
    gain_slope: f64,
    ceiling: f64,
    moderate_at: f64,
    high_at: f64,
}

/// Distribution plus tier for one trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEstimate {
    pub probabilities: OutcomeProbabilities,
    pub risk: RiskTier,
}

/// Savings and stability of spending, in [-2, 2]
pub fn stability_score(metrics: &MetricSet) -> i8 {
    let mut score: i8 = 0;

    if metrics.savings_ratio >= 0.20 {
        score += 2;
    } else if metrics.savings_ratio >= 0.10 {
        score += 1;
    }

    if metrics.expense_volatility > 0.30 {
        score -= 2;
    } else if metrics.expense_volatility > 0.15 {
        score -= 1;
    }

    if metrics.trading_exposure > 0.20 {
        score -= 1;
    }

    score.clamp(-2, 2)
}

/// (loss, gain) of the as-is trajectory
fn baseline_shares(metrics: &MetricSet) -> (f64, f64) {
    match stability_score(metrics) {
        2 => (15.0, 60.0),
        1 => (25.0, 40.0),
        0 => (40.0, 25.0),
        -1 => (55.0, 15.0),
        _ => (70.0, 10.0),
    }
}

/// Tier of the as-is trajectory, from current trading exposure
fn baseline_tier(metrics: &MetricSet) -> RiskTier {
    if metrics.trading_exposure > 0.20 {
        RiskTier::High
    } else if metrics.trading_exposure > 0.10 {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}

/// Estimate outcomes for the as-is trajectory, or under a scenario delta
pub fn estimate_outcomes(metrics: &MetricSet, delta: Option<&ScenarioDelta>) -> OutcomeEstimate {
    let (base_loss, base_gain) = baseline_shares(metrics);

    let Some(delta) = delta else {
        return OutcomeEstimate {
            probabilities: OutcomeProbabilities::from_shares(base_loss, base_gain),
            risk: baseline_tier(metrics),
        };
    };

    let curve = delta.family.curve();
    let magnitude = if delta.magnitude.is_finite() {
        delta.magnitude
    } else {
        0.0
    };

    let loss = (base_loss + curve.loss_slope * magnitude).clamp(BUCKET_FLOOR, curve.ceiling);
    let gain = (base_gain + curve.gain_slope * magnitude).clamp(BUCKET_FLOOR, curve.ceiling);

    OutcomeEstimate {
        probabilities: OutcomeProbabilities::with_neutral_floor(loss, gain, BUCKET_FLOOR),
        risk: delta.risk_tier(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(savings: f64, volatility: f64) -> MetricSet {
        MetricSet {
            savings_ratio: savings,
            expense_volatility: volatility,
            ..Default::default()
        }
    }

    #[test]
    fn test_baseline_table() {
        let est = estimate_outcomes(&metrics(0.25, 0.0), None);
        assert_eq!(
            est.probabilities,
            OutcomeProbabilities {
                loss: 15,
                neutral: 25,
                gain: 60
            }
        );

        let est = estimate_outcomes(&metrics(0.0, 0.5), None);
        assert_eq!(est.probabilities.loss, 70);
        assert_eq!(est.probabilities.gain, 10);
    }

    #[test]
    fn test_trading_exposure_penalizes_score() {
        let calm = metrics(0.25, 0.0);
        let exposed = MetricSet {
            trading_exposure: 0.35,
            ..calm
        };
        assert_eq!(stability_score(&calm), 2);
        assert_eq!(stability_score(&exposed), 1);
        assert_eq!(estimate_outcomes(&exposed, None).risk, RiskTier::High);
    }

    #[test]
    fn test_from_shares_reconciles_rounding() {
        let p = OutcomeProbabilities::from_shares(33.5, 33.5);
        assert_eq!(p.total(), 100);
        assert_eq!(p.neutral, 100 - p.loss - p.gain);

        // Overflow is rescaled, not clipped into a negative neutral
        let p = OutcomeProbabilities::from_shares(80.0, 80.0);
        assert_eq!(p.total(), 100);
        assert_eq!(p.loss, 50);
        assert_eq!(p.gain, 50);
        assert_eq!(p.neutral, 0);

        // Both round up: loss gives the point back, neutral cannot go negative
        let p = OutcomeProbabilities::from_shares(50.5, 49.5);
        assert_eq!((p.loss, p.neutral, p.gain), (50, 0, 50));
    }

    #[test]
    fn test_neutral_floor_reserved() {
        let p = OutcomeProbabilities::with_neutral_floor(70.0, 80.0, BUCKET_FLOOR);
        assert_eq!(p.total(), 100);
        assert!(p.neutral >= 5);
        assert!(p.loss >= 5 && p.gain >= 5);
        assert!(p.gain > p.loss);

        let p = OutcomeProbabilities::with_neutral_floor(47.5, 47.5, BUCKET_FLOOR);
        assert_eq!((p.loss, p.neutral, p.gain), (47, 5, 48));
    }

    #[test]
    fn test_investment_on_unstable_baseline_keeps_neutral() {
        // score -2 baseline is 70/20/10; +100 pushes gain to its 80 ceiling
        let delta = ScenarioDelta::new(ScenarioFamily::InvestmentConsistency, 100.0);
        let p = estimate_outcomes(&metrics(0.0, 0.5), Some(&delta)).probabilities;
        assert_eq!(p.total(), 100);
        assert!(p.neutral >= 5, "{:?}", p);
    }

    #[test]
    fn test_scenario_buckets_stay_within_bounds() {
        for family in ScenarioFamily::all() {
            let (lo, hi) = family.hard_bounds();
            let mut value = lo;
            while value <= hi {
                let delta = ScenarioDelta::new(*family, value);
                for base in [metrics(0.0, 0.5), metrics(0.25, 0.0), metrics(0.12, 0.2)] {
                    let p = estimate_outcomes(&base, Some(&delta)).probabilities;
                    assert_eq!(p.total(), 100, "{:?} at {}", family, value);
                    assert!(p.loss >= 5 && p.loss <= 80, "{:?} at {}", family, value);
                    assert!(p.gain >= 5 && p.gain <= 80, "{:?} at {}", family, value);
                    assert!(p.neutral >= 5, "{:?} at {}", family, value);
                }
                value += 2.5;
            }
        }
    }

    #[test]
    fn test_spending_reduction_gain_is_monotonic() {
        let base = metrics(0.05, 0.2);
        let mut previous = 0u8;
        for step in 0..=100 {
            let delta = ScenarioDelta::new(ScenarioFamily::SpendingReduction, step as f64);
            let gain = estimate_outcomes(&base, Some(&delta)).probabilities.gain;
            assert!(gain >= previous, "gain dropped at {}", step);
            previous = gain;
        }
    }

    #[test]
    fn test_risk_tier_cut_points() {
        let tier = |family, value| ScenarioDelta::new(family, value).risk_tier();

        assert_eq!(tier(ScenarioFamily::SpendingReduction, 10.0), RiskTier::Low);
        assert_eq!(tier(ScenarioFamily::SpendingReduction, 30.0), RiskTier::Moderate);
        assert_eq!(tier(ScenarioFamily::SpendingReduction, 45.0), RiskTier::High);

        // Reducing exposure is safe; adding it is not
        assert_eq!(tier(ScenarioFamily::TradingExposure, 40.0), RiskTier::Low);
        assert_eq!(tier(ScenarioFamily::TradingExposure, -10.0), RiskTier::Moderate);
        assert_eq!(tier(ScenarioFamily::TradingExposure, -20.0), RiskTier::High);

        assert_eq!(tier(ScenarioFamily::IncomeChange, 10.0), RiskTier::Low);
        assert_eq!(tier(ScenarioFamily::IncomeChange, -25.0), RiskTier::High);
    }

    #[test]
    fn test_generic_curve_matches_slider_preview() {
        // loss 40 - 10 = 30, gain 25 + 10 = 35
        let delta = ScenarioDelta::new(ScenarioFamily::Generic, 10.0);
        let p = estimate_outcomes(&metrics(0.0, 0.0), Some(&delta)).probabilities;
        assert_eq!((p.loss, p.neutral, p.gain), (30, 35, 35));
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!(
            "spending-reduction".parse::<ScenarioFamily>().unwrap(),
            ScenarioFamily::SpendingReduction
        );
        assert!("moonshot".parse::<ScenarioFamily>().is_err());
    }
}
