//! Eclaire Core Library
//!
//! The financial analysis engine behind every Eclaire surface:
//! - Metric calculator (savings ratio, discretionary share, volatility, exposure)
//! - Probability estimator (loss / neutral / gain with scenario response curves)
//! - Rule engine driven by a TOML rule table
//! - Recommendation synthesizer with bounded interactive controls
//! - Scenario evaluation ("what-if" sliders) reusing the same formulas
//! - Request contract and snapshot fingerprints for external caches
//!
//! The engine is pure: one snapshot in, one result out, no I/O and no shared
//! mutable state. Rule tables are the only thing read from disk, once at start-up.

pub mod contract;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod metrics;
pub mod models;
pub mod probability;
pub mod recommend;
pub mod rules;
pub mod scenario;
pub mod template;

pub use contract::AnalysisRequest;
pub use engine::{AnalysisEngine, AnalysisResult};
pub use error::{Error, Result};
pub use fingerprint::fingerprint;
pub use metrics::{compute_metrics, DataQuality, MetricKind, MetricReport, MetricSet};
pub use models::{
    Expense, ExpenseCategory, FinancialSnapshot, Goal, IncomeType, PeriodSpan, RiskProfile,
    UserProfile,
};
pub use probability::{
    estimate_outcomes, OutcomeEstimate, OutcomeProbabilities, RiskTier, ScenarioDelta,
    ScenarioFamily,
};
pub use recommend::{synthesize, BeforeAfter, InteractiveControl, MetricValue, RecommendedAction};
pub use rules::{Priority, Rule, RuleCategory, RuleTable, TriggeredRule};
pub use scenario::{Adjustment, DisplayMetric, ScenarioOutcome};
