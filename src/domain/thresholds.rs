// Per-parameter threshold classification
use crate::domain::reading::{Parameter, Reading};
use serde::Serialize;

/// Fine-grained per-parameter tier shown on widget badges and chart
/// overlays. `Neutral` is the "not monitoring" display state and is only
/// produced for unknown parameter names or absent data, never by the typed
/// classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionTier {
    Good,
    Moderate,
    Poor,
    Neutral,
}

impl ConditionTier {
    /// Translation key for the badge text next to each parameter.
    pub fn status_key(&self) -> &'static str {
        match self {
            ConditionTier::Good => "optimalLevel",
            ConditionTier::Moderate => "attentionNeeded",
            ConditionTier::Poor => "actionRequired",
            ConditionTier::Neutral => "notMonitoring",
        }
    }
}

/// Attention level driving the usage indicators. Narrower inner bands than
/// the tier classifier: a value can be `Good` yet already `Moderate` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageLevel {
    Low,
    Moderate,
    High,
}

/// Classify one parameter value into its display tier.
pub fn classify(parameter: Parameter, value: f64) -> ConditionTier {
    match parameter {
        Parameter::Ph => {
            if (6.5..=8.5).contains(&value) {
                ConditionTier::Good
            } else if (6.0..6.5).contains(&value) || (value > 8.5 && value <= 9.0) {
                ConditionTier::Moderate
            } else {
                ConditionTier::Poor
            }
        }
        Parameter::Tds => {
            if value < 300.0 {
                ConditionTier::Good
            } else if value < 600.0 {
                ConditionTier::Moderate
            } else {
                ConditionTier::Poor
            }
        }
        Parameter::Temperature => {
            if (10.0..=25.0).contains(&value) {
                ConditionTier::Good
            } else if (5.0..10.0).contains(&value) || (value > 25.0 && value <= 30.0) {
                ConditionTier::Moderate
            } else {
                ConditionTier::Poor
            }
        }
    }
}

/// Name-based entry point. Unknown parameter names fail soft as `Neutral`;
/// they are a display state, not an error.
pub fn classify_named(name: &str, value: f64) -> ConditionTier {
    match Parameter::from_wire_name(name) {
        Some(parameter) => classify(parameter, value),
        None => ConditionTier::Neutral,
    }
}

/// Worst tier across the three parameters of a reading.
pub fn overall(reading: &Reading) -> ConditionTier {
    let tiers = [
        classify(Parameter::Ph, reading.ph),
        classify(Parameter::Tds, reading.tds),
        classify(Parameter::Temperature, reading.temperature),
    ];

    if tiers.contains(&ConditionTier::Poor) {
        ConditionTier::Poor
    } else if tiers.contains(&ConditionTier::Moderate) {
        ConditionTier::Moderate
    } else {
        ConditionTier::Good
    }
}

/// Attention level for the per-parameter usage indicators.
pub fn usage_level(parameter: Parameter, value: f64) -> UsageLevel {
    match parameter {
        Parameter::Ph => {
            if value < 6.5 || value > 8.5 {
                UsageLevel::High
            } else if value < 6.8 || value > 8.2 {
                UsageLevel::Moderate
            } else {
                UsageLevel::Low
            }
        }
        Parameter::Tds => {
            if value >= 600.0 {
                UsageLevel::High
            } else if value >= 300.0 {
                UsageLevel::Moderate
            } else {
                UsageLevel::Low
            }
        }
        Parameter::Temperature => {
            if value < 10.0 || value > 25.0 {
                UsageLevel::High
            } else if value < 15.0 || value > 22.0 {
                UsageLevel::Moderate
            } else {
                UsageLevel::Low
            }
        }
    }
}

/// Optimal band drawn as chart reference lines and used to flag
/// out-of-range points.
pub fn optimal_range(parameter: Parameter) -> (f64, f64) {
    match parameter {
        Parameter::Ph => (6.5, 8.5),
        Parameter::Tds => (0.0, 300.0),
        Parameter::Temperature => (10.0, 25.0),
    }
}
