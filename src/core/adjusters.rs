//! Condition multiplier table and battery-health adjustment.

/// Used for missing or unrecognized conditions.
pub const DEFAULT_CONDITION_FACTOR: f64 = 0.93;
const HEALTH_BASELINE_PCT: f64 = 90.0;
const HEALTH_SLOPE: f64 = 0.005;

// Keys are matched as given; callers normalize free-form labels.
const CONDITION_FACTORS: &[(&str, f64)] = &[
    ("NEW", 1.00),
    ("LIKE_NEW", 0.97),
    ("EXCELLENT", 0.96),
    ("GOOD", 0.93),
    ("FAIR", 0.85),
    ("POOR", 0.75),
    ("NEEDS_MAINTENANCE", 0.65),
    ("Used", 0.90),
    ("used", 0.90),
];

pub fn condition_factor(condition: Option<&str>) -> f64 {
    condition
        .map(str::trim)
        .and_then(|c| {
            CONDITION_FACTORS
                .iter()
                .find(|(key, _)| *key == c)
                .map(|(_, factor)| *factor)
        })
        .unwrap_or(DEFAULT_CONDITION_FACTOR)
}

/// `1 + (pct - 90) * 0.005`; missing health is neutral, not a penalty.
pub fn health_factor(health_pct: Option<f64>) -> f64 {
    match health_pct {
        Some(pct) => 1.0 + (pct.clamp(0.0, 100.0) - HEALTH_BASELINE_PCT) * HEALTH_SLOPE,
        None => 1.0,
    }
}
