//! Static norm tables.
//!
//! Every constant the scoring pipeline depends on lives here so the tables
//! can be audited and tested on their own.

use serde::Serialize;

use crate::model::Domain;

/// Population mean of the composite scale.
pub const MEAN_IQ: f64 = 100.0;
/// Population standard deviation of the composite scale.
pub const SD_IQ: f64 = 15.0;

/// Mean of the per-domain scaled score.
pub const SCALED_MEAN: f64 = 10.0;
/// Standard deviation of the per-domain scaled score.
pub const SCALED_SD: f64 = 3.0;
/// Scaled score bounds.
pub const SCALED_MIN: i32 = 1;
pub const SCALED_MAX: i32 = 19;

/// Composite / index score bounds.
pub const COMPOSITE_MIN: i32 = 40;
pub const COMPOSITE_MAX: i32 = 160;

/// Raw score assigned to a domain that received no responses.
pub const RAW_MIDPOINT: f64 = 50.0;
/// Spread used to turn a 0-100 raw percentage into a z-score.
pub const RAW_SPREAD: f64 = 16.67;

/// Standard error of measurement, in composite points.
pub const SEM: f64 = 4.5;
/// Two-sided 95% z value.
pub const Z_95: f64 = 1.96;
/// Confidence level reported alongside the interval.
pub const CONFIDENCE_PERCENT: u8 = 95;

/// Number of items a complete session is expected to contain.
pub const EXPECTED_ITEMS: usize = 75;
/// Age assumed when the test taker's age is unknown.
pub const DEFAULT_AGE: u32 = 18;
/// Weight of a domain missing from [`DOMAIN_WEIGHTS`].
pub const FALLBACK_DOMAIN_WEIGHT: f64 = 0.2;

/// Processing Speed answers faster than this earn the large bonus.
pub const FAST_RESPONSE_SECS: f64 = 5.0;
/// Processing Speed answers faster than this earn the small bonus.
pub const QUICK_RESPONSE_SECS: f64 = 10.0;
pub const FAST_BONUS: f64 = 0.2;
pub const QUICK_BONUS: f64 = 0.1;

/// Age (years) to multiplier on the composite deviation from the mean.
pub static AGE_ADJUSTMENTS: [(u32, f64); 25] = [
    (6, 0.85),
    (7, 0.88),
    (8, 0.91),
    (9, 0.94),
    (10, 0.97),
    (11, 0.99),
    (12, 1.00),
    (13, 1.01),
    (14, 1.02),
    (15, 1.03),
    (16, 1.04),
    (17, 1.05),
    (18, 1.05),
    (19, 1.04),
    (20, 1.03),
    (21, 1.02),
    (22, 1.01),
    (23, 1.00),
    (24, 0.99),
    (25, 0.98),
    (26, 0.97),
    (27, 0.96),
    (28, 0.95),
    (29, 0.94),
    (30, 0.93),
];

/// Contribution of each domain to the full scale composite.
pub static DOMAIN_WEIGHTS: [(Domain, f64); 5] = [
    (Domain::VerbalComprehension, 0.25),
    (Domain::PerceptualReasoning, 0.25),
    (Domain::WorkingMemory, 0.20),
    (Domain::ProcessingSpeed, 0.15),
    (Domain::FluidReasoning, 0.15),
];

/// A qualitative band on the composite scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationBand {
    /// Inclusive lower bound; `None` for the catch-all bottom band.
    pub min: Option<f64>,
    pub level: &'static str,
    pub description: &'static str,
}

/// Classification bands, evaluated top-down.
pub static CLASSIFICATION_BANDS: [ClassificationBand; 8] = [
    ClassificationBand {
        min: Some(145.0),
        level: "Very Superior",
        description: "Genius or near genius",
    },
    ClassificationBand {
        min: Some(130.0),
        level: "Superior",
        description: "Gifted",
    },
    ClassificationBand {
        min: Some(120.0),
        level: "Very High",
        description: "Superior intelligence",
    },
    ClassificationBand {
        min: Some(110.0),
        level: "High Average",
        description: "Above average intelligence",
    },
    ClassificationBand {
        min: Some(90.0),
        level: "Average",
        description: "Normal intelligence",
    },
    ClassificationBand {
        min: Some(80.0),
        level: "Low Average",
        description: "Below average intelligence",
    },
    ClassificationBand {
        min: Some(70.0),
        level: "Borderline",
        description: "Borderline intellectual functioning",
    },
    ClassificationBand {
        min: None,
        level: "Extremely Low",
        description: "Intellectual disability",
    },
];

/// Age multiplier for `age`; 1.0 outside the table.
pub fn age_multiplier(age: u32) -> f64 {
    AGE_ADJUSTMENTS
        .iter()
        .find(|(a, _)| *a == age)
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

/// Whether `age` is covered by the norm table.
pub fn is_normed_age(age: u32) -> bool {
    AGE_ADJUSTMENTS.iter().any(|(a, _)| *a == age)
}

/// Full scale weight of `domain`.
pub fn domain_weight(domain: Domain) -> f64 {
    DOMAIN_WEIGHTS
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, w)| *w)
        .unwrap_or(FALLBACK_DOMAIN_WEIGHT)
}

/// Flynn-effect correction in composite points.
///
/// Norms are not tied to a standardization year yet, so no drift is applied.
pub fn no_flynn_correction() -> f64 {
    0.0
}
