//! Numerical helpers and cohort statistics.
//!
//! The normal CDF uses the Abramowitz-Stegun 7.1.26 rational approximation
//! of `erf`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Domain;
use crate::norms::{MEAN_IQ, SD_IQ};
use crate::report::ScoredSession;

const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Round to the nearest integer, ties to even.
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Round to `places` decimal places, ties to even.
///
/// Rounds the exact binary value, not `value * 10^places`: fixed-precision
/// formatting is correctly rounded, and parsing the digits back yields the
/// nearest double.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// Round to the nearest integer (ties to even) and clamp into `[min, max]`.
pub fn round_clamped(value: f64, min: i32, max: i32) -> i32 {
    (round_half_even(value) as i32).clamp(min, max)
}

/// Standard normal cumulative distribution function.
///
/// Maximum absolute error is about 1.5e-7.
pub fn normal_cdf(z: f64) -> f64 {
    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

/// Percentile (0-100, one decimal) of a score on the composite scale.
pub fn percentile_of(score: f64) -> f64 {
    let z = (score - MEAN_IQ) / SD_IQ;
    round_to(normal_cdf(z) * 100.0, 1)
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation; `None` for an empty slice.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Summary across many scored sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortStats {
    /// Number of sessions summarized.
    pub sessions: usize,
    /// Mean FSIQ.
    pub mean_fsiq: f64,
    /// Population standard deviation of FSIQ.
    pub sd_fsiq: f64,
    /// Lowest FSIQ.
    pub min_fsiq: i32,
    /// Highest FSIQ.
    pub max_fsiq: i32,
    /// Mean age-adjusted index score per domain.
    pub mean_domain_scores: BTreeMap<Domain, f64>,
    /// Count of sessions per classification level.
    pub classification_counts: BTreeMap<String, usize>,
}

/// Summarize a batch of scored sessions. `None` when the batch is empty.
pub fn compute_cohort_stats(sessions: &[ScoredSession]) -> Option<CohortStats> {
    let fsiqs: Vec<f64> = sessions.iter().map(|s| f64::from(s.report.fsiq)).collect();
    let mean_fsiq = mean(&fsiqs)?;
    let sd_fsiq = std_dev(&fsiqs)?;

    let mut per_domain: BTreeMap<Domain, Vec<f64>> = BTreeMap::new();
    let mut classification_counts: BTreeMap<String, usize> = BTreeMap::new();
    for s in sessions {
        for (domain, score) in &s.report.domain_scores {
            per_domain.entry(*domain).or_default().push(f64::from(*score));
        }
        *classification_counts
            .entry(s.report.classification.level.clone())
            .or_default() += 1;
    }

    let mean_domain_scores = per_domain
        .into_iter()
        .filter_map(|(d, scores)| mean(&scores).map(|m| (d, m)))
        .collect();

    Some(CohortStats {
        sessions: sessions.len(),
        mean_fsiq,
        sd_fsiq,
        min_fsiq: sessions.iter().map(|s| s.report.fsiq).min().unwrap_or(0),
        max_fsiq: sessions.iter().map(|s| s.report.fsiq).max().unwrap_or(0),
        mean_domain_scores,
        classification_counts,
    })
}
