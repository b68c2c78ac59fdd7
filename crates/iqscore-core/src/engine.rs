//! The scoring engine.
//!
//! Turns an ordered set of responses plus the test taker's age into a
//! [`ScoreReport`]. The pipeline runs in fixed stages:
//!
//! 1. per-domain raw score (difficulty weighted, speed bonus for Processing Speed)
//! 2. scaled score (mean 10, SD 3)
//! 3. composite index score (mean 100, SD 15)
//! 4. age adjustment
//! 5. weighted full scale composite (FSIQ)
//! 6. confidence interval
//! 7. percentile rank
//! 8. classification and reliability
//!
//! The engine holds no mutable state and does no I/O; one instance can score
//! any number of sessions from any number of threads.

use std::collections::BTreeMap;

use crate::error::InvalidInputError;
use crate::model::{resolve_domain, Domain, ResponseRecord, TestSession};
use crate::norms::{
    age_multiplier, domain_weight, no_flynn_correction, CLASSIFICATION_BANDS, COMPOSITE_MAX,
    COMPOSITE_MIN, CONFIDENCE_PERCENT, DEFAULT_AGE, EXPECTED_ITEMS, FAST_BONUS,
    FAST_RESPONSE_SECS, MEAN_IQ, QUICK_BONUS, QUICK_RESPONSE_SECS, RAW_MIDPOINT, RAW_SPREAD,
    SCALED_MAX, SCALED_MEAN, SCALED_MIN, SCALED_SD, SD_IQ, SEM, Z_95,
};
use crate::report::{
    Classification, ConfidenceInterval, Reliability, ReliabilityLevel, ScoreReport,
};
use crate::statistics::{normal_cdf, round_clamped, round_half_even, round_to};

/// Configuration for the scoring engine.
#[derive(Debug, Clone)]
pub struct ScoreEngineConfig {
    /// Age used when the caller does not know it.
    pub default_age: u32,
    /// Number of items a complete session contains.
    pub expected_items: usize,
    /// Flynn-effect correction added to the raw FSIQ.
    pub flynn_correction: fn() -> f64,
}

impl Default for ScoreEngineConfig {
    fn default() -> Self {
        Self {
            default_age: DEFAULT_AGE,
            expected_items: EXPECTED_ITEMS,
            flynn_correction: no_flynn_correction,
        }
    }
}

/// The scoring engine.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    config: ScoreEngineConfig,
}

impl ScoreEngine {
    pub fn new(config: ScoreEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoreEngineConfig {
        &self.config
    }

    /// Score a finished session, using the session's recorded age.
    pub fn score_session(&self, session: &TestSession) -> Result<ScoreReport, InvalidInputError> {
        self.score(&session.responses, session.age)
    }

    /// Score an ordered set of responses for a test taker of `age` years.
    pub fn score(
        &self,
        responses: &[ResponseRecord],
        age: Option<u32>,
    ) -> Result<ScoreReport, InvalidInputError> {
        let age = age.unwrap_or(self.config.default_age);
        validate_input(responses, age)?;

        let raw_scores = raw_domain_scores(responses);
        tracing::debug!(?raw_scores, "raw domain scores");

        let scaled_scores: BTreeMap<Domain, i32> = raw_scores
            .iter()
            .map(|(d, raw)| (*d, scaled_score(*raw)))
            .collect();

        let composite_scores: BTreeMap<Domain, i32> = scaled_scores
            .iter()
            .map(|(d, scaled)| (*d, composite_score(*scaled)))
            .collect();

        let multiplier = age_multiplier(age);
        let domain_scores: BTreeMap<Domain, i32> = composite_scores
            .iter()
            .map(|(d, composite)| (*d, age_adjusted_score(*composite, multiplier)))
            .collect();
        tracing::debug!(?scaled_scores, ?domain_scores, age, multiplier, "index scores");

        let fsiq_raw = compute_fsiq(&domain_scores) + (self.config.flynn_correction)();
        let consistency = response_consistency(responses);
        let reliability = reliability(consistency, responses.len(), self.config.expected_items);

        let report = ScoreReport {
            fsiq: round_half_even(fsiq_raw) as i32,
            domain_scores,
            scaled_scores,
            raw_scores,
            percentile_rank: percentile_rank(fsiq_raw),
            confidence_interval: confidence_interval(fsiq_raw),
            classification: classify(fsiq_raw),
            reliability,
        };
        tracing::debug!(
            fsiq = report.fsiq,
            fsiq_raw,
            percentile = report.percentile_rank,
            "scored {} responses",
            responses.len()
        );

        Ok(report)
    }
}

fn validate_input(responses: &[ResponseRecord], age: u32) -> Result<(), InvalidInputError> {
    if age == 0 {
        return Err(InvalidInputError::InvalidAge(0));
    }
    for (index, r) in responses.iter().enumerate() {
        if let Some(seconds) = r.response_time_seconds {
            if !seconds.is_finite() {
                return Err(InvalidInputError::NonFiniteResponseTime { index });
            }
            if seconds < 0.0 {
                return Err(InvalidInputError::NegativeResponseTime { index, seconds });
            }
        }
    }
    Ok(())
}

/// Speed bonus for a correct answer. Only Processing Speed rewards speed.
pub fn speed_bonus(response_time_secs: f64, domain: Domain) -> f64 {
    if domain != Domain::ProcessingSpeed {
        return 0.0;
    }
    if response_time_secs < FAST_RESPONSE_SECS {
        FAST_BONUS
    } else if response_time_secs < QUICK_RESPONSE_SECS {
        QUICK_BONUS
    } else {
        0.0
    }
}

/// Stage 1: difficulty-weighted percentage score for every domain.
///
/// Responses whose domain cannot be resolved are left out. A domain with no
/// responses scores the midpoint.
pub fn raw_domain_scores(responses: &[ResponseRecord]) -> BTreeMap<Domain, f64> {
    let mut grouped: BTreeMap<Domain, Vec<&ResponseRecord>> = BTreeMap::new();
    let mut excluded = 0usize;
    for r in responses {
        match resolve_domain(r) {
            Some(domain) => grouped.entry(domain).or_default().push(r),
            None => excluded += 1,
        }
    }
    if excluded > 0 {
        tracing::warn!("excluded {excluded} response(s) with no resolvable domain");
    }

    Domain::ALL
        .into_iter()
        .map(|domain| {
            let items = grouped.get(&domain).map(Vec::as_slice).unwrap_or_default();
            (domain, domain_raw_score(domain, items))
        })
        .collect()
}

fn domain_raw_score(domain: Domain, items: &[&ResponseRecord]) -> f64 {
    let mut raw = 0.0;
    let mut max_possible = 0.0;

    for r in items {
        let weight = r.difficulty().weight();
        if r.is_correct {
            let bonus = speed_bonus(r.response_time(), domain);
            raw += weight * (1.0 + bonus);
        }
        max_possible += weight;
    }

    if max_possible > 0.0 {
        (raw / max_possible) * 100.0
    } else {
        RAW_MIDPOINT
    }
}

/// Stage 2: raw percentage to scaled score in `[1, 19]`.
pub fn scaled_score(raw_score: f64) -> i32 {
    let z = (raw_score - RAW_MIDPOINT) / RAW_SPREAD;
    round_clamped(SCALED_MEAN + z * SCALED_SD, SCALED_MIN, SCALED_MAX)
}

/// Stage 3: scaled score to composite index score in `[40, 160]`.
pub fn composite_score(scaled_score: i32) -> i32 {
    let z = f64::from(scaled_score - 10) / SCALED_SD;
    round_clamped(MEAN_IQ + z * SD_IQ, COMPOSITE_MIN, COMPOSITE_MAX)
}

/// Stage 4: stretch or shrink the deviation from 100 by the age multiplier.
pub fn age_adjusted_score(composite_score: i32, multiplier: f64) -> i32 {
    let deviation = composite_score - 100;
    round_clamped(
        MEAN_IQ + f64::from(deviation) * multiplier,
        COMPOSITE_MIN,
        COMPOSITE_MAX,
    )
}

/// Stage 5: weighted mean of the index scores present; 100 if none are.
pub fn compute_fsiq(domain_scores: &BTreeMap<Domain, i32>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (domain, score) in domain_scores {
        let weight = domain_weight(*domain);
        weighted_sum += f64::from(*score) * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        MEAN_IQ
    }
}

/// Stage 6: 95% confidence interval around the unrounded FSIQ.
pub fn confidence_interval(fsiq_raw: f64) -> ConfidenceInterval {
    let margin = Z_95 * SEM;
    ConfidenceInterval {
        lower: round_half_even(fsiq_raw - margin) as i32,
        upper: round_half_even(fsiq_raw + margin) as i32,
        confidence_percent: CONFIDENCE_PERCENT,
    }
}

/// Stage 7: percentile rank of the unrounded FSIQ, one decimal.
pub fn percentile_rank(fsiq_raw: f64) -> f64 {
    let z = (fsiq_raw - MEAN_IQ) / SD_IQ;
    round_to(normal_cdf(z) * 100.0, 1)
}

/// Stage 8a: qualitative band for a composite-scale score.
pub fn classify(score: f64) -> Classification {
    let band = CLASSIFICATION_BANDS
        .iter()
        .find(|b| b.min.map_or(true, |min| score >= min))
        .unwrap_or(&CLASSIFICATION_BANDS[CLASSIFICATION_BANDS.len() - 1]);

    Classification {
        level: band.level.to_string(),
        description: band.description.to_string(),
    }
}

/// One minus the share of adjacent responses whose correctness flips.
///
/// Uses every response in original order, including ones excluded from
/// domain scoring. Zero or one response is perfectly consistent.
pub fn response_consistency(responses: &[ResponseRecord]) -> f64 {
    if responses.len() <= 1 {
        return 1.0;
    }
    let transitions = responses
        .windows(2)
        .filter(|pair| pair[0].is_correct != pair[1].is_correct)
        .count();
    let max_transitions = responses.len() - 1;

    1.0 - (transitions as f64 / max_transitions as f64)
}

/// Stage 8b: reliability estimate.
///
/// The interpretation follows `consistency`, not the final coefficient.
pub fn reliability(consistency: f64, response_count: usize, expected_items: usize) -> Reliability {
    let completion = if expected_items == 0 {
        1.0
    } else {
        (response_count as f64 / expected_items as f64).min(1.0)
    };

    let interpretation = if consistency > 0.8 {
        ReliabilityLevel::High
    } else if consistency > 0.6 {
        ReliabilityLevel::Moderate
    } else {
        ReliabilityLevel::Low
    };

    Reliability {
        coefficient: round_to(consistency * completion, 2),
        interpretation,
    }
}
