//! Score report types, JSON persistence, and retest comparison.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::classify;
use crate::model::{Domain, TestSession};
use crate::statistics::{mean, percentile_of};

/// Gap from the mean index score beyond which a domain is a strength or weakness.
const PROFILE_DEVIATION: f64 = 10.0;

/// The output of one scoring run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// Rounded full scale composite.
    pub fsiq: i32,
    /// Age-adjusted index score per domain.
    pub domain_scores: BTreeMap<Domain, i32>,
    /// Scaled score (1-19) per domain.
    pub scaled_scores: BTreeMap<Domain, i32>,
    /// Raw percentage score per domain.
    pub raw_scores: BTreeMap<Domain, f64>,
    /// Percentile rank of the FSIQ, one decimal.
    pub percentile_rank: f64,
    /// Confidence interval around the FSIQ.
    pub confidence_interval: ConfidenceInterval,
    /// Qualitative band of the FSIQ.
    pub classification: Classification,
    /// Reliability estimate of the session.
    pub reliability: Reliability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInterval {
    pub lower: i32,
    pub upper: i32,
    #[serde(alias = "confidence")]
    pub confidence_percent: u8,
}

impl ConfidenceInterval {
    pub fn contains(&self, score: i32) -> bool {
        (self.lower..=self.upper).contains(&score)
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} ({}% CI)",
            self.lower, self.upper, self.confidence_percent
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub level: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reliability {
    /// Consistency times completion, two decimals.
    pub coefficient: f64,
    pub interpretation: ReliabilityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliabilityLevel {
    High,
    Moderate,
    Low,
}

impl fmt::Display for ReliabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReliabilityLevel::High => write!(f, "High"),
            ReliabilityLevel::Moderate => write!(f, "Moderate"),
            ReliabilityLevel::Low => write!(f, "Low"),
        }
    }
}

/// The columns the session store persists for a scored session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScore {
    pub fsiq: i32,
    pub percentile: f64,
    pub classification: String,
    /// JSON object of domain label to index score.
    pub domain_scores_json: String,
    /// JSON object `{lower, upper, confidencePercent}`.
    pub confidence_interval_json: String,
    pub reliability_coefficient: f64,
}

impl ScoreReport {
    /// Flatten into the persisted column set.
    pub fn to_record(&self) -> serde_json::Result<StoredScore> {
        Ok(StoredScore {
            fsiq: self.fsiq,
            percentile: self.percentile_rank,
            classification: self.classification.level.clone(),
            domain_scores_json: serde_json::to_string(&self.domain_scores)?,
            confidence_interval_json: serde_json::to_string(&self.confidence_interval)?,
            reliability_coefficient: self.reliability.coefficient,
        })
    }
}

// ---------------------------------------------------------------------------
// Detailed report
// ---------------------------------------------------------------------------

/// Interpretive breakdown of a score report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedReport {
    pub summary: ReportSummary,
    pub indices: Vec<IndexSummary>,
    pub strengths: Vec<ProfileDeviation>,
    pub weaknesses: Vec<ProfileDeviation>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub fsiq: i32,
    pub percentile: f64,
    pub classification: Classification,
    /// e.g. "103-121 (95% CI)".
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub domain: Domain,
    pub name: String,
    pub score: i32,
    pub percentile: f64,
    pub classification: String,
}

/// A domain that stands out from the test taker's own average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDeviation {
    pub domain: Domain,
    pub score: i32,
    /// Score minus the mean index score.
    pub deviation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Strength,
    Improvement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub domain: Domain,
    pub suggestion: String,
}

impl DetailedReport {
    pub fn from_report(report: &ScoreReport) -> Self {
        let indices = report
            .domain_scores
            .iter()
            .map(|(domain, score)| IndexSummary {
                domain: *domain,
                name: domain.index_name(),
                score: *score,
                percentile: percentile_of(f64::from(*score)),
                classification: classify(f64::from(*score)).level,
            })
            .collect();

        let scores: Vec<f64> = report.domain_scores.values().map(|s| f64::from(*s)).collect();
        let (strengths, weaknesses) = match mean(&scores) {
            Some(avg) => {
                let deviations = |keep: &dyn Fn(f64) -> bool| -> Vec<ProfileDeviation> {
                    report
                        .domain_scores
                        .iter()
                        .filter(|(_, s)| keep(f64::from(**s)))
                        .map(|(d, s)| ProfileDeviation {
                            domain: *d,
                            score: *s,
                            deviation: f64::from(*s) - avg,
                        })
                        .collect()
                };
                (
                    deviations(&|s: f64| s > avg + PROFILE_DEVIATION),
                    deviations(&|s: f64| s < avg - PROFILE_DEVIATION),
                )
            }
            None => (Vec::new(), Vec::new()),
        };

        let recommendations = strengths
            .iter()
            .map(|s| Recommendation {
                kind: RecommendationKind::Strength,
                domain: s.domain,
                suggestion: format!(
                    "Continue developing your {} abilities through advanced challenges.",
                    s.domain
                ),
            })
            .chain(weaknesses.iter().map(|w| Recommendation {
                kind: RecommendationKind::Improvement,
                domain: w.domain,
                suggestion: format!(
                    "Consider practicing {} exercises to strengthen this area.",
                    w.domain
                ),
            }))
            .collect();

        Self {
            summary: ReportSummary {
                fsiq: report.fsiq,
                percentile: report.percentile_rank,
                classification: report.classification.clone(),
                confidence: report.confidence_interval.to_string(),
            },
            indices,
            strengths,
            weaknesses,
            recommendations,
        }
    }
}

// ---------------------------------------------------------------------------
// Scored sessions
// ---------------------------------------------------------------------------

/// A score report together with the session it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSession {
    pub session_id: Uuid,
    #[serde(default)]
    pub user_id: Option<String>,
    pub scored_at: DateTime<Utc>,
    /// Age as recorded on the session.
    #[serde(default)]
    pub age: Option<u32>,
    pub response_count: usize,
    pub correct_count: usize,
    pub report: ScoreReport,
    pub detail: DetailedReport,
}

impl ScoredSession {
    pub fn new(session: &TestSession, report: ScoreReport) -> Self {
        let detail = DetailedReport::from_report(&report);
        Self {
            session_id: session.id,
            user_id: session.user_id.clone(),
            scored_at: Utc::now(),
            age: session.age,
            response_count: session.responses.len(),
            correct_count: session.correct_count(),
            report,
            detail,
        }
    }

    /// Save as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize scored session")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write scored session to {}", path.display()))?;
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scored session from {}", path.display()))?;
        let scored: ScoredSession =
            serde_json::from_str(&content).context("failed to parse scored session JSON")?;
        Ok(scored)
    }

    /// Compare against an earlier sitting of the same test.
    ///
    /// Index score changes larger than `threshold` points are reported.
    pub fn compare(&self, baseline: &ScoredSession, threshold: i32) -> RetestComparison {
        let mut improvements = Vec::new();
        let mut declines = Vec::new();
        let mut unchanged = 0usize;

        for (domain, &current) in &self.report.domain_scores {
            let Some(&previous) = baseline.report.domain_scores.get(domain) else {
                continue;
            };
            let change = DomainChange {
                domain: *domain,
                baseline_score: previous,
                current_score: current,
                delta: current - previous,
            };
            if change.delta > threshold {
                improvements.push(change);
            } else if change.delta < -threshold {
                declines.push(change);
            } else {
                unchanged += 1;
            }
        }

        RetestComparison {
            baseline_fsiq: baseline.report.fsiq,
            current_fsiq: self.report.fsiq,
            fsiq_delta: self.report.fsiq - baseline.report.fsiq,
            outside_confidence_interval: !baseline
                .report
                .confidence_interval
                .contains(self.report.fsiq),
            improvements,
            declines,
            unchanged,
        }
    }
}

/// Result of comparing two sittings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetestComparison {
    pub baseline_fsiq: i32,
    pub current_fsiq: i32,
    pub fsiq_delta: i32,
    /// The current FSIQ falls outside the baseline's confidence interval.
    pub outside_confidence_interval: bool,
    pub improvements: Vec<DomainChange>,
    pub declines: Vec<DomainChange>,
    /// Domains whose change stayed within the threshold.
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainChange {
    pub domain: Domain,
    pub baseline_score: i32,
    pub current_score: i32,
    pub delta: i32,
}

impl RetestComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**FSIQ:** {} -> {} ({:+}){}\n\n",
            self.baseline_fsiq,
            self.current_fsiq,
            self.fsiq_delta,
            if self.outside_confidence_interval {
                ", outside the baseline confidence interval"
            } else {
                ""
            }
        ));
        md.push_str(&format!(
            "**Summary:** {} declines, {} improvements, {} unchanged\n\n",
            self.declines.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, changes) in [("Declines", &self.declines), ("Improvements", &self.improvements)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Index | Baseline | Current | Delta |\n");
            md.push_str("|-------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {} | {:+} |\n",
                    c.domain, c.baseline_score, c.current_score, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any index score dropped past the threshold.
    pub fn has_declines(&self) -> bool {
        !self.declines.is_empty()
    }
}
