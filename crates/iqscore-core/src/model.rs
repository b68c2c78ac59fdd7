//! Core data model types for iqscore.
//!
//! These are the input-side types the scoring engine reads: cognitive
//! domains, item difficulty, individual response records, and the finished
//! test session a caller hands over for scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Response time assumed when none was captured, in seconds.
pub const DEFAULT_RESPONSE_TIME_SECS: f64 = 10.0;

/// One of the five fixed cognitive domains.
///
/// Variants are declared in canonical order; every per-domain map in a report
/// iterates in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Domain {
    VerbalComprehension,
    PerceptualReasoning,
    WorkingMemory,
    ProcessingSpeed,
    FluidReasoning,
}

impl Domain {
    /// All domains in canonical order.
    pub const ALL: [Domain; 5] = [
        Domain::VerbalComprehension,
        Domain::PerceptualReasoning,
        Domain::WorkingMemory,
        Domain::ProcessingSpeed,
        Domain::FluidReasoning,
    ];

    /// Display label, also the wire format.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::VerbalComprehension => "Verbal Comprehension",
            Domain::PerceptualReasoning => "Perceptual Reasoning",
            Domain::WorkingMemory => "Working Memory",
            Domain::ProcessingSpeed => "Processing Speed",
            Domain::FluidReasoning => "Fluid Reasoning",
        }
    }

    /// snake_case identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Domain::VerbalComprehension => "verbal_comprehension",
            Domain::PerceptualReasoning => "perceptual_reasoning",
            Domain::WorkingMemory => "working_memory",
            Domain::ProcessingSpeed => "processing_speed",
            Domain::FluidReasoning => "fluid_reasoning",
        }
    }

    /// WAIS-style index abbreviation (e.g. "VCI").
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Domain::VerbalComprehension => "VCI",
            Domain::PerceptualReasoning => "PRI",
            Domain::WorkingMemory => "WMI",
            Domain::ProcessingSpeed => "PSI",
            Domain::FluidReasoning => "FRI",
        }
    }

    /// Name of the composite index this domain reports as.
    pub fn index_name(&self) -> String {
        format!("{} Index", self.label())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Domain::ALL
            .into_iter()
            .find(|d| {
                needle.eq_ignore_ascii_case(d.label())
                    || needle.eq_ignore_ascii_case(d.id())
                    || needle.eq_ignore_ascii_case(d.abbreviation())
            })
            .ok_or_else(|| format!("unknown domain: {needle}"))
    }
}

impl TryFrom<String> for Domain {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.label().to_string()
    }
}

/// Item difficulty band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Scoring weight of a correct answer at this difficulty.
    pub fn weight(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.3,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The question a response answered, when the caller joins it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedItem {
    /// Question identifier (e.g. "vc_e1").
    #[serde(default)]
    pub id: Option<String>,
    /// Domain label stored on the question.
    #[serde(default)]
    pub category: Option<String>,
    /// Difficulty stored on the question.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Presentation type (e.g. "digit-span", "pattern").
    #[serde(default)]
    pub question_type: Option<String>,
}

/// A single recorded answer. Owned by the caller; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Domain label recorded on the response itself.
    #[serde(default, alias = "category")]
    pub domain: Option<String>,
    /// Whether the answer was correct.
    #[serde(default)]
    pub is_correct: bool,
    /// Time taken to answer, in seconds.
    #[serde(default)]
    pub response_time_seconds: Option<f64>,
    /// Difficulty recorded on the response itself.
    #[serde(default)]
    pub item_difficulty: Option<Difficulty>,
    /// The linked question, if joined.
    #[serde(default)]
    pub item: Option<LinkedItem>,
}

impl ResponseRecord {
    /// Build a record with an explicit domain, difficulty, and time.
    pub fn new(
        domain: Domain,
        is_correct: bool,
        response_time_seconds: f64,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            domain: Some(domain.label().to_string()),
            is_correct,
            response_time_seconds: Some(response_time_seconds),
            item_difficulty: Some(difficulty),
            item: None,
        }
    }

    /// Domain label to resolve: the response's own label, else the linked item's category.
    fn domain_label(&self) -> Option<&str> {
        self.domain
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.item
                    .as_ref()
                    .and_then(|item| item.category.as_deref())
                    .filter(|s| !s.trim().is_empty())
            })
    }

    /// Effective difficulty: linked item, then response, then medium.
    pub fn difficulty(&self) -> Difficulty {
        self.item
            .as_ref()
            .and_then(|item| item.difficulty)
            .or(self.item_difficulty)
            .unwrap_or_default()
    }

    /// Effective response time. An absent or zero time was never captured.
    pub fn response_time(&self) -> f64 {
        match self.response_time_seconds {
            Some(t) if t != 0.0 => t,
            _ => DEFAULT_RESPONSE_TIME_SECS,
        }
    }
}

/// Resolve the domain a response belongs to.
///
/// Looks at the response's own label first, then the linked item's category.
/// A label that names none of the five domains resolves to `None`.
pub fn resolve_domain(record: &ResponseRecord) -> Option<Domain> {
    record.domain_label().and_then(|label| label.parse().ok())
}

/// A finished test session as exported by the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSession {
    /// Session identifier.
    pub id: Uuid,
    /// Owning user, if known.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Age of the test taker in whole years.
    #[serde(default)]
    pub age: Option<u32>,
    /// When the session started.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the session finished.
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Responses in the order they were given.
    #[serde(default)]
    pub responses: Vec<ResponseRecord>,
}

impl TestSession {
    /// Create an empty session with a fresh id.
    pub fn new(age: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            age,
            started_at: None,
            finished_at: None,
            responses: Vec::new(),
        }
    }

    /// Number of correct responses.
    pub fn correct_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_correct).count()
    }

    /// Wall-clock length of the session, if both timestamps are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_display_and_parse() {
        assert_eq!(Domain::ProcessingSpeed.to_string(), "Processing Speed");
        assert_eq!(
            "Verbal Comprehension".parse::<Domain>().unwrap(),
            Domain::VerbalComprehension
        );
        assert_eq!(
            "working_memory".parse::<Domain>().unwrap(),
            Domain::WorkingMemory
        );
        assert_eq!("fri".parse::<Domain>().unwrap(), Domain::FluidReasoning);
        assert_eq!(
            "  perceptual reasoning ".parse::<Domain>().unwrap(),
            Domain::PerceptualReasoning
        );
        assert!("Spatial Intelligence".parse::<Domain>().is_err());
    }

    #[test]
    fn domain_order_is_canonical() {
        let mut shuffled = vec![
            Domain::FluidReasoning,
            Domain::VerbalComprehension,
            Domain::ProcessingSpeed,
            Domain::WorkingMemory,
            Domain::PerceptualReasoning,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Domain::ALL.to_vec());
    }

    #[test]
    fn difficulty_weights_are_ordered() {
        assert!(Difficulty::Easy.weight() < Difficulty::Medium.weight());
        assert!(Difficulty::Medium.weight() < Difficulty::Hard.weight());
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn resolve_domain_prefers_response_label() {
        let record = ResponseRecord {
            domain: Some("Working Memory".into()),
            item: Some(LinkedItem {
                category: Some("Fluid Reasoning".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(resolve_domain(&record), Some(Domain::WorkingMemory));
    }

    #[test]
    fn resolve_domain_falls_back_to_linked_item() {
        let record = ResponseRecord {
            domain: None,
            item: Some(LinkedItem {
                category: Some("Fluid Reasoning".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(resolve_domain(&record), Some(Domain::FluidReasoning));

        let blank = ResponseRecord {
            domain: Some("   ".into()),
            ..record
        };
        assert_eq!(resolve_domain(&blank), Some(Domain::FluidReasoning));
    }

    #[test]
    fn resolve_domain_unknown_or_missing() {
        assert_eq!(resolve_domain(&ResponseRecord::default()), None);
        let unknown = ResponseRecord {
            domain: Some("Musical".into()),
            ..Default::default()
        };
        assert_eq!(resolve_domain(&unknown), None);
    }

    #[test]
    fn difficulty_prefers_linked_item() {
        let record = ResponseRecord {
            item_difficulty: Some(Difficulty::Easy),
            item: Some(LinkedItem {
                difficulty: Some(Difficulty::Hard),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(record.difficulty(), Difficulty::Hard);

        let response_only = ResponseRecord {
            item_difficulty: Some(Difficulty::Easy),
            ..Default::default()
        };
        assert_eq!(response_only.difficulty(), Difficulty::Easy);
        assert_eq!(ResponseRecord::default().difficulty(), Difficulty::Medium);
    }

    #[test]
    fn response_time_defaults() {
        assert_eq!(ResponseRecord::default().response_time(), 10.0);
        let zero = ResponseRecord {
            response_time_seconds: Some(0.0),
            ..Default::default()
        };
        assert_eq!(zero.response_time(), 10.0);
        let fast = ResponseRecord {
            response_time_seconds: Some(2.5),
            ..Default::default()
        };
        assert_eq!(fast.response_time(), 2.5);
    }

    #[test]
    fn response_record_accepts_category_alias() {
        let json = r#"{"category": "Processing Speed", "is_correct": true}"#;
        let record: ResponseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.domain.as_deref(), Some("Processing Speed"));
        assert!(record.is_correct);
        assert!(record.response_time_seconds.is_none());
    }

    #[test]
    fn domain_serializes_as_label() {
        let json = serde_json::to_string(&Domain::WorkingMemory).unwrap();
        assert_eq!(json, "\"Working Memory\"");
        let parsed: Domain = serde_json::from_str("\"psi\"").unwrap();
        assert_eq!(parsed, Domain::ProcessingSpeed);
    }

    #[test]
    fn session_correct_count() {
        let mut session = TestSession::new(Some(21));
        session.responses = vec![
            ResponseRecord::new(Domain::VerbalComprehension, true, 3.0, Difficulty::Easy),
            ResponseRecord::new(Domain::VerbalComprehension, false, 3.0, Difficulty::Easy),
            ResponseRecord::new(Domain::WorkingMemory, true, 3.0, Difficulty::Hard),
        ];
        assert_eq!(session.correct_count(), 2);
        assert!(session.duration().is_none());
    }
}
