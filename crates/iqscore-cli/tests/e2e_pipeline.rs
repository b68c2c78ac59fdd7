//! End-to-end scoring tests over complete sessions.
//!
//! These tests drive the full pipeline (parse → score → detail → persist) and
//! pin the outputs of known response patterns.

use std::path::Path;

use iqscore_core::model::{Difficulty, Domain, LinkedItem, ResponseRecord, TestSession};
use iqscore_core::parser::parse_session;
use iqscore_core::report::{ReliabilityLevel, ScoreReport, ScoredSession};
use iqscore_core::{InvalidInputError, ScoreEngine};

fn resp(domain: Domain, correct: bool, secs: f64, difficulty: Difficulty) -> ResponseRecord {
    ResponseRecord::new(domain, correct, secs, difficulty)
}

fn score(responses: &[ResponseRecord], age: u32) -> ScoreReport {
    ScoreEngine::default().score(responses, Some(age)).unwrap()
}

fn domain_scores(report: &ScoreReport) -> Vec<i32> {
    Domain::ALL.iter().map(|d| report.domain_scores[d]).collect()
}

/// Each domain: correct easy (4s), correct medium (8s), incorrect hard (14s).
fn balanced_responses() -> Vec<ResponseRecord> {
    Domain::ALL
        .iter()
        .flat_map(|&d| {
            [
                resp(d, true, 4.0, Difficulty::Easy),
                resp(d, true, 8.0, Difficulty::Medium),
                resp(d, false, 14.0, Difficulty::Hard),
            ]
        })
        .collect()
}

/// Three incorrect medium items per domain.
fn low_responses() -> Vec<ResponseRecord> {
    Domain::ALL
        .iter()
        .flat_map(|&d| (0..3).map(move |_| resp(d, false, 20.0, Difficulty::Medium)))
        .collect()
}

// --- Fixture sessions ---

#[test]
fn e2e_verbal_only_fixture() {
    let session = parse_session(Path::new("../../sessions/verbal-only.toml")).unwrap();
    let report = ScoreEngine::default().score_session(&session).unwrap();

    assert_eq!(domain_scores(&report), vec![147, 100, 100, 100, 100]);
    assert_eq!(report.scaled_scores[&Domain::VerbalComprehension], 19);
    assert_eq!(report.fsiq, 112);
    assert_eq!(report.percentile_rank, 78.3);
    assert_eq!(
        (report.confidence_interval.lower, report.confidence_interval.upper),
        (103, 121)
    );
    assert_eq!(report.classification.level, "High Average");
    assert_eq!(report.reliability.coefficient, 0.07);
    assert_eq!(report.reliability.interpretation, ReliabilityLevel::High);
}

#[test]
fn e2e_balanced_fixture() {
    let session = parse_session(Path::new("../../sessions/balanced.json")).unwrap();
    assert_eq!(session.age, Some(30));
    assert_eq!(session.correct_count(), 10);

    let report = ScoreEngine::default().score_session(&session).unwrap();
    assert_eq!(report, score(&balanced_responses(), 30));
}

// --- Golden response patterns ---

#[test]
fn e2e_balanced_profile_age_30() {
    let report = score(&balanced_responses(), 30);

    assert!((report.raw_scores[&Domain::VerbalComprehension] - 58.064_516).abs() < 1e-5);
    assert!((report.raw_scores[&Domain::ProcessingSpeed] - 66.451_613).abs() < 1e-5);
    assert_eq!(report.scaled_scores[&Domain::WorkingMemory], 11);
    assert_eq!(report.scaled_scores[&Domain::ProcessingSpeed], 13);
    assert_eq!(domain_scores(&report), vec![105, 105, 105, 114, 105]);
    assert_eq!(report.fsiq, 106);
    assert_eq!(
        (report.confidence_interval.lower, report.confidence_interval.upper),
        (98, 115)
    );
    assert_eq!(report.percentile_rank, 66.4);
    assert_eq!(report.classification.level, "Average");
    assert_eq!(report.reliability.coefficient, 0.07);
    assert_eq!(report.reliability.interpretation, ReliabilityLevel::Low);
}

#[test]
fn e2e_fsiq_tie_rounds_to_even() {
    // Age 40 is outside the norm table: PS stays at 115 and the raw FSIQ is 106.5.
    let report = score(&balanced_responses(), 40);
    assert_eq!(report.domain_scores[&Domain::ProcessingSpeed], 115);
    assert_eq!(report.fsiq, 106);
    assert_eq!(report.percentile_rank, 66.8);
}

#[test]
fn e2e_young_child_matches_adult_when_deviation_small() {
    assert_eq!(
        domain_scores(&score(&balanced_responses(), 8)),
        domain_scores(&score(&balanced_responses(), 30))
    );
}

#[test]
fn e2e_processing_speed_bonus() {
    let responses = [
        resp(Domain::ProcessingSpeed, true, 3.0, Difficulty::Hard),
        resp(Domain::ProcessingSpeed, true, 7.0, Difficulty::Hard),
        resp(Domain::ProcessingSpeed, false, 12.0, Difficulty::Medium),
        resp(Domain::ProcessingSpeed, true, 12.0, Difficulty::Easy),
    ];
    let report = score(&responses, 25);

    assert!((report.raw_scores[&Domain::ProcessingSpeed] - 86.136_364).abs() < 1e-5);
    assert_eq!(report.scaled_scores[&Domain::ProcessingSpeed], 17);
    assert_eq!(report.domain_scores[&Domain::ProcessingSpeed], 134);
    assert_eq!(report.fsiq, 105);
    assert_eq!(
        (report.confidence_interval.lower, report.confidence_interval.upper),
        (96, 114)
    );
    assert_eq!(report.percentile_rank, 63.3);
    assert_eq!(report.reliability.coefficient, 0.02);
}

#[test]
fn e2e_floor_performance() {
    let report = score(&low_responses(), 18);

    assert!(report.raw_scores.values().all(|r| *r == 0.0));
    assert!(report.scaled_scores.values().all(|s| *s == 1));
    assert_eq!(domain_scores(&report), vec![53; 5]);
    assert_eq!(report.fsiq, 53);
    assert_eq!(
        (report.confidence_interval.lower, report.confidence_interval.upper),
        (44, 62)
    );
    assert_eq!(report.percentile_rank, 0.1);
    assert_eq!(report.classification.level, "Extremely Low");
    assert_eq!(report.reliability.coefficient, 0.2);
    assert_eq!(report.reliability.interpretation, ReliabilityLevel::High);
}

#[test]
fn e2e_floor_performance_age_10() {
    let report = score(&low_responses(), 10);
    assert_eq!(domain_scores(&report), vec![56; 5]);
    assert_eq!(report.fsiq, 56);
    assert_eq!(
        (report.confidence_interval.lower, report.confidence_interval.upper),
        (47, 65)
    );
    assert_eq!(report.percentile_rank, 0.2);
}

#[test]
fn e2e_full_length_session() {
    let difficulties = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
    let responses: Vec<ResponseRecord> = (0..80)
        .map(|i| resp(Domain::ALL[i % 5], i % 7 != 0, 6.0, difficulties[i % 3]))
        .collect();
    let report = score(&responses, 18);

    assert_eq!(domain_scores(&report), vec![132, 137, 132, 147, 132]);
    assert_eq!(report.fsiq, 136);
    assert_eq!(
        (report.confidence_interval.lower, report.confidence_interval.upper),
        (127, 144)
    );
    assert_eq!(report.percentile_rank, 99.1);
    assert_eq!(report.classification.level, "Superior");
    // Completion is capped at 1.0, so the coefficient equals the consistency.
    assert_eq!(report.reliability.coefficient, 0.71);
    assert_eq!(report.reliability.interpretation, ReliabilityLevel::Moderate);
}

#[test]
fn e2e_alternating_answers_have_no_consistency() {
    let responses = [
        resp(Domain::WorkingMemory, true, 6.0, Difficulty::Medium),
        resp(Domain::WorkingMemory, false, 6.0, Difficulty::Medium),
        resp(Domain::WorkingMemory, true, 6.0, Difficulty::Medium),
        resp(Domain::WorkingMemory, false, 6.0, Difficulty::Medium),
    ];
    let report = score(&responses, 18);
    assert_eq!(report.fsiq, 100);
    assert_eq!(report.reliability.coefficient, 0.0);
    assert_eq!(report.reliability.interpretation, ReliabilityLevel::Low);
}

#[test]
fn e2e_linked_items_drive_domain_and_difficulty() {
    let via_item = ResponseRecord {
        domain: None,
        is_correct: true,
        response_time_seconds: Some(3.0),
        item_difficulty: Some(Difficulty::Easy),
        item: Some(LinkedItem {
            id: Some("ps_h1".into()),
            category: Some("processing_speed".into()),
            difficulty: Some(Difficulty::Hard),
            question_type: None,
        }),
    };
    let direct = resp(Domain::ProcessingSpeed, true, 3.0, Difficulty::Hard);

    assert_eq!(score(&[via_item], 18), score(&[direct], 18));
}

#[test]
fn e2e_unknown_domain_only_affects_consistency() {
    let mut responses = balanced_responses();
    let baseline = score(&responses, 30);

    responses.push(ResponseRecord {
        domain: Some("Creativity".into()),
        is_correct: true,
        ..ResponseRecord::default()
    });
    let with_unknown = score(&responses, 30);

    assert_eq!(with_unknown.domain_scores, baseline.domain_scores);
    assert_eq!(with_unknown.fsiq, baseline.fsiq);
}

#[test]
fn e2e_invalid_input_is_rejected() {
    let engine = ScoreEngine::default();
    let responses = [
        resp(Domain::VerbalComprehension, true, 3.0, Difficulty::Easy),
        resp(Domain::VerbalComprehension, true, f64::NAN, Difficulty::Easy),
    ];
    assert_eq!(
        engine.score(&responses, Some(18)),
        Err(InvalidInputError::NonFiniteResponseTime { index: 1 })
    );
    assert_eq!(
        engine.score(&[], Some(0)),
        Err(InvalidInputError::InvalidAge(0))
    );
}

// --- Persistence ---

#[test]
fn e2e_scored_session_persists() {
    let mut session = TestSession::new(Some(30));
    session.user_id = Some("u-2001".into());
    session.responses = balanced_responses();

    let report = ScoreEngine::default().score_session(&session).unwrap();
    let scored = ScoredSession::new(&session, report);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scored.json");
    scored.save_json(&path).unwrap();

    let loaded = ScoredSession::load_json(&path).unwrap();
    assert_eq!(loaded.session_id, session.id);
    assert_eq!(loaded.report, scored.report);
    assert_eq!(loaded.detail, scored.detail);
    assert_eq!(loaded.response_count, 15);
    assert_eq!(loaded.correct_count, 10);
}

#[test]
fn e2e_stored_record_shape() {
    let report = score(&balanced_responses(), 30);
    let record = report.to_record().unwrap();

    assert_eq!(record.fsiq, 106);
    assert_eq!(record.percentile, 66.4);
    assert_eq!(record.classification, "Average");
    assert_eq!(record.reliability_coefficient, 0.07);
    assert_eq!(
        record.domain_scores_json,
        r#"{"Verbal Comprehension":105,"Perceptual Reasoning":105,"Working Memory":105,"Processing Speed":114,"Fluid Reasoning":105}"#
    );
    assert_eq!(
        record.confidence_interval_json,
        r#"{"lower":98,"upper":115,"confidencePercent":95}"#
    );
}

#[test]
fn e2e_identical_input_serializes_identically() {
    let a = serde_json::to_string(&score(&balanced_responses(), 30)).unwrap();
    let b = serde_json::to_string(&score(&balanced_responses(), 30)).unwrap();
    assert_eq!(a, b);
}
