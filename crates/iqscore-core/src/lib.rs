//! iqscore-core: Scoring engine, norms, and session model.
//!
//! This crate turns a finished test session into a standardized score report:
//! per-domain index scores, a weighted full scale score, confidence interval,
//! percentile, classification, and reliability.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod norms;
pub mod parser;
pub mod report;
pub mod statistics;

pub use engine::{ScoreEngine, ScoreEngineConfig};
pub use error::InvalidInputError;
pub use model::{Difficulty, Domain, ResponseRecord, TestSession};
pub use report::{ScoreReport, ScoredSession};
