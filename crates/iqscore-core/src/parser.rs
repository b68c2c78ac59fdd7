//! Session file parser.
//!
//! Loads finished test sessions from TOML or JSON files and directories, and
//! validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{resolve_domain, ResponseRecord, TestSession};
use crate::norms::is_normed_age;

/// Intermediate TOML structure for session files.
#[derive(Debug, Deserialize)]
struct TomlSessionFile {
    session: TomlSessionHeader,
    #[serde(default)]
    responses: Vec<ResponseRecord>,
}

#[derive(Debug, Deserialize)]
struct TomlSessionHeader {
    id: Uuid,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    finished_at: Option<DateTime<Utc>>,
}

/// Parse a single session file. `.json` files are read as JSON, anything else as TOML.
pub fn parse_session(path: &Path) -> Result<TestSession> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session file: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        parse_session_json_str(&content, path)
    } else {
        parse_session_str(&content, path)
    }
}

/// Parse a TOML string into a `TestSession` (useful for testing).
pub fn parse_session_str(content: &str, source_path: &Path) -> Result<TestSession> {
    let parsed: TomlSessionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(TestSession {
        id: parsed.session.id,
        user_id: parsed.session.user_id,
        age: parsed.session.age,
        started_at: parsed.session.started_at,
        finished_at: parsed.session.finished_at,
        responses: parsed.responses,
    })
}

/// Parse a JSON string into a `TestSession`.
pub fn parse_session_json_str(content: &str, source_path: &Path) -> Result<TestSession> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))
}

/// Recursively load all `.toml` and `.json` session files from a directory.
pub fn load_session_directory(dir: &Path) -> Result<Vec<TestSession>> {
    let mut sessions = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sessions.extend(load_session_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_session(&path) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sessions)
}

/// Load a single file or every session under a directory.
pub fn load_sessions(path: &Path) -> Result<Vec<TestSession>> {
    if path.is_dir() {
        load_session_directory(path)
    } else {
        Ok(vec![parse_session(path)?])
    }
}

/// A warning from session validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Index of the response (if applicable).
    pub response_index: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn session(message: impl Into<String>) -> Self {
        Self {
            response_index: None,
            message: message.into(),
        }
    }

    fn response(index: usize, message: impl Into<String>) -> Self {
        Self {
            response_index: Some(index),
            message: message.into(),
        }
    }
}

/// Validate a session for issues that would degrade or block scoring.
pub fn validate_session(session: &TestSession, expected_items: usize) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if session.responses.is_empty() {
        warnings.push(ValidationWarning::session(
            "session has no responses; every index will score at the mean",
        ));
    } else if session.responses.len() < expected_items {
        warnings.push(ValidationWarning::session(format!(
            "{} of {} expected responses; reliability will be discounted",
            session.responses.len(),
            expected_items
        )));
    }

    match session.age {
        None => warnings.push(ValidationWarning::session(
            "age missing; the default age will be used",
        )),
        Some(0) => warnings.push(ValidationWarning::session("age is 0; scoring will fail")),
        Some(age) if !is_normed_age(age) => warnings.push(ValidationWarning::session(format!(
            "age {age} is outside the 6-30 norm table; no age adjustment will be applied"
        ))),
        Some(_) => {}
    }

    let mut seen_items = HashSet::new();
    for (i, r) in session.responses.iter().enumerate() {
        if resolve_domain(r).is_none() {
            let label = r
                .domain
                .as_deref()
                .or_else(|| r.item.as_ref().and_then(|item| item.category.as_deref()))
                .unwrap_or("<none>");
            warnings.push(ValidationWarning::response(
                i,
                format!("domain '{label}' cannot be resolved; response will be excluded"),
            ));
        }

        if let Some(t) = r.response_time_seconds {
            if !t.is_finite() {
                warnings.push(ValidationWarning::response(i, "response time is not finite"));
            } else if t < 0.0 {
                warnings.push(ValidationWarning::response(
                    i,
                    format!("negative response time {t}s"),
                ));
            }
        }

        if let Some(id) = r.item.as_ref().and_then(|item| item.id.as_deref()) {
            if !seen_items.insert(id) {
                warnings.push(ValidationWarning::response(
                    i,
                    format!("duplicate item id: {id}"),
                ));
            }
        }
    }

    warnings
}
