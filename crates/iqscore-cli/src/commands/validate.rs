//! The `iqscore validate` command.

use std::path::PathBuf;

use anyhow::Result;

use iqscore_core::config::load_config_from;
use iqscore_core::parser::{load_sessions, validate_session};

pub fn execute(session_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let sessions = load_sessions(&session_path)?;

    let mut total_warnings = 0;

    for session in &sessions {
        println!(
            "Session: {} ({} responses)",
            session.id,
            session.responses.len()
        );

        let warnings = validate_session(session, config.expected_items);
        for w in &warnings {
            let prefix = w
                .response_index
                .map(|i| format!("  [response {i}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All sessions valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
