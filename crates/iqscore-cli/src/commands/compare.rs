//! The `iqscore compare` command.

use std::path::PathBuf;

use anyhow::Result;

use iqscore_core::report::ScoredSession;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: i32,
    fail_on_decline: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0, "threshold must not be negative");

    let baseline = ScoredSession::load_json(&baseline_path)?;
    let current = ScoredSession::load_json(&current_path)?;

    if baseline.user_id != current.user_id {
        tracing::warn!(
            baseline = ?baseline.user_id,
            current = ?current.user_id,
            "comparing sessions from different users"
        );
    }

    let comparison = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", comparison.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => {
            // text format
            println!(
                "FSIQ: {} -> {} ({:+}){}",
                comparison.baseline_fsiq,
                comparison.current_fsiq,
                comparison.fsiq_delta,
                if comparison.outside_confidence_interval {
                    ", outside baseline 95% CI"
                } else {
                    ""
                }
            );
            println!(
                "Comparison: {} declines, {} improvements, {} unchanged",
                comparison.declines.len(),
                comparison.improvements.len(),
                comparison.unchanged
            );

            if !comparison.declines.is_empty() {
                println!("\nDeclines:");
                for c in &comparison.declines {
                    println!(
                        "  {} {} -> {} ({:+})",
                        c.domain.index_name(),
                        c.baseline_score,
                        c.current_score,
                        c.delta
                    );
                }
            }

            if !comparison.improvements.is_empty() {
                println!("\nImprovements:");
                for c in &comparison.improvements {
                    println!(
                        "  {} {} -> {} ({:+})",
                        c.domain.index_name(),
                        c.baseline_score,
                        c.current_score,
                        c.delta
                    );
                }
            }
        }
    }

    if fail_on_decline && comparison.has_declines() {
        std::process::exit(1);
    }

    Ok(())
}
