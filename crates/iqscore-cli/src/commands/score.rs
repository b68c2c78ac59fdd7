//! The `iqscore score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use iqscore_core::config::load_config_from;
use iqscore_core::model::Domain;
use iqscore_core::parser;
use iqscore_core::report::ScoredSession;
use iqscore_core::statistics::{compute_cohort_stats, CohortStats};
use iqscore_core::ScoreEngine;
use iqscore_report::html::write_html_report;

const FORMATS: [&str; 3] = ["text", "json", "html"];

pub fn execute(
    session_path: PathBuf,
    age: Option<u32>,
    output: Option<PathBuf>,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let format = format.unwrap_or_else(|| config.default_format.clone());

    let formats: Vec<&str> = if format == "all" {
        FORMATS.to_vec()
    } else {
        format.split(',').map(str::trim).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            FORMATS.contains(fmt),
            "unknown format '{fmt}' (expected text, json, html or all)"
        );
    }

    let mut sessions = parser::load_sessions(&session_path)?;
    anyhow::ensure!(
        !sessions.is_empty(),
        "no session files found in {}",
        session_path.display()
    );

    let engine = ScoreEngine::new(config.engine_config());
    let mut scored = Vec::with_capacity(sessions.len());
    for session in &mut sessions {
        if age.is_some() {
            session.age = age;
        }
        let report = engine
            .score_session(session)
            .with_context(|| format!("failed to score session {}", session.id))?;
        tracing::debug!(session = %session.id, fsiq = report.fsiq, "scored session");
        scored.push(ScoredSession::new(session, report));
    }

    print_summary(&scored, config.default_age);
    if scored.len() > 1 {
        if let Some(stats) = compute_cohort_stats(&scored) {
            print_cohort(&stats);
        }
    }

    let writes_files = formats.iter().any(|f| *f != "text");
    if writes_files {
        std::fs::create_dir_all(&output)
            .with_context(|| format!("failed to create output directory {}", output.display()))?;
    }

    for s in &scored {
        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("score-{}.json", s.session_id));
                    s.save_json(&path)?;
                    eprintln!("Score saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("score-{}.html", s.session_id));
                    write_html_report(s, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn print_summary(scored: &[ScoredSession], default_age: u32) {
    let mut table = Table::new();
    let mut header = vec!["Session".to_string(), "Age".to_string()];
    header.extend(Domain::ALL.iter().map(|d| d.abbreviation().to_string()));
    header.extend(
        ["FSIQ", "95% CI", "Percentile", "Classification", "Reliability"]
            .iter()
            .map(|h| h.to_string()),
    );
    table.set_header(header);

    for s in scored {
        let report = &s.report;
        let id = s.session_id.to_string();
        let age = match s.age {
            Some(a) => a.to_string(),
            None => format!("{default_age}*"),
        };

        let mut row = vec![Cell::new(&id[..8]), Cell::new(age)];
        row.extend(Domain::ALL.iter().map(|d| {
            Cell::new(
                report
                    .domain_scores
                    .get(d)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )
        }));
        row.extend([
            Cell::new(report.fsiq),
            Cell::new(format!(
                "{}-{}",
                report.confidence_interval.lower, report.confidence_interval.upper
            )),
            Cell::new(format!("{:.1}", report.percentile_rank)),
            Cell::new(&report.classification.level),
            Cell::new(format!(
                "{:.2} ({})",
                report.reliability.coefficient, report.reliability.interpretation
            )),
        ]);
        table.add_row(row);
    }

    println!("{table}");
}

fn print_cohort(stats: &CohortStats) {
    println!(
        "\nCohort: {} sessions, FSIQ mean {:.1} (SD {:.1}), range {}-{}",
        stats.sessions, stats.mean_fsiq, stats.sd_fsiq, stats.min_fsiq, stats.max_fsiq
    );
    for (domain, mean) in &stats.mean_domain_scores {
        println!("  {:<4} mean {:.1}", domain.abbreviation(), mean);
    }
    for (level, count) in &stats.classification_counts {
        println!("  {level}: {count}");
    }
}
