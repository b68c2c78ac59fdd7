//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use iqscore_core::norms::{COMPOSITE_MAX, COMPOSITE_MIN};
use iqscore_core::report::{IndexSummary, ProfileDeviation, ScoredSession};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report for one scored session.
pub fn generate_html(scored: &ScoredSession) -> String {
    let report = &scored.report;
    let summary = &scored.detail.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>iqscore report: {}</title>\n",
        scored.session_id
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>iqscore report</h1>\n");
    let user = scored.user_id.as_deref().unwrap_or("anonymous");
    let age = scored
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "default".to_string());
    html.push_str(&format!(
        "<p class=\"meta\">Session: <strong>{}</strong> | User: {} | Age: {} | {}/{} correct | {}</p>\n",
        scored.session_id,
        html_escape(user),
        age,
        scored.correct_count,
        scored.response_count,
        scored.scored_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Full Scale</h2>\n");
    html.push_str(&format!(
        "<p class=\"fsiq {}\">{}</p>\n",
        score_class(summary.fsiq),
        summary.fsiq
    ));
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Classification</th><td>{} <span class=\"meta\">({})</span></td></tr>\n",
        html_escape(&summary.classification.level),
        html_escape(&summary.classification.description)
    ));
    html.push_str(&format!(
        "<tr><th>Percentile</th><td>{:.1}</td></tr>\n",
        summary.percentile
    ));
    html.push_str(&format!(
        "<tr><th>Confidence interval</th><td>{}</td></tr>\n",
        html_escape(&summary.confidence)
    ));
    html.push_str(&format!(
        "<tr><th>Reliability</th><td>{:.2} ({})</td></tr>\n",
        report.reliability.coefficient, report.reliability.interpretation
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Index scores
    html.push_str("<section class=\"indices\">\n");
    html.push_str("<h2>Index Scores</h2>\n");
    if !scored.detail.indices.is_empty() {
        html.push_str(&generate_bar_chart(&scored.detail.indices));
    }
    html.push_str("<table class=\"results-table\" id=\"indices\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Index</th><th onclick=\"sortTable(1)\">Raw</th><th onclick=\"sortTable(2)\">Scaled</th><th onclick=\"sortTable(3)\">Score</th><th onclick=\"sortTable(4)\">Percentile</th><th onclick=\"sortTable(5)\">Classification</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for index in &scored.detail.indices {
        let raw = report.raw_scores.get(&index.domain).copied().unwrap_or(0.0);
        let scaled = report.scaled_scores.get(&index.domain).copied().unwrap_or(0);
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td></tr>\n",
            score_class(index.score),
            html_escape(&index.name),
            raw,
            scaled,
            index.score,
            index.percentile,
            html_escape(&index.classification)
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Profile
    html.push_str("<section class=\"profile\">\n");
    html.push_str("<h2>Profile</h2>\n");
    push_deviation_list(&mut html, "Strengths", &scored.detail.strengths);
    push_deviation_list(&mut html, "Weaknesses", &scored.detail.weaknesses);
    if scored.detail.strengths.is_empty() && scored.detail.weaknesses.is_empty() {
        html.push_str("<p class=\"meta\">No index differs from the profile mean by more than 10 points.</p>\n");
    }
    if !scored.detail.recommendations.is_empty() {
        html.push_str("<h3>Recommendations</h3>\n<ul>\n");
        for rec in &scored.detail.recommendations {
            html.push_str(&format!("<li>{}</li>\n", html_escape(&rec.suggestion)));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(scored)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(scored: &ScoredSession, path: &Path) -> Result<()> {
    let html = generate_html(scored);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn push_deviation_list(html: &mut String, title: &str, entries: &[ProfileDeviation]) {
    if entries.is_empty() {
        return;
    }
    html.push_str(&format!("<h3>{title}</h3>\n<ul>\n"));
    for e in entries {
        html.push_str(&format!(
            "<li>{}: {} ({:+.1})</li>\n",
            html_escape(&e.domain.index_name()),
            e.score,
            e.deviation
        ));
    }
    html.push_str("</ul>\n");
}

fn score_class(score: i32) -> &'static str {
    if score >= 115 {
        "high"
    } else if score >= 85 {
        "mid"
    } else {
        "low"
    }
}

fn generate_bar_chart(indices: &[IndexSummary]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 240;
    let span = f64::from(COMPOSITE_MAX - COMPOSITE_MIN);

    let total_height = indices.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    // Population mean marker
    let mean_x = label_width + (60.0 / span * max_width as f64) as usize;
    svg.push_str(&format!(
        "  <line x1=\"{mean_x}\" y1=\"0\" x2=\"{mean_x}\" y2=\"{total_height}\" stroke=\"currentColor\" stroke-dasharray=\"4 4\" opacity=\"0.5\"/>\n"
    ));

    for (i, index) in indices.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let fraction = f64::from(index.score - COMPOSITE_MIN) / span;
        let width = (fraction.clamp(0.0, 1.0) * max_width as f64) as usize;

        let color = match score_class(index.score) {
            "high" => "#22c55e",
            "mid" => "#eab308",
            _ => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&index.name)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            index.score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --high: #dcfce7; --mid: #fef9c3; --low: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --high: #064e3b; --mid: #713f12; --low: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.fsiq { font-size: 3rem; font-weight: bold; display: inline-block; padding: 0.5rem 1.5rem; border-radius: 8px; margin: 0; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.results-table th { cursor: pointer; }
.high { background: var(--high); }
.mid { background: var(--mid); }
.low { background: var(--low); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('indices');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = isNaN(na) || isNaN(nb) ? va.localeCompare(vb) : na - nb;
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
