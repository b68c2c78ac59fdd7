//! The `iqscore init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create iqscore.toml
    if std::path::Path::new("iqscore.toml").exists() {
        println!("iqscore.toml already exists, skipping.");
    } else {
        std::fs::write("iqscore.toml", SAMPLE_CONFIG)?;
        println!("Created iqscore.toml");
    }

    // Create example session
    std::fs::create_dir_all("sessions")?;
    let example_path = std::path::Path::new("sessions/example.toml");
    if example_path.exists() {
        println!("sessions/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SESSION)?;
        println!("Created sessions/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit iqscore.toml to set the default age and output directory");
    println!("  2. Run: iqscore validate --session sessions/example.toml");
    println!("  3. Run: iqscore score --session sessions/example.toml --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# iqscore configuration

# Age used for sessions that do not record one.
default_age = 18

# Number of items in a complete session.
expected_items = 75

output_dir = "./iqscore-results"

# text, json, html, all
default_format = "text"
"#;

const EXAMPLE_SESSION: &str = r#"[session]
id = "7d0c9a52-3c1f-4b8e-a2d4-5e6f7a8b9c0d"
user_id = "example"
age = 18
started_at = "2026-01-05T09:00:00Z"
finished_at = "2026-01-05T09:22:00Z"

[[responses]]
domain = "Verbal Comprehension"
is_correct = true
response_time_seconds = 6.5
item_difficulty = "easy"

[[responses]]
domain = "Perceptual Reasoning"
is_correct = true
response_time_seconds = 11.0
item_difficulty = "medium"

[[responses]]
domain = "Working Memory"
is_correct = false
response_time_seconds = 9.0
item_difficulty = "medium"

[[responses]]
is_correct = true
response_time_seconds = 3.2

[responses.item]
id = "ps_e1"
category = "Processing Speed"
difficulty = "easy"
question_type = "symbol-search"

[[responses]]
domain = "Fluid Reasoning"
is_correct = false
response_time_seconds = 14.0
item_difficulty = "hard"
"#;
