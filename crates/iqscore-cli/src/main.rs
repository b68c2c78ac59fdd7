//! iqscore CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "iqscore",
    version,
    about = "Composite cognitive-ability scoring for finished test sessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score session files
    Score {
        /// Path to a .toml/.json session file or directory
        #[arg(long)]
        session: PathBuf,

        /// Age in years, overriding the age recorded on each session
        #[arg(long)]
        age: Option<u32>,

        /// Output directory (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, html, all (comma-separated)
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate session files
    Validate {
        /// Path to a session file or directory
        #[arg(long)]
        session: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two scored sessions of the same test taker
    Compare {
        /// Baseline score JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current score JSON
        #[arg(long)]
        current: PathBuf,

        /// Index score change (points) needed to count as a change
        #[arg(long, default_value = "5")]
        threshold: i32,

        /// Exit code 1 if any index declined
        #[arg(long)]
        fail_on_decline: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print the norm tables
    Norms,

    /// Create starter config and example session
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("iqscore=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            session,
            age,
            output,
            format,
            config,
        } => commands::score::execute(session, age, output, format, config),
        Commands::Validate { session, config } => commands::validate::execute(session, config),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_decline,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_decline, format),
        Commands::Norms => commands::norms::execute(),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
