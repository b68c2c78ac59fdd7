//! Tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::ScoreEngineConfig;
use crate::norms::{DEFAULT_AGE, EXPECTED_ITEMS};

/// Top-level iqscore configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqscoreConfig {
    /// Age used for sessions that do not record one.
    #[serde(default = "default_age")]
    pub default_age: u32,
    /// Number of items in a complete session.
    #[serde(default = "default_expected_items")]
    pub expected_items: usize,
    /// Output directory for score files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report format when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: String,
}

fn default_age() -> u32 {
    DEFAULT_AGE
}
fn default_expected_items() -> usize {
    EXPECTED_ITEMS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./iqscore-results")
}
fn default_format() -> String {
    "text".to_string()
}

impl Default for IqscoreConfig {
    fn default() -> Self {
        Self {
            default_age: default_age(),
            expected_items: default_expected_items(),
            output_dir: default_output_dir(),
            default_format: default_format(),
        }
    }
}

impl IqscoreConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> ScoreEngineConfig {
        ScoreEngineConfig {
            default_age: self.default_age,
            expected_items: self.expected_items,
            ..ScoreEngineConfig::default()
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `iqscore.toml` in the current directory
/// 2. `~/.config/iqscore/config.toml`
///
/// Environment variable overrides: `IQSCORE_DEFAULT_AGE`, `IQSCORE_OUTPUT_DIR`.
pub fn load_config() -> Result<IqscoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<IqscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("iqscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<IqscoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => IqscoreConfig::default(),
    };

    apply_env_overrides(config, |key| std::env::var(key).ok())
}

fn apply_env_overrides(
    mut config: IqscoreConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<IqscoreConfig> {
    if let Some(age) = lookup("IQSCORE_DEFAULT_AGE") {
        config.default_age = age
            .trim()
            .parse()
            .with_context(|| format!("invalid IQSCORE_DEFAULT_AGE: {age}"))?;
    }

    if let Some(dir) = lookup("IQSCORE_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("iqscore"))
}
