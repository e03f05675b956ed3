//! Session settings and the quizforge configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Settings for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of questions drawn from the pool.
    pub sample_size: usize,
    /// Session length in seconds. Must be positive.
    pub duration_secs: i64,
    /// Fixed seed for reproducible question order.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn new(sample_size: usize, duration_secs: i64) -> Self {
        Self {
            sample_size,
            duration_secs,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the settings and return the duration as whole seconds.
    ///
    /// # Errors
    ///
    /// `InvalidSampleSize` for a zero sample, `InvalidDuration` for a
    /// non-positive duration or one too large to count down.
    pub fn validate(&self) -> Result<u32, QuizError> {
        if self.sample_size == 0 {
            return Err(QuizError::InvalidSampleSize);
        }
        if self.duration_secs <= 0 {
            return Err(QuizError::InvalidDuration(self.duration_secs));
        }
        u32::try_from(self.duration_secs).map_err(|_| QuizError::InvalidDuration(self.duration_secs))
    }
}

/// Top-level quizforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Questions per session when neither the CLI nor the bank says otherwise.
    #[serde(default = "default_sample_size")]
    pub default_sample_size: usize,
    /// Session length when neither the CLI nor the bank says otherwise.
    #[serde(default = "default_duration")]
    pub default_duration_secs: i64,
    /// Where attempt reports are written.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Tick period in milliseconds. One tick is one session second.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    /// Persist completed attempts through the result sink.
    #[serde(default = "default_true")]
    pub save_results: bool,
    /// Fixed seed applied to every session.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sample_size() -> usize {
    10
}
fn default_duration() -> i64 {
    600
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("./quizforge-results")
}
fn default_tick_millis() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            default_sample_size: default_sample_size(),
            default_duration_secs: default_duration(),
            results_dir: default_results_dir(),
            tick_millis: default_tick_millis(),
            save_results: true,
            seed: None,
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable overrides: `QUIZFORGE_RESULTS_DIR`, `QUIZFORGE_SEED`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizforgeConfig::default(),
    };

    if let Ok(dir) = std::env::var("QUIZFORGE_RESULTS_DIR") {
        config.results_dir = PathBuf::from(dir);
    }
    if let Ok(seed) = std::env::var("QUIZFORGE_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("QUIZFORGE_SEED is not a number: {seed}"))?;
        config.seed = Some(seed);
    }

    anyhow::ensure!(config.tick_millis > 0, "tick_millis must be positive");
    Ok(config)
}

/// Parse a config document.
pub fn parse_config(content: &str) -> Result<QuizforgeConfig> {
    Ok(toml::from_str(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}
