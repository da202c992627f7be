//! Configuration and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examdrill_core::session::SessionConfig;
use examdrill_core::store::AnswerStore;

use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;

/// Top-level examdrill configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamdrillConfig {
    /// Default bank file to drill.
    #[serde(default = "default_bank")]
    pub bank: PathBuf,
    /// Where the answer store lives.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Settle delay before the results-stage tally, in milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Output directory for session reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_bank() -> PathBuf {
    PathBuf::from("banks/exam1.toml")
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./examdrill-answers.json")
}
fn default_settle_delay_ms() -> u64 {
    200
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./examdrill-results")
}

impl Default for ExamdrillConfig {
    fn default() -> Self {
        Self {
            bank: default_bank(),
            store_path: default_store_path(),
            settle_delay_ms: default_settle_delay_ms(),
            output_dir: default_output_dir(),
        }
    }
}

impl ExamdrillConfig {
    /// The session tuning this configuration describes.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examdrill.toml` in the current directory
/// 2. `~/.config/examdrill/config.toml`
///
/// Environment variable overrides: `EXAMDRILL_BANK`, `EXAMDRILL_STORE`.
pub fn load_config() -> Result<ExamdrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamdrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examdrill.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamdrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamdrillConfig::default(),
    };

    // Apply env var overrides
    if let Ok(bank) = std::env::var("EXAMDRILL_BANK") {
        config.bank = PathBuf::from(bank);
    }
    if let Ok(store) = std::env::var("EXAMDRILL_STORE") {
        config.store_path = PathBuf::from(store);
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examdrill"))
}

/// Create the answer store this configuration describes. `ephemeral`
/// swaps in the in-memory store, leaving nothing on disk.
pub fn create_store(config: &ExamdrillConfig, ephemeral: bool) -> Arc<dyn AnswerStore> {
    if ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::new(config.store_path.clone()))
    }
}
