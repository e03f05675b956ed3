//! Attempt sinks: a results directory on disk and an in-memory buffer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::report::AttemptReport;
use crate::traits::AttemptSink;

/// Writes each attempt as `attempt-<id>.json` under a directory.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AttemptSink for JsonDirSink {
    fn name(&self) -> &str {
        "json-dir"
    }

    async fn save_attempt(&self, report: &AttemptReport) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.dir.join(report.file_name());
        let json = serde_json::to_vec_pretty(report).context("failed to serialize report")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;

        tracing::info!(path = %path.display(), "attempt saved");
        Ok(())
    }
}

/// Keeps attempts in memory. Used by tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<AttemptReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of everything saved so far.
    pub async fn saved(&self) -> Vec<AttemptReport> {
        self.saved.lock().await.clone()
    }
}

#[async_trait]
impl AttemptSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save_attempt(&self, report: &AttemptReport) -> Result<()> {
        self.saved.lock().await.push(report.clone());
        Ok(())
    }
}
