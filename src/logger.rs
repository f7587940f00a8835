use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::models::CheckResult;
use crate::utils::log_file_name;

pub struct ResultLogger {
    logs_dir: PathBuf,
}

impl ResultLogger {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }

    /// Appends the result as one JSON line to the endpoint's log file.
    /// Existing lines are never rewritten.
    pub async fn append(&self, result: &CheckResult) -> Result<()> {
        tokio::fs::create_dir_all(&self.logs_dir)
            .await
            .with_context(|| format!("Failed to create logs directory {}", self.logs_dir.display()))?;

        let path = self.logs_dir.join(log_file_name(&result.name));
        let line = serde_json::to_string(result)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }
}
