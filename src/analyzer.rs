use anyhow::Result;
use std::path::PathBuf;

use crate::models::{CheckResult, Incident, Report, Status};
use crate::utils::{display_name, log_file_name, round2};

impl Report {
    /// Builds the summary for one endpoint from its recorded checks.
    /// Average response time covers records that actually carry a non-zero
    /// latency; incidents keep log order.
    pub fn from_results(name: &str, results: &[CheckResult]) -> Self {
        let total_checks = results.len();
        let up_count = results.iter().filter(|r| r.status == Status::Up).count();
        let down_count = results.iter().filter(|r| r.status == Status::Down).count();

        let uptime_percent = if total_checks > 0 {
            round2(up_count as f64 / total_checks as f64 * 100.0)
        } else {
            0.0
        };

        let times: Vec<f64> = results
            .iter()
            .filter_map(|r| r.response_time)
            .filter(|rt| *rt > 0.0)
            .collect();
        let avg_response_time_ms = if times.is_empty() {
            0.0
        } else {
            round2(times.iter().sum::<f64>() / times.len() as f64)
        };

        let incidents = results
            .iter()
            .filter(|r| matches!(r.status, Status::Down | Status::Error))
            .map(|r| Incident {
                timestamp: r.timestamp,
                status: r.status,
                error: r.error.clone().unwrap_or_else(|| "Unknown error".to_string()),
            })
            .collect();

        Report {
            name: name.to_string(),
            uptime_percent,
            total_checks,
            up_count,
            down_count,
            avg_response_time_ms,
            incidents,
        }
    }
}

pub struct LogAnalyzer {
    logs_dir: PathBuf,
}

impl LogAnalyzer {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }

    /// All parseable records for an endpoint, in file order. A missing log
    /// yields an empty history. The file is read as raw bytes and split on
    /// newlines, so a torn or non-UTF-8 line is skipped like any other
    /// unparseable line instead of poisoning the whole file.
    pub async fn load_results(&self, name: &str) -> Vec<CheckResult> {
        let path = self.logs_dir.join(log_file_name(name));
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        content
            .split(|byte| *byte == b'\n')
            .filter_map(|line| serde_json::from_slice(line).ok())
            .collect()
    }

    pub async fn analyze(&self, name: &str) -> Report {
        let results = self.load_results(name).await;
        Report::from_results(name, &results)
    }

    /// One report per `*.log` file in the logs directory, sorted by name.
    /// Display names are derived from the file names.
    pub async fn analyze_all(&self) -> Result<Vec<Report>> {
        let mut reports = Vec::new();
        if !self.logs_dir.exists() {
            return Ok(reports);
        }

        let mut entries = tokio::fs::read_dir(&self.logs_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("log") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                reports.push(self.analyze(&display_name(stem)).await);
            }
        }

        reports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(reports)
    }
}
