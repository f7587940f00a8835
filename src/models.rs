use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
    Error,
    Unknown,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Up => write!(f, "up"),
            Status::Down => write!(f, "down"),
            Status::Error => write!(f, "error"),
            Status::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of a single endpoint check. Every field is serialized on every
/// record, with `null` standing in for whatever a given outcome never
/// produced, so each log line carries the same keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    pub response_time: Option<f64>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub response_hash: Option<String>,
}

impl CheckResult {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            timestamp: Utc::now(),
            status: Status::Unknown,
            response_time: None,
            status_code: None,
            error: None,
            response_hash: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub message: String,
    pub level: AlertLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incident {
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub name: String,
    pub uptime_percent: f64,
    pub total_checks: usize,
    pub up_count: usize,
    pub down_count: usize,
    pub avg_response_time_ms: f64,
    pub incidents: Vec<Incident>,
}

pub struct MonitorState {
    pub last_results: HashMap<String, CheckResult>,
}
