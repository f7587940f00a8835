use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default)]
    pub apis: Vec<ApiEndpoint>,
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub alert_settings: AlertSettings,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_check_interval() -> u64 { 60 }
fn default_api_port() -> u16 { 3000 }
fn default_max_concurrency() -> usize { 16 }

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiEndpoint {
    pub name: String,
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default)]
    pub check_response_structure: bool,
}

fn default_method() -> String { "GET".to_string() }
fn default_expected_status() -> u16 { 200 }

/// Latency tiers in milliseconds. A healthy response above `warning` is
/// slow, above `critical` very slow.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Thresholds {
    #[serde(default = "default_warning_ms")]
    pub response_time_warning: f64,
    #[serde(default = "default_critical_ms")]
    pub response_time_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            response_time_warning: default_warning_ms(),
            response_time_critical: default_critical_ms(),
        }
    }
}

fn default_warning_ms() -> f64 { 2000.0 }
fn default_critical_ms() -> f64 { 5000.0 }

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlertSettings {
    #[serde(default = "default_console")]
    pub console: bool,
    #[serde(default)]
    pub webhook: bool,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            console: true,
            webhook: false,
            webhook_url: None,
        }
    }
}

fn default_console() -> bool { true }

impl MonitorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON in config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let raw = r#"{
            "apis": [{
                "name": "GitHub API",
                "url": "https://api.github.com",
                "method": "get",
                "headers": {"Accept": "application/vnd.github+json"},
                "expected_status": 200,
                "check_response_structure": true
            }],
            "check_interval": 30,
            "thresholds": {"response_time_warning": 1000, "response_time_critical": 3000},
            "alert_settings": {"console": false, "webhook": true, "webhook_url": "https://hooks.example.com/x"},
            "api_port": 8080,
            "max_concurrency": 4
        }"#;
        let config: MonitorConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.apis.len(), 1);
        assert_eq!(config.apis[0].name, "GitHub API");
        assert!(config.apis[0].check_response_structure);
        assert_eq!(config.check_interval, 30);
        assert_eq!(config.thresholds.response_time_warning, 1000.0);
        assert_eq!(config.thresholds.response_time_critical, 3000.0);
        assert!(config.alert_settings.webhook);
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.max_concurrency, 4);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let raw = r#"{"apis": [{"name": "Example", "url": "https://example.com"}]}"#;
        let config: MonitorConfig = serde_json::from_str(raw).unwrap();
        let api = &config.apis[0];
        assert_eq!(api.method, "GET");
        assert!(api.headers.is_empty());
        assert_eq!(api.expected_status, 200);
        assert!(!api.check_response_structure);
        assert_eq!(config.check_interval, 60);
        assert_eq!(config.thresholds.response_time_warning, 2000.0);
        assert_eq!(config.thresholds.response_time_critical, 5000.0);
        assert!(config.alert_settings.console);
        assert!(!config.alert_settings.webhook);
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.max_concurrency, 16);
    }

    #[test]
    fn endpoint_without_name_is_rejected() {
        let raw = r#"{"apis": [{"url": "https://example.com"}]}"#;
        assert!(serde_json::from_str::<MonitorConfig>(raw).is_err());
    }

    #[test]
    fn empty_object_is_a_valid_config() {
        let config: MonitorConfig = serde_json::from_str("{}").unwrap();
        assert!(config.apis.is_empty());
        assert_eq!(config.check_interval, 60);
    }
}
