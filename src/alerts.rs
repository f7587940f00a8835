use serde_json::json;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{AlertSettings, Thresholds};
use crate::models::{Alert, AlertLevel, CheckResult, Status};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Availability always outranks latency: a down or error result yields its
/// status alert and nothing else, a healthy result yields exactly one
/// latency-tier alert.
pub fn evaluate(result: &CheckResult, thresholds: &Thresholds) -> Option<Alert> {
    match result.status {
        Status::Down => Some(Alert {
            message: format!("{} is DOWN! Error: {}", result.name, error_text(result)),
            level: AlertLevel::Critical,
        }),
        Status::Error => Some(Alert {
            message: format!("{} returned an error: {}", result.name, error_text(result)),
            level: AlertLevel::Warning,
        }),
        Status::Up => {
            let rt = result.response_time.unwrap_or(0.0);
            if rt > thresholds.response_time_critical {
                Some(Alert {
                    message: format!("{} is VERY SLOW! Response time: {rt}ms", result.name),
                    level: AlertLevel::Critical,
                })
            } else if rt > thresholds.response_time_warning {
                Some(Alert {
                    message: format!("{} is slow. Response time: {rt}ms", result.name),
                    level: AlertLevel::Warning,
                })
            } else {
                Some(Alert {
                    message: format!("{} is healthy. Response time: {rt}ms", result.name),
                    level: AlertLevel::Info,
                })
            }
        }
        Status::Unknown => None,
    }
}

pub fn structure_change(name: &str) -> Alert {
    Alert {
        message: format!("{name} response structure has CHANGED!"),
        level: AlertLevel::Warning,
    }
}

/// The status alert plus, for healthy results only, the response-change
/// alert. At most two alerts per check.
pub fn alerts_for(result: &CheckResult, structure_changed: bool, thresholds: &Thresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if let Some(alert) = evaluate(result, thresholds) {
        alerts.push(alert);
    }
    if structure_changed && result.status == Status::Up {
        alerts.push(structure_change(&result.name));
    }
    alerts
}

fn error_text(result: &CheckResult) -> &str {
    result.error.as_deref().unwrap_or("Unknown error")
}

pub struct AlertSink {
    settings: AlertSettings,
    client: reqwest::Client,
}

impl AlertSink {
    pub fn new(settings: AlertSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// Console output maps severity onto the matching log level. Webhook
    /// delivery covers warning and critical only and is fire-and-forget;
    /// a failed POST never disturbs the check cycle.
    pub async fn dispatch(&self, alert: &Alert) {
        if self.settings.console {
            match alert.level {
                AlertLevel::Info => info!("{}", alert.message),
                AlertLevel::Warning => warn!("{}", alert.message),
                AlertLevel::Critical => error!("{}", alert.message),
            }
        }

        if self.settings.webhook && alert.level != AlertLevel::Info {
            if let Some(url) = &self.settings.webhook_url {
                let payload = json!({ "text": alert.message });
                let _ = self
                    .client
                    .post(url)
                    .json(&payload)
                    .timeout(WEBHOOK_TIMEOUT)
                    .send()
                    .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn result_with(status: Status) -> CheckResult {
        let mut result = CheckResult::new("api", "https://example.com");
        result.status = status;
        result
    }

    fn up_with_rt(rt: f64) -> CheckResult {
        let mut result = result_with(Status::Up);
        result.response_time = Some(rt);
        result.status_code = Some(200);
        result
    }

    #[test]
    fn down_raises_critical_with_error_text() {
        let mut result = result_with(Status::Down);
        result.error = Some("Connection error".to_string());
        let alert = evaluate(&result, &Thresholds::default()).unwrap();
        assert_eq!(alert.level, AlertLevel::Critical);
        assert_eq!(alert.message, "api is DOWN! Error: Connection error");
    }

    #[test]
    fn down_without_error_text_uses_placeholder() {
        let alert = evaluate(&result_with(Status::Down), &Thresholds::default()).unwrap();
        assert_eq!(alert.message, "api is DOWN! Error: Unknown error");
    }

    #[test]
    fn error_raises_warning() {
        let mut result = result_with(Status::Error);
        result.error = Some("Unexpected status code: 503".to_string());
        let alert = evaluate(&result, &Thresholds::default()).unwrap();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.message, "api returned an error: Unexpected status code: 503");
    }

    #[test]
    fn healthy_latency_tiers() {
        let thresholds = Thresholds::default();

        let fast = evaluate(&up_with_rt(120.5), &thresholds).unwrap();
        assert_eq!(fast.level, AlertLevel::Info);
        assert_eq!(fast.message, "api is healthy. Response time: 120.5ms");

        let slow = evaluate(&up_with_rt(2500.5), &thresholds).unwrap();
        assert_eq!(slow.level, AlertLevel::Warning);
        assert_eq!(slow.message, "api is slow. Response time: 2500.5ms");

        let very_slow = evaluate(&up_with_rt(6000.5), &thresholds).unwrap();
        assert_eq!(very_slow.level, AlertLevel::Critical);
        assert_eq!(very_slow.message, "api is VERY SLOW! Response time: 6000.5ms");
    }

    #[test]
    fn latency_exactly_at_threshold_is_not_slow() {
        let thresholds = Thresholds::default();
        assert_eq!(evaluate(&up_with_rt(2000.0), &thresholds).unwrap().level, AlertLevel::Info);
        assert_eq!(evaluate(&up_with_rt(5000.0), &thresholds).unwrap().level, AlertLevel::Warning);
    }

    #[test]
    fn up_without_response_time_counts_as_fast() {
        let alert = evaluate(&result_with(Status::Up), &Thresholds::default()).unwrap();
        assert_eq!(alert.level, AlertLevel::Info);
        assert_eq!(alert.message, "api is healthy. Response time: 0ms");
    }

    #[test]
    fn down_with_recorded_latency_never_gets_a_latency_alert() {
        let mut result = result_with(Status::Down);
        result.response_time = Some(9000.0);
        let alerts = alerts_for(&result, false, &Thresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
        assert!(alerts[0].message.contains("DOWN"));
    }

    #[test]
    fn healthy_result_with_change_yields_two_alerts() {
        let alerts = alerts_for(&up_with_rt(100.5), true, &Thresholds::default());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].level, AlertLevel::Info);
        assert_eq!(alerts[1].level, AlertLevel::Warning);
        assert_eq!(alerts[1].message, "api response structure has CHANGED!");
    }

    #[test]
    fn changed_fingerprint_on_second_probe_yields_healthy_plus_change_alerts() {
        let mut detector = crate::detector::ChangeDetector::default();
        detector.detect("api", Some("abc"));
        let changed = detector.detect("api", Some("xyz"));

        let alerts = alerts_for(&up_with_rt(150.5), changed, &Thresholds::default());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].level, AlertLevel::Info);
        assert_eq!(alerts[0].message, "api is healthy. Response time: 150.5ms");
        assert_eq!(alerts[1].level, AlertLevel::Warning);
        assert_eq!(alerts[1].message, "api response structure has CHANGED!");
    }

    #[test]
    fn change_signal_is_ignored_for_unhealthy_results() {
        let mut result = result_with(Status::Error);
        result.error = Some("Unexpected status code: 500".to_string());
        let alerts = alerts_for(&result, true, &Thresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert!(alerts[0].message.contains("returned an error"));
    }

    fn webhook_sink(url: Option<String>, webhook: bool) -> AlertSink {
        AlertSink::new(AlertSettings {
            console: false,
            webhook,
            webhook_url: url,
        })
    }

    fn critical_alert() -> Alert {
        Alert {
            message: "api is DOWN! Error: Connection error".to_string(),
            level: AlertLevel::Critical,
        }
    }

    #[tokio::test]
    async fn webhook_posts_text_payload_for_critical_alerts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"text": "api is DOWN! Error: Connection error"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = webhook_sink(Some(server.uri()), true);
        sink.dispatch(&critical_alert()).await;

        server.verify().await;
    }

    #[tokio::test]
    async fn webhook_posts_warning_alerts_too() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"text": "api is slow. Response time: 2500.5ms"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = webhook_sink(Some(server.uri()), true);
        sink.dispatch(&Alert {
            message: "api is slow. Response time: 2500.5ms".to_string(),
            level: AlertLevel::Warning,
        })
        .await;

        server.verify().await;
    }

    #[tokio::test]
    async fn webhook_never_posts_info_alerts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let sink = webhook_sink(Some(server.uri()), true);
        sink.dispatch(&Alert {
            message: "api is healthy. Response time: 10.5ms".to_string(),
            level: AlertLevel::Info,
        })
        .await;

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn webhook_disabled_or_unconfigured_never_posts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let sink = webhook_sink(Some(server.uri()), false);
        sink.dispatch(&critical_alert()).await;
        assert!(server.received_requests().await.unwrap().is_empty());

        // Enabled but without a URL there is nothing to call.
        let sink = webhook_sink(None, true);
        sink.dispatch(&critical_alert()).await;
    }

    #[tokio::test]
    async fn webhook_failures_are_swallowed() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        // Completes without error despite the unreachable endpoint.
        let sink = webhook_sink(Some(url), true);
        sink.dispatch(&critical_alert()).await;
    }
}
