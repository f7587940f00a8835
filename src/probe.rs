use reqwest::Method;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use crate::config::ApiEndpoint;
use crate::models::{CheckResult, Status};
use crate::utils::round2;

#[derive(Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Performs one check. Never fails: every outcome, including transport
    /// errors, is folded into the returned record.
    pub async fn check(&self, endpoint: &ApiEndpoint) -> CheckResult {
        let mut result = CheckResult::new(&endpoint.name, &endpoint.url);

        let method = match Method::from_bytes(endpoint.method.to_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                result.status = Status::Error;
                result.error = Some(format!("Invalid HTTP method: {}", endpoint.method));
                return result;
            }
        };

        let mut request = self.client.request(method, &endpoint.url);
        for (key, value) in &endpoint.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        // The body is downloaded unconditionally: elapsed time covers the
        // full exchange, and the fixed timeout applies to a stalled body too.
        let start = Instant::now();
        let outcome = match request.send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                response.bytes().await.map(|body| (code, body))
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok((code, body)) => {
                result.response_time = Some(round2(start.elapsed().as_secs_f64() * 1000.0));
                result.status_code = Some(code);

                if code == endpoint.expected_status {
                    result.status = Status::Up;
                } else {
                    result.status = Status::Error;
                    result.error = Some(format!("Unexpected status code: {code}"));
                }

                if endpoint.check_response_structure {
                    result.response_hash = Some(response_fingerprint(&body));
                }
            }
            // A timed-out connect reports as both; timeout wins.
            Err(e) if e.is_timeout() => {
                result.status = Status::Down;
                result.error = Some("Request timeout".to_string());
            }
            Err(e) if e.is_connect() => {
                result.status = Status::Down;
                result.error = Some("Connection error".to_string());
            }
            Err(e) => {
                result.status = Status::Error;
                result.error = Some(e.to_string());
            }
        }

        result
    }
}

pub fn response_fingerprint(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}
