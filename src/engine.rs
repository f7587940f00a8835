use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::alerts::{self, AlertSink};
use crate::config::MonitorConfig;
use crate::detector::ChangeDetector;
use crate::logger::ResultLogger;
use crate::models::{CheckResult, MonitorState, Status};
use crate::probe::Prober;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Monitor {
    pub config: MonitorConfig,
    prober: Prober,
    logger: ResultLogger,
    sink: AlertSink,
    pub state: Arc<Mutex<MonitorState>>,
    changes: Mutex<ChangeDetector>,
    concurrency_limiter: Arc<Semaphore>,
}

impl Monitor {
    pub fn new(config: MonitorConfig, logs_dir: &Path) -> Result<Self> {
        let prober = Prober::new(PROBE_TIMEOUT).context("Failed to create HTTP client")?;
        let sink = AlertSink::new(config.alert_settings.clone());
        let max_concurrent = config.max_concurrency.max(1);

        Ok(Self {
            config,
            prober,
            logger: ResultLogger::new(logs_dir),
            sink,
            state: Arc::new(Mutex::new(MonitorState {
                last_results: HashMap::new(),
            })),
            changes: Mutex::new(ChangeDetector::default()),
            concurrency_limiter: Arc::new(Semaphore::new(max_concurrent)),
        })
    }

    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) -> Result<()> {
        info!("API monitor started");
        info!(
            "Monitoring {} endpoints every {}s",
            self.config.apis.len(),
            self.config.check_interval
        );

        loop {
            self.run_checks().await;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_secs(self.config.check_interval)) => {}
            }
        }

        info!("Monitor stopped");
        Ok(())
    }

    /// One cycle: probe every configured endpoint concurrently, then log,
    /// detect changes and alert per result in name order.
    pub async fn run_checks(&self) {
        if self.config.apis.is_empty() {
            warn!("No endpoints configured, nothing to check");
            return;
        }

        let start_time = Utc::now();
        let mut tasks = FuturesUnordered::new();

        for endpoint in &self.config.apis {
            let prober = self.prober.clone();
            let endpoint = endpoint.clone();
            let limiter = Arc::clone(&self.concurrency_limiter);

            tasks.push(tokio::spawn(async move {
                let _permit = limiter.acquire().await.ok();
                prober.check(&endpoint).await
            }));
        }

        let total = tasks.len();
        let mut results = Vec::with_capacity(total);
        while let Some(join_res) = tasks.next().await {
            if let Ok(result) = join_res {
                results.push(result);
            }
        }

        // Name order keeps log and alert sequences stable between cycles.
        results.sort_by(|a, b| a.name.cmp(&b.name));

        for result in results {
            self.process_result(result).await;
        }

        let duration = Utc::now() - start_time;
        info!(
            "Check cycle covered {} endpoints in {:.2}s",
            total,
            duration.num_milliseconds() as f64 / 1000.0
        );
    }

    async fn process_result(&self, result: CheckResult) {
        if let Err(e) = self.logger.append(&result).await {
            error!("Failed to record check for {}: {e}", result.name);
        }

        // The fingerprint baseline and the change signal both apply to
        // healthy results only; a down or error probe leaves the baseline
        // untouched.
        let structure_changed = if result.status == Status::Up {
            self.changes
                .lock()
                .await
                .detect(&result.name, result.response_hash.as_deref())
        } else {
            false
        };

        self.state
            .lock()
            .await
            .last_results
            .insert(result.name.clone(), result.clone());

        for alert in alerts::alerts_for(&result, structure_changed, &self.config.thresholds) {
            self.sink.dispatch(&alert).await;
        }
    }
}
