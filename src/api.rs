use anyhow::Result;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::analyzer::LogAnalyzer;
use crate::models::{CheckResult, MonitorState, Report};

#[derive(Clone)]
pub struct ApiState {
    pub monitor: Arc<Mutex<MonitorState>>,
    pub logs_dir: PathBuf,
}

pub async fn get_status(State(state): State<ApiState>) -> Json<Vec<CheckResult>> {
    let monitor = state.monitor.lock().await;
    let mut results: Vec<CheckResult> = monitor.last_results.values().cloned().collect();
    results.sort_by(|a, b| a.name.cmp(&b.name));
    Json(results)
}

pub async fn get_report(State(state): State<ApiState>, Path(name): Path<String>) -> Json<Report> {
    let analyzer = LogAnalyzer::new(&state.logs_dir);
    Json(analyzer.analyze(&name).await)
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/report/:name", get(get_report))
        .with_state(state)
}

pub async fn start_server(port: u16, state: ApiState) -> Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Status API: http://localhost:{}", addr.port());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
