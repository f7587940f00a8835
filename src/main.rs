use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod config;
mod models;
mod utils;
mod probe;
mod detector;
mod alerts;
mod logger;
mod analyzer;
mod engine;
mod api;

use crate::analyzer::LogAnalyzer;
use crate::config::MonitorConfig;
use crate::engine::Monitor;
use crate::models::Report;

#[derive(Parser)]
#[command(name = "apipulse", about = "HTTP endpoint monitor with append-only check logs", version)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory holding per-endpoint check logs
    #[arg(long, default_value = "logs")]
    logs_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the monitoring loop and the status API (default)
    Run,
    /// Run a single check cycle and exit
    Check,
    /// Summarize recorded checks for one endpoint, or for every log file
    Analyze {
        /// Endpoint name as configured; omit to cover all logs
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into()))
        .with_ansi(true)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_monitor(&cli.config, &cli.logs_dir).await,
        Commands::Check => run_single_cycle(&cli.config, &cli.logs_dir).await,
        Commands::Analyze { name } => analyze_logs(&cli.logs_dir, name.as_deref()).await,
    }
}

async fn run_monitor(config_path: &Path, logs_dir: &Path) -> Result<()> {
    let config = MonitorConfig::load(config_path)?;
    let monitor = Arc::new(Monitor::new(config.clone(), logs_dir)?);
    info!("Logs directory: {}", logs_dir.display());

    let api_state = api::ApiState {
        monitor: monitor.state.clone(),
        logs_dir: logs_dir.to_path_buf(),
    };
    let api_port = config.api_port;
    tokio::spawn(async move {
        if let Err(e) = api::start_server(api_port, api_state).await {
            error!("Status API failed: {e}");
        }
    });

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, finishing current cycle");
            signal_token.cancel();
        }
    });

    monitor.run(shutdown).await
}

async fn run_single_cycle(config_path: &Path, logs_dir: &Path) -> Result<()> {
    let config = MonitorConfig::load(config_path)?;
    let monitor = Monitor::new(config, logs_dir)?;
    monitor.run_checks().await;
    Ok(())
}

async fn analyze_logs(logs_dir: &Path, name: Option<&str>) -> Result<()> {
    let analyzer = LogAnalyzer::new(logs_dir);
    match name {
        Some(name) => print_report(&analyzer.analyze(name).await),
        None => {
            let reports = analyzer.analyze_all().await?;
            if reports.is_empty() {
                println!("No log files found.");
            }
            for report in &reports {
                print_report(report);
            }
        }
    }
    Ok(())
}

fn print_report(report: &Report) {
    if report.total_checks == 0 {
        println!("No logs found for {}", report.name);
        return;
    }

    println!();
    println!("Analysis for: {}", report.name);
    println!("  Uptime: {}%", report.uptime_percent);
    println!("  Total checks: {}", report.total_checks);
    println!("  Successful: {}", report.up_count);
    println!("  Failed: {}", report.down_count);
    println!("  Average response time: {}ms", report.avg_response_time_ms);

    if report.incidents.is_empty() {
        println!("  No incidents recorded");
    } else {
        println!("  Recent incidents ({} total):", report.incidents.len());
        let start = report.incidents.len().saturating_sub(5);
        for incident in &report.incidents[start..] {
            println!(
                "    [{}] {}: {}",
                incident.timestamp.to_rfc3339(),
                incident.status,
                incident.error
            );
        }
    }
}
