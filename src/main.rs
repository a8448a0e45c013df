//! # TrackLab — Lab Notebook & Biweekly Project Tracker
//!
//! Local-first backend: records work logs against a plan → project →
//! activity hierarchy, keeps derived statuses consistent, pushes real-time
//! notifications over WebSocket, and runs a scheduled Ollama analysis of
//! each day's logs.
//!
//! Usage:
//!   tracklab                       # Start the gateway + scheduler
//!   tracklab serve                 # Same, explicitly
//!   tracklab analyze --date DATE   # Run the analysis pipeline once
//!   tracklab status                # Probe the Ollama endpoint

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tracklab_analysis::{OllamaClient, run_daily_analysis};
use tracklab_core::TrackLabConfig;
use tracklab_db::Database;
use tracklab_gateway::{AppState, NotificationHub, spawn_bridge_pump};
use tracklab_scheduler::{EventBridge, JobContext, SchedulerEngine};

#[derive(Parser)]
#[command(
    name = "tracklab",
    version,
    about = "Lab notebook backend — work logs, status cascade, scheduled popups, Ollama analysis"
)]
struct Cli {
    /// Path to config.toml (default: ~/.tracklab/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the gateway server and the background scheduler.
    Serve,
    /// Run the daily analysis pipeline for a date and print the summary.
    Analyze {
        /// ISO date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Check Ollama connectivity and model availability.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TrackLabConfig::load_from(path)?,
        None => TrackLabConfig::load()?,
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Analyze { date } => analyze(config, date).await,
        Command::Status => status(config).await,
    }
}

async fn serve(config: TrackLabConfig) -> Result<()> {
    let db = Arc::new(Database::open(&config.database.resolved_path())?);
    let hub = Arc::new(NotificationHub::new());
    let ollama = Arc::new(OllamaClient::new(&config.ollama));

    // bridge: scheduler thread → gateway runtime → hub
    let (bridge, bridge_rx) = EventBridge::channel();
    let pump = spawn_bridge_pump(hub.clone(), bridge_rx);

    let mut engine = SchedulerEngine::new(
        JobContext {
            db: db.clone(),
            ollama: ollama.clone(),
            analysis_enabled: config.ollama.analysis_enabled,
        },
        bridge,
    );
    engine.register_defaults(&config.scheduler, chrono::Local::now())?;
    let scheduler = tracklab_scheduler::spawn(engine, config.scheduler.tick_secs);

    let state = Arc::new(AppState {
        db,
        hub,
        ollama,
        scheduler: scheduler.client(),
        start_time: std::time::Instant::now(),
        config,
    });

    let result = tracklab_gateway::serve(state).await;

    scheduler.shutdown();
    let _ = pump.await;
    result?;
    Ok(())
}

async fn analyze(config: TrackLabConfig, date: Option<String>) -> Result<()> {
    let db = Database::open(&config.database.resolved_path())?;
    let client = OllamaClient::new(&config.ollama);
    let date = date.unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

    let summary = run_daily_analysis(&db, &client, &date, config.ollama.analysis_enabled).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn status(config: TrackLabConfig) -> Result<()> {
    let client = OllamaClient::new(&config.ollama);
    let health = client.health().await;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}
