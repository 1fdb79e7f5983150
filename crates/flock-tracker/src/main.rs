//! Flock Tracker - coordination server for peer file distribution

use anyhow::{Context, Result};
use clap::Parser;
use flock_tracker::{routes, sweeper, TrackerConfig, TrackerState};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "flock-tracker")]
#[command(about = "Flock tracker server", long_about = None)]
struct Cli {
    /// Path to config file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "tracker.toml")]
    config: PathBuf,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = if cli.config.exists() {
        TrackerConfig::load(&cli.config)
            .with_context(|| format!("failed to load config from {}", cli.config.display()))?
    } else {
        TrackerConfig::default()
    };
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    tracing::info!("Starting Flock tracker on {}", config.listen_addr);
    tracing::info!(
        "Sweeping every {}s, evicting after {}s of silence",
        config.sweep_interval_secs,
        config.staleness_secs
    );

    let state = Arc::new(TrackerState::new(config.peer_limit));

    let sweeper_handle = sweeper::spawn(state.clone(), config.sweep_interval(), config.staleness());

    let app = routes::router(state).layer(TimeoutLayer::new(config.request_timeout()));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Shutting down");
    sweeper_handle.abort();

    Ok(())
}
