//! Weather SDK - command line demo
//!
//! Prints current conditions for each location given on the command line.
//!
//! # Usage
//! ```text
//! OPENWEATHER_API_KEY=... weather_sdk London Paris
//! WEATHER_MODE=periodic OPENWEATHER_API_KEY=... weather_sdk London
//! ```
//!
//! In periodic mode the process keeps refreshing the cached locations until
//! Ctrl+C or SIGTERM.

use std::env;

use anyhow::{bail, Context};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_sdk::{Config, Mode, WeatherRegistry};

/// Main entry point for the weather demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration and credentials from environment variables
/// 3. Resolve the instance for the API key
/// 4. Fetch and print each requested location
/// 5. In periodic mode, wait for a shutdown signal
/// 6. Dispose the instance
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_sdk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_key = env::var("OPENWEATHER_API_KEY").context("OPENWEATHER_API_KEY is not set")?;
    let mode: Mode = env::var("WEATHER_MODE")
        .ok()
        .map(|m| m.parse::<Mode>())
        .transpose()?
        .unwrap_or_default();
    let locations: Vec<String> = env::args().skip(1).collect();
    if locations.is_empty() {
        bail!("usage: weather_sdk <location>...");
    }

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, freshness={:?}, refresh_interval={:?}, mode={}",
        config.cache_capacity, config.freshness, config.refresh_interval, mode
    );

    let registry = WeatherRegistry::with_config(config);
    let client = registry.resolve(&api_key, mode).await?;

    for location in &locations {
        match client.get_weather(location).await {
            Ok(json) => println!("{json}"),
            Err(e) => error!("{}: {}", location, e),
        }
    }

    if mode == Mode::Periodic {
        info!("Refreshing cached locations in the background; press Ctrl+C to stop");
        shutdown_signal().await;
    }

    registry.dispose(&api_key).await;
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
