//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{MovementSensor, ReadOptions, SensorConfig, SensorError};
use feed::{SimulatedConfig, SimulatedConnector};
use gps_sensor::GpsSensor;
use std::time::Duration;
use tracing::{info, trace, warn};

use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_sensor(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    info!(
        sensor = %config.name,
        address = %config.feed_address,
        stale_after_secs = config.stale_after_secs,
        "Configuration loaded"
    );

    let connector = SimulatedConnector::new(SimulatedConfig {
        frequency_hz: args.frequency,
        ..Default::default()
    });
    let sensor = GpsSensor::new(&config, &connector)
        .await
        .with_context(|| format!("Failed to start sensor on {}", config.feed_address))?;

    let options = ReadOptions {
        from_automated_capture: args.capture,
    };

    tokio::select! {
        _ = poll_readings(&sensor, &options, args) => {}
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping sensor...");
        }
    }

    let stats = sensor.stats();
    info!(
        reports_received = stats.reports_received,
        reports_ingested = stats.reports_ingested,
        reports_dropped = stats.reports_dropped,
        "Feed statistics"
    );

    sensor.close().await.context("Failed to close sensor")?;
    info!("gpsd-sensor finished");
    Ok(())
}

/// Build the sensor configuration from file (if any) plus CLI overrides
fn load_config(args: &RunArgs) -> Result<SensorConfig> {
    let mut config = match &args.config {
        Some(path) => config_loader::ConfigLoader::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SensorConfig::new("gps"),
    };

    if let Some(ref name) = args.name {
        info!(name = %name, "Overriding sensor name from CLI");
        config.name = name.clone();
    }
    if let Some(ref address) = args.address {
        info!(address = %address, "Overriding feed address from CLI");
        config.feed_address = address.clone();
    }

    config_loader::ConfigLoader::validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Log aggregate readings every `interval` seconds
async fn poll_readings(sensor: &GpsSensor, options: &ReadOptions, args: &RunArgs) {
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    let mut count: u64 = 0;

    loop {
        ticker.tick().await;

        match sensor.readings(options).await {
            Ok(readings) => match serde_json::to_string(&readings) {
                Ok(json) => info!(sensor = %sensor.name(), readings = %json, "Readings"),
                Err(e) => warn!(error = %e, "Failed to serialize readings"),
            },
            Err(SensorError::NoDataToCapture) => {
                trace!(sensor = %sensor.name(), "Nothing to capture this cycle");
            }
            Err(e) => warn!(sensor = %sensor.name(), error = %e, "Readings unavailable"),
        }

        count += 1;
        if args.max_readings != 0 && count >= args.max_readings {
            info!(count, "Reached max readings");
            break;
        }
    }
}

/// Ctrl+C and SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
