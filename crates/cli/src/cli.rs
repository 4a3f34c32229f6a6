//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// gpsd-sensor - movement sensor backed by a gpsd feed
#[derive(Parser, Debug)]
#[command(
    name = "gpsd-sensor",
    author,
    version,
    about = "GPS movement sensor over a gpsd feed",
    long_about = "Keeps a continuously-updated GPS state cache fed by a location daemon \n\
                  and serves position, velocity and heading with staleness detection."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GPSD_SENSOR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GPSD_SENSOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sensor and log readings periodically
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "GPSD_SENSOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sensor name (overrides configuration)
    #[arg(long, env = "GPSD_SENSOR_NAME")]
    pub name: Option<String>,

    /// gpsd address host:port (overrides configuration)
    #[arg(long, env = "GPSD_SENSOR_ADDRESS")]
    pub address: Option<String>,

    /// Report frequency of the simulated feed (Hz)
    #[arg(long, default_value = "1.0", env = "GPSD_SENSOR_SIM_HZ")]
    pub frequency: f64,

    /// Seconds between logged readings
    #[arg(long, default_value = "5", env = "GPSD_SENSOR_INTERVAL")]
    pub interval: u64,

    /// Stop after this many readings (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_readings: u64,

    /// Read as the automated data-capture path (stale cycles are skipped silently)
    #[arg(long)]
    pub capture: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "GPSD_SENSOR_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "gps.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
