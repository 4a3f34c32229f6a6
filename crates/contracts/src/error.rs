//! Layered error definitions
//!
//! Categorized by source: config / feed / staleness

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::ReadOptions;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ContractError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Sensor runtime error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    // ===== Feed Errors =====
    /// The feed could not be opened; fatal to sensor construction
    #[error("failed to connect to gpsd at {address}: {message}")]
    Connection { address: String, message: String },

    /// Closing the feed failed
    #[error("failed to close gpsd feed: {message}")]
    Shutdown { message: String },

    // ===== Staleness =====
    /// Cached data is older than the staleness threshold
    #[error("last update too old: {} ({:?})", display_last_update(.last_update), .options)]
    StaleData {
        last_update: Option<DateTime<Utc>>,
        options: ReadOptions,
    },

    /// Data is stale and the caller is automated capture: nothing to store this cycle
    #[error("no captured data to store")]
    NoDataToCapture,
}

impl SensorError {
    /// Create connection error
    pub fn connection(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create shutdown error
    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }

    /// True for the capture sentinel
    pub fn is_no_data_to_capture(&self) -> bool {
        matches!(self, Self::NoDataToCapture)
    }

    /// True for the descriptive staleness error
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleData { .. })
    }
}

fn display_last_update(last_update: &Option<DateTime<Utc>>) -> String {
    match last_update {
        Some(at) => at.to_rfc3339(),
        None => "never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stale_message_includes_timestamp_and_options() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let err = SensorError::StaleData {
            last_update: Some(at),
            options: ReadOptions::default(),
        };
        let message = err.to_string();
        assert!(message.contains("2024-05-01T12:00:00+00:00"));
        assert!(message.contains("from_automated_capture: false"));
        assert!(err.is_stale());
        assert!(!err.is_no_data_to_capture());
    }

    #[test]
    fn test_stale_message_never_updated() {
        let err = SensorError::StaleData {
            last_update: None,
            options: ReadOptions::default(),
        };
        assert!(err.to_string().starts_with("last update too old: never"));
    }

    #[test]
    fn test_connection_error_display() {
        let err = SensorError::connection("localhost:2947", "connection refused");
        assert_eq!(
            err.to_string(),
            "failed to connect to gpsd at localhost:2947: connection refused"
        );
    }
}
