//! Configuration validation
//!
//! Field rules live on `SensorConfig` as `validator` attributes:
//! - name non-empty
//! - feed_address non-empty and of the form `host:port`
//! - stale_after_secs >= 1

use contracts::{ContractError, SensorConfig};
use validator::Validate;

/// Validate a SensorConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &SensorConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_feed_address(&config.feed_address)?;
    Ok(())
}

fn validate_fields(config: &SensorConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    match fields.first() {
        Some((field, errs)) => {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid value".to_string());
            Err(ContractError::config_validation(field.to_string(), message))
        }
        None => Err(ContractError::config_validation("config", errors.to_string())),
    }
}

/// gpsd addresses are `host:port` with a numeric port
fn validate_feed_address(address: &str) -> Result<(), ContractError> {
    let valid = address
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());

    if valid {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            "feed_address",
            format!("expected host:port, got '{address}'"),
        ))
    }
}
