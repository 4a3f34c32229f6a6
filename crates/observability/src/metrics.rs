//! Sensor metrics
//!
//! Thin wrappers over the `metrics` macros; no-ops until a recorder is
//! installed.

use metrics::{counter, gauge};

/// A report was written to the cache
pub fn record_report_ingested(sensor: &str) {
    counter!("gpsd_sensor_reports_total", "sensor" => sensor.to_string()).increment(1);
}

/// Reports that never reached the cache, superseded by a newer delivery
/// or arriving after shutdown
pub fn record_report_dropped(sensor: &str, count: u64) {
    counter!("gpsd_sensor_reports_dropped_total", "sensor" => sensor.to_string()).increment(count);
}

/// A read found stale data
pub fn record_stale_read(sensor: &str, from_capture: bool) {
    counter!(
        "gpsd_sensor_stale_reads_total",
        "sensor" => sensor.to_string(),
        "capture" => from_capture.to_string()
    )
    .increment(1);
}

/// Age of the cached data at read time (seconds)
pub fn record_data_age(sensor: &str, age_secs: f64) {
    gauge!("gpsd_sensor_data_age_seconds", "sensor" => sensor.to_string()).set(age_secs);
}
