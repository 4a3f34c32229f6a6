//! Simulated feed
//!
//! Emits a synthetic track from a background thread at a fixed frequency,
//! consistent with how a live daemon pushes reports.
//! Used by the bootstrap binary and for development without gpsd.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use contracts::{FeedConnection, FeedConnector, ReportCallback, SensorError, TpvReport};
use tracing::{debug, instrument, trace, warn};

/// Meters per degree of latitude
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Fastest supported report rate
const MAX_FREQUENCY_HZ: f64 = 1_000.0;

/// Simulated feed configuration
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    /// Report frequency (Hz)
    pub frequency_hz: f64,
    /// First reported position; `speed` and `track` drive the motion
    pub origin: TpvReport,
    /// Addresses that refuse connections
    pub unreachable: Vec<String>,
    /// Make `close` fail
    pub fail_close: bool,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1.0,
            origin: TpvReport::new(37.0, -122.0, 10.0, 2.5, 90.0),
            unreachable: Vec::new(),
            fail_close: false,
        }
    }
}

/// Connector producing simulated connections
#[derive(Debug, Default, Clone)]
pub struct SimulatedConnector {
    config: SimulatedConfig,
}

impl SimulatedConnector {
    pub fn new(config: SimulatedConfig) -> Self {
        Self { config }
    }
}

impl FeedConnector for SimulatedConnector {
    #[instrument(name = "simulated_feed_open", skip(self), fields(address = %address))]
    async fn open(&self, address: &str) -> Result<Box<dyn FeedConnection>, SensorError> {
        if self.config.unreachable.iter().any(|a| a == address) {
            return Err(SensorError::connection(address, "connection refused"));
        }
        let interval = report_interval(self.config.frequency_hz)
            .map_err(|message| SensorError::connection(address, message))?;

        debug!(address = %address, frequency_hz = self.config.frequency_hz, "simulated feed opened");

        Ok(Box::new(SimulatedConnection {
            address: address.to_string(),
            config: self.config.clone(),
            interval,
            callback: None,
            listening: Arc::new(AtomicBool::new(false)),
            worker: None,
        }))
    }
}

/// Delay between reports at `frequency_hz`
fn report_interval(frequency_hz: f64) -> Result<Duration, String> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 || frequency_hz > MAX_FREQUENCY_HZ {
        return Err(format!(
            "invalid frequency {frequency_hz} Hz, expected (0, {MAX_FREQUENCY_HZ}]"
        ));
    }
    Duration::try_from_secs_f64(1.0 / frequency_hz)
        .map_err(|e| format!("invalid frequency {frequency_hz} Hz: {e}"))
}

/// Advance `report` along its track by `dt` seconds
fn step(report: &TpvReport, dt: f64) -> TpvReport {
    let distance = report.speed * dt;
    let track = report.track.to_radians();
    let dlat = distance * track.cos() / METERS_PER_DEGREE;
    let dlon = distance * track.sin() / (METERS_PER_DEGREE * report.lat.to_radians().cos());

    TpvReport {
        lat: report.lat + dlat,
        lon: report.lon + dlon,
        ..*report
    }
}

struct SimulatedConnection {
    address: String,
    config: SimulatedConfig,
    interval: Duration,
    callback: Option<ReportCallback>,
    listening: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FeedConnection for SimulatedConnection {
    fn address(&self) -> &str {
        &self.address
    }

    fn on_report(&mut self, callback: ReportCallback) {
        self.callback = Some(callback);
    }

    fn watch(&mut self) -> Result<(), SensorError> {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            warn!(address = %self.address, "simulated feed already watching");
            return Ok(());
        }

        let Some(callback) = self.callback.clone() else {
            self.listening.store(false, Ordering::SeqCst);
            return Err(SensorError::connection(
                &self.address,
                "watch called before a report handler was registered",
            ));
        };

        let address = self.address.clone();
        let listening = self.listening.clone();
        let interval = self.interval;
        let mut report = self.config.origin;

        let worker = thread::Builder::new()
            .name("simulated-gpsd".to_string())
            .spawn(move || {
                let mut seq: u64 = 0;
                debug!(address = %address, "simulated feed started");

                while listening.load(Ordering::SeqCst) {
                    seq += 1;
                    callback(report);
                    trace!(address = %address, seq, lat = report.lat, lon = report.lon, "simulated report sent");

                    thread::park_timeout(interval);
                    report = step(&report, interval.as_secs_f64());
                }

                debug!(address = %address, "simulated feed stopped");
            })
            .map_err(|e| SensorError::connection(&self.address, e.to_string()))?;

        self.worker = Some(worker);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SensorError> {
        self.listening.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            if worker.join().is_err() {
                return Err(SensorError::shutdown("simulated feed worker panicked"));
            }
        }
        self.callback = None;

        if self.config.fail_close {
            return Err(SensorError::shutdown("injected close failure"));
        }
        Ok(())
    }
}

impl Drop for SimulatedConnection {
    fn drop(&mut self) {
        self.listening.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_step_moves_east() {
        let origin = TpvReport::new(0.0, 0.0, 0.0, 10.0, 90.0);
        let next = step(&origin, 1.0);
        assert!(next.lat.abs() < 1e-9);
        assert!((next.lon - 10.0 / METERS_PER_DEGREE).abs() < 1e-12);
        assert_eq!(next.speed, origin.speed);
    }

    #[tokio::test]
    async fn test_simulated_feed_delivers_until_closed() {
        let connector = SimulatedConnector::new(SimulatedConfig {
            frequency_hz: 200.0,
            ..Default::default()
        });
        let mut conn = connector.open("localhost:2947").await.unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        conn.on_report(Arc::new(move |report| {
            received_clone.lock().unwrap().push(report);
        }));
        conn.watch().unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        conn.close().unwrap();

        let count = received.lock().unwrap().len();
        assert!(count > 0);
        assert_eq!(received.lock().unwrap()[0], SimulatedConfig::default().origin);

        // No delivery after close
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(received.lock().unwrap().len(), count);
    }

    #[tokio::test]
    async fn test_watch_without_handler_fails() {
        let connector = SimulatedConnector::default();
        let mut conn = connector.open("localhost:2947").await.unwrap();
        assert!(matches!(conn.watch(), Err(SensorError::Connection { .. })));
    }

    #[test]
    fn test_report_interval() {
        assert_eq!(report_interval(4.0), Ok(Duration::from_millis(250)));
        assert!(report_interval(MAX_FREQUENCY_HZ).is_ok());
        for frequency_hz in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-310, 1e9] {
            assert!(report_interval(frequency_hz).is_err(), "{frequency_hz}");
        }
    }

    #[tokio::test]
    async fn test_out_of_range_frequency_refuses_open() {
        for frequency_hz in [1e-310, f64::INFINITY] {
            let connector = SimulatedConnector::new(SimulatedConfig {
                frequency_hz,
                ..Default::default()
            });
            let result = connector.open("localhost:2947").await;
            assert!(matches!(result, Err(SensorError::Connection { .. })));
        }
    }

    #[tokio::test]
    async fn test_unreachable_address() {
        let connector = SimulatedConnector::new(SimulatedConfig {
            unreachable: vec!["gpsd.invalid:2947".to_string()],
            ..Default::default()
        });
        assert!(connector.open("gpsd.invalid:2947").await.is_err());
    }
}
