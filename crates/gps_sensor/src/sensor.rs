//! GpsSensor - movement sensor facade over the report cache

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use contracts::{
    AngularVelocity, Clock, EulerAngles, FeedConnection, FeedConnector, GeoPoint, MovementSensor,
    Position, Properties, ReadOptions, Reading, Readings, SensorConfig, SensorError, SensorName,
    SystemClock, Vector3, MOVEMENT_SENSOR_MODEL,
};
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::cache::{CacheSnapshot, ReportCache};
use crate::ingest::{delivery_slot, ingest_loop, report_callback, IngestMetrics, IngestStats};
use crate::staleness::StalenessPolicy;

/// How long `close` waits for the ingest task to drain
const INGEST_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// gpsd-backed movement sensor
///
/// Owns its feed connection and report cache exclusively, so several
/// sensors can coexist in one process.
///
/// Lifecycle: constructed (watching) -> closed. Reads remain valid after
/// close; they keep answering from the last cached report, which simply
/// keeps aging.
pub struct GpsSensor {
    name: SensorName,
    cache: Arc<ReportCache>,
    policy: StalenessPolicy,
    clock: Arc<dyn Clock>,
    metrics: Arc<IngestMetrics>,
    connection: Mutex<Option<Box<dyn FeedConnection>>>,
    ingest_task: Mutex<Option<JoinHandle<()>>>,
}

impl GpsSensor {
    /// Open the feed and start ingesting, using the system clock
    ///
    /// # Errors
    /// [`SensorError::Connection`] when the feed cannot be opened or watched.
    /// No sensor is returned in that case.
    pub async fn new<C>(config: &SensorConfig, connector: &C) -> Result<Self, SensorError>
    where
        C: FeedConnector + Sync,
    {
        Self::with_clock(config, connector, Arc::new(SystemClock)).await
    }

    /// Open the feed and start ingesting, using `clock` for all timing
    #[instrument(
        name = "gps_sensor_new",
        skip(config, connector, clock),
        fields(sensor = %config.name, address = %config.feed_address)
    )]
    pub async fn with_clock<C>(
        config: &SensorConfig,
        connector: &C,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SensorError>
    where
        C: FeedConnector + Sync,
    {
        let name = SensorName::from(config.name.as_str());
        let address = config.feed_address.clone();

        let mut connection = connector.open(&address).await?;

        let cache = Arc::new(ReportCache::new());
        let metrics = Arc::new(IngestMetrics::new());
        let (tx, rx) = delivery_slot();

        connection.on_report(report_callback(
            name.clone(),
            clock.clone(),
            tx,
            metrics.clone(),
        ));
        let ingest_task = tokio::spawn(ingest_loop(
            name.clone(),
            rx,
            cache.clone(),
            metrics.clone(),
        ));

        if let Err(e) = connection.watch() {
            ingest_task.abort();
            if let Err(close_err) = connection.close() {
                debug!(error = %close_err, "close after failed watch also failed");
            }
            return Err(match e {
                SensorError::Connection { .. } => e,
                other => SensorError::connection(&address, other.to_string()),
            });
        }

        info!(
            sensor = %name,
            model = %MOVEMENT_SENSOR_MODEL,
            address = %connection.address(),
            stale_after_secs = config.stale_after_secs,
            "gps sensor watching feed"
        );

        Ok(Self {
            name,
            cache,
            policy: StalenessPolicy::new(config.stale_after()),
            clock,
            metrics,
            connection: Mutex::new(Some(connection)),
            ingest_task: Mutex::new(Some(ingest_task)),
        })
    }

    /// Copy of the cached report, its timestamp and the capability flags
    pub fn snapshot(&self) -> CacheSnapshot {
        self.cache.snapshot()
    }

    /// Ingest counters
    pub fn stats(&self) -> IngestStats {
        self.metrics.snapshot()
    }

    /// True until `close` has been called
    pub fn is_open(&self) -> bool {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Close the feed and stop ingesting.
    ///
    /// Later calls are no-ops returning `Ok(())`.
    ///
    /// # Errors
    /// [`SensorError::Shutdown`] when the feed fails to close. The sensor is
    /// considered closed regardless.
    #[instrument(name = "gps_sensor_close", skip(self), fields(sensor = %self.name))]
    pub async fn close(&self) -> Result<(), SensorError> {
        let connection = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(mut connection) = connection else {
            debug!(sensor = %self.name, "gps sensor already closed");
            return Ok(());
        };

        let result = connection.close().map_err(|e| match e {
            SensorError::Shutdown { .. } => e,
            other => SensorError::shutdown(other.to_string()),
        });
        // Dropping the connection releases the delivery callback and with it
        // the last channel sender, which ends the ingest task.
        drop(connection);

        let task = self
            .ingest_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut task) = task {
            if tokio::time::timeout(INGEST_DRAIN_TIMEOUT, &mut task)
                .await
                .is_err()
            {
                warn!(sensor = %self.name, "ingest task did not stop, aborting");
                task.abort();
            }
        }

        match &result {
            Ok(()) => info!(sensor = %self.name, "gps sensor closed"),
            Err(e) => warn!(sensor = %self.name, error = %e, "gps sensor close failed"),
        }
        result
    }

    /// Apply the staleness policy to data stamped `last_update`
    fn check_freshness(
        &self,
        last_update: Option<DateTime<Utc>>,
        options: &ReadOptions,
    ) -> Result<(), SensorError> {
        let now = self.clock.now();
        if let Some(age) = StalenessPolicy::age(last_update, now) {
            observability::record_data_age(&self.name, age.num_milliseconds() as f64 / 1000.0);
        }

        let result = self.policy.check(last_update, now, options);
        if let Err(e) = &result {
            observability::record_stale_read(&self.name, options.from_automated_capture);
            if e.is_no_data_to_capture() {
                trace!(sensor = %self.name, "stale data, nothing to capture");
            } else {
                debug!(sensor = %self.name, last_update = ?last_update, "stale data read");
            }
        }
        result
    }

    /// Snapshot plus staleness verdict for freshness-checked reads
    fn checked_snapshot(&self, options: &ReadOptions) -> (CacheSnapshot, Result<(), SensorError>) {
        let snapshot = self.cache.snapshot();
        let check = self.check_freshness(snapshot.last_update, options);
        (snapshot, check)
    }
}

impl MovementSensor for GpsSensor {
    fn name(&self) -> &SensorName {
        &self.name
    }

    async fn position(&self, options: &ReadOptions) -> Reading<Position> {
        let (snapshot, check) = self.checked_snapshot(options);
        let report = snapshot.report;
        Reading::checked(
            Position {
                point: GeoPoint::new(report.lat, report.lon),
                altitude: report.alt,
            },
            check,
        )
    }

    async fn linear_velocity(&self, options: &ReadOptions) -> Reading<Vector3> {
        let (snapshot, check) = self.checked_snapshot(options);
        Reading::checked(Vector3::new(0.0, snapshot.report.speed, 0.0), check)
    }

    async fn angular_velocity(&self, _options: &ReadOptions) -> Reading<AngularVelocity> {
        Reading::fresh(AngularVelocity::default())
    }

    async fn linear_acceleration(&self, _options: &ReadOptions) -> Reading<Vector3> {
        Reading::fresh(Vector3::default())
    }

    async fn compass_heading(&self, options: &ReadOptions) -> Reading<f64> {
        let (snapshot, check) = self.checked_snapshot(options);
        Reading::checked(snapshot.report.track, check)
    }

    async fn orientation(&self, _options: &ReadOptions) -> Reading<EulerAngles> {
        Reading::fresh(EulerAngles::default())
    }

    async fn properties(&self, _options: &ReadOptions) -> Result<Properties, SensorError> {
        Ok(self.cache.snapshot().properties)
    }

    async fn accuracy(
        &self,
        _options: &ReadOptions,
    ) -> Result<Option<HashMap<String, f32>>, SensorError> {
        Ok(None)
    }

    async fn do_command(
        &self,
        _command: &Map<String, Value>,
    ) -> Result<Option<Map<String, Value>>, SensorError> {
        Ok(None)
    }

    async fn readings(&self, options: &ReadOptions) -> Result<Readings, SensorError> {
        contracts::readings(self, options).await
    }
}

// Feed close may join a delivery thread; inside a runtime it runs on the
// blocking pool instead of the dropping thread.
impl Drop for GpsSensor {
    fn drop(&mut self) {
        let connection = self
            .connection
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut connection) = connection {
            let name = self.name.clone();
            let mut close = move || {
                if let Err(e) = connection.close() {
                    warn!(sensor = %name, error = %e, "feed close on drop failed");
                }
            };
            match Handle::try_current() {
                Ok(handle) => {
                    handle.spawn_blocking(close);
                }
                Err(_) => close(),
            }
        }
        if let Some(task) = self
            .ingest_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}
