//! Ingest path: feed delivery context -> latest-value slot -> cache update
//!
//! The slot only ever holds the newest delivery. A burst that outruns the
//! ingest task overwrites older deliveries, so the cache always converges on
//! the last report the feed handed over.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use contracts::{Clock, ReportCallback, SensorName, TpvReport};
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::cache::ReportCache;

/// Ingest counters
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Reports handed to the delivery callback
    pub reports_received: AtomicU64,

    /// Reports written to the cache
    pub reports_ingested: AtomicU64,

    /// Reports superseded before the ingest task saw them, or delivered
    /// after the ingest task stopped
    pub reports_dropped: AtomicU64,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.reports_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingested(&self) {
        self.reports_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, count: u64) {
        self.reports_dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> IngestStats {
        IngestStats {
            reports_received: self.reports_received.load(Ordering::Relaxed),
            reports_ingested: self.reports_ingested.load(Ordering::Relaxed),
            reports_dropped: self.reports_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Ingest counters snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub reports_received: u64,
    pub reports_ingested: u64,
    pub reports_dropped: u64,
}

/// A report as handed over by the feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Delivery {
    /// Position in delivery order, starting at 1
    pub seq: u64,
    pub report: TpvReport,
    pub delivered_at: DateTime<Utc>,
}

/// Slot shared between the delivery callback and the ingest task
pub(crate) fn delivery_slot() -> (
    watch::Sender<Option<Delivery>>,
    watch::Receiver<Option<Delivery>>,
) {
    watch::channel(None)
}

/// Build the callback registered with the feed.
///
/// Runs on the feed's delivery context; it stamps the report and publishes it
/// into the slot without touching the cache lock.
pub(crate) fn report_callback(
    sensor: SensorName,
    clock: Arc<dyn Clock>,
    tx: watch::Sender<Option<Delivery>>,
    metrics: Arc<IngestMetrics>,
) -> ReportCallback {
    Arc::new(move |report| {
        metrics.record_received();

        if tx.is_closed() {
            metrics.record_dropped(1);
            observability::record_report_dropped(&sensor, 1);
            debug!(sensor = %sensor, "ingest stopped, report dropped");
            return;
        }

        // Sequence and stamp are assigned under the slot's write lock, so
        // concurrent deliveries are ordered the same way in both.
        tx.send_modify(|slot| {
            let seq = slot.map_or(1, |previous| previous.seq + 1);
            *slot = Some(Delivery {
                seq,
                report,
                delivered_at: clock.now(),
            });
        });
        trace!(sensor = %sensor, "report published");
    })
}

/// Move deliveries into the cache until the callback is gone
pub(crate) async fn ingest_loop(
    sensor: SensorName,
    mut rx: watch::Receiver<Option<Delivery>>,
    cache: Arc<ReportCache>,
    metrics: Arc<IngestMetrics>,
) {
    debug!(sensor = %sensor, "ingest task started");
    let mut last_seq = 0;

    // `changed` still yields an unseen final delivery after the sender drops.
    while rx.changed().await.is_ok() {
        let Some(delivery) = *rx.borrow_and_update() else {
            continue;
        };

        let superseded = delivery.seq.saturating_sub(last_seq + 1);
        if superseded > 0 {
            metrics.record_dropped(superseded);
            observability::record_report_dropped(&sensor, superseded);
            debug!(sensor = %sensor, superseded, "newer report superseded queued ones");
        }
        last_seq = delivery.seq;

        let report = delivery.report;
        let stamp = cache.update(report, delivery.delivered_at);
        metrics.record_ingested();
        observability::record_report_ingested(&sensor);
        trace!(
            sensor = %sensor,
            lat = report.lat,
            lon = report.lon,
            at = %stamp,
            "cache updated"
        );
    }

    debug!(sensor = %sensor, "ingest task stopped");
}
