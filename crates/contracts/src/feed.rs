//! Feed capability - the location-data daemon as seen by the sensor
//!
//! The sensor never speaks the daemon protocol itself. It opens a
//! [`FeedConnection`] through a [`FeedConnector`], registers a report
//! callback, starts delivery and eventually closes the connection.

use std::sync::Arc;

use crate::{SensorError, TpvReport};

/// Report delivery callback
///
/// Invoked on the feed's own delivery context for every decoded positional
/// report. Must not block.
pub type ReportCallback = Arc<dyn Fn(TpvReport) + Send + Sync>;

/// Open connection to a feed
pub trait FeedConnection: Send {
    /// Address this connection was opened against
    fn address(&self) -> &str;

    /// Register the handler for positional reports
    ///
    /// Must be called before [`FeedConnection::watch`]; a later registration
    /// replaces the earlier one.
    fn on_report(&mut self, callback: ReportCallback);

    /// Start asynchronous delivery
    fn watch(&mut self) -> Result<(), SensorError>;

    /// Stop delivery and release the connection
    ///
    /// After a successful close the callback is never invoked again.
    fn close(&mut self) -> Result<(), SensorError>;
}

/// Feed dialer
#[trait_variant::make(FeedConnector: Send)]
pub trait LocalFeedConnector {
    /// Dial the feed at `address`
    ///
    /// # Errors
    /// [`SensorError::Connection`] when the feed cannot be reached.
    async fn open(&self, address: &str) -> Result<Box<dyn FeedConnection>, SensorError>;
}
