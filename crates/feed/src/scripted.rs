//! Scripted feed
//!
//! Reports are delivered only when a test calls [`FeedController::deliver`],
//! on the caller's thread, exactly as a real feed would invoke the callback
//! from its own delivery context.

use std::sync::{Arc, Mutex, PoisonError};

use contracts::{FeedConnection, FeedConnector, ReportCallback, SensorError, TpvReport};
use tracing::{debug, instrument, trace};

/// Scripted feed configuration (failure injection)
#[derive(Debug, Default, Clone)]
pub struct ScriptedConfig {
    /// Addresses that refuse connections
    pub unreachable: Vec<String>,
    /// Make `close` fail
    pub fail_close: bool,
}

#[derive(Default)]
struct FeedState {
    callback: Option<ReportCallback>,
    opened: usize,
    watching: bool,
    closed: bool,
}

/// Test handle driving every connection opened by a [`ScriptedConnector`]
#[derive(Clone, Default)]
pub struct FeedController {
    state: Arc<Mutex<FeedState>>,
}

impl FeedController {
    /// Deliver one report to the registered callback
    ///
    /// Returns `false` when nothing was delivered (not watching, or closed).
    pub fn deliver(&self, report: TpvReport) -> bool {
        let callback = {
            let state = self.lock();
            if !state.watching || state.closed {
                trace!("scripted report discarded, feed not watching");
                return false;
            }
            state.callback.clone()
        };

        match callback {
            Some(callback) => {
                callback(report);
                true
            }
            None => false,
        }
    }

    /// Number of successful opens
    pub fn open_count(&self) -> usize {
        self.lock().opened
    }

    pub fn is_watching(&self) -> bool {
        let state = self.lock();
        state.watching && !state.closed
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Connector producing scripted connections
#[derive(Default)]
pub struct ScriptedConnector {
    config: ScriptedConfig,
    controller: FeedController,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::with_config(ScriptedConfig::default())
    }

    pub fn with_config(config: ScriptedConfig) -> Self {
        Self {
            config,
            controller: FeedController::default(),
        }
    }

    /// Handle for delivering reports and inspecting connection state
    pub fn controller(&self) -> FeedController {
        self.controller.clone()
    }
}

impl FeedConnector for ScriptedConnector {
    #[instrument(name = "scripted_feed_open", skip(self), fields(address = %address))]
    async fn open(&self, address: &str) -> Result<Box<dyn FeedConnection>, SensorError> {
        if self.config.unreachable.iter().any(|a| a == address) {
            return Err(SensorError::connection(address, "connection refused"));
        }

        {
            let mut state = self.controller.lock();
            state.opened += 1;
            state.watching = false;
            state.closed = false;
            state.callback = None;
        }
        debug!(address = %address, "scripted feed opened");

        Ok(Box::new(ScriptedConnection {
            address: address.to_string(),
            controller: self.controller.clone(),
            fail_close: self.config.fail_close,
        }))
    }
}

struct ScriptedConnection {
    address: String,
    controller: FeedController,
    fail_close: bool,
}

impl FeedConnection for ScriptedConnection {
    fn address(&self) -> &str {
        &self.address
    }

    fn on_report(&mut self, callback: ReportCallback) {
        self.controller.lock().callback = Some(callback);
    }

    fn watch(&mut self) -> Result<(), SensorError> {
        self.controller.lock().watching = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SensorError> {
        let mut state = self.controller.lock();
        state.watching = false;
        state.callback = None;
        if self.fail_close {
            return Err(SensorError::shutdown("injected close failure"));
        }
        state.closed = true;
        Ok(())
    }
}
