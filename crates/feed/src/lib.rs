//! # Feed
//!
//! Feed implementations consumed by the sensor through the
//! `FeedConnector` / `FeedConnection` contracts.
//!
//! Responsibilities:
//! - Simulated feed: background thread emitting a synthetic track
//! - Scripted feed: test-driven delivery through a [`FeedController`]
//! - Failure injection on open and close
//!
//! Neither implementation speaks the gpsd wire protocol; they produce
//! already-decoded [`contracts::TpvReport`]s.

pub mod scripted;
pub mod simulated;

pub use contracts::{FeedConnection, FeedConnector, ReportCallback, TpvReport};
pub use scripted::{FeedController, ScriptedConfig, ScriptedConnector};
pub use simulated::{SimulatedConfig, SimulatedConnector};
