#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Best-effort outbound event publishing.
//!
//! Defines the [`EventSink`] trait that decouples the ingest and dashboard
//! paths from any specific delivery backend. Publishing is fire-and-forget:
//! [`EventSink::publish`] never blocks on delivery and never returns an
//! error. Failures are logged and dropped.
//!
//! Provided sinks:
//!
//! | Sink | Behaviour |
//! |---|---|
//! | [`NullSink`] | Drops every event |
//! | [`LogSink`] | Logs every event at `debug` level |
//! | [`HttpSink`] | POSTs JSON to `{base_url}/{channel}` on a spawned task |
//! | [`RecordingSink`] | Keeps events in memory (for tests) |

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// Default per-request timeout for [`HttpSink`] deliveries.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Named channel an event is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventChannel {
    /// Crowd estimates derived from camera frames.
    CameraFrames,
    /// Raw sensor readings.
    IotEvents,
    /// Dashboard snapshots of all zones and their recommendations.
    ZoneStatus,
}

/// Errors that can occur while constructing a sink.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Destination for outbound events.
///
/// Implementations must be `Send + Sync` so a single sink can be shared
/// across request handlers behind an [`Arc`].
pub trait EventSink: Send + Sync {
    /// Publishes `payload` on `channel`. Must not block on delivery and
    /// must not panic on delivery failure.
    fn publish(&self, channel: EventChannel, payload: serde_json::Value);
}

/// Serializes `payload` and publishes it on `channel`.
///
/// A payload that fails to serialize is logged and dropped.
pub fn publish_serialized<T: Serialize + ?Sized>(
    sink: &dyn EventSink,
    channel: EventChannel,
    payload: &T,
) {
    match serde_json::to_value(payload) {
        Ok(value) => sink.publish(channel, value),
        Err(e) => log::warn!("Dropping {channel} event: failed to serialize payload: {e}"),
    }
}

/// A sink that silently drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _channel: EventChannel, _payload: serde_json::Value) {}
}

/// A sink that logs every event at `debug` level.
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, channel: EventChannel, payload: serde_json::Value) {
        log::debug!("[{channel}] {payload}");
    }
}

/// A sink that POSTs each event as JSON to `{base_url}/{channel}`.
///
/// Each delivery runs on its own task on the current tokio runtime, so
/// [`EventSink::publish`] returns immediately. Non-success responses and
/// transport errors are logged with `warn` and otherwise ignored.
pub struct HttpSink {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSink {
    /// Creates a sink delivering to `base_url` with [`DEFAULT_HTTP_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, EventError> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Creates a sink delivering to `base_url` with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Http`] if the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, EventError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// URL an event on `channel` is delivered to.
    #[must_use]
    pub fn channel_url(&self, channel: EventChannel) -> String {
        format!("{}/{channel}", self.base_url)
    }
}

impl EventSink for HttpSink {
    fn publish(&self, channel: EventChannel, payload: serde_json::Value) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::warn!("Dropping {channel} event: no async runtime available");
            return;
        };

        let url = self.channel_url(channel);
        let client = self.client.clone();

        handle.spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    log::trace!("Delivered {channel} event to {url}");
                }
                Ok(resp) => {
                    log::warn!("Event sink rejected {channel} event: HTTP {}", resp.status());
                }
                Err(e) => log::warn!("Failed to publish {channel} event to {url}: {e}"),
            }
        });
    }
}

/// A sink that records every event in memory.
#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<(EventChannel, serde_json::Value)>>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all events published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<(EventChannel, serde_json::Value)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the payloads published on `channel`, oldest first.
    #[must_use]
    pub fn events_on(&self, channel: EventChannel) -> Vec<serde_json::Value> {
        self.events()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, payload)| payload)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, channel: EventChannel, payload: serde_json::Value) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel, payload));
    }
}
