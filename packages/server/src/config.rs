//! Server configuration from command-line flags and environment variables.
//!
//! | Flag | Env | Default |
//! |---|---|---|
//! | `--bind-addr` | `BIND_ADDR` | `127.0.0.1` |
//! | `--port` | `PORT` | `8080` |
//! | `--event-sink-url` | `EVENT_SINK_URL` | unset: events are only logged |
//! | `--crowd-model-url` | `CROWD_MODEL_URL` | unset: frame ingest answers 503 |

use std::sync::Arc;

use clap::Parser;
use crowd_planner_events::{EventError, EventSink, HttpSink, LogSink};
use crowd_planner_ingest::{CrowdEstimator, EstimateError, HttpCrowdEstimator, UnavailableEstimator};

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors in server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Port 0 was requested.
    #[error("Invalid port: must be between 1 and 65535")]
    InvalidPort,

    /// A collaborator URL is not an HTTP(S) URL.
    #[error("Invalid {name}: {value:?} must start with http:// or https://")]
    InvalidUrl {
        /// Which setting was invalid.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The event sink could not be constructed.
    #[error("Event sink error: {0}")]
    Events(#[from] EventError),

    /// The crowd estimator could not be constructed.
    #[error("Crowd estimator error: {0}")]
    Estimator(#[from] EstimateError),
}

/// Runtime configuration for the crowd planner server.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "crowd_planner_server", about = "Crowd planner API server")]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base URL events are POSTed to as `{url}/{channel}`
    #[arg(long, env = "EVENT_SINK_URL")]
    pub event_sink_url: Option<String>,

    /// URL of the crowd-counting inference service
    #[arg(long, env = "CROWD_MODEL_URL")]
    pub crowd_model_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            event_sink_url: None,
            crowd_model_url: None,
        }
    }
}

impl ServerConfig {
    /// Checks the port and collaborator URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        check_url("event sink URL", self.event_sink_url.as_deref())?;
        check_url("crowd model URL", self.crowd_model_url.as_deref())?;
        Ok(())
    }

    /// Builds the configured event sink: [`HttpSink`] when a URL is set,
    /// otherwise [`LogSink`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Events`] if the HTTP client cannot be built.
    pub fn event_sink(&self) -> Result<Arc<dyn EventSink>, ConfigError> {
        match &self.event_sink_url {
            Some(url) => {
                log::info!("Publishing events to {url}");
                Ok(Arc::new(HttpSink::new(url)?))
            }
            None => {
                log::info!("No event sink configured, events will only be logged");
                Ok(Arc::new(LogSink))
            }
        }
    }

    /// Builds the configured crowd estimator: [`HttpCrowdEstimator`] when a
    /// URL is set, otherwise [`UnavailableEstimator`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Estimator`] if the HTTP client cannot be built.
    pub fn crowd_estimator(&self) -> Result<Arc<dyn CrowdEstimator>, ConfigError> {
        match &self.crowd_model_url {
            Some(url) => {
                log::info!("Using crowd model at {url}");
                Ok(Arc::new(HttpCrowdEstimator::new(url)?))
            }
            None => {
                log::warn!("No crowd model configured, frame ingest is disabled");
                Ok(Arc::new(UnavailableEstimator))
            }
        }
    }
}

fn check_url(name: &'static str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(ConfigError::InvalidUrl {
                name,
                value: url.to_string(),
            })
        }
        _ => Ok(()),
    }
}
