#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crowd planner.
//!
//! Accepts camera frames and sensor readings, keeps the latest status of
//! every zone in a [`ZoneStore`] owned by [`AppState`], and serves a
//! dashboard of zone statuses with operator recommendations. Ingest and
//! dashboard reads publish best-effort events to the configured sink.

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crowd_planner_events::EventSink;
use crowd_planner_ingest::CrowdEstimator;
use crowd_planner_zone::ZoneStore;

pub use config::{ConfigError, ServerConfig};

/// Largest accepted camera frame body, in bytes.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    /// Latest status of every zone.
    pub store: Arc<ZoneStore>,
    /// Turns camera frames into crowd estimates.
    pub estimator: Arc<dyn CrowdEstimator>,
    /// Destination for outbound events.
    pub events: Arc<dyn EventSink>,
}

impl AppState {
    /// Creates state around a fresh, empty zone store.
    #[must_use]
    pub fn new(estimator: Arc<dyn CrowdEstimator>, events: Arc<dyn EventSink>) -> Self {
        Self {
            store: Arc::new(ZoneStore::new()),
            estimator,
            events,
        }
    }
}

/// Registers the root and `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_FRAME_BYTES))
        .route("/", web::get().to(handlers::root))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/ingest/frame", web::post().to(handlers::ingest_frame))
                .route("/ingest/iot", web::post().to(handlers::ingest_iot))
                .route("/zones", web::get().to(handlers::zones))
                .route("/zones/{zone_id}", web::get().to(handlers::zone))
                .route("/dashboard", web::get().to(handlers::dashboard)),
        );
}

/// Starts the crowd planner API server.
///
/// Validates `config`, builds the event sink and crowd estimator it
/// describes, creates the zone store, and runs the Actix-Web HTTP server
/// until shutdown. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid, the
/// HTTP server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let invalid = |e: ConfigError| std::io::Error::new(std::io::ErrorKind::InvalidInput, e);

    config.validate().map_err(invalid)?;
    let events = config.event_sink().map_err(invalid)?;
    let estimator = config.crowd_estimator().map_err(invalid)?;

    let state = web::Data::new(AppState::new(estimator, events));

    log::info!(
        "Starting crowd planner server on {}:{}",
        config.bind_addr,
        config.port
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
