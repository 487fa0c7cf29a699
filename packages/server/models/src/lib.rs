#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crowd planner server.
//!
//! Field names are `snake_case` to match the payloads sensors and the
//! operator dashboard already speak.

use crowd_planner_zone_models::{Recommendation, ZoneStatus};
use serde::{Deserialize, Serialize};

/// Response for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRoot {
    /// Human-readable banner.
    pub message: String,
    /// Path prefix of the REST API.
    pub api: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Number of zones currently tracked.
    pub zone_count: usize,
}

/// Query parameters for the frame ingest endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameQueryParams {
    /// Zone the frame was captured in.
    pub zone_id: String,
}

/// Acknowledgement returned by the sensor ingest endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestAck {
    /// Always `"ok"`.
    pub status: String,
    /// Zone that was updated.
    pub zone_id: String,
}

impl IngestAck {
    /// Creates a successful acknowledgement for `zone_id`.
    #[must_use]
    pub fn ok(zone_id: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            zone_id: zone_id.into(),
        }
    }
}

/// Every known zone together with its recommendation.
///
/// This is also the payload published on the `zone_status` channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Current zone statuses, sorted by zone ID.
    pub zones: Vec<ZoneStatus>,
    /// One recommendation per zone, in the same order as `zones`.
    pub recommendations: Vec<Recommendation>,
}
