#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone status, density, and recommendation types.
//!
//! This crate defines the shared data model for the crowd planner: the
//! per-zone [`ZoneStatus`] record held by the zone store, the observation
//! fields that feed it, and the [`Recommendation`] records derived from it.
//! Types serialize with `snake_case` fields and lowercase enum values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// People counts below this are [`DensityLevel::Low`].
pub const MEDIUM_DENSITY_MIN_PEOPLE: u32 = 20;
/// People counts below this (and at least [`MEDIUM_DENSITY_MIN_PEOPLE`]) are
/// [`DensityLevel::Medium`].
pub const HIGH_DENSITY_MIN_PEOPLE: u32 = 50;
/// People counts at or above this are [`DensityLevel::Critical`].
pub const CRITICAL_DENSITY_MIN_PEOPLE: u32 = 100;

/// Coarse four-level occupancy classification for a zone.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DensityLevel {
    /// Sparse occupancy.
    Low,
    /// Moderate occupancy.
    Medium,
    /// Dense occupancy.
    High,
    /// Crowding that needs intervention.
    Critical,
}

impl DensityLevel {
    /// Classifies a people count using the shared occupancy thresholds.
    ///
    /// Both camera estimates and direct sensor counts go through this
    /// function so the cut points cannot drift apart.
    #[must_use]
    pub const fn from_people_count(people: u32) -> Self {
        if people < MEDIUM_DENSITY_MIN_PEOPLE {
            Self::Low
        } else if people < HIGH_DENSITY_MIN_PEOPLE {
            Self::Medium
        } else if people < CRITICAL_DENSITY_MIN_PEOPLE {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Returns all variants in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }
}

/// Recommendation priority, totally ordered `Low < Medium < High < Critical`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    /// Routine monitoring.
    Low,
    /// Staff should be ready to act.
    Medium,
    /// Action needed soon.
    High,
    /// Act immediately.
    Critical,
}

/// The observation fields written to a zone on every update.
///
/// Absent optional fields mean "unknown". They are stored as absent and
/// contribute nothing to the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneObservation {
    /// Current best estimate of occupancy.
    pub estimated_people: u32,
    /// Occupancy classification.
    pub density_level: DensityLevel,
    /// Ambient temperature in Celsius.
    pub temperature: Option<f64>,
    /// Number of people waiting in line.
    pub queue_length: Option<u32>,
}

impl ZoneObservation {
    /// Creates an observation with no temperature or queue reading.
    #[must_use]
    pub const fn new(estimated_people: u32, density_level: DensityLevel) -> Self {
        Self {
            estimated_people,
            density_level,
            temperature: None,
            queue_length: None,
        }
    }

    /// Sets the temperature reading.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the queue length reading.
    #[must_use]
    pub const fn with_queue_length(mut self, queue_length: Option<u32>) -> Self {
        self.queue_length = queue_length;
        self
    }
}

/// The latest derived status of a single zone.
///
/// Records are only ever produced whole by the zone store, which recomputes
/// `risk_score` from the observation fields on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatus {
    /// Externally assigned, case-sensitive zone key.
    pub zone_id: String,
    /// When this record was written.
    pub last_updated: DateTime<Utc>,
    /// Current best estimate of occupancy.
    pub estimated_people: u32,
    /// Occupancy classification.
    pub density_level: DensityLevel,
    /// Ambient temperature in Celsius, if known.
    pub temperature: Option<f64>,
    /// Queue length, if known.
    pub queue_length: Option<u32>,
    /// Composite risk in `[0.0, 1.0]`.
    pub risk_score: f64,
}

impl ZoneStatus {
    /// Returns the observation fields of this record.
    #[must_use]
    pub const fn observation(&self) -> ZoneObservation {
        ZoneObservation {
            estimated_people: self.estimated_people,
            density_level: self.density_level,
            temperature: self.temperature,
            queue_length: self.queue_length,
        }
    }
}

/// An operator action generated for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Zone the recommendation refers to.
    pub zone_id: String,
    /// Human-readable action text, prefixed with `Zone {zone_id}: `.
    pub message: String,
    /// How urgently the action is needed.
    pub priority: Priority,
}
