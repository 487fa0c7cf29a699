#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule-based operator recommendations.
//!
//! Each zone is run through three independent rules (density, heat, and
//! queue) that contribute a message clause and may raise the priority.
//! Priority only ever escalates within a zone. A zone that triggers no rule
//! gets a single "situation normal" clause at [`Priority::Low`].
//!
//! Generation is pure and holds no state, so it can run on any snapshot of
//! zone statuses concurrently with writes to the zone store.

use crowd_planner_zone_models::{DensityLevel, Priority, Recommendation, ZoneStatus};

/// Temperatures strictly above this (Celsius) trigger the heat rule.
pub const HEAT_ALERT_TEMPERATURE: f64 = 34.0;

/// Queues strictly longer than this trigger the queue rule.
pub const QUEUE_ALERT_LENGTH: u32 = 30;

const CRITICAL_DENSITY_MESSAGE: &str =
    "Critical crowding detected. Deploy staff, redirect crowd, and temporarily restrict entry.";
const HIGH_DENSITY_MESSAGE: &str = "High density. Increase monitoring and open alternate paths.";
const MEDIUM_DENSITY_MESSAGE: &str = "Medium crowd. Keep staff on standby and watch queues.";
const HEAT_MESSAGE: &str = "High temperature. Arrange hydration points and shade.";
const QUEUE_MESSAGE: &str = "Long queues. Add more counters or staff to speed up flow.";
const NORMAL_MESSAGE: &str = "Situation normal. Continue monitoring.";

/// Generates one recommendation per zone, in input order.
#[must_use]
pub fn generate_recommendations(zones: &[ZoneStatus]) -> Vec<Recommendation> {
    zones.iter().map(recommend).collect()
}

/// Generates the recommendation for a single zone.
#[must_use]
pub fn recommend(zone: &ZoneStatus) -> Recommendation {
    let mut parts: Vec<&'static str> = Vec::with_capacity(3);
    let mut priority = Priority::Low;

    if let Some((message, density_priority)) = density_rule(zone.density_level) {
        parts.push(message);
        priority = priority.max(density_priority);
    }

    if zone.temperature.is_some_and(|t| t > HEAT_ALERT_TEMPERATURE) {
        parts.push(HEAT_MESSAGE);
        priority = priority.max(Priority::High);
    }

    if zone.queue_length.is_some_and(|q| q > QUEUE_ALERT_LENGTH) {
        parts.push(QUEUE_MESSAGE);
        priority = priority.max(Priority::High);
    }

    if parts.is_empty() {
        parts.push(NORMAL_MESSAGE);
    }

    Recommendation {
        zone_id: zone.zone_id.clone(),
        message: format!("Zone {}: {}", zone.zone_id, parts.join(" ")),
        priority,
    }
}

/// Message clause and priority implied by the density level alone.
const fn density_rule(level: DensityLevel) -> Option<(&'static str, Priority)> {
    match level {
        DensityLevel::Critical => Some((CRITICAL_DENSITY_MESSAGE, Priority::Critical)),
        DensityLevel::High => Some((HIGH_DENSITY_MESSAGE, Priority::High)),
        DensityLevel::Medium => Some((MEDIUM_DENSITY_MESSAGE, Priority::Medium)),
        DensityLevel::Low => None,
    }
}
