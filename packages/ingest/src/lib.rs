#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Camera and sensor observation ingestion.
//!
//! The zone store replaces whole records and never merges. This crate sits
//! above it and turns each partial observation into a full one: it reads
//! the zone's current record and carries forward every field the
//! observation does not supply before calling [`ZoneStore::update`].
//!
//! | Source | Supplies | Carried forward |
//! |---|---|---|
//! | Camera frame | people, density | temperature, queue length |
//! | Sensor reading | any subset | whatever the reading omits |
//!
//! After each store write an event is published on the matching channel.

pub mod estimator;

use crowd_planner_events::{EventChannel, EventSink, publish_serialized};
use crowd_planner_ingest_models::{FrameIngestResult, IotEvent, SensorReading};
use crowd_planner_zone::ZoneStore;
use crowd_planner_zone_models::{DensityLevel, ZoneObservation, ZoneStatus};

pub use estimator::{CrowdEstimator, EstimateError, HttpCrowdEstimator, UnavailableEstimator};

/// Estimates the crowd in `frame` and records it for `zone_id`.
///
/// The zone's stored temperature and queue length are kept. Publishes the
/// result on [`EventChannel::CameraFrames`].
///
/// # Errors
///
/// Returns [`EstimateError`] if the estimator fails, in which case the
/// store is not touched and nothing is published.
pub async fn ingest_frame(
    store: &ZoneStore,
    estimator: &dyn CrowdEstimator,
    events: &dyn EventSink,
    zone_id: &str,
    frame: &[u8],
) -> Result<FrameIngestResult, EstimateError> {
    let estimate = estimator.estimate(frame).await?;

    let existing = store.get(zone_id);
    let observation = ZoneObservation::new(estimate.estimated_people, estimate.density_level)
        .with_temperature(existing.as_ref().and_then(|z| z.temperature))
        .with_queue_length(existing.as_ref().and_then(|z| z.queue_length));

    store.update(zone_id, observation);

    let result = FrameIngestResult {
        zone_id: zone_id.to_string(),
        estimated_people: estimate.estimated_people,
        density_level: estimate.density_level,
    };

    log::debug!(
        "Frame for zone {zone_id}: {} people ({})",
        result.estimated_people,
        result.density_level
    );
    publish_serialized(events, EventChannel::CameraFrames, &result);

    Ok(result)
}

/// Records a sensor reading, returning the stored status.
///
/// Publishes the raw reading on [`EventChannel::IotEvents`].
pub fn ingest_sensor(
    store: &ZoneStore,
    events: &dyn EventSink,
    reading: &SensorReading,
) -> ZoneStatus {
    let existing = store.get(&reading.zone_id);
    let observation = merge_sensor_reading(existing.as_ref(), reading);

    let status = store.update(reading.zone_id.clone(), observation);

    log::debug!(
        "Sensor reading for zone {}: people={:?} temperature={:?} queue={:?}",
        reading.zone_id,
        reading.people_count,
        reading.temperature,
        reading.queue_length
    );
    publish_serialized(events, EventChannel::IotEvents, &IotEvent::from(reading));

    status
}

/// Builds the full observation for a sensor reading.
///
/// A present `people_count` replaces both the people estimate and the
/// density level. Every other absent field keeps its stored value. A zone
/// seen for the first time without a count starts at zero people, low
/// density.
#[must_use]
pub fn merge_sensor_reading(
    existing: Option<&ZoneStatus>,
    reading: &SensorReading,
) -> ZoneObservation {
    let (estimated_people, density_level) = match (reading.people_count, existing) {
        (Some(count), _) => (count, DensityLevel::from_people_count(count)),
        (None, Some(zone)) => (zone.estimated_people, zone.density_level),
        (None, None) => (0, DensityLevel::Low),
    };

    ZoneObservation::new(estimated_people, density_level)
        .with_temperature(
            reading
                .temperature
                .or_else(|| existing.and_then(|z| z.temperature)),
        )
        .with_queue_length(
            reading
                .queue_length
                .or_else(|| existing.and_then(|z| z.queue_length)),
        )
}
