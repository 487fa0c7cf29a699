#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Observation payload and result types for zone ingestion.

use crowd_planner_zone_models::DensityLevel;
use serde::{Deserialize, Serialize};

/// A direct sensor observation for one zone.
///
/// Every reading is optional. A present `people_count` overrides the zone's
/// crowd estimate; absent fields leave the stored values untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Zone the reading belongs to.
    pub zone_id: String,
    /// Direct people count from a counting sensor.
    #[serde(default)]
    pub people_count: Option<u32>,
    /// Ambient temperature in Celsius.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Number of people waiting in line.
    #[serde(default)]
    pub queue_length: Option<u32>,
    /// Free-form sensor metadata. Accepted but not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl SensorReading {
    /// Creates a reading for `zone_id` with no values set.
    #[must_use]
    pub fn new(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            people_count: None,
            temperature: None,
            queue_length: None,
            extra: None,
        }
    }
}

/// Crowd estimate produced from a single camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrowdEstimate {
    /// Estimated number of people in the frame.
    pub estimated_people: u32,
    /// Occupancy classification for the estimate.
    pub density_level: DensityLevel,
}

impl CrowdEstimate {
    /// Builds an estimate whose density level is derived from the count.
    #[must_use]
    pub const fn from_count(estimated_people: u32) -> Self {
        Self {
            estimated_people,
            density_level: DensityLevel::from_people_count(estimated_people),
        }
    }
}

/// Result of ingesting a camera frame.
///
/// This is also the payload published on the `camera_frames` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameIngestResult {
    /// Zone the frame was captured in.
    pub zone_id: String,
    /// Estimated number of people in the frame.
    pub estimated_people: u32,
    /// Occupancy classification for the estimate.
    pub density_level: DensityLevel,
}

/// Payload published on the `iot_events` channel: the raw reading, minus
/// its free-form metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IotEvent {
    /// Zone the reading belongs to.
    pub zone_id: String,
    /// Direct people count, if the sensor supplied one.
    pub people_count: Option<u32>,
    /// Temperature, if the sensor supplied one.
    pub temperature: Option<f64>,
    /// Queue length, if the sensor supplied one.
    pub queue_length: Option<u32>,
}

impl From<&SensorReading> for IotEvent {
    fn from(reading: &SensorReading) -> Self {
        Self {
            zone_id: reading.zone_id.clone(),
            people_count: reading.people_count,
            temperature: reading.temperature,
            queue_length: reading.queue_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_reading_fields_are_optional() {
        let reading: SensorReading = serde_json::from_str(r#"{"zone_id": "zone_a"}"#).unwrap();
        assert_eq!(reading, SensorReading::new("zone_a"));
    }

    #[test]
    fn sensor_reading_accepts_extra_metadata() {
        let reading: SensorReading = serde_json::from_str(
            r#"{"zone_id": "zone_a", "people_count": 42, "temperature": 28.5,
                "queue_length": 15, "extra": {"firmware": "1.2"}}"#,
        )
        .unwrap();
        assert_eq!(reading.people_count, Some(42));
        assert_eq!(reading.queue_length, Some(15));
        assert_eq!(reading.extra.unwrap()["firmware"], "1.2");
    }

    #[test]
    fn negative_counts_are_rejected() {
        let result =
            serde_json::from_str::<SensorReading>(r#"{"zone_id": "z", "people_count": -3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn estimate_from_count_classifies() {
        assert_eq!(
            CrowdEstimate::from_count(120).density_level,
            DensityLevel::Critical
        );
        assert_eq!(CrowdEstimate::from_count(3).density_level, DensityLevel::Low);
    }

    #[test]
    fn iot_event_drops_extra() {
        let mut reading = SensorReading::new("z1");
        reading.temperature = Some(30.0);
        reading.extra = Some(serde_json::json!({"k": "v"}));

        let value = serde_json::to_value(IotEvent::from(&reading)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "zone_id": "z1",
                "people_count": null,
                "temperature": 30.0,
                "queue_length": null,
            })
        );
    }
}
