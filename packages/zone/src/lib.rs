#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory zone state store.
//!
//! [`ZoneStore`] holds exactly one [`ZoneStatus`] per zone. Every write
//! builds a complete new record (recomputing the risk score via [`risk`])
//! and swaps it into the map, so readers only ever see whole records.
//!
//! The store never merges fields with the previous record. A caller that
//! wants to keep a field it is not updating (for example a camera frame,
//! which carries no temperature) must read the current record with
//! [`ZoneStore::get`] and pass that field through to [`ZoneStore::update`].

pub mod risk;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use crowd_planner_zone_models::{ZoneObservation, ZoneStatus};

/// Latest status for every observed zone.
///
/// Construct one per process and share it behind an [`Arc`]. Each operation
/// holds the lock only long enough to touch the map; records are built
/// before the write lock is taken.
#[derive(Debug, Default)]
pub struct ZoneStore {
    zones: RwLock<HashMap<String, Arc<ZoneStatus>>>,
}

impl ZoneStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the status of `zone_id` with a record built from
    /// `observation`, stamped with the current time.
    ///
    /// The observation fields are stored exactly as given and the risk
    /// score is recomputed from them. Returns the stored record.
    pub fn update(&self, zone_id: impl Into<String>, observation: ZoneObservation) -> ZoneStatus {
        let zone_id = zone_id.into();
        let status = ZoneStatus {
            zone_id: zone_id.clone(),
            last_updated: Utc::now(),
            estimated_people: observation.estimated_people,
            density_level: observation.density_level,
            temperature: observation.temperature,
            queue_length: observation.queue_length,
            risk_score: risk::risk_score(&observation),
        };

        log::debug!(
            "zone {zone_id}: people={} density={} risk={:.2}",
            status.estimated_people,
            status.density_level,
            status.risk_score,
        );

        let record = Arc::new(status.clone());
        self.zones
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(zone_id, record);

        status
    }

    /// Returns the current status of `zone_id`, if it has ever been observed.
    #[must_use]
    pub fn get(&self, zone_id: &str) -> Option<ZoneStatus> {
        let record = self
            .zones
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(zone_id)
            .cloned();
        record.map(|r| (*r).clone())
    }

    /// Returns a snapshot of every known zone. Order is unspecified.
    #[must_use]
    pub fn list_all(&self) -> Vec<ZoneStatus> {
        let records: Vec<Arc<ZoneStatus>> = self
            .zones
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.into_iter().map(|r| (*r).clone()).collect()
    }

    /// Number of known zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no zone has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_planner_zone_models::DensityLevel;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn get_unknown_zone_is_none() {
        let store = ZoneStore::new();
        assert!(store.get("nowhere").is_none());
        assert!(store.is_empty());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn high_density_zone() {
        let store = ZoneStore::new();
        let status = store.update("z1", ZoneObservation::new(80, DensityLevel::High));

        assert!(approx(status.risk_score, 0.8));
        assert_eq!(store.get("z1"), Some(status));
    }

    #[test]
    fn hot_zone() {
        let store = ZoneStore::new();
        store.update(
            "z1",
            ZoneObservation::new(10, DensityLevel::Low).with_temperature(Some(35.0)),
        );

        let status = store.get("z1").unwrap();
        assert!(approx(status.risk_score, 0.5));
        assert_eq!(status.temperature, Some(35.0));
        assert_eq!(status.queue_length, None);
    }

    #[test]
    fn warm_queued_zone() {
        let store = ZoneStore::new();
        store.update(
            "z2",
            ZoneObservation::new(5, DensityLevel::Low)
                .with_temperature(Some(31.0))
                .with_queue_length(Some(25)),
        );

        assert!(approx(store.get("z2").unwrap().risk_score, 0.5));
    }

    #[test]
    fn update_replaces_whole_record() {
        let store = ZoneStore::new();
        store.update(
            "z1",
            ZoneObservation::new(10, DensityLevel::Low)
                .with_temperature(Some(36.0))
                .with_queue_length(Some(45)),
        );
        store.update("z1", ZoneObservation::new(60, DensityLevel::High));

        let status = store.get("z1").unwrap();
        assert_eq!(status.estimated_people, 60);
        assert_eq!(status.temperature, None);
        assert_eq!(status.queue_length, None);
        assert!(approx(status.risk_score, 0.8));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let store = ZoneStore::new();
        let obs = ZoneObservation::new(42, DensityLevel::Medium)
            .with_temperature(Some(32.5))
            .with_queue_length(Some(22));

        let first = store.update("z1", obs);
        let second = store.update("z1", obs);

        assert!(second.last_updated >= first.last_updated);
        assert_eq!(
            ZoneStatus {
                last_updated: first.last_updated,
                ..second
            },
            first
        );
    }

    #[test]
    fn carried_forward_fields_keep_their_contribution() {
        let store = ZoneStore::new();
        store.update(
            "z1",
            ZoneObservation::new(10, DensityLevel::Low)
                .with_temperature(Some(31.0))
                .with_queue_length(Some(45)),
        );
        let before = store.get("z1").unwrap();
        let before_extra = before.risk_score - risk::density_factor(before.density_level);

        let next = ZoneObservation::new(30, DensityLevel::Medium)
            .with_temperature(before.temperature)
            .with_queue_length(before.queue_length);
        let after = store.update("z1", next);
        let after_extra = after.risk_score - risk::density_factor(after.density_level);

        assert!(approx(before_extra, after_extra));
        assert!(approx(after.risk_score, 0.5 + 0.15 + 0.3));
    }

    #[test]
    fn zone_ids_are_case_sensitive() {
        let store = ZoneStore::new();
        store.update("Gate", ZoneObservation::new(1, DensityLevel::Low));
        store.update("gate", ZoneObservation::new(150, DensityLevel::Critical));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("Gate").unwrap().estimated_people, 1);
        assert_eq!(store.get("gate").unwrap().estimated_people, 150);
    }

    #[test]
    fn snapshot_is_coherent_under_concurrent_writes() {
        let store = ZoneStore::new();
        let zones = ["a", "b", "c"];

        // Every write encodes `n` in all observation fields, so a record
        // assembled from two different writes would disagree with itself.
        let observation = |n: u32| {
            ZoneObservation::new(n, DensityLevel::from_people_count(n))
                .with_temperature(Some(f64::from(n)))
                .with_queue_length(Some(n))
        };

        std::thread::scope(|s| {
            for zone in zones {
                let store = &store;
                s.spawn(move || {
                    for n in 0..500 {
                        store.update(zone, observation(n));
                    }
                });
            }

            for _ in 0..2 {
                let store = &store;
                s.spawn(move || {
                    for _ in 0..500 {
                        for status in store.list_all() {
                            let n = status.estimated_people;
                            assert_eq!(status.temperature, Some(f64::from(n)));
                            assert_eq!(status.queue_length, Some(n));
                            assert_eq!(status.density_level, DensityLevel::from_people_count(n));
                            let expected = risk::risk_score(&observation(n));
                            assert!(approx(status.risk_score, expected));
                        }
                    }
                });
            }
        });

        assert_eq!(store.len(), zones.len());
        for zone in zones {
            assert_eq!(store.get(zone).unwrap().estimated_people, 499);
        }
    }
}
