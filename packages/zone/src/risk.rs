//! Risk score computation.
//!
//! The score is a pure function of density, temperature, and queue length:
//! `min(1.0, density_factor + temp_factor + queue_factor)`. Absent readings
//! contribute nothing.

use crowd_planner_zone_models::{DensityLevel, ZoneObservation};

/// Factor used for a density label outside the closed [`DensityLevel`] set.
pub const NEUTRAL_DENSITY_FACTOR: f64 = 0.5;

/// Temperatures strictly above this (Celsius) add [`HOT_FACTOR`].
pub const HOT_TEMPERATURE: f64 = 34.0;
/// Temperatures strictly above this (Celsius) add [`WARM_FACTOR`].
pub const WARM_TEMPERATURE: f64 = 30.0;
/// Risk added by a hot zone.
pub const HOT_FACTOR: f64 = 0.3;
/// Risk added by a warm zone.
pub const WARM_FACTOR: f64 = 0.15;

/// Queues strictly longer than this add [`LONG_QUEUE_FACTOR`].
pub const LONG_QUEUE: u32 = 40;
/// Queues strictly longer than this add [`BUSY_QUEUE_FACTOR`].
pub const BUSY_QUEUE: u32 = 20;
/// Risk added by a long queue.
pub const LONG_QUEUE_FACTOR: f64 = 0.3;
/// Risk added by a busy queue.
pub const BUSY_QUEUE_FACTOR: f64 = 0.15;

/// Base risk contributed by a density level.
#[must_use]
pub const fn density_factor(level: DensityLevel) -> f64 {
    match level {
        DensityLevel::Low => 0.2,
        DensityLevel::Medium => 0.5,
        DensityLevel::High => 0.8,
        DensityLevel::Critical => 1.0,
    }
}

/// Base risk for a raw density label, falling back to
/// [`NEUTRAL_DENSITY_FACTOR`] when the label is not a known level.
#[must_use]
pub fn density_factor_for_label(label: &str) -> f64 {
    label
        .parse::<DensityLevel>()
        .map_or(NEUTRAL_DENSITY_FACTOR, density_factor)
}

/// Risk contributed by the temperature reading. `NaN` counts as absent.
#[must_use]
pub fn temperature_factor(temperature: Option<f64>) -> f64 {
    match temperature {
        Some(t) if t > HOT_TEMPERATURE => HOT_FACTOR,
        Some(t) if t > WARM_TEMPERATURE => WARM_FACTOR,
        _ => 0.0,
    }
}

/// Risk contributed by the queue length reading.
#[must_use]
pub const fn queue_factor(queue_length: Option<u32>) -> f64 {
    match queue_length {
        Some(q) if q > LONG_QUEUE => LONG_QUEUE_FACTOR,
        Some(q) if q > BUSY_QUEUE => BUSY_QUEUE_FACTOR,
        _ => 0.0,
    }
}

/// Computes the composite risk score for an observation, clamped to
/// `[0.0, 1.0]`.
#[must_use]
pub fn risk_score(observation: &ZoneObservation) -> f64 {
    let raw = density_factor(observation.density_level)
        + temperature_factor(observation.temperature)
        + queue_factor(observation.queue_length);
    raw.clamp(0.0, 1.0)
}
