use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive numeric range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Valid ranges and consistency limits for QUALITY proofs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityBounds {
    /// Moisture level, percent.
    pub moisture: ValueRange,
    /// Declared storage temperature, °C.
    pub temperature: ValueRange,
    /// Every value in the sensor series must fall in this range.
    pub reading_range: ValueRange,
    /// Largest allowed change between consecutive readings.
    pub max_step: f64,
    /// Largest allowed population standard deviation of the series.
    pub max_std_dev: f64,
    pub min_readings: usize,
    pub max_readings: usize,
}

impl Default for QualityBounds {
    fn default() -> Self {
        Self {
            moisture: ValueRange::new(8.0, 11.0),
            temperature: ValueRange::new(4.0, 10.0),
            reading_range: ValueRange::new(4.0, 10.0),
            max_step: 3.0,
            max_std_dev: 2.5,
            min_readings: 0,
            max_readings: 1024,
        }
    }
}

/// Reconciliation tolerance for ECONOMIC proofs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicBounds {
    /// Absolute difference allowed between `paymentAmount` and
    /// `soldQuantity × unitPrice`, in currency units.
    pub tolerance: f64,
}

impl Default for EconomicBounds {
    fn default() -> Self {
        Self { tolerance: 0.01 }
    }
}

/// Plausibility limits for ROUTE proofs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteBounds {
    /// Degrees added on every side of the origin/destination envelope.
    pub margin_deg: f64,
    pub max_speed_kmh: f64,
    pub min_points: usize,
}

impl Default for RouteBounds {
    fn default() -> Self {
        Self {
            margin_deg: 0.5,
            max_speed_kmh: 120.0,
            min_points: 2,
        }
    }
}

/// Configuration for the proof engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofConfig {
    pub quality: QualityBounds,
    pub economic: EconomicBounds,
    pub route: RouteBounds,
}
