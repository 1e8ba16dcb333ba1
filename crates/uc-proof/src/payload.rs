//! Private inputs submitted for attestation.
//!
//! A payload's canonical encoding is what the commitment hashes. Series
//! (sensor readings, GPS points) are flattened into indexed keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uc_crypto::{Canonical, CanonicalPayload, EncodingError};
use uc_types::BatchId;

use crate::error::ProofError;

/// The constraint family a proof belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofType {
    Quality,
    Economic,
    Route,
}

impl ProofType {
    pub const ALL: [ProofType; 3] = [ProofType::Quality, ProofType::Economic, ProofType::Route];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quality => "QUALITY",
            Self::Economic => "ECONOMIC",
            Self::Route => "ROUTE",
        }
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProofType {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProofError::invalid("proofType", format!("unknown proof type {s:?}")))
    }
}

/// One time-stamped sensor value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Unix milliseconds.
    pub at: u64,
    pub value: f64,
}

/// Inputs to a QUALITY proof.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityPayload {
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    /// Supply-chain stage of the inspection (`harvest`, `transport`, ...).
    pub stage: String,
    pub moisture_level: f64,
    pub temperature: f64,
    #[serde(default)]
    pub readings: Vec<SensorReading>,
}

impl Canonical for QualityPayload {
    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        let mut out = CanonicalPayload::new();
        out.insert_opt("batchId", self.batch_id.as_ref().map(BatchId::as_str))?
            .insert("stage", self.stage.as_str())?
            .insert("moistureLevel", self.moisture_level)?
            .insert("temperature", self.temperature)?
            .insert("readingCount", self.readings.len())?;
        for (i, reading) in self.readings.iter().enumerate() {
            let entry = CanonicalPayload::new()
                .with("at", reading.at)?
                .with("value", reading.value)?;
            out.nest(&format!("readings.{i}"), entry)?;
        }
        Ok(out)
    }
}

/// Inputs to an ECONOMIC proof.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicPayload {
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    pub transaction_id: String,
    pub payment_amount: f64,
    pub unit_price: f64,
    pub sold_quantity: f64,
    pub total_quantity: f64,
}

impl Canonical for EconomicPayload {
    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        let mut out = CanonicalPayload::new();
        out.insert_opt("batchId", self.batch_id.as_ref().map(BatchId::as_str))?
            .insert("transactionId", self.transaction_id.as_str())?
            .insert("paymentAmount", self.payment_amount)?
            .insert("unitPrice", self.unit_price)?
            .insert("soldQuantity", self.sold_quantity)?
            .insert("totalQuantity", self.total_quantity)?;
        Ok(out)
    }
}

/// A GPS fix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    /// Unix milliseconds.
    pub at: u64,
}

/// An axis-aligned latitude/longitude box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// A square box of half-width `radius_deg` around a point.
    pub fn around(lat: f64, lng: f64, radius_deg: f64) -> Self {
        Self::new(lat - radius_deg, lat + radius_deg, lng - radius_deg, lng + radius_deg)
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min_lat.min(other.min_lat),
            self.max_lat.max(other.max_lat),
            self.min_lng.min(other.min_lng),
            self.max_lng.max(other.max_lng),
        )
    }

    pub fn expanded(&self, margin_deg: f64) -> Self {
        Self::new(
            self.min_lat - margin_deg,
            self.max_lat + margin_deg,
            self.min_lng - margin_deg,
            self.max_lng + margin_deg,
        )
    }

    fn is_well_formed(&self) -> bool {
        self.min_lat <= self.max_lat && self.min_lng <= self.max_lng
    }

    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        CanonicalPayload::new()
            .with("minLat", self.min_lat)?
            .with("maxLat", self.max_lat)?
            .with("minLng", self.min_lng)?
            .with("maxLng", self.max_lng)
    }
}

/// Inputs to a ROUTE proof.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePayload {
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    /// Declared route, e.g. `Farm → Mandi`.
    pub route_label: String,
    pub origin: BoundingBox,
    pub destination: BoundingBox,
    pub points: Vec<GeoPoint>,
}

impl Canonical for RoutePayload {
    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        let mut out = CanonicalPayload::new();
        out.insert_opt("batchId", self.batch_id.as_ref().map(BatchId::as_str))?
            .insert("routeLabel", self.route_label.as_str())?
            .insert("pointCount", self.points.len())?
            .nest("origin", self.origin.canonical_payload()?)?
            .nest("destination", self.destination.canonical_payload()?)?;
        for (i, point) in self.points.iter().enumerate() {
            let entry = CanonicalPayload::new()
                .with("lat", point.lat)?
                .with("lng", point.lng)?
                .with("at", point.at)?;
            out.nest(&format!("points.{i}"), entry)?;
        }
        Ok(out)
    }
}

/// A payload for any constraint family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofPayload {
    Quality(QualityPayload),
    Economic(EconomicPayload),
    Route(RoutePayload),
}

impl ProofPayload {
    pub fn proof_type(&self) -> ProofType {
        match self {
            Self::Quality(_) => ProofType::Quality,
            Self::Economic(_) => ProofType::Economic,
            Self::Route(_) => ProofType::Route,
        }
    }

    pub fn batch_id(&self) -> Option<&BatchId> {
        match self {
            Self::Quality(p) => p.batch_id.as_ref(),
            Self::Economic(p) => p.batch_id.as_ref(),
            Self::Route(p) => p.batch_id.as_ref(),
        }
    }

    /// Structural checks that must hold before any constraint is evaluated.
    pub fn validate(&self) -> Result<(), ProofError> {
        if self.batch_id().is_some_and(BatchId::is_blank) {
            return Err(ProofError::invalid("batchId", "must not be empty"));
        }
        match self {
            Self::Quality(p) => {
                if p.stage.trim().is_empty() {
                    return Err(ProofError::invalid("stage", "must not be empty"));
                }
            }
            Self::Economic(p) => {
                if p.transaction_id.trim().is_empty() {
                    return Err(ProofError::invalid("transactionId", "must not be empty"));
                }
            }
            Self::Route(p) => {
                if p.route_label.trim().is_empty() {
                    return Err(ProofError::invalid("routeLabel", "must not be empty"));
                }
                if !p.origin.is_well_formed() {
                    return Err(ProofError::invalid("origin", "min bound exceeds max bound"));
                }
                if !p.destination.is_well_formed() {
                    return Err(ProofError::invalid(
                        "destination",
                        "min bound exceeds max bound",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Canonical for ProofPayload {
    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        match self {
            Self::Quality(p) => p.canonical_payload(),
            Self::Economic(p) => p.canonical_payload(),
            Self::Route(p) => p.canonical_payload(),
        }
    }
}

impl From<QualityPayload> for ProofPayload {
    fn from(p: QualityPayload) -> Self {
        Self::Quality(p)
    }
}

impl From<EconomicPayload> for ProofPayload {
    fn from(p: EconomicPayload) -> Self {
        Self::Economic(p)
    }
}

impl From<RoutePayload> for ProofPayload {
    fn from(p: RoutePayload) -> Self {
        Self::Route(p)
    }
}
