use std::fmt;

use serde::{Deserialize, Serialize};
use uc_crypto::{CanonicalPayload, EncodingError};

use crate::payload::ProofType;

/// Pass/fail outcome of one named sub-check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
}

/// Public values derived from the private inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimDetail {
    #[serde(rename_all = "camelCase")]
    Quality { stage: String, reading_count: u64 },
    #[serde(rename_all = "camelCase")]
    Economic {
        /// `soldQuantity / totalQuantity`, four decimals.
        sell_through: f64,
    },
    #[serde(rename_all = "camelCase")]
    Route {
        route_label: String,
        point_count: u64,
        /// Great-circle path length, one decimal.
        distance_km: f64,
        duration_secs: u64,
    },
}

/// What a proof asserts: every sub-check's flag plus derived public values.
///
/// Contains no raw measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub checks: Vec<CheckResult>,
    pub detail: ClaimDetail,
}

impl Claim {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Human-readable one-liner, e.g. `harvest: 7/7 checks passed over 6 readings`.
    pub fn summary(&self) -> String {
        let tally = format!("{}/{} checks passed", self.passed_count(), self.checks.len());
        match &self.detail {
            ClaimDetail::Quality {
                stage,
                reading_count,
            } => format!("{stage}: {tally} over {reading_count} readings"),
            ClaimDetail::Economic { sell_through } => {
                format!("{tally}, sell-through {:.2}%", sell_through * 100.0)
            }
            ClaimDetail::Route {
                route_label,
                point_count,
                distance_km,
                duration_secs,
            } => format!(
                "{route_label}: {tally}, {point_count} points, {distance_km} km in {duration_secs} s"
            ),
        }
    }

    pub(crate) fn write_fields(&self, out: &mut CanonicalPayload) -> Result<(), EncodingError> {
        out.insert("claim.checkCount", self.checks.len())?;
        for (i, check) in self.checks.iter().enumerate() {
            out.insert(format!("claim.checks.{i}.name"), check.name.as_str())?
                .insert(format!("claim.checks.{i}.passed"), check.passed)?;
        }
        match &self.detail {
            ClaimDetail::Quality {
                stage,
                reading_count,
            } => {
                out.insert("claim.stage", stage.as_str())?
                    .insert("claim.readingCount", *reading_count)?;
            }
            ClaimDetail::Economic { sell_through } => {
                out.insert("claim.sellThrough", *sell_through)?;
            }
            ClaimDetail::Route {
                route_label,
                point_count,
                distance_km,
                duration_secs,
            } => {
                out.insert("claim.routeLabel", route_label.as_str())?
                    .insert("claim.pointCount", *point_count)?
                    .insert("claim.distanceKm", *distance_km)?
                    .insert("claim.durationSecs", *duration_secs)?;
            }
        }
        Ok(())
    }
}

/// The first sub-check that failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub proof_type: ProofType,
    pub check: String,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} check `{}` failed: {}", self.proof_type, self.check, self.detail)
    }
}

impl std::error::Error for Violation {}

/// Collects sub-check outcomes in evaluation order.
pub(crate) struct Checklist {
    proof_type: ProofType,
    checks: Vec<CheckResult>,
    first_failure: Option<Violation>,
}

impl Checklist {
    pub(crate) fn new(proof_type: ProofType) -> Self {
        Self {
            proof_type,
            checks: Vec::new(),
            first_failure: None,
        }
    }

    pub(crate) fn record(&mut self, name: &str, outcome: Result<(), String>) {
        let passed = outcome.is_ok();
        if let Err(detail) = outcome {
            if self.first_failure.is_none() {
                self.first_failure = Some(Violation {
                    proof_type: self.proof_type,
                    check: name.to_string(),
                    detail,
                });
            }
        }
        self.checks.push(CheckResult {
            name: name.to_string(),
            passed,
        });
    }

    pub(crate) fn finish(self, detail: ClaimDetail) -> (Claim, Option<Violation>) {
        (
            Claim {
                checks: self.checks,
                detail,
            },
            self.first_failure,
        )
    }
}

/// Round to a fixed number of decimals.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
