use crate::claim::{Checklist, Claim, ClaimDetail, Violation};
use crate::config::QualityBounds;
use crate::payload::{ProofType, QualityPayload};

pub const MOISTURE_RANGE: &str = "moisture_range";
pub const TEMPERATURE_RANGE: &str = "temperature_range";
pub const READINGS_PRESENT: &str = "readings_present";
pub const READINGS_RANGE: &str = "readings_range";
pub const READINGS_TIME_ORDER: &str = "readings_time_order";
pub const READINGS_STEP: &str = "readings_step";
pub const READINGS_DEVIATION: &str = "readings_deviation";

pub fn evaluate(payload: &QualityPayload, bounds: &QualityBounds) -> (Claim, Option<Violation>) {
    let mut checks = Checklist::new(ProofType::Quality);
    let readings = &payload.readings;

    checks.record(MOISTURE_RANGE, in_range(payload.moisture_level, &bounds.moisture, "moisture"));
    checks.record(
        TEMPERATURE_RANGE,
        in_range(payload.temperature, &bounds.temperature, "temperature"),
    );

    checks.record(
        READINGS_PRESENT,
        if readings.len() < bounds.min_readings || readings.len() > bounds.max_readings {
            Err(format!(
                "{} readings, expected {}..={}",
                readings.len(),
                bounds.min_readings,
                bounds.max_readings
            ))
        } else {
            Ok(())
        },
    );

    checks.record(
        READINGS_RANGE,
        match readings
            .iter()
            .position(|r| !bounds.reading_range.contains(r.value))
        {
            Some(i) => Err(format!(
                "reading {i} ({}) outside {}",
                readings[i].value, bounds.reading_range
            )),
            None => Ok(()),
        },
    );

    checks.record(
        READINGS_TIME_ORDER,
        match readings.windows(2).position(|w| w[1].at < w[0].at) {
            Some(i) => Err(format!("reading {} is timestamped before reading {i}", i + 1)),
            None => Ok(()),
        },
    );

    checks.record(
        READINGS_STEP,
        match readings
            .windows(2)
            .position(|w| (w[1].value - w[0].value).abs() > bounds.max_step)
        {
            Some(i) => Err(format!(
                "step {} -> {} exceeds {}",
                readings[i].value,
                readings[i + 1].value,
                bounds.max_step
            )),
            None => Ok(()),
        },
    );

    let deviation = std_dev(readings.iter().map(|r| r.value));
    checks.record(
        READINGS_DEVIATION,
        if deviation > bounds.max_std_dev {
            Err(format!("standard deviation {deviation:.3} exceeds {}", bounds.max_std_dev))
        } else {
            Ok(())
        },
    );

    checks.finish(ClaimDetail::Quality {
        stage: payload.stage.clone(),
        reading_count: readings.len() as u64,
    })
}

fn in_range(value: f64, range: &crate::config::ValueRange, what: &str) -> Result<(), String> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(format!("{what} {value} outside {range}"))
    }
}

/// Population standard deviation; zero for an empty series.
fn std_dev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count();
    if n == 0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::SensorReading;

    fn payload(moisture: f64, temperature: f64, values: &[f64]) -> QualityPayload {
        QualityPayload {
            batch_id: None,
            stage: "harvest".into(),
            moisture_level: moisture,
            temperature,
            readings: values
                .iter()
                .enumerate()
                .map(|(i, v)| SensorReading {
                    at: 1_000 * i as u64,
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn in_range_series_passes_every_check() {
        let (claim, violation) =
            evaluate(&payload(9.5, 6.0, &[5.8, 6.0, 6.3, 6.1]), &QualityBounds::default());
        assert!(violation.is_none());
        assert_eq!(claim.checks.len(), 7);
        assert!(claim.all_passed());
    }

    #[test]
    fn hot_temperature_fails_its_check() {
        let (claim, violation) = evaluate(&payload(9.5, 15.0, &[]), &QualityBounds::default());
        let violation = violation.unwrap();
        assert_eq!(violation.check, TEMPERATURE_RANGE);
        assert!(violation.detail.contains("15"));
        assert_eq!(claim.passed_count(), 6);
    }

    #[test]
    fn series_checks() {
        let bounds = QualityBounds::default();

        let (_, v) = evaluate(&payload(9.5, 6.0, &[6.0, 12.0]), &bounds);
        assert_eq!(v.unwrap().check, READINGS_RANGE);

        let (_, v) = evaluate(&payload(9.5, 6.0, &[4.5, 9.5]), &bounds);
        assert_eq!(v.unwrap().check, READINGS_STEP);

        let tight = QualityBounds {
            max_step: 10.0,
            max_std_dev: 1.0,
            ..QualityBounds::default()
        };
        let (_, v) = evaluate(&payload(9.5, 6.0, &[4.0, 10.0, 4.0, 10.0]), &tight);
        assert_eq!(v.unwrap().check, READINGS_DEVIATION);

        let mut shuffled = payload(9.5, 6.0, &[6.0, 6.1, 6.2]);
        shuffled.readings[2].at = 500;
        let (_, v) = evaluate(&shuffled, &bounds);
        assert_eq!(v.unwrap().check, READINGS_TIME_ORDER);
    }

    #[test]
    fn reading_count_limits() {
        let bounds = QualityBounds {
            min_readings: 2,
            ..QualityBounds::default()
        };
        let (_, v) = evaluate(&payload(9.5, 6.0, &[6.0]), &bounds);
        assert_eq!(v.unwrap().check, READINGS_PRESENT);
    }

    #[test]
    fn population_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(std_dev(values.iter().copied()), 2.0);
        assert_eq!(std_dev(std::iter::empty()), 0.0);
    }

    proptest::proptest! {
        #[test]
        fn steady_in_range_series_always_verify(
            moisture in 8.0f64..=11.0,
            temperature in 4.0f64..=10.0,
            values in proptest::collection::vec(5.5f64..=8.5, 0..32),
        ) {
            let (claim, violation) =
                evaluate(&payload(moisture, temperature, &values), &QualityBounds::default());
            proptest::prop_assert!(violation.is_none(), "{:?}", violation);
            proptest::prop_assert!(claim.all_passed());
        }

        #[test]
        fn one_reading_out_of_range_always_fails_readings_range(
            values in proptest::collection::vec(5.5f64..=8.5, 1..32),
            index in proptest::prelude::any::<proptest::sample::Index>(),
            outlier in proptest::prop_oneof![-50.0f64..3.99, 10.01f64..50.0],
        ) {
            let mut values = values;
            let at = index.index(values.len());
            values[at] = outlier;
            let (_, violation) = evaluate(&payload(9.5, 6.0, &values), &QualityBounds::default());
            let violation = violation.unwrap();
            proptest::prop_assert_eq!(violation.check.as_str(), READINGS_RANGE);
            let expected = format!("reading {at} ");
            proptest::prop_assert!(violation.detail.starts_with(&expected));
        }
    }
}
