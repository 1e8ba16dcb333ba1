use crate::claim::{round_to, Checklist, Claim, ClaimDetail, Violation};
use crate::config::RouteBounds;
use crate::payload::{GeoPoint, ProofType, RoutePayload};

pub const MIN_POINTS: &str = "min_points";
pub const COORDINATES_VALID: &str = "coordinates_valid";
pub const TIME_MONOTONIC: &str = "time_monotonic";
pub const ORIGIN_MATCH: &str = "origin_match";
pub const DESTINATION_MATCH: &str = "destination_match";
pub const WITHIN_ENVELOPE: &str = "within_envelope";
pub const PLAUSIBLE_SPEED: &str = "plausible_speed";

/// Mean Earth radius, km.
const EARTH_RADIUS_KM: f64 = 6371.0088;

pub fn evaluate(payload: &RoutePayload, bounds: &RouteBounds) -> (Claim, Option<Violation>) {
    let mut checks = Checklist::new(ProofType::Route);
    let points = &payload.points;

    checks.record(
        MIN_POINTS,
        if points.len() < bounds.min_points {
            Err(format!("{} points, need at least {}", points.len(), bounds.min_points))
        } else {
            Ok(())
        },
    );

    checks.record(
        COORDINATES_VALID,
        match points.iter().position(|p| {
            !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lng)
        }) {
            Some(i) => Err(format!("point {i} ({}, {}) is not on Earth", points[i].lat, points[i].lng)),
            None => Ok(()),
        },
    );

    checks.record(
        TIME_MONOTONIC,
        match points.windows(2).position(|w| w[1].at < w[0].at) {
            Some(i) => Err(format!("point {} goes back in time", i + 1)),
            None => Ok(()),
        },
    );

    checks.record(
        ORIGIN_MATCH,
        match points.first() {
            Some(p) if payload.origin.contains(p) => Ok(()),
            Some(p) => Err(format!("first point ({}, {}) is outside the origin", p.lat, p.lng)),
            None => Err("no points".to_string()),
        },
    );

    checks.record(
        DESTINATION_MATCH,
        match points.last() {
            Some(p) if payload.destination.contains(p) => Ok(()),
            Some(p) => Err(format!(
                "last point ({}, {}) is outside the destination",
                p.lat, p.lng
            )),
            None => Err("no points".to_string()),
        },
    );

    let envelope = payload
        .origin
        .union(&payload.destination)
        .expanded(bounds.margin_deg);
    checks.record(
        WITHIN_ENVELOPE,
        match points.iter().position(|p| !envelope.contains(p)) {
            Some(i) => Err(format!(
                "point {i} ({}, {}) strays outside the route envelope",
                points[i].lat, points[i].lng
            )),
            None => Ok(()),
        },
    );

    checks.record(PLAUSIBLE_SPEED, plausible_speed(points, bounds.max_speed_kmh));

    let distance_km: f64 = points.windows(2).map(|w| haversine_km(&w[0], &w[1])).sum();
    let duration_secs = match (points.first(), points.last()) {
        (Some(first), Some(last)) => last.at.saturating_sub(first.at) / 1_000,
        _ => 0,
    };
    checks.finish(ClaimDetail::Route {
        route_label: payload.route_label.clone(),
        point_count: points.len() as u64,
        distance_km: round_to(distance_km, 1),
        duration_secs,
    })
}

fn plausible_speed(points: &[GeoPoint], max_speed_kmh: f64) -> Result<(), String> {
    for (i, w) in points.windows(2).enumerate() {
        let km = haversine_km(&w[0], &w[1]);
        // Backward jumps are reported by the time check.
        let Some(elapsed_ms) = w[1].at.checked_sub(w[0].at) else {
            continue;
        };
        if elapsed_ms == 0 {
            if km > 1e-6 {
                return Err(format!("moved {km:.3} km between points {i} and {} in zero time", i + 1));
            }
            continue;
        }
        let speed = km / (elapsed_ms as f64 / 3_600_000.0);
        if speed > max_speed_kmh {
            return Err(format!(
                "{speed:.1} km/h between points {i} and {} exceeds {max_speed_kmh}",
                i + 1
            ));
        }
    }
    Ok(())
}

/// Great-circle distance between two points.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
