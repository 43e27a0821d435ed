use std::cmp::Ordering;

use crate::core::distance::{haversine_distance, round_km};
use crate::models::{DriverCandidate, GeoPoint, NearbyDriver, UNKNOWN_CAR_MODEL};

/// Shape a store candidate into a matched driver
pub fn to_nearby_driver(candidate: DriverCandidate, distance_km: f64) -> NearbyDriver {
    NearbyDriver {
        driver_id: candidate.driver_id,
        car_model: candidate
            .car_model
            .unwrap_or_else(|| UNKNOWN_CAR_MODEL.to_string()),
        distance_km,
        location: candidate.location,
    }
}

/// Nearest first, equal distances by ascending driver id
#[inline]
pub fn by_distance_then_id(a: &NearbyDriver, b: &NearbyDriver) -> Ordering {
    a.distance_km
        .partial_cmp(&b.distance_km)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.driver_id.cmp(&b.driver_id))
}

/// Exact radius filter and ranking over bounding box candidates
///
/// Distances are Haversine kilometers rounded to 2 decimals; the boundary is
/// inclusive on the rounded value.
pub fn rank_within_radius(
    pickup: GeoPoint,
    radius_km: f64,
    candidates: Vec<DriverCandidate>,
) -> Vec<NearbyDriver> {
    let mut ranked: Vec<NearbyDriver> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance_km = round_km(haversine_distance(
                pickup.lat,
                pickup.lng,
                candidate.location.lat,
                candidate.location.lng,
            ));

            if distance_km <= radius_km {
                Some(to_nearby_driver(candidate, distance_km))
            } else {
                None
            }
        })
        .collect();

    ranked.sort_by(by_distance_then_id);
    ranked
}
