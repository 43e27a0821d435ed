use geo::{GeodesicDistance, Point};
use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude used for the bounding box pre-filter
pub const KM_PER_DEGREE: f64 = 111.12;

/// Lower bound for cos(latitude) when widening the longitude band
pub const MIN_LNG_SCALE: f64 = 0.01;

/// Largest exact distance beyond the radius that still rounds to it
pub const ROUNDING_SLACK_KM: f64 = 0.005;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Great-circle distance in kilometers on a sphere of radius 6371 km
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Ellipsoidal (WGS-84) geodesic distance in kilometers
///
/// Same model PostGIS uses for `geography` distances.
#[inline]
pub fn geodesic_distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let a = Point::new(from.lng, from.lat);
    let b = Point::new(to.lng, to.lat);
    a.geodesic_distance(&b) / 1000.0
}

/// Round a distance to 2 decimal places
#[inline]
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}

/// Calculate a bounding box around a center point
///
/// Used to narrow candidates before the exact Haversine check, so the box is
/// always a superset of the radius away from the poles. The radius is padded
/// by [`ROUNDING_SLACK_KM`] so every point whose rounded distance passes the
/// inclusive check lies inside, whatever its bearing.
/// 1° latitude ≈ 111.12 km, 1° longitude ≈ 111.12 km * cos(latitude).
///
/// cos(latitude) is floored at 0.01 so the longitude delta stays finite at
/// ±90°. Near the poles the box is therefore only an approximation of the
/// search circle. Longitudes are not normalized here; see
/// [`BoundingBox::lng_ranges`] for boxes crossing ±180°.
pub fn calculate_bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let reach_km = radius_km + ROUNDING_SLACK_KM;
    let lat_delta = reach_km / KM_PER_DEGREE;

    let lng_scale = lat.to_radians().cos().max(MIN_LNG_SCALE);
    let lng_delta = reach_km / (KM_PER_DEGREE * lng_scale);

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lng: lng - lng_delta,
        max_lng: lng + lng_delta,
    }
}

/// Check if a point is within a bounding box (edges inclusive)
///
/// Boxes reaching past ±180° wrap onto the other side of the antimeridian.
#[inline]
pub fn is_within_bounding_box(lat: f64, lng: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && bbox
            .lng_ranges()
            .iter()
            .any(|&(min_lng, max_lng)| lng >= min_lng && lng <= max_lng)
}
