use serde::{Deserialize, Serialize};

/// Label used when a driver has no car attached
pub const UNKNOWN_CAR_MODEL: &str = "Unknown";

/// A WGS-84 coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Driver location and availability as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub is_available: bool,
    pub current_lat: f64,
    pub current_lng: f64,
}

impl Driver {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.current_lat, self.current_lng)
    }
}

/// Car attached to a driver (at most one per driver)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub driver_id: i64,
    pub model: String,
}

/// Available driver read from the store together with its optional car
#[derive(Debug, Clone, PartialEq)]
pub struct DriverCandidate {
    pub driver_id: i64,
    pub car_model: Option<String>,
    pub location: GeoPoint,
}

/// Ride request parameters as written to the audit log
#[derive(Debug, Clone, PartialEq)]
pub struct NewRideRequest {
    pub user_id: i64,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub radius_km: f64,
}

/// Persisted ride request audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequestRecord {
    pub id: i64,
    pub user_id: i64,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub radius_km: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Input to the matching engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchQuery {
    pub user_id: i64,
    pub pickup: GeoPoint,
    pub radius_km: f64,
    pub page: u32,
    pub limit: u32,
}

impl MatchQuery {
    pub fn audit_record(&self) -> NewRideRequest {
        NewRideRequest {
            user_id: self.user_id,
            pickup_lat: self.pickup.lat,
            pickup_lng: self.pickup.lng,
            radius_km: self.radius_km,
        }
    }
}

/// Driver matched within the search radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyDriver {
    pub driver_id: i64,
    pub car_model: String,
    /// Rounded to 2 decimal places
    pub distance_km: f64,
    pub location: GeoPoint,
}

/// One page of ranked drivers plus the unpaged match count
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPage {
    pub drivers: Vec<NearbyDriver>,
    pub total: u64,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPage")]
    pub total_pages: u64,
}

/// Result of a matching call
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub drivers: Vec<NearbyDriver>,
    pub meta: PageMeta,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Longitude ranges covered by the box, normalized to [-180, 180]
    ///
    /// A box that crosses the antimeridian is split in two; otherwise both
    /// entries hold the same range.
    pub fn lng_ranges(&self) -> [(f64, f64); 2] {
        if self.max_lng - self.min_lng >= 360.0 {
            [(-180.0, 180.0); 2]
        } else if self.min_lng < -180.0 {
            [(self.min_lng + 360.0, 180.0), (-180.0, self.max_lng)]
        } else if self.max_lng > 180.0 {
            [(self.min_lng, 180.0), (-180.0, self.max_lng - 360.0)]
        } else {
            [(self.min_lng, self.max_lng); 2]
        }
    }
}

/// Store-side radius query used by the pushdown strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub limit: u32,
    pub offset: u64,
}
