use serde::{Deserialize, Serialize};
use crate::models::domain::{GeoPoint, MatchResult, NearbyDriver, PageMeta};

/// Driver entry in the ride request response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableDriver {
    pub driver_id: i64,
    pub car_model: String,
    pub distance_km: f64,
    pub location: GeoPoint,
}

impl From<NearbyDriver> for AvailableDriver {
    fn from(driver: NearbyDriver) -> Self {
        Self {
            driver_id: driver.driver_id,
            car_model: driver.car_model,
            distance_km: driver.distance_km,
            location: driver.location,
        }
    }
}

/// Response for the ride request endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRequestResponse {
    pub success: bool,
    pub available_drivers: Vec<AvailableDriver>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl From<MatchResult> for RideRequestResponse {
    fn from(result: MatchResult) -> Self {
        Self {
            success: true,
            available_drivers: result.drivers.into_iter().map(AvailableDriver::from).collect(),
            meta: Some(result.meta),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Field-level error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
    pub path: String,
    pub message: String,
}

/// Error envelope returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub path: String,
    pub message: String,
    #[serde(rename = "errorSources")]
    pub error_sources: Vec<ErrorSource>,
}
