use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request body for a ride request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RideRequestBody {
    #[validate(range(min = 1, message = "user_id must be a positive integer"))]
    pub user_id: i64,
    #[validate(
        custom(function = "finite"),
        range(min = -90.0, max = 90.0, message = "pickup_lat must be between -90 and 90")
    )]
    pub pickup_lat: f64,
    #[validate(
        custom(function = "finite"),
        range(min = -180.0, max = 180.0, message = "pickup_lng must be between -180 and 180")
    )]
    pub pickup_lng: f64,
    #[validate(
        custom(function = "finite"),
        range(exclusive_min = 0.0, max = 100.0, message = "radius_km must be greater than 0 and at most 100")
    )]
    pub radius_km: f64,
}

/// Pagination query string (`?page=&limit=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<u32>,
}

fn finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message("must be a finite number".into()))
    }
}
