use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BoundingBox, DriverCandidate, NewRideRequest, RadiusQuery, RankedPage, RideRequestRecord};

/// Errors raised by a driver location store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam used by the matching engine
///
/// Reads of drivers and cars are point-in-time; the engine never writes them.
/// The only write is the append-only ride request audit record.
#[async_trait]
pub trait DriverStore: Send + Sync {
    /// Whether a user with this id exists
    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError>;

    /// Append a ride request audit record
    async fn insert_ride_request(
        &self,
        request: &NewRideRequest,
    ) -> Result<RideRequestRecord, StoreError>;

    /// Available drivers whose coordinates fall inside `bbox` (edges inclusive)
    async fn available_drivers_in_box(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<DriverCandidate>, StoreError>;

    /// Available drivers within `query.radius_km` by geodesic distance,
    /// ranked by rounded distance then driver id, windowed by limit/offset,
    /// with the unpaged match count
    async fn nearest_available_drivers(
        &self,
        query: &RadiusQuery,
    ) -> Result<RankedPage, StoreError>;

    /// Liveness probe used by the health endpoint
    async fn health_check(&self) -> Result<bool, StoreError>;
}
