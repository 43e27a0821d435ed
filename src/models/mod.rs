// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, Car, Driver, DriverCandidate, GeoPoint, MatchQuery, MatchResult, NearbyDriver,
    NewRideRequest, PageMeta, RadiusQuery, RankedPage, RideRequestRecord, UNKNOWN_CAR_MODEL,
};
pub use requests::{PageQuery, RideRequestBody};
pub use responses::{AvailableDriver, ErrorResponse, ErrorSource, HealthResponse, RideRequestResponse};
