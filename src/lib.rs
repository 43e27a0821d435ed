//! Ride Match - nearby driver matching service
//!
//! Given a pickup point and a search radius, finds available drivers ranked by
//! distance and paginated, recording every accepted request for audit.
//! Candidate selection runs either in PostGIS or in process behind a single
//! [`SelectionStrategy`](core::SelectionStrategy).

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{RideMatcher, SelectionStrategy, distance::{haversine_distance, calculate_bounding_box}};
pub use error::{ApiError, MatchError};
pub use models::{MatchQuery, MatchResult, NearbyDriver, PageMeta, RideRequestBody, RideRequestResponse};
pub use services::{DriverStore, InMemoryStore, PostgresClient, StoreError};
