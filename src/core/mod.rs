// Core algorithm exports
pub mod distance;
pub mod matcher;
pub mod pagination;
pub mod ranking;
pub mod strategy;

pub use distance::{calculate_bounding_box, geodesic_distance_km, haversine_distance, is_within_bounding_box, round_km};
pub use matcher::RideMatcher;
pub use pagination::{total_pages, PageWindow};
pub use ranking::{by_distance_then_id, rank_within_radius};
pub use strategy::SelectionStrategy;
