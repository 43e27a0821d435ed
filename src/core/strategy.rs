use serde::{Deserialize, Serialize};

use crate::core::distance::calculate_bounding_box;
use crate::core::pagination::PageWindow;
use crate::core::ranking::rank_within_radius;
use crate::models::{GeoPoint, RadiusQuery, RankedPage};
use crate::services::{DriverStore, StoreError};

/// How candidate drivers are selected and ranked
///
/// Both strategies honor the same contract: available drivers within the
/// radius, ranked by distance then driver id, one page plus the full count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Radius filter, distance, ordering and paging run in the store
    #[default]
    Pushdown,
    /// Box pre-filter in the store, Haversine filter and paging in process
    BoundingBox,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::Pushdown => "pushdown",
            SelectionStrategy::BoundingBox => "bounding_box",
        }
    }

    /// Select one ranked page of drivers around `pickup`
    pub async fn select(
        &self,
        store: &dyn DriverStore,
        pickup: GeoPoint,
        radius_km: f64,
        window: PageWindow,
    ) -> Result<RankedPage, StoreError> {
        match self {
            SelectionStrategy::Pushdown => {
                let query = RadiusQuery {
                    center: pickup,
                    radius_km,
                    limit: window.limit,
                    offset: window.offset(),
                };
                store.nearest_available_drivers(&query).await
            }
            SelectionStrategy::BoundingBox => {
                let bbox = calculate_bounding_box(pickup.lat, pickup.lng, radius_km);
                let candidates = store.available_drivers_in_box(&bbox).await?;
                let in_box = candidates.len();

                let ranked = rank_within_radius(pickup, radius_km, candidates);
                tracing::debug!(
                    "Bounding box kept {} of {} candidates after exact distance check",
                    ranked.len(),
                    in_box
                );

                Ok(RankedPage {
                    total: ranked.len() as u64,
                    drivers: window.slice(&ranked),
                })
            }
        }
    }
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
