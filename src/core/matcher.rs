use crate::core::pagination::PageWindow;
use crate::core::strategy::SelectionStrategy;
use crate::error::MatchError;
use crate::models::{MatchQuery, MatchResult};
use crate::services::DriverStore;

/// Nearby driver matching engine
///
/// # Pipeline
/// 1. Requesting user must exist
/// 2. Ride request audit record is written
/// 3. Candidates are selected by the configured strategy
/// 4. Ranked page and pagination metadata are returned
///
/// The engine holds no state besides its strategy; all data lives in the
/// store passed to each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RideMatcher {
    strategy: SelectionStrategy,
}

impl RideMatcher {
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Match available drivers around the pickup point
    ///
    /// An unknown user fails with [`MatchError::NotFound`] before anything is
    /// written or queried. Otherwise exactly one audit record is written, and
    /// it stays written even if the candidate query fails afterwards.
    pub async fn match_nearby_drivers(
        &self,
        store: &dyn DriverStore,
        query: &MatchQuery,
    ) -> Result<MatchResult, MatchError> {
        if !store.user_exists(query.user_id).await? {
            tracing::info!("Ride request rejected: user {} does not exist", query.user_id);
            return Err(MatchError::user_not_found());
        }

        let record = store.insert_ride_request(&query.audit_record()).await?;
        tracing::debug!("Ride request {} recorded for user {}", record.id, query.user_id);

        let window = PageWindow::new(query.page, query.limit);
        let page = self
            .strategy
            .select(store, query.pickup, query.radius_km, window)
            .await?;

        tracing::info!(
            "Matched {} drivers (total: {}) within {} km of ({}, {}) using {}",
            page.drivers.len(),
            page.total,
            query.radius_km,
            query.pickup.lat,
            query.pickup.lng,
            self.strategy
        );

        Ok(MatchResult {
            drivers: page.drivers,
            meta: window.meta(page.total),
        })
    }
}
