use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::core::distance::{geodesic_distance_km, is_within_bounding_box, round_km};
use crate::core::ranking::{by_distance_then_id, to_nearby_driver};
use crate::models::{
    BoundingBox, Car, Driver, DriverCandidate, NewRideRequest, RadiusQuery, RankedPage,
    RideRequestRecord,
};
use crate::services::store::{DriverStore, StoreError};

/// In-process driver location store
///
/// Radius queries use the WGS-84 geodesic so results line up with the
/// PostGIS `geography` queries of [`PostgresClient`](super::PostgresClient).
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashSet<i64>>,
    drivers: RwLock<Vec<Driver>>,
    cars: RwLock<HashMap<i64, Car>>,
    ride_requests: RwLock<Vec<RideRequestRecord>>,
    next_request_id: AtomicI64,
    driver_reads: AtomicUsize,
    unavailable: AtomicBool,
    driver_reads_failing: AtomicBool,
    audit_writes_failing: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user_id: i64) {
        self.users.write().await.insert(user_id);
    }

    /// Insert or replace a driver by id
    pub async fn upsert_driver(&self, driver: Driver) {
        let mut drivers = self.drivers.write().await;
        match drivers.iter_mut().find(|d| d.id == driver.id) {
            Some(existing) => *existing = driver,
            None => drivers.push(driver),
        }
    }

    /// Attach a car to a driver, replacing any previous one
    pub async fn attach_car(&self, car: Car) {
        self.cars.write().await.insert(car.driver_id, car);
    }

    /// Snapshot of the audit log
    pub async fn ride_requests(&self) -> Vec<RideRequestRecord> {
        self.ride_requests.read().await.clone()
    }

    /// Number of driver queries served so far
    pub fn driver_reads(&self) -> usize {
        self.driver_reads.load(Ordering::SeqCst)
    }

    /// Make every operation fail as if the backing store were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only driver queries fail
    pub fn set_driver_reads_failing(&self, failing: bool) {
        self.driver_reads_failing.store(failing, Ordering::SeqCst);
    }

    /// Make only ride request inserts fail
    pub fn set_audit_writes_failing(&self, failing: bool) {
        self.audit_writes_failing.store(failing, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }

    fn begin_driver_read(&self) -> Result<(), StoreError> {
        self.ensure_available()?;
        self.driver_reads.fetch_add(1, Ordering::SeqCst);
        if self.driver_reads_failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("driver query failed".to_string()));
        }
        Ok(())
    }

    async fn available_candidates(&self) -> Vec<DriverCandidate> {
        let drivers = self.drivers.read().await;
        let cars = self.cars.read().await;

        drivers
            .iter()
            .filter(|d| d.is_available)
            .map(|d| DriverCandidate {
                driver_id: d.id,
                car_model: cars.get(&d.id).map(|c| c.model.clone()),
                location: d.location(),
            })
            .collect()
    }
}

#[async_trait]
impl DriverStore for InMemoryStore {
    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        self.ensure_available()?;
        Ok(self.users.read().await.contains(&user_id))
    }

    async fn insert_ride_request(
        &self,
        request: &NewRideRequest,
    ) -> Result<RideRequestRecord, StoreError> {
        self.ensure_available()?;
        if self.audit_writes_failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("ride request insert failed".to_string()));
        }

        let record = RideRequestRecord {
            id: self.next_request_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: request.user_id,
            pickup_lat: request.pickup_lat,
            pickup_lng: request.pickup_lng,
            radius_km: request.radius_km,
            created_at: chrono::Utc::now(),
        };
        self.ride_requests.write().await.push(record.clone());

        Ok(record)
    }

    async fn available_drivers_in_box(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<DriverCandidate>, StoreError> {
        self.begin_driver_read()?;

        Ok(self
            .available_candidates()
            .await
            .into_iter()
            .filter(|c| is_within_bounding_box(c.location.lat, c.location.lng, bbox))
            .collect())
    }

    async fn nearest_available_drivers(
        &self,
        query: &RadiusQuery,
    ) -> Result<RankedPage, StoreError> {
        self.begin_driver_read()?;

        let mut ranked: Vec<_> = self
            .available_candidates()
            .await
            .into_iter()
            .filter_map(|candidate| {
                let exact_km = geodesic_distance_km(query.center, candidate.location);
                (exact_km <= query.radius_km)
                    .then(|| to_nearby_driver(candidate, round_km(exact_km)))
            })
            .collect();
        ranked.sort_by(by_distance_then_id);

        let total = ranked.len() as u64;
        let drivers = ranked
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .collect();

        Ok(RankedPage { drivers, total })
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}
