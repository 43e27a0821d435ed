use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::time::Duration;

use crate::core::ranking::to_nearby_driver;
use crate::models::{
    BoundingBox, DriverCandidate, GeoPoint, NewRideRequest, RadiusQuery, RankedPage,
    RideRequestRecord,
};
use crate::services::store::{DriverStore, StoreError};

/// Pool options for [`PostgresClient::from_settings`]
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub run_migrations: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    driver_id: i64,
    car_model: Option<String>,
    lat: f64,
    lng: f64,
}

impl From<CandidateRow> for DriverCandidate {
    fn from(row: CandidateRow) -> Self {
        DriverCandidate {
            driver_id: row.driver_id,
            car_model: row.car_model,
            location: GeoPoint::new(row.lat, row.lng),
        }
    }
}

#[derive(Debug, FromRow)]
struct RankedRow {
    driver_id: i64,
    car_model: Option<String>,
    distance_km: f64,
    lat: f64,
    lng: f64,
    total_count: i64,
}

#[derive(Debug, FromRow)]
struct RideRequestRow {
    id: i64,
    user_id: i64,
    pickup_lat: f64,
    pickup_lng: f64,
    radius_km: f64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RideRequestRow> for RideRequestRecord {
    fn from(row: RideRequestRow) -> Self {
        RideRequestRecord {
            id: row.id,
            user_id: row.user_id,
            pickup_lat: row.pickup_lat,
            pickup_lng: row.pickup_lng,
            radius_km: row.radius_km,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL/PostGIS driver location store
///
/// Drivers, cars and users are owned by other services; this client only
/// reads them and appends ride request audit rows.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(database_url: &str, options: &PoolOptions) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(options.acquire_timeout)
            .idle_timeout(options.idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        if options.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        settings: &crate::config::DatabaseSettings,
    ) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {} connections)",
            settings.max_connections
        );

        let options = PoolOptions {
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
            acquire_timeout: Duration::from_secs(settings.acquire_timeout_secs),
            idle_timeout: Duration::from_secs(settings.idle_timeout_secs),
            run_migrations: settings.run_migrations,
        };

        Self::new(&settings.url, &options).await
    }

    async fn count_within(&self, query: &RadiusQuery) -> Result<i64, StoreError> {
        let sql = r#"
            SELECT COUNT(*)
            FROM drivers d
            WHERE d.is_available = true
              AND ST_DWithin(
                    d.location,
                    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
                    $3::float8 * 1000
                  )
        "#;

        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(query.center.lng)
            .bind(query.center.lat)
            .bind(query.radius_km)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl DriverStore for PostgresClient {
    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn insert_ride_request(
        &self,
        request: &NewRideRequest,
    ) -> Result<RideRequestRecord, StoreError> {
        let sql = r#"
            INSERT INTO ride_requests (user_id, pickup_lat, pickup_lng, radius_km, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, user_id, pickup_lat, pickup_lng, radius_km, created_at
        "#;

        let row = sqlx::query_as::<_, RideRequestRow>(sql)
            .bind(request.user_id)
            .bind(request.pickup_lat)
            .bind(request.pickup_lng)
            .bind(request.radius_km)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Recorded ride request {} for user {}", row.id, row.user_id);

        Ok(row.into())
    }

    async fn available_drivers_in_box(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<DriverCandidate>, StoreError> {
        let sql = r#"
            SELECT d.id AS driver_id, c.model AS car_model,
                   d.current_lat AS lat, d.current_lng AS lng
            FROM drivers d
            LEFT JOIN cars c ON c.driver_id = d.id
            WHERE d.is_available = true
              AND d.current_lat BETWEEN $1 AND $2
              AND (d.current_lng BETWEEN $3 AND $4 OR d.current_lng BETWEEN $5 AND $6)
        "#;

        let [(west_min, west_max), (east_min, east_max)] = bbox.lng_ranges();

        let rows = sqlx::query_as::<_, CandidateRow>(sql)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(west_min)
            .bind(west_max)
            .bind(east_min)
            .bind(east_max)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Bounding box query returned {} drivers", rows.len());

        Ok(rows.into_iter().map(DriverCandidate::from).collect())
    }

    async fn nearest_available_drivers(
        &self,
        query: &RadiusQuery,
    ) -> Result<RankedPage, StoreError> {
        let sql = r#"
            SELECT
                d.id AS driver_id,
                c.model AS car_model,
                ROUND((ST_Distance(
                    d.location,
                    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography
                ) / 1000)::numeric, 2)::float8 AS distance_km,
                d.current_lat AS lat,
                d.current_lng AS lng,
                COUNT(*) OVER() AS total_count
            FROM drivers d
            LEFT JOIN cars c ON c.driver_id = d.id
            WHERE d.is_available = true
              AND ST_DWithin(
                    d.location,
                    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
                    $3::float8 * 1000
                  )
            ORDER BY distance_km ASC, d.id ASC
            LIMIT $4
            OFFSET $5
        "#;

        let rows = sqlx::query_as::<_, RankedRow>(sql)
            .bind(query.center.lng)
            .bind(query.center.lat)
            .bind(query.radius_km)
            .bind(i64::from(query.limit))
            .bind(i64::try_from(query.offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        // The window count only exists on returned rows; a page past the end
        // needs its own count.
        let total = match rows.first() {
            Some(row) => row.total_count,
            None if query.offset > 0 => self.count_within(query).await?,
            None => 0,
        };

        let drivers = rows
            .into_iter()
            .map(|row| {
                let candidate = DriverCandidate {
                    driver_id: row.driver_id,
                    car_model: row.car_model,
                    location: GeoPoint::new(row.lat, row.lng),
                };
                to_nearby_driver(candidate, row.distance_km)
            })
            .collect();

        Ok(RankedPage {
            drivers,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
