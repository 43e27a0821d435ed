use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::RideMatcher;
use crate::error::{error_sources, ApiError, MatchError};
use crate::models::{GeoPoint, HealthResponse, MatchQuery, PageQuery, RideRequestBody, RideRequestResponse};
use crate::services::DriverStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DriverStore>,
    pub matcher: RideMatcher,
    pub matching: MatchingSettings,
}

/// Configure all ride-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ride/request", web::post().to(request_ride));
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Validate the body and pagination query and build the engine input
pub fn validate_ride_request(
    body: &RideRequestBody,
    page: &PageQuery,
    matching: &MatchingSettings,
) -> Result<MatchQuery, MatchError> {
    let mut sources = Vec::new();
    if let Err(errors) = body.validate() {
        sources.extend(error_sources(&errors));
    }
    if let Err(errors) = page.validate() {
        sources.extend(error_sources(&errors));
    }
    if !sources.is_empty() {
        return Err(MatchError::InvalidArgument(sources));
    }

    Ok(MatchQuery {
        user_id: body.user_id,
        pickup: GeoPoint::new(body.pickup_lat, body.pickup_lng),
        radius_km: body.radius_km,
        page: page.page.unwrap_or(1),
        limit: matching.effective_limit(page.limit),
    })
}

/// Request a ride and list the nearest available drivers
///
/// POST /api/ride/request?page=1&limit=10
///
/// Request body:
/// ```json
/// {
///   "user_id": 1,
///   "pickup_lat": 23.8103,
///   "pickup_lng": 90.4125,
///   "radius_km": 5
/// }
/// ```
async fn request_ride(
    state: web::Data<AppState>,
    page: web::Query<PageQuery>,
    body: web::Json<RideRequestBody>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let path = http_req.path();

    let query = validate_ride_request(&body, &page, &state.matching).map_err(|e| {
        tracing::info!("Validation failed for ride request on {}: {}", path, e);
        ApiError::from_match_error(e, path)
    })?;

    let span = tracing::info_span!(
        "ride_request",
        request_id = %uuid::Uuid::new_v4(),
        user_id = query.user_id
    );

    let result = state
        .matcher
        .match_nearby_drivers(state.store.as_ref(), &query)
        .instrument(span)
        .await
        .map_err(|e| {
            match &e {
                MatchError::StoreUnavailable(inner) => {
                    tracing::error!("Ride request failed for user {}: {}", query.user_id, inner)
                }
                _ => tracing::info!("Ride request rejected for user {}: {}", query.user_id, e),
            }
            ApiError::from_match_error(e, path)
        })?;

    Ok(HttpResponse::Created().json(RideRequestResponse::from(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SelectionStrategy;
    use crate::models::{Car, Driver, ErrorResponse};
    use crate::routes::{configure_routes, json_error_handler, query_error_handler};
    use crate::services::InMemoryStore;
    use actix_web::{http::StatusCode, test, App};

    async fn create_store() -> Arc<InMemoryStore> {
        let store = InMemoryStore::new();
        store.add_user(1).await;
        store
            .upsert_driver(Driver {
                id: 2,
                is_available: true,
                current_lat: 23.8041,
                current_lng: 90.4152,
            })
            .await;
        store
            .upsert_driver(Driver {
                id: 3,
                is_available: true,
                current_lat: 23.7925,
                current_lng: 90.4078,
            })
            .await;
        store
            .attach_car(Car {
                driver_id: 2,
                model: "Honda Grace".to_string(),
            })
            .await;
        Arc::new(store)
    }

    fn create_state(store: Arc<InMemoryStore>, strategy: SelectionStrategy) -> AppState {
        AppState {
            store,
            matcher: RideMatcher::new(strategy),
            matching: MatchingSettings::default(),
        }
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_request_ride_created() {
        let store = create_store().await;
        let app = init_app!(create_state(store.clone(), SelectionStrategy::Pushdown));

        let req = test::TestRequest::post()
            .uri("/api/ride/request")
            .set_json(serde_json::json!({
                "user_id": 1,
                "pickup_lat": 23.8103,
                "pickup_lng": 90.4125,
                "radius_km": 5
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["available_drivers"][0]["driver_id"], 2);
        assert_eq!(body["available_drivers"][0]["car_model"], "Honda Grace");
        assert_eq!(body["available_drivers"][0]["location"]["lat"], 23.8041);
        assert_eq!(body["available_drivers"][1]["car_model"], "Unknown");
        assert_eq!(body["meta"]["page"], 1);
        assert_eq!(body["meta"]["limit"], 10);
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["meta"]["totalPage"], 1);

        assert_eq!(store.ride_requests().await.len(), 1);
    }

    #[actix_web::test]
    async fn test_request_ride_paginates() {
        let store = create_store().await;
        let app = init_app!(create_state(store, SelectionStrategy::BoundingBox));

        let req = test::TestRequest::post()
            .uri("/api/ride/request?page=2&limit=1")
            .set_json(serde_json::json!({
                "user_id": 1,
                "pickup_lat": 23.8103,
                "pickup_lng": 90.4125,
                "radius_km": 5
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["available_drivers"].as_array().unwrap().len(), 1);
        assert_eq!(body["available_drivers"][0]["driver_id"], 3);
        assert_eq!(body["meta"]["totalPage"], 2);
    }

    #[actix_web::test]
    async fn test_request_ride_unknown_user() {
        let store = create_store().await;
        let app = init_app!(create_state(store.clone(), SelectionStrategy::Pushdown));

        let req = test::TestRequest::post()
            .uri("/api/ride/request")
            .set_json(serde_json::json!({
                "user_id": 42,
                "pickup_lat": 23.8103,
                "pickup_lng": 90.4125,
                "radius_km": 5
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(!body.success);
        assert_eq!(body.message, "User does not exist");
        assert_eq!(body.path, "/api/ride/request");
        assert!(store.ride_requests().await.is_empty());
    }

    #[actix_web::test]
    async fn test_request_ride_validation_error() {
        let store = create_store().await;
        let app = init_app!(create_state(store.clone(), SelectionStrategy::Pushdown));

        let req = test::TestRequest::post()
            .uri("/api/ride/request?page=0")
            .set_json(serde_json::json!({
                "user_id": 1,
                "pickup_lat": 123.0,
                "pickup_lng": 90.4125,
                "radius_km": 150
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Validation Error");
        let paths: Vec<&str> = body.error_sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["pickup_lat", "radius_km", "page"]);
        assert!(store.ride_requests().await.is_empty());
    }

    #[actix_web::test]
    async fn test_request_ride_malformed_json() {
        let store = create_store().await;
        let app = init_app!(create_state(store, SelectionStrategy::Pushdown));

        let req = test::TestRequest::post()
            .uri("/api/ride/request")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"user_id\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(!body.success);
        assert!(body.message.starts_with("Invalid JSON"));
    }

    #[actix_web::test]
    async fn test_request_ride_store_down() {
        let store = create_store().await;
        store.set_unavailable(true);
        let app = init_app!(create_state(store, SelectionStrategy::Pushdown));

        let req = test::TestRequest::post()
            .uri("/api/ride/request")
            .set_json(serde_json::json!({
                "user_id": 1,
                "pickup_lat": 23.8103,
                "pickup_lng": 90.4125,
                "radius_km": 5
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_health_check() {
        let store = create_store().await;
        let app = init_app!(create_state(store.clone(), SelectionStrategy::Pushdown));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let body: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, "healthy");

        store.set_unavailable(true);
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let body: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, "degraded");
    }
}
