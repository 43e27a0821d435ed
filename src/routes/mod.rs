// Route exports
pub mod rides;

use actix_web::{error, http::StatusCode, web, HttpRequest};

use crate::error::ApiError;

pub use rides::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(rides::health_check))
        .service(web::scope("/api").configure(rides::configure));
}

/// Handle JSON payload errors
pub fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::new(StatusCode::BAD_REQUEST, req.path(), format!("Invalid JSON: {}", err)).into()
}

/// Handle query string errors
pub fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    ApiError::new(StatusCode::BAD_REQUEST, req.path(), format!("Invalid query: {}", err)).into()
}
