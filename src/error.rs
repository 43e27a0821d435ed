use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::{ErrorResponse, ErrorSource};
use crate::services::StoreError;

/// Message returned when the requesting user is unknown
pub const USER_NOT_FOUND: &str = "User does not exist";

/// Errors surfaced by the matching engine and its request handling
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation Error")]
    InvalidArgument(Vec<ErrorSource>),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl MatchError {
    pub fn user_not_found() -> Self {
        MatchError::NotFound(USER_NOT_FOUND.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            MatchError::NotFound(_) => StatusCode::NOT_FOUND,
            MatchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            MatchError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for MatchError {
    fn from(errors: ValidationErrors) -> Self {
        MatchError::InvalidArgument(error_sources(&errors))
    }
}

/// Flatten field-level validation failures, ordered by field name
pub fn error_sources(errors: &ValidationErrors) -> Vec<ErrorSource> {
    let mut sources: Vec<ErrorSource> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| ErrorSource {
                path: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            })
        })
        .collect();
    sources.sort_by(|a, b| a.path.cmp(&b.path));
    sources
}

/// HTTP rendering of an error with the request path attached
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, path: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                success: false,
                path: path.to_string(),
                message: message.into(),
                error_sources: vec![],
            },
        }
    }

    pub fn from_match_error(err: MatchError, path: &str) -> Self {
        let status = err.status_code();
        let message = err.to_string();
        let error_sources = match err {
            MatchError::InvalidArgument(sources) => sources,
            _ => vec![],
        };

        Self {
            status,
            body: ErrorResponse {
                success: false,
                path: path.to_string(),
                message,
                error_sources,
            },
        }
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.body.path, self.body.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RideRequestBody;
    use validator::Validate;

    #[test]
    fn test_status_codes() {
        assert_eq!(MatchError::user_not_found().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(MatchError::InvalidArgument(vec![]).status_code(), StatusCode::BAD_REQUEST);

        let store = MatchError::from(StoreError::Unavailable("down".to_string()));
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_message() {
        let api = ApiError::from_match_error(MatchError::user_not_found(), "/api/ride/request");
        assert_eq!(api.body().message, "User does not exist");
        assert_eq!(api.body().path, "/api/ride/request");
        assert!(!api.body().success);
    }

    #[test]
    fn test_validation_sources() {
        let body = RideRequestBody {
            user_id: 0,
            pickup_lat: 95.0,
            pickup_lng: 90.0,
            radius_km: 5.0,
        };
        let err = MatchError::from(body.validate().unwrap_err());
        let api = ApiError::from_match_error(err, "/api/ride/request");

        assert_eq!(api.body().message, "Validation Error");
        let paths: Vec<&str> = api.body().error_sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["pickup_lat", "user_id"]);
    }
}
