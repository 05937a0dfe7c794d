use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Contract violations detected on dispatch input. Anything recoverable
/// (a point nobody can take) is reported as data, not through this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error(
        "invalid capacity for driver {driver_id}: max_capacity={max_capacity}, current_load={current_load}"
    )]
    InvalidCapacity {
        driver_id: String,
        max_capacity: u32,
        current_load: u32,
    },

    #[error("time window of point {point_id} ends before it starts")]
    InvalidTimeWindow { point_id: String },

    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("dispatch timed out after {0} ms")]
    Timeout(u64),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Dispatch(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
