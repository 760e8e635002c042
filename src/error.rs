use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Routing API error: {0}")]
    RoutingApi(String),

    #[error("Overpass API error: {0}")]
    OverpassApi(String),

    #[error("Graph search failed: {0}")]
    GraphSearch(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Activity encoding failed: {0}")]
    Encoding(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap any displayable writer error as an encoding failure
    pub fn encoding<E: std::fmt::Display>(err: E) -> Self {
        AppError::Encoding(err.to_string())
    }
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::RoutingApi(ref e) => {
                tracing::error!("Routing API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error")
            }
            AppError::OverpassApi(ref e) => {
                tracing::error!("Overpass API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Street data service error")
            }
            AppError::GraphSearch(ref e) => {
                tracing::warn!("Graph search failed: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.as_str())
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::Encoding(ref e) => {
                tracing::error!("Activity encoding failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Activity encoding failed")
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::RoutingApi("down".into()), StatusCode::BAD_GATEWAY),
            (AppError::OverpassApi("down".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::GraphSearch("no path".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Encoding("xml".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
