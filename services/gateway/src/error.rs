use axum::{
    extract::ws::rejection::WebSocketUpgradeRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Upgrade required: {0}")]
    UpgradeRequired(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<WebSocketUpgradeRejection> for AppError {
    fn from(rejection: WebSocketUpgradeRejection) -> Self {
        AppError::UpgradeRequired(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::UpgradeRequired(msg) => {
                (StatusCode::UPGRADE_REQUIRED, msg, "UPGRADE_REQUIRED")
            }
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                msg,
                "SERVICE_UNAVAILABLE",
            ),
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
