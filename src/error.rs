use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    PayloadTooLarge(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::PayloadTooLarge(msg) => {
                warn!("rejected analysis request: {msg}");
                (StatusCode::PAYLOAD_TOO_LARGE, msg).into_response()
            }
        }
    }
}
