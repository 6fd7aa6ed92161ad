use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorRep {
    pub message: String,
}

pub enum ApiError {
    /// The request did not carry the configured webhook secret.
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorRep {
                    message: "Invalid webhook secret.".to_owned(),
                }),
            )
                .into_response(),
        }
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;
