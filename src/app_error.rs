use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// 应用错误
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("internal error: {:#}", self.0);
        let body = Json(json!({
            "detail": "Internal server error"
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(value: E) -> Self {
        Self(value.into())
    }
}

/// 授权错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    TokenCreation,
    InvalidToken,
    MissingDeliveryKey,
    InvalidDeliveryKey,
}

impl AuthError {
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::TokenCreation => (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::MissingDeliveryKey => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Missing x-api-key header")
            }
            AuthError::InvalidDeliveryKey => (StatusCode::UNAUTHORIZED, "Invalid delivery key"),
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status_and_message().1)
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "detail": error_message
        }));

        (status, body).into_response()
    }
}
