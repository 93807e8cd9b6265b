use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message returned for a missing or malformed `Authorization` header.
pub const INVALID_API_KEY_FORMAT: &str = "Invalid API key format. Use 'Bearer sk-...'";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{}", INVALID_API_KEY_FORMAT)]
    Unauthorized,

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid OpenAI response: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
