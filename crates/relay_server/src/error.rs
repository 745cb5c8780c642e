use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_logging::relay_error;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP endpoints as `{"message": ...}` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("URL is required")]
    MissingUrl,
    /// The evaluation API or fetched URL did not give a usable answer.
    #[error("{0}")]
    Upstream(String),
    #[error("Not found")]
    NotFound,
    #[error("Something went wrong!")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Turns a handler panic into the generic 500 body.
pub(crate) fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    relay_error!("Handler panicked: {}", detail);
    ApiError::Internal.into_response()
}
