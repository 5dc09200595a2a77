//! Response bodies and error mapping.
//!
//! Handlers return these types; internal error detail is logged by the
//! handler and never serialized to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct Greeting {
    pub message: &'static str,
}

/// Body of a successful `GET /slow`.
#[derive(Debug, Serialize)]
pub struct TaskCompleted {
    pub status: &'static str,
    pub message: String,
}

impl TaskCompleted {
    pub fn after_ms(elapsed_ms: u64) -> Self {
        Self {
            status: "Success",
            message: format!("Heavy Task completed in {}ms", elapsed_ms),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    error: &'static str,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    status: "Error",
                    error: "Internal Server Error",
                }),
            )
                .into_response(),
        }
    }
}
