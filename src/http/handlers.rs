//! Application endpoint handlers.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};

use crate::http::response::{ApiError, Greeting, TaskCompleted};
use crate::http::server::AppState;
use crate::observability::metrics::EXPOSITION_CONTENT_TYPE;

pub async fn root() -> Json<Greeting> {
    tracing::info!("Req came on / router");
    Json(Greeting {
        message: "Hello from Express Server",
    })
}

pub async fn slow(State(state): State<AppState>) -> Result<Json<TaskCompleted>, ApiError> {
    tracing::info!("Req came on /slow router");
    match state.workload.run().await {
        Ok(elapsed_ms) => Ok(Json(TaskCompleted::after_ms(elapsed_ms))),
        Err(e) => {
            tracing::error!(error = %e, "Heavy task failed");
            Err(ApiError::Internal)
        }
    }
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
