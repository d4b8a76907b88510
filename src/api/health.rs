use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::types::HealthDto;
use super::{ApiResponse, AppState};

/// `GET /api/health`
///
/// Readiness probe; answers 503 while the database is unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store().ping().await.is_ok();

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthDto {
            ready: database,
            database,
            uptime_seconds: state.start_time.elapsed().as_secs(),
        })),
    )
        .into_response()
}
