//! Health check endpoint

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::api::middleware::AppState;

/// Health report including database reachability
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
    pub total_requests: u64,
}

/// GET /api/health - Service and database health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.pool.ping().await.is_ok();

    let response = HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        uptime_seconds: state.request_stats.uptime_seconds(),
        total_requests: state.request_stats.total_requests(),
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
