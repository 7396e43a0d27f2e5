//! 헬스 체크 endpoint.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// 헬스 체크 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" | "degraded"
    pub status: String,
    /// API 버전
    pub version: String,
    /// 서버 업타임(초)
    pub uptime_secs: i64,
    /// 저장소 ("postgres" | "memory")
    pub storage: String,
    /// 데이터베이스 연결 상태 ("up" | "down" | "not_configured")
    pub database: String,
}

/// 간단한 헬스 체크 (liveness probe용).
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "서버 응답 가능", body = String))
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "정상", body = HealthResponse),
        (status = 503, description = "DB 연결 실패", body = HealthResponse)
    )
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (storage, database, status_code) = if state.db_pool.is_none() {
        ("memory", "not_configured", StatusCode::OK)
    } else if state.is_db_healthy().await {
        ("postgres", "up", StatusCode::OK)
    } else {
        ("postgres", "down", StatusCode::SERVICE_UNAVAILABLE)
    };
    let status = if status_code == StatusCode::OK { "healthy" } else { "degraded" };

    let response = HealthResponse {
        status: status.to_string(),
        version: state.version.clone(),
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
        storage: storage.to_string(),
        database: database.to_string(),
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
