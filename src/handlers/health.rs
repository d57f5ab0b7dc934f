//! Liveness, readiness and status probes.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "faculty-eval")]
    pub service: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(example = "2024-06-01T08:00:00Z")]
    pub timestamp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    #[schema(example = "ready")]
    pub status: String,
    pub database: DatabaseStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseStatus {
    #[schema(example = "up")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 3)]
    pub latency_ms: Option<u64>,
    /// Connections currently held by the pool.
    pub pool_connections: u32,
    pub pool_idle: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatabaseStatus {
    fn probe(state: &AppState) -> Self {
        let start = Instant::now();
        let result = state
            .db_pool
            .get()
            .map_err(|e| format!("Failed to get connection: {}", e))
            .and_then(|mut conn| {
                diesel::sql_query("SELECT 1")
                    .execute(&mut conn)
                    .map_err(|e| format!("Query failed: {}", e))
            });
        let pool = state.db_pool.state();

        match result {
            Ok(_) => Self {
                status: "up".to_string(),
                latency_ms: Some(start.elapsed().as_millis() as u64),
                pool_connections: pool.connections,
                pool_idle: pool.idle_connections,
                error: None,
            },
            Err(error) => Self {
                status: "down".to_string(),
                latency_ms: None,
                pool_connections: pool.connections,
                pool_idle: pool.idle_connections,
                error: Some(error),
            },
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Plain-text liveness answer", content_type = "text/plain")
    )
)]
pub async fn health_check_simple() -> &'static str {
    "OK"
}

#[utoipa::path(
    get,
    path = "/health/status",
    tag = "Health",
    responses(
        (status = 200, description = "Service identity and version", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Database reachable", body = ReadinessResponse),
        (status = 503, description = "Database unreachable", body = ReadinessResponse)
    )
)]
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let database = tokio::task::spawn_blocking(move || DatabaseStatus::probe(&state))
        .await
        .unwrap_or_else(|e| DatabaseStatus {
            status: "down".to_string(),
            latency_ms: None,
            pool_connections: 0,
            pool_idle: 0,
            error: Some(format!("Probe failed: {}", e)),
        });

    if database.is_up() {
        Ok(Json(ReadinessResponse {
            status: "ready".to_string(),
            database,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".to_string(),
                database,
            }),
        ))
    }
}

#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive")
    )
)]
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}
