// src/handlers/health.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: &'static str,
    pub database: bool,
}

// GET /api/health
// 503 quando o banco não responde.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Serviço e banco a responder", body = HealthStatus),
        (status = 503, description = "Banco indisponível", body = HealthStatus)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    let database = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&app_state.db_pool)
        .await
        .is_ok();

    if database {
        (StatusCode::OK, Json(HealthStatus { status: "ok", database }))
    } else {
        tracing::warn!("⚠️ Health check: banco indisponível");
        (StatusCode::SERVICE_UNAVAILABLE, Json(HealthStatus { status: "degraded", database }))
    }
}
