//! Dashboard and health routes

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::warn;
use crate::handlers::extract::Json;
use crate::services::auth::AuthContext;
use crate::services::dashboard::DashboardStats;
use crate::state::AppState;
use crate::utils::errors::Result;

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<AppState>, ctx: AuthContext) -> Result<Json<DashboardStats>> {
    Ok(Json(state.services.dashboard_service.stats(&ctx).await?))
}

/// GET /health
///
/// 200 while the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let services = state.services.health_check().await;
    let (code, status) = if services.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(json!({
            "status": status,
            "version": crate::VERSION,
            "services": services,
        })),
    )
}
