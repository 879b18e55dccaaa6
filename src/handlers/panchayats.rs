//! Gram panchayat routes
//!
//! Reads go through [`Viewer`] so the public only ever sees verified
//! entries while signed-in staff see what their scope allows.

use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;
use crate::handlers::extract::{Json, Path, Query};
use crate::middleware::Viewer;
use crate::models::common::Page;
use crate::models::panchayat::{
    CreatePanchayatRequest, GramPanchayat, PanchayatListQuery, RtcReportRequest, UpdatePanchayatRequest,
    UpdatePanchayatStatusRequest,
};
use crate::services::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<PanchayatListQuery>,
) -> Result<Json<Page<GramPanchayat>>> {
    let page = state.services.panchayat_service.list(viewer.context(), query).await?;
    Ok(Json(page))
}

/// GET /api/panchayats/:id_or_slug
pub async fn get(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(key): Path<String>,
) -> Result<Json<GramPanchayat>> {
    Ok(Json(state.services.panchayat_service.get(viewer.context(), &key).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreatePanchayatRequest>,
) -> Result<(StatusCode, Json<GramPanchayat>)> {
    let panchayat = state.services.panchayat_service.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(panchayat)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePanchayatRequest>,
) -> Result<Json<GramPanchayat>> {
    Ok(Json(state.services.panchayat_service.update(&ctx, id, request).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePanchayatStatusRequest>,
) -> Result<Json<GramPanchayat>> {
    Ok(Json(state.services.panchayat_service.set_status(&ctx, id, request).await?))
}

/// POST /api/panchayats/:id/rtc-report
pub async fn submit_report(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<RtcReportRequest>,
) -> Result<Json<GramPanchayat>> {
    Ok(Json(state.services.panchayat_service.submit_report(&ctx, id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.panchayat_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
