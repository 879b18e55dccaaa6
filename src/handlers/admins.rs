//! Admin account routes

use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;
use crate::handlers::extract::{Json, Path, Query};
use crate::models::admin::{Admin, AdminListQuery, CreateAdminRequest, UpdateAdminRequest, UpdateAdminStatusRequest};
use crate::models::common::Page;
use crate::services::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Page<Admin>>> {
    Ok(Json(state.services.admin_service.list(&ctx, query).await?))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Admin>> {
    Ok(Json(state.services.admin_service.get(&ctx, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<Admin>)> {
    let admin = state.services.admin_service.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAdminRequest>,
) -> Result<Json<Admin>> {
    Ok(Json(state.services.admin_service.update(&ctx, id, request).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAdminStatusRequest>,
) -> Result<Json<Admin>> {
    Ok(Json(state.services.admin_service.set_status(&ctx, id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.admin_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
