//! District routes. Reads are public.

use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;
use crate::handlers::extract::{Json, Path, Query};
use crate::models::common::Page;
use crate::models::district::{CreateDistrictRequest, District, DistrictListQuery, UpdateDistrictRequest};
use crate::services::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<DistrictListQuery>,
) -> Result<Json<Page<District>>> {
    Ok(Json(state.services.district_service.list(query).await?))
}

/// GET /api/districts/:id_or_slug
pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<District>> {
    Ok(Json(state.services.district_service.get(&key).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateDistrictRequest>,
) -> Result<(StatusCode, Json<District>)> {
    let district = state.services.district_service.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(district)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDistrictRequest>,
) -> Result<Json<District>> {
    Ok(Json(state.services.district_service.update(&ctx, id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.district_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
