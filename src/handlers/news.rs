//! News routes. Drafts and archived posts are visible to admins only.

use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;
use crate::handlers::extract::{Json, Path, Query};
use crate::middleware::Viewer;
use crate::models::common::Page;
use crate::models::news::{CreateNewsRequest, News, NewsListQuery, UpdateNewsRequest, UpdateNewsStatusRequest};
use crate::services::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<NewsListQuery>,
) -> Result<Json<Page<News>>> {
    Ok(Json(state.services.news_service.list(viewer.context(), query).await?))
}

pub async fn get(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(key): Path<String>,
) -> Result<Json<News>> {
    Ok(Json(state.services.news_service.get(viewer.context(), &key).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateNewsRequest>,
) -> Result<(StatusCode, Json<News>)> {
    let news = state.services.news_service.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateNewsRequest>,
) -> Result<Json<News>> {
    Ok(Json(state.services.news_service.update(&ctx, id, request).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateNewsStatusRequest>,
) -> Result<Json<News>> {
    Ok(Json(state.services.news_service.set_status(&ctx, id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.news_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
