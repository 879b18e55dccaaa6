//! Media library routes and the file upload endpoint

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use tracing::debug;
use uuid::Uuid;
use crate::handlers::extract::{Json, Path, Query};
use crate::middleware::Viewer;
use crate::models::common::Page;
use crate::models::media::{
    CreateMediaRequest, Media, MediaListQuery, UpdateMediaRequest, UpdateMediaStatusRequest, UploadedFile,
};
use crate::services::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::{Result, TourifyError};

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

pub async fn list(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<MediaListQuery>,
) -> Result<Json<Page<Media>>> {
    Ok(Json(state.services.media_service.list(viewer.context(), query).await?))
}

pub async fn get(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> Result<Json<Media>> {
    Ok(Json(state.services.media_service.get(viewer.context(), id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateMediaRequest>,
) -> Result<(StatusCode, Json<Media>)> {
    let media = state.services.media_service.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMediaRequest>,
) -> Result<Json<Media>> {
    Ok(Json(state.services.media_service.update(&ctx, id, request).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMediaStatusRequest>,
) -> Result<Json<Media>> {
    Ok(Json(state.services.media_service.set_status(&ctx, id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.media_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/upload
///
/// Accepts a single `file` part and forwards it to object storage. The
/// returned URL is then attached to a media record with `POST /api/media`.
pub async fn upload(
    State(state): State<AppState>,
    ctx: AuthContext,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadedFile>)> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| TourifyError::InvalidInput("File content type is missing".to_string()))?;
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.is_empty() {
            return Err(TourifyError::InvalidInput("Uploaded file is empty".to_string()));
        }

        let uploaded = state
            .services
            .media_service
            .upload(&ctx, &file_name, &content_type, bytes.to_vec())
            .await?;
        return Ok((StatusCode::CREATED, Json(uploaded)));
    }

    Err(TourifyError::InvalidInput(format!("Multipart field '{}' is required", FILE_FIELD)))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> TourifyError {
    TourifyError::InvalidInput(format!("Invalid upload: {}", err.body_text()))
}
