//! Contact form routes

use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;
use crate::handlers::extract::{Json, Path, Query};
use crate::models::common::Page;
use crate::models::contact::{Contact, ContactListQuery, CreateContactRequest, UpdateContactStatusRequest};
use crate::services::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::Result;

/// POST /api/contacts, open to everyone
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>)> {
    let contact = state.services.contact_service.submit(request).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn list(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<Page<Contact>>> {
    Ok(Json(state.services.contact_service.list(&ctx, query).await?))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Contact>> {
    Ok(Json(state.services.contact_service.get(&ctx, id).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateContactStatusRequest>,
) -> Result<Json<Contact>> {
    Ok(Json(state.services.contact_service.set_status(&ctx, id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.contact_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
