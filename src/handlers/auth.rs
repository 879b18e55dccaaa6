//! Session routes: login, logout, profile and password change

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use crate::handlers::extract::Json;
use crate::models::admin::{Admin, ChangePasswordRequest, LoginRequest};
use crate::services::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::Result;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = &state.services.auth_service;
    let response = auth.login(request).await?;
    let cookie = auth.session_cookie(&response.token);

    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = state.services.auth_service.clear_cookie();
    ([(header::SET_COOKIE, cookie)], StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, ctx: AuthContext) -> Result<Json<Admin>> {
    let admin = state.services.auth_service.current_admin(&ctx).await?;
    Ok(Json(admin))
}

/// PUT /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    state.services.auth_service.change_password(&ctx, request).await?;
    Ok(StatusCode::NO_CONTENT)
}
