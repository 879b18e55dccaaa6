//! Authentication extractors
//!
//! The session token is read from the `Authorization: Bearer` header or the
//! session cookie, then resolved against the database on every request.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use tracing::debug;
use crate::services::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::TourifyError;

/// Caller that may be anonymous. Public routes use it to widen what
/// signed-in admins and coordinators can see.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<AuthContext>);

impl Viewer {
    pub fn context(&self) -> Option<&AuthContext> {
        self.0.as_ref()
    }
}

/// Extract the session token from request headers
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = TourifyError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, state.cookie_name())
            .ok_or_else(|| TourifyError::Authentication("Authentication required".to_string()))?;

        state.services.auth_service.authenticate(&token).await
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = TourifyError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers, state.cookie_name()) else {
            return Ok(Viewer(None));
        };

        match state.services.auth_service.authenticate(&token).await {
            Ok(ctx) => Ok(Viewer(Some(ctx))),
            Err(TourifyError::Authentication(reason)) => {
                debug!(reason = %reason, "Ignoring stale session on public route");
                Ok(Viewer(None))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token=from-cookie"));

        assert_eq!(session_token(&headers, "token").as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=xyz; lang=hi"));

        assert_eq!(session_token(&headers, "token").as_deref(), Some("xyz"));
        assert_eq!(session_token(&headers, "session"), None);
    }

    #[test]
    fn test_empty_values_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));

        assert_eq!(session_token(&headers, "token"), None);
    }
}
