//! Request extractors whose rejections render as `{"error": …}`
//!
//! Drop-in replacements for axum's `Json`, `Path` and `Query`. Malformed
//! bodies, ids and query strings come back as 400 with the usual error body.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use crate::utils::errors::TourifyError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(TourifyError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(TourifyError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(TourifyError))]
pub struct Query<T>(pub T);

impl From<JsonRejection> for TourifyError {
    fn from(rejection: JsonRejection) -> Self {
        TourifyError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for TourifyError {
    fn from(rejection: PathRejection) -> Self {
        TourifyError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for TourifyError {
    fn from(rejection: QueryRejection) -> Self {
        TourifyError::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for TourifyError {
    fn from(rejection: MultipartRejection) -> Self {
        TourifyError::InvalidInput(format!("Invalid upload: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Payload {
        name: String,
    }

    async fn echo(Path(id): Path<Uuid>, Json(body): Json<Payload>) -> Json<String> {
        Json(format!("{}:{}", id, body.name))
    }

    async fn call(uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let router = Router::new().route("/items/:id", post(echo));
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_rejections_render_error_body() {
        let (status, body) = call("/items/not-a-uuid", r#"{"name":"Mandu"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let id = Uuid::new_v4();
        let (status, body) = call(&format!("/items/{}", id), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = call(&format!("/items/{}", id), r#"{"name":"Mandu"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(format!("{}:Mandu", id)));
    }
}
