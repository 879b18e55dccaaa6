//! HTTP router
//!
//! Every API route is mounted here. Access rules are enforced by the
//! extractors each handler asks for and by the services behind them.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;
use crate::handlers::{admins, auth, contacts, dashboard, districts, media, news, panchayats};
use crate::middleware::logging::{log_response, request_span};
use crate::state::AppState;

/// Body limit for `/api/upload` when storage is not configured
const DEFAULT_UPLOAD_LIMIT: usize = 20 * 1024 * 1024;

/// Headroom for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let upload_limit = state
        .services
        .media_service
        .storage()
        .max_file_size()
        .map(|bytes| bytes as usize)
        .unwrap_or(DEFAULT_UPLOAD_LIMIT)
        + MULTIPART_OVERHEAD;

    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/admins", admin_routes())
        .nest("/districts", district_routes())
        .nest("/panchayats", panchayat_routes())
        .nest("/media", media_routes())
        .nest("/news", news_routes())
        .nest("/contacts", contact_routes())
        .route("/dashboard/stats", get(dashboard::stats))
        .route(
            "/upload",
            post(media::upload).layer(DefaultBodyLimit::max(upload_limit)),
        );

    Router::new()
        .route("/health", get(dashboard::health))
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(log_response),
        )
        .layer(cors_layer(&state.settings.server.cors_origins))
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/password", put(auth::change_password))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admins::list).post(admins::create))
        .route("/:id", get(admins::get).put(admins::update).delete(admins::delete))
        .route("/:id/status", put(admins::set_status))
}

fn district_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(districts::list).post(districts::create))
        .route(
            "/:id",
            get(districts::get).put(districts::update).delete(districts::delete),
        )
}

fn panchayat_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(panchayats::list).post(panchayats::create))
        .route(
            "/:id",
            get(panchayats::get).put(panchayats::update).delete(panchayats::delete),
        )
        .route("/:id/status", put(panchayats::set_status))
        .route("/:id/rtc-report", put(panchayats::submit_report))
}

fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(media::list).post(media::create))
        .route("/:id", get(media::get).put(media::update).delete(media::delete))
        .route("/:id/status", put(media::set_status))
}

fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(news::list).post(news::create))
        .route("/:id", get(news::get).put(news::update).delete(news::delete))
        .route("/:id/status", put(news::set_status))
}

fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(contacts::list).post(contacts::submit))
        .route("/:id", get(contacts::get).delete(contacts::delete))
        .route("/:id/status", put(contacts::set_status))
}

/// Credentialed CORS for the configured admin and public front ends
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
