//! HTTP boundary
//!
//! Builds the axum router that serves the catalog as JSON. All routes share
//! one [`DatasetStore`], so concurrent cold-start requests wait on a single
//! build.

mod error;
mod handlers;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use crate::store::DatasetStore;

/// Routes listed in the body of a 404
pub const ROUTES: &[&str] = &[
    "GET /api/health",
    "GET /api/types",
    "GET /api/regions",
    "GET /api/pokemon",
    "GET /api/pokemon/:idOrName",
    "POST /api/refresh",
];

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: DatasetStore,
}

impl AppState {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }
}

/// Router with every API route, CORS and request tracing
///
/// A known path hit with the wrong method gets the same 404 as an unknown
/// path.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(handlers::health).fallback(handlers::not_found))
        .route("/api/types", get(handlers::types).fallback(handlers::not_found))
        .route("/api/regions", get(handlers::regions).fallback(handlers::not_found))
        .route("/api/pokemon", get(handlers::list_pokemon).fallback(handlers::not_found))
        .route(
            "/api/pokemon/:identifier",
            get(handlers::get_pokemon).fallback(handlers::not_found),
        )
        .route("/api/refresh", post(handlers::refresh).fallback(handlers::not_found))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(options_no_content))
        .layer(TraceLayer::new_for_http())
}

/// The full service: [`router`] behind trailing-slash normalization
///
/// Path normalization has to run before routing, so it wraps the router
/// rather than being one of its layers.
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(router(state))
}

/// Answers every OPTIONS request with an empty 204
///
/// Runs outside the CORS layer, so preflight and plain OPTIONS requests both
/// keep the CORS headers it adds.
async fn options_no_content(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let (mut parts, _) = next.run(request).await.into_parts();
    parts.status = StatusCode::NO_CONTENT;
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::empty())
}
