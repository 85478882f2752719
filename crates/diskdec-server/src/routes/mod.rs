//! HTTP route handlers for `diskdec`.
//!
//! Routes are organized by concern:
//! - `api`: unlock and password change (`/api/*`)
//! - `ui`: the operator web UI, served from the asset provider

pub mod api;
pub mod ui;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router with all routes and middleware.
///
/// `api_concurrency` bounds how many `/api` requests, and therefore tool
/// invocations, run at once. It does not serialize them.
pub fn router(state: Arc<AppState>, api_concurrency: usize) -> Router {
    let api_routes = Router::new()
        .nest("/api", api::router())
        .layer(tower::limit::ConcurrencyLimitLayer::new(api_concurrency));

    Router::new()
        .merge(api_routes)
        .merge(ui::router())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}
