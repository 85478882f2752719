//! Operator web UI.
//!
//! Every path not claimed by the API is looked up under `www/` in the asset
//! provider. `/` and any path ending in `/` serve that directory's
//! `index.html`.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use diskdec_assets::AssetError;

use crate::error::AppError;
use crate::state::AppState;

/// Prefix of web UI assets in the provider.
const WWW_PREFIX: &str = "www/";

/// Build the UI router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().fallback(get(serve_asset))
}

async fn serve_asset(State(state): State<Arc<AppState>>, uri: Uri) -> Result<Response, AppError> {
    let name = asset_name(uri.path());

    match state.assets.read(&name).await {
        Ok(Some(bytes)) => Ok(([(header::CONTENT_TYPE, content_type(&name))], bytes).into_response()),
        Ok(None) | Err(AssetError::InvalidName { .. }) => {
            Err(AppError::NotFound(format!("no such page: {}", uri.path())))
        }
        Err(e) => {
            tracing::warn!(asset = %name, error = %e, "failed to read web asset");
            Err(e.into())
        }
    }
}

/// Map a request path to an asset name.
fn asset_name(path: &str) -> String {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') {
        format!("{WWW_PREFIX}{relative}index.html")
    } else {
        format!("{WWW_PREFIX}{relative}")
    }
}

/// Content type from the file extension.
fn content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        "woff" => "font/woff",
        "ttf" => "font/ttf",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
