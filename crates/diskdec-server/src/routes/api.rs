//! Unlock and password-change routes: `/api/*`
//!
//! Policy rejections and tool failures are ordinary outcomes here: they are
//! returned as `200` with `ok: false` and a readable `error`. Only bodies
//! that cannot be parsed produce a `400`.
//!
//! The tool's error text is passed to the client unchanged. It can reveal
//! local paths; operators rely on it to diagnose failed unlocks.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use diskdec_core::error::GateError;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/api` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/decrypt", post(decrypt))
        .route("/changePass", post(change_pass))
}

// ── Request / Response types ─────────────────────────────────────────

/// Request body for `POST /api/decrypt`.
///
/// A missing `pwd` is treated as empty and rejected by policy.
#[derive(Deserialize)]
pub struct DecryptRequest {
    #[serde(default)]
    pub pwd: String,
}

/// Response body for `POST /api/decrypt`.
#[derive(Debug, Serialize)]
pub struct DecryptResponse {
    /// `true` when the reserved default password was presented.
    #[serde(rename = "isFirst")]
    pub is_first: bool,
    pub ok: bool,
    /// Empty on success.
    pub error: String,
}

/// Request body for `POST /api/changePass`.
#[derive(Deserialize)]
pub struct ChangePassRequest {
    #[serde(default)]
    pub old: String,
    #[serde(default)]
    pub new: String,
}

/// Response body for `POST /api/changePass`.
#[derive(Debug, Serialize)]
pub struct ChangePassResponse {
    pub ok: bool,
    pub error: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// Unlock the volume.
async fn decrypt(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DecryptRequest>, JsonRejection>,
) -> Result<Json<DecryptResponse>, AppError> {
    let Json(body) = body?;

    let response = match state.gate.request_unlock(&body.pwd).await {
        Ok(()) => DecryptResponse {
            is_first: false,
            ok: true,
            error: String::new(),
        },
        Err(e) => DecryptResponse {
            is_first: matches!(e, GateError::MustChange),
            ok: false,
            error: e.to_string(),
        },
    };

    Ok(Json(response))
}

/// Rotate the volume password.
async fn change_pass(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChangePassRequest>, JsonRejection>,
) -> Result<Json<ChangePassResponse>, AppError> {
    let Json(body) = body?;

    let response = match state.gate.request_change(&body.old, &body.new).await {
        Ok(()) => ChangePassResponse {
            ok: true,
            error: String::new(),
        },
        Err(e) => ChangePassResponse {
            ok: false,
            error: e.to_string(),
        },
    };

    Ok(Json(response))
}
