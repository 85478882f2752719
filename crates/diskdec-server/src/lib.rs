//! `diskdec` HTTPS server.
//!
//! Wires the credential gate, the VeraCrypt controller, and the asset
//! provider into an Axum application served over TLS. Serves the JSON API
//! at `/api/*` and the operator web UI at `/`. Also carries the one-time
//! device provisioning used by `diskdec install`.

pub mod config;
pub mod error;
pub mod hardening;
pub mod install;
pub mod routes;
pub mod state;
pub mod tls;
