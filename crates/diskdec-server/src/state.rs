//! Shared application state for the `diskdec` server.
//!
//! A single [`AppState`] is built at startup and shared across all Axum
//! handlers via `Arc`. It owns no volume state: lock/unlock status lives in
//! the encryption tool and the OS mount table.

use std::sync::Arc;

use diskdec_assets::AssetProvider;
use diskdec_core::gate::CredentialGate;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Password policy in front of the volume controller.
    pub gate: Arc<CredentialGate>,
    /// Source of the web UI bundle.
    pub assets: Arc<dyn AssetProvider>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
