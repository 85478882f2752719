//! TLS material loading.
//!
//! The certificate chain and private key are PEM files read from the asset
//! provider. Missing or unparsable material stops startup.

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;

use diskdec_assets::AssetProvider;

/// Asset name of the PEM certificate chain.
pub const CERT_ASSET: &str = "certs/cert.pem";

/// Asset name of the PEM private key.
pub const KEY_ASSET: &str = "certs/key.pem";

/// Build the rustls server configuration from the provider's certificate
/// and key.
///
/// # Errors
///
/// Returns `Err` if either asset is missing or the PEM data is invalid.
pub async fn load_rustls_config(assets: &dyn AssetProvider) -> anyhow::Result<RustlsConfig> {
    let cert = assets
        .require(CERT_ASSET)
        .await
        .context("failed to load TLS certificate")?;
    let key = assets
        .require(KEY_ASSET)
        .await
        .context("failed to load TLS private key")?;

    RustlsConfig::from_pem(cert, key)
        .await
        .context("invalid TLS certificate or key")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use diskdec_assets::MemoryAssets;

    use super::*;

    #[tokio::test]
    async fn missing_key_is_reported() {
        let assets = MemoryAssets::new();
        assets.insert(CERT_ASSET, b"-----BEGIN CERTIFICATE-----").await;

        let err = load_rustls_config(&assets).await.unwrap_err();
        assert!(format!("{err:#}").contains("certs/key.pem"));
    }

    #[tokio::test]
    async fn garbage_pem_is_rejected() {
        let assets = MemoryAssets::new();
        assets.insert(CERT_ASSET, b"not a certificate").await;
        assets.insert(KEY_ASSET, b"not a key").await;

        assert!(load_rustls_config(&assets).await.is_err());
    }
}
