//! TLS loading against a freshly generated self-signed certificate.

#![allow(clippy::unwrap_used)]

use diskdec_assets::{DirectoryAssets, MemoryAssets};
use diskdec_server::tls::{CERT_ASSET, KEY_ASSET, load_rustls_config};

fn self_signed() -> (String, String) {
    let certified =
        rcgen::generate_simple_self_signed(vec!["localhost".to_owned(), "127.0.0.1".to_owned()])
            .unwrap();
    (certified.cert.pem(), certified.key_pair.serialize_pem())
}

#[tokio::test]
async fn loads_generated_certificate_from_memory() {
    let (cert, key) = self_signed();
    let assets = MemoryAssets::new();
    assets.insert(CERT_ASSET, cert.as_bytes()).await;
    assets.insert(KEY_ASSET, key.as_bytes()).await;

    load_rustls_config(&assets).await.unwrap();
}

#[tokio::test]
async fn loads_generated_certificate_from_directory() {
    let (cert, key) = self_signed();
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("certs")).unwrap();
    std::fs::write(dir.path().join(CERT_ASSET), cert).unwrap();
    std::fs::write(dir.path().join(KEY_ASSET), key).unwrap();

    load_rustls_config(&DirectoryAssets::new(dir.path()))
        .await
        .unwrap();
}
