//! In-memory asset provider for testing.
//!
//! Stores assets in a `BTreeMap` behind a `RwLock`. Use this for unit and
//! integration tests that need a provider without touching disk.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{AssetError, AssetProvider, validate_name};

/// An in-memory asset provider backed by a `BTreeMap`.
///
/// # Examples
///
/// ```
/// # use diskdec_assets::{AssetProvider, MemoryAssets};
/// # #[tokio::main]
/// # async fn main() {
/// let assets = MemoryAssets::new();
/// assets.insert("www/index.html", b"<html></html>").await;
/// let page = assets.read("www/index.html").await.unwrap();
/// assert_eq!(page, Some(b"<html></html>".to_vec()));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryAssets {
    /// Create a new empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset.
    pub async fn insert(&self, name: &str, bytes: &[u8]) {
        let mut data = self.data.write().await;
        data.insert(name.to_owned(), bytes.to_vec());
    }
}

#[async_trait::async_trait]
impl AssetProvider for MemoryAssets {
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AssetError> {
        validate_name(name)?;
        let data = self.data.read().await;
        Ok(data.get(name).cloned())
    }
}
