//! Asset provider abstraction for `diskdec`.
//!
//! This crate defines the [`AssetProvider`] trait, a read-only lookup of
//! opaque byte blobs by logical name. The server uses it for the web UI
//! bundle (`www/*`), the TLS material (`certs/*`), and the provisioning
//! bundle (`bundle/*`), without caring how those files are packaged.
//!
//! Two implementations are provided:
//!
//! - [`DirectoryAssets`]: reads assets from a directory on disk
//! - [`MemoryAssets`]: in-memory, for testing

mod directory;
mod error;
mod memory;

pub use directory::DirectoryAssets;
pub use error::AssetError;
pub use memory::MemoryAssets;

/// A read-only source of named assets.
///
/// Names are relative, `/`-separated paths such as `www/index.html` or
/// `certs/key.pem`. Values are opaque byte arrays.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait AssetProvider: Send + Sync + 'static {
    /// Read an asset by name.
    ///
    /// Returns `Ok(None)` if no asset with that name exists.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::InvalidName`] if the name could escape the
    /// asset root, or [`AssetError::Read`] if the underlying source fails.
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AssetError>;

    /// Read an asset that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Missing`] if the asset is absent, plus any error
    /// [`read`](AssetProvider::read) can return.
    async fn require(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        self.read(name).await?.ok_or_else(|| AssetError::Missing {
            name: name.to_owned(),
        })
    }
}

/// Check that an asset name is a plain relative path.
///
/// Rejects empty names, absolute paths, backslashes, and any `.` or `..`
/// component.
///
/// # Errors
///
/// Returns [`AssetError::InvalidName`] describing the first problem found.
pub fn validate_name(name: &str) -> Result<(), AssetError> {
    let invalid = |reason: &str| AssetError::InvalidName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('/') {
        return Err(invalid("name must be relative"));
    }
    if name.contains('\\') || name.contains('\0') {
        return Err(invalid("name contains a forbidden character"));
    }
    if name
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(invalid("name contains an empty, '.' or '..' component"));
    }
    Ok(())
}
