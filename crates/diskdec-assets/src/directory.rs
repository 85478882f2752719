//! Directory-backed asset provider.
//!
//! Maps a logical asset name onto a file below a root directory. Names are
//! validated before they are joined, so a request can never read outside
//! the root.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{AssetError, AssetProvider, validate_name};

/// Asset provider reading files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Create a provider rooted at `root`.
    ///
    /// The directory is not checked until the first read.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The directory assets are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl AssetProvider for DirectoryAssets {
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AssetError> {
        validate_name(name)?;
        let path = self.root.join(name);

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                debug!(asset = %name, "asset not found");
                Ok(None)
            }
            Err(e) => Err(AssetError::Read {
                name: name.to_owned(),
                reason: format!("{}: {e}", path.display()),
            }),
        }
    }
}
