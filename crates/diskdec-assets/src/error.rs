//! Asset error types.

/// Errors that can occur while reading assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The asset name could escape the asset root or is malformed.
    #[error("invalid asset name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A required asset does not exist.
    #[error("asset '{name}' not found")]
    Missing { name: String },

    /// The underlying source failed to read the asset.
    #[error("failed to read asset '{name}': {reason}")]
    Read { name: String, reason: String },
}
