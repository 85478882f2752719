//! The volume controller seam.
//!
//! [`VolumeController`] is the narrow interface between password policy and
//! the external encryption tool. The gate only ever talks to this trait, so
//! policy can be tested without spawning processes.

use crate::credential::HashedCredential;
use crate::error::ProcessError;

/// Drives the encrypted volume.
///
/// Implementations receive hashed credentials only. They must be safe to
/// share across async tasks; this layer does not serialize calls, so an
/// implementation that needs mutual exclusion must provide it itself.
#[async_trait::async_trait]
pub trait VolumeController: Send + Sync + 'static {
    /// Unlock and mount the volume with the given credential.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessError`] if the tool cannot be started or reports
    /// failure.
    async fn unlock(&self, credential: &HashedCredential) -> Result<(), ProcessError>;

    /// Rotate the volume's credential from `old` to `new`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessError`] if the tool cannot be started or reports
    /// failure.
    async fn change_credential(
        &self,
        old: &HashedCredential,
        new: &HashedCredential,
    ) -> Result<(), ProcessError>;
}
