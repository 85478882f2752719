//! Credential gate.
//!
//! Enforces the password policy in front of the volume controller:
//!
//! 1. A candidate equal to the reserved default password is refused. For an
//!    unlock this tells the operator the system is unprovisioned and the
//!    password must be changed first.
//! 2. A candidate shorter than the minimum length is refused.
//! 3. Otherwise the password is hashed and forwarded.
//!
//! The default check runs first, so the default password is always reported
//! as "must change" even if the policy minimum is longer than it. Nothing
//! else is validated: no character classes, no rate limiting, no lockout.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::controller::VolumeController;
use crate::credential::Credential;
use crate::error::GateError;

/// The reserved default password shipped with unprovisioned systems.
pub const DEFAULT_RESERVED_PASSWORD: &str = "Qwe123!@#!@#";

/// Default minimum password length, in characters.
pub const DEFAULT_MIN_LENGTH: usize = 12;

/// Password policy applied by the [`CredentialGate`].
#[derive(Clone)]
pub struct GatePolicy {
    /// The placeholder password that must be changed before first use.
    pub reserved_default: String,
    /// Minimum accepted password length in characters.
    pub min_length: usize,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            reserved_default: DEFAULT_RESERVED_PASSWORD.to_owned(),
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl fmt::Debug for GatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatePolicy")
            .field("reserved_default", &"[REDACTED]")
            .field("min_length", &self.min_length)
            .finish()
    }
}

impl GatePolicy {
    fn is_reserved(&self, candidate: &Credential) -> bool {
        candidate.matches(&self.reserved_default)
    }

    fn check_length(&self, candidate: &Credential) -> Result<(), GateError> {
        if candidate.char_len() < self.min_length {
            return Err(GateError::TooShort {
                min: self.min_length,
            });
        }
        Ok(())
    }
}

/// Validates credentials and forwards them, hashed, to a [`VolumeController`].
pub struct CredentialGate {
    policy: GatePolicy,
    controller: Arc<dyn VolumeController>,
}

impl fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGate")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl CredentialGate {
    /// Create a gate enforcing `policy` in front of `controller`.
    #[must_use]
    pub fn new(policy: GatePolicy, controller: Arc<dyn VolumeController>) -> Self {
        Self { policy, controller }
    }

    /// The policy this gate enforces.
    #[must_use]
    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Validate `candidate` and, if it passes, unlock the volume with it.
    ///
    /// # Errors
    ///
    /// - [`GateError::MustChange`] if `candidate` is the reserved default.
    /// - [`GateError::TooShort`] if `candidate` is below the minimum length.
    /// - [`GateError::Process`] if the controller fails.
    pub async fn request_unlock(&self, candidate: &str) -> Result<(), GateError> {
        let candidate = Credential::new(candidate);

        if self.policy.is_reserved(&candidate) {
            info!("unlock refused: reserved default password presented");
            return Err(GateError::MustChange);
        }
        self.policy.check_length(&candidate)?;

        let hashed = candidate.hash();
        drop(candidate);

        match self.controller.unlock(&hashed).await {
            Ok(()) => {
                info!("volume unlocked");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "volume unlock failed");
                Err(e.into())
            }
        }
    }

    /// Validate `new` and, if it passes, rotate the volume credential.
    ///
    /// `old` is not policy-checked; the tool decides whether it is correct.
    ///
    /// # Errors
    ///
    /// - [`GateError::DefaultNotAllowed`] if `new` is the reserved default.
    /// - [`GateError::TooShort`] if `new` is below the minimum length.
    /// - [`GateError::Process`] if the controller fails.
    pub async fn request_change(&self, old: &str, new: &str) -> Result<(), GateError> {
        let new = Credential::new(new);

        if self.policy.is_reserved(&new) {
            info!("password change refused: new password is the reserved default");
            return Err(GateError::DefaultNotAllowed);
        }
        self.policy.check_length(&new)?;

        let old_hashed = Credential::new(old).hash();
        let new_hashed = new.hash();
        drop(new);

        match self.controller.change_credential(&old_hashed, &new_hashed).await {
            Ok(()) => {
                info!("volume password changed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "volume password change failed");
                Err(e.into())
            }
        }
    }
}
