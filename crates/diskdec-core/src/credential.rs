//! Credential newtypes.
//!
//! A [`Credential`] is the raw password an operator typed; it lives for one
//! request. A [`HashedCredential`] is its SHA-256 digest as lowercase hex and
//! is the only form ever handed to the encryption tool. Both are zeroized on
//! drop and redacted in `Debug` output.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A raw, unhashed password.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw password.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Length in characters (Unicode scalar values), not bytes.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Constant-time comparison against another raw password.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.as_bytes().ct_eq(other.as_bytes()).into()
    }

    /// Hash this credential for handoff to the encryption tool.
    #[must_use]
    pub fn hash(&self) -> HashedCredential {
        HashedCredential(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

/// Lowercase hex SHA-256 digest of a [`Credential`] (64 characters).
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct HashedCredential(String);

impl HashedCredential {
    /// Borrow the hex digest.
    ///
    /// Use with care: the caller must not log or persist it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashedCredential").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_lowercase_hex_sha256() {
        let hashed = Credential::new("abc").hash();
        assert_eq!(
            hashed.expose(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_is_deterministic() {
        let a = Credential::new("correct horse battery").hash();
        let b = Credential::new("correct horse battery").hash();
        assert_eq!(a, b);
        assert_eq!(a.expose().len(), 64);
        assert_ne!(a, Credential::new("correct horse battery!").hash());
    }

    #[test]
    fn char_len_counts_characters() {
        assert_eq!(Credential::new("pässwörd").char_len(), 8);
        assert_eq!(Credential::new("").char_len(), 0);
    }

    #[test]
    fn matches_is_exact() {
        let c = Credential::new("Qwe123!@#!@#");
        assert!(c.matches("Qwe123!@#!@#"));
        assert!(!c.matches("Qwe123!@#!@"));
        assert!(!c.matches("qwe123!@#!@#"));
    }

    #[test]
    fn debug_is_redacted() {
        let c = Credential::new("super-secret-pass");
        let rendered = format!("{c:?} {:?}", c.hash());
        assert!(!rendered.contains("super-secret-pass"));
        assert!(!rendered.contains(c.hash().expose()));
        assert!(rendered.contains("[REDACTED]"));
    }
}
