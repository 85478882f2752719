//! Error types for `diskdec-core`.
//!
//! Messages from [`GateError`] are shown to operators verbatim, so their
//! wording is part of the HTTP contract. Errors never include password
//! material, raw or hashed.

/// Errors from running the external encryption tool.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The tool could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the credential to the tool's stdin or waiting for it failed.
    #[error("failed to communicate with {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited with a non-zero status.
    #[error("exit status {code}")]
    Exit { code: i32 },

    /// The tool was terminated by a signal.
    #[error("signal: {signal}")]
    Signal { signal: i32 },

    /// A controller reported a failure without an exit status.
    #[error("{reason}")]
    Failed { reason: String },
}

/// Errors from the credential gate.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The candidate is the reserved default password; it must be changed
    /// before the volume can be unlocked.
    #[error("must change password")]
    MustChange,

    /// The reserved default password cannot be chosen as a new password.
    #[error("cannot use this password")]
    DefaultNotAllowed,

    /// The password is shorter than the policy minimum.
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },

    /// The external tool failed.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl GateError {
    /// Whether this is a policy rejection rather than a tool failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Process(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_operator_contract() {
        assert_eq!(GateError::MustChange.to_string(), "must change password");
        assert_eq!(GateError::DefaultNotAllowed.to_string(), "cannot use this password");
        assert_eq!(
            GateError::TooShort { min: 12 }.to_string(),
            "password must be at least 12 characters"
        );
    }

    #[test]
    fn process_errors_pass_through_verbatim() {
        let err = GateError::from(ProcessError::Exit { code: 1 });
        assert_eq!(err.to_string(), "exit status 1");
        assert!(!err.is_validation());
        assert!(GateError::MustChange.is_validation());
    }
}
