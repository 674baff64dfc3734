//! Error types for the session layer.

use quizarena_protocol::UserId;

/// Errors that can occur during registration and identity lookups.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection issued a command before `register_user`.
    #[error("connection is not registered")]
    NotRegistered,

    /// The profile service could not resolve the user.
    #[error("profile unavailable for {0}: {1}")]
    ProfileUnavailable(UserId, String),
}

impl SessionError {
    /// Stable machine-readable code carried in outbound error events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotRegistered => "not_registered",
            Self::ProfileUnavailable(..) => "profile_unavailable",
        }
    }
}
