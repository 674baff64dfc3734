//! Error types for the matchmaking layer.

use quizarena_protocol::UserId;

/// Errors that can occur during matchmaking operations.
#[derive(Debug, thiserror::Error)]
pub enum MatchmakingError {
    /// The user already has a waiting entry or sits in a pending match.
    #[error("user {0} is already in matchmaking")]
    AlreadyQueued(UserId),

    /// The bounded auto-re-enqueue after an opponent disconnect has
    /// been used up; the user must re-enter matchmaking themselves.
    #[error("match failed twice for user {0}, giving up")]
    RetriesExhausted(UserId),
}

impl MatchmakingError {
    /// Stable machine-readable code carried in outbound error events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyQueued(_) => "already_queued",
            Self::RetriesExhausted(_) => "match_failed",
        }
    }
}
