//! Unified error type for the QuizArena coordinator.

use quizarena_matchmaking::MatchmakingError;
use quizarena_protocol::ProtocolError;
use quizarena_room::RoomError;
use quizarena_session::SessionError;
use quizarena_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Code using the `quizarena` meta-crate deals with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizArenaError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (registration, profile resolution).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A matchmaking-level error (duplicate queue entry, retries spent).
    #[error(transparent)]
    Matchmaking(#[from] MatchmakingError),

    /// A room-level error (full, not found, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizarena_protocol::{RoomCode, UserId};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Shutdown;
        let wrapped: QuizArenaError = err.into();
        assert!(matches!(wrapped, QuizArenaError::Transport(_)));
        assert!(wrapped.to_string().contains("shut down"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let wrapped: QuizArenaError = err.into();
        assert!(matches!(wrapped, QuizArenaError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::NotRegistered;
        let wrapped: QuizArenaError = err.into();
        assert!(matches!(wrapped, QuizArenaError::Session(_)));
    }

    #[test]
    fn test_from_matchmaking_error() {
        let err = MatchmakingError::AlreadyQueued(UserId(1));
        let wrapped: QuizArenaError = err.into();
        assert!(matches!(wrapped, QuizArenaError::Matchmaking(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomCode::new("ABC234"));
        let wrapped: QuizArenaError = err.into();
        assert!(matches!(wrapped, QuizArenaError::Room(_)));
    }
}
