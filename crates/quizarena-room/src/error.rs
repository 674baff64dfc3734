//! Error types for the room layer.

use quizarena_protocol::{RoomCode, UserId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room carries this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Every player slot is taken.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The room has moved past the lobby phase.
    #[error("room {0} is no longer joinable")]
    NotJoinable(RoomCode),

    /// The user is already a member of another room.
    #[error("user {0} is already in room {1}")]
    AlreadyInRoom(UserId, RoomCode),

    /// Only the host may perform this operation.
    #[error("user {0} is not the host of room {1}")]
    NotHost(UserId, RoomCode),

    /// A game needs at least two players.
    #[error("room {0} needs at least 2 players to start")]
    InsufficientPlayers(RoomCode),

    /// The room's status does not allow this operation.
    #[error("invalid room status for this operation: {0}")]
    InvalidState(String),

    /// The room configuration is out of range.
    #[error("invalid room config: {0}")]
    InvalidConfig(String),
}

impl RoomError {
    /// Stable machine-readable code carried in outbound error events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "room_not_found",
            Self::RoomFull(_) => "room_full",
            Self::NotJoinable(_) => "room_not_joinable",
            Self::AlreadyInRoom(..) => "already_in_room",
            Self::NotHost(..) => "not_host",
            Self::InsufficientPlayers(_) => "insufficient_players",
            Self::InvalidState(_) => "invalid_state",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}
