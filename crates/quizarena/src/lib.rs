//! # QuizArena
//!
//! Realtime room and matchmaking coordinator for 1v1 and small-group
//! quiz battles.
//!
//! Clients hold a WebSocket connection and speak JSON commands
//! (`register_user`, `join_matchmaking`, `create_private_room`, ...);
//! the coordinator pairs opponents, runs private lobbies, drives their
//! start countdowns, and pushes every state change back as events.
//! Battle execution itself is a downstream collaborator: once a match
//! or room countdown elapses the participants are handed off under a
//! fresh `match_id` and this subsystem is done with them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizarena::prelude::*;
//!
//! struct DevProfiles;
//!
//! impl ProfileProvider for DevProfiles {
//!     async fn resolve(
//!         &self,
//!         user_id: UserId,
//!     ) -> Result<PlayerProfile, SessionError> {
//!         Ok(PlayerProfile {
//!             user_id,
//!             name: format!("player-{}", user_id.0),
//!             level: 1,
//!         })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizArenaError> {
//!     let server = QuizArenaServer::<DevProfiles>::builder()
//!         .bind("127.0.0.1:8080")
//!         .build(DevProfiles)
//!         .await?;
//!     server.run().await
//! }
//! ```

mod config;
mod coordinator;
mod error;
mod handler;
mod server;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, Outbound};
pub use error::QuizArenaError;
pub use server::{QuizArenaServer, QuizArenaServerBuilder};

/// Everything a server embedding the coordinator needs in one import.
pub mod prelude {
    pub use crate::{
        Coordinator, CoordinatorConfig, QuizArenaError, QuizArenaServer,
        QuizArenaServerBuilder,
    };
    pub use quizarena_matchmaking::{MatchmakingError, MatchmakingQueue};
    pub use quizarena_protocol::{
        CategoryId, ClientCommand, Codec, JsonCodec, MatchId, MatchMode,
        Player, PlayerProfile, QueuePhase, RoomCode, RoomSettings,
        RoomSnapshot, RoomStatus, ServerEvent, UserId,
    };
    pub use quizarena_room::{RoomError, RoomRegistry};
    pub use quizarena_session::{
        ConnectionRegistry, ProfileProvider, SessionError,
    };
    pub use quizarena_transport::ConnectionId;
}
