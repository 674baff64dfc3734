//! Wire protocol for the QuizArena coordinator.
//!
//! This crate defines the vocabulary that clients and the coordinator
//! speak:
//!
//! - **Types** ([`ClientCommand`], [`ServerEvent`], [`RoomSnapshot`],
//!   identifier newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures
//!   are converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw byte frames) and
//! the coordinator (business state). It knows nothing about connections,
//! queues, or rooms — only how commands and events are shaped.
//!
//! ```text
//! Transport (bytes) → Protocol (commands/events) → Coordinator (state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CategoryId, ClientCommand, MatchId, MatchMode, Player, PlayerProfile,
    QueuePhase, RoomCode, RoomSettings, RoomSnapshot, RoomStatus,
    ServerEvent, UserId,
};
