//! Matchmaking for QuizArena.
//!
//! A FIFO waiting pool of users seeking an opponent, plus the
//! short-lived state machine a matched pair runs through before it is
//! handed off to battle execution:
//!
//! ```text
//! found → starting (countdown running) → ready (handed off)
//! ```
//!
//! # Key types
//!
//! - [`MatchmakingQueue`] — owns the waiting pool and all pending
//!   matches; the coordinator holds exactly one instance
//! - [`QueueEntry`] — one waiting user's request for an opponent
//! - [`PendingMatch`] — a matched pair counting down to hand-off
//! - [`MatchmakingError`] — what can go wrong

mod error;
mod queue;

pub use error::MatchmakingError;
pub use queue::{
    DisconnectOutcome, EnqueueOutcome, MatchStatus, MatchedPair,
    MatchmakingQueue, PendingMatch, QueueEntry, RequeueOutcome,
};
