//! Private rooms for QuizArena.
//!
//! A room is a host-created lobby identified by a short shareable code.
//! Guests join by code, the host starts the game, a countdown runs, and
//! the room hands off to battle execution:
//!
//! ```text
//! waiting → starting (countdown) → playing → finished
//! ```
//!
//! An aborted start countdown (departure drops the room below two
//! players) is the one sanctioned regression, `starting → waiting`.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — owns every live room and the code namespace;
//!   the coordinator holds exactly one instance
//! - [`Room`] — one lobby aggregate (players, settings, status,
//!   countdown handle)
//! - [`RoomError`] — what can go wrong

mod error;
mod registry;
mod room;

pub use error::RoomError;
pub use registry::{
    GameStart, JoinOutcome, LeaveOutcome, RoomRegistry, StartOutcome,
};
pub use room::Room;
