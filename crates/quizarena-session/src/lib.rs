//! User identity for the QuizArena coordinator.
//!
//! This crate answers two questions for every command that arrives:
//!
//! 1. **Who is this connection?** — [`ConnectionRegistry`] maps user
//!    identities to live connections (and back), superseding old
//!    mappings on reconnect.
//! 2. **What do we show for them?** — [`ProfileProvider`] resolves a
//!    `UserId` to a display profile once, at registration time; the
//!    registry caches the result.
//!
//! # How it fits in the stack
//!
//! ```text
//! Coordinator (above)  ← asks "which connection is user U on?"
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Transport (below)  ← provides ConnectionId
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod manager;
mod profile;

pub use error::SessionError;
pub use manager::{ConnectionRegistry, Registration};
pub use profile::ProfileProvider;
