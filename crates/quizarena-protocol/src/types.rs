//! Core protocol types for QuizArena's wire format.
//!
//! Everything here gets serialized to JSON, sent over the socket, and
//! deserialized on the other side. Commands flow client → server, events
//! flow server → client, and both are internally tagged by a `type`
//! field so web clients can switch on a single discriminator.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a user.
///
/// Newtype over `u64` so a `UserId` can never be confused with a
/// `MatchId` or `CategoryId` even though all three are numbers
/// underneath. `#[serde(transparent)]` keeps the JSON a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A unique identifier for a match handed off to battle execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

/// Counter for allocating match IDs, unique within a process lifetime.
static NEXT_MATCH_ID: AtomicU64 = AtomicU64::new(1);

impl MatchId {
    /// Allocates the next process-unique match ID.
    pub fn allocate() -> Self {
        Self(NEXT_MATCH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// A quiz category (subject area) a user can filter matchmaking by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A short human-shareable code identifying a private room.
///
/// Generated by the room registry at creation time and immutable for
/// the life of the room. Codes are recycled once the room closes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps an already-generated code string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Value objects
// ---------------------------------------------------------------------------

/// A user's display profile, resolved once at registration time.
///
/// Stands in for the platform's user-profile service response; this
/// subsystem never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: UserId,
    pub name: String,
    pub level: u32,
}

/// A player as embedded in room snapshots.
///
/// Derived from the registry's cached profile at join time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: UserId,
    pub name: String,
    pub level: u32,
    pub is_host: bool,
}

impl Player {
    /// Builds a player entry from a cached profile.
    pub fn from_profile(profile: &PlayerProfile, is_host: bool) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.name.clone(),
            level: profile.level,
            is_host,
        }
    }
}

/// The game format a matchmaking request asks for.
///
/// Both sides of a pairing must ask for the same mode — a classic and a
/// ranked battle cannot be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Classic,
    Ranked,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::Ranked => write!(f, "ranked"),
        }
    }
}

/// Where a waiting user stands in the matchmaking queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePhase {
    /// Freshly enqueued, waiting for a compatible opponent.
    Searching,
    /// Automatically re-enqueued after an opponent dropped mid-countdown.
    Requeued,
}

/// Quiz configuration for a private room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Restricts questions to one category; `None` means mixed.
    pub category: Option<CategoryId>,
    pub question_count: u32,
    pub seconds_per_question: u32,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            category: None,
            question_count: 10,
            seconds_per_question: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle status of a room.
///
/// Advances strictly forward:
///
/// ```text
/// waiting → starting → playing → finished
/// ```
///
/// The one sanctioned exception is an aborted start countdown, which
/// returns `starting → waiting`; once a room reaches `playing` no
/// regression is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Starting,
    Playing,
    Finished,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting | Self::Starting)
    }

    /// Returns `true` if advancing to `target` follows the forward order.
    pub fn can_advance_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Starting)
                | (Self::Starting, Self::Playing)
                | (Self::Playing, Self::Finished)
        )
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Starting => write!(f, "starting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// A full point-in-time view of a room, broadcast on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    /// Players in join order; exactly one has `is_host` set while the
    /// room is non-empty.
    pub players: Vec<Player>,
    pub max_players: usize,
    pub settings: RoomSettings,
    pub status: RoomStatus,
}

// ---------------------------------------------------------------------------
// ClientCommand — client → server
// ---------------------------------------------------------------------------

/// A command issued by a connected client.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "join_private_room", "room_code": "KQ7X2M" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Binds the connection to a user identity. Must precede every
    /// other command.
    RegisterUser { user_id: UserId },

    /// Enters the matchmaking queue.
    JoinMatchmaking {
        category: Option<CategoryId>,
        mode: MatchMode,
    },

    /// Withdraws the caller's waiting queue entry, if any.
    CancelMatchmaking,

    /// Creates a private room and makes the caller its host.
    CreatePrivateRoom {
        max_players: usize,
        settings: RoomSettings,
    },

    /// Joins a private room by its shareable code.
    JoinPrivateRoom { room_code: RoomCode },

    /// Leaves a private room.
    LeavePrivateRoom { room_code: RoomCode },

    /// Starts the game in a private room. Host only.
    StartPrivateGame { room_code: RoomCode },
}

// ---------------------------------------------------------------------------
// ServerEvent — server → client
// ---------------------------------------------------------------------------

/// A state-change notification pushed to one or more connections.
///
/// Error events carry a stable machine-readable `code` next to the
/// human-readable `message`; they go only to the connection whose
/// command failed, never to bystanders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    // -- Registration --
    /// The connection is now bound to this profile.
    Registered { profile: PlayerProfile },

    /// Registration failed; the connection stays unbound.
    RegistrationError { code: String, message: String },

    // -- Matchmaking --
    /// Queue status for the caller only.
    MatchmakingUpdate {
        status: QueuePhase,
        estimated_wait_secs: u64,
    },

    /// A compatible opponent was paired with the receiver.
    OpponentFound {
        match_id: MatchId,
        opponent: PlayerProfile,
    },

    /// The matched pair entered its start countdown.
    MatchStarting {
        match_id: MatchId,
        countdown_secs: u64,
    },

    /// Countdown elapsed; the match is handed off to battle execution.
    MatchReady { match_id: MatchId },

    /// A matchmaking command failed, or retries ran out.
    MatchmakingError { code: String, message: String },

    /// The receiver's matched opponent dropped before the match was ready.
    OpponentCancelled { match_id: MatchId },

    // -- Private rooms --
    /// The receiver is now a member of the room (also sent on an
    /// idempotent re-join).
    RoomJoined {
        snapshot: RoomSnapshot,
        is_host: bool,
    },

    /// Another player entered the receiver's room.
    PlayerJoined { room_code: RoomCode, player: Player },

    /// Full room state after any membership or status change.
    RoomUpdated { snapshot: RoomSnapshot },

    /// A player left the receiver's room; `new_host` carries a host
    /// transfer decided in the same handling.
    PlayerLeft {
        room_code: RoomCode,
        user_id: UserId,
        new_host: Option<UserId>,
    },

    /// The host started the game; countdown is running.
    RoomStarting {
        room_code: RoomCode,
        countdown_secs: u64,
    },

    /// Countdown elapsed; gameplay begins under `match_id`.
    GameStarted {
        room_code: RoomCode,
        match_id: MatchId,
    },

    /// A room command failed.
    RoomError { code: String, message: String },

    /// The join code does not name a live room.
    RoomNotFound { room_code: RoomCode },

    /// The room has no free player slot.
    RoomFull { room_code: RoomCode },
}

// =========================================================================
// Tests
// =========================================================================
