//! Room registry: code generation, membership, and lifecycle driving.
//!
//! # Concurrency note
//!
//! `RoomRegistry` is NOT thread-safe by itself — plain `HashMap`s, no
//! locks. It is owned by the single coordinator task and every command
//! is handled to completion before the next one.

use std::collections::HashMap;
use std::time::Duration;

use quizarena_countdown::CountdownHandle;
use quizarena_protocol::{
    MatchId, Player, PlayerProfile, RoomCode, RoomSettings, RoomSnapshot,
    RoomStatus, UserId,
};
use rand::Rng;
use tokio::sync::mpsc::UnboundedSender;

use crate::{Room, RoomError};

/// Room capacity bounds enforced at creation.
const MIN_PLAYERS: usize = 2;
const MAX_ROOM_CAPACITY: usize = 8;

/// Code alphabet without the ambiguous `0/O`, `1/I` pairs.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

/// Result of a successful join.
#[derive(Debug)]
pub enum JoinOutcome {
    /// The user entered the room.
    Joined {
        snapshot: RoomSnapshot,
        /// The joiner's freshly derived player entry.
        player: Player,
        /// Members who were already present, for the broadcast.
        others: Vec<UserId>,
    },
    /// The user was already a member — idempotent re-join, nothing
    /// changed, nobody else is notified.
    AlreadyMember {
        snapshot: RoomSnapshot,
        is_host: bool,
    },
}

/// Result of a leave (or the leave half of a disconnect).
#[derive(Debug)]
pub enum LeaveOutcome {
    /// The user was not in that room; tolerated no-op.
    NotAMember,
    /// The user left; the room lives on.
    Left {
        snapshot: RoomSnapshot,
        /// Host transfer decided in the same handling, if any.
        new_host: Option<UserId>,
        /// Members remaining after the departure.
        remaining: Vec<UserId>,
        /// The departure dropped a `starting` room below two players,
        /// cancelling the countdown and returning it to `waiting`.
        aborted_start: bool,
    },
    /// The room emptied and was destroyed; its code is recycled.
    Destroyed,
}

/// Result of a successful `start_game`: the countdown is running.
#[derive(Debug)]
pub struct StartOutcome {
    pub members: Vec<UserId>,
}

/// Result of a room countdown firing: gameplay begins.
#[derive(Debug)]
pub struct GameStart {
    pub match_id: MatchId,
    pub members: Vec<UserId>,
}

/// Owns every live room and the code namespace.
///
/// Invariants: a user is a member of at most one room; codes are unique
/// among live rooms and recycled once a room is destroyed.
pub struct RoomRegistry {
    /// Live rooms by code.
    rooms: HashMap<RoomCode, Room>,

    /// Which room a user is a member of.
    user_rooms: HashMap<UserId, RoomCode>,

    /// Room-start countdown duration.
    countdown: Duration,

    /// Where fired countdowns deliver their room code.
    timer_tx: UnboundedSender<RoomCode>,
}

impl RoomRegistry {
    /// Creates an empty registry whose countdowns fire on `timer_tx`.
    pub fn new(
        countdown: Duration,
        timer_tx: UnboundedSender<RoomCode>,
    ) -> Self {
        Self {
            rooms: HashMap::new(),
            user_rooms: HashMap::new(),
            countdown,
            timer_tx,
        }
    }

    /// Creates a room with the host as sole player.
    ///
    /// # Errors
    /// - [`RoomError::InvalidConfig`] — `max_players` out of range
    /// - [`RoomError::AlreadyInRoom`] — the host is in another room
    pub fn create_room(
        &mut self,
        host: &PlayerProfile,
        max_players: usize,
        settings: RoomSettings,
    ) -> Result<RoomSnapshot, RoomError> {
        if !(MIN_PLAYERS..=MAX_ROOM_CAPACITY).contains(&max_players) {
            return Err(RoomError::InvalidConfig(format!(
                "max_players must be between {MIN_PLAYERS} and \
                 {MAX_ROOM_CAPACITY}, got {max_players}"
            )));
        }
        if let Some(existing) = self.user_rooms.get(&host.user_id) {
            return Err(RoomError::AlreadyInRoom(
                host.user_id,
                existing.clone(),
            ));
        }

        let code = self.generate_code();
        let room = Room::new(code.clone(), host, max_players, settings);
        let snapshot = room.snapshot();

        self.user_rooms.insert(host.user_id, code.clone());
        self.rooms.insert(code.clone(), room);

        tracing::info!(
            room_code = %code, host = %host.user_id, max_players,
            "room created"
        );
        Ok(snapshot)
    }

    /// Joins a user to a room by code.
    ///
    /// Validate-then-mutate: any error leaves the registry untouched.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] — no live room carries the code
    /// - [`RoomError::AlreadyInRoom`] — the user is in another room
    /// - [`RoomError::NotJoinable`] — the room is `playing`/`finished`
    /// - [`RoomError::RoomFull`] — no free slot
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        profile: &PlayerProfile,
    ) -> Result<JoinOutcome, RoomError> {
        let user_id = profile.user_id;
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        if room.contains(user_id) {
            // Duplicate join: re-send the snapshot, change nothing.
            tracing::debug!(
                room_code = %code, %user_id, "idempotent re-join"
            );
            return Ok(JoinOutcome::AlreadyMember {
                snapshot: room.snapshot(),
                is_host: room.is_host(user_id),
            });
        }
        if let Some(existing) = self.user_rooms.get(&user_id) {
            return Err(RoomError::AlreadyInRoom(
                user_id,
                existing.clone(),
            ));
        }
        if !room.status().is_joinable() {
            return Err(RoomError::NotJoinable(code.clone()));
        }
        if room.is_full() {
            return Err(RoomError::RoomFull(code.clone()));
        }

        let others = room.member_ids();
        let player = room.add_player(profile);
        let snapshot = room.snapshot();
        self.user_rooms.insert(user_id, code.clone());

        tracing::info!(
            room_code = %code, %user_id,
            players = snapshot.players.len(),
            "player joined room"
        );
        Ok(JoinOutcome::Joined {
            snapshot,
            player,
            others,
        })
    }

    /// Removes a user from a room.
    ///
    /// Leaving a room the user is not in (or an unknown code) is a
    /// tolerated no-op. Host departure transfers the role to the
    /// next-joined member within the same handling; an emptied room is
    /// destroyed and its code recycled.
    pub fn leave_room(
        &mut self,
        code: &RoomCode,
        user_id: UserId,
    ) -> LeaveOutcome {
        let Some(room) = self.rooms.get_mut(code) else {
            tracing::debug!(room_code = %code, %user_id, "leave of unknown room ignored");
            return LeaveOutcome::NotAMember;
        };
        let Some((_removed, new_host)) = room.remove_player(user_id)
        else {
            tracing::debug!(room_code = %code, %user_id, "leave by non-member ignored");
            return LeaveOutcome::NotAMember;
        };
        self.user_rooms.remove(&user_id);

        if room.is_empty() {
            if room.status() == RoomStatus::Playing {
                room.finish();
            }
            room.cancel_countdown();
            self.rooms.remove(code);
            tracing::info!(room_code = %code, "room emptied, destroyed");
            return LeaveOutcome::Destroyed;
        }

        let aborted_start = room.status() == RoomStatus::Starting
            && room.player_count() < MIN_PLAYERS;
        if aborted_start {
            room.abort_start();
            tracing::warn!(
                room_code = %code,
                "start countdown aborted, room back to waiting"
            );
        }

        if let Some(host) = new_host {
            tracing::info!(
                room_code = %code, new_host = %host,
                "host role transferred"
            );
        }
        LeaveOutcome::Left {
            snapshot: room.snapshot(),
            new_host,
            remaining: room.member_ids(),
            aborted_start,
        }
    }

    /// Disconnect hook: removes the user from whichever room they are
    /// in, with full leave semantics.
    pub fn on_disconnect(
        &mut self,
        user_id: UserId,
    ) -> Option<(RoomCode, LeaveOutcome)> {
        let code = self.user_rooms.get(&user_id)?.clone();
        let outcome = self.leave_room(&code, user_id);
        Some((code, outcome))
    }

    /// Starts the game in a room: `waiting → starting`, countdown
    /// scheduled.
    ///
    /// Validate-then-mutate: a failed start leaves the room unchanged.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] — unknown code
    /// - [`RoomError::NotHost`] — requester is not the host
    /// - [`RoomError::InsufficientPlayers`] — fewer than two players
    /// - [`RoomError::InvalidState`] — the room is not `waiting`
    pub fn start_game(
        &mut self,
        code: &RoomCode,
        requester: UserId,
    ) -> Result<StartOutcome, RoomError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        if !room.is_host(requester) {
            return Err(RoomError::NotHost(requester, code.clone()));
        }
        if room.player_count() < MIN_PLAYERS {
            return Err(RoomError::InsufficientPlayers(code.clone()));
        }
        if room.status() != RoomStatus::Waiting {
            return Err(RoomError::InvalidState(format!(
                "cannot start a {} room",
                room.status()
            )));
        }

        room.begin_start(CountdownHandle::schedule(
            self.countdown,
            self.timer_tx.clone(),
            code.clone(),
        ));
        tracing::info!(
            room_code = %code, %requester,
            countdown_secs = self.countdown.as_secs(),
            "room start countdown running"
        );
        Ok(StartOutcome {
            members: room.member_ids(),
        })
    }

    /// Countdown hook: `starting → playing`, gameplay begins.
    ///
    /// Returns `None` for a stale firing — the room is gone or no
    /// longer `starting` (the abort path cancels the handle, so this is
    /// a second line of defense).
    pub fn on_countdown(&mut self, code: &RoomCode) -> Option<GameStart> {
        let Some(room) = self.rooms.get_mut(code) else {
            tracing::warn!(room_code = %code, "stale room countdown ignored");
            return None;
        };
        if room.status() != RoomStatus::Starting {
            tracing::warn!(
                room_code = %code, status = %room.status(),
                "room countdown fired outside starting, ignored"
            );
            return None;
        }

        room.begin_play();
        let match_id = MatchId::allocate();
        tracing::info!(room_code = %code, %match_id, "game started");
        Some(GameStart {
            match_id,
            members: room.member_ids(),
        })
    }

    /// Looks up a live room by code.
    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// The room a user is currently a member of, if any.
    pub fn user_room(&self, user_id: UserId) -> Option<&RoomCode> {
        self.user_rooms.get(&user_id)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    // -- Internals --------------------------------------------------------

    /// Generates a code that no live room currently uses.
    ///
    /// Collision-checked against live rooms only; with 32^6 codes and a
    /// handful of live rooms the loop all but never repeats.
    fn generate_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| {
                    let idx = rng.random_range(0..CODE_ALPHABET.len());
                    CODE_ALPHABET[idx] as char
                })
                .collect();
            let code = RoomCode::new(code);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}
