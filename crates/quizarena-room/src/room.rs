//! The room aggregate: one private lobby.

use quizarena_countdown::CountdownHandle;
use quizarena_protocol::{
    Player, PlayerProfile, RoomCode, RoomSettings, RoomSnapshot,
    RoomStatus, UserId,
};

/// A host-created lobby for a private quiz battle.
///
/// Invariants, maintained by the mutators below:
/// - `players.len() <= max_players`
/// - exactly one player has `is_host` set while the room is non-empty
/// - `status` only advances forward, except [`abort_start`]
///
/// [`abort_start`]: Room::abort_start
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    /// Members in join order; `players[0]` is not necessarily the host
    /// after a transfer, the `is_host` flag is authoritative.
    players: Vec<Player>,
    max_players: usize,
    settings: RoomSettings,
    status: RoomStatus,
    /// Start countdown; every teardown path takes and cancels it.
    countdown: Option<CountdownHandle>,
}

impl Room {
    /// Creates a room in `waiting` status with the host as sole player.
    pub fn new(
        code: RoomCode,
        host: &PlayerProfile,
        max_players: usize,
        settings: RoomSettings,
    ) -> Self {
        Self {
            code,
            players: vec![Player::from_profile(host, true)],
            max_players,
            settings,
            status: RoomStatus::Waiting,
            countdown: None,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Returns `true` if the user is a member of this room.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.players.iter().any(|p| p.user_id == user_id)
    }

    /// Returns `true` if the user is this room's host.
    pub fn is_host(&self, user_id: UserId) -> bool {
        self.players
            .iter()
            .any(|p| p.user_id == user_id && p.is_host)
    }

    /// The `is_host` flag for a member, if they are one.
    pub fn host_flag(&self, user_id: UserId) -> Option<bool> {
        self.players
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.is_host)
    }

    /// User IDs of every member, join order.
    pub fn member_ids(&self) -> Vec<UserId> {
        self.players.iter().map(|p| p.user_id).collect()
    }

    /// A full point-in-time view for broadcasting.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            players: self.players.clone(),
            max_players: self.max_players,
            settings: self.settings,
            status: self.status,
        }
    }

    /// Appends a guest. The caller has already checked capacity,
    /// status, and membership.
    pub(crate) fn add_player(&mut self, profile: &PlayerProfile) -> Player {
        debug_assert!(!self.is_full());
        debug_assert!(!self.contains(profile.user_id));
        let player = Player::from_profile(profile, false);
        self.players.push(player.clone());
        player
    }

    /// Removes a member, transferring the host role to the next-joined
    /// member when the host departs a non-empty room.
    ///
    /// Returns the removed player and the new host's ID if a transfer
    /// happened, or `None` if the user was not a member.
    pub(crate) fn remove_player(
        &mut self,
        user_id: UserId,
    ) -> Option<(Player, Option<UserId>)> {
        let idx =
            self.players.iter().position(|p| p.user_id == user_id)?;
        let removed = self.players.remove(idx);

        let new_host = if removed.is_host && !self.players.is_empty() {
            // Next-joined member inherits the host role, in the same
            // synchronous handling — no hostless room is observable.
            self.players[0].is_host = true;
            Some(self.players[0].user_id)
        } else {
            None
        };
        Some((removed, new_host))
    }

    /// `waiting → starting`: stores the scheduled countdown handle.
    pub(crate) fn begin_start(&mut self, countdown: CountdownHandle) {
        debug_assert!(
            self.status.can_advance_to(RoomStatus::Starting),
            "begin_start from {}",
            self.status
        );
        self.status = RoomStatus::Starting;
        self.countdown = Some(countdown);
    }

    /// `starting → waiting`: the one sanctioned status regression,
    /// taken when a departure drops the room below two players before
    /// the countdown fires. Cancels the countdown.
    pub(crate) fn abort_start(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.cancel();
        }
        self.status = RoomStatus::Waiting;
    }

    /// `starting → playing`: the countdown fired.
    pub(crate) fn begin_play(&mut self) {
        debug_assert!(self.status.can_advance_to(RoomStatus::Playing));
        self.countdown = None;
        self.status = RoomStatus::Playing;
    }

    /// `playing → finished`: the last member is gone after hand-off.
    pub(crate) fn finish(&mut self) {
        debug_assert!(self.status.can_advance_to(RoomStatus::Finished));
        self.status = RoomStatus::Finished;
    }

    /// Cancels any pending countdown. Called on every destroy path.
    pub(crate) fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.cancel();
        }
    }
}
