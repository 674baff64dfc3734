//! The coordinator: one task, all the state.
//!
//! Every client command, disconnect, and countdown firing is funneled
//! into this type and handled to completion before the next one, so the
//! registries need no locks. Handlers return the full batch of events
//! to deliver, keyed by connection; the server loop owns the actual
//! sending.

use quizarena_matchmaking::{
    DisconnectOutcome, EnqueueOutcome, MatchedPair, MatchmakingError,
    MatchmakingQueue, QueueEntry, RequeueOutcome,
};
use quizarena_protocol::{
    CategoryId, ClientCommand, MatchId, MatchMode, PlayerProfile,
    QueuePhase, RoomCode, RoomSettings, ServerEvent, UserId,
};
use quizarena_room::{
    GameStart, JoinOutcome, LeaveOutcome, RoomError, RoomRegistry,
    StartOutcome,
};
use quizarena_session::{
    ConnectionRegistry, ProfileProvider, SessionError,
};
use quizarena_transport::ConnectionId;
use tokio::sync::mpsc::UnboundedSender;

use crate::CoordinatorConfig;

/// Events to deliver, keyed by destination connection.
pub type Outbound = Vec<(ConnectionId, ServerEvent)>;

/// Owns the connection registry, the matchmaking queue, and the room
/// registry, and dispatches every command against them.
///
/// `handle_command` is async only for the one-time profile resolve
/// during registration; everything else is synchronous mutation.
pub struct Coordinator<P: ProfileProvider> {
    registry: ConnectionRegistry,
    queue: MatchmakingQueue,
    rooms: RoomRegistry,
    profiles: P,
    config: CoordinatorConfig,
}

impl<P: ProfileProvider> Coordinator<P> {
    /// Creates a coordinator whose countdowns fire on the given timer
    /// channels.
    pub fn new(
        profiles: P,
        config: CoordinatorConfig,
        match_timer_tx: UnboundedSender<MatchId>,
        room_timer_tx: UnboundedSender<RoomCode>,
    ) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            queue: MatchmakingQueue::new(
                config.match_countdown(),
                match_timer_tx,
            ),
            rooms: RoomRegistry::new(
                config.room_countdown(),
                room_timer_tx,
            ),
            profiles,
            config,
        }
    }

    /// Dispatches one client command, returning the events it produced.
    pub async fn handle_command(
        &mut self,
        conn_id: ConnectionId,
        command: ClientCommand,
    ) -> Outbound {
        tracing::debug!(%conn_id, ?command, "dispatching command");

        match command {
            ClientCommand::RegisterUser { user_id } => {
                self.register(conn_id, user_id).await
            }
            ClientCommand::JoinMatchmaking { category, mode } => {
                self.join_matchmaking(conn_id, category, mode)
            }
            ClientCommand::CancelMatchmaking => {
                self.cancel_matchmaking(conn_id)
            }
            ClientCommand::CreatePrivateRoom {
                max_players,
                settings,
            } => self.create_room(conn_id, max_players, settings),
            ClientCommand::JoinPrivateRoom { room_code } => {
                self.join_room(conn_id, &room_code)
            }
            ClientCommand::LeavePrivateRoom { room_code } => {
                self.leave_room(conn_id, &room_code)
            }
            ClientCommand::StartPrivateGame { room_code } => {
                self.start_game(conn_id, &room_code)
            }
        }
    }

    /// Disconnect hook: evicts the connection's user and tears down all
    /// their matchmaking and room state.
    ///
    /// A close of a superseded connection finds no current mapping and
    /// tears down nothing.
    pub fn handle_disconnect(&mut self, conn_id: ConnectionId) -> Outbound {
        let Some(user_id) = self.registry.unregister(conn_id) else {
            tracing::debug!(
                %conn_id,
                "disconnect of unregistered or superseded connection"
            );
            return Vec::new();
        };
        self.teardown_user(user_id)
    }

    /// A match-start countdown elapsed.
    pub fn handle_match_countdown(&mut self, match_id: MatchId) -> Outbound {
        let Some(users) = self.queue.on_countdown(match_id) else {
            return Vec::new();
        };
        users
            .into_iter()
            .filter_map(|user_id| {
                self.registry
                    .lookup(user_id)
                    .map(|conn| (conn, ServerEvent::MatchReady { match_id }))
            })
            .collect()
    }

    /// A room-start countdown elapsed.
    pub fn handle_room_countdown(&mut self, code: &RoomCode) -> Outbound {
        let Some(GameStart { match_id, members }) =
            self.rooms.on_countdown(code)
        else {
            return Vec::new();
        };
        members
            .into_iter()
            .filter_map(|user_id| {
                self.registry.lookup(user_id).map(|conn| {
                    (
                        conn,
                        ServerEvent::GameStarted {
                            room_code: code.clone(),
                            match_id,
                        },
                    )
                })
            })
            .collect()
    }

    /// Read access for assertions and introspection.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &MatchmakingQueue {
        &self.queue
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    // -- Registration -----------------------------------------------------

    async fn register(
        &mut self,
        conn_id: ConnectionId,
        user_id: UserId,
    ) -> Outbound {
        let profile = match self.profiles.resolve(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    %conn_id, %user_id, error = %e,
                    "profile resolution failed"
                );
                return vec![(
                    conn_id,
                    ServerEvent::RegistrationError {
                        code: e.code().into(),
                        message: e.to_string(),
                    },
                )];
            }
        };

        let mut events = Vec::new();

        // A connection switching to a different identity first runs the
        // full cleanup for the previous user, without closing the socket.
        if let Some(previous) = self.registry.user_for(conn_id) {
            if previous != user_id {
                tracing::info!(
                    %conn_id, %previous, %user_id,
                    "connection re-registering as a different user"
                );
                self.registry.remove_user(previous);
                events.extend(self.teardown_user(previous));
            }
        }

        // A superseded connection gets nothing: routing simply stops
        // reaching it, and its later close finds no mapping to evict.
        self.registry.register(user_id, conn_id, profile.clone());
        events.push((conn_id, ServerEvent::Registered { profile }));
        events
    }

    // -- Matchmaking ------------------------------------------------------

    fn join_matchmaking(
        &mut self,
        conn_id: ConnectionId,
        category: Option<CategoryId>,
        mode: MatchMode,
    ) -> Outbound {
        let Some(profile) = self.profile_for(conn_id) else {
            return vec![(conn_id, matchmaking_not_registered())];
        };

        match self.queue.enqueue(QueueEntry::new(profile, category, mode)) {
            Ok(EnqueueOutcome::Searching) => vec![(
                conn_id,
                ServerEvent::MatchmakingUpdate {
                    status: QueuePhase::Searching,
                    estimated_wait_secs: self.config.estimated_wait_secs,
                },
            )],
            Ok(EnqueueOutcome::Matched(pair)) => self.pair_events(pair),
            Err(e) => vec![(
                conn_id,
                ServerEvent::MatchmakingError {
                    code: e.code().into(),
                    message: e.to_string(),
                },
            )],
        }
    }

    fn cancel_matchmaking(&mut self, conn_id: ConnectionId) -> Outbound {
        let Some(user_id) = self.registry.user_for(conn_id) else {
            return vec![(conn_id, matchmaking_not_registered())];
        };
        // No acknowledgement either way.
        self.queue.cancel(user_id);
        Vec::new()
    }

    // -- Private rooms ----------------------------------------------------

    fn create_room(
        &mut self,
        conn_id: ConnectionId,
        max_players: usize,
        settings: RoomSettings,
    ) -> Outbound {
        let Some(profile) = self.profile_for(conn_id) else {
            return vec![(conn_id, room_not_registered())];
        };

        match self.rooms.create_room(&profile, max_players, settings) {
            Ok(snapshot) => vec![(
                conn_id,
                ServerEvent::RoomJoined {
                    snapshot,
                    is_host: true,
                },
            )],
            Err(e) => vec![(conn_id, room_error_event(e))],
        }
    }

    fn join_room(
        &mut self,
        conn_id: ConnectionId,
        room_code: &RoomCode,
    ) -> Outbound {
        let Some(profile) = self.profile_for(conn_id) else {
            return vec![(conn_id, room_not_registered())];
        };

        match self.rooms.join_room(room_code, &profile) {
            Ok(JoinOutcome::Joined {
                snapshot,
                player,
                others,
            }) => {
                let mut events = Vec::new();
                for member in others {
                    if let Some(conn) = self.registry.lookup(member) {
                        events.push((
                            conn,
                            ServerEvent::PlayerJoined {
                                room_code: room_code.clone(),
                                player: player.clone(),
                            },
                        ));
                        events.push((
                            conn,
                            ServerEvent::RoomUpdated {
                                snapshot: snapshot.clone(),
                            },
                        ));
                    }
                }
                events.push((
                    conn_id,
                    ServerEvent::RoomJoined {
                        snapshot,
                        is_host: false,
                    },
                ));
                events
            }
            Ok(JoinOutcome::AlreadyMember { snapshot, is_host }) => {
                vec![(conn_id, ServerEvent::RoomJoined { snapshot, is_host })]
            }
            Err(e) => vec![(conn_id, room_error_event(e))],
        }
    }

    fn leave_room(
        &mut self,
        conn_id: ConnectionId,
        room_code: &RoomCode,
    ) -> Outbound {
        let Some(user_id) = self.registry.user_for(conn_id) else {
            return vec![(conn_id, room_not_registered())];
        };
        let outcome = self.rooms.leave_room(room_code, user_id);
        self.leave_events(room_code, user_id, outcome)
    }

    fn start_game(
        &mut self,
        conn_id: ConnectionId,
        room_code: &RoomCode,
    ) -> Outbound {
        let Some(user_id) = self.registry.user_for(conn_id) else {
            return vec![(conn_id, room_not_registered())];
        };

        match self.rooms.start_game(room_code, user_id) {
            Ok(StartOutcome { members }) => members
                .into_iter()
                .filter_map(|member| {
                    self.registry.lookup(member).map(|conn| {
                        (
                            conn,
                            ServerEvent::RoomStarting {
                                room_code: room_code.clone(),
                                countdown_secs: self
                                    .config
                                    .room_countdown_secs,
                            },
                        )
                    })
                })
                .collect(),
            Err(e) => vec![(conn_id, room_error_event(e))],
        }
    }

    // -- Internals --------------------------------------------------------

    /// The profile cached for the connection's user, if registered.
    fn profile_for(&self, conn_id: ConnectionId) -> Option<PlayerProfile> {
        let user_id = self.registry.user_for(conn_id)?;
        self.registry.profile(user_id).cloned()
    }

    /// Removes all of a departed user's matchmaking and room state,
    /// notifying the peers it affects.
    fn teardown_user(&mut self, user_id: UserId) -> Outbound {
        let mut events = Vec::new();

        match self.queue.on_disconnect(user_id) {
            DisconnectOutcome::NotQueued
            | DisconnectOutcome::CancelledWaiting => {}
            DisconnectOutcome::MatchTorn {
                match_id,
                survivor,
                requeue,
            } => {
                if let Some(conn) = self.registry.lookup(survivor) {
                    events.push((
                        conn,
                        ServerEvent::OpponentCancelled { match_id },
                    ));
                }
                match requeue {
                    RequeueOutcome::Searching => {
                        if let Some(conn) = self.registry.lookup(survivor)
                        {
                            events.push((
                                conn,
                                ServerEvent::MatchmakingUpdate {
                                    status: QueuePhase::Requeued,
                                    estimated_wait_secs: self
                                        .config
                                        .estimated_wait_secs,
                                },
                            ));
                        }
                    }
                    RequeueOutcome::Matched(pair) => {
                        events.extend(self.pair_events(pair));
                    }
                    RequeueOutcome::RetriesExhausted => {
                        if let Some(conn) = self.registry.lookup(survivor)
                        {
                            let e = MatchmakingError::RetriesExhausted(
                                survivor,
                            );
                            events.push((
                                conn,
                                ServerEvent::MatchmakingError {
                                    code: e.code().into(),
                                    message: e.to_string(),
                                },
                            ));
                        }
                    }
                }
            }
        }

        if let Some((code, outcome)) = self.rooms.on_disconnect(user_id) {
            events.extend(self.leave_events(&code, user_id, outcome));
        }
        events
    }

    /// `opponent_found` + `match_starting` to both sides of a fresh pair.
    fn pair_events(&self, pair: MatchedPair) -> Outbound {
        let MatchedPair {
            match_id, players, ..
        } = pair;
        let [first, second] = players;

        let mut events = Vec::new();
        for (me, opponent) in [(&first, &second), (&second, &first)] {
            if let Some(conn) = self.registry.lookup(me.user_id) {
                events.push((
                    conn,
                    ServerEvent::OpponentFound {
                        match_id,
                        opponent: opponent.clone(),
                    },
                ));
                events.push((
                    conn,
                    ServerEvent::MatchStarting {
                        match_id,
                        countdown_secs: self.config.match_countdown_secs,
                    },
                ));
            }
        }
        events
    }

    /// `player_left` + `room_updated` to everyone still in the room.
    fn leave_events(
        &self,
        room_code: &RoomCode,
        departed: UserId,
        outcome: LeaveOutcome,
    ) -> Outbound {
        match outcome {
            LeaveOutcome::NotAMember | LeaveOutcome::Destroyed => {
                Vec::new()
            }
            LeaveOutcome::Left {
                snapshot,
                new_host,
                remaining,
                ..
            } => {
                let mut events = Vec::new();
                for member in remaining {
                    if let Some(conn) = self.registry.lookup(member) {
                        events.push((
                            conn,
                            ServerEvent::PlayerLeft {
                                room_code: room_code.clone(),
                                user_id: departed,
                                new_host,
                            },
                        ));
                        events.push((
                            conn,
                            ServerEvent::RoomUpdated {
                                snapshot: snapshot.clone(),
                            },
                        ));
                    }
                }
                events
            }
        }
    }
}

/// `matchmaking_error` for a command issued before `register_user`.
fn matchmaking_not_registered() -> ServerEvent {
    let e = SessionError::NotRegistered;
    ServerEvent::MatchmakingError {
        code: e.code().into(),
        message: e.to_string(),
    }
}

/// `room_error` for a command issued before `register_user`.
fn room_not_registered() -> ServerEvent {
    let e = SessionError::NotRegistered;
    ServerEvent::RoomError {
        code: e.code().into(),
        message: e.to_string(),
    }
}

/// Maps a room failure onto its outbound event. Unknown codes and full
/// rooms have dedicated events; everything else rides `room_error`.
fn room_error_event(e: RoomError) -> ServerEvent {
    match e {
        RoomError::NotFound(room_code) => {
            ServerEvent::RoomNotFound { room_code }
        }
        RoomError::RoomFull(room_code) => {
            ServerEvent::RoomFull { room_code }
        }
        other => ServerEvent::RoomError {
            code: other.code().into(),
            message: other.to_string(),
        },
    }
}
