//! `QuizArenaServer` builder, accept loop, and the coordinator loop.
//!
//! This is the entry point for running a coordinator. It ties together
//! all the layers: transport → protocol → session → matchmaking → room.

use std::collections::HashMap;

use quizarena_protocol::{
    ClientCommand, Codec, JsonCodec, MatchId, RoomCode,
};
use quizarena_session::ProfileProvider;
use quizarena_transport::{ConnectionId, Transport, WebSocketTransport};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::coordinator::{Coordinator, Outbound};
use crate::handler::handle_connection;
use crate::{CoordinatorConfig, QuizArenaError};

/// Messages from connection handlers into the coordinator loop.
pub(crate) enum LoopMsg {
    /// A connection opened; its outbound events go to this sender.
    Connected(ConnectionId, UnboundedSender<Vec<u8>>),

    /// A decoded client command.
    Command(ConnectionId, ClientCommand),

    /// The connection is gone. Injected exactly once per connection by
    /// the handler's drop guard.
    Disconnected(ConnectionId),
}

/// Builder for configuring and starting a QuizArena server.
///
/// # Example
///
/// ```rust,ignore
/// use quizarena::prelude::*;
///
/// let server = QuizArenaServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(MyProfiles)
///     .await?;
/// server.run().await
/// ```
pub struct QuizArenaServerBuilder {
    bind_addr: String,
    config: CoordinatorConfig,
}

impl QuizArenaServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: CoordinatorConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the coordinator configuration.
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the server with the given profile provider.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<P: ProfileProvider>(
        self,
        profiles: P,
    ) -> Result<QuizArenaServer<P>, QuizArenaError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        Ok(QuizArenaServer {
            transport,
            profiles,
            config: self.config,
        })
    }
}

impl Default for QuizArenaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running QuizArena coordinator server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizArenaServer<P: ProfileProvider> {
    transport: WebSocketTransport,
    profiles: P,
    config: CoordinatorConfig,
}

impl<P: ProfileProvider> QuizArenaServer<P> {
    /// Creates a new builder.
    pub fn builder() -> QuizArenaServerBuilder {
        QuizArenaServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server: spawns the coordinator loop and accepts
    /// connections until the process is terminated.
    pub async fn run(mut self) -> Result<(), QuizArenaError> {
        let (loop_tx, loop_rx) = mpsc::unbounded_channel();
        let (match_timer_tx, match_timer_rx) = mpsc::unbounded_channel();
        let (room_timer_tx, room_timer_rx) = mpsc::unbounded_channel();

        let coordinator = Coordinator::new(
            self.profiles,
            self.config,
            match_timer_tx,
            room_timer_tx,
        );
        tokio::spawn(run_coordinator(
            coordinator,
            JsonCodec,
            loop_rx,
            match_timer_rx,
            room_timer_rx,
        ));

        tracing::info!("QuizArena coordinator running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let loop_tx = loop_tx.clone();
                    tokio::spawn(handle_connection(
                        conn, JsonCodec, loop_tx,
                    ));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// The single task owning all coordinator state.
///
/// Selects over the command channel and both timer channels; every
/// branch runs to completion before the next message is dequeued, which
/// is what lets the registries go lock-free.
async fn run_coordinator<P: ProfileProvider, C: Codec>(
    mut coordinator: Coordinator<P>,
    codec: C,
    mut loop_rx: UnboundedReceiver<LoopMsg>,
    mut match_timer_rx: UnboundedReceiver<MatchId>,
    mut room_timer_rx: UnboundedReceiver<RoomCode>,
) {
    let mut peers: HashMap<ConnectionId, UnboundedSender<Vec<u8>>> =
        HashMap::new();

    loop {
        tokio::select! {
            msg = loop_rx.recv() => {
                let Some(msg) = msg else { break };
                match msg {
                    LoopMsg::Connected(conn_id, tx) => {
                        peers.insert(conn_id, tx);
                    }
                    LoopMsg::Command(conn_id, command) => {
                        let events = coordinator
                            .handle_command(conn_id, command)
                            .await;
                        deliver(&codec, &peers, events);
                    }
                    LoopMsg::Disconnected(conn_id) => {
                        peers.remove(&conn_id);
                        let events =
                            coordinator.handle_disconnect(conn_id);
                        deliver(&codec, &peers, events);
                    }
                }
            }
            Some(match_id) = match_timer_rx.recv() => {
                let events =
                    coordinator.handle_match_countdown(match_id);
                deliver(&codec, &peers, events);
            }
            Some(code) = room_timer_rx.recv() => {
                let events = coordinator.handle_room_countdown(&code);
                deliver(&codec, &peers, events);
            }
        }
    }
    tracing::info!("coordinator loop stopped");
}

/// Best-effort fan-out. A peer that already disconnected is skipped;
/// delivery to the departed is explicitly not guaranteed.
fn deliver<C: Codec>(
    codec: &C,
    peers: &HashMap<ConnectionId, UnboundedSender<Vec<u8>>>,
    events: Outbound,
) {
    for (conn_id, event) in events {
        let Some(tx) = peers.get(&conn_id) else {
            tracing::debug!(
                %conn_id, "dropping event for departed connection"
            );
            continue;
        };
        match codec.encode(&event) {
            Ok(bytes) => {
                let _ = tx.send(bytes);
            }
            Err(e) => {
                tracing::error!(
                    %conn_id, error = %e, "failed to encode event"
                );
            }
        }
    }
}
