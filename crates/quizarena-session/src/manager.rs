//! The connection registry: user identity ↔ live connection.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is NOT thread-safe by itself — plain `HashMap`s,
//! no locks. This is intentional: the registry is owned by the single
//! coordinator task, and every command is handled to completion before
//! the next one is dequeued.

use std::collections::HashMap;

use quizarena_protocol::{PlayerProfile, UserId};
use quizarena_transport::ConnectionId;

/// A user's live registration: the connection they speak through and
/// the profile cached for them at registration time.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub profile: PlayerProfile,
}

/// Tracks which user is on which connection.
///
/// Invariant: at most one active connection per user. A fresh
/// registration supersedes the old mapping, and the two maps are kept
/// in sync so a superseded connection's later close finds nothing to
/// evict (the stale-unregister guard falls out of that for free).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Current registration per user.
    users: HashMap<UserId, Registration>,

    /// Reverse index: which user a connection currently speaks for.
    connections: HashMap<ConnectionId, UserId>,
}

impl ConnectionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `user_id` with `connection_id`, caching `profile`.
    ///
    /// Idempotent, and overwrites any prior mapping for that user.
    /// Returns the superseded connection if one existed — the caller
    /// decides whether anything needs to happen to it (here: nothing;
    /// routing simply stops reaching it).
    pub fn register(
        &mut self,
        user_id: UserId,
        connection_id: ConnectionId,
        profile: PlayerProfile,
    ) -> Option<ConnectionId> {
        let superseded = match self.users.insert(
            user_id,
            Registration {
                user_id,
                connection_id,
                profile,
            },
        ) {
            Some(old) if old.connection_id != connection_id => {
                self.connections.remove(&old.connection_id);
                Some(old.connection_id)
            }
            _ => None,
        };

        self.connections.insert(connection_id, user_id);

        if let Some(old) = superseded {
            tracing::info!(
                %user_id, %connection_id, superseded = %old,
                "registration superseded previous connection"
            );
        } else {
            tracing::info!(%user_id, %connection_id, "user registered");
        }
        superseded
    }

    /// Returns the connection a user is currently reachable on.
    pub fn lookup(&self, user_id: UserId) -> Option<ConnectionId> {
        self.users.get(&user_id).map(|r| r.connection_id)
    }

    /// Returns the profile cached for a user at registration time.
    pub fn profile(&self, user_id: UserId) -> Option<&PlayerProfile> {
        self.users.get(&user_id).map(|r| &r.profile)
    }

    /// Returns the user a connection currently speaks for.
    pub fn user_for(&self, connection_id: ConnectionId) -> Option<UserId> {
        self.connections.get(&connection_id).copied()
    }

    /// Removes the mapping for a closing connection.
    ///
    /// Returns the user that was evicted, or `None` if the connection
    /// was unknown or already superseded by a fresh registration — a
    /// stale unregister racing a reconnect must not evict the new
    /// mapping.
    pub fn unregister(
        &mut self,
        connection_id: ConnectionId,
    ) -> Option<UserId> {
        let user_id = self.connections.remove(&connection_id)?;
        self.users.remove(&user_id);
        tracing::info!(%user_id, %connection_id, "user unregistered");
        Some(user_id)
    }

    /// Drops a user's registration regardless of connection.
    ///
    /// Used when a connection re-registers as a different user: the
    /// previous identity is torn down without closing the socket.
    pub fn remove_user(&mut self, user_id: UserId) -> Option<ConnectionId> {
        let reg = self.users.remove(&user_id)?;
        self.connections.remove(&reg.connection_id);
        tracing::debug!(%user_id, "registration removed");
        Some(reg.connection_id)
    }

    /// Returns the number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: u64) -> PlayerProfile {
        PlayerProfile {
            user_id: UserId(id),
            name: format!("player-{id}"),
            level: 1,
        }
    }

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_register_then_lookup() {
        let mut reg = ConnectionRegistry::new();

        let superseded = reg.register(UserId(1), conn(10), profile(1));

        assert!(superseded.is_none());
        assert_eq!(reg.lookup(UserId(1)), Some(conn(10)));
        assert_eq!(reg.user_for(conn(10)), Some(UserId(1)));
        assert_eq!(reg.profile(UserId(1)).unwrap().name, "player-1");
    }

    #[test]
    fn test_register_reconnect_supersedes_old_connection() {
        let mut reg = ConnectionRegistry::new();
        reg.register(UserId(1), conn(10), profile(1));

        let superseded = reg.register(UserId(1), conn(20), profile(1));

        assert_eq!(superseded, Some(conn(10)));
        assert_eq!(reg.lookup(UserId(1)), Some(conn(20)));
        // The old connection no longer speaks for anyone.
        assert_eq!(reg.user_for(conn(10)), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_same_connection_is_idempotent() {
        let mut reg = ConnectionRegistry::new();
        reg.register(UserId(1), conn(10), profile(1));

        let superseded = reg.register(UserId(1), conn(10), profile(1));

        assert!(superseded.is_none());
        assert_eq!(reg.lookup(UserId(1)), Some(conn(10)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unregister_removes_mapping() {
        let mut reg = ConnectionRegistry::new();
        reg.register(UserId(1), conn(10), profile(1));

        assert_eq!(reg.unregister(conn(10)), Some(UserId(1)));
        assert_eq!(reg.lookup(UserId(1)), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_unregister_unknown_connection_is_none() {
        let mut reg = ConnectionRegistry::new();
        assert_eq!(reg.unregister(conn(99)), None);
    }

    #[test]
    fn test_stale_unregister_does_not_evict_fresh_registration() {
        // User reconnects on C2, then the close of old C1 arrives late.
        let mut reg = ConnectionRegistry::new();
        reg.register(UserId(1), conn(10), profile(1));
        reg.register(UserId(1), conn(20), profile(1));

        assert_eq!(reg.unregister(conn(10)), None);

        // The fresh mapping survives.
        assert_eq!(reg.lookup(UserId(1)), Some(conn(20)));
        assert_eq!(reg.user_for(conn(20)), Some(UserId(1)));
    }

    #[test]
    fn test_remove_user_drops_both_directions() {
        let mut reg = ConnectionRegistry::new();
        reg.register(UserId(1), conn(10), profile(1));

        assert_eq!(reg.remove_user(UserId(1)), Some(conn(10)));
        assert_eq!(reg.lookup(UserId(1)), None);
        assert_eq!(reg.user_for(conn(10)), None);
    }

    #[test]
    fn test_multiple_users_independent() {
        let mut reg = ConnectionRegistry::new();
        reg.register(UserId(1), conn(10), profile(1));
        reg.register(UserId(2), conn(20), profile(2));

        assert_eq!(reg.len(), 2);
        reg.unregister(conn(10));

        assert_eq!(reg.lookup(UserId(1)), None);
        assert_eq!(reg.lookup(UserId(2)), Some(conn(20)));
    }
}
