//! Coordinator configuration.

use std::time::Duration;

/// Tunables for the coordinator loop.
///
/// Countdowns are expressed in whole seconds because the same numbers
/// are sent to clients in `match_starting` / `room_starting` payloads.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
    /// Match-start countdown after a pair is formed.
    pub match_countdown_secs: u64,

    /// Room-start countdown after the host starts the game.
    pub room_countdown_secs: u64,

    /// Wait estimate reported in `matchmaking_update`. A fixed figure;
    /// the queue keeps no latency statistics.
    pub estimated_wait_secs: u64,
}

impl CoordinatorConfig {
    pub fn match_countdown(&self) -> Duration {
        Duration::from_secs(self.match_countdown_secs)
    }

    pub fn room_countdown(&self) -> Duration {
        Duration::from_secs(self.room_countdown_secs)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            match_countdown_secs: 3,
            room_countdown_secs: 3,
            estimated_wait_secs: 15,
        }
    }
}
