//! The matchmaking queue: FIFO waiting pool and pairing scan.
//!
//! # Concurrency note
//!
//! `MatchmakingQueue` is NOT thread-safe by itself — plain collections,
//! no locks. The queue is owned by the single coordinator task and
//! every command is handled to completion before the next one.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use quizarena_countdown::CountdownHandle;
use quizarena_protocol::{
    CategoryId, MatchId, MatchMode, PlayerProfile, UserId,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::MatchmakingError;

/// How many times a survivor is re-enqueued automatically after their
/// opponent drops mid-countdown. The next failure is terminal.
const MAX_AUTO_REQUEUES: u8 = 1;

/// One waiting user's request for an opponent.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub user_id: UserId,
    pub profile: PlayerProfile,
    /// `None` is a wildcard: compatible with every category.
    pub category: Option<CategoryId>,
    pub mode: MatchMode,
    /// Determines the entry's position in the waiting pool; preserved
    /// across an automatic requeue so the survivor keeps their place.
    pub enqueued_at: Instant,
    /// Automatic re-enqueues consumed so far.
    pub retries: u8,
}

impl QueueEntry {
    /// Builds a fresh entry for a user's registration-time profile.
    pub fn new(
        profile: PlayerProfile,
        category: Option<CategoryId>,
        mode: MatchMode,
    ) -> Self {
        Self {
            user_id: profile.user_id,
            profile,
            category,
            mode,
            enqueued_at: Instant::now(),
            retries: 0,
        }
    }
}

/// Lifecycle of a pending match, strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Pair formed, participants being notified.
    Found,
    /// Start countdown is running.
    Starting,
    /// Countdown elapsed; handed off to battle execution.
    Ready,
}

/// A matched pair counting down to hand-off.
///
/// Each side keeps its original queue entry so a survivor can be
/// re-enqueued faithfully (same category, mode, and retry budget) if
/// the other side drops out.
#[derive(Debug)]
pub struct PendingMatch {
    pub match_id: MatchId,
    pub sides: [QueueEntry; 2],
    /// Category the match plays in: the one both sides named, or the
    /// one the non-wildcard side named.
    pub category: Option<CategoryId>,
    pub status: MatchStatus,
    /// Start countdown; every teardown path takes and cancels it.
    countdown: Option<CountdownHandle>,
}

/// Summary of a freshly formed pair, for event emission.
#[derive(Debug, Clone)]
pub struct MatchedPair {
    pub match_id: MatchId,
    pub category: Option<CategoryId>,
    /// Profiles of both participants, pairing order preserved
    /// (longest-waiting first).
    pub players: [PlayerProfile; 2],
}

/// Result of a successful `enqueue`.
#[derive(Debug)]
pub enum EnqueueOutcome {
    /// No compatible opponent yet; the entry is waiting.
    Searching,
    /// Paired immediately; the match countdown is running.
    Matched(MatchedPair),
}

/// Result of the disconnect hook.
#[derive(Debug)]
pub enum DisconnectOutcome {
    /// The user had no matchmaking state.
    NotQueued,
    /// The user's waiting entry was removed.
    CancelledWaiting,
    /// The user sat in a pending match, which has been torn down.
    MatchTorn {
        match_id: MatchId,
        survivor: UserId,
        requeue: RequeueOutcome,
    },
}

/// What happened to the survivor of a torn-down match.
#[derive(Debug)]
pub enum RequeueOutcome {
    /// Re-enqueued, waiting again.
    Searching,
    /// Re-enqueued and paired immediately.
    Matched(MatchedPair),
    /// The retry budget is spent; the survivor gets a terminal error.
    RetriesExhausted,
}

/// The process-wide matchmaking queue.
///
/// Invariant: a user appears at most once across the waiting pool and
/// the pending matches combined.
pub struct MatchmakingQueue {
    /// Waiting entries in arrival order, so a front-to-back scan finds
    /// the longest-waiting compatible opponent first.
    waiting: VecDeque<QueueEntry>,

    /// Pending matches by ID.
    pending: HashMap<MatchId, PendingMatch>,

    /// Which pending match a user sits in.
    user_match: HashMap<UserId, MatchId>,

    /// Match-start countdown duration.
    countdown: Duration,

    /// Where fired countdowns deliver their match ID.
    timer_tx: UnboundedSender<MatchId>,
}

impl MatchmakingQueue {
    /// Creates an empty queue whose countdowns fire on `timer_tx`.
    pub fn new(
        countdown: Duration,
        timer_tx: UnboundedSender<MatchId>,
    ) -> Self {
        Self {
            waiting: VecDeque::new(),
            pending: HashMap::new(),
            user_match: HashMap::new(),
            countdown,
            timer_tx,
        }
    }

    /// Enters a user into matchmaking and runs the pairing scan.
    ///
    /// # Errors
    /// Returns [`MatchmakingError::AlreadyQueued`] if the user already
    /// has a waiting entry or sits in a pending match.
    pub fn enqueue(
        &mut self,
        entry: QueueEntry,
    ) -> Result<EnqueueOutcome, MatchmakingError> {
        let user_id = entry.user_id;
        if self.is_queued(user_id) {
            return Err(MatchmakingError::AlreadyQueued(user_id));
        }

        tracing::debug!(
            %user_id,
            category = ?entry.category,
            mode = %entry.mode,
            "user entered matchmaking"
        );
        Ok(self.pair_or_wait(entry))
    }

    /// Withdraws the user's waiting entry, if any.
    ///
    /// A no-op for users who are not waiting — including users already
    /// inside a pending match, whose exit path is the disconnect hook.
    /// Returns `true` if an entry was removed. Emits nothing to anyone.
    pub fn cancel(&mut self, user_id: UserId) -> bool {
        if let Some(idx) =
            self.waiting.iter().position(|e| e.user_id == user_id)
        {
            self.waiting.remove(idx);
            tracing::debug!(%user_id, "matchmaking cancelled");
            true
        } else {
            false
        }
    }

    /// Disconnect hook: removes the user's matchmaking state.
    ///
    /// If the user sat in a pending match that had not reached `ready`,
    /// the match is torn down (countdown cancelled) and the survivor is
    /// re-enqueued automatically at most once.
    pub fn on_disconnect(&mut self, user_id: UserId) -> DisconnectOutcome {
        if self.cancel(user_id) {
            return DisconnectOutcome::CancelledWaiting;
        }

        let Some(match_id) = self.user_match.remove(&user_id) else {
            return DisconnectOutcome::NotQueued;
        };
        let mut pm = self
            .pending
            .remove(&match_id)
            .expect("user_match entry always has a pending match");
        if let Some(handle) = pm.countdown.take() {
            handle.cancel();
        }

        let [a, b] = pm.sides;
        let mut survivor_entry = if a.user_id == user_id { b } else { a };
        let survivor = survivor_entry.user_id;
        self.user_match.remove(&survivor);

        tracing::warn!(
            %match_id, departed = %user_id, %survivor,
            "pending match torn down by disconnect"
        );

        let requeue = if survivor_entry.retries >= MAX_AUTO_REQUEUES {
            tracing::warn!(
                user_id = %survivor,
                "retry budget spent, surfacing terminal matchmaking error"
            );
            RequeueOutcome::RetriesExhausted
        } else {
            survivor_entry.retries += 1;
            match self.pair_or_wait(survivor_entry) {
                EnqueueOutcome::Searching => RequeueOutcome::Searching,
                EnqueueOutcome::Matched(pair) => {
                    RequeueOutcome::Matched(pair)
                }
            }
        };

        DisconnectOutcome::MatchTorn {
            match_id,
            survivor,
            requeue,
        }
    }

    /// Countdown hook: advances the match to `ready` and destroys it.
    ///
    /// Returns both participants for the `match_ready` emission, or
    /// `None` for a stale firing against an already-torn-down match.
    pub fn on_countdown(
        &mut self,
        match_id: MatchId,
    ) -> Option<[UserId; 2]> {
        let Some(mut pm) = self.pending.remove(&match_id) else {
            tracing::warn!(%match_id, "stale match countdown ignored");
            return None;
        };
        pm.status = MatchStatus::Ready;
        pm.countdown = None;

        let users = [pm.sides[0].user_id, pm.sides[1].user_id];
        for user in users {
            self.user_match.remove(&user);
        }
        tracing::info!(%match_id, "match ready, handing off");
        Some(users)
    }

    /// Returns `true` if the user is waiting or in a pending match.
    pub fn is_queued(&self, user_id: UserId) -> bool {
        self.user_match.contains_key(&user_id)
            || self.waiting.iter().any(|e| e.user_id == user_id)
    }

    /// Number of entries in the waiting pool.
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Number of pending (found/starting) matches.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Looks up a pending match by ID.
    pub fn pending_match(&self, match_id: MatchId) -> Option<&PendingMatch> {
        self.pending.get(&match_id)
    }

    // -- Internals --------------------------------------------------------

    /// Scans for the oldest compatible waiter; pairs with it or parks
    /// the entry in the pool, ordered by `enqueued_at`.
    fn pair_or_wait(&mut self, entry: QueueEntry) -> EnqueueOutcome {
        let found = self.waiting.iter().position(|w| {
            w.mode == entry.mode
                && categories_compatible(w.category, entry.category)
        });

        match found {
            Some(idx) => {
                let opponent = self
                    .waiting
                    .remove(idx)
                    .expect("position came from this deque");
                EnqueueOutcome::Matched(self.create_match(opponent, entry))
            }
            None => {
                // Fresh entries land at the back; a requeued survivor
                // keeps its original wait and slots back in ahead of
                // everyone who arrived after it.
                let idx = self
                    .waiting
                    .iter()
                    .position(|w| w.enqueued_at > entry.enqueued_at)
                    .unwrap_or(self.waiting.len());
                self.waiting.insert(idx, entry);
                EnqueueOutcome::Searching
            }
        }
    }

    /// Forms a pending match and starts its countdown.
    ///
    /// `older` waited longer and comes first in the pair.
    fn create_match(
        &mut self,
        older: QueueEntry,
        newer: QueueEntry,
    ) -> MatchedPair {
        let match_id = MatchId::allocate();
        let category = older.category.or(newer.category);
        let players = [older.profile.clone(), newer.profile.clone()];

        self.user_match.insert(older.user_id, match_id);
        self.user_match.insert(newer.user_id, match_id);

        let mut pm = PendingMatch {
            match_id,
            sides: [older, newer],
            category,
            status: MatchStatus::Found,
            countdown: None,
        };
        tracing::info!(
            %match_id,
            a = %pm.sides[0].user_id,
            b = %pm.sides[1].user_id,
            category = ?category,
            "opponents paired"
        );

        pm.status = MatchStatus::Starting;
        pm.countdown = Some(CountdownHandle::schedule(
            self.countdown,
            self.timer_tx.clone(),
            match_id,
        ));
        self.pending.insert(match_id, pm);

        MatchedPair {
            match_id,
            category,
            players,
        }
    }

}

/// Wildcard (no category) is compatible with everything; otherwise the
/// categories must be equal.
fn categories_compatible(
    a: Option<CategoryId>,
    b: Option<CategoryId>,
) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! All queue mutations spawn countdown tasks, so every test runs
    //! under a tokio runtime; timer-sensitive cases use a paused clock.

    use super::*;
    use tokio::sync::mpsc;

    // -- Helpers ----------------------------------------------------------

    fn profile(id: u64) -> PlayerProfile {
        PlayerProfile {
            user_id: UserId(id),
            name: format!("player-{id}"),
            level: 1,
        }
    }

    fn entry(id: u64, category: Option<u64>, mode: MatchMode) -> QueueEntry {
        QueueEntry::new(profile(id), category.map(CategoryId), mode)
    }

    fn wildcard(id: u64) -> QueueEntry {
        entry(id, None, MatchMode::Classic)
    }

    fn queue() -> (MatchmakingQueue, mpsc::UnboundedReceiver<MatchId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MatchmakingQueue::new(Duration::from_secs(3), tx), rx)
    }

    // =====================================================================
    // enqueue()
    // =====================================================================

    #[tokio::test]
    async fn test_enqueue_alone_is_searching() {
        let (mut q, _rx) = queue();

        let outcome = q.enqueue(wildcard(1)).unwrap();

        assert!(matches!(outcome, EnqueueOutcome::Searching));
        assert_eq!(q.waiting_len(), 1);
        assert!(q.is_queued(UserId(1)));
    }

    #[tokio::test]
    async fn test_enqueue_twice_is_already_queued() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();

        let result = q.enqueue(wildcard(1));

        assert!(matches!(
            result,
            Err(MatchmakingError::AlreadyQueued(u)) if u == UserId(1)
        ));
        assert_eq!(q.waiting_len(), 1);
    }

    #[tokio::test]
    async fn test_two_wildcards_pair_immediately_and_pool_empties() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();

        let outcome = q.enqueue(wildcard(2)).unwrap();

        let EnqueueOutcome::Matched(pair) = outcome else {
            panic!("expected a match");
        };
        assert_eq!(pair.players[0].user_id, UserId(1));
        assert_eq!(pair.players[1].user_id, UserId(2));
        assert_eq!(q.waiting_len(), 0);
        assert_eq!(q.pending_len(), 1);
        // Both users now count as queued (pending match).
        assert!(q.is_queued(UserId(1)));
        assert!(q.is_queued(UserId(2)));
    }

    #[tokio::test]
    async fn test_enqueue_while_in_pending_match_is_already_queued() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        q.enqueue(wildcard(2)).unwrap();

        let result = q.enqueue(wildcard(1));

        assert!(matches!(
            result,
            Err(MatchmakingError::AlreadyQueued(_))
        ));
    }

    #[tokio::test]
    async fn test_pairing_is_fifo_fair() {
        // W1, W2, W3 wait in that order, pairwise incompatible so all
        // three coexist; a wildcard 4th is compatible with every one of
        // them and must pair with the longest-waiting, W1.
        let (mut q, _rx) = queue();
        q.enqueue(entry(1, Some(1), MatchMode::Classic)).unwrap();
        q.enqueue(entry(2, Some(2), MatchMode::Classic)).unwrap();
        q.enqueue(entry(3, Some(3), MatchMode::Classic)).unwrap();
        assert_eq!(q.waiting_len(), 3);

        let outcome = q.enqueue(wildcard(4)).unwrap();

        let EnqueueOutcome::Matched(pair) = outcome else {
            panic!("expected a match");
        };
        assert_eq!(pair.players[0].user_id, UserId(1));
        assert_eq!(pair.players[1].user_id, UserId(4));
        assert_eq!(q.waiting_len(), 2);
    }

    #[tokio::test]
    async fn test_category_mismatch_does_not_pair() {
        let (mut q, _rx) = queue();
        q.enqueue(entry(1, Some(1), MatchMode::Classic)).unwrap();

        let outcome =
            q.enqueue(entry(2, Some(2), MatchMode::Classic)).unwrap();

        assert!(matches!(outcome, EnqueueOutcome::Searching));
        assert_eq!(q.waiting_len(), 2);
    }

    #[tokio::test]
    async fn test_wildcard_pairs_with_category_and_match_adopts_it() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();

        let outcome =
            q.enqueue(entry(2, Some(5), MatchMode::Classic)).unwrap();

        let EnqueueOutcome::Matched(pair) = outcome else {
            panic!("expected a match");
        };
        assert_eq!(pair.category, Some(CategoryId(5)));
    }

    #[tokio::test]
    async fn test_mode_mismatch_never_pairs() {
        let (mut q, _rx) = queue();
        q.enqueue(entry(1, None, MatchMode::Classic)).unwrap();

        let outcome =
            q.enqueue(entry(2, None, MatchMode::Ranked)).unwrap();

        assert!(matches!(outcome, EnqueueOutcome::Searching));
        assert_eq!(q.waiting_len(), 2);
    }

    // =====================================================================
    // cancel()
    // =====================================================================

    #[tokio::test]
    async fn test_cancel_removes_waiting_entry() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();

        assert!(q.cancel(UserId(1)));
        assert_eq!(q.waiting_len(), 0);
        assert!(!q.is_queued(UserId(1)));
    }

    #[tokio::test]
    async fn test_cancel_unknown_user_is_noop() {
        let (mut q, _rx) = queue();
        assert!(!q.cancel(UserId(99)));
    }

    #[tokio::test]
    async fn test_cancel_while_in_pending_match_is_noop() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        q.enqueue(wildcard(2)).unwrap();

        assert!(!q.cancel(UserId(1)));
        assert_eq!(q.pending_len(), 1);
        assert!(q.is_queued(UserId(1)));
    }

    #[tokio::test]
    async fn test_user_never_queued_twice_across_sequences() {
        // Mixed enqueue/cancel churn keeps the at-most-once invariant.
        let (mut q, _rx) = queue();
        q.enqueue(entry(1, Some(1), MatchMode::Classic)).unwrap();
        q.cancel(UserId(1));
        q.enqueue(entry(1, Some(2), MatchMode::Classic)).unwrap();
        q.cancel(UserId(1));
        q.enqueue(wildcard(1)).unwrap();

        let waiting_count = usize::from(q.is_queued(UserId(1)));
        assert_eq!(waiting_count, 1);
        assert_eq!(q.waiting_len(), 1);
    }

    // =====================================================================
    // on_disconnect()
    // =====================================================================

    #[tokio::test]
    async fn test_disconnect_waiting_user_cancels_entry() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();

        let outcome = q.on_disconnect(UserId(1));

        assert!(matches!(outcome, DisconnectOutcome::CancelledWaiting));
        assert_eq!(q.waiting_len(), 0);
    }

    #[tokio::test]
    async fn test_disconnect_unknown_user_is_not_queued() {
        let (mut q, _rx) = queue();
        assert!(matches!(
            q.on_disconnect(UserId(7)),
            DisconnectOutcome::NotQueued
        ));
    }

    #[tokio::test]
    async fn test_disconnect_mid_countdown_requeues_survivor_once() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        q.enqueue(wildcard(2)).unwrap();

        let outcome = q.on_disconnect(UserId(1));

        let DisconnectOutcome::MatchTorn {
            survivor, requeue, ..
        } = outcome
        else {
            panic!("expected a torn match");
        };
        assert_eq!(survivor, UserId(2));
        assert!(matches!(requeue, RequeueOutcome::Searching));
        assert_eq!(q.pending_len(), 0);
        assert_eq!(q.waiting_len(), 1);
        assert!(q.is_queued(UserId(2)));
    }

    #[tokio::test]
    async fn test_second_teardown_exhausts_retries() {
        let (mut q, _rx) = queue();
        // First match: 1 vs 2; 1 drops, 2 is re-enqueued.
        q.enqueue(wildcard(1)).unwrap();
        q.enqueue(wildcard(2)).unwrap();
        q.on_disconnect(UserId(1));

        // Second match: 3 arrives and pairs with the re-enqueued 2.
        let outcome = q.enqueue(wildcard(3)).unwrap();
        assert!(matches!(outcome, EnqueueOutcome::Matched(_)));

        // 3 drops too — 2's retry budget is spent.
        let outcome = q.on_disconnect(UserId(3));
        let DisconnectOutcome::MatchTorn {
            survivor, requeue, ..
        } = outcome
        else {
            panic!("expected a torn match");
        };
        assert_eq!(survivor, UserId(2));
        assert!(matches!(requeue, RequeueOutcome::RetriesExhausted));
        assert!(!q.is_queued(UserId(2)));
        assert_eq!(q.waiting_len(), 0);
        assert_eq!(q.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_survivor_rematches_immediately_when_waiter_exists() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        q.enqueue(wildcard(2)).unwrap();
        // A compatible third user waits while 1 and 2 count down.
        q.enqueue(wildcard(3)).unwrap();

        let outcome = q.on_disconnect(UserId(1));

        let DisconnectOutcome::MatchTorn { requeue, .. } = outcome else {
            panic!("expected a torn match");
        };
        let RequeueOutcome::Matched(pair) = requeue else {
            panic!("expected an immediate rematch");
        };
        // FIFO: the waiting user 3 is the older side of the new pair.
        assert_eq!(pair.players[0].user_id, UserId(3));
        assert_eq!(pair.players[1].user_id, UserId(2));
        assert_eq!(q.waiting_len(), 0);
        assert_eq!(q.pending_len(), 1);
    }

    #[tokio::test]
    async fn test_requeued_survivor_keeps_queue_position() {
        let (mut q, _rx) = queue();
        // 1 and 2 pair on category 1 and start counting down.
        q.enqueue(entry(1, Some(1), MatchMode::Classic)).unwrap();
        q.enqueue(entry(2, Some(1), MatchMode::Classic)).unwrap();
        // 3 arrives well after 2 originally enqueued, and is
        // incompatible with 2, so both end up waiting side by side.
        let mut late = entry(3, Some(2), MatchMode::Classic);
        late.enqueued_at += Duration::from_secs(60);
        q.enqueue(late).unwrap();

        let outcome = q.on_disconnect(UserId(1));
        assert!(matches!(
            outcome,
            DisconnectOutcome::MatchTorn {
                requeue: RequeueOutcome::Searching,
                ..
            }
        ));
        assert_eq!(q.waiting_len(), 2);

        // A wildcard is compatible with both waiters; it must pair
        // with the survivor, whose original wait predates 3's.
        let EnqueueOutcome::Matched(pair) =
            q.enqueue(wildcard(4)).unwrap()
        else {
            panic!("expected a match");
        };
        assert_eq!(pair.players[0].user_id, UserId(2));
        assert_eq!(pair.players[1].user_id, UserId(4));
    }

    // =====================================================================
    // on_countdown()
    // =====================================================================

    #[tokio::test]
    async fn test_countdown_makes_match_ready_and_frees_users() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        let EnqueueOutcome::Matched(pair) =
            q.enqueue(wildcard(2)).unwrap()
        else {
            panic!("expected a match");
        };

        let users = q.on_countdown(pair.match_id).unwrap();

        assert_eq!(users, [UserId(1), UserId(2)]);
        assert_eq!(q.pending_len(), 0);
        // Hand-off frees both users to queue again.
        assert!(q.enqueue(wildcard(1)).is_ok());
    }

    #[tokio::test]
    async fn test_stale_countdown_is_ignored() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        let EnqueueOutcome::Matched(pair) =
            q.enqueue(wildcard(2)).unwrap()
        else {
            panic!("expected a match");
        };
        q.on_disconnect(UserId(1)); // tears the match down

        assert!(q.on_countdown(pair.match_id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_fires_on_timer_channel() {
        let (mut q, mut rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        let EnqueueOutcome::Matched(pair) =
            q.enqueue(wildcard(2)).unwrap()
        else {
            panic!("expected a match");
        };

        tokio::time::advance(Duration::from_secs(4)).await;
        tokio::task::yield_now().await;

        assert_eq!(rx.try_recv().unwrap(), pair.match_id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_countdown_timer() {
        let (mut q, mut rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        q.enqueue(wildcard(2)).unwrap();
        q.on_disconnect(UserId(1));
        // Survivor is waiting again; no pending match remains.

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;

        assert!(
            rx.try_recv().is_err(),
            "cancelled match countdown must never fire"
        );
    }

    #[tokio::test]
    async fn test_pending_match_status_is_starting() {
        let (mut q, _rx) = queue();
        q.enqueue(wildcard(1)).unwrap();
        let EnqueueOutcome::Matched(pair) =
            q.enqueue(wildcard(2)).unwrap()
        else {
            panic!("expected a match");
        };

        let pm = q.pending_match(pair.match_id).unwrap();
        assert_eq!(pm.status, MatchStatus::Starting);
        assert_eq!(pm.sides[0].user_id, UserId(1));
    }
}
