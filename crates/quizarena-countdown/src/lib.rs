//! Cancellable one-shot countdown timers for QuizArena.
//!
//! Match-start and room-start countdowns are the only timers in the
//! coordinator, and both share the same shape: sleep for a fixed
//! duration, then deliver one message into the coordinator loop. The
//! aggregate that scheduled the countdown owns the [`CountdownHandle`]
//! and must cancel it on every teardown path (leave, cancel,
//! disconnect, destroy) so a stale transition can never fire against a
//! torn-down aggregate.
//!
//! # Integration
//!
//! ```ignore
//! // On the aggregate:
//! room.countdown = Some(CountdownHandle::schedule(
//!     Duration::from_secs(5),
//!     timer_tx.clone(),
//!     room.code.clone(),
//! ));
//!
//! // On every teardown path:
//! if let Some(handle) = room.countdown.take() {
//!     handle.cancel();
//! }
//! ```

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// An owned handle to a pending countdown.
///
/// Dropping the handle aborts the underlying task, so a forgotten
/// teardown path still cannot leak a live timer; [`cancel`] is the
/// explicit form every deliberate teardown should use.
///
/// [`cancel`]: CountdownHandle::cancel
#[derive(Debug)]
pub struct CountdownHandle {
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Spawns a task that sleeps for `after`, then sends `msg` on `tx`.
    ///
    /// The send is best-effort: if the receiving loop is gone the
    /// message is dropped silently, which only happens during process
    /// shutdown.
    pub fn schedule<T: Send + 'static>(
        after: Duration,
        tx: UnboundedSender<T>,
        msg: T,
    ) -> Self {
        let sleep = tokio::time::sleep(after);
        let task = tokio::spawn(async move {
            sleep.await;
            let _ = tx.send(msg);
        });
        Self { task }
    }

    /// Cancels the countdown. The message will never be delivered.
    pub fn cancel(self) {
        self.task.abort();
        tracing::trace!("countdown cancelled");
    }

    /// Returns `true` once the countdown has fired (or been aborted).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
