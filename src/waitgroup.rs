//! Completion barrier for groups of tasks
//!
//! A `WaitGroup` tracks a count of outstanding tasks and blocks waiters
//! until the count reaches zero. Call `add(n)` *before* dispatching the
//! n tasks, have each task call `done()` when it finishes, and `wait()`
//! wherever you need all of them to have completed.
//!
//! Waiting is a condition wait, not a poll loop: the waiter releases the
//! guard and suspends atomically, so concurrent `add`/`done` calls are
//! never starved and no wakeup is lost.

use crate::error::{UsageError, UsageResult};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tracing::trace;

/// Tracks outstanding tasks and wakes waiters when all are done
#[derive(Debug, Default)]
pub struct WaitGroup {
    /// Count of outstanding tasks
    pending: Mutex<usize>,

    /// Signaled when `pending` drops to zero
    all_done: Condvar,
}

impl WaitGroup {
    /// Create a wait group with no outstanding tasks
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `n` tasks about to be dispatched
    ///
    /// Must be called before the corresponding tasks start, otherwise a
    /// concurrent `wait()` may observe a zero count and return early.
    /// That ordering is a caller obligation, not enforced here.
    /// `add(0)` is a no-op.
    pub fn add(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut pending = self.pending.lock();
        *pending += n;
        trace!(pending = *pending, added = n, "wait group add");
    }

    /// Mark one task as finished
    ///
    /// Wakes all waiters when the count reaches zero. Returns
    /// `UsageError::UnbalancedDone` if the count is already zero (more
    /// `done` calls than `add`ed tasks).
    pub fn done(&self) -> UsageResult<()> {
        let mut pending = self.pending.lock();
        if *pending == 0 {
            return Err(UsageError::UnbalancedDone);
        }
        *pending -= 1;
        trace!(pending = *pending, "wait group done");
        if *pending == 0 {
            self.all_done.notify_all();
        }
        Ok(())
    }

    /// Block until every registered task has called `done()`
    ///
    /// Returns immediately if no tasks are outstanding.
    pub fn wait(&self) {
        let mut pending = self.pending.lock();
        while *pending > 0 {
            self.all_done.wait(&mut pending);
        }
    }

    /// Block until all tasks are done or the timeout expires
    ///
    /// Returns `true` if the count reached zero before the deadline,
    /// `false` on expiry. A timed-out wait leaves the group valid for
    /// retry.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();
        while *pending > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            // Spurious wakeups and wakeups for a still-nonzero count
            // loop back to re-check the predicate with the time left.
            if self.all_done.wait_for(&mut pending, deadline - now).timed_out() && *pending > 0 {
                return false;
            }
        }
        true
    }

    /// Current count of outstanding tasks
    pub fn pending(&self) -> usize {
        *self.pending.lock()
    }
}
