//! Mutex-guarded shared counter
//!
//! `SharedCounter` is the smallest "protect shared state" building block:
//! a signed count whose safe operations hold a guard across the whole
//! read-modify-write. It doubles as a race demonstrator: the
//! `_unsynchronized` variants perform the same three-step
//! load/modify/store without the guard, so concurrent callers lose
//! updates exactly the way an unprotected `value += n` does.
//!
//! The storage itself is an `AtomicI64` accessed with `Relaxed`
//! load/store pairs. That keeps the unsynchronized path free of
//! undefined behavior (no torn reads) while leaving the logical
//! read-modify-write race fully intact, which is the point.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// A shared counter with both guarded and deliberately racy operations
#[derive(Debug, Default)]
pub struct SharedCounter {
    /// The count. Safe operations only touch this while `guard` is held.
    value: AtomicI64,

    /// Serializes the safe read-modify-write operations
    guard: Mutex<()>,
}

impl SharedCounter {
    /// Create a counter with an initial value
    pub fn new(initial: i64) -> Self {
        Self {
            value: AtomicI64::new(initial),
            guard: Mutex::new(()),
        }
    }

    /// Add `n` to the counter under the guard
    pub fn increment(&self, n: i64) {
        let _guard = self.guard.lock();
        let current = self.value.load(Ordering::Relaxed);
        self.value.store(current + n, Ordering::Relaxed);
    }

    /// Subtract `n` from the counter under the guard
    pub fn decrement(&self, n: i64) {
        self.increment(-n);
    }

    /// Read the current value under the guard (never torn)
    pub fn get(&self) -> i64 {
        let _guard = self.guard.lock();
        self.value.load(Ordering::Relaxed)
    }

    /// Add `n` without taking the guard
    ///
    /// This is the race demonstrator: two concurrent calls can both load
    /// the same value and one of the stores wins, losing the other
    /// update. Use [`increment`](Self::increment) for correct counting.
    pub fn increment_unsynchronized(&self, n: i64) {
        let current = self.value.load(Ordering::Relaxed);
        self.value.store(current + n, Ordering::Relaxed);
    }

    /// Subtract `n` without taking the guard (see
    /// [`increment_unsynchronized`](Self::increment_unsynchronized))
    pub fn decrement_unsynchronized(&self, n: i64) {
        self.increment_unsynchronized(-n);
    }
}
