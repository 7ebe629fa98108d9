//! Condition-variable-gated bounded quantity
//!
//! `BoundedResource` models a quantity (a balance, a pool of permits)
//! that consumers draw down and producers replenish. A withdraw for more
//! than is available blocks until deposits cover it; the quantity is
//! never observable below zero.
//!
//! The withdraw path is the classic condition-wait loop: check the
//! predicate, wait while it is false, re-check after every wake. Deposits
//! broadcast rather than signal one waiter, because a single deposit may
//! satisfy several distinct withdraw thresholds.

use crate::error::{UsageError, UsageResult};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tracing::trace;

/// A guarded quantity that blocks withdrawals until covered
#[derive(Debug)]
pub struct BoundedResource {
    /// Available quantity; read and compared-then-mutated only under the guard
    quantity: Mutex<u64>,

    /// Signaled (broadcast) on every deposit
    available: Condvar,
}

impl BoundedResource {
    /// Create a resource with an initial quantity
    pub fn new(initial: u64) -> Self {
        Self {
            quantity: Mutex::new(initial),
            available: Condvar::new(),
        }
    }

    /// Add `n` to the quantity and wake all waiters
    pub fn deposit(&self, n: u64) -> UsageResult<()> {
        if n == 0 {
            return Err(UsageError::ZeroAmount {
                operation: "deposit",
            });
        }
        let mut quantity = self.quantity.lock();
        *quantity += n;
        trace!(quantity = *quantity, deposited = n, "deposit");
        // Broadcast: the deposited amount may satisfy multiple waiters
        // with different thresholds, or one large waiter that several
        // smaller ones were queued behind.
        self.available.notify_all();
        Ok(())
    }

    /// Withdraw `n`, blocking until the quantity covers it
    ///
    /// The decrement happens atomically with the final predicate check,
    /// under the guard, so the quantity can never go negative.
    pub fn withdraw(&self, n: u64) -> UsageResult<()> {
        if n == 0 {
            return Err(UsageError::ZeroAmount {
                operation: "withdraw",
            });
        }
        let mut quantity = self.quantity.lock();
        while *quantity < n {
            // Signals are not matched 1:1 to a waiter's threshold, so
            // the predicate must be re-checked after every wake.
            self.available.wait(&mut quantity);
        }
        *quantity -= n;
        trace!(quantity = *quantity, withdrew = n, "withdraw");
        Ok(())
    }

    /// Withdraw `n` with a deadline
    ///
    /// Returns `Ok(true)` on success, `Ok(false)` if the timeout expired
    /// first. A timed-out withdraw leaves the quantity untouched (no
    /// partial decrement), so the caller can retry.
    pub fn withdraw_timeout(&self, n: u64, timeout: Duration) -> UsageResult<bool> {
        if n == 0 {
            return Err(UsageError::ZeroAmount {
                operation: "withdraw",
            });
        }
        let deadline = Instant::now() + timeout;
        let mut quantity = self.quantity.lock();
        while *quantity < n {
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            if self
                .available
                .wait_for(&mut quantity, deadline - now)
                .timed_out()
                && *quantity < n
            {
                return Ok(false);
            }
        }
        *quantity -= n;
        trace!(quantity = *quantity, withdrew = n, "withdraw (timed)");
        Ok(true)
    }

    /// Read the current quantity under the guard
    pub fn quantity(&self) -> u64 {
        *self.quantity.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_withdraw_covered_immediately() {
        let resource = BoundedResource::new(100);
        resource.withdraw(40).unwrap();
        assert_eq!(resource.quantity(), 60);
    }

    #[test]
    fn test_zero_amounts_are_usage_errors() {
        let resource = BoundedResource::new(10);
        assert!(matches!(
            resource.deposit(0),
            Err(UsageError::ZeroAmount { operation: "deposit" })
        ));
        assert!(matches!(
            resource.withdraw(0),
            Err(UsageError::ZeroAmount { operation: "withdraw" })
        ));
        assert_eq!(resource.quantity(), 10);
    }

    #[test]
    fn test_blocked_withdraw_unblocks_on_deposit() {
        let resource = Arc::new(BoundedResource::new(5));

        let withdrawer = Arc::clone(&resource);
        let handle = thread::spawn(move || {
            // Blocks: only 5 available, 20 requested.
            withdrawer.withdraw(20).unwrap();
            withdrawer.quantity()
        });

        // Deposit after a deliberate delay so the withdrawer is parked
        // in its condition wait, not racing past it.
        thread::sleep(Duration::from_millis(50));
        resource.deposit(15).unwrap();

        let after = handle.join().unwrap();
        assert_eq!(after, 0);
    }

    #[test]
    fn test_withdraw_timeout_leaves_quantity_intact() {
        let resource = BoundedResource::new(5);
        assert!(!resource.withdraw_timeout(20, Duration::from_millis(50)).unwrap());
        assert_eq!(resource.quantity(), 5);

        // Retry after covering the shortfall succeeds.
        resource.deposit(15).unwrap();
        assert!(resource.withdraw_timeout(20, Duration::from_millis(50)).unwrap());
        assert_eq!(resource.quantity(), 0);
    }

    #[test]
    fn test_never_observably_negative() {
        let resource = Arc::new(BoundedResource::new(100));
        let mut handles = Vec::new();

        // Spendy: 50 withdrawals of 20.
        for _ in 0..5 {
            let r = Arc::clone(&resource);
            handles.push(thread::spawn(move || {
                for _ in 0..10 {
                    r.withdraw(20).unwrap();
                }
            }));
        }

        // Stingy: 100 deposits of 10 covers the withdrawals exactly.
        for _ in 0..5 {
            let r = Arc::clone(&resource);
            handles.push(thread::spawn(move || {
                for _ in 0..20 {
                    r.deposit(10).unwrap();
                }
            }));
        }

        // Observer: the quantity is u64 and every mutation is guarded,
        // so any read is a valid non-negative intermediate value.
        for handle in handles {
            handle.join().unwrap();
        }

        // 100 initial + 1000 deposited - 1000 withdrawn.
        assert_eq!(resource.quantity(), 100);
    }
}
