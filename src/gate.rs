//! Admission gate bounding concurrently live tasks
//!
//! Unbounded fan-out (one thread per subdirectory) is fine for small
//! trees and exhausts the machine on deep or wide ones. `AdmissionGate`
//! is a drop-in wrapper around `thread::spawn` that caps how many
//! spawned tasks are live at once.
//!
//! Saturation policy: when no permit is free, the unit of work runs
//! inline on the calling thread instead of blocking for a permit. A
//! parent task waiting for a permit while holding its own would deadlock
//! once the tree is deeper than the cap; running inline keeps the
//! dispatch/join algorithm unchanged and merely serializes the overflow.
//! This mirrors queue-backpressure handling: full queue, process inline.

use crate::error::TaskError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{trace, warn};

/// Handle to a unit of work dispatched through the gate
///
/// Either a real thread to join, or the result of work that already ran
/// inline on the dispatching thread.
#[derive(Debug)]
pub enum TaskHandle<T> {
    /// Work running on its own thread
    Spawned { name: String, handle: JoinHandle<T> },

    /// Work that ran inline during dispatch (gate saturated)
    Inline(T),
}

impl<T> TaskHandle<T> {
    /// Block until the task completes and return its result
    ///
    /// A panic in a spawned task surfaces as `TaskError::Panicked`
    /// rather than propagating into the joiner.
    pub fn join(self) -> Result<T, TaskError> {
        match self {
            TaskHandle::Spawned { name, handle } => {
                handle.join().map_err(|_| TaskError::Panicked { name })
            }
            TaskHandle::Inline(value) => Ok(value),
        }
    }

    /// True if this work ran inline rather than on its own thread
    pub fn was_inline(&self) -> bool {
        matches!(self, TaskHandle::Inline(_))
    }
}

#[derive(Debug)]
struct GateInner {
    /// Free permits; None means unbounded
    permits: Option<Mutex<usize>>,

    /// Currently live spawned tasks
    live: AtomicUsize,

    /// Thread name sequence
    seq: AtomicU64,
}

/// Caps concurrently live spawned tasks; overflow work runs inline
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    inner: Arc<GateInner>,
}

impl AdmissionGate {
    /// Gate allowing at most `permits` live spawned tasks
    pub fn bounded(permits: usize) -> Self {
        Self {
            inner: Arc::new(GateInner {
                permits: Some(Mutex::new(permits)),
                live: AtomicUsize::new(0),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Gate that never refuses a spawn
    pub fn unbounded() -> Self {
        Self {
            inner: Arc::new(GateInner {
                permits: None,
                live: AtomicUsize::new(0),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Number of currently live spawned tasks
    pub fn in_flight(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Dispatch `f`, on a new thread if a permit is free, inline otherwise
    pub fn spawn<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        if !self.try_acquire() {
            trace!("gate saturated, running task inline");
            return TaskHandle::Inline(f());
        }

        let name = format!("gate-{}", self.inner.seq.fetch_add(1, Ordering::Relaxed));
        let inner = Arc::clone(&self.inner);
        inner.live.fetch_add(1, Ordering::SeqCst);

        // Held in an Option so the work can be recovered if the OS
        // refuses the thread.
        let task = Arc::new(Mutex::new(Some(f)));

        let spawn_result = thread::Builder::new().name(name.clone()).spawn({
            let inner = Arc::clone(&inner);
            let task = Arc::clone(&task);
            move || {
                // Releases the permit even if the task panics.
                let _release = PermitRelease { inner: &inner };
                let f = task.lock().take().expect("Task already taken");
                f()
            }
        });

        match spawn_result {
            Ok(handle) => TaskHandle::Spawned { name, handle },
            Err(e) => {
                // OS refused the thread; fall back to inline.
                inner.live.fetch_sub(1, Ordering::SeqCst);
                self.release();
                warn!(error = %e, "thread spawn failed, running task inline");
                let f = task.lock().take().expect("Task already taken");
                TaskHandle::Inline(f())
            }
        }
    }

    fn try_acquire(&self) -> bool {
        match &self.inner.permits {
            None => true,
            Some(permits) => {
                let mut free = permits.lock();
                if *free == 0 {
                    false
                } else {
                    *free -= 1;
                    true
                }
            }
        }
    }

    fn release(&self) {
        if let Some(permits) = &self.inner.permits {
            *permits.lock() += 1;
        }
    }
}

/// Returns a permit and decrements the live count on drop
struct PermitRelease<'a> {
    inner: &'a GateInner,
}

impl Drop for PermitRelease<'_> {
    fn drop(&mut self) {
        self.inner.live.fetch_sub(1, Ordering::SeqCst);
        if let Some(permits) = &self.inner.permits {
            *permits.lock() += 1;
        }
    }
}
