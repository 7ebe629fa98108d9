//! syncgate - Thread-Coordination Toolkit
//!
//! Reusable coordination primitives for thread-based programs, plus a
//! concurrent tree search built on top of them. The toolkit is oblivious
//! to what the coordinated work actually does; it only guarantees the
//! coordination semantics.
//!
//! # Components
//!
//! - **[`SharedCounter`]**: A mutex-guarded counter that also exposes
//!   deliberately unsynchronized operations, so lost-update races can be
//!   reproduced and tested for explicitly.
//!
//! - **[`WaitGroup`]**: A completion barrier. `add(n)` before dispatch,
//!   `done()` per finished task, `wait()` blocks until the count is zero.
//!
//! - **[`BoundedResource`]**: A condition-variable-gated quantity.
//!   Withdrawals block until deposits cover them; the quantity is never
//!   observably negative.
//!
//! - **[`AdmissionGate`]**: A drop-in wrapper around `thread::spawn`
//!   that caps concurrently live tasks; overflow work runs inline.
//!
//! - **[`Search`]**: A fan-out/fan-in tree traversal that dispatches one
//!   task per subdirectory, collects matches into a shared [`MatchSet`],
//!   and joins children per level so a parent only completes after its
//!   whole subtree has.
//!
//! # Design rules
//!
//! - Every piece of shared state is protected by exactly one guard, and
//!   no code path ever holds two distinct guards at once, so
//!   lock-ordering deadlocks are impossible by construction.
//!
//! - Blocked waits are condition waits, never poll loops: a suspended
//!   waiter releases its guard atomically and consumes no CPU.
//!
//! - A deadline expiry is a status (`false`), not an error, and always
//!   leaves the protected state valid for retry.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use syncgate::WaitGroup;
//!
//! let wg = Arc::new(WaitGroup::new());
//! wg.add(4);
//! for _ in 0..4 {
//!     let wg = Arc::clone(&wg);
//!     thread::spawn(move || {
//!         // ... do work ...
//!         wg.done().unwrap();
//!     });
//! }
//! wg.wait(); // all four tasks have finished
//! ```

pub mod config;
pub mod counter;
pub mod error;
pub mod gate;
pub mod resource;
pub mod search;
pub mod waitgroup;

pub use config::SearchConfig;
pub use counter::SharedCounter;
pub use error::{AccessError, ConfigError, Result, SyncgateError, TaskError, UsageError};
pub use gate::{AdmissionGate, TaskHandle};
pub use resource::BoundedResource;
pub use search::{DirEntry, DirectoryLister, Failure, MatchSet, Search, SearchResult};
pub use waitgroup::WaitGroup;
