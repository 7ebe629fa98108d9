//! Statistics collected during a search

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every task of one search
#[derive(Debug, Default)]
pub struct SearchStats {
    /// Directories successfully listed
    pub dirs_listed: AtomicU64,

    /// Entries seen across all listed directories
    pub entries_seen: AtomicU64,

    /// Entries that satisfied the predicate
    pub matches_found: AtomicU64,

    /// Lister failures
    pub errors: AtomicU64,

    /// Subdirectories not descended into (depth limit, exclusion)
    pub skipped: AtomicU64,

    /// Child tasks dispatched onto their own thread
    pub tasks_spawned: AtomicU64,

    /// Child tasks run inline (gate saturated)
    pub inline_runs: AtomicU64,
}

impl SearchStats {
    pub(crate) fn record_dir(&self) {
        self.dirs_listed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_entries(&self, count: u64) {
        self.entries_seen.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_match(&self) {
        self.matches_found.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_spawned(&self) {
        self.tasks_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_inline(&self) {
        self.inline_runs.fetch_add(1, Ordering::Relaxed);
    }
}
