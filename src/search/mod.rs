//! Concurrent fan-out/fan-in tree search
//!
//! The search dispatches one task per subdirectory and joins them per
//! level, so a parent task only completes after every descendant task
//! has. Matches accumulate in a shared, guard-protected [`MatchSet`];
//! lister failures are recorded per path without aborting sibling
//! subtrees.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────────┐
//!                  │          Search          │
//!                  │  run(): dispatch root,   │
//!                  │  join it, drain failures │
//!                  └────────────┬─────────────┘
//!                               │
//!          ┌────────────────────┼────────────────────┐
//!          │                    │                    │
//!   ┌──────▼──────┐      ┌──────▼──────┐      ┌──────▼──────┐
//!   │ task /a     │      │ task /b     │      │ task /c     │
//!   │ list, match │ ...  │ list, match │ ...  │ list, match │
//!   │ spawn+join  │      │ spawn+join  │      │ spawn+join  │
//!   └──────┬──────┘      └─────────────┘      └─────────────┘
//!          │ matches / failures
//!          ▼
//!   MatchSet (guarded)    failure channel -> SearchResult
//! ```
//!
//! Dispatch goes through an [`AdmissionGate`], so the number of live
//! threads is capped; overflow subtrees are searched inline on the
//! dispatching task's thread.

pub mod lister;
pub mod stats;

pub use lister::{DirEntry, DirectoryLister};
pub use stats::SearchStats;

use crate::config::SearchConfig;
use crate::error::AccessError;
use crate::gate::{AdmissionGate, TaskHandle};
use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Guard-protected collection of matched paths
///
/// Appends are serialized by the guard; once every search task has been
/// joined, a snapshot sees each appended path exactly once, in append
/// order (which varies run to run).
#[derive(Debug, Default)]
pub struct MatchSet {
    items: Mutex<Vec<PathBuf>>,
}

impl MatchSet {
    /// Create an empty match set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a matched path under the guard
    pub fn insert(&self, path: PathBuf) {
        self.items.lock().push(path);
    }

    /// Number of matches recorded so far
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// True if no matches have been recorded
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Copy out the current matches
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.items.lock().clone()
    }
}

/// A path the lister could not read, with the reason
#[derive(Debug, Clone)]
pub struct Failure {
    /// Directory the lister failed on
    pub path: PathBuf,

    /// What went wrong
    pub error: AccessError,
}

/// Outcome of a completed search
#[derive(Debug)]
pub struct SearchResult {
    /// Every match found in readable subtrees, in append order
    pub matches: Vec<PathBuf>,

    /// Directories that could not be listed
    pub failures: Vec<Failure>,

    /// Directories successfully listed
    pub dirs_listed: u64,

    /// Entries seen across all listed directories
    pub entries_seen: u64,

    /// Subdirectories skipped (depth limit, exclusion)
    pub skipped: u64,

    /// Child tasks that got their own thread
    pub tasks_spawned: u64,

    /// Child tasks run inline on the dispatching thread
    pub inline_runs: u64,

    /// Wall-clock time for the whole search
    pub duration: Duration,
}

/// Concurrent tree search over an abstract directory lister
pub struct Search<L> {
    lister: Arc<L>,
    config: SearchConfig,
}

impl<L> Search<L>
where
    L: DirectoryLister + 'static,
{
    /// Create a search over `lister` with the given configuration
    pub fn new(lister: L, config: SearchConfig) -> Self {
        Self {
            lister: Arc::new(lister),
            config,
        }
    }

    /// Search from `root` for entries whose name satisfies `predicate`
    ///
    /// Blocks until every readable subtree has been visited. The result
    /// holds all matches plus every path the lister failed on.
    pub fn run<P>(&self, root: impl Into<PathBuf>, predicate: P) -> SearchResult
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let matches = Arc::new(MatchSet::new());
        self.run_into(root, predicate, matches)
    }

    /// Like [`run`](Self::run), but accumulating into a caller-owned set
    ///
    /// The set is not cleared first; matches append to whatever it holds.
    pub fn run_into<P>(
        &self,
        root: impl Into<PathBuf>,
        predicate: P,
        matches: Arc<MatchSet>,
    ) -> SearchResult
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let root = root.into();
        let start = Instant::now();

        let gate = match self.config.max_tasks {
            Some(limit) => AdmissionGate::bounded(limit),
            None => AdmissionGate::unbounded(),
        };

        let (failure_tx, failure_rx) = unbounded();
        let stats = Arc::new(SearchStats::default());

        let ctx = Arc::new(TaskCtx {
            lister: Arc::clone(&self.lister),
            predicate,
            config: self.config.clone(),
            matches: Arc::clone(&matches),
            stats: Arc::clone(&stats),
            failures: failure_tx,
            gate,
        });

        info!(root = %root.display(), max_tasks = ?self.config.max_tasks, "Starting search");

        // One task for the root; by the time its join returns, every
        // descendant task has been joined transitively.
        let root_task = {
            let ctx = Arc::clone(&ctx);
            let root = root.clone();
            ctx.gate.clone().spawn(move || search_dir(&ctx, &root, 0))
        };
        if let Err(e) = root_task.join() {
            warn!(error = %e, "Root search task panicked");
        }

        // All task-held senders are gone once the root join returns;
        // ours is the last. Drop it and drain what was reported.
        drop(ctx);
        let failures: Vec<Failure> = failure_rx.try_iter().collect();

        let duration = start.elapsed();
        let result = SearchResult {
            matches: matches.snapshot(),
            failures,
            dirs_listed: stats.dirs_listed.load(Ordering::Relaxed),
            entries_seen: stats.entries_seen.load(Ordering::Relaxed),
            skipped: stats.skipped.load(Ordering::Relaxed),
            tasks_spawned: stats.tasks_spawned.load(Ordering::Relaxed),
            inline_runs: stats.inline_runs.load(Ordering::Relaxed),
            duration,
        };

        info!(
            matches = result.matches.len(),
            failures = result.failures.len(),
            dirs = result.dirs_listed,
            duration_ms = duration.as_millis() as u64,
            "Search completed"
        );

        result
    }
}

/// Everything a search task needs, shared across the whole task tree
struct TaskCtx<L, P> {
    lister: Arc<L>,
    predicate: P,
    config: SearchConfig,
    matches: Arc<MatchSet>,
    stats: Arc<SearchStats>,
    failures: Sender<Failure>,
    gate: AdmissionGate,
}

/// Search one directory: match entries, fan out into subdirectories,
/// then join every child in dispatch order.
fn search_dir<L, P>(ctx: &Arc<TaskCtx<L, P>>, path: &Path, depth: usize)
where
    L: DirectoryLister + 'static,
    P: Fn(&str) -> bool + Send + Sync + 'static,
{
    let entries = match ctx.lister.list(path) {
        Ok(entries) => entries,
        Err(e) => {
            ctx.stats.record_error();
            debug!(path = %path.display(), error = %e, "Directory unreadable, skipping subtree");
            // The coordinator outlives every task, so the channel can
            // only disconnect after all sends are done.
            let _ = ctx.failures.send(Failure {
                path: path.to_path_buf(),
                error: e,
            });
            return;
        }
    };

    ctx.stats.record_dir();
    ctx.stats.record_entries(entries.len() as u64);

    let mut children: Vec<TaskHandle<()>> = Vec::new();

    for entry in entries {
        let full_path = path.join(&entry.name);

        if (ctx.predicate)(&entry.name) {
            ctx.matches.insert(full_path.clone());
            ctx.stats.record_match();
        }

        if !entry.is_dir {
            continue;
        }

        if let Some(max) = ctx.config.max_depth {
            if depth + 1 > max {
                ctx.stats.record_skip();
                continue;
            }
        }

        if ctx.config.is_excluded(&full_path.to_string_lossy()) {
            ctx.stats.record_skip();
            debug!(path = %full_path.display(), "Excluded, not descending");
            continue;
        }

        // Dispatch, never join here: joining mid-loop would serialize
        // sibling subtrees.
        let child = {
            let ctx = Arc::clone(ctx);
            ctx.gate
                .clone()
                .spawn(move || search_dir(&ctx, &full_path, depth + 1))
        };
        if child.was_inline() {
            ctx.stats.record_inline();
        } else {
            ctx.stats.record_spawned();
        }
        children.push(child);
    }

    // Fan-in: this task completes only after all of its children have.
    for child in children {
        if let Err(e) = child.join() {
            ctx.stats.record_error();
            warn!(error = %e, "Child search task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessResult;
    use std::collections::BTreeSet;
    use std::collections::HashMap;

    /// In-memory directory tree for deterministic tests
    struct StaticTree {
        dirs: HashMap<PathBuf, Vec<DirEntry>>,
        unreadable: Vec<PathBuf>,
    }

    impl StaticTree {
        fn new() -> Self {
            Self {
                dirs: HashMap::new(),
                unreadable: Vec::new(),
            }
        }

        fn dir(mut self, path: &str, entries: Vec<DirEntry>) -> Self {
            self.dirs.insert(PathBuf::from(path), entries);
            self
        }

        fn unreadable(mut self, path: &str) -> Self {
            self.unreadable.push(PathBuf::from(path));
            self
        }
    }

    impl DirectoryLister for StaticTree {
        fn list(&self, path: &Path) -> AccessResult<Vec<DirEntry>> {
            if self.unreadable.iter().any(|p| p == path) {
                return Err(AccessError::PermissionDenied { path: path.into() });
            }
            self.dirs
                .get(path)
                .cloned()
                .ok_or_else(|| AccessError::NotFound { path: path.into() })
        }
    }

    fn sample_tree() -> StaticTree {
        StaticTree::new()
            .dir(
                "/root",
                vec![
                    DirEntry::file("report.log"),
                    DirEntry::dir("a"),
                    DirEntry::dir("b"),
                ],
            )
            .dir(
                "/root/a",
                vec![DirEntry::file("notes.txt"), DirEntry::dir("deep")],
            )
            .dir("/root/a/deep", vec![DirEntry::file("trace.log")])
            .dir("/root/b", vec![DirEntry::file("other.log")])
    }

    fn as_set(paths: &[PathBuf]) -> BTreeSet<PathBuf> {
        paths.iter().cloned().collect()
    }

    #[test]
    fn test_finds_all_matches_across_levels() {
        let search = Search::new(sample_tree(), SearchConfig::new());
        let result = search.run("/root", |name| name.ends_with(".log"));

        let expected: BTreeSet<PathBuf> = [
            "/root/report.log",
            "/root/a/deep/trace.log",
            "/root/b/other.log",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect();

        assert_eq!(as_set(&result.matches), expected);
        assert_eq!(result.matches.len(), 3); // no duplicates
        assert!(result.failures.is_empty());
        assert_eq!(result.dirs_listed, 4);
    }

    #[test]
    fn test_unreadable_subtree_does_not_abort_siblings() {
        let tree = sample_tree().unreadable("/root/a");
        let search = Search::new(tree, SearchConfig::new());
        let result = search.run("/root", |name| name.ends_with(".log"));

        // /root/a and below are lost; /root and /root/b still searched.
        let expected: BTreeSet<PathBuf> = ["/root/report.log", "/root/b/other.log"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(as_set(&result.matches), expected);

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].path, PathBuf::from("/root/a"));
        assert!(result.failures[0].error.is_recoverable());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let search = Search::new(sample_tree(), SearchConfig::new());

        let first = search.run("/root", |name| name.ends_with(".log"));
        let second = search.run("/root", |name| name.ends_with(".log"));

        assert_eq!(as_set(&first.matches), as_set(&second.matches));
    }

    #[test]
    fn test_depth_limit_skips_descent() {
        let config = SearchConfig::new().max_depth(1);
        let search = Search::new(sample_tree(), config);
        let result = search.run("/root", |name| name.ends_with(".log"));

        // /root/a/deep is at depth 2 and never listed.
        let expected: BTreeSet<PathBuf> = ["/root/report.log", "/root/b/other.log"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(as_set(&result.matches), expected);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_exclusion_pattern_skips_descent() {
        let config = SearchConfig::new().exclude("/root/a$").unwrap();
        let search = Search::new(sample_tree(), config);
        let result = search.run("/root", |name| name.ends_with(".log"));

        let expected: BTreeSet<PathBuf> = ["/root/report.log", "/root/b/other.log"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(as_set(&result.matches), expected);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_tight_gate_still_finds_everything() {
        // One permit: almost everything runs inline, results identical.
        let config = SearchConfig::new().max_tasks(1).unwrap();
        let search = Search::new(sample_tree(), config);
        let result = search.run("/root", |name| name.ends_with(".log"));

        assert_eq!(result.matches.len(), 3);
        assert!(result.inline_runs + result.tasks_spawned >= 3);
    }

    #[test]
    fn test_run_into_external_match_set() {
        let matches = Arc::new(MatchSet::new());
        matches.insert(PathBuf::from("/preexisting"));

        let search = Search::new(sample_tree(), SearchConfig::new());
        let result =
            search.run_into("/root", |name| name.ends_with(".txt"), Arc::clone(&matches));

        // Appends to the caller's set, preserving what was there.
        assert_eq!(matches.len(), 2);
        assert!(result.matches.contains(&PathBuf::from("/preexisting")));
        assert!(result.matches.contains(&PathBuf::from("/root/a/notes.txt")));
    }

    #[test]
    fn test_missing_root_is_a_failure_not_a_panic() {
        let search = Search::new(StaticTree::new(), SearchConfig::new());
        let result = search.run("/nowhere", |_| true);

        assert!(result.matches.is_empty());
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(
            result.failures[0].error,
            AccessError::NotFound { .. }
        ));
    }
}
