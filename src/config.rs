//! Configuration for concurrent searches
//!
//! This module defines:
//! - `SearchConfig` with builder-style setters and validation
//! - Exclusion pattern compilation and matching

use crate::error::ConfigError;
use regex::Regex;

/// Maximum reasonable concurrent task cap
const MAX_TASKS: usize = 512;

/// Validated configuration for a concurrent search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Cap on concurrently live search tasks (None = unbounded fan-out)
    pub max_tasks: Option<usize>,

    /// Maximum traversal depth (root = 0, None = unlimited)
    pub max_depth: Option<usize>,

    /// Compiled exclude patterns, matched against full paths
    pub exclude_patterns: Vec<Regex>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            // Search tasks are expected to be I/O bound, so default to
            // 2x CPU cores like any other I/O worker pool.
            max_tasks: Some(num_cpus::get() * 2),
            max_depth: None,
            exclude_patterns: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Create a config with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of concurrently live search tasks
    pub fn max_tasks(mut self, count: usize) -> Result<Self, ConfigError> {
        if count == 0 || count > MAX_TASKS {
            return Err(ConfigError::InvalidTaskLimit {
                count,
                max: MAX_TASKS,
            });
        }
        self.max_tasks = Some(count);
        Ok(self)
    }

    /// Remove the task cap entirely (one task per subdirectory)
    pub fn unbounded_tasks(mut self) -> Self {
        self.max_tasks = None;
        self
    }

    /// Limit traversal depth (0 = only the root directory)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Add an exclusion pattern; matching directories are not descended into
    pub fn exclude(mut self, pattern: &str) -> Result<Self, ConfigError> {
        let re = Regex::new(pattern).map_err(|e| ConfigError::InvalidExcludePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.exclude_patterns.push(re);
        Ok(self)
    }

    /// Check if a path should be excluded from descent
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_patterns.iter().any(|re| re.is_match(path))
    }
}
