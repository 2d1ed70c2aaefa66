//! Per-run traversal state shared by the iterator frames.

use std::collections::HashSet;

use tracing::warn;

use crate::store::StorePath;

use super::config::SamplerConfig;

/// Depth checks and the visited-path set for one run.
pub struct Traversal {
    config: SamplerConfig,
    visited: HashSet<StorePath>,
}

impl Traversal {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            visited: HashSet::new(),
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Documents at this depth do not get their subcollections listed.
    pub fn at_max_depth(&self, depth: usize) -> bool {
        depth >= self.config.max_depth
    }

    pub fn document_limit(&self) -> Option<usize> {
        self.config.sample_size
    }

    /// Record a path as visited. Returns false if it was seen before in this
    /// run, in which case the caller skips it.
    pub fn visit(&mut self, path: &StorePath) -> bool {
        if self.visited.contains(path) {
            warn!(path = %path, "path already visited in this run, skipping");
            return false;
        }
        self.visited.insert(path.clone());
        true
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
