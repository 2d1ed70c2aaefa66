//! Configuration types for sampling runs

/// Maximum document depth when none is given.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Configuration for a sampling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Deepest document level to descend into. 0 lists the root collections'
    /// documents without visiting any subcollection.
    pub max_depth: usize,
    /// Cap on documents read per collection, at every level. `None` reads all.
    pub sample_size: Option<usize>,
}

impl SamplerConfig {
    /// Whether collections are capped rather than read in full.
    pub fn is_sampled(&self) -> bool {
        self.sample_size.is_some()
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            sample_size: None,
        }
    }
}
