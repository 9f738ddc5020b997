//! Query configuration and builder
//!
//! Selects the search strategy, the worker pool size and the batching policy.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec3;

use crate::error::{QueryError, Result};

/// Largest dedicated worker pool the builder accepts
pub const MAX_WORKERS: usize = 1024;

/// Strategy used to find the nearest target for each seeker
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
    /// Scan every target for every seeker on the calling thread
    BruteForceSingle,
    /// Scan every target for every seeker, seekers split into parallel batches
    BruteForceParallel,
    /// Sort targets along one axis, then binary-search and prune per seeker
    #[default]
    SortedPruned,
}

impl SearchMode {
    /// All modes, in order of increasing sophistication
    pub const ALL: [SearchMode; 3] = [
        SearchMode::BruteForceSingle,
        SearchMode::BruteForceParallel,
        SearchMode::SortedPruned,
    ];

    /// Get a human-readable name for this mode
    pub fn name(self) -> &'static str {
        match self {
            SearchMode::BruteForceSingle => "brute-force-single",
            SearchMode::BruteForceParallel => "brute-force-parallel",
            SearchMode::SortedPruned => "sorted-pruned",
        }
    }
}

/// Coordinate axis that targets are sorted and pruned along
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    /// Extract this axis' coordinate from a position
    #[inline]
    pub fn of(self, position: Vec3) -> f32 {
        match self {
            Axis::X => position.x,
            Axis::Y => position.y,
            Axis::Z => position.z,
        }
    }
}

/// Configuration for a [`NearestQuery`](crate::NearestQuery) engine
///
/// # Example
///
/// ```rust
/// use nearest_target::*;
///
/// let config = QueryConfigBuilder::new()
///     .mode(SearchMode::BruteForceParallel)
///     .worker_count(4)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.worker_count, 4);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryConfig {
    /// Default strategy for [`NearestQuery::run`](crate::NearestQuery::run)
    pub mode: SearchMode,

    /// Number of worker threads
    ///
    /// - 0: share rayon's global pool (default)
    /// - n: build a dedicated pool with exactly n threads
    pub worker_count: usize,

    /// Fixed batch size; `None` uses [`batch_size`](crate::batch_size)
    pub batch_size: Option<usize>,

    /// Axis targets are sorted along in [`SearchMode::SortedPruned`]
    pub sort_axis: Axis,
}

impl QueryConfig {
    /// Batch size used for `seeker_count` seekers under this configuration
    pub fn effective_batch_size(&self, worker_count: usize, seeker_count: usize) -> usize {
        self.batch_size
            .unwrap_or_else(|| crate::scheduler::batch_size(worker_count, seeker_count))
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            worker_count: 0,
            batch_size: None,
            sort_axis: Axis::default(),
        }
    }
}

/// Builder for creating QueryConfig with validation
#[derive(Debug, Clone, Default)]
pub struct QueryConfigBuilder {
    config: QueryConfig,
}

impl QueryConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - mode: SortedPruned
    /// - worker_count: 0 (global rayon pool)
    /// - batch_size: None (ceil(N / W))
    /// - sort_axis: X
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default search mode
    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the number of dedicated worker threads
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if count > [`MAX_WORKERS`]
    pub fn worker_count(mut self, count: usize) -> Result<Self> {
        if count > MAX_WORKERS {
            return Err(QueryError::InvalidConfig(format!(
                "worker count must be <= {} (got {})",
                MAX_WORKERS, count
            )));
        }
        self.config.worker_count = count;
        Ok(self)
    }

    /// Use a fixed batch size instead of splitting seekers evenly across workers
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if size is 0
    pub fn batch_size(mut self, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(QueryError::InvalidConfig(
                "batch size must be positive".to_string(),
            ));
        }
        self.config.batch_size = Some(size);
        Ok(self)
    }

    /// Set the axis targets are sorted and pruned along
    pub fn sort_axis(mut self, axis: Axis) -> Self {
        self.config.sort_axis = axis;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<QueryConfig> {
        Ok(self.config)
    }
}
