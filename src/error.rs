//! Error types for nearest-target queries

use glam::Vec3;
use thiserror::Error;

/// Which input buffer a bad position was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSet {
    Seekers,
    Targets,
}

impl std::fmt::Display for PositionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSet::Seekers => f.write_str("seeker"),
            PositionSet::Targets => f.write_str("target"),
        }
    }
}

/// Errors that can occur while configuring or running a query
#[derive(Debug, Error)]
pub enum QueryError {
    /// A position contained a NaN or infinite coordinate
    #[error("invalid {set} position at index {index}: {position}")]
    InvalidInput {
        set: PositionSet,
        index: usize,
        position: Vec3,
    },

    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The dedicated worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A batch failed; the whole query is discarded
    #[error("batch {batch} failed: {message}")]
    WorkerFailure { batch: usize, message: String },
}

/// Result type alias for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
