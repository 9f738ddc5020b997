//! Per-frame nearest-target queries
//!
//! Given a set of moving seekers and a set of moving targets, find the
//! closest target for every seeker, every frame, spread over a worker pool.
//! Nothing is carried between frames except reusable buffers.
//!
//! # Quick Start
//!
//! ```rust
//! use nearest_target::*;
//!
//! let config = QueryConfigBuilder::new()
//!     .mode(SearchMode::SortedPruned)
//!     .worker_count(4).unwrap()
//!     .build().unwrap();
//! let mut engine = NearestQuery::new(config).unwrap();
//!
//! // Each frame: snapshot positions, then query
//! let mut frame = PositionSnapshot::default();
//! frame.capture(&[Vec3::ZERO], &[Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)]);
//!
//! let nearest = engine.run(&frame).unwrap();
//! assert_eq!(nearest[0], Vec3::new(0.0, 1.0, 0.0));
//! ```
//!
//! # Search modes
//!
//! - [`SearchMode::BruteForceSingle`]: every target for every seeker, one thread
//! - [`SearchMode::BruteForceParallel`]: same scan, seekers split into batches
//! - [`SearchMode::SortedPruned`]: targets sorted along one axis, each seeker
//!   binary-searches its position and scans outward until the axis gap alone
//!   exceeds the best distance found
//!
//! All modes agree on the nearest distance; when two targets are exactly
//! equally close, which one is reported depends on the mode's scan order.
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration types

// Modules
pub mod error;
pub mod config;
pub mod snapshot;
pub mod sort;
pub mod search;
pub mod scheduler;
pub mod query;
pub mod scatter;

// Re-export core types for convenience
pub use error::{PositionSet, QueryError, Result};
pub use config::{Axis, QueryConfig, QueryConfigBuilder, SearchMode};
pub use snapshot::{snapshot, PositionSnapshot};
pub use sort::{is_sorted_by_axis, sort_by_axis};
pub use search::{is_no_target, ScanStats, NO_TARGET};
pub use scheduler::{batch_size, QueryScheduler};
pub use query::{query, NearestQuery, NearestResultSet};

// Re-export glam::Vec3 for convenience
pub use glam::Vec3;
