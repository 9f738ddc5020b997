//! Per-seeker nearest-target search
//!
//! Two strategies share the same contract: given one seeker and a target
//! buffer, return the position of the closest target by Euclidean distance,
//! or [`NO_TARGET`] when the buffer is empty.
//!
//! - [`brute`]: scans every target, O(M) per seeker
//! - [`pruned`]: binary search on an axis-sorted buffer plus a bounded scan
//!   outward, O(log M + k) per seeker on typical layouts

pub mod brute;
pub mod pruned;

pub use brute::{nearest_brute_force, nearest_brute_force_batch};
pub use pruned::{nearest_sorted, nearest_sorted_batch, nearest_sorted_with_stats, ScanStats};

use glam::Vec3;

/// Result written for a seeker when there are no targets
///
/// Every coordinate is positive infinity, so it can never equal a real
/// (validated, finite) target position.
pub const NO_TARGET: Vec3 = Vec3::splat(f32::INFINITY);

/// Whether a result slot holds the "no target" sentinel
#[inline]
pub fn is_no_target(position: Vec3) -> bool {
    position.x == f32::INFINITY && position.y == f32::INFINITY && position.z == f32::INFINITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_detection() {
        assert!(is_no_target(NO_TARGET));
        assert!(!is_no_target(Vec3::ZERO));
        assert!(!is_no_target(Vec3::new(f32::INFINITY, 0.0, 0.0)));
    }
}
