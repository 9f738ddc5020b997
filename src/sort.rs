//! Axis sort for target buffers
//!
//! Orders targets ascending along one coordinate so the pruned search can
//! binary-search a seeker's position and walk outward from it.

use std::cmp::Ordering;

use glam::Vec3;

use crate::config::Axis;

/// Sort positions ascending by one axis, in place
///
/// The sort is unstable; nothing depends on the relative order of targets
/// sharing a coordinate. Inputs must not contain NaN.
pub fn sort_by_axis(positions: &mut [Vec3], axis: Axis) {
    positions.sort_unstable_by(|a, b| compare_along(*a, *b, axis));
}

/// Whether `positions[i]` is at or before `positions[j]` along `axis` for all i < j
pub fn is_sorted_by_axis(positions: &[Vec3], axis: Axis) -> bool {
    positions
        .windows(2)
        .all(|w| axis.of(w[0]) <= axis.of(w[1]))
}

#[inline]
fn compare_along(a: Vec3, b: Vec3, axis: Axis) -> Ordering {
    axis.of(a)
        .partial_cmp(&axis.of(b))
        .unwrap_or(Ordering::Equal)
}
