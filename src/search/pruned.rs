//! Bounded nearest search over an axis-sorted target buffer
//!
//! # Algorithm
//!
//! For one seeker against targets sorted ascending along `axis`:
//! 1. Binary-search the first target whose axis coordinate is >= the seeker's
//!    (clamped to the last target when every target is below the seeker)
//! 2. Take that target as the current best
//! 3. Walk upward, then downward, from the start. In each direction stop as
//!    soon as the axis gap alone, squared, exceeds the best squared distance
//!
//! The axis gap only grows as the walk moves away from the start, and it is
//! a lower bound on the full distance, so every target past the stopping
//! point is at least as far as the current best.

use glam::Vec3;

use super::NO_TARGET;
use crate::config::Axis;

/// Counters describing how much of the target buffer one search touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Targets whose full squared distance was computed
    pub distance_evaluations: usize,
    /// Directions cut short by the axis bound (0, 1 or 2)
    pub axis_rejections: usize,
}

impl ScanStats {
    /// Number of targets never looked at out of `target_count`
    pub fn skipped(&self, target_count: usize) -> usize {
        target_count.saturating_sub(self.distance_evaluations + self.axis_rejections)
    }
}

/// Find the closest target in a buffer sorted ascending along `axis`
///
/// # Example
///
/// ```
/// use nearest_target::*;
/// use nearest_target::search::nearest_sorted;
///
/// let sorted = [
///     Vec3::new(-1.0, 0.0, 0.0),
///     Vec3::new(5.0, 0.0, 0.0),
///     Vec3::new(10.0, 0.0, 0.0),
/// ];
/// let nearest = nearest_sorted(Vec3::ZERO, &sorted, Axis::X);
/// assert_eq!(nearest, Vec3::new(-1.0, 0.0, 0.0));
/// ```
#[inline]
pub fn nearest_sorted(seeker: Vec3, sorted: &[Vec3], axis: Axis) -> Vec3 {
    let mut stats = ScanStats::default();
    search(seeker, sorted, axis, &mut stats)
}

/// Same as [`nearest_sorted`], also reporting how many targets were touched
pub fn nearest_sorted_with_stats(
    seeker: Vec3,
    sorted: &[Vec3],
    axis: Axis,
) -> (Vec3, ScanStats) {
    let mut stats = ScanStats::default();
    let best = search(seeker, sorted, axis, &mut stats);
    (best, stats)
}

/// Pruned search for a contiguous batch of seekers
///
/// `results[i]` receives the nearest target of `seekers[i]`.
pub fn nearest_sorted_batch(
    seekers: &[Vec3],
    sorted: &[Vec3],
    axis: Axis,
    results: &mut [Vec3],
) {
    debug_assert_eq!(seekers.len(), results.len());
    for (slot, &seeker) in results.iter_mut().zip(seekers) {
        *slot = nearest_sorted(seeker, sorted, axis);
    }
}

fn search(seeker: Vec3, sorted: &[Vec3], axis: Axis, stats: &mut ScanStats) -> Vec3 {
    if sorted.is_empty() {
        return NO_TARGET;
    }

    let key = axis.of(seeker);
    let start = sorted
        .partition_point(|t| axis.of(*t) < key)
        .min(sorted.len() - 1);

    let mut best = sorted[start];
    let mut best_dist_sq = seeker.distance_squared(best);
    stats.distance_evaluations += 1;

    // Upward
    for &candidate in &sorted[start + 1..] {
        let d = key - axis.of(candidate);
        if d * d > best_dist_sq {
            stats.axis_rejections += 1;
            break;
        }
        let dist_sq = seeker.distance_squared(candidate);
        stats.distance_evaluations += 1;
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = candidate;
        }
    }

    // Downward
    for &candidate in sorted[..start].iter().rev() {
        let d = key - axis.of(candidate);
        if d * d > best_dist_sq {
            stats.axis_rejections += 1;
            break;
        }
        let dist_sq = seeker.distance_squared(candidate);
        stats.distance_evaluations += 1;
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = candidate;
        }
    }

    best
}
