//! Reference nearest search: scan every target

use glam::Vec3;

use super::NO_TARGET;

/// Find the closest target by scanning all of them
///
/// Ties go to the lowest target index. Returns [`NO_TARGET`] only when
/// `targets` is empty.
pub fn nearest_brute_force(seeker: Vec3, targets: &[Vec3]) -> Vec3 {
    let Some((&first, rest)) = targets.split_first() else {
        return NO_TARGET;
    };

    // Seeded from the first target so an overflowing distance still wins
    let mut best = first;
    let mut best_dist_sq = seeker.distance_squared(first);

    for &target in rest {
        let dist_sq = seeker.distance_squared(target);
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = target;
        }
    }

    best
}

/// Brute-force search for a contiguous batch of seekers
///
/// `results[i]` receives the nearest target of `seekers[i]`.
pub fn nearest_brute_force_batch(seekers: &[Vec3], targets: &[Vec3], results: &mut [Vec3]) {
    debug_assert_eq!(seekers.len(), results.len());
    for (slot, &seeker) in results.iter_mut().zip(seekers) {
        *slot = nearest_brute_force(seeker, targets);
    }
}
