//! Seeded position generators
//!
//! Deterministic point layouts for demos, benchmarks and tests. The same seed
//! always produces the same positions.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generate positions uniformly inside the cube `[-half_extent, half_extent]^3`
///
/// # Example
///
/// ```rust
/// use nearest_target::scatter::random_positions;
///
/// let points = random_positions(100, 50.0, 42);
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|p| p.abs().max_element() <= 50.0));
/// ```
pub fn random_positions(count: usize, half_extent: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-half_extent..=half_extent),
                rng.gen_range(-half_extent..=half_extent),
                rng.gen_range(-half_extent..=half_extent),
            )
        })
        .collect()
}

/// Generate positions that all share the same x coordinate
///
/// Sorting along x gives the pruned search nothing to prune, so every seeker
/// degrades to a full scan. Useful for measuring the worst case.
pub fn column_positions(count: usize, x: f32, half_extent: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                x,
                rng.gen_range(-half_extent..=half_extent),
                rng.gen_range(-half_extent..=half_extent),
            )
        })
        .collect()
}

/// Move every position by a random step of at most `max_step` per axis
///
/// Stands in for the movement systems that update positions between frames.
pub fn jitter_positions(positions: &mut [Vec3], max_step: f32, rng: &mut ChaCha8Rng) {
    if max_step <= 0.0 {
        return;
    }
    for p in positions.iter_mut() {
        *p += Vec3::new(
            rng.gen_range(-max_step..=max_step),
            rng.gen_range(-max_step..=max_step),
            rng.gen_range(-max_step..=max_step),
        );
    }
}
