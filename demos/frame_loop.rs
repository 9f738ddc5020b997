//! Simulated frame loop for nearest_target
//!
//! Seekers and targets drift a little every frame; each frame takes a fresh
//! snapshot and runs every search mode, reusing the same buffers throughout.
//!
//! Run with `RUST_LOG=debug` to see per-query timings from the engine.

use std::time::Instant;

use nearest_target::scatter::{jitter_positions, random_positions};
use nearest_target::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SEEKERS: usize = 5_000;
const TARGETS: usize = 5_000;
const HALF_EXTENT: f32 = 500.0;
const FRAMES: usize = 10;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== nearest_target Frame Loop Demo ===\n");

    let config = QueryConfigBuilder::new()
        .mode(SearchMode::SortedPruned)
        .build()?;
    let mut engine = NearestQuery::new(config)?;

    println!("  Seekers: {}", SEEKERS);
    println!("  Targets: {}", TARGETS);
    println!("  Mode: {}", engine.config().mode.name());
    println!("  Workers: {}", engine.worker_count());
    println!("  Batch size: {}\n", engine.batch_size_for(SEEKERS));

    let mut seekers = random_positions(SEEKERS, HALF_EXTENT, 1);
    let mut targets = random_positions(TARGETS, HALF_EXTENT, 2);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut frame = PositionSnapshot::with_capacity(SEEKERS, TARGETS);
    let mut results = NearestResultSet::with_capacity(SEEKERS);
    let mut totals = [0.0f64; 3];

    for tick in 0..FRAMES {
        jitter_positions(&mut seekers, 2.0, &mut rng);
        jitter_positions(&mut targets, 2.0, &mut rng);
        frame.capture(&seekers, &targets);

        let mut reference: Option<Vec<f32>> = None;
        for (slot, mode) in SearchMode::ALL.into_iter().enumerate() {
            let start = Instant::now();
            engine.query_into(frame.seekers(), frame.targets(), mode, &mut results)?;
            totals[slot] += start.elapsed().as_secs_f64() * 1000.0;

            let distances: Vec<f32> = frame
                .seekers()
                .iter()
                .zip(&results)
                .map(|(s, t)| s.distance(*t))
                .collect();
            match &reference {
                Some(expected) => assert_eq!(expected, &distances, "{} disagrees", mode.name()),
                None => reference = Some(distances),
            }
        }

        if tick == 0 {
            let seeker = frame.seekers()[0];
            println!("Frame 0: seeker 0 at {:?} -> nearest {:?}", seeker, results[0]);
        }
    }

    println!("\nMean time per frame:");
    for (slot, mode) in SearchMode::ALL.into_iter().enumerate() {
        println!("  {:>22}: {:>8.3} ms", mode.name(), totals[slot] / FRAMES as f64);
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
