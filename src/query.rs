//! Nearest-target query engine
//!
//! [`NearestQuery`] ties the pieces together for one frame:
//!
//! 1. validate the seeker and target buffers
//! 2. (sorted-pruned only) copy targets into a private buffer and sort it
//! 3. dispatch the per-seeker search over the worker pool
//! 4. publish the [`NearestResultSet`] only once every batch has succeeded
//!
//! The engine keeps its sorted-target buffer between frames, and callers can
//! pass their own result buffer to [`NearestQuery::query_into`] to avoid
//! allocating every frame.

use std::ops::Index;
use std::time::Instant;

use glam::Vec3;

use crate::config::{Axis, QueryConfig, SearchMode};
use crate::error::{PositionSet, QueryError, Result};
use crate::scheduler::QueryScheduler;
use crate::search::{self, is_no_target, NO_TARGET};
use crate::snapshot::{validate_positions, PositionSnapshot};
use crate::sort::sort_by_axis;

/// Nearest target position for each seeker, by seeker index
///
/// Slots hold [`NO_TARGET`] when the target set was empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearestResultSet {
    positions: Vec<Vec3>,
}

impl NearestResultSet {
    /// Create an empty result set with room for `seekers` results
    pub fn with_capacity(seekers: usize) -> Self {
        Self {
            positions: Vec::with_capacity(seekers),
        }
    }

    /// Number of result slots (one per seeker of the last query)
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether there are no results, either no seekers or a failed query
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Nearest target of seeker `index`, or `None` if out of range
    #[inline]
    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    /// Whether seeker `index` has a real target (not the sentinel)
    pub fn has_target(&self, index: usize) -> bool {
        self.get(index).is_some_and(|p| !is_no_target(p))
    }

    /// All results as a slice, indexed like the seekers
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Iterate over results in seeker order
    pub fn iter(&self) -> std::slice::Iter<'_, Vec3> {
        self.positions.iter()
    }

    /// Resize to `len` slots, reusing the existing allocation
    fn reset(&mut self, len: usize) {
        self.positions.clear();
        self.positions.resize(len, NO_TARGET);
    }
}

impl Index<usize> for NearestResultSet {
    type Output = Vec3;

    fn index(&self, index: usize) -> &Vec3 {
        &self.positions[index]
    }
}

impl<'a> IntoIterator for &'a NearestResultSet {
    type Item = &'a Vec3;
    type IntoIter = std::slice::Iter<'a, Vec3>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

/// Reusable nearest-target query engine
///
/// # Example
///
/// ```
/// use nearest_target::*;
///
/// let mut engine = NearestQuery::new(QueryConfig::default()).unwrap();
/// let seekers = [Vec3::ZERO];
/// let targets = [
///     Vec3::new(10.0, 0.0, 0.0),
///     Vec3::new(-1.0, 0.0, 0.0),
///     Vec3::new(5.0, 0.0, 0.0),
/// ];
///
/// let results = engine.query(&seekers, &targets, SearchMode::SortedPruned).unwrap();
/// assert_eq!(results[0], Vec3::new(-1.0, 0.0, 0.0));
/// ```
#[derive(Debug)]
pub struct NearestQuery {
    config: QueryConfig,
    scheduler: QueryScheduler,
    /// Private copy of the targets, sorted along `config.sort_axis`
    sorted: Vec<Vec3>,
    /// Batches containing this seeker fail after writing their results
    #[cfg(test)]
    fail_on: Option<Vec3>,
}

impl NearestQuery {
    /// Create an engine, building a dedicated worker pool if configured
    pub fn new(config: QueryConfig) -> Result<Self> {
        let scheduler = QueryScheduler::new(config.worker_count)?;
        Ok(Self {
            config,
            scheduler,
            sorted: Vec::new(),
            #[cfg(test)]
            fail_on: None,
        })
    }

    /// Get the configuration this engine was built with
    #[inline]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Number of worker threads batches are spread across
    pub fn worker_count(&self) -> usize {
        self.scheduler.worker_count()
    }

    /// Batch size this engine uses for `seeker_count` seekers
    pub fn batch_size_for(&self, seeker_count: usize) -> usize {
        self.config
            .effective_batch_size(self.worker_count(), seeker_count)
    }

    /// Query with the configured default mode
    pub fn run(&mut self, snapshot: &PositionSnapshot) -> Result<NearestResultSet> {
        let mode = self.config.mode;
        self.query(snapshot.seekers(), snapshot.targets(), mode)
    }

    /// Find the nearest target for every seeker, returning a new result set
    pub fn query(
        &mut self,
        seekers: &[Vec3],
        targets: &[Vec3],
        mode: SearchMode,
    ) -> Result<NearestResultSet> {
        let mut results = NearestResultSet::with_capacity(seekers.len());
        self.query_into(seekers, targets, mode, &mut results)?;
        Ok(results)
    }

    /// Find the nearest target for every seeker, writing into `results`
    ///
    /// `results` is resized to `seekers.len()`. On error it is left empty,
    /// so a failed query never exposes partially written results.
    pub fn query_into(
        &mut self,
        seekers: &[Vec3],
        targets: &[Vec3],
        mode: SearchMode,
        results: &mut NearestResultSet,
    ) -> Result<()> {
        let start = Instant::now();
        let outcome = self.execute(seekers, targets, mode, results);

        match &outcome {
            Ok(batch) => log::debug!(
                "[{}] {} seekers x {} targets, batch {}, {:.3} ms",
                mode.name(),
                seekers.len(),
                targets.len(),
                batch,
                start.elapsed().as_secs_f64() * 1000.0
            ),
            Err(err) => {
                log::warn!("[{}] query failed: {}", mode.name(), err);
                results.positions.clear();
            }
        }

        outcome.map(|_| ())
    }

    /// Returns the batch size used
    fn execute(
        &mut self,
        seekers: &[Vec3],
        targets: &[Vec3],
        mode: SearchMode,
        results: &mut NearestResultSet,
    ) -> Result<usize> {
        let axis = self.config.sort_axis;

        match mode {
            SearchMode::BruteForceSingle | SearchMode::BruteForceParallel => {
                validate_positions(seekers, PositionSet::Seekers)?;
                validate_positions(targets, PositionSet::Targets)?;
            }
            SearchMode::SortedPruned => {
                // Seeker validation overlaps with the sort; the join is the
                // ordering edge that keeps the search from starting early.
                let sorted = &mut self.sorted;
                let (seekers_ok, targets_ok) = self.scheduler.install(|| {
                    rayon::join(
                        || validate_positions(seekers, PositionSet::Seekers),
                        || prepare_sorted(targets, sorted, axis),
                    )
                });
                seekers_ok?;
                targets_ok?;
            }
        }

        results.reset(seekers.len());
        let output = results.positions.as_mut_slice();
        let fail_on = self.injected_failure();

        match mode {
            SearchMode::BruteForceSingle => {
                self.scheduler.run_inline(seekers, output, |input, out| {
                    search::nearest_brute_force_batch(input, targets, out);
                    check_batch(fail_on, input)
                })?;
                Ok(seekers.len().max(1))
            }
            SearchMode::BruteForceParallel => {
                let batch = self.batch_size_for(seekers.len());
                self.scheduler.dispatch(seekers, output, batch, |input, out| {
                    search::nearest_brute_force_batch(input, targets, out);
                    check_batch(fail_on, input)
                })?;
                Ok(batch)
            }
            SearchMode::SortedPruned => {
                let batch = self.batch_size_for(seekers.len());
                let sorted = self.sorted.as_slice();
                self.scheduler.dispatch(seekers, output, batch, |input, out| {
                    search::nearest_sorted_batch(input, sorted, axis, out);
                    check_batch(fail_on, input)
                })?;
                Ok(batch)
            }
        }
    }

    /// Targets as last sorted by a [`SearchMode::SortedPruned`] query
    pub fn sorted_targets(&self) -> &[Vec3] {
        &self.sorted
    }

    #[cfg(test)]
    fn injected_failure(&self) -> Option<Vec3> {
        self.fail_on
    }

    #[cfg(not(test))]
    #[inline(always)]
    fn injected_failure(&self) -> Option<Vec3> {
        None
    }
}

/// Fail a batch that contains `fail_on`
#[inline]
fn check_batch(fail_on: Option<Vec3>, input: &[Vec3]) -> Result<()> {
    match fail_on {
        Some(seeker) if input.contains(&seeker) => Err(QueryError::WorkerFailure {
            batch: 0,
            message: format!("seeker {} rejected", seeker),
        }),
        _ => Ok(()),
    }
}

/// Validate targets, then copy and sort them into the engine's buffer
fn prepare_sorted(targets: &[Vec3], sorted: &mut Vec<Vec3>, axis: Axis) -> Result<()> {
    validate_positions(targets, PositionSet::Targets)?;
    sorted.clear();
    sorted.extend_from_slice(targets);
    sort_by_axis(sorted, axis);
    log::trace!("sorted {} targets along {:?}", sorted.len(), axis);
    Ok(())
}

/// One-shot query using the global worker pool and default configuration
///
/// # Example
///
/// ```
/// use nearest_target::*;
///
/// let results = query(&[Vec3::ZERO], &[], SearchMode::BruteForceSingle).unwrap();
/// assert!(!results.has_target(0));
/// ```
pub fn query(seekers: &[Vec3], targets: &[Vec3], mode: SearchMode) -> Result<NearestResultSet> {
    NearestQuery::new(QueryConfig::default())?.query(seekers, targets, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Axis, QueryConfigBuilder};
    use crate::error::QueryError;
    use crate::scatter::random_positions;
    use crate::sort::is_sorted_by_axis;

    fn engine(workers: usize) -> NearestQuery {
        let config = QueryConfigBuilder::new()
            .worker_count(workers)
            .unwrap()
            .build()
            .unwrap();
        NearestQuery::new(config).unwrap()
    }

    #[test]
    fn test_small_example_all_modes() {
        let seekers = [Vec3::ZERO];
        let targets = [
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
        ];
        let mut engine = engine(2);

        for mode in SearchMode::ALL {
            let results = engine.query(&seekers, &targets, mode).unwrap();
            assert_eq!(results.len(), 1);
            assert_eq!(results[0], Vec3::new(-1.0, 0.0, 0.0), "mode {:?}", mode);
        }

        assert_eq!(
            engine.sorted_targets(),
            &[
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(5.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_sorted_copy_leaves_source_untouched() {
        let targets = random_positions(100, 10.0, 1);
        let before = targets.clone();
        let mut engine = engine(2);

        engine
            .query(&random_positions(10, 10.0, 2), &targets, SearchMode::SortedPruned)
            .unwrap();

        assert_eq!(targets, before);
        assert!(is_sorted_by_axis(engine.sorted_targets(), Axis::X));
    }

    #[test]
    fn test_empty_targets_sentinel_every_mode() {
        let seekers = random_positions(20, 5.0, 3);
        let mut engine = engine(2);

        for mode in SearchMode::ALL {
            let results = engine.query(&seekers, &[], mode).unwrap();
            assert_eq!(results.len(), seekers.len());
            assert!(results.iter().all(|p| is_no_target(*p)));
            assert!((0..seekers.len()).all(|i| !results.has_target(i)));
        }
    }

    #[test]
    fn test_empty_seekers() {
        let mut engine = engine(2);
        for mode in SearchMode::ALL {
            let results = engine.query(&[], &[Vec3::ONE], mode).unwrap();
            assert!(results.is_empty());
        }
    }

    #[test]
    fn test_single_target_every_seeker() {
        let target = Vec3::new(3.0, -4.0, 12.0);
        let seekers = random_positions(500, 100.0, 4);
        let mut engine = engine(3);

        for mode in SearchMode::ALL {
            let results = engine.query(&seekers, &[target], mode).unwrap();
            assert!(results.iter().all(|p| *p == target));
        }
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let mut engine = engine(2);
        let mut results = NearestResultSet::default();

        // Leftover results from a previous frame must not survive a failure
        engine
            .query_into(&[Vec3::ZERO], &[Vec3::ONE], SearchMode::SortedPruned, &mut results)
            .unwrap();
        assert_eq!(results.len(), 1);

        for mode in SearchMode::ALL {
            let err = engine
                .query_into(
                    &[Vec3::ZERO, Vec3::new(0.0, f32::NAN, 0.0)],
                    &[Vec3::ONE],
                    mode,
                    &mut results,
                )
                .unwrap_err();
            assert!(matches!(
                err,
                QueryError::InvalidInput {
                    set: PositionSet::Seekers,
                    index: 1,
                    ..
                }
            ));
            assert!(results.is_empty());

            let err = engine
                .query(&[Vec3::ZERO], &[Vec3::new(f32::NEG_INFINITY, 0.0, 0.0)], mode)
                .unwrap_err();
            assert!(matches!(
                err,
                QueryError::InvalidInput {
                    set: PositionSet::Targets,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_query_into_reuses_buffer() {
        let mut engine = engine(2);
        let mut results = NearestResultSet::with_capacity(256);
        let targets = random_positions(50, 10.0, 5);

        engine
            .query_into(
                &random_positions(200, 10.0, 6),
                &targets,
                SearchMode::SortedPruned,
                &mut results,
            )
            .unwrap();
        let ptr = results.positions().as_ptr();
        assert_eq!(results.len(), 200);

        engine
            .query_into(
                &random_positions(80, 10.0, 7),
                &targets,
                SearchMode::SortedPruned,
                &mut results,
            )
            .unwrap();
        assert_eq!(results.len(), 80);
        assert_eq!(results.positions().as_ptr(), ptr);
    }

    #[test]
    fn test_deterministic_repeat() {
        let seekers = random_positions(1_000, 30.0, 8);
        let targets = random_positions(1_000, 30.0, 9);
        let mut engine = engine(4);

        for mode in SearchMode::ALL {
            let first = engine.query(&seekers, &targets, mode).unwrap();
            let second = engine.query(&seekers, &targets, mode).unwrap();
            let bits = |r: &NearestResultSet| -> Vec<[u32; 3]> {
                r.iter()
                    .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
                    .collect()
            };
            assert_eq!(bits(&first), bits(&second));
        }
    }

    #[test]
    fn test_run_uses_configured_mode_and_axis() {
        let config = QueryConfigBuilder::new()
            .mode(SearchMode::SortedPruned)
            .sort_axis(Axis::Y)
            .batch_size(16)
            .unwrap()
            .build()
            .unwrap();
        let mut engine = NearestQuery::new(config).unwrap();

        let snap = crate::snapshot::snapshot(
            &random_positions(100, 10.0, 10),
            &random_positions(100, 10.0, 11),
        );
        let results = engine.run(&snap).unwrap();
        let reference = engine
            .query(snap.seekers(), snap.targets(), SearchMode::BruteForceSingle)
            .unwrap();

        assert_eq!(engine.config().mode, SearchMode::SortedPruned);
        assert_eq!(engine.config().sort_axis, Axis::Y);
        assert!(is_sorted_by_axis(engine.sorted_targets(), Axis::Y));
        assert_eq!(engine.batch_size_for(100), 16);
        for (i, seeker) in snap.seekers().iter().enumerate() {
            assert_eq!(
                seeker.distance_squared(results[i]),
                seeker.distance_squared(reference[i])
            );
        }
    }

    #[test]
    fn test_worker_failure_discards_written_results() {
        let config = QueryConfigBuilder::new()
            .worker_count(2)
            .unwrap()
            .batch_size(10)
            .unwrap()
            .build()
            .unwrap();
        let mut engine = NearestQuery::new(config).unwrap();
        let seekers = random_positions(40, 10.0, 12);
        let targets = random_positions(30, 10.0, 13);
        let mut results = NearestResultSet::default();

        for (mode, failing_batch) in [
            (SearchMode::BruteForceSingle, 0),
            (SearchMode::BruteForceParallel, 2),
            (SearchMode::SortedPruned, 2),
        ] {
            engine.fail_on = None;
            engine
                .query_into(&seekers, &targets, mode, &mut results)
                .unwrap();
            assert_eq!(results.len(), seekers.len());

            // Every other batch has already written its slice when this one fails
            engine.fail_on = Some(seekers[25]);
            let err = engine
                .query_into(&seekers, &targets, mode, &mut results)
                .unwrap_err();

            match err {
                QueryError::WorkerFailure { batch, message } => {
                    assert_eq!(batch, failing_batch, "mode {:?}", mode);
                    assert!(message.contains("rejected"));
                }
                other => panic!("expected WorkerFailure, got {:?}", other),
            }
            assert!(results.is_empty(), "mode {:?}", mode);
            assert!(!results.has_target(0));
        }
    }

    #[test]
    fn test_huge_coordinates_all_modes() {
        // Squared distance overflows f32; the single target must still be found
        let seekers = [Vec3::new(1e20, 0.0, 0.0), Vec3::new(0.0, -3e19, 2e19)];
        let targets = [Vec3::ZERO];
        let mut engine = engine(2);

        for mode in SearchMode::ALL {
            let results = engine.query(&seekers, &targets, mode).unwrap();
            for i in 0..seekers.len() {
                assert!(results.has_target(i), "mode {:?}", mode);
                assert_eq!(results[i], Vec3::ZERO, "mode {:?}", mode);
            }
        }
    }

    #[test]
    fn test_free_query_function() {
        let results = query(
            &[Vec3::new(0.0, 0.0, 0.0)],
            &[Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            SearchMode::BruteForceParallel,
        )
        .unwrap();
        assert_eq!(results.get(0), Some(Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(results.get(1), None);
        assert!(results.has_target(0));
    }
}
