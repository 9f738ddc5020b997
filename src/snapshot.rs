//! Per-frame position snapshots
//!
//! Copies the externally owned seeker and target positions into flat buffers
//! so a query never observes positions changing mid-flight. The buffers keep
//! their capacity across frames when captured through [`PositionSnapshot::capture`].

use glam::Vec3;

use crate::error::{PositionSet, QueryError, Result};

/// Immutable-per-frame copy of seeker and target positions
///
/// Index `i` of [`seekers`](Self::seekers) corresponds to index `i` of the
/// seeker provider, and likewise for targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionSnapshot {
    seekers: Vec<Vec3>,
    targets: Vec<Vec3>,
}

impl PositionSnapshot {
    /// Create an empty snapshot with room for the given set sizes
    pub fn with_capacity(seekers: usize, targets: usize) -> Self {
        Self {
            seekers: Vec::with_capacity(seekers),
            targets: Vec::with_capacity(targets),
        }
    }

    /// Replace the snapshot contents with this frame's positions
    ///
    /// Existing allocations are reused; they only grow when a set is larger
    /// than any previously captured one.
    pub fn capture(&mut self, seekers: &[Vec3], targets: &[Vec3]) {
        self.seekers.clear();
        self.seekers.extend_from_slice(seekers);
        self.targets.clear();
        self.targets.extend_from_slice(targets);
    }

    /// Capture positions from arbitrary providers (e.g. component iterators)
    pub fn capture_from<S, T>(&mut self, seekers: S, targets: T)
    where
        S: IntoIterator<Item = Vec3>,
        T: IntoIterator<Item = Vec3>,
    {
        self.seekers.clear();
        self.seekers.extend(seekers);
        self.targets.clear();
        self.targets.extend(targets);
    }

    /// Seeker positions captured for this frame
    #[inline]
    pub fn seekers(&self) -> &[Vec3] {
        &self.seekers
    }

    /// Target positions captured for this frame, in provider order
    #[inline]
    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    /// Number of seekers (N)
    #[inline]
    pub fn seeker_count(&self) -> usize {
        self.seekers.len()
    }

    /// Number of targets (M)
    #[inline]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

/// Copy seeker and target positions into a fresh snapshot
///
/// # Example
///
/// ```
/// use nearest_target::*;
///
/// let seekers = [Vec3::ZERO];
/// let targets = [Vec3::X, Vec3::Y];
/// let snap = snapshot(&seekers, &targets);
/// assert_eq!(snap.seeker_count(), 1);
/// assert_eq!(snap.targets(), &targets);
/// ```
pub fn snapshot(seekers: &[Vec3], targets: &[Vec3]) -> PositionSnapshot {
    PositionSnapshot {
        seekers: seekers.to_vec(),
        targets: targets.to_vec(),
    }
}

/// Fail on the first position with a non-finite coordinate
pub fn validate_positions(positions: &[Vec3], set: PositionSet) -> Result<()> {
    match positions.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(QueryError::InvalidInput {
            set,
            index,
            position: positions[index],
        }),
        None => Ok(()),
    }
}
