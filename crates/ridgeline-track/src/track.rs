//! Track state: an ordered run of (slice, bin) members and its lifecycle.
//!
//! A track's matching window is defined entirely by its members at the most
//! recent slice, so that extent is cached incrementally as members are
//! appended; the full bounding box is only computed when a track is emitted
//! as a candidate.

use serde::{Deserialize, Serialize};

use ridgeline_core::TrackPoint;

/// Stable identifier for one track within a channel session.
///
/// Allocated monotonically by the track builder; ids are never reused, so a
/// sink can key emitted tracks by id across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a track.
///
/// `Active` tracks participate in matching. A stale track above the size
/// floor goes `Dormant`: it is no longer scanned (its window can never
/// bracket a current peak again) but survives until the end-of-stream
/// sweep. A stale track at or below the floor is `Pruned` and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackState {
    /// Open for matching.
    Active,
    /// Stale but large enough to be a candidate; awaiting finalization.
    Dormant,
    /// Stale and too small; dropped as noise.
    Pruned,
}

/// Time/frequency bounding box of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackBounds {
    /// Slice index of the earliest member.
    pub first_slice: u64,
    /// Slice index of the latest member.
    pub last_slice: u64,
    /// Lowest bin index among all members.
    pub min_bin: usize,
    /// Highest bin index among all members.
    pub max_bin: usize,
}

/// One candidate signal: an ordered collection of excess-power bins.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    state: TrackState,
    points: Vec<TrackPoint>,
    /// Extent of the members at the last slice, maintained on append.
    last_min_bin: usize,
    last_max_bin: usize,
}

impl Track {
    /// Opens a track from its first member.
    pub(crate) fn new(id: TrackId, origin: TrackPoint) -> Self {
        Self {
            id,
            state: TrackState::Active,
            points: vec![origin],
            last_min_bin: origin.bin,
            last_max_bin: origin.bin,
        }
    }

    /// Appends a member.
    ///
    /// Members arrive in non-decreasing slice order (the caller feeds
    /// slices in order); a member at a newer slice resets the last-slice
    /// extent, a same-slice member widens it.
    pub(crate) fn push(&mut self, point: TrackPoint) {
        debug_assert!(point.slice >= self.last_slice());
        if point.slice > self.last_slice() {
            self.last_min_bin = point.bin;
            self.last_max_bin = point.bin;
        } else {
            self.last_min_bin = self.last_min_bin.min(point.bin);
            self.last_max_bin = self.last_max_bin.max(point.bin);
        }
        self.points.push(point);
    }

    /// `true` when `bin` falls inside the track's matching window,
    /// `[min - margin_low, max + margin_high]` inclusive on both ends.
    pub fn window_contains(&self, bin: usize, margin_low: usize, margin_high: usize) -> bool {
        let bin = bin as i64;
        let lo = self.last_min_bin as i64 - margin_low as i64;
        let hi = self.last_max_bin as i64 + margin_high as i64;
        lo <= bin && bin <= hi
    }

    pub(crate) fn mark_dormant(&mut self) {
        tracing::debug!(track_id = %self.id, members = self.points.len(), "track went dormant");
        self.state = TrackState::Dormant;
    }

    pub(crate) fn mark_pruned(&mut self) {
        tracing::debug!(track_id = %self.id, members = self.points.len(), "track pruned as noise");
        self.state = TrackState::Pruned;
    }

    /// Stable track identifier.
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrackState {
        self.state
    }

    /// `true` while the track may still accept members.
    pub fn is_active(&self) -> bool {
        self.state == TrackState::Active
    }

    /// Members in insertion order (non-decreasing slice index).
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Number of members.
    #[allow(clippy::len_without_is_empty)] // a track is never empty
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Slice index of the earliest member.
    pub fn first_slice(&self) -> u64 {
        self.points[0].slice
    }

    /// Slice index of the latest member.
    pub fn last_slice(&self) -> u64 {
        self.points[self.points.len() - 1].slice
    }

    /// `[min, max]` bin extent of the members at the latest slice.
    pub fn extent_at_last_slice(&self) -> (usize, usize) {
        (self.last_min_bin, self.last_max_bin)
    }

    /// Slice-index span from first to last member.
    pub fn time_span(&self) -> u64 {
        self.last_slice() - self.first_slice()
    }

    /// Bounding box over every member.
    pub fn bounds(&self) -> TrackBounds {
        let mut min_bin = usize::MAX;
        let mut max_bin = 0;
        for point in &self.points {
            min_bin = min_bin.min(point.bin);
            max_bin = max_bin.max(point.bin);
        }
        TrackBounds {
            first_slice: self.first_slice(),
            last_slice: self.last_slice(),
            min_bin,
            max_bin,
        }
    }
}

/// A finalized track as handed to the track sink.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    /// Id the track carried while open.
    pub track_id: TrackId,
    /// Members in insertion order.
    pub points: Vec<TrackPoint>,
    /// Time/frequency bounding box.
    pub bounds: TrackBounds,
}

impl From<Track> for Candidate {
    fn from(track: Track) -> Self {
        let bounds = track.bounds();
        Self {
            track_id: track.id,
            points: track.points,
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(points: &[(u64, usize)]) -> Track {
        let mut iter = points.iter();
        let &(slice, bin) = iter.next().expect("at least one point");
        let mut track = Track::new(TrackId(0), TrackPoint::new(slice, bin));
        for &(slice, bin) in iter {
            track.push(TrackPoint::new(slice, bin));
        }
        track
    }

    #[test]
    fn test_new_track_extent() {
        let t = track(&[(4, 10)]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.last_slice(), 4);
        assert_eq!(t.extent_at_last_slice(), (10, 10));
        assert_eq!(t.time_span(), 0);
        assert!(t.is_active());
    }

    #[test]
    fn test_same_slice_members_widen_extent() {
        let t = track(&[(2, 5), (2, 8), (2, 3)]);
        assert_eq!(t.extent_at_last_slice(), (3, 8));
    }

    #[test]
    fn test_new_slice_resets_extent() {
        let t = track(&[(0, 5), (0, 9), (1, 7)]);
        assert_eq!(t.last_slice(), 1);
        assert_eq!(t.extent_at_last_slice(), (7, 7));
    }

    #[test]
    fn test_window_is_inclusive_and_asymmetric() {
        let t = track(&[(0, 10)]);
        // margins low=1, high=3: window [9, 13]
        assert!(t.window_contains(9, 1, 3));
        assert!(t.window_contains(13, 1, 3));
        assert!(!t.window_contains(8, 1, 3));
        assert!(!t.window_contains(14, 1, 3));
    }

    #[test]
    fn test_window_near_zero_does_not_underflow() {
        let t = track(&[(0, 1)]);
        assert!(t.window_contains(0, 3, 0));
        assert!(!t.window_contains(5, 3, 0));
    }

    #[test]
    fn test_bounds_cover_all_members() {
        let t = track(&[(3, 12), (4, 14), (4, 9), (5, 10)]);
        let bounds = t.bounds();
        assert_eq!(
            bounds,
            TrackBounds {
                first_slice: 3,
                last_slice: 5,
                min_bin: 9,
                max_bin: 14,
            }
        );
        assert_eq!(t.time_span(), 2);
    }

    #[test]
    fn test_candidate_serializes() {
        let candidate = Candidate::from(track(&[(0, 7), (1, 8)]));
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["track_id"], 0);
        assert_eq!(json["points"][1]["bin"], 8);
        assert_eq!(json["bounds"]["last_slice"], 1);
    }
}
