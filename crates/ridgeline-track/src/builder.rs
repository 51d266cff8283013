//! The track builder: incremental clustering of peak bins into tracks.
//!
//! For each slice, detected peak bins are matched against the open tracks
//! in creation order; the first track whose last-slice extent brackets the
//! peak under the applicable margin wins. A peak that matches nothing opens
//! a new track, which is scanned last on future slices.
//!
//! Removal never happens mid-scan. Stale tracks are flagged at the top of
//! each slice (`Pruned` below the size floor, `Dormant` above it), flagged
//! tracks are skipped by the matching loop, and the pool is compacted with
//! `Vec::retain` once the slice's peaks are all placed.

use ridgeline_core::{Resettable, TrackPoint};

use crate::config::TrackerConfig;
use crate::track::{Candidate, Track, TrackId, TrackState};

/// Summary of what one slice's peaks did to the track pool.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Tracks that gained at least one member this slice.
    pub extended: Vec<TrackId>,
    /// New tracks born from unmatched peaks.
    pub born: Vec<TrackId>,
    /// Tracks removed as noise this slice.
    pub pruned: Vec<TrackId>,
    /// Tracks that went dormant this slice.
    pub dormant: Vec<TrackId>,
}

/// Owns the complete set of open tracks for one channel session.
pub struct TrackBuilder {
    minimum_group_size: usize,
    margin_same_time: usize,
    margin_low: usize,
    margin_high: usize,
    minimum_time_span: u64,
    tracks: Vec<Track>,
    next_id: u64,
}

impl TrackBuilder {
    /// Creates a builder from a validated configuration.
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            minimum_group_size: config.minimum_group_size,
            margin_same_time: config.margin_same_time,
            margin_low: config.margin_low,
            margin_high: config.margin_high,
            minimum_time_span: config.minimum_time_span,
            tracks: Vec::new(),
            next_id: 0,
        }
    }

    fn next_track_id(&mut self) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Feeds one slice's peak bins (ascending, deduplicated) into the pool.
    ///
    /// `slice_index` must be non-decreasing across calls; the pipeline
    /// enforces that contract before calling in.
    pub fn observe_peaks(&mut self, slice_index: u64, peaks: &[usize]) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        // Staleness sweep: flag tracks whose last member lags by more than
        // one slice. Flagged tracks are invisible to the matching loop and
        // pruned ones are compacted below, after the scan.
        for track in &mut self.tracks {
            if track.is_active() && track.last_slice() + 1 < slice_index {
                if track.len() <= self.minimum_group_size {
                    track.mark_pruned();
                    outcome.pruned.push(track.id());
                } else {
                    track.mark_dormant();
                    outcome.dormant.push(track.id());
                }
            }
        }

        for &peak in peaks {
            let mut matched = false;
            for track in &mut self.tracks {
                if !track.is_active() {
                    continue;
                }
                let last = track.last_slice();
                let hit = if last == slice_index {
                    track.window_contains(peak, self.margin_same_time, self.margin_same_time)
                } else {
                    // Sweep above guarantees last == slice_index - 1 here.
                    track.window_contains(peak, self.margin_low, self.margin_high)
                };
                if hit {
                    track.push(TrackPoint::new(slice_index, peak));
                    if !outcome.extended.contains(&track.id()) {
                        outcome.extended.push(track.id());
                    }
                    matched = true;
                    break;
                }
            }

            if !matched {
                let id = self.next_track_id();
                self.tracks
                    .push(Track::new(id, TrackPoint::new(slice_index, peak)));
                outcome.born.push(id);
            }
        }

        self.tracks.retain(|t| t.state() != TrackState::Pruned);
        outcome
    }

    /// Tracks still open for matching, in creation order.
    pub fn open_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.is_active())
    }

    /// Every surviving track (open and dormant), in creation order.
    pub fn all_tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Looks up a surviving track by id.
    pub fn get_track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    /// Number of tracks still open for matching.
    pub fn open_count(&self) -> usize {
        self.open_tracks().count()
    }

    /// Number of surviving tracks, dormant included.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Closes the stream: drains every surviving track and emits those that
    /// qualify as candidates.
    ///
    /// A track must exceed the size floor and cover at least the configured
    /// slice span; everything else is discarded with the drained pool. Ids
    /// keep counting up afterwards, so candidates from consecutive runs of
    /// one session never collide.
    pub fn finalize(&mut self) -> Vec<Candidate> {
        let minimum_group_size = self.minimum_group_size;
        let minimum_time_span = self.minimum_time_span;
        self.tracks
            .drain(..)
            .filter(|track| {
                track.len() > minimum_group_size && track.time_span() >= minimum_time_span
            })
            .map(Candidate::from)
            .collect()
    }
}

impl Resettable for TrackBuilder {
    fn reset(&mut self) {
        self.tracks.clear();
        self.next_id = 0;
    }
}
