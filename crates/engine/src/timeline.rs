use std::ops::Range;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

/// One contiguous time range `[start_tl, end_tl)` of the loaded track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    pub start_tl: i64,
    pub end_tl: i64,
}

impl Segment {
    /// Returns segment length in timeline ticks.
    pub fn duration_tl(&self) -> i64 {
        self.end_tl - self.start_tl
    }

    /// Returns true when `t_tl` lies in the half-open range.
    pub fn contains(&self, t_tl: i64) -> bool {
        self.start_tl <= t_tl && t_tl < self.end_tl
    }
}

/// Ordered partition of `[0, duration)` into contiguous segments.
///
/// The timeline always holds at least one segment; segments are sorted,
/// never overlap and leave no gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    segments: Vec<Segment>,
    duration_tl: i64,
}

/// Structural change applied to a timeline, used to re-resolve selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineMutation {
    /// Segment `left` was cut; its right half now sits at `left + 1`.
    Split { left: usize },
    /// Segments `index` and `index + 1` were combined into `index`.
    Merge { index: usize },
    Clear,
}

impl TimelineMutation {
    /// Indices of the segments produced by the mutation.
    pub fn affected_range(&self) -> Range<usize> {
        match *self {
            Self::Split { left } => left..left + 2,
            Self::Merge { index } => index..index + 1,
            Self::Clear => 0..1,
        }
    }
}

impl Timeline {
    /// Creates a timeline holding one segment that spans the whole track.
    ///
    /// # Example
    /// ```
    /// use remind_engine::Timeline;
    ///
    /// let timeline = Timeline::new(100_000_000).expect("positive duration");
    /// assert_eq!(timeline.len(), 1);
    /// assert_eq!(timeline.segments()[0].end_tl, 100_000_000);
    /// ```
    pub fn new(duration_tl: i64) -> Result<Self> {
        if duration_tl <= 0 {
            warn!(duration_tl, "timeline rejected: non-positive duration");
            return Err(EngineError::InvalidDuration { duration_tl });
        }

        Ok(Self {
            segments: vec![full_track(duration_tl)],
            duration_tl,
        })
    }

    /// Returns the fixed track duration in timeline ticks.
    pub fn duration_tl(&self) -> i64 {
        self.duration_tl
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segment at `index`.
    pub fn segment_at(&self, index: usize) -> Result<Segment> {
        self.segments
            .get(index)
            .copied()
            .ok_or(EngineError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            })
    }

    /// Finds the index of the segment with `start <= t_tl < end`.
    ///
    /// `t_tl == duration` resolves to the last segment so a playhead parked
    /// at the end of the track still has a home.
    pub fn segment_containing(&self, t_tl: i64) -> Result<usize> {
        self.check_bounds(t_tl)?;
        let index = self
            .segments
            .partition_point(|segment| segment.end_tl <= t_tl);
        Ok(index.min(self.segments.len() - 1))
    }

    /// Returns true when `t_tl` is the start or end of some segment.
    pub fn is_boundary(&self, t_tl: i64) -> bool {
        t_tl == self.duration_tl
            || self
                .segments
                .binary_search_by_key(&t_tl, |segment| segment.start_tl)
                .is_ok()
    }

    /// Cuts the segment containing `at_tl` into `[start, at)` and `[at, end)`.
    ///
    /// Returns the index of the new left segment, or `None` when `at_tl`
    /// already is a boundary (including `0` and the track end).
    ///
    /// # Example
    /// ```
    /// use remind_engine::Timeline;
    ///
    /// let mut timeline = Timeline::new(100).expect("positive duration");
    /// assert_eq!(timeline.split_at(30).expect("in bounds"), Some(0));
    /// assert_eq!(timeline.split_at(30).expect("in bounds"), None);
    /// assert_eq!(timeline.len(), 2);
    /// ```
    pub fn split_at(&mut self, at_tl: i64) -> Result<Option<usize>> {
        self.check_bounds(at_tl)?;
        if self.is_boundary(at_tl) {
            debug!(at_tl, "split ignored: boundary point");
            return Ok(None);
        }

        let index = self.segment_containing(at_tl)?;
        let current = self.segments[index];
        let left = Segment {
            end_tl: at_tl,
            ..current
        };
        let right = Segment {
            start_tl: at_tl,
            ..current
        };

        self.segments[index] = left;
        self.segments.insert(index + 1, right);
        debug_assert!(self.is_partition());

        debug!(
            at_tl,
            index,
            left_duration = left.duration_tl(),
            right_duration = right.duration_tl(),
            segment_count = self.segments.len(),
            "split accepted"
        );
        Ok(Some(index))
    }

    /// Replaces segments `index` and `index + 1` with their union.
    ///
    /// Fails with `IndexOutOfRange` when `index` is the last segment.
    pub fn merge_adjacent(&mut self, index: usize) -> Result<Segment> {
        let len = self.segments.len();
        let Some(next_index) = index.checked_add(1).filter(|next| *next < len) else {
            warn!(index, len, "merge rejected: no following segment");
            return Err(EngineError::IndexOutOfRange {
                index: index.saturating_add(1),
                len,
            });
        };

        let next = self.segments.remove(next_index);
        let merged = Segment {
            start_tl: self.segments[index].start_tl,
            end_tl: next.end_tl,
        };
        self.segments[index] = merged;
        debug_assert!(self.is_partition());

        debug!(
            index,
            start_tl = merged.start_tl,
            end_tl = merged.end_tl,
            segment_count = self.segments.len(),
            "merge accepted"
        );
        Ok(merged)
    }

    /// Drops every cut, leaving the single full-track segment.
    pub fn clear(&mut self) {
        let removed = self.segments.len();
        self.segments.clear();
        self.segments.push(full_track(self.duration_tl));
        debug!(removed, "timeline cleared");
    }

    /// Checks sortedness, contiguity and full coverage of the track.
    pub fn is_partition(&self) -> bool {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return false;
        };
        first.start_tl == 0
            && last.end_tl == self.duration_tl
            && self
                .segments
                .iter()
                .all(|segment| segment.start_tl < segment.end_tl)
            && self
                .segments
                .windows(2)
                .all(|pair| pair[0].end_tl == pair[1].start_tl)
    }

    fn check_bounds(&self, t_tl: i64) -> Result<()> {
        if t_tl < 0 || t_tl > self.duration_tl {
            warn!(t_tl, duration_tl = self.duration_tl, "timestamp out of bounds");
            return Err(EngineError::OutOfBounds {
                t_tl,
                duration_tl: self.duration_tl,
            });
        }
        Ok(())
    }
}

fn full_track(duration_tl: i64) -> Segment {
    Segment {
        start_tl: 0,
        end_tl: duration_tl,
    }
}
