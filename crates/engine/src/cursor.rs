use serde::Serialize;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::timeline::{Segment, Timeline, TimelineMutation};
use crate::transport::{PlaybackState, TransportCommand};

/// Navigation direction between neighbouring segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    /// The selection already sits at the edge; nothing changed.
    NoAdjacentSegment,
}

/// Selection and loop state over a timeline the cursor does not own.
///
/// The selected segment is tracked by its start time as well as by index so
/// that the selection survives index shifts caused by splits and merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    selected: Option<usize>,
    tracked_start_tl: Option<i64>,
    looping: bool,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Returns the selected segment, if any.
    pub fn selected_segment(&self, timeline: &Timeline) -> Option<Segment> {
        self.selected
            .and_then(|index| timeline.segment_at(index).ok())
    }

    /// Selects the segment at `index`.
    pub fn select(&mut self, timeline: &Timeline, index: usize) -> Result<Segment> {
        let segment = timeline.segment_at(index)?;
        self.selected = Some(index);
        self.tracked_start_tl = Some(segment.start_tl);
        debug!(index, start_tl = segment.start_tl, "segment selected");
        Ok(segment)
    }

    /// Selects the segment containing `t_tl`.
    pub fn select_by_time(&mut self, timeline: &Timeline, t_tl: i64) -> Result<usize> {
        let index = timeline.segment_containing(t_tl)?;
        self.select(timeline, index)?;
        Ok(index)
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.tracked_start_tl = None;
    }

    /// Moves the selection one segment in `direction`.
    ///
    /// Fails with `NoSelection` when nothing is selected.
    pub fn advance(&mut self, timeline: &Timeline, direction: Direction) -> Result<Advance> {
        let current = self.selected.ok_or(EngineError::NoSelection)?;
        let target = match direction {
            Direction::Next => current.checked_add(1).filter(|next| *next < timeline.len()),
            Direction::Previous => current.checked_sub(1),
        };

        let Some(index) = target else {
            debug!(current, ?direction, "advance ignored: no adjacent segment");
            return Ok(Advance::NoAdjacentSegment);
        };
        self.select(timeline, index)?;
        Ok(Advance::Moved { index })
    }

    pub fn toggle_loop(&mut self, enabled: bool) {
        self.looping = enabled;
    }

    /// Re-resolves the selection after `timeline` went through `mutation`.
    ///
    /// The segment now containing the previously tracked start time becomes
    /// the selection. A split keeps the left half, a merge or clear picks the
    /// segment that absorbed the old one.
    pub fn on_timeline_mutated(&mut self, timeline: &Timeline, mutation: TimelineMutation) {
        let Some(start_tl) = self.tracked_start_tl else {
            return;
        };

        let previous = self.selected;
        let resolved = match timeline.segment_containing(start_tl) {
            Ok(index) => index,
            Err(_) => {
                self.deselect();
                return;
            }
        };
        self.selected = Some(resolved);
        self.tracked_start_tl = timeline
            .segment_at(resolved)
            .ok()
            .map(|segment| segment.start_tl);

        debug!(
            ?mutation,
            affected = ?mutation.affected_range(),
            previous = ?previous,
            resolved,
            "selection re-resolved"
        );
    }

    /// Derives the transport command implied by `state` at `playhead_tl`.
    ///
    /// Looping with a selection plays the selected range; otherwise play runs
    /// from the playhead to the end of the track.
    pub fn resulting_command(
        &self,
        timeline: &Timeline,
        state: PlaybackState,
        playhead_tl: i64,
    ) -> TransportCommand {
        if state == PlaybackState::Stopped {
            return TransportCommand::Stop;
        }

        match self.selected_segment(timeline) {
            Some(segment) if self.looping => TransportCommand::PlayRange {
                start_tl: segment.start_tl,
                end_tl: segment.end_tl,
            },
            _ => TransportCommand::PlayRange {
                start_tl: playhead_tl.clamp(0, timeline.duration_tl()),
                end_tl: timeline.duration_tl(),
            },
        }
    }
}
