use serde::Serialize;
use tracing::{debug, info};

use crate::cursor::{Advance, Direction, PlaybackCursor};
use crate::error::{EngineError, Result};
use crate::feedback::FeedbackEvent;
use crate::settings::SessionSettings;
use crate::timeline::{Segment, Timeline, TimelineMutation};
use crate::transport::{PlaybackState, TransportCommand};

/// Addresses one segment either by position or by a time inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSelector {
    Index(usize),
    Time(i64),
}

/// Discrete input events driving a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    /// Cuts the segment under `at_tl`; cutting on a boundary does nothing.
    Split {
        at_tl: i64,
    },
    /// Merges the selected segment, or the one under the playhead, with its
    /// successor.
    MergeWithNext,
    Clear,
    SelectSegment(SegmentSelector),
    /// Selects a segment, enables loop mode and starts looping it.
    LoopSegment(SegmentSelector),
    Advance(Direction),
    ToggleLoop {
        enabled: bool,
    },
    PlayPauseToggle,
    /// The transport reached the end of the commanded range.
    SegmentPlaybackCompleted,
    /// Scrub or long-press placement of the playhead.
    SetPlayhead {
        t_tl: i64,
    },
    /// Periodic read-only sample of the transport position.
    PositionPolled {
        t_tl: i64,
    },
}

/// Outputs emitted while handling one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    Transport(TransportCommand),
    Feedback(FeedbackEvent),
    TimelineChanged(TimelineSnapshot),
    StateChanged { state: PlaybackState },
    PlayheadChanged { t_tl: i64 },
    /// Navigation hit the first or last segment; not an error.
    NoAdjacentSegment { direction: Direction },
    Error(SessionErrorEvent),
}

/// Coarse error category delivered to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionErrorKind {
    OutOfBounds,
    IndexOutOfRange,
    NoSelection,
    Other,
}

impl From<&EngineError> for SessionErrorKind {
    fn from(value: &EngineError) -> Self {
        match value {
            EngineError::OutOfBounds { .. } => Self::OutOfBounds,
            EngineError::IndexOutOfRange { .. } => Self::IndexOutOfRange,
            EngineError::NoSelection => Self::NoSelection,
            _ => Self::Other,
        }
    }
}

/// Error payload emitted as an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionErrorEvent {
    pub kind: SessionErrorKind,
    pub message: String,
}

impl SessionErrorEvent {
    pub fn from_error(error: &EngineError) -> Self {
        Self {
            kind: SessionErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// Immutable view of the session for hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSnapshot {
    pub duration_tl: i64,
    pub segments: Vec<Segment>,
    pub selected: Option<usize>,
    pub looping: bool,
    pub state: PlaybackState,
    pub playhead_tl: i64,
}

/// Timeline, selection and playback state machine for one loaded track.
///
/// Every event is handled synchronously and either fails without touching
/// state or returns the outputs of the transition.
#[derive(Debug, Clone)]
pub struct Session {
    timeline: Timeline,
    cursor: PlaybackCursor,
    state: PlaybackState,
    playhead_tl: i64,
    last_scrub_tick_tl: i64,
    settings: SessionSettings,
}

impl Session {
    /// Starts a session over a freshly loaded track.
    ///
    /// # Example
    /// ```
    /// use remind_engine::{Session, SessionSettings, TimelineEvent};
    ///
    /// let mut session = Session::new(100_000_000, SessionSettings::default())
    ///     .expect("positive duration");
    /// session
    ///     .handle_event(TimelineEvent::Split { at_tl: 30_000_000 })
    ///     .expect("split in bounds");
    /// assert_eq!(session.timeline().len(), 2);
    /// ```
    pub fn new(duration_tl: i64, settings: SessionSettings) -> Result<Self> {
        settings.validate()?;
        let timeline = Timeline::new(duration_tl)?;
        info!(duration_tl, "session started");

        Ok(Self {
            timeline,
            cursor: PlaybackCursor::new(),
            state: PlaybackState::Stopped,
            playhead_tl: 0,
            last_scrub_tick_tl: 0,
            settings,
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playhead_tl(&self) -> i64 {
        self.playhead_tl
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            duration_tl: self.timeline.duration_tl(),
            segments: self.timeline.segments().to_vec(),
            selected: self.cursor.selected_index(),
            looping: self.cursor.is_looping(),
            state: self.state,
            playhead_tl: self.playhead_tl,
        }
    }

    /// Applies one event and returns emitted outputs.
    pub fn handle_event(&mut self, event: TimelineEvent) -> Result<Vec<Output>> {
        debug!(?event, state = ?self.state, "handling event");
        match event {
            TimelineEvent::Split { at_tl } => self.split(at_tl),
            TimelineEvent::MergeWithNext => self.merge_with_next(),
            TimelineEvent::Clear => Ok(self.clear()),
            TimelineEvent::SelectSegment(selector) => self.select(selector),
            TimelineEvent::LoopSegment(selector) => self.loop_segment(selector),
            TimelineEvent::Advance(direction) => self.advance(direction),
            TimelineEvent::ToggleLoop { enabled } => Ok(self.toggle_loop(enabled)),
            TimelineEvent::PlayPauseToggle => Ok(self.play_pause_toggle()),
            TimelineEvent::SegmentPlaybackCompleted => Ok(self.segment_playback_completed()),
            TimelineEvent::SetPlayhead { t_tl } => self.set_playhead(t_tl),
            TimelineEvent::PositionPolled { t_tl } => self.position_polled(t_tl),
        }
    }

    fn split(&mut self, at_tl: i64) -> Result<Vec<Output>> {
        let before = self.loop_range();
        let Some(left) = self.timeline.split_at(at_tl)? else {
            return Ok(Vec::new());
        };
        Ok(self.after_mutation(TimelineMutation::Split { left }, before))
    }

    fn merge_with_next(&mut self) -> Result<Vec<Output>> {
        let index = match self.cursor.selected_index() {
            Some(index) => index,
            None => self.timeline.segment_containing(self.playhead_tl)?,
        };
        let before = self.loop_range();
        self.timeline.merge_adjacent(index)?;
        Ok(self.after_mutation(TimelineMutation::Merge { index }, before))
    }

    fn clear(&mut self) -> Vec<Output> {
        let before = self.loop_range();
        self.timeline.clear();
        self.after_mutation(TimelineMutation::Clear, before)
    }

    fn after_mutation(
        &mut self,
        mutation: TimelineMutation,
        before: Option<Segment>,
    ) -> Vec<Output> {
        self.cursor.on_timeline_mutated(&self.timeline, mutation);

        let mut outputs = vec![Output::TimelineChanged(self.snapshot())];
        let after = self.loop_range();
        if let Some(segment) = after.filter(|segment| Some(*segment) != before) {
            info!(
                ?mutation,
                start_tl = segment.start_tl,
                end_tl = segment.end_tl,
                "looped segment changed; restarting"
            );
            outputs.push(Output::Transport(play_range(segment)));
        }
        outputs
    }

    fn select(&mut self, selector: SegmentSelector) -> Result<Vec<Output>> {
        let previous = self.cursor.selected_segment(&self.timeline);
        self.select_by(selector)?;
        Ok(self.after_selection(previous))
    }

    fn loop_segment(&mut self, selector: SegmentSelector) -> Result<Vec<Output>> {
        let previous = self.cursor.selected_segment(&self.timeline);
        let (index, segment) = self.select_by(selector)?;

        let mut outputs = Vec::new();
        if previous != Some(segment) {
            outputs.push(Output::Feedback(FeedbackEvent::SegmentChanged { index }));
        }
        if !self.cursor.is_looping() {
            self.cursor.toggle_loop(true);
            outputs.push(Output::Feedback(FeedbackEvent::LoopToggled { enabled: true }));
        }
        self.transition(PlaybackState::PlayingLoop, &mut outputs);
        outputs.push(Output::Transport(play_range(segment)));
        Ok(outputs)
    }

    fn advance(&mut self, direction: Direction) -> Result<Vec<Output>> {
        let previous = self.cursor.selected_segment(&self.timeline);
        match self.cursor.advance(&self.timeline, direction)? {
            Advance::Moved { .. } => Ok(self.after_selection(previous)),
            Advance::NoAdjacentSegment => Ok(vec![Output::NoAdjacentSegment { direction }]),
        }
    }

    fn select_by(&mut self, selector: SegmentSelector) -> Result<(usize, Segment)> {
        let index = match selector {
            SegmentSelector::Index(index) => index,
            SegmentSelector::Time(t_tl) => self.timeline.segment_containing(t_tl)?,
        };
        let segment = self.cursor.select(&self.timeline, index)?;
        Ok((index, segment))
    }

    fn after_selection(&mut self, previous: Option<Segment>) -> Vec<Output> {
        let (Some(index), Some(segment)) = (
            self.cursor.selected_index(),
            self.cursor.selected_segment(&self.timeline),
        ) else {
            return Vec::new();
        };
        if previous == Some(segment) {
            return Vec::new();
        }

        let mut outputs = vec![Output::Feedback(FeedbackEvent::SegmentChanged { index })];
        if self.state == PlaybackState::PlayingLoop {
            outputs.push(Output::Transport(play_range(segment)));
        } else {
            self.playhead_tl = segment.start_tl;
            outputs.push(Output::PlayheadChanged {
                t_tl: segment.start_tl,
            });
            outputs.push(Output::Transport(TransportCommand::Seek {
                t_tl: segment.start_tl,
            }));
        }
        outputs
    }

    fn toggle_loop(&mut self, enabled: bool) -> Vec<Output> {
        let mut outputs = Vec::new();
        if self.cursor.is_looping() != enabled {
            self.cursor.toggle_loop(enabled);
            outputs.push(Output::Feedback(FeedbackEvent::LoopToggled { enabled }));
        }

        let selected = self.cursor.selected_segment(&self.timeline);
        match (self.state, enabled, selected) {
            (PlaybackState::PlayingFree, true, Some(_)) => {
                self.transition(PlaybackState::PlayingLoop, &mut outputs);
                outputs.push(Output::Transport(self.resulting_command()));
            }
            (PlaybackState::PlayingLoop, false, _) => {
                self.transition(PlaybackState::PlayingFree, &mut outputs);
                outputs.push(Output::Transport(self.resulting_command()));
            }
            _ => {}
        }
        outputs
    }

    fn play_pause_toggle(&mut self) -> Vec<Output> {
        let mut outputs = Vec::new();
        if self.state.is_playing() {
            self.transition(PlaybackState::Stopped, &mut outputs);
            outputs.push(Output::Transport(TransportCommand::Stop));
            outputs.push(Output::Feedback(FeedbackEvent::PlaybackToggled { playing: false }));
            return outputs;
        }

        let loop_ready =
            self.cursor.is_looping() && self.cursor.selected_segment(&self.timeline).is_some();
        if loop_ready {
            self.transition(PlaybackState::PlayingLoop, &mut outputs);
        } else {
            if self.settings.restart_at_track_end && self.playhead_tl >= self.timeline.duration_tl()
            {
                self.playhead_tl = 0;
                outputs.push(Output::PlayheadChanged { t_tl: 0 });
            }
            self.transition(PlaybackState::PlayingFree, &mut outputs);
        }
        outputs.push(Output::Transport(self.resulting_command()));
        outputs.push(Output::Feedback(FeedbackEvent::PlaybackToggled { playing: true }));
        outputs
    }

    fn segment_playback_completed(&mut self) -> Vec<Output> {
        match self.state {
            PlaybackState::PlayingLoop => match self.loop_range() {
                Some(segment) => {
                    debug!(
                        start_tl = segment.start_tl,
                        end_tl = segment.end_tl,
                        "loop restart"
                    );
                    self.playhead_tl = segment.start_tl;
                    vec![Output::Transport(play_range(segment))]
                }
                None => {
                    let mut outputs = Vec::new();
                    self.transition(PlaybackState::Stopped, &mut outputs);
                    outputs
                }
            },
            PlaybackState::PlayingFree => {
                let mut outputs = Vec::new();
                self.playhead_tl = self.timeline.duration_tl();
                outputs.push(Output::PlayheadChanged {
                    t_tl: self.playhead_tl,
                });
                self.transition(PlaybackState::Stopped, &mut outputs);
                outputs
            }
            PlaybackState::Stopped => {
                debug!("completion ignored while stopped");
                Vec::new()
            }
        }
    }

    fn set_playhead(&mut self, t_tl: i64) -> Result<Vec<Output>> {
        let index = self.timeline.segment_containing(t_tl)?;
        let mut outputs = self.move_playhead(t_tl);

        let step_tl = self.settings.scrub_step_tl(self.timeline.duration_tl());
        if (t_tl - self.last_scrub_tick_tl).abs() >= step_tl {
            self.last_scrub_tick_tl = t_tl;
            outputs.push(Output::Feedback(FeedbackEvent::ScrubTick));
        }

        let looped_index = self.cursor.selected_index();
        if self.state != PlaybackState::PlayingLoop || looped_index == Some(index) {
            outputs.push(Output::Transport(TransportCommand::Seek { t_tl }));
            return Ok(outputs);
        }

        let segment = self.cursor.select(&self.timeline, index)?;
        outputs.push(Output::Feedback(FeedbackEvent::SegmentChanged { index }));
        let start_tl = if t_tl < segment.end_tl {
            t_tl
        } else {
            segment.start_tl
        };
        outputs.push(Output::Transport(TransportCommand::PlayRange {
            start_tl,
            end_tl: segment.end_tl,
        }));
        Ok(outputs)
    }

    fn position_polled(&mut self, t_tl: i64) -> Result<Vec<Output>> {
        self.timeline.segment_containing(t_tl)?;
        Ok(self.move_playhead(t_tl))
    }

    fn move_playhead(&mut self, t_tl: i64) -> Vec<Output> {
        let previous_start = self.playing_segment_start(self.playhead_tl);
        self.playhead_tl = t_tl;

        let mut outputs = vec![Output::PlayheadChanged { t_tl }];
        if self.playing_segment_start(t_tl) != previous_start {
            outputs.push(Output::Feedback(FeedbackEvent::SegmentBoundaryCrossed));
        }
        outputs
    }

    /// Start of the segment being played at `t_tl`; a looped range owns its end.
    fn playing_segment_start(&self, t_tl: i64) -> Option<i64> {
        match self.loop_range() {
            Some(range) if t_tl == range.end_tl => Some(range.start_tl),
            _ => self.segment_start_under(t_tl),
        }
    }

    fn segment_start_under(&self, t_tl: i64) -> Option<i64> {
        let index = self.timeline.segment_containing(t_tl).ok()?;
        self.timeline
            .segment_at(index)
            .ok()
            .map(|segment| segment.start_tl)
    }

    fn loop_range(&self) -> Option<Segment> {
        if self.state != PlaybackState::PlayingLoop {
            return None;
        }
        self.cursor.selected_segment(&self.timeline)
    }

    fn resulting_command(&self) -> TransportCommand {
        self.cursor
            .resulting_command(&self.timeline, self.state, self.playhead_tl)
    }

    fn transition(&mut self, next: PlaybackState, outputs: &mut Vec<Output>) {
        if self.state == next {
            return;
        }
        info!(from = ?self.state, to = ?next, "playback state changed");
        self.state = next;
        outputs.push(Output::StateChanged { state: next });
    }
}

fn play_range(segment: Segment) -> TransportCommand {
    TransportCommand::PlayRange {
        start_tl: segment.start_tl,
        end_tl: segment.end_tl,
    }
}
