use serde::Serialize;

/// Instruction for the audio transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TransportCommand {
    /// Plays `[start_tl, end_tl)` and reports completion at `end_tl`.
    PlayRange { start_tl: i64, end_tl: i64 },
    Seek { t_tl: i64 },
    Stop,
}

/// Playback state tracked by the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    PlayingFree,
    PlayingLoop,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self != Self::Stopped
    }
}

/// Audio engine operations required by the player.
///
/// Implementations execute commands without feeding back into timeline
/// state; range completion is reported by the host as a
/// `SegmentPlaybackCompleted` event.
pub trait TransportController {
    /// Executes one transport command.
    fn execute(&mut self, command: &TransportCommand);

    /// Current playback position in timeline ticks.
    fn current_position(&self) -> i64;

    /// Length of the loaded track in timeline ticks.
    fn duration(&self) -> i64;
}

impl<T> TransportController for Box<T>
where
    T: TransportController + ?Sized,
{
    fn execute(&mut self, command: &TransportCommand) {
        (**self).execute(command);
    }

    fn current_position(&self) -> i64 {
        (**self).current_position()
    }

    fn duration(&self) -> i64 {
        (**self).duration()
    }
}
