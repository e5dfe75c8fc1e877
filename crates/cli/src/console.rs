use remind_engine::{FeedbackEvent, FeedbackPort, TransportCommand, TransportController};
use tracing::info;

/// Transport that plays nothing and moves its clock only when told to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTransport {
    duration_tl: i64,
    position_tl: i64,
    range_end_tl: Option<i64>,
}

impl SimulatedTransport {
    pub fn new(duration_tl: i64) -> Self {
        Self {
            duration_tl,
            position_tl: 0,
            range_end_tl: None,
        }
    }

    /// Advances the clock by `delta_tl` and returns true when the commanded
    /// range finished during this step.
    pub fn advance(&mut self, delta_tl: i64) -> bool {
        let Some(end_tl) = self.range_end_tl else {
            return false;
        };
        self.position_tl = self.position_tl.saturating_add(delta_tl).min(end_tl);
        if self.position_tl < end_tl {
            return false;
        }
        self.range_end_tl = None;
        true
    }

    pub fn is_playing(&self) -> bool {
        self.range_end_tl.is_some()
    }
}

impl TransportController for SimulatedTransport {
    fn execute(&mut self, command: &TransportCommand) {
        match *command {
            TransportCommand::PlayRange { start_tl, end_tl } => {
                self.position_tl = start_tl;
                self.range_end_tl = Some(end_tl);
            }
            TransportCommand::Seek { t_tl } => {
                self.position_tl = match self.range_end_tl {
                    Some(end_tl) => t_tl.min(end_tl),
                    None => t_tl,
                };
            }
            TransportCommand::Stop => self.range_end_tl = None,
        }
        info!(?command, position_tl = self.position_tl, "transport command");
    }

    fn current_position(&self) -> i64 {
        self.position_tl
    }

    fn duration(&self) -> i64 {
        self.duration_tl
    }
}

/// Feedback port that logs each notification with its haptic style.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFeedback;

impl FeedbackPort for LoggingFeedback {
    fn notify(&mut self, event: FeedbackEvent) {
        info!(?event, strength = ?event.strength(), "feedback");
    }
}
