use serde::Serialize;

/// Discrete notification for haptic and sound feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "feedback", rename_all = "snake_case")]
pub enum FeedbackEvent {
    SegmentBoundaryCrossed,
    SegmentChanged { index: usize },
    LoopToggled { enabled: bool },
    /// The scrubbing playhead travelled one feedback step.
    ScrubTick,
    PlaybackToggled { playing: bool },
}

/// Haptic style suggested for a feedback event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStrength {
    Light,
    Medium,
    Heavy,
    Selection,
}

impl FeedbackEvent {
    /// Suggested haptic style; ports are free to ignore it.
    pub fn strength(&self) -> FeedbackStrength {
        match self {
            Self::SegmentBoundaryCrossed => FeedbackStrength::Medium,
            Self::SegmentChanged { .. } => FeedbackStrength::Selection,
            Self::LoopToggled { .. } => FeedbackStrength::Light,
            Self::ScrubTick | Self::PlaybackToggled { .. } => FeedbackStrength::Heavy,
        }
    }
}

/// Fire-and-forget sink for feedback notifications.
pub trait FeedbackPort {
    fn notify(&mut self, event: FeedbackEvent);
}

/// Feedback port that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl FeedbackPort for SilentFeedback {
    fn notify(&mut self, _event: FeedbackEvent) {}
}

impl<F> FeedbackPort for Box<F>
where
    F: FeedbackPort + ?Sized,
{
    fn notify(&mut self, event: FeedbackEvent) {
        (**self).notify(event);
    }
}

#[cfg(test)]
mod tests {
    use super::{FeedbackEvent, FeedbackStrength};

    #[test]
    fn tap_and_scrub_feedback_are_heavy() {
        assert_eq!(
            FeedbackEvent::PlaybackToggled { playing: true }.strength(),
            FeedbackStrength::Heavy
        );
        assert_eq!(FeedbackEvent::ScrubTick.strength(), FeedbackStrength::Heavy);
        assert_eq!(
            FeedbackEvent::SegmentChanged { index: 2 }.strength(),
            FeedbackStrength::Selection
        );
    }
}
