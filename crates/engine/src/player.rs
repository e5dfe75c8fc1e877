use tracing::debug;

use crate::api::{Output, Session, TimelineEvent};
use crate::error::Result;
use crate::feedback::FeedbackPort;
use crate::settings::SessionSettings;
use crate::transport::TransportController;

/// Session wired to the injected transport and feedback ports.
///
/// Transport commands and feedback notifications produced by the session are
/// delivered to the ports before `handle` returns.
#[derive(Debug)]
pub struct Player<T, F> {
    session: Session,
    transport: T,
    feedback: F,
}

impl<T, F> Player<T, F>
where
    T: TransportController,
    F: FeedbackPort,
{
    /// Builds a player for the track currently loaded in `transport`.
    pub fn load(transport: T, feedback: F, settings: SessionSettings) -> Result<Self> {
        let session = Session::new(transport.duration(), settings)?;
        Ok(Self {
            session,
            transport,
            feedback,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Applies one event, dispatches port outputs and returns all outputs.
    pub fn handle(&mut self, event: TimelineEvent) -> Result<Vec<Output>> {
        let outputs = self.session.handle_event(event)?;
        for output in &outputs {
            match output {
                Output::Transport(command) => self.transport.execute(command),
                Output::Feedback(feedback) => self.feedback.notify(*feedback),
                _ => {}
            }
        }
        Ok(outputs)
    }

    /// Samples the transport position into the session.
    pub fn poll(&mut self) -> Result<Vec<Output>> {
        let t_tl = self.transport.current_position();
        debug!(t_tl, "position poll");
        self.handle(TimelineEvent::PositionPolled { t_tl })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::Player;
    use crate::api::{SegmentSelector, TimelineEvent};
    use crate::feedback::{FeedbackEvent, FeedbackPort};
    use crate::settings::SessionSettings;
    use crate::transport::{TransportCommand, TransportController};

    #[test]
    fn load_uses_transport_duration() {
        let transport = MockTransport::new(90_000_000);
        let player = Player::load(transport, MockFeedback::default(), SessionSettings::default())
            .expect("load should succeed");

        assert_eq!(player.session().timeline().duration_tl(), 90_000_000);
    }

    #[test]
    fn load_rejects_empty_track() {
        let transport = MockTransport::new(0);
        let result = Player::load(transport, MockFeedback::default(), SessionSettings::default());
        assert!(result.is_err());
    }

    #[test]
    fn handle_dispatches_commands_and_feedback_to_ports() {
        let transport = MockTransport::new(100_000_000);
        let commands = transport.commands();
        let feedback = MockFeedback::default();
        let notified = feedback.events();
        let mut player =
            Player::load(transport, feedback, SessionSettings::default()).expect("load");

        player
            .handle(TimelineEvent::Split { at_tl: 50_000_000 })
            .expect("split");
        player
            .handle(TimelineEvent::LoopSegment(SegmentSelector::Index(1)))
            .expect("loop segment");

        assert_eq!(
            *commands.lock().expect("lock commands"),
            vec![TransportCommand::PlayRange {
                start_tl: 50_000_000,
                end_tl: 100_000_000
            }]
        );
        assert_eq!(
            *notified.lock().expect("lock feedback"),
            vec![
                FeedbackEvent::SegmentChanged { index: 1 },
                FeedbackEvent::LoopToggled { enabled: true },
            ]
        );
    }

    #[test]
    fn failed_event_reaches_no_port() {
        let transport = MockTransport::new(100_000_000);
        let commands = transport.commands();
        let mut player =
            Player::load(transport, MockFeedback::default(), SessionSettings::default())
                .expect("load");

        assert!(player.handle(TimelineEvent::MergeWithNext).is_err());
        assert!(commands.lock().expect("lock commands").is_empty());
    }

    #[test]
    fn poll_reads_transport_position() {
        let transport = MockTransport::new(100_000_000);
        let mut player =
            Player::load(transport, MockFeedback::default(), SessionSettings::default())
                .expect("load");
        player
            .handle(TimelineEvent::PlayPauseToggle)
            .expect("play");

        player.transport_mut().position_tl = 42_000_000;
        player.poll().expect("poll");

        assert_eq!(player.session().playhead_tl(), 42_000_000);
    }

    #[derive(Debug)]
    pub(crate) struct MockTransport {
        pub(crate) position_tl: i64,
        duration_tl: i64,
        commands: Arc<Mutex<Vec<TransportCommand>>>,
    }

    impl MockTransport {
        pub(crate) fn new(duration_tl: i64) -> Self {
            Self {
                position_tl: 0,
                duration_tl,
                commands: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub(crate) fn commands(&self) -> Arc<Mutex<Vec<TransportCommand>>> {
            Arc::clone(&self.commands)
        }
    }

    impl TransportController for MockTransport {
        fn execute(&mut self, command: &TransportCommand) {
            match *command {
                TransportCommand::PlayRange { start_tl, .. } => self.position_tl = start_tl,
                TransportCommand::Seek { t_tl } => self.position_tl = t_tl,
                TransportCommand::Stop => {}
            }
            self.commands
                .lock()
                .expect("lock commands")
                .push(*command);
        }

        fn current_position(&self) -> i64 {
            self.position_tl
        }

        fn duration(&self) -> i64 {
            self.duration_tl
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct MockFeedback {
        events: Arc<Mutex<Vec<FeedbackEvent>>>,
    }

    impl MockFeedback {
        pub(crate) fn events(&self) -> Arc<Mutex<Vec<FeedbackEvent>>> {
            Arc::clone(&self.events)
        }
    }

    impl FeedbackPort for MockFeedback {
        fn notify(&mut self, event: FeedbackEvent) {
            self.events.lock().expect("lock feedback").push(event);
        }
    }
}
