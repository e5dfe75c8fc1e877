use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{Output, SessionErrorEvent, TimelineEvent};
use crate::feedback::FeedbackPort;
use crate::player::Player;
use crate::transport::TransportController;

const MESSAGE_CHANNEL_CAPACITY: usize = 32;
const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// Messages accepted by the player worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMessage {
    Event(TimelineEvent),
    /// Samples the transport position.
    Poll,
}

/// Sender used by input sources to reach the worker thread.
pub type PlayerMessageSender = SyncSender<BridgeMessage>;

/// Receiver for outputs produced by the worker thread.
pub type PlayerOutputReceiver = Receiver<Output>;

/// Moves `player` onto one worker thread that owns it exclusively.
///
/// Messages from every sender are handled one at a time in arrival order,
/// so timeline mutations stay atomic with respect to each other. Failed
/// events are reported as `Output::Error`. The worker exits once every
/// sender is dropped or, on its next output, once the output receiver is
/// gone. A running `spawn_poll_ticker` holds a sender of its own, so with a
/// ticker attached only dropping the output receiver stops the worker; the
/// ticker then exits on its next send.
pub fn spawn_player_bridge<T, F>(
    mut player: Player<T, F>,
) -> (PlayerMessageSender, PlayerOutputReceiver)
where
    T: TransportController + Send + 'static,
    F: FeedbackPort + Send + 'static,
{
    let (message_tx, message_rx) = mpsc::sync_channel::<BridgeMessage>(MESSAGE_CHANNEL_CAPACITY);
    let (output_tx, output_rx) = mpsc::sync_channel::<Output>(OUTPUT_CHANNEL_CAPACITY);

    thread::spawn(move || {
        while let Ok(message) = message_rx.recv() {
            let result = match message {
                BridgeMessage::Event(event) => player.handle(event),
                BridgeMessage::Poll => player.poll(),
            };
            let outputs = match result {
                Ok(outputs) => outputs,
                Err(error) => {
                    warn!(?message, %error, "event rejected");
                    vec![Output::Error(SessionErrorEvent::from_error(&error))]
                }
            };
            for output in outputs {
                if output_tx.send(output).is_err() {
                    debug!("output receiver dropped; stopping player worker");
                    return;
                }
            }
        }
        debug!("all senders dropped; stopping player worker");
    });

    (message_tx, output_rx)
}

/// Sends `Poll` every `interval` until the bridge disconnects.
///
/// The ticker keeps the worker alive; drop the output receiver to stop both.
pub fn spawn_poll_ticker(sender: PlayerMessageSender, interval: Duration) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            thread::sleep(interval);
            if sender.send(BridgeMessage::Poll).is_err() {
                return;
            }
        }
    })
}
