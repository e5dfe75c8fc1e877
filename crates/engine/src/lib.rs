//! Segment timeline and playback state machine for the ReMind practice player.

pub mod api;
pub mod bridge;
pub mod cursor;
pub mod error;
pub mod feedback;
pub mod player;
pub mod settings;
pub mod time;
pub mod timeline;
pub mod transport;

pub use api::{
    Output, SegmentSelector, Session, SessionErrorEvent, SessionErrorKind, TimelineEvent,
    TimelineSnapshot,
};
pub use bridge::{BridgeMessage, spawn_player_bridge, spawn_poll_ticker};
pub use cursor::{Advance, Direction, PlaybackCursor};
pub use error::{EngineError, Result};
pub use feedback::{FeedbackEvent, FeedbackPort, FeedbackStrength, SilentFeedback};
pub use player::Player;
pub use settings::SessionSettings;
pub use time::{TIMELINE_TIME_BASE, seconds_to_tl, tl_to_seconds};
pub use timeline::{Segment, Timeline, TimelineMutation};
pub use transport::{PlaybackState, TransportCommand, TransportController};
