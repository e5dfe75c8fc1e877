use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};

const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
const DEFAULT_SCRUB_FEEDBACK_FRACTION: f64 = 0.03;

/// Tunables for one practice session.
///
/// Every field is optional in the JSON form; missing fields take their
/// defaults.
///
/// # Example
/// ```
/// use remind_engine::SessionSettings;
///
/// let settings: SessionSettings = serde_json::from_str(r#"{ "poll_interval_ms": 25 }"#)
///     .expect("valid json");
/// assert_eq!(settings.poll_interval_ms, 25);
/// assert!(settings.restart_at_track_end);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Interval of the transport position poll.
    pub poll_interval_ms: u64,
    /// Share of the track the playhead must travel between scrub ticks.
    pub scrub_feedback_fraction: f64,
    /// Free play requested at the very end of the track starts from zero.
    pub restart_at_track_end: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            scrub_feedback_fraction: DEFAULT_SCRUB_FEEDBACK_FRACTION,
            restart_at_track_end: true,
        }
    }
}

impl SessionSettings {
    /// Reads and validates settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&text).map_err(|source| EngineError::SettingsSerialization {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        debug!(path = ?path, ?settings, "settings loaded");
        Ok(settings)
    }

    /// Rejects values the session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(EngineError::InvalidSettings {
                reason: "poll_interval_ms must be positive".to_string(),
            });
        }
        let fraction = self.scrub_feedback_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(EngineError::InvalidSettings {
                reason: format!("scrub_feedback_fraction must be in (0, 1]: {fraction}"),
            });
        }
        Ok(())
    }

    /// Scrub distance between two ticks for a track of `duration_tl`.
    pub(crate) fn scrub_step_tl(&self, duration_tl: i64) -> i64 {
        ((duration_tl as f64 * self.scrub_feedback_fraction).round() as i64).max(1)
    }
}
