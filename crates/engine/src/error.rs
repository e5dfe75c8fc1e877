use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by timeline, cursor and session operations.
#[derive(Debug)]
pub enum EngineError {
    InvalidDuration {
        duration_tl: i64,
    },
    OutOfBounds {
        t_tl: i64,
        duration_tl: i64,
    },
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
    NoSelection,
    SettingsIo {
        path: PathBuf,
        source: std::io::Error,
    },
    SettingsSerialization {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidSettings {
        reason: String,
    },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDuration { duration_tl } => {
                write!(f, "track duration must be positive: {duration_tl}")
            }
            Self::OutOfBounds { t_tl, duration_tl } => {
                write!(f, "timestamp {t_tl} is outside the track 0..={duration_tl}")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "segment index {index} out of range for {len} segments")
            }
            Self::NoSelection => write!(f, "no segment is selected"),
            Self::SettingsIo { path, source } => {
                write!(f, "failed to read settings: {} ({source})", path.display())
            }
            Self::SettingsSerialization { path, source } => {
                write!(f, "settings deserialization failed at {} ({source})", path.display())
            }
            Self::InvalidSettings { reason } => write!(f, "invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SettingsIo { source, .. } => Some(source),
            Self::SettingsSerialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineError;

    #[test]
    fn display_names_the_offending_index() {
        let error = EngineError::IndexOutOfRange { index: 3, len: 2 };
        assert_eq!(
            error.to_string(),
            "segment index 3 out of range for 2 segments"
        );
    }
}
