use std::fmt::{Display, Formatter};

use remind_engine::{Direction, SegmentSelector, TimelineEvent, seconds_to_tl};

/// One parsed line of a practice script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLine {
    Event(TimelineEvent),
    /// Advances the simulated transport clock, then polls it.
    Tick { delta_tl: i64 },
}

/// Script line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub line: usize,
    pub reason: String,
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for ScriptError {}

/// Parses a script; blank lines and `#` comments are skipped.
///
/// Returned pairs carry the 1-based source line number.
pub fn parse_script(text: &str) -> Result<Vec<(usize, ScriptLine)>, ScriptError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let parsed = parse_line(content).map_err(|reason| ScriptError { line, reason })?;
        lines.push((line, parsed));
    }
    Ok(lines)
}

fn parse_line(content: &str) -> Result<ScriptLine, String> {
    let mut words = content.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    let argument = words.next();
    if let Some(extra) = words.next() {
        return Err(format!("unexpected argument `{extra}`"));
    }

    let event = match keyword {
        "split" => TimelineEvent::Split {
            at_tl: seconds(keyword, argument)?,
        },
        "merge" => no_argument(keyword, argument, TimelineEvent::MergeWithNext)?,
        "clear" => no_argument(keyword, argument, TimelineEvent::Clear)?,
        "select" => TimelineEvent::SelectSegment(SegmentSelector::Index(index(keyword, argument)?)),
        "select-at" => {
            TimelineEvent::SelectSegment(SegmentSelector::Time(seconds(keyword, argument)?))
        }
        "loop" => TimelineEvent::LoopSegment(SegmentSelector::Index(index(keyword, argument)?)),
        "loop-at" => TimelineEvent::LoopSegment(SegmentSelector::Time(seconds(keyword, argument)?)),
        "next" => no_argument(keyword, argument, TimelineEvent::Advance(Direction::Next))?,
        "prev" => no_argument(keyword, argument, TimelineEvent::Advance(Direction::Previous))?,
        "loop-on" => no_argument(keyword, argument, TimelineEvent::ToggleLoop { enabled: true })?,
        "loop-off" => no_argument(
            keyword,
            argument,
            TimelineEvent::ToggleLoop { enabled: false },
        )?,
        "play" | "pause" => no_argument(keyword, argument, TimelineEvent::PlayPauseToggle)?,
        "complete" => no_argument(keyword, argument, TimelineEvent::SegmentPlaybackCompleted)?,
        "scrub" => TimelineEvent::SetPlayhead {
            t_tl: seconds(keyword, argument)?,
        },
        "tick" => {
            let delta_tl = seconds(keyword, argument)?;
            if delta_tl < 0 {
                return Err("tick needs a non-negative duration".to_string());
            }
            return Ok(ScriptLine::Tick { delta_tl });
        }
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(ScriptLine::Event(event))
}

fn seconds(keyword: &str, argument: Option<&str>) -> Result<i64, String> {
    let text = argument.ok_or_else(|| format!("`{keyword}` needs a time in seconds"))?;
    let value: f64 = text
        .parse()
        .map_err(|_| format!("`{text}` is not a number of seconds"))?;
    if !value.is_finite() {
        return Err(format!("`{text}` is not a finite number of seconds"));
    }
    Ok(seconds_to_tl(value))
}

fn index(keyword: &str, argument: Option<&str>) -> Result<usize, String> {
    let text = argument.ok_or_else(|| format!("`{keyword}` needs a segment index"))?;
    text.parse()
        .map_err(|_| format!("`{text}` is not a segment index"))
}

fn no_argument(
    keyword: &str,
    argument: Option<&str>,
    event: TimelineEvent,
) -> Result<TimelineEvent, String> {
    match argument {
        Some(extra) => Err(format!("`{keyword}` takes no argument, got `{extra}`")),
        None => Ok(event),
    }
}
