/// Timeline ticks per second: timestamps are microseconds.
pub const TIMELINE_TIME_BASE: i64 = 1_000_000;

/// Converts seconds into timeline ticks with nearest rounding.
///
/// Non-finite input maps to `0`; results saturate at the `i64` range.
///
/// # Example
/// ```
/// use remind_engine::seconds_to_tl;
///
/// assert_eq!(seconds_to_tl(1.5), 1_500_000);
/// ```
pub fn seconds_to_tl(seconds: f64) -> i64 {
    if !seconds.is_finite() {
        return 0;
    }
    let ticks = (seconds * TIMELINE_TIME_BASE as f64).round();
    ticks.clamp(i64::MIN as f64, i64::MAX as f64) as i64
}

/// Converts timeline ticks into seconds.
pub fn tl_to_seconds(t_tl: i64) -> f64 {
    t_tl as f64 / TIMELINE_TIME_BASE as f64
}

/// Formats a timestamp as `m:ss` for time labels.
///
/// Fractional seconds are truncated and negative values render as `0:00`.
///
/// # Example
/// ```
/// use remind_engine::time::format_clock;
///
/// assert_eq!(format_clock(83_900_000), "1:23");
/// ```
pub fn format_clock(t_tl: i64) -> String {
    let total_seconds = t_tl.max(0) / TIMELINE_TIME_BASE;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::{format_clock, seconds_to_tl, tl_to_seconds};

    #[test]
    fn seconds_round_to_nearest_tick() {
        assert_eq!(seconds_to_tl(0.000_000_4), 0);
        assert_eq!(seconds_to_tl(0.000_000_6), 1);
        assert_eq!(seconds_to_tl(-2.0), -2_000_000);
    }

    #[test]
    fn non_finite_seconds_map_to_zero() {
        assert_eq!(seconds_to_tl(f64::NAN), 0);
        assert_eq!(seconds_to_tl(f64::INFINITY), 0);
    }

    #[test]
    fn ticks_convert_back_to_seconds() {
        assert!((tl_to_seconds(2_500_000) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn clock_pads_seconds_and_clamps_negative_input() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9_999_999), "0:09");
        assert_eq!(format_clock(600_000_000), "10:00");
        assert_eq!(format_clock(-5_000_000), "0:00");
    }
}
