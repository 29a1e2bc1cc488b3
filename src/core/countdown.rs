//! Countdown string rendering.

use chrono::Duration;

use super::target::DisplayTarget;
use crate::common::constants::{PLACEHOLDER, TOMORROW_MARKER};

/// Render whole seconds as `HH:MM` or `HH:MM:SS`. Hours may exceed 24.
pub fn format_remaining(remaining: Duration, show_seconds: bool) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if show_seconds {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}")
    }
}

/// Full countdown text for a display target.
pub fn render(target: &DisplayTarget, remaining: Option<Duration>, show_seconds: bool) -> String {
    match remaining {
        None => PLACEHOLDER.to_string(),
        Some(left) if target.is_tomorrow() => {
            format!("{TOMORROW_MARKER}{}", format_remaining(left, show_seconds))
        }
        Some(left) => format_remaining(left, show_seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sunset::SunsetRecord;

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::seconds(42 * 60), false), "00:42");
        assert_eq!(format_remaining(Duration::seconds(42 * 60 + 59), false), "00:42");
        assert_eq!(format_remaining(Duration::seconds(42 * 60 + 59), true), "00:42:59");
        assert_eq!(format_remaining(Duration::hours(26) + Duration::minutes(5), false), "26:05");
        assert_eq!(format_remaining(Duration::zero(), true), "00:00:00");
        assert_eq!(format_remaining(Duration::seconds(-30), false), "00:00");
    }

    #[test]
    fn test_render_variants() {
        let record = SunsetRecord::parse("2024-03-16T18:43:00+03:00").unwrap();
        let left = Some(Duration::minutes(21 * 60 + 13));

        assert_eq!(render(&DisplayTarget::Unset, None, false), "--:--");
        assert_eq!(
            render(&DisplayTarget::TomorrowShown(record), left, false),
            "T 21:13"
        );
        assert_eq!(
            render(&DisplayTarget::TodayPassed(record), Some(Duration::zero()), true),
            "00:00:00"
        );
    }
}
