//! Human-readable duration formatting

use std::time::Duration;

/// Format a duration using its two most significant units
///
/// Used for status lines such as "next run in 3h 5m", where seconds stop
/// mattering once the wait is long.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use hoyosign_common::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(5)), "5s");
/// assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m");
/// assert_eq!(format_duration(Duration::from_secs(90_000)), "1d 1h");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    if total_secs == 0 {
        return format!("{}ms", duration.as_millis());
    }

    let units = [
        (total_secs / 86_400, "d"),
        ((total_secs % 86_400) / 3_600, "h"),
        ((total_secs % 3_600) / 60, "m"),
        (total_secs % 60, "s"),
    ];
    let first = units.iter().position(|(value, _)| *value > 0).unwrap_or(units.len() - 1);

    units[first..]
        .iter()
        .take(2)
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect::<Vec<_>>()
        .join(" ")
}
