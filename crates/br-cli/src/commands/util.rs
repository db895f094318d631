//! Shared utilities for CLI commands.

use std::fmt::Display;
use std::sync::LazyLock;

use anyhow::Context;
use br_core::entry::parse_native_datetime;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").expect("valid relative time regex")
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Layout of the native local date-time value handed to the entry form.
const NATIVE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

/// Layout used when printing entry times.
pub const DISPLAY_LAYOUT: &str = "%Y-%m-%d %H:%M";

/// Normalizes an `--at` value into a native local date-time string.
///
/// Supports:
/// - Native local: "2026-01-15T10:30"
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
///
/// Blank input stays blank so the entry form can decide what a missing date
/// means.
pub fn native_at<Tz: TimeZone>(input: &str, now: DateTime<Utc>, tz: &Tz) -> anyhow::Result<String> {
    let input = input.trim();
    if input.is_empty() || parse_native_datetime(input).is_ok() {
        return Ok(input.to_string());
    }
    let instant = parse_instant(input, now)?;
    Ok(local_naive(instant, tz).format(NATIVE_LAYOUT).to_string())
}

/// Parse a datetime string as either RFC 3339 or relative time.
fn parse_instant(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    // Try RFC 3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z), local (e.g., 2026-01-15T10:30) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

fn local_naive<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    instant.with_timezone(tz).naive_local()
}

/// Formats an instant as local wall-clock time.
pub fn format_local<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format(DISPLAY_LAYOUT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn paris() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn native_values_pass_through() {
        assert_eq!(
            native_at("2024-03-01T08:15", now(), &paris()).unwrap(),
            "2024-03-01T08:15"
        );
    }

    #[test]
    fn blank_stays_blank() {
        assert_eq!(native_at("  ", now(), &paris()).unwrap(), "");
    }

    #[test]
    fn rfc3339_is_converted_to_local_time() {
        assert_eq!(
            native_at("2024-03-01T08:15:00Z", now(), &paris()).unwrap(),
            "2024-03-01T09:15:00"
        );
    }

    #[test]
    fn relative_is_measured_from_now() {
        assert_eq!(
            native_at("2 hours ago", now(), &paris()).unwrap(),
            "2024-03-10T11:00:00"
        );
        assert_eq!(
            native_at("1 week ago", now(), &paris()).unwrap(),
            "2024-03-03T13:00:00"
        );
    }

    #[test]
    fn garbage_is_rejected() {
        let err = native_at("yesterday-ish", now(), &paris()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid datetime: yesterday-ish"));
    }

    #[test]
    fn huge_relative_values_are_rejected() {
        assert!(native_at("99999999 weeks ago", now(), &paris()).is_err());
    }

    #[test]
    fn format_local_uses_the_zone() {
        assert_eq!(format_local(now(), &paris()), "2024-03-10 13:00");
    }
}
