// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for parsing and formatting times of day.
//!
//! Chat input arrives as loose text ("5am", "14:30", "1 hour"). Everything
//! stored in a schedule uses the canonical 24-hour `HH:MM` form produced here.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;

/// Minutes added to a start time when neither an end time nor a duration is given.
pub const DEFAULT_ACTIVITY_MINUTES: i64 = 60;

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)(?::(\d+))?\s*(am|pm)?").unwrap())
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*(min|mins|minutes|hr|hour|hours)").unwrap())
}

fn canonical_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap())
}

/// Parse an informal time string into a time of day.
///
/// The date part of the result is today's date and only acts as a carrier
/// for arithmetic. Returns `None` when the input has no digits at all, in
/// which case callers keep the original string.
///
/// Without an am/pm marker the hour is read as 24-hour, so "5" is 05:00.
pub fn parse_time(input: &str) -> Option<NaiveDateTime> {
    parse_time_on(input, Utc::now().date_naive())
}

/// Same as [`parse_time`], anchored to an explicit date.
pub fn parse_time_on(input: &str, date: NaiveDate) -> Option<NaiveDateTime> {
    let caps = time_regex().captures(input)?;

    let mut hour: i64 = caps[1].parse().ok()?;
    let minutes: i64 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let meridian = caps.get(3).map(|m| m.as_str().to_ascii_lowercase());

    match meridian.as_deref() {
        Some("pm") if hour < 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }

    // Out-of-range values roll over onto the carrier date ("25:00" -> 01:00).
    let midnight = date.and_time(NaiveTime::MIN);
    let offset = Duration::try_hours(hour)?.checked_add(&Duration::try_minutes(minutes)?)?;
    midnight.checked_add_signed(offset)
}

/// Format a time of day as zero-padded 24-hour `HH:MM`.
pub fn format_time(time: &NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parse a duration phrase such as "30 mins" or "2 hours" into minutes.
///
/// Accepted units are min, mins, minutes, hr, hour and hours. Shorthands
/// like "45m" or "1h" are not recognized.
pub fn parse_duration_minutes(input: &str) -> Option<i64> {
    let caps = duration_regex().captures(input)?;
    let value: i64 = caps[1].parse().ok()?;
    let unit = caps[2].to_ascii_lowercase();

    if unit.starts_with('h') {
        value.checked_mul(60)
    } else {
        Some(value)
    }
}

/// Add minutes to a time of day. Day rollover is not tracked.
pub fn add_minutes(time: &NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    time.checked_add_signed(Duration::try_minutes(minutes)?)
}

/// Whether a string is a canonical `HH:MM` time (00-23 hours, 00-59 minutes).
pub fn is_canonical_time(value: &str) -> bool {
    canonical_regex().is_match(value)
}

/// Run a time string through the parser, keeping the original when it
/// cannot be parsed.
pub fn canonicalize_time(value: &str) -> String {
    parse_time(value)
        .map(|t| format_time(&t))
        .unwrap_or_else(|| value.to_string())
}

/// Resolve an IANA timezone name, falling back to UTC.
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    match name {
        None => Tz::UTC,
        Some(raw) => raw.trim().parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(time_zone = raw, "Unknown timezone, falling back to UTC");
            Tz::UTC
        }),
    }
}

/// Build a local timestamp for "today at `HH:MM`" in the given timezone.
///
/// The result has no UTC offset (`2026-03-01T09:30:00`); the timezone name
/// travels alongside it to the calendar API, which resolves the offset.
pub fn to_local_iso(time: Option<&str>, tz: Tz, now: DateTime<Utc>) -> Option<String> {
    let time = time?;
    let (hours, minutes) = time.split_once(':')?;
    let today = now.with_timezone(&tz).date_naive();

    Some(format!(
        "{}T{:0>2}:{:0>2}:00",
        today.format("%Y-%m-%d"),
        hours.trim(),
        minutes.trim()
    ))
}

/// English name of the current weekday in a timezone ("Monday").
pub fn weekday_name(tz: Tz, now: DateTime<Utc>) -> String {
    now.with_timezone(&tz).format("%A").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hm(input: &str) -> Option<String> {
        parse_time(input).map(|t| format_time(&t))
    }

    #[test]
    fn test_parse_time_meridian() {
        assert_eq!(hm("5am").as_deref(), Some("05:00"));
        assert_eq!(hm("2pm").as_deref(), Some("14:00"));
        assert_eq!(hm("12pm").as_deref(), Some("12:00"));
        assert_eq!(hm("12am").as_deref(), Some("00:00"));
        assert_eq!(hm("7:45 PM").as_deref(), Some("19:45"));
    }

    #[test]
    fn test_parse_time_without_meridian_is_24_hour() {
        assert_eq!(hm("14:30").as_deref(), Some("14:30"));
        assert_eq!(hm("5").as_deref(), Some("05:00"));
        assert_eq!(hm("at 9:05").as_deref(), Some("09:05"));
    }

    #[test]
    fn test_parse_time_rolls_over_out_of_range_values() {
        assert_eq!(hm("25:00").as_deref(), Some("01:00"));
        assert_eq!(hm("10:75").as_deref(), Some("11:15"));
    }

    #[test]
    fn test_parse_time_unparseable() {
        assert_eq!(parse_time("noon"), None);
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_time_keeps_carrier_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let parsed = parse_time_on("11pm", date).unwrap();
        assert_eq!(parsed.date(), date);
        assert_eq!(format_time(&parsed), "23:00");
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration_minutes("30 mins"), Some(30));
        assert_eq!(parse_duration_minutes("1 hour"), Some(60));
        assert_eq!(parse_duration_minutes("2 HOURS"), Some(120));
        assert_eq!(parse_duration_minutes("90minutes"), Some(90));
        assert_eq!(parse_duration_minutes("for 3 hr"), Some(180));
    }

    #[test]
    fn test_parse_duration_rejects_shorthand() {
        assert_eq!(parse_duration_minutes("45m"), None);
        assert_eq!(parse_duration_minutes("1h"), None);
        assert_eq!(parse_duration_minutes("a while"), None);
    }

    #[test]
    fn test_add_minutes_wraps_clock() {
        let start = parse_time("23:30").unwrap();
        let end = add_minutes(&start, 60).unwrap();
        assert_eq!(format_time(&end), "00:30");
    }

    #[test]
    fn test_is_canonical_time() {
        assert!(is_canonical_time("00:00"));
        assert!(is_canonical_time("23:59"));
        assert!(!is_canonical_time("24:00"));
        assert!(!is_canonical_time("9:00"));
        assert!(!is_canonical_time("12:60"));
        assert!(!is_canonical_time("noon"));
    }

    #[test]
    fn test_canonicalize_time_passthrough() {
        assert_eq!(canonicalize_time("3pm"), "15:00");
        assert_eq!(canonicalize_time("noon"), "noon");
    }

    #[test]
    fn test_to_local_iso_uses_date_in_timezone() {
        // 02:00 UTC on March 2nd is still March 1st in Los Angeles.
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 2, 0, 0).unwrap();
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        assert_eq!(
            to_local_iso(Some("09:30"), tz, now).as_deref(),
            Some("2026-03-01T09:30:00")
        );
        assert_eq!(
            to_local_iso(Some("09:30"), Tz::UTC, now).as_deref(),
            Some("2026-03-02T09:30:00")
        );
    }

    #[test]
    fn test_to_local_iso_absent_time() {
        assert_eq!(to_local_iso(None, Tz::UTC, Utc::now()), None);
        assert_eq!(to_local_iso(Some("0930"), Tz::UTC, Utc::now()), None);
    }

    #[test]
    fn test_resolve_timezone() {
        assert_eq!(resolve_timezone(None), Tz::UTC);
        assert_eq!(resolve_timezone(Some("Not/AZone")), Tz::UTC);
        assert_eq!(
            resolve_timezone(Some("Europe/Berlin")),
            chrono_tz::Europe::Berlin
        );
    }

    #[test]
    fn test_weekday_name() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(weekday_name(Tz::UTC, now), "Monday");
    }
}
