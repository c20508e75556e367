//! Whole-day arithmetic and date formatting.
//!
//! Day differences are `floor(delta_ms / 86_400_000)`, truncating towards
//! negative infinity. Status and urgency boundaries depend on this.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Parses an RFC 3339 timestamp, a `YYYY-MM-DDTHH:MM:SS` timestamp, or a bare
/// `YYYY-MM-DD` date. Naive values are taken as UTC; bare dates as midnight.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whole days from `now` until `target`; negative once `target` has passed
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (target - now).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Whole days from `past` until `now`
pub fn days_since(past: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - past).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Short date, e.g. `Jan 5, 2025`
pub fn format_short(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Display styles accepted by [`format_date`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// `Jan 5, 2025`
    #[default]
    Short,
    /// `January 5, 2025`
    Long,
    /// `Today`, `In 3 days`, `2 weeks ago`, or `Jun 23` further out
    Relative,
}

/// Formats an optional raw date. Missing gives `N/A`, unparseable gives
/// `Invalid Date`.
pub fn format_date(raw: Option<&str>, format: DateFormat, now: DateTime<Utc>) -> String {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return "N/A".to_string();
    };
    let Some(date) = parse_date(raw) else {
        return "Invalid Date".to_string();
    };

    match format {
        DateFormat::Short => format_short(date),
        DateFormat::Long => date.format("%B %-d, %Y").to_string(),
        DateFormat::Relative => match days_until(date, now) {
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            -1 => "Yesterday".to_string(),
            d @ 2..=7 => format!("In {d} days"),
            d @ -7..=-2 => format!("{} days ago", -d),
            d @ -30..=-8 => format!("{} weeks ago", -d / 7),
            _ => date.format("%b %-d").to_string(),
        },
    }
}

/// How long someone has been a member, e.g. `12 days`, `3 months`, `1y 2m`
pub fn membership_duration(join_date: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(joined) = join_date.and_then(parse_date) else {
        return "Unknown".to_string();
    };

    let days = days_since(joined, now);
    if days < 0 {
        return "Future join date?".to_string();
    }
    if days == 0 {
        return "Today".to_string();
    }
    if days < 30 {
        return format!("{days} days");
    }
    if days < 365 {
        return plural(days / 30, "month");
    }

    let years = days / 365;
    match (days % 365) / 30 {
        0 => plural(years, "year"),
        months => format!("{years}y {months}m"),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Human readable age of the last check-in
pub fn describe_check_in(last_check_in: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(date) = last_check_in.and_then(parse_date) else {
        return "Never".to_string();
    };

    let days = -days_until(date, now);
    match days {
        d if d < 0 => "In the future?".to_string(),
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        d if d < 30 => format!("{} weeks ago", d / 7),
        d if d < 365 => format!("{} months ago", d / 30),
        d => format!("{} years ago", d / 365),
    }
}
