// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Display formatting for epoch-millisecond timestamps

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

pub const DATE_FORMAT: &str = "%b %d, %Y";
pub const TIME_FORMAT: &str = "%I:%M %p";
pub const DATE_TIME_FORMAT: &str = "%b %d, %Y • %I:%M %p";

fn to_zone<Tz: TimeZone>(timestamp_ms: i64, zone: &Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .unwrap_or_default()
        .with_timezone(zone)
}

/// Format `timestamp_ms` with `pattern` in the given time zone
pub fn format_in<Tz>(timestamp_ms: i64, zone: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    to_zone(timestamp_ms, zone).format(pattern).to_string()
}

/// `Mar 05, 2025`
pub fn format_date(timestamp_ms: i64) -> String {
    format_in(timestamp_ms, &Local, DATE_FORMAT)
}

/// `02:30 PM`
pub fn format_time(timestamp_ms: i64) -> String {
    format_in(timestamp_ms, &Local, TIME_FORMAT)
}

/// `Mar 05, 2025 • 02:30 PM`
pub fn format_date_time(timestamp_ms: i64) -> String {
    format_in(timestamp_ms, &Local, DATE_TIME_FORMAT)
}

/// "Just now", "5 minutes ago", ... or the date after a week
pub fn relative_time_span(timestamp_ms: i64) -> String {
    relative_time_span_at(timestamp_ms, Utc::now().timestamp_millis())
}

pub fn relative_time_span_at(timestamp_ms: i64, now_ms: i64) -> String {
    let seconds = now_ms.saturating_sub(timestamp_ms) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 60 {
        "Just now".to_string()
    } else if minutes < 60 {
        ago(minutes, "minute")
    } else if hours < 24 {
        ago(hours, "hour")
    } else if days < 7 {
        ago(days, "day")
    } else {
        format_date(timestamp_ms)
    }
}

fn ago(count: i64, unit: &str) -> String {
    let plural = if count > 1 { "s" } else { "" };
    format!("{} {}{} ago", count, unit, plural)
}
