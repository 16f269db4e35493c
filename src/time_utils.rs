// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a server timestamp. Accepts RFC3339 and zone-less ISO-8601
/// (`2026-01-05T15:04:00`, taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc())
        })
}

/// "Jan 5, 2026"
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// "Jan 5, 2026 at 03:04 PM"
pub fn format_date_time(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y at %I:%M %p").to_string()
}

/// Coarse age of `date` relative to now, falling back to the date after a week.
pub fn relative_time(date: DateTime<Utc>) -> String {
    relative_time_from(date, Utc::now())
}

pub fn relative_time_from(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - date).num_seconds();
    match secs {
        s if s < 60 => "Just now".to_string(),
        s if s < 3_600 => format!("{} minutes ago", s / 60),
        s if s < 86_400 => format!("{} hours ago", s / 3_600),
        s if s < 604_800 => format!("{} days ago", s / 86_400),
        _ => format_date(date),
    }
}

pub fn is_past(date: DateTime<Utc>) -> bool {
    date < Utc::now()
}

pub fn is_today(date: DateTime<Utc>) -> bool {
    date.date_naive() == Utc::now().date_naive()
}
