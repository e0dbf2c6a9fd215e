// Time-bucket display formatting
//
// Single shared implementation for chart axis labels, chart tooltips, and
// CSV timestamp cells. Chart rendering and export must not format
// timestamps independently.
use crate::domain::history::TimeRange;
use chrono::{DateTime, Utc};

/// Axis label for one bucket of a series.
pub fn bucket_label(timestamp: DateTime<Utc>, range: TimeRange) -> String {
    let format = match range {
        TimeRange::Day => "%H:%M",
        TimeRange::Week => "%a",
        TimeRange::Month => "%-d %b",
        TimeRange::Year => "%b",
    };
    timestamp.format(format).to_string()
}

/// Long form shown in chart tooltips, range-aware.
pub fn long_label(timestamp: DateTime<Utc>, range: TimeRange) -> String {
    let format = match range {
        TimeRange::Day => "%H:%M, %b %-d",
        TimeRange::Week => "%A, %b %-d",
        TimeRange::Month => "%b %-d, %Y",
        TimeRange::Year => "%B %Y",
    };
    timestamp.format(format).to_string()
}

/// Locale-style long rendering used for CSV timestamp cells.
pub fn locale_long(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y, %H:%M:%S").to_string()
}

/// Orderable key for a timestamp. Series are generated oldest first and
/// consumers sort on this, never on the display label.
pub fn sort_key(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}
