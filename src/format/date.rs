//! Fixed-width local timestamps: `YYYY-MM-DD HH:MM:SS.mmm`.

use chrono::{DateTime, Datelike, FixedOffset, Local, TimeDelta, TimeZone, Timelike, Utc};

/// Render `instant` as host-local wall-clock time.
///
/// The stored offset of the input is ignored; only the host offset in
/// effect at that instant matters.
pub fn format_date(instant: impl Into<DateTime<Utc>>) -> String {
    let instant = instant.into();
    let offset = *Local.from_utc_datetime(&instant.naive_utc()).offset();
    format_date_in(instant, offset)
}

/// Render `instant` as wall-clock time at a fixed `offset`.
///
/// The instant is shifted by the offset and the fields are then read as UTC.
pub fn format_date_in(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    let shifted = instant.naive_utc() + TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
        shifted.year(),
        shifted.month(),
        shifted.day(),
        shifted.hour(),
        shifted.minute(),
        shifted.second(),
        (shifted.nanosecond() / 1_000_000) % 1000,
    )
}
