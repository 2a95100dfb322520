//! Canonical encoding of `created_at` timestamps in the database.
//!
//! Timestamps are stored as fixed-width UTC text so that SQL string
//! comparison (`created_at >= ?`, `ORDER BY created_at`) agrees with
//! chronological order. Variable-width encodings such as plain RFC 3339
//! break that property when subsecond digits differ.

use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

/// The fixed-width storage format, e.g. `2026-08-25T13:05:07.000412Z`.
const DB_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// Encode a timestamp for storage, normalized to UTC.
pub fn to_db_string(datetime: OffsetDateTime) -> String {
    datetime
        .to_offset(UtcOffset::UTC)
        .format(&DB_FORMAT)
        .expect("formatting a UTC datetime with a const format cannot fail")
}

/// Decode a timestamp produced by [to_db_string].
pub fn parse_db_string(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(text, &DB_FORMAT).map(PrimitiveDateTime::assume_utc)
}
