//! Day-boundary arithmetic anchored to the application's fixed timezone.
//!
//! Statement period filters count days relative to the timezone the account
//! holders live in, not the server's local zone. Computing "N days ago" in
//! server-local time shifts the window by the UTC offset and puts
//! transactions on the wrong side of the midnight boundary.

use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The timezone used for statement day boundaries when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// The instant, in UTC, at which the day `days_ago` days before `now_utc`
/// started in `canonical_timezone`.
///
/// `days_ago = 0` is the start of today in that timezone. The returned
/// instant is an inclusive lower bound for period filters.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a valid
/// canonical timezone name, or [Error::InvalidInput] if `days_ago` is out of
/// the representable date range.
pub fn start_of_day_days_ago(
    canonical_timezone: &str,
    days_ago: u32,
    now_utc: OffsetDateTime,
) -> Result<OffsetDateTime, Error> {
    let timezone = time_tz::timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;

    let offset_now = timezone.get_offset_utc(&now_utc).to_utc();
    let local_now = now_utc.to_offset(offset_now);

    let start_date = local_now
        .date()
        .checked_sub(Duration::days(i64::from(days_ago)))
        .ok_or_else(|| Error::InvalidInput(format!("period of {days_ago} days is out of range")))?;

    // The offset in force at the start of that day may differ from today's
    // offset (DST transitions), so resolve it against the midnight estimate.
    let midnight_estimate = PrimitiveDateTime::new(start_date, Time::MIDNIGHT)
        .assume_offset(offset_now);
    let offset_then = timezone.get_offset_utc(&midnight_estimate).to_utc();

    let start = PrimitiveDateTime::new(start_date, Time::MIDNIGHT).assume_offset(offset_then);

    Ok(start.to_offset(UtcOffset::UTC))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::Error;

    use super::{DEFAULT_TIMEZONE, start_of_day_days_ago};

    #[test]
    fn anchors_day_boundary_to_fixed_timezone() {
        // 01:00 UTC is still the previous evening in São Paulo (UTC-3), so
        // "today" must resolve to January 9th, not the server's January 10th.
        let now_utc = datetime!(2026-01-10 01:00:00 UTC);

        let start = start_of_day_days_ago(DEFAULT_TIMEZONE, 0, now_utc).unwrap();

        assert_eq!(start, datetime!(2026-01-09 03:00:00 UTC));
    }

    #[test]
    fn counts_whole_days_back() {
        let now_utc = datetime!(2026-01-10 15:00:00 UTC);

        let start = start_of_day_days_ago(DEFAULT_TIMEZONE, 7, now_utc).unwrap();

        assert_eq!(start, datetime!(2026-01-03 03:00:00 UTC));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let now_utc = datetime!(2026-01-10 15:00:00 UTC);

        let result = start_of_day_days_ago("Atlantis/Lost_City", 7, now_utc);

        assert_eq!(
            result,
            Err(Error::InvalidTimezone("Atlantis/Lost_City".to_owned()))
        );
    }
}
