//! Local calendar-day helpers
//!
//! Session days and "today" windows follow the local time zone, while
//! timestamps are stored in UTC.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// First instant of `day` in local time.
///
/// Where midnight falls in a DST gap, the first valid hour of the day is used.
pub fn start_of_day(day: NaiveDate) -> DateTime<Local> {
    (0..24)
        .filter_map(|hour| day.and_hms_opt(hour, 0, 0))
        .find_map(|naive| naive.and_local_timezone(Local).earliest())
        // Only reachable for a zone that skips a whole day; read the day as UTC
        .unwrap_or_else(|| Utc.from_utc_datetime(&day.and_time(NaiveTime::default())).with_timezone(&Local))
}

/// Half-open `[start, end)` window covering the local day of `now`
pub fn day_window(now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let start = start_of_day(today);
    let end = today
        .succ_opt()
        .map(start_of_day)
        .unwrap_or_else(|| start + Duration::days(1));
    (start.with_timezone(&Utc), end.with_timezone(&Utc))
}

/// Local calendar day a stored timestamp falls on
pub fn local_day(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_window_contains_now() {
        let now = Local.with_ymd_and_hms(2026, 3, 10, 15, 45, 0).unwrap();
        let (start, end) = day_window(now);

        let now_utc = now.with_timezone(&Utc);
        assert!(start <= now_utc && now_utc < end);
        assert_eq!(local_day(start), now.date_naive());
        assert_eq!(local_day(end), now.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn test_start_of_day_round_trips_to_same_day() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(local_day(start_of_day(day).with_timezone(&Utc)), day);
    }
}
