use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::America::New_York;

/// Calendar date in New York for a UTC instant. Counter day buckets are keyed by this date.
pub fn eastern_date(now_utc: DateTime<Utc>) -> NaiveDate {
    now_utc.with_timezone(&New_York).date_naive()
}

/// `today`, `today - 1`, ... for `days` entries, most recent first.
pub fn trailing_days(today: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (0..days as i64).map(|i| today - Duration::days(i)).collect()
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn before_midnight_eastern_is_previous_utc_day() {
        // 2026-01-06 03:30 UTC = 2026-01-05 22:30 EST (UTC-5).
        let now = Utc.with_ymd_and_hms(2026, 1, 6, 3, 30, 0).unwrap();
        assert_eq!(eastern_date(now), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    }

    #[test]
    fn daylight_saving_shifts_the_cutover() {
        // 2026-07-06 03:30 UTC = 2026-07-05 23:30 EDT (UTC-4).
        let summer = Utc.with_ymd_and_hms(2026, 7, 6, 3, 30, 0).unwrap();
        assert_eq!(eastern_date(summer), NaiveDate::from_ymd_opt(2026, 7, 5).unwrap());

        // 2026-07-06 04:30 UTC = 2026-07-06 00:30 EDT.
        let after = Utc.with_ymd_and_hms(2026, 7, 6, 4, 30, 0).unwrap();
        assert_eq!(eastern_date(after), NaiveDate::from_ymd_opt(2026, 7, 6).unwrap());
    }

    #[test]
    fn trailing_days_cross_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let keys: Vec<_> = trailing_days(today, 3).into_iter().map(day_key).collect();
        assert_eq!(keys, vec!["2026-03-02", "2026-03-01", "2026-02-28"]);
    }
}
