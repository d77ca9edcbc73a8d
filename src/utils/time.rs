use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Hourly UTC timestamps covering `start..=end` as EPW hours.
///
/// EPW hour h labels the interval ending at h:00, so a day spans 01:00
/// through 24:00 (= 00:00 of the next day). The returned list therefore
/// runs from `start` 01:00 UTC to the midnight following `end`.
pub fn hourly_range(start: NaiveDate, end: NaiveDate) -> Vec<DateTime<Utc>> {
    let first = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)) + Duration::hours(1);
    let last = Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN)) + Duration::hours(24);

    let mut hours = Vec::new();
    let mut t = first;
    while t <= last {
        hours.push(t);
        t += Duration::hours(1);
    }
    hours
}
