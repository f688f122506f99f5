//! Japan Standard Time day attribution.
//!
//! Every calendar decision in the engine attributes instants to civil days
//! in JST (UTC+9, no DST). This crate holds that rule plus the sampling
//! policy used when a whole JST day must be interrogated at one instant.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Seconds east of UTC for Japan Standard Time.
pub const JST_OFFSET_SECONDS: i32 = 9 * 3600;

/// The JST fixed offset (UTC+9, no DST).
pub fn jst() -> FixedOffset {
    // 9 h east is always a representable offset.
    FixedOffset::east_opt(JST_OFFSET_SECONDS).expect("UTC+9 is a valid offset")
}

/// JST civil date of a UTC instant.
///
/// This is the *day basis* used for zhongqi-to-span attribution and for
/// lunar day numbering.
pub fn jst_date(t: DateTime<Utc>) -> NaiveDate {
    t.with_timezone(&jst()).date_naive()
}

/// Instant-within-day policy used when a query names a JST calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplePolicy {
    /// Sample at 12:00:00 JST.
    Noon,
    /// Sample at 23:59:59 JST. Default: disambiguates days that contain a
    /// new-moon instant near midnight.
    #[default]
    EndOfDay,
}

impl SamplePolicy {
    fn wall_clock(self) -> (u32, u32, u32) {
        match self {
            Self::Noon => (12, 0, 0),
            Self::EndOfDay => (23, 59, 59),
        }
    }
}

/// The UTC instant at which a JST calendar day is sampled.
pub fn sample_instant(date: NaiveDate, policy: SamplePolicy) -> DateTime<Utc> {
    let (h, m, s) = policy.wall_clock();
    let wall = date
        .and_hms_opt(h, m, s)
        .expect("sampling wall-clock time is valid");
    jst_to_utc(wall)
}

/// Convert a JST wall-clock datetime to the equivalent UTC instant.
pub fn jst_to_utc(wall: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(wall - Duration::seconds(i64::from(JST_OFFSET_SECONDS))))
}

/// Checked UTC datetime constructor.
///
/// Returns `None` when the calendar components do not form a valid datetime.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, min, sec)?;
    Some(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jst_offset() {
        assert_eq!(jst().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn jst_date_rolls_over_at_15_utc() {
        // 14:59 UTC is 23:59 JST (same day); 15:00 UTC is 00:00 JST next day.
        let before = utc(2024, 3, 1, 14, 59, 0).unwrap();
        let after = utc(2024, 3, 1, 15, 0, 0).unwrap();
        assert_eq!(jst_date(before), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(jst_date(after), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn end_of_day_sample_is_1459_utc() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let t = sample_instant(d, SamplePolicy::EndOfDay);
        assert_eq!(t, utc(2024, 3, 1, 14, 59, 59).unwrap());
        assert_eq!(jst_date(t), d);
    }

    #[test]
    fn noon_sample_is_03_utc() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let t = sample_instant(d, SamplePolicy::Noon);
        assert_eq!(t, utc(2024, 3, 1, 3, 0, 0).unwrap());
    }

    #[test]
    fn default_policy_is_end_of_day() {
        assert_eq!(SamplePolicy::default(), SamplePolicy::EndOfDay);
    }

    #[test]
    fn utc_rejects_invalid_dates() {
        assert!(utc(2024, 2, 30, 0, 0, 0).is_none());
        assert!(utc(2024, 13, 1, 0, 0, 0).is_none());
        assert!(utc(2024, 2, 29, 0, 0, 0).is_some());
    }
}
