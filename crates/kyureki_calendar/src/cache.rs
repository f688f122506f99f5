//! Lunisolar range cache and Gregorian ⇄ lunisolar conversion.
//!
//! The cache concatenates the labeled months of every saisjitsu window
//! overlapping the requested date range (plus enough look-back for year
//! determination), sorted by new moon with a parallel instant array for
//! O(log n) date lookup. Nothing is mutated after construction.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use kyureki_astro::AstronomyEngine;
use kyureki_search::{anchors_for_years, principal_terms_between};
use kyureki_time::{SamplePolicy, jst_date, jst_to_utc, sample_instant};

use crate::config::KyurekiConfig;
use crate::error::CalendarError;
use crate::leap::{decide_leap_month, verify_leap_consistency};
use crate::month_types::{LunarYMD, NamedMonth, build_lunar_spans};
use crate::naming::assign_month_names;

/// Look-back needed so year determination can always reach a non-leap
/// month-1 new moon before the earliest query date.
const YEAR_LOOKBACK_DAYS: i64 = 400;

/// Immutable labeled-month cache over a date window.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCache {
    months: Vec<NamedMonth>,
    new_moons: Vec<DateTime<Utc>>,
    /// JST start date and Gregorian (JST) year of every non-leap month 1,
    /// ascending; drives year determination.
    month1_starts: Vec<(NaiveDate, i32)>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    sample_policy: SamplePolicy,
}

impl RangeCache {
    pub fn months(&self) -> &[NamedMonth] {
        &self.months
    }

    /// The requested query window (inclusive).
    pub fn coverage(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }

    pub fn sample_policy(&self) -> SamplePolicy {
        self.sample_policy
    }

    fn require_in_window(&self, date: NaiveDate) -> Result<(), CalendarError> {
        if date < self.start_date || date > self.end_date {
            return Err(CalendarError::OutOfCachedRange { date });
        }
        Ok(())
    }
}

/// Build the cache for `[start_date, end_date]` (JST civil dates).
///
/// Years `start.year − 2 ..= end.year + 1` are processed so that year
/// determination can always reach a month-1 new moon at least 400 days
/// back, and so the trailing window is complete.
pub fn build_range_cache(
    engine: &AstronomyEngine,
    start_date: NaiveDate,
    end_date: NaiveDate,
    config: &KyurekiConfig,
) -> Result<RangeCache, CalendarError> {
    config
        .lunisolar
        .validate()
        .map_err(CalendarError::InvalidRange)?;
    if end_date < start_date {
        return Err(CalendarError::InvalidRange("end_date before start_date"));
    }
    let day_count = (end_date - start_date).num_days() + 1;
    if day_count > config.lunisolar.max_range_days {
        return Err(CalendarError::InvalidRange("range exceeds max_range_days"));
    }

    let start_utc = jst_to_utc(
        start_date
            .and_hms_opt(0, 0, 0)
            .ok_or(CalendarError::InvalidRange("invalid start date"))?,
    );
    let end_utc = jst_to_utc(
        end_date
            .succ_opt()
            .ok_or(CalendarError::InvalidRange("end date out of range"))?
            .and_hms_opt(0, 0, 0)
            .ok_or(CalendarError::InvalidRange("invalid end date"))?,
    );

    let years: Vec<i32> = (start_date.year() - 2..=end_date.year() + 1).collect();
    let (moons, anchors) = anchors_for_years(
        engine,
        start_utc,
        end_utc,
        &years,
        &config.newmoon,
        &config.solarterm,
        config.lunisolar.series_pad_days,
    )?;

    let term_pad = Duration::days(config.lunisolar.term_pad_days);
    let mut months: Vec<NamedMonth> = Vec::new();

    // Only windows overlapping the needed coverage are labeled: the query
    // window itself plus the year-determination look-back. Anchors beyond
    // that exist solely to bound the new-moon series.
    let coverage_start =
        start_utc - Duration::days(YEAR_LOOKBACK_DAYS + config.lunisolar.instant_window_days);
    let coverage_end = end_utc + Duration::days(config.lunisolar.instant_window_days);

    for pair in anchors.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.new_moon_utc <= coverage_start || a.new_moon_utc >= coverage_end {
            continue;
        }
        let span_count = b.span_index.saturating_sub(a.span_index);
        let spans = build_lunar_spans(&moons, a.span_index, span_count)?;
        let terms = principal_terms_between(
            engine,
            a.new_moon_utc - term_pad,
            b.new_moon_utc + term_pad,
            &config.solarterm,
        )?;

        let decision = decide_leap_month(&spans, &terms, config.lunisolar.anchor_month_no)?;
        verify_leap_consistency(
            &spans,
            &terms,
            &decision,
            config.lunisolar.month_naming_mode,
        )?;
        let named = assign_month_names(
            &spans,
            &terms,
            decision.leap_span_pos,
            config.lunisolar.month_naming_mode,
        )?;
        months.extend(named);
    }

    months.sort_by_key(|m| m.new_moon_utc);
    months.dedup_by_key(|m| m.new_moon_utc);

    let new_moons: Vec<DateTime<Utc>> = months.iter().map(|m| m.new_moon_utc).collect();
    let month1_starts: Vec<(NaiveDate, i32)> = months
        .iter()
        .filter(|m| m.month_no == 1 && !m.is_leap)
        .map(|m| {
            let d = jst_date(m.new_moon_utc);
            (d, d.year())
        })
        .collect();

    Ok(RangeCache {
        months,
        new_moons,
        month1_starts,
        start_date,
        end_date,
        sample_policy: config.lunisolar.sample_policy,
    })
}

/// Convert a JST civil date to its lunisolar date.
pub fn gregorian_to_lunar(
    cache: &RangeCache,
    date: NaiveDate,
) -> Result<LunarYMD, CalendarError> {
    cache.require_in_window(date)?;

    let t = sample_instant(date, cache.sample_policy);
    let after = cache.new_moons.partition_point(|&m| m <= t);
    if after == 0 {
        return Err(CalendarError::OutOfCachedRange { date });
    }
    let month = &cache.months[after - 1];
    if t >= month.next_new_moon_utc {
        return Err(CalendarError::OutOfCachedRange { date });
    }

    let day = (date - jst_date(month.new_moon_utc)).num_days() + 1;
    let day = u8::try_from(day)
        .map_err(|_| CalendarError::OutOfCachedRange { date })?;

    // Year of the nearest preceding non-leap month-1 new-moon day.
    let idx = cache.month1_starts.partition_point(|&(d, _)| d <= date);
    if idx == 0 {
        return Err(CalendarError::NoMonthOneAnchor { date });
    }
    let year = cache.month1_starts[idx - 1].1;

    Ok(LunarYMD {
        year,
        month: month.month_no,
        day,
        is_leap: month.is_leap,
    })
}

/// Convert a lunisolar date back to the JST civil date.
pub fn lunar_to_gregorian(
    cache: &RangeCache,
    ymd: &LunarYMD,
) -> Result<NaiveDate, CalendarError> {
    if ymd.day == 0 || ymd.day > 30 || ymd.month == 0 || ymd.month > 12 {
        return Err(CalendarError::InvalidRange("lunar month/day out of range"));
    }

    let mut current_year: Option<i32> = None;
    for m in &cache.months {
        if m.month_no == 1 && !m.is_leap {
            current_year = Some(jst_date(m.new_moon_utc).year());
        }
        let Some(year) = current_year else { continue };
        if year == ymd.year && m.month_no == ymd.month && m.is_leap == ymd.is_leap {
            let len = m.length_days();
            if i64::from(ymd.day) > len {
                return Err(CalendarError::InvalidRange("day exceeds month length"));
            }
            return Ok(jst_date(m.new_moon_utc) + Duration::days(i64::from(ymd.day) - 1));
        }
    }

    Err(CalendarError::UnknownMonth {
        year: ymd.year,
        month: ymd.month,
        is_leap: ymd.is_leap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyureki_time::utc;

    /// Hand-built cache: month 12 of 2023 then months 1 and 2 of 2024,
    /// with realistic new-moon instants.
    fn synthetic_cache() -> RangeCache {
        let moons = [
            utc(2024, 1, 11, 11, 57, 0).unwrap(),
            utc(2024, 2, 9, 22, 59, 0).unwrap(),
            utc(2024, 3, 10, 9, 0, 0).unwrap(),
            utc(2024, 4, 8, 18, 21, 0).unwrap(),
        ];
        let months: Vec<NamedMonth> = (0..3)
            .map(|i| NamedMonth {
                pos: i,
                month_no: [12u8, 1, 2][i],
                is_leap: false,
                new_moon_utc: moons[i],
                next_new_moon_utc: moons[i + 1],
                zhongqi_deg: Some([300, 330, 0][i]),
                zhongqi_utc: Some(moons[i] + Duration::days(14)),
            })
            .collect();
        let new_moons = months.iter().map(|m| m.new_moon_utc).collect();
        let month1_starts = months
            .iter()
            .filter(|m| m.month_no == 1 && !m.is_leap)
            .map(|m| {
                let d = jst_date(m.new_moon_utc);
                (d, d.year())
            })
            .collect();
        RangeCache {
            months,
            new_moons,
            month1_starts,
            start_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            sample_policy: SamplePolicy::EndOfDay,
        }
    }

    #[test]
    fn first_day_of_month_1() {
        let cache = synthetic_cache();
        // New moon 2024-02-09 22:59 UTC = 2024-02-10 07:59 JST.
        let d = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let l = gregorian_to_lunar(&cache, d).unwrap();
        assert_eq!((l.year, l.month, l.day, l.is_leap), (2024, 1, 1, false));
    }

    #[test]
    fn mid_month_day_count() {
        let cache = synthetic_cache();
        let d = NaiveDate::from_ymd_opt(2024, 2, 24).unwrap();
        let l = gregorian_to_lunar(&cache, d).unwrap();
        assert_eq!((l.month, l.day), (1, 15));
    }

    #[test]
    fn out_of_window_is_rejected() {
        let cache = synthetic_cache();
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(matches!(
            gregorian_to_lunar(&cache, d),
            Err(CalendarError::OutOfCachedRange { .. })
        ));
    }

    #[test]
    fn round_trip() {
        let cache = synthetic_cache();
        for offset in 0..40 {
            let d = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap() + Duration::days(offset);
            if d > cache.end_date {
                break;
            }
            let l = gregorian_to_lunar(&cache, d).unwrap();
            assert_eq!(lunar_to_gregorian(&cache, &l).unwrap(), d);
        }
    }

    #[test]
    fn reverse_lookup_unknown_month() {
        let cache = synthetic_cache();
        let err = lunar_to_gregorian(
            &cache,
            &LunarYMD {
                year: 2024,
                month: 7,
                day: 1,
                is_leap: false,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CalendarError::UnknownMonth { .. }));
    }

    #[test]
    fn reverse_lookup_validates_day() {
        let cache = synthetic_cache();
        // Month 1 of 2024 runs 02-10 .. 03-10 JST: 29 days.
        let err = lunar_to_gregorian(
            &cache,
            &LunarYMD {
                year: 2024,
                month: 1,
                day: 30,
                is_leap: false,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CalendarError::InvalidRange(_)));
    }
}
