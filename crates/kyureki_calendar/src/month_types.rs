//! Core lunisolar month types.

use chrono::{DateTime, NaiveDate, Utc};

use kyureki_time::jst_date;

use crate::error::CalendarError;

/// One lunar month span: the half-open interval between consecutive new
/// moons, positioned within a saisjitsu window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarSpan {
    pub pos: usize,
    pub new_moon_utc: DateTime<Utc>,
    pub next_new_moon_utc: DateTime<Utc>,
}

impl LunarSpan {
    /// UTC-instant containment in `[new_moon_utc, next_new_moon_utc)`.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.new_moon_utc <= t && t < self.next_new_moon_utc
    }

    /// JST civil dates of the span boundaries.
    pub fn jst_day_range(&self) -> (NaiveDate, NaiveDate) {
        (jst_date(self.new_moon_utc), jst_date(self.next_new_moon_utc))
    }
}

/// Month-naming behavior when a span holds more than one principal term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MonthNamingMode {
    /// Every non-leap span must hold exactly one principal term.
    /// Diagnostic use only.
    Strict,
    /// Prefer the winter-solstice term (270°), else the earliest.
    #[default]
    WsFirst,
}

/// A fully labeled lunar month.
///
/// Leap months inherit `month_no` from their predecessor and carry no
/// zhongqi fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedMonth {
    pub pos: usize,
    pub month_no: u8,
    pub is_leap: bool,
    pub new_moon_utc: DateTime<Utc>,
    pub next_new_moon_utc: DateTime<Utc>,
    pub zhongqi_deg: Option<i32>,
    pub zhongqi_utc: Option<DateTime<Utc>>,
}

impl NamedMonth {
    /// Short display label, e.g. `M11` or `M05 (LEAP)`.
    pub fn label(&self) -> String {
        if self.is_leap {
            format!("M{:02} (LEAP)", self.month_no)
        } else {
            format!("M{:02}", self.month_no)
        }
    }

    /// Month length in JST calendar days (29 or 30).
    pub fn length_days(&self) -> i64 {
        (jst_date(self.next_new_moon_utc) - jst_date(self.new_moon_utc)).num_days()
    }
}

/// A lunisolar calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LunarYMD {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub is_leap: bool,
}

/// Build `span_count` spans starting at `start_span_index` of a sorted
/// new-moon series.
pub fn build_lunar_spans(
    moons: &[DateTime<Utc>],
    start_span_index: usize,
    span_count: usize,
) -> Result<Vec<LunarSpan>, CalendarError> {
    if span_count == 0 {
        return Ok(Vec::new());
    }
    if start_span_index + span_count >= moons.len() {
        return Err(CalendarError::InvalidRange(
            "new-moon series too short for the requested spans",
        ));
    }
    Ok((0..span_count)
        .map(|pos| {
            let i = start_span_index + pos;
            LunarSpan {
                pos,
                new_moon_utc: moons[i],
                next_new_moon_utc: moons[i + 1],
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyureki_time::utc;

    #[test]
    fn span_containment_is_half_open() {
        let s = LunarSpan {
            pos: 0,
            new_moon_utc: utc(2024, 1, 11, 12, 0, 0).unwrap(),
            next_new_moon_utc: utc(2024, 2, 9, 23, 0, 0).unwrap(),
        };
        assert!(s.contains(s.new_moon_utc));
        assert!(!s.contains(s.next_new_moon_utc));
    }

    #[test]
    fn build_spans_rejects_short_series() {
        let moons: Vec<_> = (0..3).map(|i| utc(2024, 1, 1 + i, 0, 0, 0).unwrap()).collect();
        assert!(build_lunar_spans(&moons, 0, 2).is_ok());
        assert!(build_lunar_spans(&moons, 0, 3).is_err());
        assert!(build_lunar_spans(&moons, 1, 2).is_err());
    }

    #[test]
    fn label_format() {
        let m = NamedMonth {
            pos: 0,
            month_no: 5,
            is_leap: true,
            new_moon_utc: utc(2024, 1, 11, 12, 0, 0).unwrap(),
            next_new_moon_utc: utc(2024, 2, 9, 23, 0, 0).unwrap(),
            zhongqi_deg: None,
            zhongqi_utc: None,
        };
        assert_eq!(m.label(), "M05 (LEAP)");
    }

    #[test]
    fn month_length_in_jst_days() {
        // 2024-01-11 11:57 UTC (JST 20:57) .. 2024-02-09 22:59 UTC (JST 02-10 07:59)
        let m = NamedMonth {
            pos: 0,
            month_no: 12,
            is_leap: false,
            new_moon_utc: utc(2024, 1, 11, 11, 57, 0).unwrap(),
            next_new_moon_utc: utc(2024, 2, 9, 22, 59, 0).unwrap(),
            zhongqi_deg: Some(300),
            zhongqi_utc: Some(utc(2024, 1, 20, 0, 0, 0).unwrap()),
        };
        assert_eq!(m.length_days(), 30);
    }
}
