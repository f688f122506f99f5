//! Month naming by principal terms.
//!
//! Each non-leap span is named after the zhongqi it contains via the fixed
//! table (冬至 270° → month 11, and so on around the year). The leap span
//! holds no zhongqi and inherits its predecessor's number.

use kyureki_search::TermEvent;
use kyureki_time::jst_date;

use crate::error::CalendarError;
use crate::leap::zhongqi_hits;
use crate::month_types::{LunarSpan, MonthNamingMode, NamedMonth};

/// Zhongqi degree → lunisolar month number.
pub fn month_no_from_zhongqi(deg: i32) -> Option<u8> {
    match deg.rem_euclid(360) {
        270 => Some(11), // 冬至
        300 => Some(12), // 大寒
        330 => Some(1),  // 雨水
        0 => Some(2),    // 春分
        30 => Some(3),   // 穀雨
        60 => Some(4),   // 小満
        90 => Some(5),   // 夏至
        120 => Some(6),  // 大暑
        150 => Some(7),  // 処暑
        180 => Some(8),  // 秋分
        210 => Some(9),  // 霜降
        240 => Some(10), // 小雪
        _ => None,
    }
}

fn choose_hit(
    span_pos: usize,
    hits: &[TermEvent],
    mode: MonthNamingMode,
) -> Result<Option<TermEvent>, CalendarError> {
    if hits.is_empty() {
        return Ok(None);
    }
    match mode {
        MonthNamingMode::Strict => {
            if hits.len() >= 2 {
                let listing: Vec<String> = hits
                    .iter()
                    .map(|e| format!("{}°@{}", e.deg, e.utc))
                    .collect();
                return Err(CalendarError::InconsistentLeapDecision(format!(
                    "multiple zhongqi in span {span_pos}: {}",
                    listing.join(", ")
                )));
            }
            Ok(Some(hits[0]))
        }
        MonthNamingMode::WsFirst => Ok(Some(
            hits.iter()
                .find(|e| e.deg.rem_euclid(360) == 270)
                .copied()
                .unwrap_or(hits[0]),
        )),
    }
}

/// Label every span of a saisjitsu window.
///
/// The caller has already decided (and re-verified) the leap position;
/// any contradiction found here is fatal.
pub fn assign_month_names(
    spans: &[LunarSpan],
    terms: &[TermEvent],
    leap_span_pos: Option<usize>,
    mode: MonthNamingMode,
) -> Result<Vec<NamedMonth>, CalendarError> {
    let mut out: Vec<NamedMonth> = Vec::with_capacity(spans.len());
    let mut prev_month_no: Option<u8> = None;

    for span in spans {
        let is_leap = leap_span_pos == Some(span.pos);
        let hits = zhongqi_hits(span, terms);
        let chosen = choose_hit(span.pos, &hits, mode)?;

        if is_leap {
            if let Some(e) = chosen {
                return Err(CalendarError::InconsistentLeapDecision(format!(
                    "leap span {} contains zhongqi {}° at {} (JST {})",
                    span.pos,
                    e.deg,
                    e.utc,
                    jst_date(e.utc)
                )));
            }
            let Some(month_no) = prev_month_no else {
                return Err(CalendarError::InconsistentLeapDecision(
                    "first span of a window cannot be the leap month".to_owned(),
                ));
            };
            out.push(NamedMonth {
                pos: span.pos,
                month_no,
                is_leap: true,
                new_moon_utc: span.new_moon_utc,
                next_new_moon_utc: span.next_new_moon_utc,
                zhongqi_deg: None,
                zhongqi_utc: None,
            });
            continue;
        }

        let Some(e) = chosen else {
            return Err(CalendarError::InconsistentLeapDecision(format!(
                "non-leap span {} has no zhongqi (wrong leap position?)",
                span.pos
            )));
        };
        let deg = e.deg.rem_euclid(360);
        let Some(month_no) = month_no_from_zhongqi(deg) else {
            return Err(CalendarError::InconsistentLeapDecision(format!(
                "unexpected zhongqi {deg}° in span {}",
                span.pos
            )));
        };
        out.push(NamedMonth {
            pos: span.pos,
            month_no,
            is_leap: false,
            new_moon_utc: span.new_moon_utc,
            next_new_moon_utc: span.next_new_moon_utc,
            zhongqi_deg: Some(deg),
            zhongqi_utc: Some(e.utc),
        });
        prev_month_no = Some(month_no);
    }

    Ok(out)
}
