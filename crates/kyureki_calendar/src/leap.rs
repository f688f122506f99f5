//! Leap-month decision.
//!
//! A saisjitsu window holds 12 or 13 lunar spans between consecutive
//! winter-solstice anchors. With 13 spans one of them carries the leap
//! mark; the decision keys off which spans hold no principal term under
//! JST-day-basis attribution, with disambiguation rules for the irregular
//! arrangements (several empty spans, or none).

use kyureki_search::TermEvent;
use kyureki_time::jst_date;

use crate::error::CalendarError;
use crate::month_types::{LunarSpan, MonthNamingMode};

/// Key principal terms and the month numbers they must land in.
const KEY_TERMS: [(i32, u8); 4] = [(0, 2), (90, 5), (180, 8), (270, 11)];

/// Which decision branch produced the leap position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeapRule {
    /// 12-span window: no leap month.
    CommonYear,
    /// Exactly one empty span.
    SingleEmpty,
    /// Three empty spans: the span after the winter-solstice span.
    AfterWinterSolstice,
    /// Several empty spans, resolved by simulating the key terms.
    KeyTermSimulation,
    /// Several empty spans, none satisfied the key terms; smallest taken.
    SmallestEmpty,
    /// No empty span in a 13-span window; best-scoring position taken.
    BruteForce,
}

/// Outcome of the leap decision for one saisjitsu window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeapDecision {
    /// 0-based span position carrying the leap mark; `None` for a
    /// 12-span window.
    pub leap_span_pos: Option<usize>,
    /// Span positions holding no principal term, ascending.
    pub no_zhongqi_positions: Vec<usize>,
    /// The branch that produced the position.
    pub rule: LeapRule,
}

/// JST-day-basis attribution: a term belongs to a span iff its JST date
/// lies in the span's half-open JST-date range.
///
/// This day basis (not UTC-instant containment) matches the published
/// ephemerides and keeps terms near midnight from drifting to the wrong
/// span.
pub(crate) fn term_in_span_jst(span: &LunarSpan, term: &TermEvent) -> bool {
    let (s_day, e_day) = span.jst_day_range();
    let t_day = jst_date(term.utc);
    s_day <= t_day && t_day < e_day
}

/// All principal-term hits (deg % 30 == 0) attributed to a span, in time
/// order.
pub(crate) fn zhongqi_hits(span: &LunarSpan, terms: &[TermEvent]) -> Vec<TermEvent> {
    let mut hits: Vec<TermEvent> = terms
        .iter()
        .filter(|e| e.deg.rem_euclid(360) % 30 == 0)
        .filter(|e| term_in_span_jst(span, e))
        .copied()
        .collect();
    hits.sort_by_key(|e| e.utc);
    hits
}

/// Month labels for each span position: `(month_no, is_leap)`.
///
/// Position 0 takes `anchor_month_no` non-leap; later positions advance
/// cyclically 11→12→1→…, except the leap position, which repeats its
/// predecessor without advancing.
pub fn assign_month_numbers(
    span_count: usize,
    leap_span_pos: Option<usize>,
    anchor_month_no: u8,
) -> Vec<(u8, bool)> {
    let mut out = Vec::with_capacity(span_count);
    let mut month = anchor_month_no;
    for pos in 0..span_count {
        if leap_span_pos == Some(pos) && pos > 0 {
            out.push((month, true));
        } else {
            if pos > 0 {
                month = month % 12 + 1;
            }
            out.push((month, false));
        }
    }
    out
}

/// Count a candidate leap position's agreement with the key terms.
fn key_term_score(
    spans: &[LunarSpan],
    terms: &[TermEvent],
    leap_span_pos: usize,
    anchor_month_no: u8,
) -> usize {
    let labels = assign_month_numbers(spans.len(), Some(leap_span_pos), anchor_month_no);
    let mut score = 0;
    for &(deg, expected_month) in &KEY_TERMS {
        for e in terms.iter().filter(|e| e.deg.rem_euclid(360) == deg) {
            if let Some(span) = spans.iter().find(|s| term_in_span_jst(s, e)) {
                let (month_no, is_leap) = labels[span.pos];
                if month_no == expected_month && !is_leap {
                    score += 1;
                }
            }
        }
    }
    score
}

/// A candidate satisfies the key-term check when every attributed key
/// term lands in its expected non-leap month.
fn key_terms_all_match(
    spans: &[LunarSpan],
    terms: &[TermEvent],
    leap_span_pos: usize,
    anchor_month_no: u8,
) -> bool {
    let labels = assign_month_numbers(spans.len(), Some(leap_span_pos), anchor_month_no);
    for &(deg, expected_month) in &KEY_TERMS {
        for e in terms.iter().filter(|e| e.deg.rem_euclid(360) == deg) {
            if let Some(span) = spans.iter().find(|s| term_in_span_jst(s, e)) {
                let (month_no, is_leap) = labels[span.pos];
                if month_no != expected_month || is_leap {
                    return false;
                }
            }
        }
    }
    true
}

/// Decide the leap-span position for a 12- or 13-span window.
///
/// `terms` must straddle the window generously (the cache builder pads by
/// `term_pad_days` on each side); out-of-window events attribute to no
/// span and are ignored.
pub fn decide_leap_month(
    spans: &[LunarSpan],
    terms: &[TermEvent],
    anchor_month_no: u8,
) -> Result<LeapDecision, CalendarError> {
    let span_count = spans.len();
    if span_count != 12 && span_count != 13 {
        return Err(CalendarError::InconsistentLeapDecision(format!(
            "saisjitsu window has {span_count} spans (expected 12 or 13)"
        )));
    }

    let no_zh: Vec<usize> = spans
        .iter()
        .filter(|s| zhongqi_hits(s, terms).is_empty())
        .map(|s| s.pos)
        .collect();

    if span_count == 12 {
        return Ok(LeapDecision {
            leap_span_pos: None,
            no_zhongqi_positions: no_zh,
            rule: LeapRule::CommonYear,
        });
    }

    // Special arrangement: three empty spans. The span after the one
    // holding the winter-solstice term carries the leap mark, provided it
    // is itself empty.
    if no_zh.len() == 3 {
        let ws_span = spans.iter().find(|s| {
            terms
                .iter()
                .any(|e| e.deg.rem_euclid(360) == 270 && term_in_span_jst(s, e))
        });
        if let Some(p) = ws_span.map(|s| s.pos) {
            let candidate = p + 1;
            if no_zh.contains(&candidate) {
                return Ok(LeapDecision {
                    leap_span_pos: Some(candidate),
                    no_zhongqi_positions: no_zh,
                    rule: LeapRule::AfterWinterSolstice,
                });
            }
        }
    }

    let (leap_span_pos, rule) = match no_zh.len() {
        1 => (no_zh[0], LeapRule::SingleEmpty),
        0 => {
            // Degenerate: no empty span in a 13-span window. Brute-force
            // every position, scored by key-term agreement.
            let mut best_pos = 0;
            let mut best_score = 0;
            for c in 0..span_count {
                let score = key_term_score(spans, terms, c, anchor_month_no);
                if score > best_score {
                    best_score = score;
                    best_pos = c;
                }
            }
            (best_pos, LeapRule::BruteForce)
        }
        _ => {
            // Two or more candidates: simulate the numbering for each and
            // take the first whose key terms all land where they must.
            match no_zh
                .iter()
                .copied()
                .find(|&c| key_terms_all_match(spans, terms, c, anchor_month_no))
            {
                Some(c) => (c, LeapRule::KeyTermSimulation),
                None => (no_zh[0], LeapRule::SmallestEmpty),
            }
        }
    };

    Ok(LeapDecision {
        leap_span_pos: Some(leap_span_pos),
        no_zhongqi_positions: no_zh,
        rule,
    })
}

/// Re-verify a decision under the same attribution before naming.
///
/// 13 spans: exactly one empty span, equal to the decided leap position.
/// 12 spans: no empty span. Under [`MonthNamingMode::Strict`] a span with
/// two or more principal terms is also rejected; `WsFirst` resolves
/// multiplicity itself during naming.
pub fn verify_leap_consistency(
    spans: &[LunarSpan],
    terms: &[TermEvent],
    decision: &LeapDecision,
    mode: MonthNamingMode,
) -> Result<(), CalendarError> {
    let counts: Vec<usize> = spans.iter().map(|s| zhongqi_hits(s, terms).len()).collect();
    let empties: Vec<usize> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == 0)
        .map(|(i, _)| i)
        .collect();

    if spans.len() == 13 {
        if empties.len() != 1 {
            return Err(CalendarError::InconsistentLeapDecision(format!(
                "13-span window has {} empty spans (expected exactly 1)",
                empties.len()
            )));
        }
        if decision.leap_span_pos != Some(empties[0]) {
            return Err(CalendarError::InconsistentLeapDecision(format!(
                "decided leap position {:?} does not match the empty span {}",
                decision.leap_span_pos, empties[0]
            )));
        }
    } else if !empties.is_empty() {
        return Err(CalendarError::InconsistentLeapDecision(format!(
            "12-span window has empty spans at {empties:?}"
        )));
    }

    if mode == MonthNamingMode::Strict {
        if let Some(pos) = counts.iter().position(|&c| c >= 2) {
            return Err(CalendarError::InconsistentLeapDecision(format!(
                "span {pos} holds {} principal terms",
                counts[pos]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use kyureki_time::utc;

    fn t0() -> DateTime<Utc> {
        // 2023-12-13 00:00 UTC, near a real new moon
        utc(2023, 12, 13, 0, 0, 0).unwrap()
    }

    /// Synthetic spans of alternating 30/29 days starting at `t0`.
    fn spans(n: usize) -> Vec<LunarSpan> {
        let mut out = Vec::new();
        let mut start = t0();
        for pos in 0..n {
            let len = if pos % 2 == 0 { 30 } else { 29 };
            let end = start + Duration::days(len);
            out.push(LunarSpan {
                pos,
                new_moon_utc: start,
                next_new_moon_utc: end,
            });
            start = end;
        }
        out
    }

    fn term(deg: i32, day_offset: i64) -> TermEvent {
        TermEvent {
            deg,
            utc: t0() + Duration::days(day_offset) + Duration::hours(3),
        }
    }

    /// One zhongqi per span: plain 12-month window, no leap.
    #[test]
    fn twelve_span_window_has_no_leap() {
        let sp = spans(12);
        let terms: Vec<TermEvent> = (0..12)
            .map(|i| term((270 + 30 * i) % 360, i64::from(i) * 30 + 10))
            .collect();
        let d = decide_leap_month(&sp, &terms, 11).unwrap();
        assert_eq!(d.leap_span_pos, None);
        assert_eq!(d.rule, LeapRule::CommonYear);
        assert!(d.no_zhongqi_positions.is_empty());
        verify_leap_consistency(&sp, &terms, &d, MonthNamingMode::Strict).unwrap();
    }

    /// 13 spans with a single empty span at position 6.
    #[test]
    fn thirteen_span_single_empty() {
        let sp = spans(13);
        // Term i sits at the midpoint of span i for i<6, span i+1 after,
        // leaving span 6 empty.
        let terms: Vec<TermEvent> = (0..12_usize)
            .map(|i| {
                let span_pos = if i < 6 { i } else { i + 1 };
                let mid = sp[span_pos].new_moon_utc
                    + (sp[span_pos].next_new_moon_utc - sp[span_pos].new_moon_utc) / 2;
                TermEvent {
                    deg: (270 + 30 * i32::try_from(i).unwrap()) % 360,
                    utc: mid,
                }
            })
            .collect();
        let d = decide_leap_month(&sp, &terms, 11).unwrap();
        assert_eq!(d.leap_span_pos, Some(6));
        assert_eq!(d.rule, LeapRule::SingleEmpty);
        assert_eq!(d.no_zhongqi_positions, vec![6]);
        verify_leap_consistency(&sp, &terms, &d, MonthNamingMode::WsFirst).unwrap();
    }

    /// Three empty spans: the span after the 270° span takes the mark.
    #[test]
    fn thirteen_span_three_empty_uses_ws_rule() {
        let sp = spans(13);
        // 270° in span 0; spans 1, 5, 9 empty; the rest hold one term
        // each (degrees don't matter for the special rule).
        let occupied = [0_usize, 2, 3, 4, 6, 7, 8, 10, 11, 12];
        let terms: Vec<TermEvent> = occupied
            .iter()
            .enumerate()
            .map(|(i, &span_pos)| {
                let mid = sp[span_pos].new_moon_utc
                    + (sp[span_pos].next_new_moon_utc - sp[span_pos].new_moon_utc) / 2;
                TermEvent {
                    deg: (270 + 30 * i32::try_from(i).unwrap()) % 360,
                    utc: mid,
                }
            })
            .collect();
        let d = decide_leap_month(&sp, &terms, 11).unwrap();
        assert_eq!(d.no_zhongqi_positions, vec![1, 5, 9]);
        assert_eq!(d.leap_span_pos, Some(1));
        assert_eq!(d.rule, LeapRule::AfterWinterSolstice);
    }

    #[test]
    fn numbering_cycles_through_the_anchor() {
        let labels = assign_month_numbers(12, None, 11);
        assert_eq!(labels[0], (11, false));
        assert_eq!(labels[1], (12, false));
        assert_eq!(labels[2], (1, false));
        assert_eq!(labels[11], (10, false));
    }

    #[test]
    fn numbering_repeats_at_the_leap_position() {
        let labels = assign_month_numbers(13, Some(3), 11);
        assert_eq!(labels[2], (1, false));
        assert_eq!(labels[3], (1, true));
        assert_eq!(labels[4], (2, false));
        assert_eq!(labels[12], (10, false));
    }

    #[test]
    fn rejects_wrong_span_count() {
        let sp = spans(11);
        let err = decide_leap_month(&sp, &[], 11).unwrap_err();
        assert!(matches!(err, CalendarError::InconsistentLeapDecision(_)));
    }

    #[test]
    fn day_basis_attribution() {
        // Term at 14:59 UTC (23:59 JST) on the span's last JST day counts;
        // one minute later it tips into the next JST day and drops out.
        let span = LunarSpan {
            pos: 0,
            new_moon_utc: utc(2024, 1, 11, 0, 0, 0).unwrap(),
            next_new_moon_utc: utc(2024, 2, 9, 20, 0, 0).unwrap(),
        };
        // next_new_moon at 2024-02-09 20:00 UTC is 2024-02-10 05:00 JST,
        // so the span's JST-day range is [01-11, 02-10).
        let inside = TermEvent {
            deg: 300,
            utc: utc(2024, 2, 9, 14, 59, 0).unwrap(),
        };
        assert!(term_in_span_jst(&span, &inside));
        let outside = TermEvent {
            deg: 300,
            utc: utc(2024, 2, 9, 15, 0, 0).unwrap(),
        };
        assert!(!term_in_span_jst(&span, &outside));
    }
}
