//! Types for winter-solstice anchoring.

use chrono::{DateTime, Utc};

/// The lunar span containing a winter-solstice (λ☉ = 270°) instant.
///
/// `span_index` is the index `i` in the generated new-moon series with
/// `moons[i] ≤ solstice_utc < moons[i+1]`; that span is month 11
/// (non-leap) of the lunisolar year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolsticeAnchor {
    pub solstice_utc: DateTime<Utc>,
    pub span_index: usize,
    pub new_moon_utc: DateTime<Utc>,
    pub next_new_moon_utc: DateTime<Utc>,
}

/// The interval from one year's winter-solstice lunar month to the next
/// year's, measured in lunar spans of a shared new-moon series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaisjitsuWindow {
    pub start: SolsticeAnchor,
    pub end: SolsticeAnchor,
}

impl SaisjitsuWindow {
    /// Number of lunar spans in `[start.span_index, end.span_index)`.
    pub fn month_count(&self) -> usize {
        self.end.span_index.saturating_sub(self.start.span_index)
    }

    /// A 13-span window carries a leap month.
    pub fn is_leap_year(&self) -> bool {
        self.month_count() == 13
    }
}
