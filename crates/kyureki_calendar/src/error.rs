//! Error types for the lunisolar rule engine.

use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use kyureki_astro::AstroError;
use kyureki_search::SearchError;

/// Errors from leap decision, month naming, or cache queries.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CalendarError {
    /// The leap decision contradicts the zhongqi attribution (a leap span
    /// with a principal term, a strict-mode span with none or several, or
    /// a window whose span count is not 12 or 13). Fatal to a cache build.
    InconsistentLeapDecision(String),
    /// A date query reached outside the cached window.
    OutOfCachedRange { date: NaiveDate },
    /// An input range is inverted, empty, or exceeds the day bound.
    InvalidRange(&'static str),
    /// Year determination found no non-leap month-1 new moon preceding the
    /// query date; the cache look-back is too shallow.
    NoMonthOneAnchor { date: NaiveDate },
    /// Reverse lookup named a month the cache does not contain.
    UnknownMonth { year: i32, month: u8, is_leap: bool },
    /// Event search failure.
    Search(SearchError),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InconsistentLeapDecision(msg) => {
                write!(f, "inconsistent leap decision: {msg}")
            }
            Self::OutOfCachedRange { date } => {
                write!(f, "date {date} outside the cached range")
            }
            Self::InvalidRange(msg) => write!(f, "invalid range: {msg}"),
            Self::NoMonthOneAnchor { date } => {
                write!(f, "no month-1 new moon precedes {date} in the cache")
            }
            Self::UnknownMonth {
                year,
                month,
                is_leap,
            } => {
                let leap = if *is_leap { "leap " } else { "" };
                write!(f, "no {leap}month {month} of lunisolar year {year} in the cache")
            }
            Self::Search(e) => write!(f, "search error: {e}"),
        }
    }
}

impl Error for CalendarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Search(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SearchError> for CalendarError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

impl From<AstroError> for CalendarError {
    fn from(e: AstroError) -> Self {
        Self::Search(SearchError::Astro(e))
    }
}
