//! Error types for astronomical event search.

use std::error::Error;
use std::fmt::{Display, Formatter};

use kyureki_astro::AstroError;

/// Errors from bracketing, refinement, or event enumeration.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SearchError {
    /// A configuration value failed validation.
    InvalidConfig(&'static str),
    /// A time range is empty, inverted, or otherwise unusable.
    InvalidRange(&'static str),
    /// Root refinement could not make progress.
    NoConvergence(&'static str),
    /// No 270° crossing found in the winter search window.
    SolsticeNotFound { year: i32 },
    /// The new-moon series failed to bracket a solstice even at the
    /// largest padding.
    SolsticeNotBracketed { padded_days: i64 },
    /// Provider failure.
    Astro(AstroError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::InvalidRange(msg) => write!(f, "invalid range: {msg}"),
            Self::NoConvergence(msg) => write!(f, "no convergence: {msg}"),
            Self::SolsticeNotFound { year } => {
                write!(f, "no winter solstice found for year {year}")
            }
            Self::SolsticeNotBracketed { padded_days } => write!(
                f,
                "solstice not bracketed by new-moon series even at {padded_days}-day padding"
            ),
            Self::Astro(e) => write!(f, "astronomy error: {e}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Astro(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AstroError> for SearchError {
    fn from(e: AstroError) -> Self {
        Self::Astro(e)
    }
}
