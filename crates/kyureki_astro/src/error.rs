//! Error types for astronomy providers.

use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};

/// Errors from ephemeris evaluation or provider resolution.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AstroError {
    /// The requested instant is outside the provider's coverage window.
    OutOfRange {
        requested: DateTime<Utc>,
        source: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Provider-internal failure.
    Provider(String),
    /// No registered provider factory matches the requested ephemeris name.
    UnknownEphemeris(String),
}

impl Display for AstroError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange {
                requested,
                source,
                start,
                end,
            } => write!(
                f,
                "instant {requested} outside coverage of {source} ({start} .. {end})"
            ),
            Self::Provider(msg) => write!(f, "provider error: {msg}"),
            Self::UnknownEphemeris(name) => write!(f, "unknown ephemeris: {name}"),
        }
    }
}

impl Error for AstroError {}
