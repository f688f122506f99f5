//! Astronomy layer of the lunisolar calendar engine.
//!
//! This crate provides:
//! - Angle normalization and series unwrap utilities
//! - The astronomy provider capability set (apparent solar/lunar
//!   longitudes, sunrise/sunset) and the engine façade over it
//! - A built-in semi-analytic provider requiring no data files
//! - An explicit provider registry keyed by ephemeris name/path
//! - A diagnostic trace sink interface

pub mod analytic;
pub mod angle;
pub mod error;
pub mod provider;
pub mod registry;
pub mod trace;

pub use analytic::AnalyticProvider;
pub use angle::{angdiff180, norm360, unwrap_deg};
pub use error::AstroError;
pub use provider::{AstroProvider, AstronomyEngine};
pub use registry::{DEFAULT_EPHEMERIS, ENV_EPHEMERIS, EphemerisSpec, ProviderRegistry};
pub use trace::{CollectTrace, NoopTrace, TraceSink};
