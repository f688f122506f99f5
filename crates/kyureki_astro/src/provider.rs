//! Astronomy provider capability set and the engine façade over it.
//!
//! A provider evaluates apparent solar/lunar ecliptic longitudes (frame:
//! true equinox and ecliptic of date) at UTC instants and computes
//! sunrise/sunset for a local civil day. Batch methods default to scalar
//! loops; providers with vectorized evaluation override them.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::angle::{angdiff180, norm360};
use crate::error::AstroError;
use crate::trace::{NoopTrace, TraceSink};

/// Capability set consumed by the calendar core.
pub trait AstroProvider {
    /// Human-readable source label used in error messages.
    fn source(&self) -> &str;

    /// Inclusive UTC coverage window; evaluations outside it must fail
    /// with [`AstroError::OutOfRange`].
    fn coverage_utc(&self) -> (DateTime<Utc>, DateTime<Utc>);

    /// Apparent solar ecliptic longitude in degrees [0, 360).
    fn sun_longitude_deg(&self, t: DateTime<Utc>) -> Result<f64, AstroError>;

    /// Apparent lunar ecliptic longitude in degrees [0, 360).
    fn moon_longitude_deg(&self, t: DateTime<Utc>) -> Result<f64, AstroError>;

    /// Vectorized solar longitude; the default loops over the scalar form.
    fn sun_longitude_deg_many(&self, ts: &[DateTime<Utc>]) -> Result<Vec<f64>, AstroError> {
        ts.iter().map(|&t| self.sun_longitude_deg(t)).collect()
    }

    /// Vectorized lunar longitude; the default loops over the scalar form.
    fn moon_longitude_deg_many(&self, ts: &[DateTime<Utc>]) -> Result<Vec<f64>, AstroError> {
        ts.iter().map(|&t| self.moon_longitude_deg(t)).collect()
    }

    /// Sunrise and sunset instants (UTC) for a civil day at `tz_local`.
    /// Either may be absent (polar day/night).
    fn sunrise_sunset_utc(
        &self,
        day_local: NaiveDate,
        tz_local: FixedOffset,
        lat_deg: f64,
        lon_deg: f64,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), AstroError>;
}

/// Engine façade: normalizes provider output and carries the trace sink.
///
/// The engine is read-only after construction and safe to share across
/// threads when the underlying provider supports concurrent reads.
pub struct AstronomyEngine {
    provider: Box<dyn AstroProvider + Send + Sync>,
    trace: Box<dyn TraceSink + Send + Sync>,
}

impl AstronomyEngine {
    pub fn new(provider: Box<dyn AstroProvider + Send + Sync>) -> Self {
        Self {
            provider,
            trace: Box::new(NoopTrace),
        }
    }

    pub fn with_trace(
        provider: Box<dyn AstroProvider + Send + Sync>,
        trace: Box<dyn TraceSink + Send + Sync>,
    ) -> Self {
        Self { provider, trace }
    }

    pub fn provider(&self) -> &(dyn AstroProvider + Send + Sync) {
        self.provider.as_ref()
    }

    /// Emit a diagnostic message to the configured sink.
    pub fn trace(&self, message: &str) {
        self.trace.event(message);
    }

    /// Apparent solar longitude, normalized to [0, 360).
    pub fn sun_lon(&self, t: DateTime<Utc>) -> Result<f64, AstroError> {
        Ok(norm360(self.provider.sun_longitude_deg(t)?))
    }

    /// Apparent lunar longitude, normalized to [0, 360).
    pub fn moon_lon(&self, t: DateTime<Utc>) -> Result<f64, AstroError> {
        Ok(norm360(self.provider.moon_longitude_deg(t)?))
    }

    pub fn sun_lon_many(&self, ts: &[DateTime<Utc>]) -> Result<Vec<f64>, AstroError> {
        let mut lons = self.provider.sun_longitude_deg_many(ts)?;
        for v in &mut lons {
            *v = norm360(*v);
        }
        Ok(lons)
    }

    pub fn moon_lon_many(&self, ts: &[DateTime<Utc>]) -> Result<Vec<f64>, AstroError> {
        let mut lons = self.provider.moon_longitude_deg_many(ts)?;
        for v in &mut lons {
            *v = norm360(*v);
        }
        Ok(lons)
    }

    /// Lunar phase angle φ = (λ☾ − λ☉) mod 360 in [0, 360).
    pub fn phase360(&self, t: DateTime<Utc>) -> Result<f64, AstroError> {
        Ok(norm360(self.moon_lon(t)? - self.sun_lon(t)?))
    }

    /// Signed distance of the phase angle from conjunction, in (-180, 180].
    pub fn phase_diff(&self, t: DateTime<Utc>) -> Result<f64, AstroError> {
        Ok(angdiff180(self.phase360(t)?))
    }

    pub fn sunrise_sunset_utc(
        &self,
        day_local: NaiveDate,
        tz_local: FixedOffset,
        lat_deg: f64,
        lon_deg: f64,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), AstroError> {
        self.provider
            .sunrise_sunset_utc(day_local, tz_local, lat_deg, lon_deg)
    }
}

impl std::fmt::Debug for AstronomyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstronomyEngine")
            .field("source", &self.provider.source())
            .finish()
    }
}
