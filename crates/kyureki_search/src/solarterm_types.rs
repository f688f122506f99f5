//! Types for solar-term (sekki) crossing searches.

use chrono::{DateTime, Utc};

/// The 12 principal-term (中気) longitudes.
pub const PRINCIPAL_TERM_DEGS: [i32; 12] =
    [0, 30, 60, 90, 120, 150, 180, 210, 240, 270, 300, 330];

/// The 24 sekki longitudes.
pub const SEKKI_DEGS: [i32; 24] = [
    0, 15, 30, 45, 60, 75, 90, 105, 120, 135, 150, 165, 180, 195, 210, 225, 240, 255, 270, 285,
    300, 315, 330, 345,
];

/// A solar-longitude crossing event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermEvent {
    /// Target longitude in degrees, normalized to [0, 360).
    pub deg: i32,
    /// UTC instant of the crossing.
    pub utc: DateTime<Utc>,
}

/// Configuration for solar-longitude crossing searches.
///
/// All time units are explicit to avoid minute/second confusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarTermConfig {
    /// Coarse scan interval in hours.
    pub scan_step_hours: i64,
    /// Root-refinement tolerance in seconds.
    pub tol_seconds: f64,
    /// Post-sort coalescing threshold in seconds.
    pub merge_seconds: f64,
    /// Local rebracket breadth in hours around degenerate hits.
    pub rebracket_window_hours: i64,
    /// Local rebracket step in minutes.
    pub rebracket_step_minutes: i64,
}

impl Default for SolarTermConfig {
    fn default() -> Self {
        Self {
            scan_step_hours: 6,
            tol_seconds: 0.5,
            merge_seconds: 60.0,
            rebracket_window_hours: 2,
            rebracket_step_minutes: 10,
        }
    }
}

impl SolarTermConfig {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.scan_step_hours <= 0 {
            return Err("scan_step_hours must be positive");
        }
        if !self.tol_seconds.is_finite() || self.tol_seconds <= 0.0 {
            return Err("tol_seconds must be positive");
        }
        if !self.merge_seconds.is_finite() || self.merge_seconds < 0.0 {
            return Err("merge_seconds must be non-negative");
        }
        if self.rebracket_window_hours <= 0 {
            return Err("rebracket_window_hours must be positive");
        }
        if self.rebracket_step_minutes <= 0 {
            return Err("rebracket_step_minutes must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SolarTermConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_step() {
        let mut c = SolarTermConfig::default();
        c.scan_step_hours = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_negative_tolerance() {
        let mut c = SolarTermConfig::default();
        c.tol_seconds = -1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn principal_degs_are_30_multiples() {
        for d in PRINCIPAL_TERM_DEGS {
            assert_eq!(d % 30, 0);
        }
        assert_eq!(PRINCIPAL_TERM_DEGS.len(), 12);
        assert_eq!(SEKKI_DEGS.len(), 24);
    }
}
