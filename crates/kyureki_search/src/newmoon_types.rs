//! Types for new-moon and lunar-phase searches.

use chrono::{DateTime, Utc};

/// Configuration for conjunction (new-moon) and phase searches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewMoonConfig {
    /// Coarse scan interval in hours.
    pub scan_step_hours: i64,
    /// Root-refinement tolerance in seconds.
    pub tol_seconds: f64,
    /// Local rescan breadth in hours when a refined candidate fails the
    /// strict phase-distance acceptance.
    pub rebracket_window_hours: i64,
    /// Local rescan step in minutes.
    pub rebracket_step_minutes: i64,
    /// Post-sort coalescing threshold in seconds.
    pub merge_seconds: f64,
}

impl Default for NewMoonConfig {
    fn default() -> Self {
        Self {
            scan_step_hours: 6,
            tol_seconds: 0.5,
            rebracket_window_hours: 36,
            rebracket_step_minutes: 10,
            merge_seconds: 60.0,
        }
    }
}

impl NewMoonConfig {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.scan_step_hours <= 0 {
            return Err("scan_step_hours must be positive");
        }
        if !self.tol_seconds.is_finite() || self.tol_seconds <= 0.0 {
            return Err("tol_seconds must be positive");
        }
        if self.rebracket_window_hours <= 0 {
            return Err("rebracket_window_hours must be positive");
        }
        if self.rebracket_step_minutes <= 0 {
            return Err("rebracket_step_minutes must be positive");
        }
        if !self.merge_seconds.is_finite() || self.merge_seconds < 0.0 {
            return Err("merge_seconds must be non-negative");
        }
        Ok(())
    }
}

/// The four principal lunar phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    NewMoon,
    FirstQuarter,
    FullMoon,
    LastQuarter,
}

impl PhaseKind {
    /// Target elongation λ☾ − λ☉ in degrees.
    pub const fn target_deg(self) -> f64 {
        match self {
            Self::NewMoon => 0.0,
            Self::FirstQuarter => 90.0,
            Self::FullMoon => 180.0,
            Self::LastQuarter => 270.0,
        }
    }

    /// Japanese phase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NewMoon => "朔",
            Self::FirstQuarter => "上弦",
            Self::FullMoon => "望",
            Self::LastQuarter => "下弦",
        }
    }

    pub const fn all() -> [Self; 4] {
        [
            Self::NewMoon,
            Self::FirstQuarter,
            Self::FullMoon,
            Self::LastQuarter,
        ]
    }
}

/// A principal lunar-phase event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseEvent {
    pub kind: PhaseKind,
    pub utc: DateTime<Utc>,
}
