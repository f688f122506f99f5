//! Lunisolar configuration.

use kyureki_search::{NewMoonConfig, SolarTermConfig};
use kyureki_time::SamplePolicy;

use crate::month_types::MonthNamingMode;

/// Reserved handling switch for the 2033 arrangement question.
///
/// The modern rule set resolves 2033 on its own; this hook stays in the
/// configuration for future rule variants and is not consulted by the
/// current algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy2033 {
    Auto,
    #[default]
    Leap11,
    Leap7,
    Leap12,
    Leap1,
}

/// Configuration of the lunisolar rule engine and range cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuniSolarConfig {
    /// New-moon series padding around the anchor window, days.
    pub series_pad_days: i64,
    /// Principal-term padding around each saisjitsu window, days.
    pub term_pad_days: i64,
    /// Look-back window for one-shot queries (moon age), days.
    pub instant_window_days: i64,
    /// Merge threshold for term events, seconds.
    pub merge_seconds: f64,
    /// Instant-within-day sampling for date queries.
    pub sample_policy: SamplePolicy,
    /// Month number assigned to the winter-solstice span.
    pub anchor_month_no: u8,
    /// Month-naming behavior.
    pub month_naming_mode: MonthNamingMode,
    /// Reserved 2033 handling switch (not consulted).
    pub policy_2033: Policy2033,
    /// Upper bound on a cache window, days.
    pub max_range_days: i64,
}

impl Default for LuniSolarConfig {
    fn default() -> Self {
        Self {
            series_pad_days: 30,
            term_pad_days: 40,
            instant_window_days: 40,
            merge_seconds: 60.0,
            sample_policy: SamplePolicy::EndOfDay,
            anchor_month_no: 11,
            month_naming_mode: MonthNamingMode::WsFirst,
            policy_2033: Policy2033::Leap11,
            max_range_days: 2000,
        }
    }
}

impl LuniSolarConfig {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.series_pad_days < 1 {
            return Err("series_pad_days must be >= 1");
        }
        if self.term_pad_days < 1 {
            return Err("term_pad_days must be >= 1");
        }
        if self.instant_window_days < 1 {
            return Err("instant_window_days must be >= 1");
        }
        if !self.merge_seconds.is_finite() || self.merge_seconds < 0.0 {
            return Err("merge_seconds must be non-negative");
        }
        if !(1..=12).contains(&self.anchor_month_no) {
            return Err("anchor_month_no must be in 1..=12");
        }
        if self.max_range_days < 1 {
            return Err("max_range_days must be >= 1");
        }
        Ok(())
    }
}

/// Bundle of the three engine configurations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KyurekiConfig {
    pub newmoon: NewMoonConfig,
    pub solarterm: SolarTermConfig,
    pub lunisolar: LuniSolarConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(LuniSolarConfig::default().validate().is_ok());
        let c = LuniSolarConfig::default();
        assert_eq!(c.anchor_month_no, 11);
        assert_eq!(c.policy_2033, Policy2033::Leap11);
        assert_eq!(c.month_naming_mode, MonthNamingMode::WsFirst);
    }

    #[test]
    fn rejects_bad_anchor() {
        let mut c = LuniSolarConfig::default();
        c.anchor_month_no = 0;
        assert!(c.validate().is_err());
        c.anchor_month_no = 13;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_zero_padding() {
        let mut c = LuniSolarConfig::default();
        c.term_pad_days = 0;
        assert!(c.validate().is_err());
    }
}
