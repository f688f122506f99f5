//! Lunisolar rule engine: leap-month decision, month naming, range cache,
//! and the structured day/range query surface, plus the rokuyo and sekki
//! feature mappings.
//!
//! Months anchor on the winter solstice: the lunar span containing the
//! 270° crossing is month 11, later spans advance cyclically, and in a
//! 13-span year the span without a principal term carries the leap mark
//! (with disambiguation rules for the irregular arrangements).

pub mod cache;
pub mod config;
pub mod error;
pub mod leap;
pub mod month_types;
pub mod naming;
pub mod query;
pub mod rokuyo;
pub mod sekki;

pub use cache::{RangeCache, build_range_cache, gregorian_to_lunar, lunar_to_gregorian};
pub use config::{KyurekiConfig, LuniSolarConfig, Policy2033};
pub use error::CalendarError;
pub use leap::{
    LeapDecision, LeapRule, assign_month_numbers, decide_leap_month, verify_leap_consistency,
};
pub use month_types::{LunarSpan, LunarYMD, MonthNamingMode, NamedMonth, build_lunar_spans};
pub use naming::{assign_month_names, month_no_from_zhongqi};
pub use query::{
    DayRecord, GeoPoint, RangeRecord, TOKYO, day_of, day_of_with_cache, range_of,
};
pub use rokuyo::{Rokuyo, rokuyo_from_month_day, rokuyo_r};
pub use sekki::{SEKKI_NAMES, SekkiInfo, SekkiKind, month_display_name, sekki_info_from_deg};
