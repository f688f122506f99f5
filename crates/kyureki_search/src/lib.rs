//! Astronomical event search for the lunisolar calendar:
//! solar-term crossings, new moons, principal lunar phases, and
//! winter-solstice anchors.
//!
//! This crate provides:
//! - A datetime-valued bracketing scan and hybrid root refiner
//! - A two-phase solar-longitude crossing enumerator (coarse vectorized
//!   scan, local rebracketing, verified refinement)
//! - A wrap-safe new-moon/phase enumerator with strict acceptance
//! - Winter-solstice anchoring with padding escalation

pub mod error;
pub mod moonphase;
pub mod newmoon;
pub mod newmoon_types;
pub mod rootfind;
pub mod solarterm;
pub mod solarterm_types;
pub mod solstice;
pub mod solstice_types;

pub use error::SearchError;
pub use moonphase::{moon_age_days, moon_phase_events_between};
pub use newmoon::new_moons_between;
pub use newmoon_types::{NewMoonConfig, PhaseEvent, PhaseKind};
pub use rootfind::{RootResult, bracket_by_scan, refine_root};
pub use solarterm::{principal_terms_between, sekki_events_between, solar_longitude_crossings};
pub use solarterm_types::{PRINCIPAL_TERM_DEGS, SEKKI_DEGS, SolarTermConfig, TermEvent};
pub use solstice::{anchors_for_years, find_anchor_in_moons, find_winter_solstice_utc};
pub use solstice_types::{SaisjitsuWindow, SolsticeAnchor};
