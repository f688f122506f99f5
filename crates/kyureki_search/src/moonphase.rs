//! Principal lunar-phase events and moon age.
//!
//! Built on the same unwrap detector as the new-moon enumerator, with the
//! phase target shifted to 90°/180°/270° for the quarters and full moon.

use chrono::{DateTime, Duration, Utc};

use kyureki_astro::AstronomyEngine;

use crate::error::SearchError;
use crate::newmoon::{new_moons_between, phase_crossings};
use crate::newmoon_types::{NewMoonConfig, PhaseEvent, PhaseKind};

/// All principal phase events in `[start_utc, end_utc)`, sorted by time.
pub fn moon_phase_events_between(
    engine: &AstronomyEngine,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    config: &NewMoonConfig,
) -> Result<Vec<PhaseEvent>, SearchError> {
    let mut out = Vec::new();
    for kind in PhaseKind::all() {
        let ts = phase_crossings(engine, start_utc, end_utc, kind.target_deg(), config)?;
        out.extend(ts.into_iter().map(|utc| PhaseEvent { kind, utc }));
    }
    out.sort_by_key(|e| e.utc);
    Ok(out)
}

/// Days elapsed since the last new moon at or before `t`.
///
/// Searches `[t − window_days, t]`; the window must cover at least one
/// synodic month (the lunisolar layer passes its instant-window padding).
pub fn moon_age_days(
    engine: &AstronomyEngine,
    t: DateTime<Utc>,
    window_days: i64,
    config: &NewMoonConfig,
) -> Result<f64, SearchError> {
    if window_days <= 0 {
        return Err(SearchError::InvalidConfig("window_days must be positive"));
    }
    let start = t - Duration::days(window_days);
    // End one scan step past `t` so a conjunction at `t` itself is seen.
    let end = t + Duration::hours(config.scan_step_hours);
    let moons = new_moons_between(engine, start, end, config)?;
    let prev = moons
        .into_iter()
        .filter(|&nm| nm <= t)
        .next_back()
        .ok_or(SearchError::NoConvergence(
            "no new moon in the look-back window",
        ))?;
    let us = (t - prev)
        .num_microseconds()
        .map_or_else(|| (t - prev).num_seconds() as f64 * 1e6, |us| us as f64);
    Ok(us / 86_400.0 / 1e6)
}
