//! Winter-solstice anchoring of the lunisolar month series.
//!
//! For each Gregorian year the 270° crossing is located in a safe
//! [Dec 1, Feb 1) window, then attached to the lunar span of a shared
//! new-moon series. The series is rebuilt with progressively larger
//! padding until every requested solstice is strictly bracketed.

use chrono::{DateTime, Datelike, Duration, Utc};

use kyureki_astro::AstronomyEngine;
use kyureki_time::utc;

use crate::error::SearchError;
use crate::newmoon::new_moons_between;
use crate::newmoon_types::NewMoonConfig;
use crate::solarterm::solar_longitude_crossings;
use crate::solarterm_types::SolarTermConfig;
use crate::solstice_types::SolsticeAnchor;

/// Padding escalation schedule in days (relative floor applied to each).
const PAD_SCHEDULE_DAYS: [i64; 5] = [30, 60, 90, 120, 180];

fn winter_window(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), SearchError> {
    let a = utc(year, 12, 1, 0, 0, 0)
        .ok_or(SearchError::InvalidRange("year out of calendar range"))?;
    let b = utc(year + 1, 2, 1, 0, 0, 0)
        .ok_or(SearchError::InvalidRange("year out of calendar range"))?;
    Ok((a, b))
}

/// The winter solstice (λ☉ = 270°) of a Gregorian year, UTC.
pub fn find_winter_solstice_utc(
    engine: &AstronomyEngine,
    year: i32,
    config: &SolarTermConfig,
) -> Result<DateTime<Utc>, SearchError> {
    let (a, b) = winter_window(year)?;
    let xs = solar_longitude_crossings(engine, a, b, 270.0, config)?;
    xs.into_iter().min().ok_or(SearchError::SolsticeNotFound { year })
}

/// Locate the lunar span of a sorted new-moon series containing a solstice.
pub fn find_anchor_in_moons(
    moons: &[DateTime<Utc>],
    solstice_utc: DateTime<Utc>,
) -> Result<SolsticeAnchor, SearchError> {
    if moons.len() < 2 {
        return Err(SearchError::InvalidRange(
            "new-moon series needs at least two instants",
        ));
    }
    let after = moons.partition_point(|&m| m <= solstice_utc);
    if after == 0 || after >= moons.len() {
        return Err(SearchError::SolsticeNotBracketed { padded_days: 0 });
    }
    let i = after - 1;
    Ok(SolsticeAnchor {
        solstice_utc,
        span_index: i,
        new_moon_utc: moons[i],
        next_new_moon_utc: moons[i + 1],
    })
}

/// Solstices and anchors covering a year set, plus the shared new-moon
/// series they index into.
///
/// The year set is pre-extended by one year on both sides (and by the
/// anchor year governing `start_utc`/`end_utc`) so every saisjitsu window
/// over the requested years has both of its bounding anchors available.
pub fn anchors_for_years(
    engine: &AstronomyEngine,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    years: &[i32],
    newmoon_config: &NewMoonConfig,
    solarterm_config: &SolarTermConfig,
    series_pad_days: i64,
) -> Result<(Vec<DateTime<Utc>>, Vec<SolsticeAnchor>), SearchError> {
    if start_utc >= end_utc {
        return Err(SearchError::InvalidRange("end_utc must be after start_utc"));
    }
    if years.is_empty() {
        return Err(SearchError::InvalidRange("years must not be empty"));
    }
    if series_pad_days < 1 {
        return Err(SearchError::InvalidConfig("series_pad_days must be >= 1"));
    }

    let mut solstice_years: Vec<i32> = Vec::new();
    for &y in years {
        solstice_years.extend([y - 1, y, y + 1]);
    }
    // The window containing start_utc is anchored at the previous solstice
    // when start_utc precedes its own year's solstice; same at the end.
    let start_year = start_utc.year();
    let sol_start = find_winter_solstice_utc(engine, start_year, solarterm_config)?;
    solstice_years.push(if start_utc < sol_start { start_year - 1 } else { start_year });
    let end_year = end_utc.year();
    let sol_end = find_winter_solstice_utc(engine, end_year, solarterm_config)?;
    solstice_years.push(if end_utc > sol_end { end_year + 1 } else { end_year });
    solstice_years.sort_unstable();
    solstice_years.dedup();

    let mut solstices: Vec<DateTime<Utc>> = Vec::with_capacity(solstice_years.len());
    for &y in &solstice_years {
        solstices.push(find_winter_solstice_utc(engine, y, solarterm_config)?);
    }
    solstices.sort();

    let earliest = *solstices.first().expect("year set is non-empty");
    let latest = *solstices.last().expect("year set is non-empty");
    let base_a = start_utc.min(earliest);
    let base_b = end_utc.max(latest);

    let mut moons: Vec<DateTime<Utc>> = Vec::new();
    let mut bracketed = false;
    let mut last_pad = series_pad_days;

    for pad in PAD_SCHEDULE_DAYS {
        let pad_days = pad.max(series_pad_days);
        last_pad = pad_days;
        let a = base_a - Duration::days(pad_days);
        let b = base_b + Duration::days(pad_days);
        moons = new_moons_between(engine, a, b, newmoon_config)?;
        if moons.len() < 2 {
            engine.trace("solstice: padded series too short, expanding");
            continue;
        }
        if solstices
            .iter()
            .all(|&s| find_anchor_in_moons(&moons, s).is_ok())
        {
            bracketed = true;
            break;
        }
        engine.trace("solstice: not bracketed, expanding padding");
    }

    if !bracketed {
        return Err(SearchError::SolsticeNotBracketed {
            padded_days: last_pad,
        });
    }

    let mut anchors: Vec<SolsticeAnchor> = Vec::with_capacity(solstices.len());
    for &s in &solstices {
        anchors.push(find_anchor_in_moons(&moons, s)?);
    }
    anchors.sort_by_key(|a| a.solstice_utc);
    Ok((moons, anchors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_binary_search() {
        let moons: Vec<_> = (0..5)
            .map(|i| utc(2024, 1, 1 + i * 7, 0, 0, 0).unwrap())
            .collect();
        let sol = utc(2024, 1, 10, 0, 0, 0).unwrap();
        let a = find_anchor_in_moons(&moons, sol).unwrap();
        assert_eq!(a.span_index, 1);
        assert_eq!(a.new_moon_utc, moons[1]);
        assert_eq!(a.next_new_moon_utc, moons[2]);
    }

    #[test]
    fn anchor_on_exact_new_moon_belongs_to_that_span() {
        let moons: Vec<_> = (0..3)
            .map(|i| utc(2024, 1, 1 + i * 7, 0, 0, 0).unwrap())
            .collect();
        let a = find_anchor_in_moons(&moons, moons[1]).unwrap();
        assert_eq!(a.span_index, 1);
    }

    #[test]
    fn anchor_outside_series_is_rejected() {
        let moons: Vec<_> = (0..3)
            .map(|i| utc(2024, 1, 1 + i * 7, 0, 0, 0).unwrap())
            .collect();
        let before = utc(2023, 12, 1, 0, 0, 0).unwrap();
        assert!(find_anchor_in_moons(&moons, before).is_err());
        let after = utc(2024, 2, 1, 0, 0, 0).unwrap();
        assert!(find_anchor_in_moons(&moons, after).is_err());
    }
}
