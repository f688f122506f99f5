//! Golden-value tests for the event enumerators against the built-in
//! analytic provider. Reference instants are published almanac values;
//! assertions use hour-level tolerances, far above the provider's error.

use chrono::{DateTime, Utc};

use kyureki_astro::{AnalyticProvider, AstronomyEngine};
use kyureki_search::{
    NewMoonConfig, PhaseKind, SolarTermConfig, anchors_for_years, find_winter_solstice_utc,
    moon_age_days, moon_phase_events_between, new_moons_between, principal_terms_between,
    solar_longitude_crossings,
};
use kyureki_time::{jst_date, utc};

fn engine() -> AstronomyEngine {
    AstronomyEngine::new(Box::new(AnalyticProvider::new()))
}

fn minutes_from(t: DateTime<Utc>, reference: DateTime<Utc>) -> i64 {
    (t - reference).num_minutes().abs()
}

/// Vernal equinox 2024: λ☉ = 0° at 2024-03-20 03:06 UTC.
#[test]
fn march_equinox_2024() {
    let eng = engine();
    let xs = solar_longitude_crossings(
        &eng,
        utc(2024, 3, 1, 0, 0, 0).unwrap(),
        utc(2024, 4, 1, 0, 0, 0).unwrap(),
        0.0,
        &SolarTermConfig::default(),
    )
    .unwrap();
    assert_eq!(xs.len(), 1, "expected one equinox, got {xs:?}");
    let reference = utc(2024, 3, 20, 3, 6, 0).unwrap();
    assert!(
        minutes_from(xs[0], reference) <= 60,
        "equinox at {}",
        xs[0]
    );
}

/// The 0°/360° seam must not produce spurious 0° crossings in autumn.
#[test]
fn no_false_zero_crossing_near_the_seam() {
    let eng = engine();
    let xs = solar_longitude_crossings(
        &eng,
        utc(2024, 9, 1, 0, 0, 0).unwrap(),
        utc(2024, 11, 1, 0, 0, 0).unwrap(),
        0.0,
        &SolarTermConfig::default(),
    )
    .unwrap();
    assert!(xs.is_empty(), "no vernal point in autumn: {xs:?}");
}

/// Winter solstice 2030 falls on 2030-12-22 JST (≈ 2030-12-21 20:09 UTC).
#[test]
fn winter_solstice_2030_on_its_true_date() {
    let eng = engine();
    let sol = find_winter_solstice_utc(&eng, 2030, &SolarTermConfig::default()).unwrap();
    let reference = utc(2030, 12, 21, 20, 9, 0).unwrap();
    assert!(minutes_from(sol, reference) <= 120, "solstice at {sol}");
    assert_eq!(
        jst_date(sol),
        chrono::NaiveDate::from_ymd_opt(2030, 12, 22).unwrap()
    );
}

/// Same-target crossings repeat with the tropical year period.
#[test]
fn solar_term_spacing_is_a_tropical_year() {
    let eng = engine();
    let xs = solar_longitude_crossings(
        &eng,
        utc(2020, 1, 1, 0, 0, 0).unwrap(),
        utc(2026, 1, 1, 0, 0, 0).unwrap(),
        270.0,
        &SolarTermConfig::default(),
    )
    .unwrap();
    assert_eq!(xs.len(), 6);
    for pair in xs.windows(2) {
        assert!(pair[0] < pair[1], "crossings must be strictly increasing");
        let days = (pair[1] - pair[0]).num_seconds() as f64 / 86_400.0;
        assert!(
            (days - 365.24).abs() <= 2.0,
            "tropical-year spacing violated: {days}"
        );
    }
}

/// 2024 has 13 new moons (Dec 1 and Dec 30 both fall inside it); the
/// first is 2024-01-11 11:57 UTC.
#[test]
fn new_moons_2024() {
    let eng = engine();
    let moons = new_moons_between(
        &eng,
        utc(2024, 1, 1, 0, 0, 0).unwrap(),
        utc(2025, 1, 1, 0, 0, 0).unwrap(),
        &NewMoonConfig::default(),
    )
    .unwrap();
    assert_eq!(moons.len(), 13, "got {moons:?}");
    let reference = utc(2024, 1, 11, 11, 57, 0).unwrap();
    assert!(minutes_from(moons[0], reference) <= 60, "first {}", moons[0]);
    let last = utc(2024, 12, 30, 22, 27, 0).unwrap();
    assert!(minutes_from(moons[12], last) <= 60, "last {}", moons[12]);
}

/// Synodic month bounds and monotonicity over several years.
#[test]
fn synodic_period_bounds() {
    let eng = engine();
    let moons = new_moons_between(
        &eng,
        utc(2023, 1, 1, 0, 0, 0).unwrap(),
        utc(2026, 1, 1, 0, 0, 0).unwrap(),
        &NewMoonConfig::default(),
    )
    .unwrap();
    assert!(moons.len() >= 36);
    for pair in moons.windows(2) {
        assert!(pair[0] < pair[1]);
        let days = (pair[1] - pair[0]).num_seconds() as f64 / 86_400.0;
        assert!(
            (29.27..=29.84).contains(&days),
            "synodic bound violated: {days}"
        );
    }
}

/// A month-long interval containing a full moon yields exactly one new
/// moon and does not misreport the opposition as a conjunction.
#[test]
fn full_moon_interval_yields_single_new_moon() {
    let eng = engine();
    let moons = new_moons_between(
        &eng,
        utc(2025, 1, 1, 0, 0, 0).unwrap(),
        utc(2025, 2, 1, 0, 0, 0).unwrap(),
        &NewMoonConfig::default(),
    )
    .unwrap();
    assert_eq!(moons.len(), 1, "got {moons:?}");
    // New moon 2025-01-29 12:36 UTC; full moon was 2025-01-13.
    let reference = utc(2025, 1, 29, 12, 36, 0).unwrap();
    assert!(minutes_from(moons[0], reference) <= 60, "got {}", moons[0]);
    let full = utc(2025, 1, 13, 22, 27, 0).unwrap();
    assert!((moons[0] - full).num_hours().abs() > 24);
}

/// Principal phases of January 2025, in order.
#[test]
fn phase_events_january_2025() {
    let eng = engine();
    let events = moon_phase_events_between(
        &eng,
        utc(2025, 1, 1, 0, 0, 0).unwrap(),
        utc(2025, 2, 1, 0, 0, 0).unwrap(),
        &NewMoonConfig::default(),
    )
    .unwrap();
    for pair in events.windows(2) {
        assert!(pair[0].utc < pair[1].utc);
    }
    let full = events
        .iter()
        .find(|e| e.kind == PhaseKind::FullMoon)
        .expect("January 2025 has a full moon");
    let reference = utc(2025, 1, 13, 22, 27, 0).unwrap();
    assert!(minutes_from(full.utc, reference) <= 90, "full {}", full.utc);
}

/// Moon age a bit over one day after the April 2024 new moon.
#[test]
fn moon_age_after_new_moon() {
    let eng = engine();
    let t = utc(2024, 4, 10, 0, 0, 0).unwrap();
    let age = moon_age_days(&eng, t, 40, &NewMoonConfig::default()).unwrap();
    assert!((1.0..1.5).contains(&age), "age = {age}");
}

/// Twelve principal terms in a year, strictly increasing, 30° apart.
#[test]
fn principal_terms_2024() {
    let eng = engine();
    let terms = principal_terms_between(
        &eng,
        utc(2024, 1, 1, 0, 0, 0).unwrap(),
        utc(2025, 1, 1, 0, 0, 0).unwrap(),
        &SolarTermConfig::default(),
    )
    .unwrap();
    assert_eq!(terms.len(), 12);
    for pair in terms.windows(2) {
        assert!(pair[0].utc < pair[1].utc);
        assert_eq!((pair[0].deg + 30) % 360, pair[1].deg);
    }
}

/// The 2024 anchor: the span beginning 2024-12-01 contains the solstice.
#[test]
fn anchor_2024_span_contains_solstice() {
    let eng = engine();
    let start = utc(2024, 6, 1, 0, 0, 0).unwrap();
    let end = utc(2025, 6, 1, 0, 0, 0).unwrap();
    let (moons, anchors) = anchors_for_years(
        &eng,
        start,
        end,
        &[2024],
        &NewMoonConfig::default(),
        &SolarTermConfig::default(),
        30,
    )
    .unwrap();
    assert!(moons.len() >= 12);
    let anchor = anchors
        .iter()
        .find(|a| {
            utc(2024, 12, 1, 0, 0, 0).unwrap() <= a.solstice_utc
                && a.solstice_utc < utc(2025, 2, 1, 0, 0, 0).unwrap()
        })
        .copied()
        .expect("anchor for 2024 present");
    assert!(anchor.new_moon_utc <= anchor.solstice_utc);
    assert!(anchor.solstice_utc < anchor.next_new_moon_utc);
    // New moon 2024-12-01 06:21 UTC starts the anchor span.
    let reference = utc(2024, 12, 1, 6, 21, 0).unwrap();
    assert!(
        (anchor.new_moon_utc - reference).num_minutes().abs() <= 60,
        "anchor span starts {}",
        anchor.new_moon_utc
    );
    // Ordering guarantee across the whole window build.
    for pair in moons.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}
