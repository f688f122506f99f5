//! Solar-term crossing enumerator.
//!
//! Finds every instant in a range at which the apparent solar longitude
//! equals a 15°-multiple target. The signed-difference transform
//! `angdiff180(λ☉ − target)` turns the crossing into a genuine sign change
//! and keeps the 0°/360° seam from producing false brackets.

use chrono::{DateTime, Duration, Utc};

use kyureki_astro::{AstronomyEngine, angdiff180, norm360};

use crate::error::SearchError;
use crate::rootfind::{bracket_by_scan, refine_root};
use crate::solarterm_types::{PRINCIPAL_TERM_DEGS, SEKKI_DEGS, SolarTermConfig, TermEvent};

/// Acceptance threshold for a verified crossing, degrees.
const VERIFY_EPS_DEG: f64 = 0.01;

/// Zero tolerance used when classifying coarse-grid samples as exact hits.
const GRID_ZERO_EPS: f64 = 1e-6;

/// Root-refinement iteration cap.
const MAX_REFINE_ITER: u32 = 100;

fn require_range(
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
) -> Result<(), SearchError> {
    if start_utc >= end_utc {
        return Err(SearchError::InvalidRange("end_utc must be after start_utc"));
    }
    Ok(())
}

/// Inclusive grid: start, start+step, …, end.
fn build_grid(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Vec<DateTime<Utc>> {
    let mut ts = Vec::new();
    let mut t = start;
    while t < end {
        ts.push(t);
        t += step;
    }
    ts.push(end);
    ts
}

/// Build brackets from sampled values, with degenerate pairs for samples
/// within `zero_eps` of zero.
fn brackets_from_values(
    ts: &[DateTime<Utc>],
    vs: &[f64],
    zero_eps: f64,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut out = Vec::new();
    for i in 0..ts.len().saturating_sub(1) {
        let (a, b) = (ts[i], ts[i + 1]);
        let (va, vb) = (vs[i], vs[i + 1]);
        if !va.is_finite() || !vb.is_finite() {
            continue;
        }
        if va.abs() <= zero_eps {
            out.push((a, a));
            continue;
        }
        if vb.abs() <= zero_eps {
            out.push((b, b));
            continue;
        }
        if va * vb < 0.0 {
            out.push((a, b));
        }
    }
    out
}

/// Batched coarse scan over the full interval.
fn fast_scan_brackets(
    engine: &AstronomyEngine,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    target: f64,
    step: Duration,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, SearchError> {
    let ts = build_grid(start, end, step);
    let lons = engine.sun_lon_many(&ts)?;
    let vs: Vec<f64> = lons.iter().map(|&lon| angdiff180(lon - target)).collect();
    Ok(brackets_from_values(&ts, &vs, GRID_ZERO_EPS))
}

/// Batched rescan of a clamped window around `center`.
fn fast_local_rebracket(
    engine: &AstronomyEngine,
    center: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    target: f64,
    window: Duration,
    step: Duration,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, SearchError> {
    let a = (center - window).max(start);
    let b = (center + window).min(end);
    if a >= b {
        return Ok(Vec::new());
    }
    fast_scan_brackets(engine, a, b, target, step)
}

/// Every instant in `[start_utc, end_utc)` where the apparent solar
/// longitude equals `target_deg` (normalized to [0, 360)).
pub fn solar_longitude_crossings(
    engine: &AstronomyEngine,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    target_deg: f64,
    config: &SolarTermConfig,
) -> Result<Vec<DateTime<Utc>>, SearchError> {
    config.validate().map_err(SearchError::InvalidConfig)?;
    require_range(start_utc, end_utc)?;
    let target = norm360(target_deg);

    let g = |t: DateTime<Utc>| -> Result<f64, SearchError> {
        Ok(angdiff180(engine.sun_lon(t)? - target))
    };

    let scan_step = Duration::hours(config.scan_step_hours);
    let rb_window = Duration::hours(config.rebracket_window_hours);
    let rb_step = Duration::minutes(config.rebracket_step_minutes);

    let brackets = fast_scan_brackets(engine, start_utc, end_utc, target, scan_step)?;

    let mut roots: Vec<DateTime<Utc>> = Vec::new();

    for (mut a, mut b) in brackets {
        // Degenerate grid hit: widen to a proper sign-change bracket.
        if a == b {
            let local =
                fast_local_rebracket(engine, a, start_utc, end_utc, target, rb_window, rb_step)?;
            let mut picked = None;
            for (x, y) in local {
                if x != y && g(x)? * g(y)? <= 0.0 {
                    picked = Some((x, y));
                    break;
                }
            }
            if picked.is_none() {
                // Rare slow path: direct scalar bracketing.
                let aa = (a - rb_window).max(start_utc);
                let bb = (a + rb_window).min(end_utc);
                for (x, y) in bracket_by_scan(g, aa, bb, rb_step)? {
                    if x != y && g(x)? * g(y)? <= 0.0 {
                        picked = Some((x, y));
                        break;
                    }
                }
            }
            let Some((x, y)) = picked else {
                engine.trace("solarterm: degenerate bracket abandoned");
                continue;
            };
            (a, b) = (x, y);
        }

        // Endpoints exactly on zero break the sign test; nudge by one second.
        let mut ga = g(a)?;
        let mut gb = g(b)?;
        if ga == 0.0 && a != b {
            a -= Duration::seconds(1);
            ga = g(a)?;
        }
        if gb == 0.0 && a != b {
            b += Duration::seconds(1);
            gb = g(b)?;
        }

        if a != b && ga * gb > 0.0 {
            // The fast bracket does not bracket under the apparent
            // longitude; recover with a scalar scan inside it.
            let mut picked = None;
            for (x, y) in bracket_by_scan(g, a, b, rb_step)? {
                if x != y && g(x)? * g(y)? <= 0.0 {
                    picked = Some((x, y));
                    break;
                }
            }
            let Some((x, y)) = picked else {
                engine.trace("solarterm: non-bracketing pair abandoned");
                continue;
            };
            (a, b) = (x, y);
        }

        let root = refine_root(g, a, b, config.tol_seconds, MAX_REFINE_ITER)?;

        // Verify the root is a true target crossing, not a wrap artifact.
        let err_deg = angdiff180(engine.sun_lon(root.t)? - target).abs();
        if err_deg <= VERIFY_EPS_DEG {
            roots.push(root.t);
            continue;
        }

        engine.trace("solarterm: verification failed, rescanning ±24 h");
        let aa = (root.t - Duration::hours(24)).max(start_utc);
        let bb = (root.t + Duration::hours(24)).min(end_utc);
        for (x, y) in bracket_by_scan(g, aa, bb, rb_step)? {
            if x != y && g(x)? * g(y)? <= 0.0 {
                let retry = refine_root(g, x, y, config.tol_seconds, MAX_REFINE_ITER)?;
                let retry_err = angdiff180(engine.sun_lon(retry.t)? - target).abs();
                if retry_err <= VERIFY_EPS_DEG {
                    roots.push(retry.t);
                }
                break;
            }
        }
    }

    roots.sort();
    let mut merged: Vec<DateTime<Utc>> = Vec::new();
    for t in roots {
        match merged.last() {
            Some(&last) if secs_between(last, t) <= config.merge_seconds => {}
            _ => merged.push(t),
        }
    }
    merged.retain(|&t| start_utc <= t && t < end_utc);
    Ok(merged)
}

fn secs_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (b - a)
        .num_microseconds()
        .map_or_else(|| (b - a).num_seconds() as f64, |us| us as f64 * 1e-6)
}

/// All crossings for a set of targets, sorted by time.
fn crossings_for_degrees(
    engine: &AstronomyEngine,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    degrees: &[i32],
    config: &SolarTermConfig,
) -> Result<Vec<TermEvent>, SearchError> {
    require_range(start_utc, end_utc)?;
    let mut out = Vec::new();
    for &deg in degrees {
        let ts = solar_longitude_crossings(engine, start_utc, end_utc, f64::from(deg), config)?;
        out.extend(ts.into_iter().map(|utc| TermEvent { deg, utc }));
    }
    out.sort_by_key(|e| e.utc);
    Ok(out)
}

/// The 12 principal terms (0°, 30°, …, 330°) in `[start_utc, end_utc)`.
pub fn principal_terms_between(
    engine: &AstronomyEngine,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    config: &SolarTermConfig,
) -> Result<Vec<TermEvent>, SearchError> {
    crossings_for_degrees(engine, start_utc, end_utc, &PRINCIPAL_TERM_DEGS, config)
}

/// All 24 sekki crossings (0°, 15°, …, 345°) in `[start_utc, end_utc)`.
pub fn sekki_events_between(
    engine: &AstronomyEngine,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    config: &SolarTermConfig,
) -> Result<Vec<TermEvent>, SearchError> {
    crossings_for_degrees(engine, start_utc, end_utc, &SEKKI_DEGS, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyureki_time::utc;

    #[test]
    fn grid_is_inclusive() {
        let a = utc(2024, 1, 1, 0, 0, 0).unwrap();
        let b = utc(2024, 1, 1, 13, 0, 0).unwrap();
        let grid = build_grid(a, b, Duration::hours(6));
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0], a);
        assert_eq!(*grid.last().unwrap(), b);
    }

    #[test]
    fn brackets_classify_zero_and_sign_change() {
        let a = utc(2024, 1, 1, 0, 0, 0).unwrap();
        let ts: Vec<_> = (0..4).map(|h| a + Duration::hours(h)).collect();
        let vs = [1.0, 0.0, -1.0, -2.0];
        let br = brackets_from_values(&ts, &vs, 1e-9);
        // grid zero yields two degenerate pairs (as the right and left
        // endpoint of its neighboring segments)
        assert!(br.iter().all(|&(x, y)| x == y || x < y));
        assert!(br.iter().any(|&(x, y)| x == y && x == ts[1]));
    }

    #[test]
    fn brackets_skip_non_finite() {
        let a = utc(2024, 1, 1, 0, 0, 0).unwrap();
        let ts: Vec<_> = (0..3).map(|h| a + Duration::hours(h)).collect();
        let vs = [1.0, f64::NAN, -1.0];
        let br = brackets_from_values(&ts, &vs, 1e-9);
        assert!(br.is_empty());
    }
}
