//! New-moon (sun–moon conjunction) enumerator.
//!
//! The phase angle φ = (λ☾ − λ☉) mod 360 wraps through 0 at conjunction.
//! A naïve sign-change detector on φ also fires near full moon, so the
//! series is unwrapped first: conjunctions are exactly the 360·k boundary
//! crossings of the unwrapped curve, and every refined candidate must pass
//! a strict phase-distance acceptance before it is kept.

use chrono::{DateTime, Duration, Utc};

use kyureki_astro::{AstronomyEngine, angdiff180, norm360, unwrap_deg};

use crate::error::SearchError;
use crate::newmoon_types::NewMoonConfig;
use crate::rootfind::{bracket_by_scan, refine_root};

/// Strict acceptance threshold: 0.01° ≈ 36 arcsec from conjunction.
const ACCEPT_EPS_DEG: f64 = 1e-2;

/// Refinement iteration cap.
const MAX_REFINE_ITER: u32 = 80;

/// All instants in `[start_utc, end_utc)` where φ crosses `target_deg`
/// (mod 360). `target_deg = 0` is the new moon; 90/180/270 give the other
/// principal phases.
pub(crate) fn phase_crossings(
    engine: &AstronomyEngine,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    target_deg: f64,
    config: &NewMoonConfig,
) -> Result<Vec<DateTime<Utc>>, SearchError> {
    config.validate().map_err(SearchError::InvalidConfig)?;
    if start_utc >= end_utc {
        return Err(SearchError::InvalidRange("end_utc must be after start_utc"));
    }
    let target = norm360(target_deg);

    // Signed distance of the phase from the target, continuous near 0.
    let f = |t: DateTime<Utc>| -> Result<f64, SearchError> {
        Ok(angdiff180(engine.phase360(t)? - target))
    };

    // Coarse sampling of ψ = (φ − target) mod 360 over an inclusive grid.
    let step = Duration::hours(config.scan_step_hours);
    let mut ts = Vec::new();
    let mut t = start_utc;
    while t < end_utc {
        ts.push(t);
        t += step;
    }
    ts.push(end_utc);

    let moons = engine.moon_lon_many(&ts)?;
    let suns = engine.sun_lon_many(&ts)?;
    let psi: Vec<f64> = moons
        .iter()
        .zip(&suns)
        .map(|(&m, &s)| norm360(m - s - target))
        .collect();
    let unwrapped = unwrap_deg(&psi);
    if unwrapped.len() < 2 {
        return Ok(Vec::new());
    }

    let mut out: Vec<DateTime<Utc>> = Vec::new();
    for i in 0..unwrapped.len() - 1 {
        let k0 = (unwrapped[i] / 360.0).floor() as i64;
        let k1 = (unwrapped[i + 1] / 360.0).floor() as i64;
        if k1 <= k0 {
            continue;
        }

        // Crossed a 360·k boundary: refine on the signed-distance form,
        // which is continuous here (the root sits near ψ = 0, far from the
        // ±180 discontinuity).
        let root = refine_root(f, ts[i], ts[i + 1], config.tol_seconds, MAX_REFINE_ITER)?;
        let mut candidate = Some(root.t);

        let phase = norm360(engine.phase360(root.t)? - target);
        let dist = phase.min(360.0 - phase);
        if dist > ACCEPT_EPS_DEG {
            engine.trace("newmoon: candidate failed strict acceptance, rescanning locally");
            candidate = None;
            let window = Duration::hours(config.rebracket_window_hours);
            let rb_step = Duration::minutes(config.rebracket_step_minutes);
            let aa = root.t - window;
            let bb = root.t + window;
            for (x, y) in bracket_by_scan(f, aa, bb, rb_step)? {
                if x == y {
                    continue;
                }
                let retry = refine_root(f, x, y, config.tol_seconds, MAX_REFINE_ITER)?;
                let p = norm360(engine.phase360(retry.t)? - target);
                if p.min(360.0 - p) <= ACCEPT_EPS_DEG {
                    candidate = Some(retry.t);
                    break;
                }
            }
        }

        if let Some(nm) = candidate {
            if start_utc <= nm && nm < end_utc {
                out.push(nm);
            }
        }
    }

    out.sort();
    out.dedup_by(|b, a| ((*b - *a).num_seconds().unsigned_abs() as f64) <= config.merge_seconds);
    Ok(out)
}

/// Robust new-moon instants in `[start_utc, end_utc)`.
pub fn new_moons_between(
    engine: &AstronomyEngine,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    config: &NewMoonConfig,
) -> Result<Vec<DateTime<Utc>>, SearchError> {
    phase_crossings(engine, start_utc, end_utc, 0.0, config)
}
