//! Datetime-valued root finding.
//!
//! `bracket_by_scan` walks an interval on a fixed grid and reports every
//! sign-change pair, with degenerate `(t, t)` pairs for exact zeros.
//! `refine_root` then narrows a bracket with a hybrid false-position /
//! bisection scheme that keeps a valid sign-change bracket at every step.

use chrono::{DateTime, Duration, Utc};

use crate::error::SearchError;

/// Refined root plus the iteration count that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult {
    pub t: DateTime<Utc>,
    pub iterations: u32,
}

fn secs(d: Duration) -> f64 {
    d.num_microseconds()
        .map_or_else(|| d.num_seconds() as f64, |us| us as f64 * 1e-6)
}

fn offset(base: DateTime<Utc>, sec: f64) -> DateTime<Utc> {
    base + Duration::microseconds((sec * 1e6).round() as i64)
}

/// Scan `[start, end]` by `step` and return candidate brackets.
///
/// - sign change: `f(a)·f(b) < 0` → `(a, b)`
/// - exact zero at a grid point → degenerate `(t, t)`
/// - non-finite values skip their segment without terminating the scan
///
/// The end instant is evaluated inclusively exactly once.
pub fn bracket_by_scan<F>(
    mut f: F,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, SearchError>
where
    F: FnMut(DateTime<Utc>) -> Result<f64, SearchError>,
{
    if step <= Duration::zero() {
        return Err(SearchError::InvalidConfig("scan step must be positive"));
    }
    if start >= end {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut t_prev = start;
    let mut f_prev = f(t_prev)?;

    let mut t = start;
    loop {
        t += step;
        if t >= end {
            t = end;
        }

        let f_cur = f(t)?;
        if !f_cur.is_finite() || !f_prev.is_finite() {
            // Skip the segment but keep scanning.
            t_prev = t;
            f_prev = f_cur;
            if t == end {
                break;
            }
            continue;
        }

        if f_prev == 0.0 {
            out.push((t_prev, t_prev));
        } else if f_cur == 0.0 {
            out.push((t, t));
        } else if f_prev * f_cur < 0.0 {
            out.push((t_prev, t));
        }

        t_prev = t;
        f_prev = f_cur;
        if t == end {
            break;
        }
    }

    Ok(out)
}

/// Refine a root inside `[a, b]` where `f(a)·f(b) ≤ 0`.
///
/// Each step tries a false-position candidate and accepts it only when it
/// lands strictly inside the bracket and evaluates finite; otherwise the
/// midpoint is used. The bracket keeps its sign change throughout, so
/// convergence to `tol_seconds` is guaranteed within `max_iter` steps for
/// any finite function; on exhaustion the midpoint is returned.
pub fn refine_root<F>(
    mut f: F,
    a: DateTime<Utc>,
    b: DateTime<Utc>,
    tol_seconds: f64,
    max_iter: u32,
) -> Result<RootResult, SearchError>
where
    F: FnMut(DateTime<Utc>) -> Result<f64, SearchError>,
{
    if !tol_seconds.is_finite() || tol_seconds <= 0.0 {
        return Err(SearchError::InvalidConfig("tol_seconds must be positive"));
    }
    let (a, b) = if a > b { (b, a) } else { (a, b) };

    let mut fa = f(a)?;
    let fb = f(b)?;
    if !fa.is_finite() || !fb.is_finite() {
        return Err(SearchError::NoConvergence(
            "non-finite function value at bracket endpoints",
        ));
    }
    if fa == 0.0 {
        return Ok(RootResult { t: a, iterations: 0 });
    }
    if fb == 0.0 {
        return Ok(RootResult { t: b, iterations: 0 });
    }
    if fa * fb > 0.0 {
        return Err(SearchError::NoConvergence("root is not bracketed"));
    }

    // Work in seconds from `a` for numeric stability.
    let mut xa = 0.0;
    let mut xb = secs(b - a);
    let mut fb = fb;

    for it in 1..=max_iter {
        if xb - xa <= tol_seconds {
            return Ok(RootResult {
                t: offset(a, 0.5 * (xa + xb)),
                iterations: it,
            });
        }

        // False-position candidate, kept only strictly inside the bracket.
        let mut xc = 0.5 * (xa + xb);
        if fb != fa {
            let xs = xb - fb * (xb - xa) / (fb - fa);
            if xs.is_finite() && xa < xs && xs < xb {
                xc = xs;
            }
        }

        let tc = offset(a, xc);
        let mut fc = f(tc)?;
        if !fc.is_finite() {
            let xm = 0.5 * (xa + xb);
            let tm = offset(a, xm);
            fc = f(tm)?;
            if !fc.is_finite() {
                return Err(SearchError::NoConvergence(
                    "non-finite function value during refinement",
                ));
            }
            xc = xm;
        }

        if fc == 0.0 {
            return Ok(RootResult {
                t: offset(a, xc),
                iterations: it,
            });
        }

        if fa * fc < 0.0 {
            xb = xc;
            fb = fc;
        } else {
            xa = xc;
            fa = fc;
        }
    }

    Ok(RootResult {
        t: offset(a, 0.5 * (xa + xb)),
        iterations: max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyureki_time::utc;

    fn t0() -> DateTime<Utc> {
        utc(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn linear_through(root: DateTime<Utc>) -> impl FnMut(DateTime<Utc>) -> Result<f64, SearchError>
    {
        move |t| Ok(secs(t - root))
    }

    #[test]
    fn scan_finds_single_sign_change() {
        let root = t0() + Duration::minutes(90);
        let brackets =
            bracket_by_scan(linear_through(root), t0(), t0() + Duration::hours(6), Duration::hours(1))
                .unwrap();
        assert_eq!(brackets.len(), 1);
        let (a, b) = brackets[0];
        assert!(a <= root && root <= b);
    }

    #[test]
    fn scan_reports_exact_hits_as_degenerate() {
        let root = t0() + Duration::hours(2);
        let brackets =
            bracket_by_scan(linear_through(root), t0(), t0() + Duration::hours(6), Duration::hours(1))
                .unwrap();
        assert!(brackets.iter().any(|&(a, b)| a == b && a == root));
    }

    #[test]
    fn scan_skips_non_finite_segments() {
        let root = t0() + Duration::minutes(210);
        let mut f = move |t: DateTime<Utc>| {
            if t == t0() + Duration::hours(1) {
                Ok(f64::NAN)
            } else {
                Ok(secs(t - root))
            }
        };
        let brackets =
            bracket_by_scan(&mut f, t0(), t0() + Duration::hours(6), Duration::hours(1)).unwrap();
        assert_eq!(brackets.len(), 1);
    }

    #[test]
    fn scan_empty_range_is_empty() {
        let brackets =
            bracket_by_scan(linear_through(t0()), t0(), t0(), Duration::hours(1)).unwrap();
        assert!(brackets.is_empty());
    }

    #[test]
    fn scan_rejects_bad_step() {
        let err = bracket_by_scan(
            linear_through(t0()),
            t0(),
            t0() + Duration::hours(1),
            Duration::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfig(_)));
    }

    #[test]
    fn refine_linear_to_tolerance() {
        let root = t0() + Duration::seconds(4_321);
        let r = refine_root(
            linear_through(root),
            t0(),
            t0() + Duration::hours(6),
            0.5,
            100,
        )
        .unwrap();
        assert!(secs(r.t - root).abs() <= 1.0, "root error: {:?}", r.t - root);
    }

    #[test]
    fn refine_cosine_like() {
        // Slow oscillation with a root at +3 h.
        let root = t0() + Duration::hours(3);
        let f = move |t: DateTime<Utc>| Ok((secs(t - root) / 86_400.0).sin());
        let r = refine_root(f, t0(), t0() + Duration::hours(12), 0.5, 100).unwrap();
        assert!(secs(r.t - root).abs() <= 1.0);
    }

    #[test]
    fn refine_exact_endpoint() {
        let root = t0();
        let r = refine_root(
            linear_through(root),
            t0(),
            t0() + Duration::hours(1),
            0.5,
            100,
        )
        .unwrap();
        assert_eq!(r.t, root);
        assert_eq!(r.iterations, 0);
    }

    #[test]
    fn refine_rejects_unbracketed() {
        let f = |_t: DateTime<Utc>| Ok(1.0);
        let err = refine_root(f, t0(), t0() + Duration::hours(1), 0.5, 100).unwrap_err();
        assert!(matches!(err, SearchError::NoConvergence(_)));
    }

    #[test]
    fn refine_rejects_bad_tolerance() {
        let err = refine_root(
            linear_through(t0()),
            t0(),
            t0() + Duration::hours(1),
            0.0,
            100,
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfig(_)));
    }

    #[test]
    fn refine_swapped_bracket() {
        let root = t0() + Duration::minutes(30);
        let r = refine_root(
            linear_through(root),
            t0() + Duration::hours(1),
            t0(),
            0.5,
            100,
        )
        .unwrap();
        assert!(secs(r.t - root).abs() <= 1.0);
    }
}
