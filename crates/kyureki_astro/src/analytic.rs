//! Built-in semi-analytic ephemeris.
//!
//! Truncated Meeus-style series: solar apparent longitude from the mean
//! elements plus equation of center, nutation, and aberration; lunar
//! apparent longitude from the principal periodic terms with eccentricity
//! corrections and the Venus/Jupiter additives. Good to roughly 0.005°
//! (Sun) and 0.02° (Moon) over the coverage window, which keeps every
//! calendar decision stable at the JST day level.
//!
//! Sunrise/sunset solves the -0.833° altitude hour angle from the same
//! solar theory via the equation of time.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike, Utc};

use crate::angle::{angdiff180, norm360};
use crate::error::AstroError;
use crate::provider::AstroProvider;

const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Standard refraction altitude for rise/set, degrees.
const RISE_SET_ALTITUDE_DEG: f64 = -0.833;

/// Principal lunar longitude terms (Meeus table 47.A, sine coefficients in
/// 1e-6 degrees, arguments as multiples of D, M, M', F). Terms with a
/// nonzero M multiplier are scaled by E^|M| at evaluation time.
#[rustfmt::skip]
const MOON_LON_TERMS: &[(i32, i32, i32, i32, f64)] = &[
    (0, 0, 1, 0, 6_288_774.0),
    (2, 0, -1, 0, 1_274_027.0),
    (2, 0, 0, 0, 658_314.0),
    (0, 0, 2, 0, 213_618.0),
    (0, 1, 0, 0, -185_116.0),
    (0, 0, 0, 2, -114_332.0),
    (2, 0, -2, 0, 58_793.0),
    (2, -1, -1, 0, 57_066.0),
    (2, 0, 1, 0, 53_322.0),
    (2, -1, 0, 0, 45_758.0),
    (0, 1, -1, 0, -40_923.0),
    (1, 0, 0, 0, -34_720.0),
    (0, 1, 1, 0, -30_383.0),
    (2, 0, 0, -2, 15_327.0),
    (0, 0, 1, 2, -12_528.0),
    (0, 0, 1, -2, 10_980.0),
    (4, 0, -1, 0, 10_675.0),
    (0, 0, 3, 0, 10_034.0),
    (4, 0, -2, 0, 8_548.0),
    (2, 1, -1, 0, -7_888.0),
    (2, 1, 0, 0, -6_766.0),
    (1, 0, -1, 0, -5_163.0),
    (1, 1, 0, 0, 4_987.0),
    (2, -1, 1, 0, 4_036.0),
    (2, 0, 2, 0, 3_994.0),
    (4, 0, 0, 0, 3_861.0),
    (2, 0, -3, 0, 3_665.0),
    (0, 1, -2, 0, -2_689.0),
    (2, 0, -1, 2, -2_602.0),
    (2, -1, -2, 0, 2_390.0),
    (1, 0, 1, 0, -2_348.0),
    (2, -2, 0, 0, 2_236.0),
    (0, 1, 2, 0, -2_120.0),
    (0, 2, 0, 0, -2_069.0),
    (2, -2, -1, 0, 2_048.0),
    (2, 0, 1, -2, -1_773.0),
    (2, 0, 0, 2, -1_595.0),
    (4, -1, -1, 0, 1_215.0),
    (0, 0, 2, 2, -1_110.0),
    (3, 0, -1, 0, -892.0),
    (2, 1, 1, 0, -810.0),
    (4, -1, -2, 0, 759.0),
    (0, 2, -1, 0, -713.0),
    (2, 2, -1, 0, -700.0),
];

/// Built-in analytic provider. Stateless; construction cannot fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticProvider;

impl AnalyticProvider {
    pub fn new() -> Self {
        Self
    }

    fn check_range(&self, t: DateTime<Utc>) -> Result<(), AstroError> {
        let (start, end) = self.coverage_utc();
        if t < start || t > end {
            return Err(AstroError::OutOfRange {
                requested: t,
                source: self.source().to_owned(),
                start,
                end,
            });
        }
        Ok(())
    }

    /// Terrestrial-time Julian centuries since J2000 for a UTC instant.
    fn centuries_tt(&self, t: DateTime<Utc>) -> f64 {
        let jd_utc =
            (t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9) / 86_400.0
                + UNIX_EPOCH_JD;
        let jd_tt = jd_utc + delta_t_seconds(t) / 86_400.0;
        (jd_tt - J2000_JD) / 36_525.0
    }

    /// Apparent solar longitude and the Sun-Earth distance in AU.
    fn sun_apparent(&self, tc: f64) -> (f64, f64) {
        let l0 = 280.466_46 + tc * (36_000.769_83 + tc * 0.000_303_2);
        let m = 357.529_11 + tc * (35_999.050_29 - tc * 0.000_153_7);
        let e = 0.016_708_634 - tc * (0.000_042_037 + tc * 0.000_000_126_7);
        let mr = m.to_radians();
        let c = (1.914_602 - tc * (0.004_817 + tc * 0.000_014)) * mr.sin()
            + (0.019_993 - tc * 0.000_101) * (2.0 * mr).sin()
            + 0.000_289 * (3.0 * mr).sin();
        let true_lon = l0 + c;
        let nu = (m + c).to_radians();
        let r = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * nu.cos());
        let (dpsi, _deps) = nutation(tc);
        let aberration = -20.489_8 / 3_600.0 / r;
        (norm360(true_lon + dpsi + aberration), r)
    }

    /// Apparent lunar longitude.
    fn moon_apparent(&self, tc: f64) -> f64 {
        let lp = 218.316_447_7
            + tc * (481_267.881_234_21
                + tc * (-0.001_578_6 + tc * (1.0 / 538_841.0 - tc / 65_194_000.0)));
        let d = 297.850_192_1
            + tc * (445_267.111_403_4
                + tc * (-0.001_881_9 + tc * (1.0 / 545_868.0 - tc / 113_065_000.0)));
        let m = 357.529_109_2 + tc * (35_999.050_290_9 + tc * (-0.000_153_6 + tc / 24_490_000.0));
        let mp = 134.963_396_4
            + tc * (477_198.867_505_5
                + tc * (0.008_741_4 + tc * (1.0 / 69_699.0 - tc / 14_712_000.0)));
        let f = 93.272_095_0
            + tc * (483_202.017_523_3
                + tc * (-0.003_653_9 + tc * (-1.0 / 3_526_000.0 + tc / 863_310_000.0)));
        let a1 = 119.75 + 131.849 * tc;
        let a2 = 53.09 + 479_264.290 * tc;
        let e = 1.0 - tc * (0.002_516 + tc * 0.000_007_4);

        let (dr, mr, mpr, fr) = (d.to_radians(), m.to_radians(), mp.to_radians(), f.to_radians());
        let mut sigma_l = 0.0;
        for &(td, tm, tmp, tf, coeff) in MOON_LON_TERMS {
            let arg = f64::from(td) * dr
                + f64::from(tm) * mr
                + f64::from(tmp) * mpr
                + f64::from(tf) * fr;
            let scale = match tm.abs() {
                0 => 1.0,
                1 => e,
                _ => e * e,
            };
            sigma_l += coeff * scale * arg.sin();
        }
        sigma_l += 3_958.0 * a1.to_radians().sin()
            + 1_962.0 * (lp - f).to_radians().sin()
            + 318.0 * a2.to_radians().sin();

        let (dpsi, _deps) = nutation(tc);
        norm360(lp + sigma_l * 1e-6 + dpsi)
    }

    /// Solar declination (degrees) and equation of time (minutes).
    fn sun_geometry(&self, t: DateTime<Utc>) -> (f64, f64) {
        let tc = self.centuries_tt(t);
        let (lambda, _r) = self.sun_apparent(tc);
        let l0 = norm360(280.466_46 + tc * (36_000.769_83 + tc * 0.000_303_2));
        let (dpsi, deps) = nutation(tc);
        let eps = mean_obliquity(tc) + deps;
        let epsr = eps.to_radians();
        let lr = lambda.to_radians();
        let decl = (epsr.sin() * lr.sin()).asin().to_degrees();
        let alpha = (epsr.cos() * lr.sin()).atan2(lr.cos()).to_degrees();
        let eot_deg = angdiff180(l0 - 0.005_718_3 - alpha + dpsi * epsr.cos());
        (decl, eot_deg * 4.0)
    }

    /// One rise/set event by fixed-point iteration on local apparent solar
    /// time. Returns `None` outside the local day window or for polar
    /// day/night.
    fn solar_event(
        &self,
        day_start_utc: DateTime<Utc>,
        lat_deg: f64,
        lon_deg: f64,
        rising: bool,
    ) -> Option<DateTime<Utc>> {
        let day_end_utc = day_start_utc + Duration::hours(24);
        let mut t = day_start_utc + Duration::hours(12);
        for _ in 0..4 {
            let (decl, eot_min) = self.sun_geometry(t);
            let latr = lat_deg.to_radians();
            let declr = decl.to_radians();
            let cos_h0 = (RISE_SET_ALTITUDE_DEG.to_radians().sin() - latr.sin() * declr.sin())
                / (latr.cos() * declr.cos());
            if !(-1.0..=1.0).contains(&cos_h0) {
                return None;
            }
            let h0_deg = cos_h0.acos().to_degrees();
            let target_last_hours = if rising {
                12.0 - h0_deg / 15.0
            } else {
                12.0 + h0_deg / 15.0
            };
            let utc_hours = f64::from(t.time().num_seconds_from_midnight()) / 3_600.0;
            let last_hours = utc_hours + lon_deg / 15.0 + eot_min / 60.0;
            let mut dt_hours = (target_last_hours - last_hours).rem_euclid(24.0);
            if dt_hours > 12.0 {
                dt_hours -= 24.0;
            }
            if dt_hours.abs() < 1.0 / 3_600.0 {
                break;
            }
            t += Duration::seconds((dt_hours * 3_600.0).round() as i64);
        }
        (day_start_utc <= t && t < day_end_utc).then_some(t)
    }
}

impl AstroProvider for AnalyticProvider {
    fn source(&self) -> &str {
        "analytic"
    }

    fn coverage_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            kyureki_time::utc(1600, 1, 1, 0, 0, 0).expect("coverage start is valid"),
            kyureki_time::utc(2200, 1, 1, 0, 0, 0).expect("coverage end is valid"),
        )
    }

    fn sun_longitude_deg(&self, t: DateTime<Utc>) -> Result<f64, AstroError> {
        self.check_range(t)?;
        Ok(self.sun_apparent(self.centuries_tt(t)).0)
    }

    fn moon_longitude_deg(&self, t: DateTime<Utc>) -> Result<f64, AstroError> {
        self.check_range(t)?;
        Ok(self.moon_apparent(self.centuries_tt(t)))
    }

    fn sunrise_sunset_utc(
        &self,
        day_local: NaiveDate,
        tz_local: FixedOffset,
        lat_deg: f64,
        lon_deg: f64,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), AstroError> {
        if !(-90.0..=90.0).contains(&lat_deg) || !(-180.0..=360.0).contains(&lon_deg) {
            return Err(AstroError::Provider(format!(
                "invalid coordinates: lat={lat_deg} lon={lon_deg}"
            )));
        }
        let wall = day_local
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AstroError::Provider("invalid local day".to_owned()))?;
        let offset = i64::from(tz_local.local_minus_utc());
        let day_start_utc =
            DateTime::<Utc>::from_timestamp(wall.and_utc().timestamp() - offset, 0)
                .ok_or_else(|| AstroError::Provider("local day out of range".to_owned()))?;
        self.check_range(day_start_utc)?;
        self.check_range(day_start_utc + Duration::hours(24))?;

        let sunrise = self.solar_event(day_start_utc, lat_deg, lon_deg, true);
        let sunset = self.solar_event(day_start_utc, lat_deg, lon_deg, false);
        Ok((sunrise, sunset))
    }
}

/// Mean obliquity of the ecliptic, degrees.
fn mean_obliquity(tc: f64) -> f64 {
    23.439_291_11 + tc * (-0.013_004_166_7 + tc * (-1.638_9e-7 + tc * 5.036_1e-7))
}

/// Nutation in longitude and obliquity, degrees (four-term approximation).
fn nutation(tc: f64) -> (f64, f64) {
    let omega = (125.044_52 - 1_934.136_261 * tc).to_radians();
    let lsun = (280.466_5 + 36_000.769_8 * tc).to_radians();
    let lmoon = (218.316_5 + 481_267.881_3 * tc).to_radians();
    let dpsi_arcsec = -17.20 * omega.sin() - 1.32 * (2.0 * lsun).sin()
        - 0.23 * (2.0 * lmoon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps_arcsec = 9.20 * omega.cos()
        + 0.57 * (2.0 * lsun).cos()
        + 0.10 * (2.0 * lmoon).cos()
        - 0.09 * (2.0 * omega).cos();
    (dpsi_arcsec / 3_600.0, deps_arcsec / 3_600.0)
}

/// ΔT = TT − UTC in seconds (polynomial fit, decade-level pieces).
fn delta_t_seconds(t: DateTime<Utc>) -> f64 {
    use chrono::Datelike;
    let y = f64::from(t.year()) + (f64::from(t.month()) - 0.5) / 12.0;
    if y < 1700.0 {
        let u = y - 1600.0;
        120.0 - 0.980_8 * u - 0.015_32 * u * u + u * u * u / 7_129.0
    } else if y < 1800.0 {
        let u = y - 1700.0;
        8.83 + 0.160_3 * u - 0.005_928_5 * u * u + 0.000_133_36 * u * u * u
            - u.powi(4) / 1_174_000.0
    } else if y < 1860.0 {
        let u = y - 1800.0;
        13.72 - 0.332_447 * u + 0.006_861_2 * u * u + 0.004_111_6 * u.powi(3)
            - 0.000_374_36 * u.powi(4)
            + 0.000_012_127_2 * u.powi(5)
            - 0.000_000_169_9 * u.powi(6)
            + 0.000_000_000_875 * u.powi(7)
    } else if y < 1900.0 {
        let u = y - 1860.0;
        7.62 + 0.573_7 * u - 0.251_754 * u * u + 0.016_806_68 * u.powi(3)
            - 0.000_447_362_4 * u.powi(4)
            + u.powi(5) / 233_174.0
    } else if y < 1920.0 {
        let u = y - 1900.0;
        -2.79 + 1.494_119 * u - 0.059_893_9 * u * u + 0.006_196_6 * u.powi(3)
            - 0.000_197 * u.powi(4)
    } else if y < 1941.0 {
        let u = y - 1920.0;
        21.20 + 0.844_93 * u - 0.076_100 * u * u + 0.002_093_6 * u.powi(3)
    } else if y < 1961.0 {
        let u = y - 1950.0;
        29.07 + 0.407 * u - u * u / 233.0 + u.powi(3) / 2_547.0
    } else if y < 1986.0 {
        let u = y - 1975.0;
        45.45 + 1.067 * u - u * u / 260.0 - u.powi(3) / 718.0
    } else if y < 2005.0 {
        let u = y - 2000.0;
        63.86 + 0.334_5 * u - 0.060_374 * u * u + 0.001_727_5 * u.powi(3)
            + 0.000_651_814 * u.powi(4)
            + 0.000_023_735_99 * u.powi(5)
    } else if y < 2050.0 {
        let u = y - 2000.0;
        62.92 + 0.322_17 * u + 0.005_589 * u * u
    } else if y < 2150.0 {
        let u = (y - 1_820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.562_8 * (2_150.0 - y)
    } else {
        let u = (y - 1_820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}
