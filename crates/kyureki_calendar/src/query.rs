//! Structured day and range queries.
//!
//! These records are what the thin HTTP layer and the CLI reflect 1:1.
//! Instants are rendered as RFC 3339 strings in the caller's display
//! timezone; day attribution stays on the JST basis throughout.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use kyureki_astro::AstronomyEngine;
use kyureki_search::{moon_age_days, moon_phase_events_between, sekki_events_between};
use kyureki_time::{jst_date, jst_to_utc, sample_instant};

use crate::cache::{RangeCache, build_range_cache, gregorian_to_lunar};
use crate::config::KyurekiConfig;
use crate::error::CalendarError;
use crate::rokuyo::rokuyo_from_month_day;
use crate::sekki::{month_display_name, sekki_info_from_deg};

/// Geographic point for sunrise/sunset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

/// Tokyo station, the traditional reference point.
pub const TOKYO: GeoPoint = GeoPoint {
    lat_deg: 35.681_236,
    lon_deg: 139.767_125,
};

#[derive(Debug, Clone, Serialize)]
pub struct LunisolarPart {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub is_leap: bool,
    pub month_label: String,
    pub day_label: String,
    pub month_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SekkiEventRecord {
    pub deg: i32,
    pub n: usize,
    pub name: &'static str,
    pub kind: &'static str,
    pub utc: String,
    pub local: String,
    pub date_jst: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SekkiPart {
    /// The sekki period the date lies in (latest event on or before it).
    pub primary: Option<SekkiEventRecord>,
    /// Events whose JST date is the queried date.
    pub events: Vec<SekkiEventRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseEventRecord {
    pub kind: &'static str,
    pub utc: String,
    pub local: String,
    pub date_jst: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AstronomyPart {
    pub moon_age_days: f64,
    pub phase_event: Option<PhaseEventRecord>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRecord {
    pub date: String,
    pub tz: String,
    pub lunisolar: LunisolarPart,
    pub rokuyo: &'static str,
    pub sekki: SekkiPart,
    pub astronomy: AstronomyPart,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeDay {
    pub date: String,
    pub lunisolar: LunisolarPart,
    pub rokuyo: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangePart {
    pub start: String,
    pub end: String,
    pub tz: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventsPart {
    pub sekki: Vec<SekkiEventRecord>,
    pub moon_phases: Vec<PhaseEventRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeRecord {
    pub range: RangePart,
    pub days: Vec<RangeDay>,
    pub events: EventsPart,
}

fn fmt_in_tz(t: DateTime<Utc>, tz: FixedOffset) -> String {
    t.with_timezone(&tz)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn fmt_utc(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn lunisolar_part(cache: &RangeCache, date: NaiveDate) -> Result<LunisolarPart, CalendarError> {
    let l = gregorian_to_lunar(cache, date)?;
    let prefix = if l.is_leap { "閏" } else { "" };
    Ok(LunisolarPart {
        year: l.year,
        month: l.month,
        day: l.day,
        is_leap: l.is_leap,
        month_label: format!("{prefix}{:02}", l.month),
        day_label: format!("{prefix}{:02}/{:02}", l.month, l.day),
        month_name: month_display_name(l.month, l.is_leap)?,
    })
}

fn sekki_record(deg: i32, utc: DateTime<Utc>, tz: FixedOffset) -> SekkiEventRecord {
    let info = sekki_info_from_deg(f64::from(deg));
    SekkiEventRecord {
        deg: info.deg,
        n: info.n,
        name: info.name,
        kind: info.kind.name(),
        utc: fmt_utc(utc),
        local: fmt_in_tz(utc, tz),
        date_jst: jst_date(utc).to_string(),
    }
}

/// Full structured record for one JST civil day.
///
/// Builds a one-day cache internally; use [`day_of_with_cache`] when
/// iterating.
pub fn day_of(
    engine: &AstronomyEngine,
    date: NaiveDate,
    tz: FixedOffset,
    location: Option<GeoPoint>,
    config: &KyurekiConfig,
) -> Result<DayRecord, CalendarError> {
    let cache = build_range_cache(engine, date, date, config)?;
    day_of_with_cache(engine, &cache, date, tz, location, config)
}

/// [`day_of`] against a prebuilt cache covering `date`.
pub fn day_of_with_cache(
    engine: &AstronomyEngine,
    cache: &RangeCache,
    date: NaiveDate,
    tz: FixedOffset,
    location: Option<GeoPoint>,
    config: &KyurekiConfig,
) -> Result<DayRecord, CalendarError> {
    let lunisolar = lunisolar_part(cache, date)?;
    let rokuyo = rokuyo_from_month_day(lunisolar.month, lunisolar.day)?.name();

    let sample_t = sample_instant(date, config.lunisolar.sample_policy);

    // Sekki: look back far enough to always catch the running period.
    let lookback = Duration::days(config.lunisolar.instant_window_days);
    let sekki_events = sekki_events_between(
        engine,
        sample_t - lookback,
        sample_t + Duration::days(2),
        &config.solarterm,
    )?;
    let primary = sekki_events
        .iter()
        .filter(|e| jst_date(e.utc) <= date)
        .next_back()
        .map(|e| sekki_record(e.deg, e.utc, tz));
    let events: Vec<SekkiEventRecord> = sekki_events
        .iter()
        .filter(|e| jst_date(e.utc) == date)
        .map(|e| sekki_record(e.deg, e.utc, tz))
        .collect();

    // Astronomy: moon age at the sampling instant, plus any principal
    // phase event within the JST day.
    let moon_age = moon_age_days(
        engine,
        sample_t,
        config.lunisolar.instant_window_days,
        &config.newmoon,
    )?;
    let day_start = jst_to_utc(
        date.and_hms_opt(0, 0, 0)
            .ok_or(CalendarError::InvalidRange("invalid date"))?,
    );
    let phase_event = moon_phase_events_between(
        engine,
        day_start,
        day_start + Duration::hours(24),
        &config.newmoon,
    )?
    .first()
    .map(|e| PhaseEventRecord {
        kind: e.kind.name(),
        utc: fmt_utc(e.utc),
        local: fmt_in_tz(e.utc, tz),
        date_jst: jst_date(e.utc).to_string(),
    });

    let (sunrise, sunset) = match location {
        Some(loc) => {
            let (rise, set) = engine.sunrise_sunset_utc(date, tz, loc.lat_deg, loc.lon_deg)?;
            (
                rise.map(|t| fmt_in_tz(t, tz)),
                set.map(|t| fmt_in_tz(t, tz)),
            )
        }
        None => (None, None),
    };

    Ok(DayRecord {
        date: date.to_string(),
        tz: tz.to_string(),
        lunisolar,
        rokuyo,
        sekki: SekkiPart { primary, events },
        astronomy: AstronomyPart {
            moon_age_days: moon_age,
            phase_event,
            sunrise,
            sunset,
        },
    })
}

/// Structured record for an inclusive date range.
pub fn range_of(
    engine: &AstronomyEngine,
    start_date: NaiveDate,
    end_date: NaiveDate,
    tz: FixedOffset,
    config: &KyurekiConfig,
    limit_days: i64,
) -> Result<RangeRecord, CalendarError> {
    if end_date < start_date {
        return Err(CalendarError::InvalidRange("end_date before start_date"));
    }
    let day_count = (end_date - start_date).num_days() + 1;
    if day_count > limit_days {
        return Err(CalendarError::InvalidRange("range exceeds limit_days"));
    }

    let cache = build_range_cache(engine, start_date, end_date, config)?;

    let mut days = Vec::with_capacity(usize::try_from(day_count).unwrap_or_default());
    let mut date = start_date;
    while date <= end_date {
        let lunisolar = lunisolar_part(&cache, date)?;
        let rokuyo = rokuyo_from_month_day(lunisolar.month, lunisolar.day)?.name();
        days.push(RangeDay {
            date: date.to_string(),
            lunisolar,
            rokuyo,
        });
        date = date
            .succ_opt()
            .ok_or(CalendarError::InvalidRange("date overflow"))?;
    }

    // Events over the JST-day window of the range.
    let t0 = jst_to_utc(
        start_date
            .and_hms_opt(0, 0, 0)
            .ok_or(CalendarError::InvalidRange("invalid start date"))?,
    );
    let t1 = jst_to_utc(
        end_date
            .succ_opt()
            .ok_or(CalendarError::InvalidRange("end date out of range"))?
            .and_hms_opt(0, 0, 0)
            .ok_or(CalendarError::InvalidRange("invalid end date"))?,
    );
    let sekki = sekki_events_between(engine, t0, t1, &config.solarterm)?
        .into_iter()
        .map(|e| sekki_record(e.deg, e.utc, tz))
        .collect();
    let moon_phases = moon_phase_events_between(engine, t0, t1, &config.newmoon)?
        .into_iter()
        .map(|e| PhaseEventRecord {
            kind: e.kind.name(),
            utc: fmt_utc(e.utc),
            local: fmt_in_tz(e.utc, tz),
            date_jst: jst_date(e.utc).to_string(),
        })
        .collect();

    Ok(RangeRecord {
        range: RangePart {
            start: start_date.to_string(),
            end: end_date.to_string(),
            tz: tz.to_string(),
        },
        days,
        events: EventsPart {
            sekki,
            moon_phases,
        },
    })
}
