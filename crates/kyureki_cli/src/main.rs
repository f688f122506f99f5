use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use clap::{Parser, Subcommand};

use kyureki_astro::{AstronomyEngine, EphemerisSpec, ProviderRegistry};
use kyureki_calendar::{
    GeoPoint, KyurekiConfig, MonthNamingMode, TOKYO, assign_month_names, build_lunar_spans,
    day_of, decide_leap_month, range_of, rokuyo_from_month_day, sekki_info_from_deg,
    verify_leap_consistency,
};
use kyureki_search::{
    SaisjitsuWindow, anchors_for_years, new_moons_between, principal_terms_between,
    sekki_events_between,
};
use kyureki_time::{jst_date, jst_to_utc};

#[derive(Parser)]
#[command(name = "kyureki", about = "Japanese lunisolar calendar CLI")]
struct Cli {
    /// Ephemeris name (default: analytic, or KYUREKI_EPHEMERIS)
    #[arg(long, global = true)]
    ephemeris: Option<String>,
    /// Explicit ephemeris file path
    #[arg(long, global = true)]
    ephemeris_path: Option<PathBuf>,
    /// Display timezone offset, e.g. +09:00
    #[arg(long, global = true, default_value = "+09:00")]
    tz: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full day record (lunisolar date, rokuyo, sekki, astronomy)
    Day {
        /// Date, YYYY-MM-DD (JST civil day)
        date: NaiveDate,
        /// Latitude for sunrise/sunset (default: Tokyo)
        #[arg(long)]
        lat: Option<f64>,
        /// Longitude for sunrise/sunset (default: Tokyo)
        #[arg(long)]
        lon: Option<f64>,
    },
    /// Day-by-day range record with sekki and phase events
    Range {
        start: NaiveDate,
        end: NaiveDate,
        /// Maximum range length in days
        #[arg(long, default_value = "2000")]
        limit_days: i64,
    },
    /// 24 sekki events in a date range
    Sekki { start: NaiveDate, end: NaiveDate },
    /// New-moon instants in a date range
    NewMoons { start: NaiveDate, end: NaiveDate },
    /// Labeled lunar months of one saisjitsu window (diagnostic)
    Months {
        /// Gregorian year of the window's starting winter solstice
        year: i32,
        /// Naming mode: ws-first (default) or strict
        #[arg(long, default_value = "ws-first")]
        mode: String,
    },
    /// Rokuyo label from a lunisolar month and day
    Rokuyo { month: u8, day: u8 },
}

fn resolve_engine(cli: &Cli) -> Result<Arc<AstronomyEngine>, String> {
    let registry = ProviderRegistry::new();
    let spec = EphemerisSpec {
        name: cli.ephemeris.clone(),
        path: cli.ephemeris_path.clone(),
    };
    registry.resolve(&spec).map_err(|e| e.to_string())
}

fn parse_tz(s: &str) -> Result<FixedOffset, String> {
    s.parse::<FixedOffset>()
        .map_err(|_| format!("invalid timezone offset: {s} (expected e.g. +09:00)"))
}

fn run(cli: &Cli) -> Result<(), String> {
    let tz = parse_tz(&cli.tz)?;
    let config = KyurekiConfig::default();

    match &cli.command {
        Commands::Day { date, lat, lon } => {
            let engine = resolve_engine(cli)?;
            let location = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(GeoPoint {
                    lat_deg: *lat,
                    lon_deg: *lon,
                }),
                (None, None) => Some(TOKYO),
                _ => return Err("pass both --lat and --lon, or neither".to_owned()),
            };
            let record =
                day_of(&engine, *date, tz, location, &config).map_err(|e| e.to_string())?;
            print_json(&record)
        }

        Commands::Range {
            start,
            end,
            limit_days,
        } => {
            let engine = resolve_engine(cli)?;
            let record = range_of(&engine, *start, *end, tz, &config, *limit_days)
                .map_err(|e| e.to_string())?;
            print_json(&record)
        }

        Commands::Sekki { start, end } => {
            let engine = resolve_engine(cli)?;
            let (t0, t1) = day_window(*start, *end)?;
            let events = sekki_events_between(&engine, t0, t1, &config.solarterm)
                .map_err(|e| e.to_string())?;
            let rows: Vec<serde_json::Value> = events
                .iter()
                .map(|e| {
                    let info = sekki_info_from_deg(f64::from(e.deg));
                    serde_json::json!({
                        "deg": info.deg,
                        "n": info.n,
                        "name": info.name,
                        "kind": info.kind.name(),
                        "utc": e.utc.to_rfc3339(),
                        "date_jst": jst_date(e.utc).to_string(),
                    })
                })
                .collect();
            print_json(&serde_json::json!({ "sekki": rows }))
        }

        Commands::NewMoons { start, end } => {
            let engine = resolve_engine(cli)?;
            let (t0, t1) = day_window(*start, *end)?;
            let moons = new_moons_between(&engine, t0, t1, &config.newmoon)
                .map_err(|e| e.to_string())?;
            let rows: Vec<serde_json::Value> = moons
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "utc": t.to_rfc3339(),
                        "date_jst": jst_date(*t).to_string(),
                    })
                })
                .collect();
            print_json(&serde_json::json!({ "new_moons": rows }))
        }

        Commands::Months { year, mode } => {
            let mode = match mode.as_str() {
                "strict" => MonthNamingMode::Strict,
                "ws-first" => MonthNamingMode::WsFirst,
                other => return Err(format!("unknown mode: {other}")),
            };
            let engine = resolve_engine(cli)?;
            let (t0, t1) = day_window(
                NaiveDate::from_ymd_opt(*year, 1, 1).ok_or("year out of range")?,
                NaiveDate::from_ymd_opt(*year + 1, 12, 31).ok_or("year out of range")?,
            )?;
            let (moons, anchors) = anchors_for_years(
                &engine,
                t0,
                t1,
                &[*year, *year + 1],
                &config.newmoon,
                &config.solarterm,
                config.lunisolar.series_pad_days,
            )
            .map_err(|e| e.to_string())?;
            let window = window_for_year(&anchors, *year)?;
            let span_count = window.month_count();
            let spans = build_lunar_spans(&moons, window.start.span_index, span_count)
                .map_err(|e| e.to_string())?;
            let pad = chrono::Duration::days(config.lunisolar.term_pad_days);
            let terms = principal_terms_between(
                &engine,
                window.start.new_moon_utc - pad,
                window.end.new_moon_utc + pad,
                &config.solarterm,
            )
            .map_err(|e| e.to_string())?;
            let decision = decide_leap_month(&spans, &terms, config.lunisolar.anchor_month_no)
                .map_err(|e| e.to_string())?;
            verify_leap_consistency(&spans, &terms, &decision, mode).map_err(|e| e.to_string())?;
            let named = assign_month_names(&spans, &terms, decision.leap_span_pos, mode)
                .map_err(|e| e.to_string())?;
            let rows: Vec<serde_json::Value> = named
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "label": m.label(),
                        "month_no": m.month_no,
                        "is_leap": m.is_leap,
                        "new_moon_jst": jst_date(m.new_moon_utc).to_string(),
                        "next_new_moon_jst": jst_date(m.next_new_moon_utc).to_string(),
                        "zhongqi_deg": m.zhongqi_deg,
                    })
                })
                .collect();
            print_json(&serde_json::json!({
                "year": year,
                "month_count": span_count,
                "leap_span_pos": decision.leap_span_pos,
                "months": rows,
            }))
        }

        Commands::Rokuyo { month, day } => {
            let r = rokuyo_from_month_day(*month, *day).map_err(|e| e.to_string())?;
            print_json(&serde_json::json!({
                "month": month,
                "day": day,
                "rokuyo": r.name(),
            }))
        }
    }
}

/// UTC window covering the inclusive JST date range.
fn day_window(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>), String> {
    if end < start {
        return Err("end must not precede start".to_owned());
    }
    let t0 = jst_to_utc(start.and_hms_opt(0, 0, 0).ok_or("invalid start date")?);
    let t1 = jst_to_utc(
        end.succ_opt()
            .ok_or("end date out of range")?
            .and_hms_opt(0, 0, 0)
            .ok_or("invalid end date")?,
    );
    Ok((t0, t1))
}

fn window_for_year(
    anchors: &[kyureki_search::SolsticeAnchor],
    year: i32,
) -> Result<SaisjitsuWindow, String> {
    let find = |y: i32| {
        anchors.iter().find(|a| {
            let d = jst_date(a.solstice_utc);
            d >= NaiveDate::from_ymd_opt(y, 12, 1).unwrap_or(NaiveDate::MAX)
                && d <= NaiveDate::from_ymd_opt(y + 1, 1, 31).unwrap_or(NaiveDate::MAX)
        })
    };
    let start = *find(year).ok_or_else(|| format!("no anchor for {year}"))?;
    let end = *find(year + 1).ok_or_else(|| format!("no anchor for {}", year + 1))?;
    Ok(SaisjitsuWindow { start, end })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}
