//! Sekki (二十四節気) name tables and classification.

use crate::error::CalendarError;

/// The 24 sekki names, indexed by `n = deg / 15` (so index 0 is 春分 at
/// the vernal point).
pub const SEKKI_NAMES: [&str; 24] = [
    "春分", "清明", "穀雨", "立夏", "小満", "芒種", "夏至", "小暑", "大暑", "立秋", "処暑",
    "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至", "小寒", "大寒", "立春",
    "雨水", "啓蟄",
];

/// Traditional month display names, indexed by month number − 1.
const MONTH_NAMES: [&str; 12] = [
    "睦月", "如月", "弥生", "卯月", "皐月", "水無月", "文月", "葉月", "長月", "神無月", "霜月",
    "師走",
];

/// Sekki kind: even `n` are principal terms (中気), odd are nodes (節).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SekkiKind {
    Setsu,
    Chuki,
}

impl SekkiKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setsu => "節",
            Self::Chuki => "中気",
        }
    }
}

/// Normalized sekki descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SekkiInfo {
    /// Degree snapped to the 15° grid, in [0, 345].
    pub deg: i32,
    /// Index 0..=23.
    pub n: usize,
    pub name: &'static str,
    pub kind: SekkiKind,
}

/// Classify a (possibly float-noisy) solar longitude as a sekki.
///
/// The input snaps to the nearest 15° multiple, absorbing values such as
/// 284.999999 from upstream root finding.
pub fn sekki_info_from_deg(deg: f64) -> SekkiInfo {
    let n = (kyureki_astro::norm360(deg) / 15.0).round() as usize % 24;
    let kind = if n % 2 == 0 {
        SekkiKind::Chuki
    } else {
        SekkiKind::Setsu
    };
    SekkiInfo {
        deg: i32::try_from(n).expect("n < 24") * 15,
        n,
        name: SEKKI_NAMES[n],
        kind,
    }
}

/// Display name of a lunisolar month, with 閏 prefix for leap months.
pub fn month_display_name(month_no: u8, is_leap: bool) -> Result<String, CalendarError> {
    if !(1..=12).contains(&month_no) {
        return Err(CalendarError::InvalidRange("month_no must be in 1..=12"));
    }
    let base = MONTH_NAMES[usize::from(month_no) - 1];
    Ok(if is_leap {
        format!("閏{base}")
    } else {
        base.to_owned()
    })
}
