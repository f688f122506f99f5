//! Rokuyo (六曜) labeling.
//!
//! Pure arithmetic on the lunisolar date: `R = (M + D) mod 6`. Leap
//! months use the underlying month number.

use crate::error::CalendarError;

/// The six-day cycle, in `R = (M + D) mod 6` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rokuyo {
    /// 大安 (R = 0)
    Taian,
    /// 赤口 (R = 1)
    Shakko,
    /// 先勝 (R = 2)
    Sensho,
    /// 友引 (R = 3)
    Tomobiki,
    /// 先負 (R = 4)
    Senbu,
    /// 仏滅 (R = 5)
    Butsumetsu,
}

impl Rokuyo {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Taian => "大安",
            Self::Shakko => "赤口",
            Self::Sensho => "先勝",
            Self::Tomobiki => "友引",
            Self::Senbu => "先負",
            Self::Butsumetsu => "仏滅",
        }
    }

    const fn from_r(r: u8) -> Self {
        match r {
            0 => Self::Taian,
            1 => Self::Shakko,
            2 => Self::Sensho,
            3 => Self::Tomobiki,
            4 => Self::Senbu,
            _ => Self::Butsumetsu,
        }
    }
}

impl std::fmt::Display for Rokuyo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// `(M + D) mod 6` for a lunisolar month/day.
pub fn rokuyo_r(month: u8, day: u8) -> Result<u8, CalendarError> {
    if !(1..=12).contains(&month) || !(1..=30).contains(&day) {
        return Err(CalendarError::InvalidRange(
            "rokuyo needs month 1..=12 and day 1..=30",
        ));
    }
    Ok((month + day) % 6)
}

/// Rokuyo label for a lunisolar month/day.
pub fn rokuyo_from_month_day(month: u8, day: u8) -> Result<Rokuyo, CalendarError> {
    Ok(Rokuyo::from_r(rokuyo_r(month, day)?))
}
