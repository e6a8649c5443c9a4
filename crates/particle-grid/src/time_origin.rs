//! Time origin of a grid's time axis.
//!
//! Grid times are plain seconds relative to an origin. The origin is only
//! used to display times and to convert them back and forth; the stepping
//! logic never looks at it.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{GridError, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// CF calendar used to interpret a calendar epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    #[default]
    Standard,
    Gregorian,
    ProlepticGregorian,
    /// 365-day years.
    #[serde(rename = "noleap", alias = "365_day")]
    NoLeap,
    /// 366-day years.
    #[serde(alias = "366_day")]
    AllLeap,
    /// Twelve 30-day months.
    #[serde(rename = "360_day")]
    Day360,
}

impl CalendarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Gregorian => "gregorian",
            Self::ProlepticGregorian => "proleptic_gregorian",
            Self::NoLeap => "noleap",
            Self::AllLeap => "all_leap",
            Self::Day360 => "360_day",
        }
    }

    fn uses_chrono(&self) -> bool {
        matches!(
            self,
            Self::Standard | Self::Gregorian | Self::ProlepticGregorian
        )
    }

    fn days_in_month(&self, month: u32) -> u32 {
        const NOLEAP: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        match self {
            Self::Day360 => 30,
            Self::AllLeap if month == 2 => 29,
            _ => NOLEAP[(month - 1) as usize],
        }
    }

    fn days_in_year(&self) -> i64 {
        match self {
            Self::Day360 => 360,
            Self::AllLeap => 366,
            _ => 365,
        }
    }

    /// Days since 0000-01-01 in a fixed-length-year calendar.
    fn day_number(&self, year: i32, month: u32, day: u32) -> i64 {
        let before_month: u32 = (1..month).map(|m| self.days_in_month(m)).sum();
        year as i64 * self.days_in_year() + before_month as i64 + day as i64 - 1
    }

    fn date_from_day_number(&self, number: i64) -> (i32, u32, u32) {
        let year = number.div_euclid(self.days_in_year());
        let mut remaining = number.rem_euclid(self.days_in_year()) as u32;
        let mut month = 1;
        while remaining >= self.days_in_month(month) {
            remaining -= self.days_in_month(month);
            month += 1;
        }
        (year as i32, month, remaining + 1)
    }
}

impl FromStr for CalendarKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "gregorian" => Ok(Self::Gregorian),
            "proleptic_gregorian" => Ok(Self::ProlepticGregorian),
            "noleap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            other => Err(GridError::calendar(format!("unknown calendar '{}'", other))),
        }
    }
}

impl std::fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A date in an arbitrary CF calendar.
///
/// `NaiveDateTime` cannot hold dates such as 30 February, which exist in the
/// 360-day calendar, so calendar dates carry their fields explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Seconds since midnight, `[0, 86400)`.
    pub seconds: f64,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32, seconds: f64) -> Self {
        Self {
            year,
            month,
            day,
            seconds,
        }
    }

    fn check(&self, calendar: CalendarKind) -> Result<()> {
        let valid = (1..=12).contains(&self.month)
            && self.day >= 1
            && (self.seconds >= 0.0 && self.seconds < SECONDS_PER_DAY)
            && if calendar.uses_chrono() {
                NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_some()
            } else {
                self.day <= calendar.days_in_month(self.month)
            };
        if valid {
            Ok(())
        } else {
            Err(GridError::calendar(format!(
                "{} is not a valid {} date",
                self, calendar
            )))
        }
    }
}

impl From<NaiveDateTime> for CalendarDate {
    fn from(dt: NaiveDateTime) -> Self {
        let seconds =
            dt.num_seconds_from_midnight() as f64 + dt.nanosecond() as f64 * 1e-9;
        Self::new(dt.year(), dt.month(), dt.day(), seconds)
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.seconds.floor() as u32;
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year,
            self.month,
            self.day,
            whole / 3600,
            (whole / 60) % 60,
            whole % 60
        )
    }
}

/// An absolute time produced by [`TimeOrigin::fulltime`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeStamp {
    Seconds(f64),
    Date(CalendarDate),
}

impl std::fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seconds(s) => write!(f, "{}", s),
            Self::Date(d) => write!(f, "{}", d),
        }
    }
}

/// Origin of the relative time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeOrigin {
    /// Plain numeric offset (seconds).
    Raw { offset: f64 },
    /// Calendar epoch.
    Calendar {
        epoch: NaiveDateTime,
        #[serde(default)]
        calendar: CalendarKind,
    },
}

impl Default for TimeOrigin {
    fn default() -> Self {
        Self::Raw { offset: 0.0 }
    }
}

impl TimeOrigin {
    /// Origin at a calendar epoch.
    pub fn calendar(epoch: NaiveDateTime, calendar: CalendarKind) -> Self {
        Self::Calendar { epoch, calendar }
    }

    pub fn is_calendar(&self) -> bool {
        matches!(self, Self::Calendar { .. })
    }

    /// Absolute time of `seconds` relative to this origin.
    pub fn fulltime(&self, seconds: f64) -> Result<TimeStamp> {
        if !seconds.is_finite() {
            return Err(GridError::calendar(format!(
                "cannot convert non-finite time {}",
                seconds
            )));
        }

        match *self {
            Self::Raw { offset } => Ok(TimeStamp::Seconds(offset + seconds)),
            Self::Calendar { epoch, calendar } if calendar.uses_chrono() => {
                let micros = (seconds * 1e6).round() as i64;
                epoch
                    .checked_add_signed(Duration::microseconds(micros))
                    .map(|dt| TimeStamp::Date(dt.into()))
                    .ok_or_else(|| {
                        GridError::calendar(format!("{} s after {} overflows", seconds, epoch))
                    })
            }
            Self::Calendar { epoch, calendar } => {
                let start = CalendarDate::from(epoch);
                let total = calendar.day_number(start.year, start.month, start.day) as f64
                    * SECONDS_PER_DAY
                    + start.seconds
                    + seconds;
                let days = (total / SECONDS_PER_DAY).floor();
                let (year, month, day) = calendar.date_from_day_number(days as i64);
                Ok(TimeStamp::Date(CalendarDate::new(
                    year,
                    month,
                    day,
                    total - days * SECONDS_PER_DAY,
                )))
            }
        }
    }

    /// Seconds relative to this origin of an absolute time.
    pub fn reltime(&self, stamp: &TimeStamp) -> Result<f64> {
        match (*self, stamp) {
            (Self::Raw { offset }, TimeStamp::Seconds(s)) => Ok(s - offset),
            (Self::Calendar { epoch, calendar }, TimeStamp::Date(date)) => {
                date.check(calendar)?;
                let start = CalendarDate::from(epoch);
                if calendar.uses_chrono() {
                    // check() guarantees the date exists
                    let days = NaiveDate::from_ymd_opt(date.year, date.month, date.day)
                        .map(|d| (d - epoch.date()).num_days())
                        .unwrap_or_default();
                    Ok(days as f64 * SECONDS_PER_DAY + date.seconds - start.seconds)
                } else {
                    let days = calendar.day_number(date.year, date.month, date.day)
                        - calendar.day_number(start.year, start.month, start.day);
                    Ok(days as f64 * SECONDS_PER_DAY + date.seconds - start.seconds)
                }
            }
            (origin, stamp) => Err(GridError::calendar(format!(
                "time {} does not match origin {}",
                stamp, origin
            ))),
        }
    }
}

impl std::fmt::Display for TimeOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw { offset } => write!(f, "{}", offset),
            Self::Calendar { epoch, calendar } => {
                write!(f, "{} ({})", CalendarDate::from(*epoch), calendar)
            }
        }
    }
}
