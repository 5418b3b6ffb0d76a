//! Local calendar-date helpers shared by the recurrence and budget modules.
//!
//! Every value here is a wall-clock [`NaiveDate`]; nothing is converted through UTC, so
//! a stored `2024-03-01` can never drift to the previous or next day.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date.
///
/// Legacy records stored full ISO timestamps (`2024-03-05T10:00:00.000Z`); the leading
/// date component is the local day the entry was written for, so only that part is read.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = match trimmed.find('T') {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|err| LedgerError::InvalidDate(format!("`{raw}`: {err}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Weekday of the first day of the month, `0` = Sunday through `6` = Saturday.
pub fn weekday_of_first(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// Which occurrence of its weekday `date` is within the month (1 for days 1..=7).
pub fn nth_weekday_of_month(date: NaiveDate) -> u32 {
    date.day().div_ceil(7)
}

/// Calendar-grid row of `date` in a Sunday-first month view.
///
/// Not the same as [`nth_weekday_of_month`]: when the month starts mid-week the first
/// row is short, so e.g. the 7th can already sit in row 2.
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() + weekday_of_first(date.year(), date.month())).div_ceil(7)
}

/// Number of grid rows needed to show the whole month.
pub fn weeks_in_month(year: i32, month: u32) -> u32 {
    (days_in_month(year, month) + weekday_of_first(year, month)).div_ceil(7)
}

/// Shifts `date` by `months`, clamping the day to the end of shorter months.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MAX)
}

/// A calendar month, the unit budget reports are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidDate(format!(
                "month {month} is out of range"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn weeks(&self) -> u32 {
        weeks_in_month(self.year, self.month)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

/// Serde adapter storing dates as `YYYY-MM-DD` and accepting legacy timestamps.
pub mod serde_date {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(D::Error::custom)
    }
}
