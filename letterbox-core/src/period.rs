//! Leaderboard periods.
//!
//! Every score counts towards three periods: the day it was earned, the
//! calendar month containing that day, and all time. Daily and monthly
//! periods carry a key (`YYYY-MM-DD`, with monthly keys pinned to the first
//! of the month); the all-time period has none.
//!
//! # Examples
//! ```
//! use chrono::NaiveDate;
//! use letterbox_core::{Period, PeriodType};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 17).expect("valid date");
//! let [daily, monthly, all_time] = Period::all_for_date(date);
//! assert_eq!(daily.key().as_deref(), Some("2024-03-17"));
//! assert_eq!(monthly.key().as_deref(), Some("2024-03-01"));
//! assert_eq!(all_time.period_type(), PeriodType::AllTime);
//! assert!(all_time.key().is_none());
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

const KEY_FORMAT: &str = "%Y-%m-%d";
const ALL_TIME_SEGMENT: &str = "all";

/// The kind of a leaderboard period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PeriodType {
    /// A single calendar day.
    Daily,
    /// A calendar month.
    Monthly,
    /// Every score ever recorded.
    AllTime,
}

impl PeriodType {
    /// Return the period type as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::AllTime => "all_time",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "all_time" | "all-time" | "alltime" => Ok(Self::AllTime),
            _ => Err(PeriodError::UnknownType {
                value: s.to_owned(),
            }),
        }
    }
}

/// Errors raised while parsing period types and keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// The period type was not recognised.
    #[error("unknown period type '{value}'")]
    UnknownType {
        /// The rejected input.
        value: String,
    },
    /// A daily or monthly period was requested without a key.
    #[error("{period_type} periods require a period key")]
    MissingKey {
        /// The period type lacking a key.
        period_type: PeriodType,
    },
    /// An all-time period was requested with a key.
    #[error("all_time periods do not take a period key (got '{key}')")]
    UnexpectedKey {
        /// The superfluous key.
        key: String,
    },
    /// The key could not be parsed as a date.
    #[error("invalid {period_type} period key '{key}'")]
    InvalidKey {
        /// The period type being parsed.
        period_type: PeriodType,
        /// The rejected key.
        key: String,
    },
}

/// A calendar month, held as its first day.
///
/// Built from any date inside the month, so two values for the same month
/// always compare and hash equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "NaiveDate", into = "NaiveDate")
)]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The first day of the month.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.first_day
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self::containing(date)
    }
}

impl From<Month> for NaiveDate {
    fn from(month: Month) -> Self {
        month.first_day
    }
}

/// A leaderboard period together with its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "period_type", content = "period_key", rename_all = "snake_case")
)]
pub enum Period {
    /// The given calendar day.
    Daily(NaiveDate),
    /// A calendar month.
    Monthly(Month),
    /// All time.
    AllTime,
}

impl Period {
    /// The daily period for `date`.
    #[must_use]
    pub const fn daily(date: NaiveDate) -> Self {
        Self::Daily(date)
    }

    /// The monthly period containing `date`, pinned to the first of the
    /// month.
    #[must_use]
    pub fn monthly(date: NaiveDate) -> Self {
        Self::Monthly(Month::containing(date))
    }

    /// The three periods a score earned on `date` counts towards, in the
    /// order daily, monthly, all time.
    #[must_use]
    pub fn all_for_date(date: NaiveDate) -> [Self; 3] {
        [Self::daily(date), Self::monthly(date), Self::AllTime]
    }

    /// Build a period from a type and an optional textual key.
    ///
    /// Daily keys are `YYYY-MM-DD`. Monthly keys accept `YYYY-MM` or any
    /// `YYYY-MM-DD` inside the month.
    ///
    /// # Errors
    /// Returns [`PeriodError`] when a required key is missing, a key is
    /// supplied for the all-time period, or the key is malformed.
    pub fn from_parts(period_type: PeriodType, key: Option<&str>) -> Result<Self, PeriodError> {
        let key = key.map(str::trim).filter(|k| !k.is_empty());
        match (period_type, key) {
            (PeriodType::AllTime, None) => Ok(Self::AllTime),
            (PeriodType::AllTime, Some(raw)) => Err(PeriodError::UnexpectedKey {
                key: raw.to_owned(),
            }),
            (kind, None) => Err(PeriodError::MissingKey { period_type: kind }),
            (PeriodType::Daily, Some(raw)) => parse_day(raw)
                .map(Self::daily)
                .ok_or_else(|| invalid_key(PeriodType::Daily, raw)),
            (PeriodType::Monthly, Some(raw)) => parse_day(raw)
                .or_else(|| parse_day(&format!("{raw}-01")))
                .map(Self::monthly)
                .ok_or_else(|| invalid_key(PeriodType::Monthly, raw)),
        }
    }

    /// The kind of this period.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        match self {
            Self::Daily(_) => PeriodType::Daily,
            Self::Monthly(_) => PeriodType::Monthly,
            Self::AllTime => PeriodType::AllTime,
        }
    }

    /// The period key: the date for daily periods, the first of the month
    /// for monthly periods and `None` for all time.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Daily(date) => Some(date.format(KEY_FORMAT).to_string()),
            Self::Monthly(month) => Some(month.first_day().format(KEY_FORMAT).to_string()),
            Self::AllTime => None,
        }
    }

    /// The key as used inside cache keys, with `all` standing in for the
    /// all-time period.
    #[must_use]
    pub fn key_segment(&self) -> String {
        self.key().unwrap_or_else(|| ALL_TIME_SEGMENT.to_owned())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            Some(key) => write!(f, "{}:{key}", self.period_type()),
            None => write!(f, "{}", self.period_type()),
        }
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, KEY_FORMAT).ok()
}

fn invalid_key(period_type: PeriodType, raw: &str) -> PeriodError {
    PeriodError::InvalidKey {
        period_type,
        key: raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[rstest]
    #[case("daily", PeriodType::Daily)]
    #[case("Monthly", PeriodType::Monthly)]
    #[case("all_time", PeriodType::AllTime)]
    #[case("all-time", PeriodType::AllTime)]
    fn parses_period_types(#[case] raw: &str, #[case] expected: PeriodType) {
        assert_eq!(raw.parse::<PeriodType>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_period_type() {
        let err = "weekly".parse::<PeriodType>().expect_err("weekly is unknown");
        assert!(err.to_string().contains("unknown period type"));
    }

    #[rstest]
    fn monthly_period_is_pinned_to_first_of_month() {
        let period = Period::monthly(date(2024, 2, 29));
        assert_eq!(period, Period::Monthly(Month::containing(date(2024, 2, 1))));
        assert_eq!(period.key().as_deref(), Some("2024-02-01"));
    }

    #[rstest]
    fn months_built_from_any_day_are_one_key() {
        let mid = Period::Monthly(Month::from(date(2024, 2, 14)));
        let first = Period::monthly(date(2024, 2, 1));
        assert_eq!(mid, first);

        let mut periods = HashSet::new();
        periods.insert(mid);
        periods.insert(first);
        assert_eq!(periods.len(), 1);
        assert_eq!(Month::containing(date(2024, 2, 14)).first_day(), date(2024, 2, 1));
    }

    #[rstest]
    #[case(PeriodType::Daily, Some("2024-03-17"), Ok(Period::Daily(date(2024, 3, 17))))]
    #[case(PeriodType::Monthly, Some("2024-03"), Ok(Period::monthly(date(2024, 3, 1))))]
    #[case(PeriodType::Monthly, Some("2024-03-17"), Ok(Period::monthly(date(2024, 3, 1))))]
    #[case(PeriodType::AllTime, None, Ok(Period::AllTime))]
    #[case(PeriodType::AllTime, Some("  "), Ok(Period::AllTime))]
    #[case(
        PeriodType::Daily,
        None,
        Err(PeriodError::MissingKey { period_type: PeriodType::Daily })
    )]
    #[case(
        PeriodType::AllTime,
        Some("2024-03-17"),
        Err(PeriodError::UnexpectedKey { key: "2024-03-17".into() })
    )]
    #[case(
        PeriodType::Daily,
        Some("2024-13-01"),
        Err(PeriodError::InvalidKey { period_type: PeriodType::Daily, key: "2024-13-01".into() })
    )]
    fn builds_periods_from_parts(
        #[case] period_type: PeriodType,
        #[case] key: Option<&str>,
        #[case] expected: Result<Period, PeriodError>,
    ) {
        assert_eq!(Period::from_parts(period_type, key), expected);
    }

    #[rstest]
    fn display_includes_key() {
        assert_eq!(Period::daily(date(2024, 3, 17)).to_string(), "daily:2024-03-17");
        assert_eq!(Period::AllTime.to_string(), "all_time");
        assert_eq!(Period::AllTime.key_segment(), "all");
    }
}
