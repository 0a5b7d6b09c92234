// Calendar-day value type. All scheduling logic operates on whole days.
use crate::error::ScheduleError;
use crate::model::rule::Weekday;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar day with no time-of-day component.
///
/// Every timestamp entering the system is collapsed onto its UTC date before
/// any comparison or arithmetic, so weekday and date-key derivations are
/// stable regardless of the caller's local offset. Equality and ordering
/// follow the ISO `YYYY-MM-DD` key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Collapses an arbitrary timestamp string onto its UTC calendar day.
    ///
    /// Accepts a plain date (`2024-03-01`), an RFC 3339 timestamp
    /// (`2024-03-01T22:15:00-05:00`, converted to UTC first), or a naive
    /// `YYYY-MM-DD HH:MM:SS` timestamp (interpreted as UTC).
    pub fn normalize(input: &str) -> Result<Self, ScheduleError> {
        let trimmed = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(dt.with_timezone(&Utc).date_naive()));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self(naive.and_utc().date_naive()));
        }
        Err(ScheduleError::InvalidDate(trimmed.to_string()))
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.date_naive())
    }

    /// Today as a UTC calendar day.
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    /// The `YYYY-MM-DD` key used for equality and map keying.
    pub fn date_key(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// The canonical instant for this day: noon UTC, safely inside the day
    /// for every timezone offset in use.
    pub fn noon_utc(&self) -> DateTime<Utc> {
        // 12:00:00 is always a valid time of day.
        self.0.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc()
    }

    pub fn weekday(&self) -> Weekday {
        Weekday::from_index(self.0.weekday().num_days_from_sunday())
    }

    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    pub fn add_weeks(&self, weeks: u32) -> Self {
        self.add_days(7 * weeks as i64)
    }

    /// Calendar-month addition with end-of-month clamping: Jan 31 + 1 month
    /// lands on Feb 28 (or Feb 29 in a leap year).
    pub fn add_months(&self, months: u32) -> Self {
        Self(self.0 + Months::new(months))
    }

    /// Year addition, clamping Feb 29 to Feb 28 outside leap years.
    pub fn add_years(&self, years: u32) -> Self {
        self.add_months(12 * years)
    }

    /// Whole days elapsed since `earlier`. Negative when `self` is earlier.
    pub fn days_since(&self, earlier: CalendarDay) -> i64 {
        self.0.signed_duration_since(earlier.0).num_days()
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
