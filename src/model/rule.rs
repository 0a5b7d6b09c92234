// Repeat-rule types: weekday tags, frequency, and the validated rule.
use crate::error::ScheduleError;
use crate::model::day::CalendarDay;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Day-of-week tag. The discriminant order gives the persisted index
/// convention 0=Sunday..6=Saturday.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Self {
        match index % 7 {
            0 => Self::Sun,
            1 => Self::Mon,
            2 => Self::Tue,
            3 => Self::Wed,
            4 => Self::Thu,
            5 => Self::Fri,
            _ => Self::Sat,
        }
    }

    /// Days to move forward from `self` to reach `target` (0..=6).
    pub fn offset_to(self, target: Weekday) -> u32 {
        (target.index() + 7 - self.index()) % 7
    }
}

/// Repeat frequency tag. `Custom` behaves like `Daily` with a free-form
/// interval; it exists as a distinct persisted tag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl Frequency {
    /// Parses a persisted frequency tag, failing typed on unknown tags.
    pub fn parse_tag(tag: &str) -> Result<Self, ScheduleError> {
        Self::from_str(tag).map_err(|_| ScheduleError::UnsupportedRecurrenceType(tag.to_string()))
    }
}

/// A repeat pattern: "every `interval` units of `frequency`", optionally
/// pinned to specific weekdays (weekly only) and bounded by an end date.
///
/// An `interval` of 0 is representable because persisted data may be
/// malformed; `validate` rejects it, and the creation path never stores one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    #[serde(default)]
    pub days_of_week: Vec<Weekday>,
    #[serde(default)]
    pub end_date: Option<CalendarDay>,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            days_of_week: Vec::new(),
            end_date: None,
        }
    }

    pub fn on_days(mut self, days: Vec<Weekday>) -> Self {
        self.days_of_week = days;
        self
    }

    pub fn until(mut self, end: CalendarDay) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Input-boundary validation. A weekly rule without weekdays is
    /// incomplete and must never reach the occurrence engine.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.interval == 0 {
            return Err(ScheduleError::MalformedRecurringTask(
                "interval must be at least 1".to_string(),
            ));
        }
        if self.frequency == Frequency::Weekly && self.days_of_week.is_empty() {
            return Err(ScheduleError::IncompleteWeeklyRule);
        }
        Ok(())
    }

    /// True when `day` falls strictly after the rule's end date.
    pub fn ended_before(&self, day: CalendarDay) -> bool {
        self.end_date.is_some_and(|end| day > end)
    }
}
