// Domain task and its flat persisted record.
use crate::error::ScheduleError;
use crate::model::day::CalendarDay;
use crate::model::rule::{Frequency, RecurrenceRule, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_uid() -> String {
    Uuid::new_v4().to_string()
}

/// A task as the scheduling core sees it: typed rule and day fields.
///
/// The core receives copies of these from the storage collaborator, computes
/// derived values, and hands updated fields back; it never performs storage
/// I/O itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub uid: String,
    pub summary: String,
    pub description: String,
    /// Earliest day the task can be due. A task is never due before it existed.
    pub created_at: CalendarDay,
    /// One-off due day. Takes precedence over recurrence when deciding
    /// whether the task is due on a date; describes the first instance.
    pub due_date: Option<CalendarDay>,
    pub is_recurring: bool,
    /// Present iff the persisted rule fields were present. `is_recurring`
    /// with `recurrence: None` is the malformed-but-preserved degraded mode.
    pub recurrence: Option<RecurrenceRule>,
    /// Cached result of the last occurrence computation.
    pub next_occurrence: Option<CalendarDay>,
    /// Base point for the rollover computed when the task is completed.
    pub last_completed_at: Option<CalendarDay>,
    pub completed: bool,
}

impl Task {
    pub fn new(summary: &str, created_at: CalendarDay) -> Self {
        Self {
            uid: default_uid(),
            summary: summary.to_string(),
            description: String::new(),
            created_at,
            due_date: None,
            is_recurring: false,
            recurrence: None,
            next_occurrence: None,
            last_completed_at: None,
            completed: false,
        }
    }

    pub fn checkbox_symbol(&self) -> &'static str {
        if self.completed { "[✔]" } else { "[ ]" }
    }

    /// True for tasks the roll-forward job examines.
    pub fn needs_advancing(&self) -> bool {
        self.is_recurring && !self.completed
    }
}

/// The flat persisted shape of a task.
///
/// `recurrence_days_of_week` carries a JSON array of weekday tags serialized
/// as a string (e.g. `"[\"Mon\",\"Wed\"]"`); the tags are decoded here, at
/// the persistence boundary, and never travel through the engine as raw
/// strings. All optional fields default so records written by older versions
/// keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default = "default_uid")]
    pub uid: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub created_at: CalendarDay,
    #[serde(default)]
    pub due_date: Option<CalendarDay>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_type: Option<String>,
    #[serde(default)]
    pub recurrence_interval: Option<u32>,
    #[serde(default)]
    pub recurrence_days_of_week: Option<String>,
    #[serde(default)]
    pub recurrence_end_date: Option<CalendarDay>,
    #[serde(default)]
    pub next_occurrence: Option<CalendarDay>,
    #[serde(default)]
    pub last_completed_at: Option<CalendarDay>,
    #[serde(default)]
    pub completed: bool,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        let rule = task.recurrence.as_ref();
        Self {
            uid: task.uid.clone(),
            summary: task.summary.clone(),
            description: task.description.clone(),
            created_at: task.created_at,
            due_date: task.due_date,
            is_recurring: task.is_recurring,
            recurrence_type: rule.map(|r| r.frequency.to_string()),
            recurrence_interval: rule.map(|r| r.interval),
            recurrence_days_of_week: rule.and_then(|r| {
                if r.days_of_week.is_empty() {
                    None
                } else {
                    serde_json::to_string(&r.days_of_week).ok()
                }
            }),
            recurrence_end_date: rule.and_then(|r| r.end_date),
            next_occurrence: task.next_occurrence,
            last_completed_at: task.last_completed_at,
            completed: task.completed,
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = ScheduleError;

    /// Decodes the typed rule out of the flat record.
    ///
    /// A record flagged recurring with *absent* rule fields converts
    /// successfully to `recurrence: None` (the task simply stops advancing);
    /// fields that are present but unparseable fail typed so the caller can
    /// refuse to overwrite the stored data.
    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let recurrence = match &record.recurrence_type {
            Some(tag) => {
                let frequency = Frequency::parse_tag(tag)?;
                let days_of_week = match &record.recurrence_days_of_week {
                    Some(encoded) => {
                        serde_json::from_str::<Vec<Weekday>>(encoded).map_err(|_| {
                            ScheduleError::MalformedRecurringTask(format!(
                                "{} has an unreadable weekday set",
                                record.uid
                            ))
                        })?
                    }
                    None => Vec::new(),
                };
                Some(RecurrenceRule {
                    frequency,
                    // 0 marks a record persisted without an interval; the
                    // advancer skip-counts it instead of computing.
                    interval: record.recurrence_interval.unwrap_or(0),
                    days_of_week,
                    end_date: record.recurrence_end_date,
                })
            }
            None => None,
        };

        Ok(Self {
            uid: record.uid,
            summary: record.summary,
            description: record.description,
            created_at: record.created_at,
            due_date: record.due_date,
            is_recurring: record.is_recurring,
            recurrence,
            next_occurrence: record.next_occurrence,
            last_completed_at: record.last_completed_at,
            completed: record.completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> CalendarDay {
        CalendarDay::from_ymd(y, m, d).unwrap()
    }

    fn weekly_task() -> Task {
        let mut task = Task::new("Water the plants", day(2024, 3, 1));
        task.is_recurring = true;
        task.recurrence = Some(
            RecurrenceRule::new(Frequency::Weekly, 2)
                .on_days(vec![Weekday::Mon, Weekday::Thu])
                .until(day(2024, 12, 31)),
        );
        task.next_occurrence = Some(day(2024, 3, 4));
        task
    }

    #[test]
    fn record_round_trip_preserves_every_field() {
        let task = weekly_task();
        let record = TaskRecord::from(&task);

        assert_eq!(record.recurrence_type.as_deref(), Some("weekly"));
        assert_eq!(record.recurrence_interval, Some(2));
        assert_eq!(
            record.recurrence_days_of_week.as_deref(),
            Some(r#"["Mon","Thu"]"#)
        );
        assert_eq!(record.recurrence_end_date, Some(day(2024, 12, 31)));

        let back = Task::try_from(record).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn record_serde_round_trips_through_json() {
        let record = TaskRecord::from(&weekly_task());
        let json = serde_json::to_string(&record).unwrap();
        let reloaded: TaskRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, record);
    }

    #[test]
    fn recurring_record_without_rule_fields_degrades_to_no_rule() {
        let mut record = TaskRecord::from(&Task::new("Stretch", day(2024, 3, 1)));
        record.is_recurring = true;

        let task = Task::try_from(record).unwrap();
        assert!(task.is_recurring);
        assert!(task.recurrence.is_none());
        assert!(task.needs_advancing());
    }

    #[test]
    fn unknown_frequency_tag_fails_typed() {
        let mut record = TaskRecord::from(&Task::new("Stretch", day(2024, 3, 1)));
        record.is_recurring = true;
        record.recurrence_type = Some("fortnightly".to_string());

        assert!(matches!(
            Task::try_from(record),
            Err(ScheduleError::UnsupportedRecurrenceType(_))
        ));
    }

    #[test]
    fn unreadable_weekday_string_fails_typed() {
        let mut record = TaskRecord::from(&weekly_task());
        record.recurrence_days_of_week = Some("Mon,Thu".to_string());

        assert!(matches!(
            Task::try_from(record),
            Err(ScheduleError::MalformedRecurringTask(_))
        ));
    }

    #[test]
    fn missing_interval_loads_as_zero_for_skip_counting() {
        let mut record = TaskRecord::from(&weekly_task());
        record.recurrence_interval = None;

        let task = Task::try_from(record).unwrap();
        assert_eq!(task.recurrence.unwrap().interval, 0);
    }
}
