// Domain model: calendar days, repeat rules, tasks, and the occurrence engine.
pub mod day;
pub mod recurrence;
pub mod rule;
pub mod task;

pub use day::CalendarDay;
pub use recurrence::RecurrenceEngine;
pub use rule::{Frequency, RecurrenceRule, Weekday};
pub use task::{Task, TaskRecord};
