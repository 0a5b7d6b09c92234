// Typed errors for the scheduling core.
use thiserror::Error;

/// Errors produced by the pure scheduling core.
///
/// Outer layers (storage, config, CLI) wrap these in `anyhow` with context.
/// The batch advancer catches them per task and counts the task as skipped
/// instead of aborting the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A timestamp could not be parsed into a calendar day.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// An unknown recurrence frequency tag was encountered.
    #[error("unsupported recurrence type: {0}")]
    UnsupportedRecurrenceType(String),

    /// A weekly rule with an empty weekday set. Rejected at the input
    /// boundary; such a rule must never be used to compute occurrences.
    #[error("weekly rule has an empty weekday set")]
    IncompleteWeeklyRule,

    /// A recurring task or rule whose fields are missing or unusable.
    #[error("malformed recurring task: {0}")]
    MalformedRecurringTask(String),
}
