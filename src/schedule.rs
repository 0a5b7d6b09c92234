// Due-on-date evaluation and per-day marker aggregation.
use crate::model::{CalendarDay, Frequency, RecurrenceEngine, Task};
use std::collections::BTreeMap;

/// Decides whether a task is due on a given calendar day, and aggregates
/// due-counts over a date range for the calendar markers view.
///
/// Both entry points share one predicate so the by-date query and the
/// markers view can never disagree about a task.
pub struct DueDateEvaluator;

impl DueDateEvaluator {
    pub fn is_due_on(task: &Task, target: CalendarDay) -> bool {
        Self::due_on(task, target, Self::weekly_anchor(task))
    }

    /// Day -> due-task count over `[start, end]` inclusive. Days with a zero
    /// count are never materialized.
    pub fn markers_in_range(
        tasks: &[Task],
        start: CalendarDay,
        end: CalendarDay,
    ) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for task in tasks {
            // The weekly phase anchor is per-task, not per-day; derive it
            // once outside the day loop.
            let anchor = Self::weekly_anchor(task);
            let mut day = start;
            while day <= end {
                if Self::due_on(task, day, anchor) {
                    *counts.entry(day.date_key()).or_insert(0) += 1;
                }
                day = day.add_days(1);
            }
        }
        counts
    }

    /// First day on or after `created_at` matching the weekly rule's weekday
    /// set. Weeks are counted from here when the rule skips intervals.
    fn weekly_anchor(task: &Task) -> Option<CalendarDay> {
        let rule = task.recurrence.as_ref()?;
        if rule.frequency != Frequency::Weekly {
            return None;
        }
        RecurrenceEngine::first_match_on_or_after(&rule.days_of_week, task.created_at)
    }

    fn due_on(task: &Task, target: CalendarDay, weekly_anchor: Option<CalendarDay>) -> bool {
        // A task cannot be due before it existed.
        if target < task.created_at {
            return false;
        }
        // Nothing is due past the rule's end date, weekday match or not.
        if let Some(rule) = &task.recurrence
            && rule.ended_before(target)
        {
            return false;
        }
        // An explicit due day describes a single instance and takes
        // precedence over any recurrence fields.
        if let Some(due) = task.due_date {
            return due == target;
        }
        if !task.is_recurring {
            return false;
        }
        let Some(rule) = &task.recurrence else {
            return false;
        };
        if let Some(next) = task.next_occurrence {
            return next == target;
        }
        if rule.frequency == Frequency::Weekly && !rule.days_of_week.is_empty() {
            if !rule.days_of_week.contains(&target.weekday()) {
                return false;
            }
            if rule.interval > 1 {
                let Some(anchor) = weekly_anchor else {
                    return false;
                };
                let elapsed_weeks = target.days_since(anchor).div_euclid(7);
                return elapsed_weeks % rule.interval as i64 == 0;
            }
            return true;
        }
        false
    }
}
