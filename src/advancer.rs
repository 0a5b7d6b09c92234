// Batch roll-forward of recurring tasks.
use crate::error::ScheduleError;
use crate::model::{CalendarDay, RecurrenceEngine, Task};

/// Outcome of one roll-forward pass.
///
/// `skipped` counts every examined task that produced no update (pending in
/// the future, expired past its end date, malformed, or failed), so
/// `updated.len() + skipped` always equals the number of incomplete
/// recurring tasks examined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    pub updated: Vec<(String, CalendarDay)>,
    pub skipped: usize,
}

impl AdvanceReport {
    pub fn examined(&self) -> usize {
        self.updated.len() + self.skipped
    }
}

/// Scans incomplete recurring tasks and proposes fresh next-occurrences.
///
/// Pure pass over an in-memory list: no I/O, no ordering requirement between
/// tasks. The caller owns persistence of the returned updates. Re-running
/// the same day with no intervening completions is a no-op, because every
/// update lands strictly after `today`.
pub struct RecurrenceAdvancer;

impl RecurrenceAdvancer {
    pub fn advance_all(tasks: &[Task], today: CalendarDay) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        for task in tasks.iter().filter(|t| t.needs_advancing()) {
            // One bad task never aborts the batch.
            match Self::advance_one(task, today) {
                Ok(Some(next)) => report.updated.push((task.uid.clone(), next)),
                Ok(None) | Err(_) => report.skipped += 1,
            }
        }
        report
    }

    /// Proposes the new next-occurrence for a single task, or `None` when
    /// there is nothing to do (still pending, or recurrence has ended).
    fn advance_one(
        task: &Task,
        today: CalendarDay,
    ) -> Result<Option<CalendarDay>, ScheduleError> {
        let rule = task.recurrence.as_ref().ok_or_else(|| {
            ScheduleError::MalformedRecurringTask(format!("{} has no rule", task.uid))
        })?;
        if rule.interval == 0 {
            return Err(ScheduleError::MalformedRecurringTask(format!(
                "{} has no interval",
                task.uid
            )));
        }

        // Still scheduled in the future: nothing to do.
        if let Some(next) = task.next_occurrence
            && next > today
        {
            return Ok(None);
        }

        let mut base = task
            .last_completed_at
            .or(task.next_occurrence)
            .or(task.due_date)
            .unwrap_or(today);

        // Catch up to the first occurrence strictly after today. Every
        // engine step moves at least one day forward, so this terminates.
        loop {
            let candidate = RecurrenceEngine::next_occurrence(rule, base);
            if rule.ended_before(candidate) {
                // Recurrence has ended. The stale next_occurrence stays in
                // place so callers can detect the expired state against the
                // end date.
                return Ok(None);
            }
            if candidate > today {
                return Ok(Some(candidate));
            }
            base = candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Frequency, RecurrenceRule};

    fn day(y: i32, m: u32, d: u32) -> CalendarDay {
        CalendarDay::from_ymd(y, m, d).unwrap()
    }

    fn daily_task(uid: &str) -> Task {
        let mut task = Task::new("Stretch", day(2024, 3, 1));
        task.uid = uid.to_string();
        task.is_recurring = true;
        task.recurrence = Some(RecurrenceRule::new(Frequency::Daily, 1));
        task
    }

    #[test]
    fn completed_and_one_off_tasks_are_not_examined() {
        let mut done = daily_task("done");
        done.completed = true;
        let one_off = Task::new("Call the bank", day(2024, 3, 1));

        let report = RecurrenceAdvancer::advance_all(&[done, one_off], day(2024, 3, 5));
        assert_eq!(report.examined(), 0);
    }

    #[test]
    fn future_pending_task_is_skipped() {
        let mut task = daily_task("pending");
        task.next_occurrence = Some(day(2024, 3, 9));

        let report = RecurrenceAdvancer::advance_all(&[task], day(2024, 3, 5));
        assert!(report.updated.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn overdue_task_catches_up_past_today_in_one_pass() {
        let mut task = daily_task("overdue");
        task.next_occurrence = Some(day(2024, 3, 2));

        let report = RecurrenceAdvancer::advance_all(&[task], day(2024, 3, 5));
        assert_eq!(report.updated, vec![("overdue".to_string(), day(2024, 3, 6))]);
    }

    #[test]
    fn base_prefers_last_completion_over_cached_occurrence() {
        let mut task = daily_task("completed-recently");
        task.next_occurrence = Some(day(2024, 3, 2));
        task.last_completed_at = Some(day(2024, 3, 5));

        let report = RecurrenceAdvancer::advance_all(&[task], day(2024, 3, 5));
        assert_eq!(
            report.updated,
            vec![("completed-recently".to_string(), day(2024, 3, 6))]
        );
    }

    #[test]
    fn missing_rule_is_counted_not_fatal() {
        let mut broken = daily_task("broken");
        broken.recurrence = None;
        let healthy = daily_task("healthy");

        let report = RecurrenceAdvancer::advance_all(&[broken, healthy], day(2024, 3, 5));
        assert_eq!(report.skipped, 1);
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].0, "healthy");
    }

    #[test]
    fn zero_interval_is_counted_not_looped() {
        let mut broken = daily_task("zero");
        broken.recurrence = Some(RecurrenceRule::new(Frequency::Daily, 0));

        let report = RecurrenceAdvancer::advance_all(&[broken], day(2024, 3, 5));
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn candidate_past_end_date_leaves_task_untouched() {
        let mut task = daily_task("ending");
        task.recurrence = Some(RecurrenceRule::new(Frequency::Daily, 1).until(day(2024, 3, 4)));
        task.next_occurrence = Some(day(2024, 3, 4));

        let report = RecurrenceAdvancer::advance_all(&[task], day(2024, 3, 5));
        assert!(report.updated.is_empty());
        assert_eq!(report.skipped, 1);
    }
}
