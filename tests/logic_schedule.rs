// File: tests/logic_schedule.rs
use cadence::model::{CalendarDay, Frequency, RecurrenceRule, Task, Weekday};
use cadence::schedule::DueDateEvaluator;

fn day(input: &str) -> CalendarDay {
    CalendarDay::normalize(input).unwrap()
}

fn task_created(created: &str) -> Task {
    Task::new("Task", day(created))
}

fn weekly_task(created: &str, interval: u32, days: Vec<Weekday>) -> Task {
    let mut task = task_created(created);
    task.is_recurring = true;
    task.recurrence = Some(RecurrenceRule::new(Frequency::Weekly, interval).on_days(days));
    task
}

#[test]
fn test_never_due_before_creation() {
    let mut task = task_created("2024-03-10");
    task.due_date = Some(day("2024-03-10"));
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-09")));
    assert!(DueDateEvaluator::is_due_on(&task, day("2024-03-10")));
}

#[test]
fn test_never_due_after_end_date() {
    // 2024-03-29 is a Friday and within the pattern, but past the end date.
    let mut task = weekly_task("2024-03-01", 1, vec![Weekday::Fri]);
    if let Some(rule) = task.recurrence.as_mut() {
        rule.end_date = Some(day("2024-03-20"));
    }
    assert!(DueDateEvaluator::is_due_on(&task, day("2024-03-08")));
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-29")));
    // One day past the boundary is already out.
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-21")));
}

#[test]
fn test_explicit_due_date_takes_precedence() {
    // The one-off due day wins over the weekly pattern: no weekday hit
    // counts while a due date is set.
    let mut task = weekly_task("2024-03-01", 1, vec![Weekday::Fri]);
    task.due_date = Some(day("2024-03-06")); // a Wednesday

    assert!(DueDateEvaluator::is_due_on(&task, day("2024-03-06")));
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-08"))); // a Friday
}

#[test]
fn test_cached_next_occurrence_is_authoritative() {
    let mut task = weekly_task("2024-03-01", 1, vec![Weekday::Fri]);
    task.next_occurrence = Some(day("2024-03-15"));

    assert!(DueDateEvaluator::is_due_on(&task, day("2024-03-15")));
    // Other Fridays do not match while the cached occurrence is set.
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-08")));
}

#[test]
fn test_weekly_pattern_matches_without_cached_occurrence() {
    let task = weekly_task("2024-03-01", 1, vec![Weekday::Mon, Weekday::Fri]);

    assert!(DueDateEvaluator::is_due_on(&task, day("2024-03-04"))); // Monday
    assert!(DueDateEvaluator::is_due_on(&task, day("2024-03-08"))); // Friday
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-05"))); // Tuesday
}

#[test]
fn test_weekly_interval_phase() {
    // Created 2024-01-03, a Wednesday, biweekly on Wednesdays. The first
    // match anchors the cadence: Jan 3 hits, Jan 10 is off-phase, Jan 17
    // hits again.
    let task = weekly_task("2024-01-03", 2, vec![Weekday::Wed]);

    assert!(DueDateEvaluator::is_due_on(&task, day("2024-01-03")));
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-01-10")));
    assert!(DueDateEvaluator::is_due_on(&task, day("2024-01-17")));
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-01-24")));
    assert!(DueDateEvaluator::is_due_on(&task, day("2024-01-31")));
}

#[test]
fn test_weekly_interval_phase_anchors_after_creation() {
    // Created on a Friday with a {Tue} rule: the anchor is the following
    // Tuesday (2024-03-05), so that Tuesday and every third one after hit.
    let task = weekly_task("2024-03-01", 3, vec![Weekday::Tue]);

    assert!(DueDateEvaluator::is_due_on(&task, day("2024-03-05")));
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-12")));
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-19")));
    assert!(DueDateEvaluator::is_due_on(&task, day("2024-03-26")));
}

#[test]
fn test_non_recurring_task_without_due_date_is_never_due() {
    let task = task_created("2024-03-01");
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-01")));
    assert!(!DueDateEvaluator::is_due_on(&task, day("2024-03-02")));
}

#[test]
fn test_markers_agree_with_is_due_on() {
    let mut one_off = task_created("2024-03-01");
    one_off.due_date = Some(day("2024-03-04"));

    let mut daily = task_created("2024-03-01");
    daily.is_recurring = true;
    daily.recurrence = Some(RecurrenceRule::new(Frequency::Daily, 1));
    daily.next_occurrence = Some(day("2024-03-04"));

    let weekly = weekly_task("2024-03-01", 2, vec![Weekday::Mon, Weekday::Thu]);

    let tasks = vec![one_off, daily, weekly];
    let start = day("2024-03-01");
    let end = day("2024-03-31");
    let markers = DueDateEvaluator::markers_in_range(&tasks, start, end);

    let mut current = start;
    while current <= end {
        let expected: u32 = tasks
            .iter()
            .filter(|t| DueDateEvaluator::is_due_on(t, current))
            .count() as u32;
        let actual = markers.get(&current.date_key()).copied().unwrap_or(0);
        assert_eq!(actual, expected, "mismatch on {}", current);
        if expected == 0 {
            // Zero-count days must not be materialized at all.
            assert!(!markers.contains_key(&current.date_key()));
        }
        current = current.add_days(1);
    }
}

#[test]
fn test_markers_count_overlapping_tasks() {
    let mut a = task_created("2024-03-01");
    a.due_date = Some(day("2024-03-04"));
    let mut b = task_created("2024-03-01");
    b.due_date = Some(day("2024-03-04"));

    let markers = DueDateEvaluator::markers_in_range(&[a, b], day("2024-03-01"), day("2024-03-07"));
    assert_eq!(markers.get("2024-03-04"), Some(&2));
    assert_eq!(markers.len(), 1);
}

#[test]
fn test_markers_clip_to_range_boundaries() {
    let mut task = task_created("2024-03-01");
    task.due_date = Some(day("2024-03-04"));

    // Inclusive on both ends.
    let markers = DueDateEvaluator::markers_in_range(
        std::slice::from_ref(&task),
        day("2024-03-04"),
        day("2024-03-04"),
    );
    assert_eq!(markers.get("2024-03-04"), Some(&1));

    let outside = DueDateEvaluator::markers_in_range(
        std::slice::from_ref(&task),
        day("2024-03-05"),
        day("2024-03-08"),
    );
    assert!(outside.is_empty());
}
