// File: tests/local_safety.rs
// Data-loss guards around the local task store.
use cadence::context::{AppContext, TestContext};
use cadence::model::{CalendarDay, Frequency, RecurrenceRule, Task, Weekday};
use cadence::storage::LocalStorage;
use std::fs;

fn day(input: &str) -> CalendarDay {
    CalendarDay::normalize(input).unwrap()
}

fn weekly_task() -> Task {
    let mut task = Task::new("Weekly review", day("2024-03-01"));
    task.is_recurring = true;
    task.recurrence = Some(
        RecurrenceRule::new(Frequency::Weekly, 2)
            .on_days(vec![Weekday::Mon, Weekday::Thu])
            .until(day("2024-12-31")),
    );
    task.next_occurrence = Some(day("2024-03-04"));
    task
}

#[test]
fn test_round_trip_preserves_recurrence_fields() {
    let ctx = TestContext::new();
    let original = vec![weekly_task()];

    LocalStorage::save(&ctx, &original).unwrap();
    let loaded = LocalStorage::load(&ctx).unwrap();
    assert_eq!(loaded, original);

    // The on-disk shape stores the weekday tags as a JSON-array string.
    let raw = fs::read_to_string(ctx.get_task_store_path().unwrap()).unwrap();
    assert!(raw.contains(r#""recurrence_type": "weekly""#));
    assert!(raw.contains(r#"[\"Mon\",\"Thu\"]"#));
}

#[test]
fn test_corrupt_store_blocks_saving() {
    let ctx = TestContext::new();
    let path = ctx.get_task_store_path().unwrap();
    fs::write(&path, "{ definitely not json").unwrap();

    assert!(LocalStorage::load(&ctx).is_err());
    assert!(LocalStorage::save(&ctx, &[weekly_task()]).is_err());
    // The unreadable content is still there for manual recovery.
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ definitely not json");
}

#[test]
fn test_unknown_recurrence_tag_fails_the_load() {
    let ctx = TestContext::new();
    LocalStorage::save(&ctx, &[weekly_task()]).unwrap();

    let path = ctx.get_task_store_path().unwrap();
    let tampered = fs::read_to_string(&path)
        .unwrap()
        .replace(r#""recurrence_type": "weekly""#, r#""recurrence_type": "lunar""#);
    fs::write(&path, tampered).unwrap();

    let err = LocalStorage::load(&ctx).unwrap_err();
    assert!(err.to_string().contains("Unreadable stored task"));
    // And the guard keeps the tampered file from being clobbered.
    assert!(LocalStorage::save(&ctx, &[]).is_err());
}

#[test]
fn test_recurring_task_without_rule_fields_survives_a_round_trip() {
    let ctx = TestContext::new();
    let mut degraded = Task::new("Stuck task", day("2024-03-01"));
    degraded.is_recurring = true; // no rule: the malformed-but-preserved mode

    LocalStorage::save(&ctx, std::slice::from_ref(&degraded)).unwrap();
    let loaded = LocalStorage::load(&ctx).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].is_recurring);
    assert!(loaded[0].recurrence.is_none());
}
