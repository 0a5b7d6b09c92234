// File: src/controller.rs
//! Central logic controller for task operations.
//! This is the single source of truth for all business logic (create,
//! complete, query, advance). Every outer surface delegates here so the
//! creation path, the date queries, and the maintenance trigger agree on
//! recurrence behavior.
use crate::advancer::{AdvanceReport, RecurrenceAdvancer};
use crate::config::Config;
use crate::context::SharedContext;
use crate::model::{CalendarDay, RecurrenceEngine, RecurrenceRule, Task};
use crate::schedule::DueDateEvaluator;
use crate::storage::LocalStorage;
use crate::store::TaskStore;
use anyhow::{Context as _, Result};
use std::collections::BTreeMap;

/// Input for the creation path. The rule is validated before anything is
/// stored; an invalid rule rejects the whole write.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub summary: String,
    pub description: String,
    pub due_date: Option<CalendarDay>,
    pub recurrence: Option<RecurrenceRule>,
}

impl TaskDraft {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            ..Self::default()
        }
    }

    pub fn due(mut self, day: CalendarDay) -> Self {
        self.due_date = Some(day);
        self
    }

    pub fn repeating(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }
}

pub struct TaskController {
    store: TaskStore,
    config: Config,
    ctx: SharedContext,
}

impl TaskController {
    /// Loads config and tasks through the given context.
    pub fn open(ctx: SharedContext) -> Result<Self> {
        let config = Config::load(ctx.as_ref()).context("Failed to load configuration")?;
        let tasks = LocalStorage::load(ctx.as_ref()).context("Failed to load task store")?;
        Ok(Self {
            store: TaskStore::from_tasks(tasks),
            config,
            ctx,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn get(&self, uid: &str) -> Option<&Task> {
        self.store.get(uid)
    }

    /// Create a task.
    ///
    /// Validates the repeat rule at this boundary, then computes the initial
    /// next occurrence from the explicit due day (or `today` without one)
    /// and persists the result.
    pub fn create_task(&mut self, draft: TaskDraft, today: CalendarDay) -> Result<String> {
        if let Some(rule) = &draft.recurrence {
            rule.validate()?;
        }

        let mut task = Task::new(&draft.summary, today);
        task.description = draft.description;
        task.due_date = draft.due_date;
        if let Some(rule) = draft.recurrence {
            let base = draft.due_date.unwrap_or(today);
            let first = RecurrenceEngine::next_occurrence(&rule, base);
            // A rule already past its end date stores no occurrence; the
            // task is inert from the start.
            if !rule.ended_before(first) {
                task.next_occurrence = Some(first);
            }
            task.is_recurring = true;
            task.recurrence = Some(rule);
        }

        let uid = task.uid.clone();
        log::info!("Creating task {} ({})", uid, task.summary);
        self.store.upsert(task);
        self.persist()?;
        Ok(uid)
    }

    /// Complete a task.
    ///
    /// A recurring task with a usable rule rolls over in place: the
    /// completion day is stamped, a fresh next occurrence is derived from it,
    /// and the task stays open for its next instance. The one-off due day is
    /// consumed by the completed instance. Everything else (one-offs,
    /// malformed rules, rules past their end date) completes for good.
    pub fn complete_task(&mut self, uid: &str, today: CalendarDay) -> Result<()> {
        let task = self
            .store
            .get_mut(uid)
            .ok_or_else(|| anyhow::anyhow!("No such task: {}", uid))?;

        let rollover_rule = task
            .recurrence
            .clone()
            .filter(|rule| task.is_recurring && rule.validate().is_ok());

        match rollover_rule {
            Some(rule) => {
                task.last_completed_at = Some(today);
                let next = RecurrenceEngine::next_occurrence(&rule, today);
                if rule.ended_before(next) {
                    log::info!("Task {} recurrence ended; completing", uid);
                    task.completed = true;
                } else {
                    task.next_occurrence = Some(next);
                    task.due_date = None;
                    task.completed = false;
                    log::info!("Task {} rolled over to {}", uid, next);
                }
            }
            None => {
                task.completed = true;
            }
        }

        self.persist()
    }

    /// Tasks due on one specific day.
    pub fn tasks_due_on(&self, day: CalendarDay) -> Vec<&Task> {
        self.store
            .tasks()
            .iter()
            .filter(|task| DueDateEvaluator::is_due_on(task, day))
            .collect()
    }

    /// Day -> due-count map over an inclusive date range.
    pub fn markers(&self, start: CalendarDay, end: CalendarDay) -> BTreeMap<String, u32> {
        DueDateEvaluator::markers_in_range(self.store.tasks(), start, end)
    }

    /// Runs the roll-forward job and persists any proposed updates.
    pub fn advance(&mut self, today: CalendarDay) -> Result<AdvanceReport> {
        let report = RecurrenceAdvancer::advance_all(self.store.tasks(), today);
        for (uid, next) in &report.updated {
            self.store.apply_next_occurrence(uid, *next);
        }
        if !report.updated.is_empty() {
            self.persist()?;
        }
        log::info!(
            "Advance pass: {} updated, {} skipped",
            report.updated.len(),
            report.skipped
        );
        Ok(report)
    }

    pub fn remove_task(&mut self, uid: &str) -> Result<()> {
        self.store
            .remove(uid)
            .ok_or_else(|| anyhow::anyhow!("No such task: {}", uid))?;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        LocalStorage::save(self.ctx.as_ref(), self.store.tasks())
    }
}
