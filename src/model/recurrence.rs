// Pure next-occurrence computation. No storage, no clocks, no side effects.
use crate::model::day::CalendarDay;
use crate::model::rule::{Frequency, RecurrenceRule, Weekday};

pub struct RecurrenceEngine;

impl RecurrenceEngine {
    /// Computes the next day the rule recurs, strictly after `base`.
    ///
    /// Callers reject `interval == 0` before computing (see
    /// `RecurrenceRule::validate`); every path here then advances by at
    /// least one day, which the advancer's catch-up loop relies on.
    pub fn next_occurrence(rule: &RecurrenceRule, base: CalendarDay) -> CalendarDay {
        match rule.frequency {
            Frequency::Daily | Frequency::Custom => base.add_days(rule.interval as i64),
            Frequency::Weekly => Self::next_weekly(rule, base),
            Frequency::Monthly => base.add_months(rule.interval),
            Frequency::Yearly => base.add_years(rule.interval),
        }
    }

    /// Weekly stepping over a weekday set.
    ///
    /// Tie-break: a `base` already on a listed weekday never yields `base`
    /// itself; it jumps a full interval to the same weekday. Otherwise the
    /// nearest listed weekday strictly after `base` wins, wrapping into the
    /// following week when the rest of the current week has no match.
    fn next_weekly(rule: &RecurrenceRule, base: CalendarDay) -> CalendarDay {
        if rule.days_of_week.is_empty() {
            // Degenerate fallback for unvalidated stored rules.
            return base.add_weeks(rule.interval);
        }

        let base_weekday = base.weekday();
        if rule.days_of_week.contains(&base_weekday) {
            return base.add_weeks(rule.interval);
        }

        let mut offset = 7;
        for day in &rule.days_of_week {
            let candidate = base_weekday.offset_to(*day);
            if candidate > 0 && candidate < offset {
                offset = candidate;
            }
        }
        base.add_days(offset as i64)
    }

    /// The first day on or after `from` whose weekday is in `days_of_week`,
    /// or `None` for an empty set. Anchors the weekly interval phase: weeks
    /// are counted from this day when deciding whether a later date is on
    /// the rule's cadence.
    pub fn first_match_on_or_after(
        days_of_week: &[Weekday],
        from: CalendarDay,
    ) -> Option<CalendarDay> {
        if days_of_week.is_empty() {
            return None;
        }
        (0..7)
            .map(|offset| from.add_days(offset))
            .find(|day| days_of_week.contains(&day.weekday()))
    }
}
