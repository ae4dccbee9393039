//! Next-occurrence calculation for repeating tasks.
//!
//! Rule text is classified once into a fixed [`Interval`] or a calendar
//! [`Rule`]; both answer "first date strictly after the anchor" through
//! [`NextDate`]. The raw result may name a day that does not exist in its
//! month; it is clamped backward before the successor is built.

/// Fixed-unit intervals computed by calendar arithmetic.
pub mod interval;
/// Calendar rules expanded by scanning days.
pub mod rule;

pub use interval::{Interval, Unit};
pub use rule::{Frequency, Rule, WeekdayRule};

use std::sync::LazyLock;

use regex::Regex;
use time::Date;
use tracing::debug;

use crate::date::{CalendarDay, add_days, days_between};
use crate::error::{Result, TaskError};
use crate::markers::compile;
use crate::serializer::build_line;
use crate::{Status, Task};

static WHEN_DONE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\s*\bwhen\s+done\s*$"));

/// Strategy answering the next raw calendar day after an anchor.
pub trait NextDate {
    /// First occurrence strictly after `anchor`, before clamping.
    fn next_after(&self, anchor: Date) -> Option<CalendarDay>;
}

/// Recurrence text split into its rule and the `when done` qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec {
    rule: String,
    when_done: bool,
}

impl RecurrenceSpec {
    /// Split raw recurrence text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        WHEN_DONE.find(text).map_or_else(
            || Self {
                rule: text.to_owned(),
                when_done: false,
            },
            |found| Self {
                rule: text[..found.start()].trim().to_owned(),
                when_done: true,
            },
        )
    }

    /// Rule text without the qualifier.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Whether the next date is measured from the completion date.
    #[must_use]
    pub const fn when_done(&self) -> bool {
        self.when_done
    }

    /// Classify the rule as a fixed interval or a calendar rule.
    ///
    /// # Errors
    /// Returns [`TaskError::UnparseableRecurrence`] when neither grammar accepts it.
    pub fn classify(&self) -> Result<Recurrence> {
        if let Some(interval) = Interval::parse(&self.rule) {
            return Ok(Recurrence::Simple(interval));
        }
        Rule::parse(&self.rule)
            .map(Recurrence::Complex)
            .ok_or_else(|| TaskError::UnparseableRecurrence(self.rule.clone()))
    }
}

/// A classified rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    /// `every [N] day|week|month|year`.
    Simple(Interval),
    /// Everything else the rule grammar accepts.
    Complex(Rule),
}

impl NextDate for Recurrence {
    fn next_after(&self, anchor: Date) -> Option<CalendarDay> {
        match self {
            Self::Simple(interval) => interval.next_after(anchor),
            Self::Complex(rule) => rule.next_after(anchor),
        }
    }
}

/// Build the successor of a repeating task.
///
/// Returns `Ok(None)` when the task has no recurrence. The anchor is the
/// completion date for `when done` rules (when one is given), otherwise the
/// task's reference date. Every present due/scheduled/start date is shifted by
/// the distance between the original primary date and the next date, so the
/// offsets between them are kept. A task without any of those dates gets the
/// next date as its due date.
///
/// # Errors
/// Returns [`TaskError::UnparseableRecurrence`] when the rule is not
/// understood, no anchor exists, or no next date can be found.
pub fn next_occurrence(task: &Task, completion: Option<Date>, today: Date) -> Result<Option<Task>> {
    let Some(text) = task.recurrence() else {
        return Ok(None);
    };
    let spec = RecurrenceSpec::parse(text);
    let unparseable = || TaskError::UnparseableRecurrence(text.to_owned());

    let anchor = match (spec.when_done(), completion) {
        (true, Some(done)) => done,
        _ => task.reference_date().ok_or_else(unparseable)?,
    };
    let next = spec
        .classify()?
        .next_after(anchor)
        .and_then(CalendarDay::clamp)
        .ok_or_else(unparseable)?;
    debug!(task = %task.id(), %anchor, %next, when_done = spec.when_done(), "computed next occurrence");

    let mut successor = task.clone();
    successor.id = task.id().next_line();
    successor.status = Status::Incomplete;
    successor.status_symbol = ' ';
    successor.done = None;
    match task.reference_date() {
        Some(primary) => {
            let delta = days_between(primary, next);
            let shift = |date: Option<Date>| date.and_then(|date| add_days(date, delta));
            successor.due = shift(task.due());
            successor.scheduled = shift(task.scheduled());
            successor.start = shift(task.start());
        }
        None => successor.due = Some(next),
    }
    successor.original_markdown = format!("{}{}", task.indent(), build_line(&successor));
    Ok(Some(successor.rescored(today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 08 - 05);

    fn task(line: &str) -> Task {
        parse_line(line, "habits.md", 3, TODAY).unwrap_or_else(|| panic!("expected a task: {line}"))
    }

    fn successor(line: &str, completion: Option<Date>) -> Task {
        next_occurrence(&task(line), completion, TODAY)
            .unwrap_or_else(|err| panic!("recurrence failed: {err}"))
            .unwrap_or_else(|| panic!("expected a successor"))
    }

    #[test]
    fn splits_when_done_qualifier() {
        let spec = RecurrenceSpec::parse("every month on the last Friday When Done");
        assert_eq!(spec.rule(), "every month on the last Friday");
        assert!(spec.when_done());

        let spec = RecurrenceSpec::parse("every week");
        assert_eq!(spec.rule(), "every week");
        assert!(!spec.when_done());
    }

    #[test]
    fn classification_is_the_single_dispatch_point() {
        assert!(matches!(
            RecurrenceSpec::parse("every 2 weeks").classify(),
            Ok(Recurrence::Simple(_))
        ));
        assert!(matches!(
            RecurrenceSpec::parse("every weekday").classify(),
            Ok(Recurrence::Complex(_))
        ));
        assert_eq!(
            RecurrenceSpec::parse("now and then").classify(),
            Err(TaskError::UnparseableRecurrence("now and then".to_owned()))
        );
    }

    #[test]
    fn clamps_leap_day_and_month_end() {
        let next = successor("- [ ] Renew 🔁 every year 📅 2024-02-29", None);
        assert_eq!(next.due(), Some(date!(2025 - 02 - 28)));
        let next = successor("- [ ] Invoice 🔁 every month 📅 2025-01-31", None);
        assert_eq!(next.due(), Some(date!(2025 - 02 - 28)));
    }

    #[test]
    fn when_done_anchors_on_completion() {
        let line = "- [ ] Water plants 🔁 every day when done 📅 2025-08-05";
        let late = successor(line, Some(date!(2025 - 08 - 09)));
        assert_eq!(late.due(), Some(date!(2025 - 08 - 10)));
        let early = successor(line, Some(date!(2025 - 08 - 01)));
        assert_eq!(early.due(), Some(date!(2025 - 08 - 02)));
    }

    #[test]
    fn original_date_mode_ignores_completion() {
        let line = "- [ ] Water plants 🔁 every day 📅 2025-08-05";
        for completed in [date!(2025 - 08 - 01), date!(2025 - 08 - 09)] {
            assert_eq!(successor(line, Some(completed)).due(), Some(date!(2025 - 08 - 06)));
        }
    }

    #[test]
    fn every_present_date_moves_by_the_same_delta() {
        let next = successor(
            "- [ ] Report 🔁 every week 🛫 2025-08-01 ⏳ 2025-08-03 📅 2025-08-05",
            None,
        );
        assert_eq!(next.start(), Some(date!(2025 - 08 - 08)));
        assert_eq!(next.scheduled(), Some(date!(2025 - 08 - 10)));
        assert_eq!(next.due(), Some(date!(2025 - 08 - 12)));
    }

    #[test]
    fn when_done_keeps_offsets_from_the_primary_date() {
        let next = successor(
            "- [ ] Report 🔁 every week when done 🛫 2025-08-01 ⏳ 2025-08-03 📅 2025-08-05",
            Some(date!(2025 - 08 - 10)),
        );
        assert_eq!(next.due(), Some(date!(2025 - 08 - 17)));
        assert_eq!(next.scheduled(), Some(date!(2025 - 08 - 15)));
        assert_eq!(next.start(), Some(date!(2025 - 08 - 13)));
    }

    #[test]
    fn scheduled_only_task_keeps_only_scheduled() {
        let next = successor("- [ ] Stretch 🔁 every 2 days ⏳ 2025-08-05", None);
        assert_eq!(next.scheduled(), Some(date!(2025 - 08 - 07)));
        assert_eq!(next.due(), None);
    }

    #[test]
    fn dateless_when_done_task_gets_a_due_date() {
        let next = successor("- [x] Call mom 🔁 every week when done", Some(date!(2025 - 08 - 05)));
        assert_eq!(next.due(), Some(date!(2025 - 08 - 12)));
    }

    #[test]
    fn successor_is_reset_and_rendered() {
        let next = successor(
            "  - [x] Weekly review ⏫ 🔁 every week 📅 2025-08-05 ✅ 2025-08-05 #work",
            Some(date!(2025 - 08 - 05)),
        );
        assert_eq!(next.status(), Status::Incomplete);
        assert_eq!(next.status_symbol(), ' ');
        assert_eq!(next.done(), None);
        assert_eq!(next.id().line(), 4);
        assert_eq!(
            next.original_markdown(),
            "  - [ ] Weekly review #work ⏫ 🔁 every week 📅 2025-08-12"
        );
        assert!((next.urgency() - (6.0 + 8.8 - 7.0 * (12.0 - 2.4) / 21.0)).abs() < 1e-9);
    }

    #[test]
    fn complex_rules_flow_through() {
        let next = successor("- [ ] Payroll 🔁 every month on the last Friday 📅 2025-08-05", None);
        assert_eq!(next.due(), Some(date!(2025 - 08 - 29)));
    }

    #[test]
    fn failures_are_typed() {
        assert_eq!(next_occurrence(&task("- [ ] Plain 📅 2025-08-05"), None, TODAY), Ok(None));
        assert!(matches!(
            next_occurrence(&task("- [ ] Nope 🔁 sometimes 📅 2025-08-05"), None, TODAY),
            Err(TaskError::UnparseableRecurrence(_))
        ));
        assert!(matches!(
            next_occurrence(&task("- [ ] Floating 🔁 every week"), None, TODAY),
            Err(TaskError::UnparseableRecurrence(_))
        ));
    }
}
