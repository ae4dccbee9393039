//! Deterministic urgency score.
//!
//! The score is the sum of four independent components (due date, priority,
//! scheduled date, start date). "Today" is always passed in explicitly.

use time::Date;

use crate::date::days_between;
use crate::{Priority, Task};

/// Due component for tasks overdue by seven days or more.
pub const DUE_MAX: f64 = 12.0;
/// Due component for tasks due more than fourteen days out.
pub const DUE_MIN: f64 = 2.4;
/// Due component for tasks due today.
pub const DUE_TODAY: f64 = 8.8;
/// Change of the due component per day across the 21-day ramp.
pub const DUE_STEP: f64 = (DUE_MAX - DUE_MIN) / 21.0;
/// Priority component when the task has no priority marker.
pub const NO_PRIORITY: f64 = 1.95;
/// Bonus for tasks scheduled today or earlier.
pub const SCHEDULED_BONUS: f64 = 5.0;
/// Penalty for tasks that cannot start yet.
pub const FUTURE_START_PENALTY: f64 = -3.0;

/// Total urgency of a task relative to `today`.
#[must_use]
pub fn score(task: &Task, today: Date) -> f64 {
    due_component(task.due(), today)
        + priority_component(task.priority())
        + scheduled_component(task.scheduled(), today)
        + start_component(task.start(), today)
}

/// Contribution of the due date.
#[must_use]
pub fn due_component(due: Option<Date>, today: Date) -> f64 {
    let Some(due) = due else {
        return 0.0;
    };
    let days_until_due = days_between(today, due);
    if days_until_due <= -7 {
        return DUE_MAX;
    }
    if days_until_due > 14 {
        return DUE_MIN;
    }
    // Bounded to -6..=14 here, so the cast is exact.
    #[allow(clippy::cast_precision_loss)]
    let days = days_until_due as f64;
    (DUE_TODAY - days * DUE_STEP).clamp(DUE_MIN, DUE_MAX)
}

/// Contribution of the priority level; no priority sits between medium and low.
#[must_use]
pub const fn priority_component(priority: Option<Priority>) -> f64 {
    match priority {
        Some(Priority::Highest) => 9.0,
        Some(Priority::High) => 6.0,
        Some(Priority::Medium) => 3.9,
        None => NO_PRIORITY,
        Some(Priority::Low) => 0.0,
        Some(Priority::Lowest) => -1.8,
    }
}

/// Contribution of the scheduled date.
#[must_use]
pub fn scheduled_component(scheduled: Option<Date>, today: Date) -> f64 {
    match scheduled {
        Some(date) if date <= today => SCHEDULED_BONUS,
        _ => 0.0,
    }
}

/// Contribution of the start date.
#[must_use]
pub fn start_component(start: Option<Date>, today: Date) -> f64 {
    match start {
        Some(date) if date > today => FUTURE_START_PENALTY,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::add_days;
    use crate::parser::parse_line;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 08 - 05);

    fn due_in(days: i64) -> f64 {
        due_component(add_days(TODAY, days), TODAY)
    }

    fn parse(line: &str) -> Task {
        parse_line(line, "todo.md", 1, TODAY).unwrap_or_else(|| panic!("expected a task: {line}"))
    }

    #[test]
    fn due_today_scores_exactly_eight_point_eight() {
        assert!((due_in(0) - 8.8).abs() < f64::EPSILON);
    }

    #[test]
    fn due_component_caps_and_floors() {
        assert!((due_in(-7) - DUE_MAX).abs() < 1e-9);
        assert!((due_in(-10) - DUE_MAX).abs() < f64::EPSILON);
        assert!((due_in(-10) - due_in(-7)).abs() < 1e-9);
        assert!((due_in(14) - DUE_MIN).abs() < 1e-9);
        assert!((due_in(15) - DUE_MIN).abs() < f64::EPSILON);
        assert!((due_in(400) - DUE_MIN).abs() < f64::EPSILON);
        assert!((due_component(None, TODAY)).abs() < f64::EPSILON);
    }

    #[test]
    fn due_component_is_monotonic() {
        let mut previous = due_in(-30);
        for days in -29..=30 {
            let current = due_in(days);
            assert!(current <= previous, "day {days}: {current} > {previous}");
            previous = current;
        }
        assert!((due_in(1) - (8.8 - DUE_STEP)).abs() < 1e-9);
    }

    #[test]
    fn priority_ladder() {
        assert!((priority_component(Some(Priority::Highest)) - 9.0).abs() < f64::EPSILON);
        assert!((priority_component(None) - 1.95).abs() < f64::EPSILON);
        assert!(priority_component(None) > priority_component(Some(Priority::Low)));
        assert!((priority_component(Some(Priority::Lowest)) + 1.8).abs() < f64::EPSILON);
    }

    #[test]
    fn scheduled_and_start_components() {
        assert!((scheduled_component(Some(TODAY), TODAY) - 5.0).abs() < f64::EPSILON);
        assert!((scheduled_component(add_days(TODAY, -3), TODAY) - 5.0).abs() < f64::EPSILON);
        assert!(scheduled_component(add_days(TODAY, 1), TODAY).abs() < f64::EPSILON);
        assert!(start_component(Some(TODAY), TODAY).abs() < f64::EPSILON);
        assert!((start_component(add_days(TODAY, 2), TODAY) + 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bare_task_scores_no_priority_only() {
        let task = parse("- [ ] Nothing here #tagged");
        assert_eq!(task.urgency().to_bits(), 1.95_f64.to_bits());
    }

    #[test]
    fn components_add_up() {
        let task = parse("- [ ] Everything ⏫ 🛫 2025-08-10 ⏳ 2025-08-01 📅 2025-08-05");
        let expected = 8.8 + 6.0 + 5.0 - 3.0;
        assert!((task.urgency() - expected).abs() < 1e-9);
    }
}
