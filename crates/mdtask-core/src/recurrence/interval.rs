use std::sync::LazyLock;

use regex::Regex;
use time::Date;

use super::NextDate;
use crate::date::{CalendarDay, add_days};
use crate::markers::compile;

static SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^every\s+(?:(\d+)\s+)?(day|week|month|year)s?$"));

/// Unit of a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Calendar days.
    Day,
    /// Seven-day weeks.
    Week,
    /// Calendar months.
    Month,
    /// Calendar years.
    Year,
}

/// `every [N] day(s)|week(s)|month(s)|year(s)`, computed by calendar arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Number of units, at least one.
    pub count: u32,
    /// Unit of the interval.
    pub unit: Unit,
}

impl Interval {
    /// Recognize a fixed-interval rule. Anything else is left to the rule expander.
    #[must_use]
    pub fn parse(rule: &str) -> Option<Self> {
        let caps = SIMPLE.captures(rule.trim())?;
        let count = match caps.get(1) {
            Some(raw) => raw.as_str().parse().ok()?,
            None => 1,
        };
        if count == 0 {
            return None;
        }
        let unit = match caps.get(2)?.as_str().to_ascii_lowercase().as_str() {
            "day" => Unit::Day,
            "week" => Unit::Week,
            "month" => Unit::Month,
            "year" => Unit::Year,
            _ => return None,
        };
        Some(Self { count, unit })
    }
}

impl NextDate for Interval {
    fn next_after(&self, anchor: Date) -> Option<CalendarDay> {
        let count = i64::from(self.count);
        match self.unit {
            Unit::Day => add_days(anchor, count).map(CalendarDay::of),
            Unit::Week => add_days(anchor, count * 7).map(CalendarDay::of),
            Unit::Month => CalendarDay::of(anchor).plus_months(count),
            Unit::Year => CalendarDay::of(anchor).plus_months(count * 12),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;
    use time::macros::date;

    fn interval(rule: &str) -> Interval {
        Interval::parse(rule).unwrap_or_else(|| panic!("expected a simple rule: {rule}"))
    }

    #[test]
    fn recognizes_fixed_intervals() {
        assert_eq!(interval("every day"), Interval { count: 1, unit: Unit::Day });
        assert_eq!(interval("Every 2 Weeks"), Interval { count: 2, unit: Unit::Week });
        assert_eq!(interval("every 3 months"), Interval { count: 3, unit: Unit::Month });
        assert_eq!(interval("every year"), Interval { count: 1, unit: Unit::Year });
    }

    #[test]
    fn leaves_everything_else_to_the_expander() {
        for rule in [
            "every weekday",
            "every week on monday",
            "every other day",
            "every 0 days",
            "each day",
            "every month on the 1st",
        ] {
            assert!(Interval::parse(rule).is_none(), "{rule}");
        }
    }

    #[test]
    fn month_arithmetic_keeps_overflowing_day() {
        let next = interval("every month")
            .next_after(date!(2025 - 01 - 31))
            .unwrap_or_else(|| panic!("next date must exist"));
        assert_eq!(
            next,
            CalendarDay {
                year: 2025,
                month: Month::February,
                day: 31
            }
        );
        assert_eq!(next.clamp(), Some(date!(2025 - 02 - 28)));
    }

    #[test]
    fn year_arithmetic_from_leap_day() {
        let next = interval("every year")
            .next_after(date!(2024 - 02 - 29))
            .and_then(CalendarDay::clamp);
        assert_eq!(next, Some(date!(2025 - 02 - 28)));
    }

    #[test]
    fn day_and_week_arithmetic() {
        let next = interval("every 10 days")
            .next_after(date!(2025 - 12 - 25))
            .and_then(CalendarDay::clamp);
        assert_eq!(next, Some(date!(2026 - 01 - 04)));
        let next = interval("every 2 weeks")
            .next_after(date!(2025 - 08 - 05))
            .and_then(CalendarDay::clamp);
        assert_eq!(next, Some(date!(2025 - 08 - 19)));
    }
}
