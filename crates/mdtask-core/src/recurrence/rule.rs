use time::{Date, Month, Weekday};

use super::NextDate;
use crate::date::{CalendarDay, add_days, days_between};

/// How far the day scan looks ahead, in years per interval step.
const SEARCH_YEARS: i64 = 10;

/// Period a rule repeats over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Every N days.
    Daily,
    /// Every N Monday-start weeks.
    Weekly,
    /// Every N calendar months.
    Monthly,
    /// Every N calendar years.
    Yearly,
}

/// A weekday, optionally restricted to its nth occurrence in the month
/// (or in the year for yearly rules without months). Negative counts from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayRule {
    /// Day of the week.
    pub weekday: Weekday,
    /// `Some(1)` for the first, `Some(-1)` for the last, `None` for every one.
    pub nth: Option<i8>,
}

/// A calendar rule covering weekday sets, ordinal weekdays, month days and months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Repetition period.
    pub frequency: Frequency,
    /// Period multiplier, at least one.
    pub interval: u32,
    /// Allowed weekdays; empty means unrestricted.
    pub weekdays: Vec<WeekdayRule>,
    /// Allowed days of month; negative counts from the end (`-1` is the last day).
    pub month_days: Vec<i8>,
    /// Allowed months; empty means unrestricted.
    pub months: Vec<Month>,
}

const WORKDAYS: [Weekday; 5] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
];

impl Rule {
    /// Parse `every ...` rule text. Returns `None` for anything outside the grammar.
    #[must_use]
    pub fn parse(rule: &str) -> Option<Self> {
        let lowered = rule.to_lowercase().replace(',', " ");
        let mut tokens = lowered
            .split_whitespace()
            .filter(|word| !matches!(*word, "the" | "and" | "of"))
            .peekable();

        if tokens.next()? != "every" {
            return None;
        }
        let interval = match tokens.peek() {
            Some(&"other") => {
                tokens.next();
                2
            }
            Some(word) if word.bytes().all(|b| b.is_ascii_digit()) => {
                let count: u32 = word.parse().ok()?;
                tokens.next();
                count
            }
            _ => 1,
        };
        if interval == 0 {
            return None;
        }

        let mut rule = Self {
            frequency: Frequency::Daily,
            interval,
            weekdays: Vec::new(),
            month_days: Vec::new(),
            months: Vec::new(),
        };
        let head = tokens.next()?;
        match head {
            "day" | "days" => rule.frequency = Frequency::Daily,
            "week" | "weeks" => rule.frequency = Frequency::Weekly,
            "month" | "months" => rule.frequency = Frequency::Monthly,
            "year" | "years" => rule.frequency = Frequency::Yearly,
            "weekday" | "weekdays" => {
                rule.frequency = Frequency::Weekly;
                rule.push_workdays();
            }
            other => {
                if let Some(weekday) = weekday_named(other) {
                    rule.frequency = Frequency::Weekly;
                    rule.weekdays.push(WeekdayRule { weekday, nth: None });
                } else if let Some(month) = month_named(other) {
                    rule.frequency = Frequency::Yearly;
                    rule.months.push(month);
                } else {
                    return None;
                }
            }
        }

        let mut pending: Option<i8> = None;
        for token in tokens {
            if let Some(weekday) = weekday_named(token) {
                if let Some(nth) = pending.take() {
                    if !(-5..=5).contains(&nth) {
                        return None;
                    }
                    rule.weekdays.push(WeekdayRule { weekday, nth: Some(nth) });
                } else {
                    rule.weekdays.push(WeekdayRule { weekday, nth: None });
                }
                continue;
            }
            match token {
                "last" => {
                    pending = Some(pending.map_or(-1, |nth| -nth));
                    continue;
                }
                "day" | "days" => {
                    rule.flush_month_day(pending.take())?;
                    continue;
                }
                _ => {}
            }
            if let Some(value) = ordinal(token) {
                rule.flush_month_day(pending.take())?;
                pending = Some(value);
                continue;
            }
            rule.flush_month_day(pending.take())?;
            match token {
                "on" | "in" => {}
                "weekday" | "weekdays" => rule.push_workdays(),
                other => rule.months.push(month_named(other)?),
            }
        }
        rule.flush_month_day(pending)?;
        Some(rule)
    }

    fn push_workdays(&mut self) {
        self.weekdays
            .extend(WORKDAYS.iter().map(|&weekday| WeekdayRule { weekday, nth: None }));
    }

    fn flush_month_day(&mut self, value: Option<i8>) -> Option<()> {
        if let Some(day) = value {
            if day == 0 || !(-31..=31).contains(&day) {
                return None;
            }
            self.month_days.push(day);
        }
        Some(())
    }

    /// Fill the parts the text left open from the anchor date.
    fn anchored(&self, anchor: Date) -> Self {
        let mut rule = self.clone();
        let anchor_day = i8::try_from(anchor.day()).unwrap_or(1);
        match rule.frequency {
            Frequency::Daily => {}
            Frequency::Weekly => {
                if rule.weekdays.is_empty() {
                    rule.weekdays.push(WeekdayRule {
                        weekday: anchor.weekday(),
                        nth: None,
                    });
                }
            }
            Frequency::Monthly => {
                if rule.weekdays.is_empty() && rule.month_days.is_empty() {
                    rule.month_days.push(anchor_day);
                }
            }
            Frequency::Yearly => {
                if rule.weekdays.is_empty() && rule.month_days.is_empty() {
                    if rule.months.is_empty() {
                        rule.months.push(anchor.month());
                    }
                    rule.month_days.push(anchor_day);
                }
            }
        }
        rule
    }

    /// Periods elapsed between the anchor and `date`.
    fn period_offset(&self, anchor: Date, date: Date) -> i64 {
        match self.frequency {
            Frequency::Daily => days_between(anchor, date),
            Frequency::Weekly => {
                days_between(week_start(anchor), week_start(date)).div_euclid(7)
            }
            Frequency::Monthly => month_index(date) - month_index(anchor),
            Frequency::Yearly => i64::from(date.year()) - i64::from(anchor.year()),
        }
    }

    fn matches(&self, date: Date) -> bool {
        let length = date.month().length(date.year());
        (self.months.is_empty() || self.months.contains(&date.month()))
            && (self.month_days.is_empty()
                || self
                    .month_days
                    .iter()
                    .any(|&day| resolve_month_day(day, length) == Some(date.day())))
            && (self.weekdays.is_empty()
                || self.weekdays.iter().any(|rule| {
                    rule.weekday == date.weekday()
                        && rule.nth.is_none_or(|nth| self.is_nth(nth, date))
                }))
    }

    fn is_nth(&self, nth: i8, date: Date) -> bool {
        let within_year = self.frequency == Frequency::Yearly && self.months.is_empty();
        let (position, remaining) = if within_year {
            let length = time::util::days_in_year(date.year());
            (date.ordinal(), length - date.ordinal())
        } else {
            let length = date.month().length(date.year());
            (u16::from(date.day()), u16::from(length - date.day()))
        };
        if nth > 0 {
            (position - 1) / 7 + 1 == u16::from(nth.unsigned_abs())
        } else {
            remaining / 7 + 1 == u16::from(nth.unsigned_abs())
        }
    }
}

impl NextDate for Rule {
    fn next_after(&self, anchor: Date) -> Option<CalendarDay> {
        let rule = self.anchored(anchor);
        let interval = i64::from(rule.interval);
        let horizon = interval * SEARCH_YEARS * 366;
        (1..=horizon)
            .map_while(|offset| add_days(anchor, offset))
            .find(|&date| {
                rule.period_offset(anchor, date).rem_euclid(interval) == 0 && rule.matches(date)
            })
            .map(CalendarDay::of)
    }
}

fn week_start(date: Date) -> Date {
    add_days(date, -i64::from(date.weekday().number_days_from_monday())).unwrap_or(date)
}

fn month_index(date: Date) -> i64 {
    i64::from(date.year()) * 12 + i64::from(u8::from(date.month()))
}

fn resolve_month_day(day: i8, length: u8) -> Option<u8> {
    let length = i16::from(length);
    let resolved = if day > 0 {
        i16::from(day)
    } else {
        length + i16::from(day) + 1
    };
    if (1..=length).contains(&resolved) {
        u8::try_from(resolved).ok()
    } else {
        None
    }
}

fn ordinal(token: &str) -> Option<i8> {
    let named = match token {
        "first" => Some(1),
        "second" => Some(2),
        "third" => Some(3),
        "fourth" => Some(4),
        "fifth" => Some(5),
        _ => None,
    };
    if named.is_some() {
        return named;
    }
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn weekday_named(token: &str) -> Option<Weekday> {
    let token = token.strip_suffix('s').filter(|t| t.len() > 3).unwrap_or(token);
    let weekday = match token {
        "monday" | "mon" => Weekday::Monday,
        "tuesday" | "tue" | "tues" => Weekday::Tuesday,
        "wednesday" | "wed" => Weekday::Wednesday,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thursday,
        "friday" | "fri" => Weekday::Friday,
        "saturday" | "sat" => Weekday::Saturday,
        "sunday" | "sun" => Weekday::Sunday,
        _ => return None,
    };
    Some(weekday)
}

fn month_named(token: &str) -> Option<Month> {
    let month = match token {
        "january" | "jan" => Month::January,
        "february" | "feb" => Month::February,
        "march" | "mar" => Month::March,
        "april" | "apr" => Month::April,
        "may" => Month::May,
        "june" | "jun" => Month::June,
        "july" | "jul" => Month::July,
        "august" | "aug" => Month::August,
        "september" | "sep" | "sept" => Month::September,
        "october" | "oct" => Month::October,
        "november" | "nov" => Month::November,
        "december" | "dec" => Month::December,
        _ => return None,
    };
    Some(month)
}
