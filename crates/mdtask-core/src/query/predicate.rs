//! Filter predicates.
//!
//! Each recognizer inspects a lowercased filter atom and either claims it,
//! returning a [`Predicate`], or passes. Recognizers are tried in order and a
//! plain description substring test is the last resort, so no atom is ever
//! rejected.

use std::cmp::Ordering;

use time::Date;

use crate::date::{add_days, parse_date};
use crate::markers::DateField;
use crate::text_matcher::TextMatcher;
use crate::urgency::priority_component;
use crate::{Priority, Status, Task};

/// Tolerance for `urgency is <n>`.
pub const URGENCY_TOLERANCE: f64 = 0.01;

/// Status selections understood by the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// `done`: complete tasks.
    Done,
    /// `not done`: incomplete or in-progress tasks.
    NotDone,
    /// `cancelled`.
    Cancelled,
    /// `in progress`.
    InProgress,
    /// `status is <name>`.
    Is(Status),
}

impl StatusFilter {
    fn matches(self, status: Status) -> bool {
        match self {
            Self::Done => status == Status::Complete,
            Self::NotDone => matches!(status, Status::Incomplete | Status::InProgress),
            Self::Cancelled => status == Status::Cancelled,
            Self::InProgress => status == Status::InProgress,
            Self::Is(expected) => status == expected,
        }
    }
}

/// How a date field is compared against a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateComparison {
    /// Strictly earlier.
    Before,
    /// Strictly later.
    After,
    /// Same day.
    On,
}

/// One filter atom.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Status selection.
    Status(StatusFilter),
    /// `has <x> date` / `no <x> date`.
    HasDate {
        /// Field inspected.
        field: DateField,
        /// Whether the field must be present.
        present: bool,
    },
    /// `<x> before|after|on <date>`. An unreadable literal matches nothing.
    Date {
        /// Field compared.
        field: DateField,
        /// Comparison applied.
        comparison: DateComparison,
        /// Resolved literal.
        date: Option<Date>,
    },
    /// `has tags` / `no tags`.
    HasTags(bool),
    /// `tag includes <text>`.
    TagIncludes(TextMatcher),
    /// `has tag <name>`, compared without the leading `#`.
    HasTag(String),
    /// `path includes|does not include <text>`.
    Path {
        /// Substring looked up in the document path.
        matcher: TextMatcher,
        /// Inverts the match.
        negated: bool,
    },
    /// `description includes|does not include <text>`.
    Description {
        /// Substring looked up in the description.
        matcher: TextMatcher,
        /// Inverts the match.
        negated: bool,
    },
    /// `priority is <level>|none`.
    PriorityIs(Option<Priority>),
    /// `priority above|below <level>|none`.
    PriorityRank {
        /// Ordering the task's level must have relative to `level`.
        ordering: Ordering,
        /// Reference level.
        level: Option<Priority>,
    },
    /// `urgency above|below|is <n>`.
    Urgency {
        /// Ordering the task's urgency must have relative to `value`.
        ordering: Ordering,
        /// Reference value.
        value: f64,
    },
    /// Fallback: description substring. A blank atom matches everything.
    Text(Option<TextMatcher>),
}

type Recognizer = fn(&str, Date) -> Option<Predicate>;

const RECOGNIZERS: &[Recognizer] = &[
    recognize_status,
    recognize_date_presence,
    recognize_date_comparison,
    recognize_tags,
    recognize_path,
    recognize_description,
    recognize_priority,
    recognize_urgency,
];

impl Predicate {
    /// Classify an atom of filter text.
    #[must_use]
    pub fn parse(text: &str, today: Date) -> Self {
        let normalized = text.trim().to_lowercase();
        RECOGNIZERS
            .iter()
            .find_map(|recognize| recognize(&normalized, today))
            .unwrap_or_else(|| Self::Text(TextMatcher::new(text)))
    }

    /// Evaluate the predicate against one task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::Status(filter) => filter.matches(task.status()),
            Self::HasDate { field, present } => task.date(*field).is_some() == *present,
            Self::Date {
                field,
                comparison,
                date,
            } => match (task.date(*field), date) {
                (Some(actual), Some(expected)) => match comparison {
                    DateComparison::Before => actual < *expected,
                    DateComparison::After => actual > *expected,
                    DateComparison::On => actual == *expected,
                },
                _ => false,
            },
            Self::HasTags(present) => task.tags().is_empty() != *present,
            Self::TagIncludes(matcher) => matcher.matches_any_tag(task),
            Self::HasTag(name) => task
                .tags()
                .iter()
                .any(|tag| tag.trim_start_matches('#').to_lowercase() == *name),
            Self::Path { matcher, negated } => matcher.matches_path(task) != *negated,
            Self::Description { matcher, negated } => {
                matcher.matches_description(task) != *negated
            }
            Self::PriorityIs(level) => task.priority() == *level,
            Self::PriorityRank { ordering, level } => {
                priority_component(task.priority()).total_cmp(&priority_component(*level)) == *ordering
            }
            Self::Urgency { ordering, value } => match ordering {
                Ordering::Equal => (task.urgency() - value).abs() < URGENCY_TOLERANCE,
                Ordering::Greater => task.urgency() > *value,
                Ordering::Less => task.urgency() < *value,
            },
            Self::Text(matcher) => matcher
                .as_ref()
                .is_none_or(|matcher| matcher.matches_description(task)),
        }
    }

    /// Whether the predicate explicitly asks for non-task lines.
    #[must_use]
    pub const fn selects_non_tasks(&self) -> bool {
        matches!(self, Self::Status(StatusFilter::Is(Status::NonTask)))
    }
}

/// Resolve a date literal: `YYYY-MM-DD`, `today`, `tomorrow` or `yesterday`.
#[must_use]
pub fn parse_date_literal(raw: &str, today: Date) -> Option<Date> {
    match raw.trim() {
        "today" => Some(today),
        "tomorrow" => add_days(today, 1),
        "yesterday" => add_days(today, -1),
        other => parse_date(other),
    }
}

fn recognize_status(text: &str, _today: Date) -> Option<Predicate> {
    let filter = match text {
        "done" => StatusFilter::Done,
        "not done" => StatusFilter::NotDone,
        "cancelled" | "canceled" => StatusFilter::Cancelled,
        "in progress" => StatusFilter::InProgress,
        _ => StatusFilter::Is(Status::from_name(text.strip_prefix("status is ")?)?),
    };
    Some(Predicate::Status(filter))
}

fn recognize_date_presence(text: &str, _today: Date) -> Option<Predicate> {
    DateField::ALL.into_iter().find_map(|field| {
        let keyword = field.keyword();
        if text == format!("has {keyword} date") {
            Some(Predicate::HasDate {
                field,
                present: true,
            })
        } else if text == format!("no {keyword} date") {
            Some(Predicate::HasDate {
                field,
                present: false,
            })
        } else {
            None
        }
    })
}

fn recognize_date_comparison(text: &str, today: Date) -> Option<Predicate> {
    DateField::ALL.into_iter().find_map(|field| {
        let rest = text.strip_prefix(field.keyword())?.strip_prefix(' ')?.trim();
        let explicit = [
            ("before ", DateComparison::Before),
            ("after ", DateComparison::After),
            ("on ", DateComparison::On),
        ]
        .into_iter()
        .find_map(|(prefix, comparison)| {
            rest.strip_prefix(prefix)
                .map(|literal| (comparison, parse_date_literal(literal, today)))
        });
        let (comparison, date) = match explicit {
            Some(found) => found,
            // A bare literal only counts when it actually reads as a date.
            None => (DateComparison::On, Some(parse_date_literal(rest, today)?)),
        };
        Some(Predicate::Date {
            field,
            comparison,
            date,
        })
    })
}

fn recognize_tags(text: &str, _today: Date) -> Option<Predicate> {
    match text {
        "has tags" => return Some(Predicate::HasTags(true)),
        "no tags" => return Some(Predicate::HasTags(false)),
        _ => {}
    }
    if let Some(needle) = text
        .strip_prefix("tag includes ")
        .or_else(|| text.strip_prefix("tags include "))
    {
        return TextMatcher::new(needle).map(Predicate::TagIncludes);
    }
    let name = text.strip_prefix("has tag ")?.trim().trim_start_matches('#');
    (!name.is_empty()).then(|| Predicate::HasTag(name.to_owned()))
}

fn includes_clause(text: &str, subject: &str) -> Option<(TextMatcher, bool)> {
    let rest = text.strip_prefix(subject)?.strip_prefix(' ')?;
    if let Some(needle) = rest.strip_prefix("does not include ") {
        return TextMatcher::new(needle).map(|matcher| (matcher, true));
    }
    let needle = rest.strip_prefix("includes ")?;
    TextMatcher::new(needle).map(|matcher| (matcher, false))
}

fn recognize_path(text: &str, _today: Date) -> Option<Predicate> {
    includes_clause(text, "path").map(|(matcher, negated)| Predicate::Path { matcher, negated })
}

fn recognize_description(text: &str, _today: Date) -> Option<Predicate> {
    includes_clause(text, "description")
        .map(|(matcher, negated)| Predicate::Description { matcher, negated })
}

fn parse_level(raw: &str) -> Option<Option<Priority>> {
    let raw = raw.trim();
    if raw == "none" {
        return Some(None);
    }
    Priority::from_name(raw).map(Some)
}

fn recognize_priority(text: &str, _today: Date) -> Option<Predicate> {
    let rest = text.strip_prefix("priority ")?;
    if let Some(level) = rest.strip_prefix("is ") {
        return parse_level(level).map(Predicate::PriorityIs);
    }
    let (ordering, level) = if let Some(level) = rest.strip_prefix("above ") {
        (Ordering::Greater, level)
    } else {
        (Ordering::Less, rest.strip_prefix("below ")?)
    };
    parse_level(level).map(|level| Predicate::PriorityRank { ordering, level })
}

fn recognize_urgency(text: &str, _today: Date) -> Option<Predicate> {
    let rest = text.strip_prefix("urgency ")?;
    let (ordering, number) = if let Some(number) = rest.strip_prefix("above ") {
        (Ordering::Greater, number)
    } else if let Some(number) = rest.strip_prefix("below ") {
        (Ordering::Less, number)
    } else {
        (Ordering::Equal, rest.strip_prefix("is ")?)
    };
    let value: f64 = number.trim().parse().ok()?;
    value
        .is_finite()
        .then_some(Predicate::Urgency { ordering, value })
}
