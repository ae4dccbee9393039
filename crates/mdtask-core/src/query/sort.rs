use std::cmp::Ordering;

use time::Date;
use tracing::debug;

use crate::Task;
use crate::urgency::priority_component;

/// Field a `sort by` directive orders on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Highest urgency first.
    Urgency,
    /// Earliest due date first.
    Due,
    /// Earliest scheduled date first.
    Scheduled,
    /// Earliest start date first.
    Start,
    /// Highest priority first.
    Priority,
    /// Alphabetical description.
    Description,
    /// Document path, then line number.
    Path,
}

/// One parsed `sort by` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Field compared.
    pub field: SortField,
    /// Inverts the natural direction.
    pub reverse: bool,
}

impl SortKey {
    /// Parse a lowercased directive such as `sort by urgency reverse`.
    /// Unknown fields are ignored.
    #[must_use]
    pub fn parse(directive: &str) -> Option<Self> {
        let rest = directive.strip_prefix("sort by")?.trim();
        let mut words = rest.split_whitespace();
        let field = match words.next() {
            None | Some("urgency") => SortField::Urgency,
            Some("due") => SortField::Due,
            Some("scheduled") => SortField::Scheduled,
            Some("start") => SortField::Start,
            Some("priority") => SortField::Priority,
            Some("description") => SortField::Description,
            Some("path") => SortField::Path,
            Some(other) => {
                debug!(field = other, "ignoring unknown sort field");
                return None;
            }
        };
        Some(Self {
            field,
            reverse: rest.contains("reverse"),
        })
    }

    /// Compare two tasks under this key.
    #[must_use]
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let natural = match self.field {
            SortField::Urgency => b.urgency().total_cmp(&a.urgency()),
            SortField::Due => return compare_dates(a.due(), b.due(), self.reverse),
            SortField::Scheduled => return compare_dates(a.scheduled(), b.scheduled(), self.reverse),
            SortField::Start => return compare_dates(a.start(), b.start(), self.reverse),
            SortField::Priority => {
                priority_component(b.priority()).total_cmp(&priority_component(a.priority()))
            }
            SortField::Description => a
                .description()
                .to_lowercase()
                .cmp(&b.description().to_lowercase()),
            SortField::Path => a.id().cmp(b.id()),
        };
        if self.reverse { natural.reverse() } else { natural }
    }
}

/// Dateless tasks go last in both directions.
fn compare_dates(a: Option<Date>, b: Option<Date>, reverse: bool) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) if reverse => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order tasks by the given keys; the first key has final precedence.
///
/// Keys are applied last to first with a stable sort, so earlier keys win
/// and later keys break ties. Without keys, tasks are ordered by descending
/// urgency.
pub fn sort_tasks(tasks: &mut [Task], keys: &[SortKey]) {
    if keys.is_empty() {
        let default = SortKey {
            field: SortField::Urgency,
            reverse: false,
        };
        tasks.sort_by(|a, b| default.compare(a, b));
        return;
    }
    for key in keys.iter().rev() {
        tasks.sort_by(|a, b| key.compare(a, b));
    }
}
