//! Line-oriented filter/sort query language.
//!
//! Every non-empty, non-comment line is either a `sort by` directive, a
//! `limit` directive, or a filter. Filters are ANDed across lines. Within a
//! line, ` AND `, ` OR ` and a leading `NOT ` are recognized (case-sensitive,
//! in that order, one form per line).

/// Filter atoms and their recognizers.
pub mod predicate;
/// `sort by` directives.
pub mod sort;

pub use predicate::{DateComparison, Predicate, StatusFilter, parse_date_literal};
pub use sort::{SortField, SortKey, sort_tasks};

use time::Date;
use tracing::debug;

use crate::{Status, Task};

/// One filter line.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A single atom.
    Single(Predicate),
    /// `a AND b AND ...`: every atom must match.
    All(Vec<Predicate>),
    /// `a OR b OR ...`: any atom may match.
    Any(Vec<Predicate>),
    /// `NOT a`.
    Not(Predicate),
}

impl Filter {
    /// Parse a filter line, keeping its original case for the combinators.
    #[must_use]
    pub fn parse(line: &str, today: Date) -> Self {
        if line.contains(" AND ") {
            Self::All(line.split(" AND ").map(|atom| Predicate::parse(atom, today)).collect())
        } else if line.contains(" OR ") {
            Self::Any(line.split(" OR ").map(|atom| Predicate::parse(atom, today)).collect())
        } else if let Some(rest) = line.strip_prefix("NOT ") {
            Self::Not(Predicate::parse(rest, today))
        } else {
            Self::Single(Predicate::parse(line, today))
        }
    }

    /// Evaluate the line against a task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::Single(predicate) => predicate.matches(task),
            Self::All(predicates) => predicates.iter().all(|predicate| predicate.matches(task)),
            Self::Any(predicates) => predicates.iter().any(|predicate| predicate.matches(task)),
            Self::Not(predicate) => !predicate.matches(task),
        }
    }

    fn selects_non_tasks(&self) -> bool {
        match self {
            Self::Single(predicate) => predicate.selects_non_tasks(),
            Self::All(predicates) | Self::Any(predicates) => {
                predicates.iter().any(Predicate::selects_non_tasks)
            }
            Self::Not(_) => false,
        }
    }
}

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    filters: Vec<Filter>,
    sorts: Vec<SortKey>,
    limit: Option<usize>,
    include_non_tasks: bool,
}

impl Query {
    /// Parse query text. Never fails: unknown lines become description searches.
    #[must_use]
    pub fn parse(text: &str, today: Date) -> Self {
        let mut query = Self::default();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            let lowered = line.to_lowercase();
            if lowered.starts_with("sort by") {
                query.sorts.extend(SortKey::parse(&lowered));
                continue;
            }
            if let Some(limit) = parse_limit(&lowered) {
                query.limit = Some(limit);
                continue;
            }
            let filter = Filter::parse(line, today);
            query.include_non_tasks |= filter.selects_non_tasks();
            query.filters.push(filter);
        }
        debug!(
            filters = query.filters.len(),
            sorts = query.sorts.len(),
            limit = ?query.limit,
            "parsed query"
        );
        query
    }

    /// Keep non-task lines in the results even without an explicit status filter.
    #[must_use]
    pub fn with_non_tasks(mut self, include: bool) -> Self {
        self.include_non_tasks = self.include_non_tasks || include;
        self
    }

    /// Filter lines of the query.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Sort keys in textual order.
    #[must_use]
    pub fn sorts(&self) -> &[SortKey] {
        &self.sorts
    }

    /// Maximum number of results.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether a task passes every filter line.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        (self.include_non_tasks || task.status() != Status::NonTask)
            && self.filters.iter().all(|filter| filter.matches(task))
    }

    /// Filter, then sort, then truncate.
    #[must_use]
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut selected: Vec<Task> = tasks.iter().filter(|task| self.matches(task)).cloned().collect();
        sort_tasks(&mut selected, &self.sorts);
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Run query text over a task list.
#[must_use]
pub fn evaluate(tasks: &[Task], query: &str, today: Date) -> Vec<Task> {
    Query::parse(query, today).apply(tasks)
}

/// `limit 5` or `limit to 5 tasks`.
fn parse_limit(lowered: &str) -> Option<usize> {
    let rest = lowered.strip_prefix("limit ")?.trim();
    let rest = rest.strip_prefix("to ").unwrap_or(rest);
    let rest = rest.strip_suffix("tasks").unwrap_or(rest).trim();
    rest.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 08 - 05);

    const DOC: &str = "\
- [ ] Fix outage ⏫ 📅 2025-08-04
- [x] Archive logs 🔽 ✅ 2025-08-01
- [ ] Plan offsite 🔼 📅 2025-08-20
- [/] Draft memo
- [-] Old idea
- [?] Not really a task
";

    fn run(query: &str) -> Vec<String> {
        let tasks = parse_document(DOC, "work.md", TODAY);
        evaluate(&tasks, query, TODAY)
            .iter()
            .map(|task| task.description().to_owned())
            .collect()
    }

    #[test]
    fn filter_lines_are_anded() {
        assert_eq!(run("not done\npriority is high"), vec!["Fix outage"]);
    }

    #[test]
    fn or_returns_union() {
        assert_eq!(
            run("priority is high OR priority is medium"),
            vec!["Fix outage", "Plan offsite"]
        );
    }

    #[test]
    fn and_requires_every_atom() {
        assert_eq!(run("has due date AND due before 2025-08-10"), vec!["Fix outage"]);
    }

    #[test]
    fn upper_not_negates_the_atom() {
        let negated = run("NOT done");
        assert_eq!(negated, vec!["Fix outage", "Plan offsite", "Draft memo", "Old idea"]);
        let not_done = run("not done");
        assert_eq!(not_done, vec!["Fix outage", "Plan offsite", "Draft memo"]);
        assert!(not_done.iter().all(|entry| negated.contains(entry)));
    }

    #[test]
    fn combinators_are_case_sensitive() {
        assert!(run("priority is high or priority is medium").is_empty());
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        assert_eq!(run("# only open work\n\n// note\nnot done\nlimit 1"), vec!["Fix outage"]);
    }

    #[test]
    fn non_tasks_need_explicit_selection() {
        assert!(!run("").contains(&"Not really a task".to_owned()));
        assert_eq!(run("status is non-task"), vec!["Not really a task"]);
    }

    #[test]
    fn empty_query_sorts_by_urgency() {
        assert_eq!(
            run(""),
            vec!["Fix outage", "Plan offsite", "Draft memo", "Old idea", "Archive logs"]
        );
    }

    #[test]
    fn reverse_sort_and_limit() {
        assert_eq!(
            run("sort by urgency reverse\nlimit to 2 tasks"),
            vec!["Archive logs", "Draft memo"]
        );
    }

    #[test]
    fn limit_parsing() {
        assert_eq!(parse_limit("limit 3"), Some(3));
        assert_eq!(parse_limit("limit to 10 tasks"), Some(10));
        assert_eq!(parse_limit("limit many"), None);
        assert_eq!(parse_limit("limitless"), None);
    }
}
