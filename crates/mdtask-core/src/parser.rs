use time::Date;
use tracing::debug;

use crate::date::parse_date;
use crate::id::TaskId;
use crate::markers::{self, DateField};
use crate::serializer::clean_description;
use crate::{Priority, Status, Task};

/// Parse one line into a [`Task`], or `None` when the line is not a checklist item.
///
/// Metadata fields are extracted independently of each other; a missing or
/// malformed token only leaves its own field empty. The urgency is scored
/// against `today` before the task is returned.
#[must_use]
pub fn parse_line(line: &str, path: &str, line_number: usize, today: Date) -> Option<Task> {
    let caps = markers::LINE.captures(line)?;
    let status_symbol = caps.name("status")?.as_str().chars().next()?;
    let body = caps.name("body").map_or("", |m| m.as_str()).trim();

    let task = Task {
        id: TaskId::new(path, line_number),
        description: clean_description(body),
        status: Status::from_symbol(status_symbol),
        status_symbol,
        tags: extract_tags(body),
        due: extract_date(body, DateField::Due),
        scheduled: extract_date(body, DateField::Scheduled),
        start: extract_date(body, DateField::Start),
        created: extract_date(body, DateField::Created),
        done: extract_date(body, DateField::Done),
        priority: extract_priority(body),
        recurrence: extract_recurrence(body),
        urgency: 0.0,
        list_marker: caps.name("marker").map_or("-", |m| m.as_str()).to_owned(),
        indent: caps.name("indent").map_or("", |m| m.as_str()).to_owned(),
        original_markdown: line.to_owned(),
    };
    Some(task.rescored(today))
}

/// Parse every task line of a document. Non-task lines are skipped.
#[must_use]
pub fn parse_document(text: &str, path: &str, today: Date) -> Vec<Task> {
    let tasks: Vec<Task> = text
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_line(line, path, idx + 1, today))
        .collect();
    debug!(path, tasks = tasks.len(), "parsed document");
    tasks
}

fn extract_tags(body: &str) -> Vec<String> {
    markers::TAG
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_owned()))
        .collect()
}

/// First token of the field that carries a real calendar date.
fn extract_date(body: &str, field: DateField) -> Option<Date> {
    markers::date_token(field)
        .captures_iter(body)
        .find_map(|caps| caps.get(1).and_then(|m| parse_date(m.as_str())))
}

/// First priority marker in textual order wins.
fn extract_priority(body: &str) -> Option<Priority> {
    markers::PRIORITY
        .find(body)
        .and_then(|m| markers::priority_for(m.as_str()))
}

/// Text after 🔁 up to the next marker, tag, or end of line.
fn extract_recurrence(body: &str) -> Option<String> {
    let marker = markers::RECURRENCE.find(body)?;
    let rest = &body[marker.end()..];
    let end = markers::RECURRENCE_STOP
        .find(rest)
        .map_or(rest.len(), |stop| stop.start());
    let text = rest[..end].trim();
    (!text.is_empty()).then(|| text.to_owned())
}
