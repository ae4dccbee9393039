use crate::Task;
use crate::date::{format_date, parse_date};
use crate::markers::{self, DateField, RECURRENCE_MARKER, priority_marker};

/// Upper bound on stripping passes; each pass removes one trailing token.
const MAX_PASSES: usize = 16;

/// Order in which date fields are appended after priority and recurrence.
const EMIT_ORDER: [DateField; 5] = [
    DateField::Created,
    DateField::Start,
    DateField::Scheduled,
    DateField::Due,
    DateField::Done,
];

/// Remove trailing metadata tokens from a raw task body.
///
/// Tokens are peeled off the end one at a time (tags, priority, dated
/// markers, recurrence) until none is left or the pass limit is reached.
/// Trailing tags are collected and put back at the end, in their original
/// order, so the result can be re-rendered without duplicating any field.
#[must_use]
pub fn clean_description(body: &str) -> String {
    let mut text = body.trim_end().to_owned();
    let mut trailing_tags: Vec<String> = Vec::new();
    for _ in 0..MAX_PASSES {
        match strip_once(&text, &mut trailing_tags) {
            Some(stripped) => text = stripped,
            None => break,
        }
    }

    let mut description = text.trim().to_owned();
    if !trailing_tags.is_empty() {
        if !description.is_empty() {
            description.push(' ');
        }
        description.push_str(&trailing_tags.join(" "));
    }
    description
}

fn strip_once(text: &str, trailing_tags: &mut Vec<String>) -> Option<String> {
    if let Some(caps) = markers::TRAILING_TAG.captures(text) {
        let whole = caps.get(0)?;
        let tag = caps.get(1)?;
        trailing_tags.insert(0, tag.as_str().to_owned());
        return Some(cut(text, whole.start()));
    }
    if let Some(found) = markers::TRAILING_PRIORITY.find(text) {
        return Some(cut(text, found.start()));
    }
    for field in DateField::ALL {
        let Some(caps) = markers::trailing_date_token(field).captures(text) else {
            continue;
        };
        // Impossible dates are left in place as ordinary text.
        if caps.get(1).and_then(|m| parse_date(m.as_str())).is_some() {
            return Some(cut(text, caps.get(0)?.start()));
        }
    }
    strip_trailing_recurrence(text)
}

fn strip_trailing_recurrence(text: &str) -> Option<String> {
    let marker = markers::RECURRENCE.find_iter(text).last()?;
    let rest = &text[marker.end()..];
    if markers::RECURRENCE_STOP.is_match(rest) {
        return None;
    }
    Some(cut(text, marker.start()))
}

fn cut(text: &str, at: usize) -> String {
    text[..at].trim_end().to_owned()
}

/// Render the body of a task: clean description followed by its metadata
/// in fixed order (priority, recurrence, created, start, scheduled, due, done).
#[must_use]
pub fn serialize(task: &Task) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !task.description.is_empty() {
        parts.push(task.description.clone());
    }
    if let Some(priority) = task.priority {
        parts.push(priority_marker(priority).to_owned());
    }
    if let Some(rule) = &task.recurrence {
        parts.push(format!("{RECURRENCE_MARKER} {rule}"));
    }
    for field in EMIT_ORDER {
        if let Some(date) = task.date(field) {
            parts.push(format!("{} {}", field.canonical(), format_date(date)));
        }
    }
    parts.join(" ")
}

/// Render the full line, `<list-marker> [<status>] <body>`, without indentation.
#[must_use]
pub fn build_line(task: &Task) -> String {
    let body = serialize(task);
    if body.is_empty() {
        format!("{} [{}]", task.list_marker, task.status_symbol)
    } else {
        format!("{} [{}] {body}", task.list_marker, task.status_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;
    use time::Date;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 08 - 05);

    fn parse(line: &str) -> Task {
        parse_line(line, "todo.md", 1, TODAY).unwrap_or_else(|| panic!("expected a task: {line}"))
    }

    fn assert_same_fields(left: &Task, right: &Task) {
        assert_eq!(left.description(), right.description());
        assert_eq!(left.status_symbol(), right.status_symbol());
        assert_eq!(left.tags(), right.tags());
        for field in DateField::ALL {
            assert_eq!(left.date(field), right.date(field), "{field:?}");
        }
        assert_eq!(left.priority(), right.priority());
        assert_eq!(left.recurrence(), right.recurrence());
        assert!((left.urgency() - right.urgency()).abs() < f64::EPSILON);
    }

    #[test]
    fn strips_metadata_and_reappends_trailing_tags() {
        assert_eq!(
            clean_description("Review PR ⏫ #work 📅 2025-08-05 #urgent"),
            "Review PR #work #urgent"
        );
        assert_eq!(clean_description("Tags only #a #b"), "Tags only #a #b");
        assert_eq!(clean_description("#solo"), "#solo");
        assert_eq!(clean_description("plain"), "plain");
    }

    #[test]
    fn strips_recurrence_but_keeps_inner_text() {
        assert_eq!(
            clean_description("Weekly review 🔁 every week 📅 2025-08-05"),
            "Weekly review"
        );
        assert_eq!(
            clean_description("Mid 📅 2025-08-05 text stays"),
            "Mid 📅 2025-08-05 text stays"
        );
    }

    #[test]
    fn emits_metadata_in_fixed_order() {
        let task = parse("- [ ] Tidy 📅 2025-08-09 ⏳ 2025-08-08 🛫 2025-08-07 🔁 every week 🔼 #home");
        assert_eq!(
            build_line(&task),
            "- [ ] Tidy #home 🔼 🔁 every week 🛫 2025-08-07 ⏳ 2025-08-08 📅 2025-08-09"
        );
    }

    #[test]
    fn normalizes_marker_aliases() {
        let task = parse("- [ ] Alias 🔝 📆 2025-08-09 ⌛ 2025-08-08");
        assert_eq!(build_line(&task), "- [ ] Alias 🔺 ⏳ 2025-08-08 📅 2025-08-09");
    }

    #[test]
    fn canonical_line_is_unchanged() {
        let line = "- [ ] Weekly review 🔁 every week 📅 2025-08-05";
        assert_eq!(build_line(&parse(line)), line);
    }

    #[test]
    fn reparsing_rendered_lines_preserves_fields() {
        for line in [
            "- [ ] Weekly review 🔁 every week 📅 2025-08-05",
            "- [x] Done thing ✅ 2025-08-01 📅 2025-07-30",
            "* [/] Ship #release ⏫ ⏳ 2025-08-02 #q3",
            "1. [-] Dropped 🔽 ➕ 2025-06-01",
            "- [?] Odd symbol #x",
            "+ [ ] Repeat 🔁 every month on the last friday when done 🛫 2025-08-01",
            "- [ ] Two priorities ⏬ then ⏫",
            "- [ ]",
        ] {
            let first = parse(line);
            let second = parse(&build_line(&first));
            assert_same_fields(&first, &second);
        }
    }
}
