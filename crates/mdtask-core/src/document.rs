use time::Date;
use tracing::debug;

use crate::date::format_date;
use crate::error::{Result, TaskError};
use crate::markers::{self, DateField};
use crate::parser::parse_line;
use crate::recurrence::next_occurrence;
use crate::{Status, Task};

/// What happened to the successor of a completed task.
#[derive(Debug, Clone, PartialEq)]
pub enum SuccessorOutcome {
    /// The task has no recurrence.
    NotRecurring,
    /// A successor was inserted directly below the completed line.
    Created(Task),
    /// The task repeats but no successor could be built; the completion still stands.
    Skipped(TaskError),
}

/// Result of completing one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Every line of the document after the change.
    pub lines: Vec<String>,
    /// The completed task as it now reads.
    pub completed: Task,
    /// Successor handling.
    pub successor: SuccessorOutcome,
}

impl Completion {
    /// The inserted successor, if any.
    #[must_use]
    pub const fn created(&self) -> Option<&Task> {
        match &self.successor {
            SuccessorOutcome::Created(task) => Some(task),
            SuccessorOutcome::NotRecurring | SuccessorOutcome::Skipped(_) => None,
        }
    }
}

/// Mark the task on `line_number` (1-based) complete and insert its successor.
///
/// The status character is replaced in place and a `✅ <date>` token is
/// appended unless the line already carries a completion date. A repeating
/// task gets its successor on the next line with the same indentation.
/// Failing to build the successor does not fail the completion.
///
/// # Errors
/// [`TaskError::LineOutOfRange`], [`TaskError::NotATask`] (including non-task
/// status characters) and [`TaskError::AlreadyComplete`].
pub fn complete_task_line(
    lines: &[String],
    path: &str,
    line_number: usize,
    completion_date: Date,
    today: Date,
) -> Result<Completion> {
    let out_of_range = TaskError::LineOutOfRange {
        line: line_number,
        len: lines.len(),
    };
    let index = line_number.checked_sub(1).ok_or_else(|| out_of_range.clone())?;
    let original = lines.get(index).ok_or(out_of_range)?;

    let not_a_task = TaskError::NotATask { line: line_number };
    let task = parse_line(original, path, line_number, today).ok_or_else(|| not_a_task.clone())?;
    match task.status() {
        Status::NonTask => return Err(not_a_task),
        Status::Complete => return Err(TaskError::AlreadyComplete { line: line_number }),
        Status::Incomplete | Status::Cancelled | Status::InProgress => {}
    }

    let rewritten = mark_done(original, task.done().is_none(), completion_date)
        .ok_or_else(|| not_a_task.clone())?;
    let completed = parse_line(&rewritten, path, line_number, today).ok_or(not_a_task)?;

    let mut updated = lines.to_vec();
    updated[index] = rewritten;
    let successor = match next_occurrence(&task, Some(completion_date), today) {
        Ok(None) => SuccessorOutcome::NotRecurring,
        Ok(Some(next)) => {
            updated.insert(index + 1, next.original_markdown().to_owned());
            SuccessorOutcome::Created(next)
        }
        Err(err) => {
            debug!(task = %task.id(), error = %err, "skipping successor");
            SuccessorOutcome::Skipped(err)
        }
    };

    Ok(Completion {
        lines: updated,
        completed,
        successor,
    })
}

fn mark_done(line: &str, stamp: bool, date: Date) -> Option<String> {
    let status = markers::LINE.captures(line)?.name("status")?;
    let mut rewritten = format!("{}x{}", &line[..status.start()], &line[status.end()..]);
    if stamp {
        let kept = rewritten.trim_end().len();
        rewritten.truncate(kept);
        rewritten.push_str(&format!(
            " {} {}",
            DateField::Done.canonical(),
            format_date(date)
        ));
    }
    Some(rewritten)
}

/// Terminator following one line of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LineEnding {
    #[default]
    Lf,
    CrLf,
    /// Last line of a document without a final newline.
    None,
}

impl LineEnding {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::None => "",
        }
    }
}

/// A whole document as an immutable list of lines.
///
/// Edits produce a new value. Every line keeps its own terminator, so mixed
/// line endings survive a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<String>,
    endings: Vec<LineEnding>,
}

impl Document {
    /// Split text into lines.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let (lines, endings) = text
            .split_inclusive('\n')
            .map(|piece| {
                if let Some(line) = piece.strip_suffix("\r\n") {
                    (line.to_owned(), LineEnding::CrLf)
                } else if let Some(line) = piece.strip_suffix('\n') {
                    (line.to_owned(), LineEnding::Lf)
                } else {
                    (piece.to_owned(), LineEnding::None)
                }
            })
            .unzip();
        Self { lines, endings }
    }

    /// Lines without their terminators.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Reassemble the text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .zip(&self.endings)
            .fold(String::new(), |mut text, (line, ending)| {
                text.push_str(line);
                text.push_str(ending.as_str());
                text
            })
    }

    /// Every task line, in document order.
    #[must_use]
    pub fn tasks(&self, path: &str, today: Date) -> Vec<Task> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| parse_line(line, path, idx + 1, today))
            .collect()
    }

    /// Complete one line, returning the new document and the outcome.
    ///
    /// The successor takes over the completed line's terminator; the
    /// completed line borrows the one above it when it had none.
    ///
    /// # Errors
    /// See [`complete_task_line`].
    pub fn complete(
        &self,
        path: &str,
        line_number: usize,
        completion_date: Date,
        today: Date,
    ) -> Result<(Self, Completion)> {
        let completion = complete_task_line(&self.lines, path, line_number, completion_date, today)?;
        let mut endings = self.endings.clone();
        if completion.created().is_some() {
            let index = line_number - 1;
            let own = endings[index];
            if own == LineEnding::None {
                endings[index] = index
                    .checked_sub(1)
                    .map_or(LineEnding::Lf, |above| endings[above]);
            }
            endings.insert(index + 1, own);
        }
        let document = Self {
            lines: completion.lines.clone(),
            endings,
        };
        Ok((document, completion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 08 - 05);

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    fn complete(text: &str, line: usize) -> Result<Completion> {
        complete_task_line(&lines(text), "todo.md", line, TODAY, TODAY)
    }

    #[test]
    fn weekly_review_spawns_its_successor() {
        let completion = complete("- [ ] Weekly review 🔁 every week 📅 2025-08-05", 1)
            .unwrap_or_else(|err| panic!("completion failed: {err}"));
        assert_eq!(
            completion.lines,
            vec![
                "- [x] Weekly review 🔁 every week 📅 2025-08-05 ✅ 2025-08-05".to_owned(),
                "- [ ] Weekly review 🔁 every week 📅 2025-08-12".to_owned(),
            ]
        );
        assert_eq!(completion.completed.status(), Status::Complete);
        assert_eq!(completion.completed.done(), Some(TODAY));
        assert_eq!(
            completion.created().map(|task| task.id().line()),
            Some(2)
        );
    }

    #[test]
    fn existing_done_date_is_kept() {
        let completion = complete("- [/] Draft ✅ 2025-08-01", 1)
            .unwrap_or_else(|err| panic!("completion failed: {err}"));
        assert_eq!(completion.lines, vec!["- [x] Draft ✅ 2025-08-01".to_owned()]);
        assert_eq!(completion.successor, SuccessorOutcome::NotRecurring);
    }

    #[test]
    fn successor_keeps_nesting() {
        let text = "- [ ] Project\n  > - [ ] Standup 🔁 every weekday 📅 2025-08-05\n- [ ] Next";
        let completion = complete(text, 2).unwrap_or_else(|err| panic!("completion failed: {err}"));
        assert_eq!(completion.lines.len(), 4);
        assert_eq!(completion.lines[2], "  > - [ ] Standup 🔁 every weekday 📅 2025-08-06");
        assert_eq!(completion.lines[3], "- [ ] Next");
    }

    #[test]
    fn unparseable_recurrence_still_completes() {
        let completion = complete("- [ ] Odd 🔁 whenever 📅 2025-08-05", 1)
            .unwrap_or_else(|err| panic!("completion failed: {err}"));
        assert_eq!(completion.lines.len(), 1);
        assert!(completion.lines[0].starts_with("- [x] Odd"));
        assert!(matches!(
            completion.successor,
            SuccessorOutcome::Skipped(TaskError::UnparseableRecurrence(_))
        ));
    }

    #[test]
    fn typed_failures() {
        let text = "# Notes\n- [x] Done already\n- [?] Maybe\n- [ ] Open";
        assert_eq!(complete(text, 1), Err(TaskError::NotATask { line: 1 }));
        assert_eq!(complete(text, 2), Err(TaskError::AlreadyComplete { line: 2 }));
        assert_eq!(complete(text, 3), Err(TaskError::NotATask { line: 3 }));
        assert_eq!(complete(text, 0), Err(TaskError::LineOutOfRange { line: 0, len: 4 }));
        assert_eq!(complete(text, 5), Err(TaskError::LineOutOfRange { line: 5, len: 4 }));
    }

    #[test]
    fn empty_body_gets_a_stamp() {
        let completion = complete("* [ ]", 1).unwrap_or_else(|err| panic!("completion failed: {err}"));
        assert_eq!(completion.lines, vec!["* [x] ✅ 2025-08-05".to_owned()]);
    }

    #[test]
    fn document_round_trips_line_endings() {
        for text in ["a\nb\n", "a\r\nb\r\n", "a\nb", "", "\n", "a\r\nb\nc"] {
            assert_eq!(Document::parse(text).to_text(), text, "{text:?}");
        }
    }

    #[test]
    fn document_completion_returns_a_new_value() {
        let document = Document::parse("intro\r\n- [ ] Pay rent 🔁 every month 📅 2025-01-31\r\n");
        let (updated, completion) = document
            .complete("home.md", 2, TODAY, TODAY)
            .unwrap_or_else(|err| panic!("completion failed: {err}"));
        assert_eq!(document.lines().len(), 2);
        assert_eq!(
            updated.to_text(),
            "intro\r\n- [x] Pay rent 🔁 every month 📅 2025-01-31 ✅ 2025-08-05\r\n\
             - [ ] Pay rent 🔁 every month 📅 2025-02-28\r\n"
        );
        assert!(completion.created().is_some());
        assert_eq!(updated.tasks("home.md", TODAY).len(), 2);
    }

    #[test]
    fn completion_keeps_untouched_line_endings() {
        let document = Document::parse("intro\n- [ ] Pay rent 🔁 every month 📅 2025-01-31\r\nlast\n");
        let (updated, _) = document
            .complete("home.md", 2, TODAY, TODAY)
            .unwrap_or_else(|err| panic!("completion failed: {err}"));
        assert_eq!(
            updated.to_text(),
            "intro\n- [x] Pay rent 🔁 every month 📅 2025-01-31 ✅ 2025-08-05\r\n\
             - [ ] Pay rent 🔁 every month 📅 2025-02-28\r\nlast\n"
        );
    }

    #[test]
    fn successor_after_unterminated_last_line() {
        let document = Document::parse("intro\r\n- [ ] Pay rent 🔁 every month 📅 2025-01-31");
        let (updated, _) = document
            .complete("home.md", 2, TODAY, TODAY)
            .unwrap_or_else(|err| panic!("completion failed: {err}"));
        assert_eq!(
            updated.to_text(),
            "intro\r\n- [x] Pay rent 🔁 every month 📅 2025-01-31 ✅ 2025-08-05\r\n\
             - [ ] Pay rent 🔁 every month 📅 2025-02-28"
        );
    }
}
