//! Task microformat engine: parsing, scoring, querying and completing
//! checklist tasks embedded in plain-text documents.

/// Calendar helpers shared by every component.
pub mod date;
/// Whole-document values and the completion orchestrator.
pub mod document;
/// Error taxonomy.
pub mod error;
/// Identifier types.
pub mod id;
/// Marker grammar shared by the parser and the serializer.
pub mod markers;
/// Line parser.
pub mod parser;
/// Filter/sort query language.
pub mod query;
/// Next-occurrence calculation for repeating tasks.
pub mod recurrence;
/// Canonical line rendering.
pub mod serializer;
/// Case-insensitive substring matching.
pub mod text_matcher;
/// Urgency scoring.
pub mod urgency;

pub use crate::document::{Completion, Document, SuccessorOutcome, complete_task_line};
pub use crate::error::{Result, TaskError};
pub use crate::id::TaskId;
pub use crate::parser::{parse_document, parse_line};
pub use crate::query::{Query, evaluate};
pub use crate::recurrence::{RecurrenceSpec, next_occurrence};
pub use crate::serializer::{build_line, clean_description, serialize};

use serde::{Deserialize, Serialize};
use time::Date;

/// Completion state of a task, backed by the single bracketed status character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// `[ ]` and the tolerated `[>]` / `[!]` forms.
    Incomplete,
    /// `[x]` or `[X]`.
    Complete,
    /// `[-]`.
    Cancelled,
    /// `[/]`.
    InProgress,
    /// Any other character; the line keeps its shape but carries no reliable metadata.
    NonTask,
}

impl Status {
    /// Classify a raw status character.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Self {
        match symbol {
            'x' | 'X' => Self::Complete,
            '-' => Self::Cancelled,
            '/' => Self::InProgress,
            ' ' | '>' | '!' => Self::Incomplete,
            _ => Self::NonTask,
        }
    }

    /// Name used in query text and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
            Self::InProgress => "in_progress",
            Self::NonTask => "non_task",
        }
    }

    /// Parse a user-facing status name (`done`, `in progress`, `non-task`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "incomplete" | "todo" | "open" => Some(Self::Incomplete),
            "complete" | "completed" | "done" => Some(Self::Complete),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "in_progress" | "inprogress" => Some(Self::InProgress),
            "non_task" | "nontask" => Some(Self::NonTask),
            _ => None,
        }
    }
}

/// Named priority levels, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// 🔺 (also 🔝).
    Highest,
    /// ⏫.
    High,
    /// 🔼.
    Medium,
    /// 🔽.
    Low,
    /// ⏬.
    Lowest,
}

impl Priority {
    /// Every level, highest first.
    pub const ALL: [Self; 5] = [
        Self::Highest,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Lowest,
    ];

    /// Lowercase level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Highest => "highest",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Lowest => "lowest",
        }
    }

    /// Parse a level name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
    }
}

/// One checklist line, parsed into its fields.
///
/// Tasks are snapshots: they are rebuilt from text on every parse and never
/// edited in place. The urgency is computed when the snapshot is built and is
/// only reachable through [`Task::urgency`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    id: TaskId,
    description: String,
    status: Status,
    status_symbol: char,
    tags: Vec<String>,
    #[serde(with = "date::serde_opt")]
    due: Option<Date>,
    #[serde(with = "date::serde_opt")]
    scheduled: Option<Date>,
    #[serde(with = "date::serde_opt")]
    start: Option<Date>,
    #[serde(with = "date::serde_opt")]
    created: Option<Date>,
    #[serde(with = "date::serde_opt")]
    done: Option<Date>,
    priority: Option<Priority>,
    recurrence: Option<String>,
    urgency: f64,
    list_marker: String,
    indent: String,
    original_markdown: String,
}

impl Task {
    /// Identifier made of the document path and the 1-based line number.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Description with metadata removed and trailing tags re-appended.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Status derived from [`Task::status_symbol`].
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Raw status character between the brackets.
    #[must_use]
    pub const fn status_symbol(&self) -> char {
        self.status_symbol
    }

    /// `#tags` in order of appearance.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Due date (📅).
    #[must_use]
    pub const fn due(&self) -> Option<Date> {
        self.due
    }

    /// Scheduled date (⏳).
    #[must_use]
    pub const fn scheduled(&self) -> Option<Date> {
        self.scheduled
    }

    /// Start date (🛫).
    #[must_use]
    pub const fn start(&self) -> Option<Date> {
        self.start
    }

    /// Created date (➕).
    #[must_use]
    pub const fn created(&self) -> Option<Date> {
        self.created
    }

    /// Completion date (✅).
    #[must_use]
    pub const fn done(&self) -> Option<Date> {
        self.done
    }

    /// Priority level, `None` when the line has no priority marker.
    #[must_use]
    pub const fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Raw recurrence text following 🔁.
    #[must_use]
    pub fn recurrence(&self) -> Option<&str> {
        self.recurrence.as_deref()
    }

    /// Urgency score computed from the date and priority fields.
    #[must_use]
    pub const fn urgency(&self) -> f64 {
        self.urgency
    }

    /// List marker of the source line (`-`, `*`, `+`, `1.`, ...).
    #[must_use]
    pub fn list_marker(&self) -> &str {
        &self.list_marker
    }

    /// Leading whitespace and blockquote markers of the source line.
    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// The exact source line.
    #[must_use]
    pub fn original_markdown(&self) -> &str {
        &self.original_markdown
    }

    /// Value of a date field selected by kind.
    #[must_use]
    pub const fn date(&self, field: markers::DateField) -> Option<Date> {
        match field {
            markers::DateField::Due => self.due,
            markers::DateField::Scheduled => self.scheduled,
            markers::DateField::Start => self.start,
            markers::DateField::Created => self.created,
            markers::DateField::Done => self.done,
        }
    }

    /// First present of due, scheduled and start.
    #[must_use]
    pub const fn reference_date(&self) -> Option<Date> {
        match (self.due, self.scheduled, self.start) {
            (Some(date), _, _) | (None, Some(date), _) | (None, None, Some(date)) => Some(date),
            (None, None, None) => None,
        }
    }

    /// Recompute the urgency against `today`.
    #[must_use]
    pub fn rescored(mut self, today: Date) -> Self {
        self.urgency = urgency::score(&self, today);
        self
    }
}
