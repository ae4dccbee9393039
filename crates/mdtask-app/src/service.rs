use anyhow::{Context, Result};
use mdtask_core::query::Query;
use mdtask_core::text_matcher::TextMatcher;
use mdtask_core::{Document, Status, SuccessorOutcome, Task, TaskId};
use time::Date;
use tracing::{info, warn};

use crate::config::ProjectConfig;
use crate::store::DocumentStore;

/// Service façade over a document store: listing, querying and completing tasks.
pub struct TaskService<S> {
    store: S,
    config: ProjectConfig,
    today: Date,
}

impl<S> TaskService<S> {
    /// Build a service. `today` drives urgency and relative date literals.
    pub const fn new(store: S, config: ProjectConfig, today: Date) -> Self {
        Self {
            store,
            config,
            today,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Date the service scores against.
    pub const fn today(&self) -> Date {
        self.today
    }
}

impl<S: DocumentStore> TaskService<S> {
    /// Every task line across all documents, including non-task lines.
    fn all_tasks(&self) -> Result<Vec<Task>> {
        let paths = self
            .store
            .list_documents()
            .map_err(Into::<anyhow::Error>::into)
            .context("failed to list documents")?;
        let mut tasks = Vec::new();
        for path in paths {
            let text = self
                .store
                .read(&path)
                .map_err(Into::<anyhow::Error>::into)
                .with_context(|| format!("failed to read {path}"))?;
            tasks.extend(Document::parse(&text).tasks(&path, self.today));
        }
        Ok(tasks)
    }

    /// List tasks ordered by path then line, optionally restricted to paths
    /// containing `path_filter` (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if a document cannot be listed or read.
    pub fn list(&self, path_filter: Option<&str>) -> Result<Vec<Task>> {
        let matcher = path_filter.and_then(TextMatcher::new);
        let mut tasks: Vec<Task> = self
            .all_tasks()?
            .into_iter()
            .filter(|task| self.config.include_non_tasks() || task.status() != Status::NonTask)
            .filter(|task| matcher.as_ref().is_none_or(|matcher| matcher.matches_path(task)))
            .collect();
        tasks.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(tasks)
    }

    /// Run a query over every task. Without query text the configured
    /// default query (or an empty query) is used.
    ///
    /// # Errors
    /// Returns an error if a document cannot be listed or read.
    pub fn query(&self, text: Option<&str>) -> Result<Vec<Task>> {
        let text = text.or_else(|| self.config.default_query()).unwrap_or_default();
        let query = Query::parse(text, self.today).with_non_tasks(self.config.include_non_tasks());
        Ok(query.apply(&self.all_tasks()?))
    }

    /// Complete the task identified by `path:line` and write the document back.
    ///
    /// `date` defaults to the service's `today`.
    ///
    /// # Errors
    /// Returns an error if the identifier is malformed, the line is not an
    /// open task, or the document cannot be read or written. Engine errors are
    /// [`mdtask_core::TaskError`] values reachable through `downcast_ref`.
    pub fn complete(&self, input: CompleteInput) -> Result<CompleteOutput> {
        let CompleteInput { task, date } = input;
        let id: TaskId = task.parse()?;
        let date = date.unwrap_or(self.today);

        let text = self
            .store
            .read(id.path())
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| format!("failed to read {}", id.path()))?;
        let (document, completion) = Document::parse(&text).complete(id.path(), id.line(), date, self.today)?;
        self.store
            .write(id.path(), &document.to_text())
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| format!("failed to write {}", id.path()))?;

        match &completion.successor {
            SuccessorOutcome::Created(next) => {
                info!(task = %id, successor = %next.id(), "completed task and created successor");
            }
            SuccessorOutcome::Skipped(err) => {
                warn!(task = %id, error = %err, "completed task; successor skipped");
            }
            SuccessorOutcome::NotRecurring => info!(task = %id, "completed task"),
        }

        Ok(CompleteOutput {
            completed: completion.completed,
            successor: completion.successor,
        })
    }
}

/// Input for [`TaskService::complete`].
#[derive(Debug, Clone)]
pub struct CompleteInput {
    /// Task identifier in `path:line` form.
    pub task: String,
    /// Completion date; `None` means today.
    pub date: Option<Date>,
}

/// Outcome of [`TaskService::complete`].
#[derive(Debug, Clone)]
pub struct CompleteOutput {
    /// The completed task as written.
    pub completed: Task,
    /// Successor handling.
    pub successor: SuccessorOutcome,
}
