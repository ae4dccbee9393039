use std::{fs, path::Path};

use anyhow::{Context, Result};
use mdtask_app::{CompleteInput, DocumentStore, TaskService};
use mdtask_core::date::format_date;
use mdtask_core::{SuccessorOutcome, Task};

use crate::{Command, OutputFormat};

pub fn run<S: DocumentStore>(command: Command, service: &TaskService<S>) -> Result<()> {
    match command {
        Command::List { path, format } => {
            let tasks = service.list(path.as_deref())?;
            print_tasks(&tasks, format)
        }
        Command::Query {
            query,
            file,
            format,
        } => {
            let text = match (query, file) {
                (Some(query), _) => Some(query),
                (None, Some(file)) => Some(read_query(&file)?),
                (None, None) => None,
            };
            let tasks = service.query(text.as_deref())?;
            print_tasks(&tasks, format)
        }
        Command::Complete { task, date } => {
            let output = service.complete(CompleteInput { task, date })?;
            println!("completed: {}", output.completed.id());
            match output.successor {
                SuccessorOutcome::Created(next) => {
                    println!("created: {} {}", next.id(), next.original_markdown().trim_start());
                }
                SuccessorOutcome::Skipped(err) => println!("successor skipped: {err}"),
                SuccessorOutcome::NotRecurring => {}
            }
            Ok(())
        }
    }
}

fn read_query(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read query file {}", path.display()))
}

fn print_tasks(tasks: &[Task], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tasks)?),
        OutputFormat::Table if tasks.is_empty() => println!("No tasks found"),
        OutputFormat::Table => {
            for line in render_task_table(tasks) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn render_task_table(tasks: &[Task]) -> Vec<String> {
    let mut lines = vec![
        "ID | Status | Urgency | Due | Description".to_owned(),
        "-- | ------ | ------- | --- | -----------".to_owned(),
    ];
    lines.extend(tasks.iter().map(|task| {
        let due = task.due().map_or_else(|| "-".to_owned(), format_date);
        format!(
            "{} | {} | {:.2} | {} | {}",
            task.id(),
            task.status().as_str(),
            task.urgency(),
            due,
            task.description()
        )
    }));
    lines
}
