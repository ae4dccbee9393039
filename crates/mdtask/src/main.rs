//! CLI entry point for mdtask.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use mdtask_app::{FsStore, ProjectConfig, TaskService};
use mdtask_core::date::parse_date;
use time::{Date, OffsetDateTime};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Checklist tasks inside Markdown notes.
#[derive(Parser, Debug)]
#[command(
    name = "mdtask",
    version,
    about = "mdtask: list, query and complete checklist tasks in Markdown notes"
)]
struct Cli {
    /// Vault root (defaults to current directory).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Date used as "today" (YYYY-MM-DD, defaults to the current UTC date).
    #[arg(long, value_parser = parse_day)]
    today: Option<Date>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks by path and line.
    List {
        /// Only documents whose path contains this text.
        #[arg(long)]
        path: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Filter and sort tasks with the query language.
    Query {
        /// Query text; lines are separated by newlines.
        #[arg(long, conflicts_with = "file")]
        query: Option<String>,
        /// Read the query from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Mark a task complete, inserting its successor when it repeats.
    Complete {
        /// Task identifier, `path:line`.
        #[arg(long)]
        task: String,
        /// Completion date (defaults to today).
        #[arg(long, value_parser = parse_day)]
        date: Option<Date>,
    },
}

/// Output format for task listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn parse_day(raw: &str) -> Result<Date, String> {
    parse_date(raw).ok_or_else(|| format!("expected YYYY-MM-DD, got '{raw}'"))
}

fn main() -> Result<()> {
    let Cli { root, today, cmd } = Cli::parse();
    install_tracing();

    let root = root.unwrap_or_else(|| PathBuf::from("."));
    let today = today.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let config = ProjectConfig::from_root(&root)?;
    let store = FsStore::open(&root, config.clone())?;
    let service = TaskService::new(store, config, today);
    commands::run(cmd, &service)
}

fn install_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Filter from `RUST_LOG` directives, falling back to INFO.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
