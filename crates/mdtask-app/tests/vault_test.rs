//! End-to-end tests against a vault directory on disk.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use mdtask_app::{CompleteInput, FsStore, ProjectConfig, StoreError, TaskService};
use mdtask_core::{SuccessorOutcome, TaskError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use time::Date;
use time::macros::date;

const TODAY: Date = date!(2025 - 08 - 05);

/// Test helper: a vault with a config file and a few notes.
fn setup_vault() -> TempDir {
    let dir = TempDir::with_prefix("mdtask-vault-test-").expect("create temp dir");
    let root = dir.path();

    fs::create_dir_all(root.join(".mdtask")).expect("create config dir");
    fs::write(
        root.join(".mdtask/config.toml"),
        "extensions = [\"md\", \"markdown\"]\nignore = [\"archive\"]\ndefault_query = \"not done\"\n",
    )
    .expect("write config");

    write(root, "daily/2025-08-05.md", "# Today\n- [ ] Standup 🔁 every weekday 📅 2025-08-05\n- [x] Coffee ✅ 2025-08-05\n");
    write(root, "projects/launch.markdown", "- [ ] Ship it ⏫ 📅 2025-08-04 #launch\n  - [/] Write notes\n");
    write(root, "archive/old.md", "- [ ] Forgotten 🔺\n");
    write(root, "scratch.txt", "- [ ] Not scanned\n");
    dir
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, contents).expect("write note");
}

fn open(dir: &TempDir) -> TaskService<FsStore> {
    let config = ProjectConfig::from_root(dir.path()).expect("load config");
    let store = FsStore::open(dir.path(), config.clone()).expect("open store");
    TaskService::new(store, config, TODAY)
}

#[test]
fn lists_tasks_from_configured_documents() {
    let dir = setup_vault();
    let service = open(&dir);
    let ids: Vec<String> = service
        .list(None)
        .unwrap()
        .iter()
        .map(|task| task.id().to_string())
        .collect();
    assert_eq!(
        ids,
        vec![
            "daily/2025-08-05.md:2",
            "daily/2025-08-05.md:3",
            "projects/launch.markdown:1",
            "projects/launch.markdown:2",
        ]
    );
}

#[test]
fn default_query_ranks_open_work() {
    let dir = setup_vault();
    let service = open(&dir);
    let tasks = service.query(None).unwrap();
    let descriptions: Vec<&str> = tasks.iter().map(|task| task.description()).collect();
    assert_eq!(descriptions, vec!["Ship it #launch", "Standup", "Write notes"]);
}

#[test]
fn completing_a_recurring_task_rewrites_the_file() {
    let dir = setup_vault();
    let service = open(&dir);
    let output = service
        .complete(CompleteInput {
            task: "daily/2025-08-05.md:2".into(),
            date: Some(date!(2025 - 08 - 05)),
        })
        .unwrap();
    assert!(matches!(output.successor, SuccessorOutcome::Created(_)));

    let text = fs::read_to_string(dir.path().join("daily/2025-08-05.md")).unwrap();
    assert_eq!(
        text,
        "# Today\n\
         - [x] Standup 🔁 every weekday 📅 2025-08-05 ✅ 2025-08-05\n\
         - [ ] Standup 🔁 every weekday 📅 2025-08-06\n\
         - [x] Coffee ✅ 2025-08-05\n"
    );
}

#[test]
fn completion_errors_surface_typed_causes() {
    let dir = setup_vault();
    let service = open(&dir);

    let err = service
        .complete(CompleteInput {
            task: "daily/2025-08-05.md:1".into(),
            date: None,
        })
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<TaskError>(),
        Some(&TaskError::NotATask { line: 1 })
    );

    let err = service
        .complete(CompleteInput {
            task: "../escape.md:1".into(),
            date: None,
        })
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::PathEscape(_))
    ));
}
