//! Application layer for mdtask.
//!
//! This crate wires the engine to a vault on disk: configuration, document
//! discovery and the list/query/complete service used by the CLI.

pub mod config;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use config::ProjectConfig;
pub use service::{CompleteInput, CompleteOutput, TaskService};
pub use store::{DocumentStore, FsStore, StoreError};
