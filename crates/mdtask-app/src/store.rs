//! Document storage: the only place that touches the filesystem.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::config::ProjectConfig;

/// Minimal storage abstraction required by [`TaskService`](crate::TaskService).
///
/// Documents are addressed by `/`-separated paths relative to the store root.
pub trait DocumentStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<anyhow::Error>;

    /// Every document path, sorted.
    ///
    /// # Errors
    /// Returns a store-specific error when discovery fails.
    fn list_documents(&self) -> Result<Vec<String>, Self::Error>;

    /// Full text of one document.
    ///
    /// # Errors
    /// Returns a store-specific error when the document cannot be read.
    fn read(&self, path: &str) -> Result<String, Self::Error>;

    /// Replace the full text of one document.
    ///
    /// # Errors
    /// Returns a store-specific error when the document cannot be written.
    fn write(&self, path: &str, contents: &str) -> Result<(), Self::Error>;
}

/// Errors that can occur during [`FsStore`] operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The path is absolute, climbs with `..`, or resolves outside the root.
    #[error("path escapes the vault root: {0}")]
    PathEscape(String),

    /// No document exists at the path.
    #[error("document not found: {0}")]
    NotFound(String),

    /// I/O operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Store reading documents from a directory tree.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    config: ProjectConfig,
}

impl FsStore {
    /// Open a store rooted at `root`, which must be an existing directory.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when the root cannot be resolved.
    pub fn open(root: impl AsRef<Path>, config: ProjectConfig) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|err| StoreError::io(root, err))?;
        Ok(Self { root, config })
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a relative document path onto the filesystem, refusing anything
    /// that would leave the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let escape = || StoreError::PathEscape(path.to_owned());
        let relative = Path::new(path);
        if path.is_empty() || relative.is_absolute() {
            return Err(escape());
        }
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return Err(escape());
        }

        let joined = self.root.join(relative);
        match joined.canonicalize() {
            Ok(resolved) if resolved.starts_with(&self.root) => Ok(resolved),
            Ok(_) => Err(escape()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_owned()))
            }
            Err(err) => Err(StoreError::io(&joined, err)),
        }
    }

    fn walk(&self, dir: &Path, found: &mut Vec<String>) -> Result<(), StoreError> {
        let entries = fs::read_dir(dir).map_err(|err| StoreError::io(dir, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io(dir, err))?;
            let path = entry.path();
            // Symlinks are not followed.
            let file_type = entry.file_type().map_err(|err| StoreError::io(&path, err))?;
            if file_type.is_dir() {
                if self.config.is_ignored(&entry.file_name()) {
                    debug!(dir = %path.display(), "skipping ignored directory");
                    continue;
                }
                self.walk(&path, found)?;
            } else if file_type.is_file() && self.config.matches_extension(&path) {
                if let Some(relative) = self.relative_label(&path) {
                    found.push(relative);
                }
            }
        }
        Ok(())
    }

    fn relative_label(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Option<Vec<&str>> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect();
        parts.map(|parts| parts.join("/"))
    }
}

impl DocumentStore for FsStore {
    type Error = StoreError;

    fn list_documents(&self) -> Result<Vec<String>, Self::Error> {
        let mut found = Vec::new();
        self.walk(&self.root, &mut found)?;
        found.sort();
        debug!(root = %self.root.display(), documents = found.len(), "discovered documents");
        Ok(found)
    }

    fn read(&self, path: &str) -> Result<String, Self::Error> {
        let resolved = self.resolve(path)?;
        fs::read_to_string(&resolved).map_err(|err| StoreError::io(&resolved, err))
    }

    fn write(&self, path: &str, contents: &str) -> Result<(), Self::Error> {
        let resolved = self.resolve(path)?;
        fs::write(&resolved, contents).map_err(|err| StoreError::io(&resolved, err))
    }
}
