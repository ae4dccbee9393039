use std::{ffi::OsStr, fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const CONFIG_DIR: &str = ".mdtask";
const CONFIG_FILE: &str = "config.toml";

/// Vault configuration loaded from `.mdtask/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    extensions: Vec<String>,
    ignore: Vec<String>,
    default_query: Option<String>,
    include_non_tasks: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".into()],
            ignore: [".git", ".obsidian", ".trash", "node_modules"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            default_query: None,
            include_non_tasks: false,
        }
    }
}

impl ProjectConfig {
    /// Load configuration from the vault root. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let config_path = root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.normalize();
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
        Ok(config)
    }

    fn normalize(&mut self) {
        for extension in &mut self.extensions {
            *extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            bail!("`extensions` must list at least one file extension");
        }
        if self.extensions.iter().any(String::is_empty) {
            bail!("`extensions` must not contain empty entries");
        }
        Ok(())
    }

    /// Extensions (without the dot) of documents to scan.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Directory names skipped during discovery.
    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }

    /// Query used when none is given.
    pub fn default_query(&self) -> Option<&str> {
        self.default_query.as_deref()
    }

    /// Whether non-task lines are listed and queried by default.
    pub const fn include_non_tasks(&self) -> bool {
        self.include_non_tasks
    }

    /// Whether a file has one of the configured extensions.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }

    /// Whether a directory should be skipped.
    pub fn is_ignored(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.ignore.iter().any(|ignored| ignored == name))
    }
}
