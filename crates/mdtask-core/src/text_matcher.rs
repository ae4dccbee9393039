use crate::Task;

/// Case-insensitive substring matcher for task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Normalize a query string into a matcher. Returns `None` for blank inputs.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    /// Whether the description contains the query.
    #[must_use]
    pub fn matches_description(&self, task: &Task) -> bool {
        self.matches_field(task.description())
    }

    /// Whether the document path contains the query.
    #[must_use]
    pub fn matches_path(&self, task: &Task) -> bool {
        self.matches_field(task.id().path())
    }

    /// Whether any tag contains the query.
    #[must_use]
    pub fn matches_any_tag(&self, task: &Task) -> bool {
        task.tags().iter().any(|tag| self.matches_field(tag))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}
