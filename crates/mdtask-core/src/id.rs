use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use crate::error::TaskError;

/// Identifier of a task: the document path and the 1-based line number.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct TaskId {
    path: String,
    line: usize,
}

impl TaskId {
    /// Build an identifier from its parts.
    #[must_use]
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Document path label.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 1-based line number.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Identifier of the line directly below this one.
    #[must_use]
    pub fn next_line(&self) -> Self {
        Self::new(self.path.clone(), self.line + 1)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

impl FromStr for TaskId {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TaskError::MalformedIdentifier(s.to_owned());
        // Split at the last colon so paths containing colons stay intact.
        let (path, line) = s.trim().rsplit_once(':').ok_or_else(malformed)?;
        if path.is_empty() {
            return Err(malformed());
        }
        let line: usize = line.trim().parse().map_err(|_| malformed())?;
        if line == 0 {
            return Err(malformed());
        }
        Ok(Self::new(path, line))
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
