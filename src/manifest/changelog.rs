//! Release history entries.

use std::fmt;

use chrono::NaiveDate;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::manifest::author::Author;

/// One release in a manifest's history.
///
/// Changelogs are kept oldest first, so the last entry describes the
/// current release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    version: Version,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<Author>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
}

impl ChangelogEntry {
    /// Create an entry for a released version.
    pub fn new(version: Version) -> Self {
        ChangelogEntry {
            version,
            date: None,
            author: None,
            notes: Vec::new(),
        }
    }

    /// Set the release date.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the author of the release.
    pub fn by(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    /// Append one release note line.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

impl fmt::Display for ChangelogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)?;
        match (self.date, &self.author) {
            (Some(date), Some(author)) => write!(f, " ({}, {})", date, author.name()),
            (Some(date), None) => write!(f, " ({})", date),
            (None, Some(author)) => write!(f, " ({})", author.name()),
            (None, None) => Ok(()),
        }
    }
}
