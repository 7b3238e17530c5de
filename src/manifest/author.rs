//! Authorship records.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::util::Symbol;

/// A person credited on a manifest.
///
/// Identity is the tag: two records with the same tag name the same
/// person, whatever the other fields say. That keeps contributor lists
/// deduplicated even when entries differ in detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    /// Short unique handle, e.g. `jnaut`.
    tag: Symbol,

    /// Full display name.
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    company: Option<String>,

    /// First release this person worked on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    since_version: Option<Version>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    since_date: Option<NaiveDate>,
}

impl Author {
    /// Create an author from a handle and a display name.
    pub fn new(tag: impl AsRef<str>, name: impl Into<String>) -> Self {
        Author {
            tag: Symbol::new(tag),
            name: name.into(),
            email: None,
            company: None,
            since_version: None,
            since_date: None,
        }
    }

    /// Set the contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the employing company.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Record the first release this person worked on.
    pub fn since(mut self, version: Version, date: NaiveDate) -> Self {
        self.since_version = Some(version);
        self.since_date = Some(date);
        self
    }

    /// Get the unique handle.
    pub fn tag(&self) -> Symbol {
        self.tag
    }

    /// Get the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn since_version(&self) -> Option<&Version> {
        self.since_version.as_ref()
    }

    pub fn since_date(&self) -> Option<NaiveDate> {
        self.since_date
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for Author {}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.email {
            Some(email) => write!(f, "{} <{}>", self.name, email),
            None => write!(f, "{}", self.name),
        }
    }
}
