//! Manifest nodes.
//!
//! A [`ManifestNode`] is the immutable metadata record of one code unit.
//! Nodes are built once with the `with_*` chain, shared behind `Arc`, and
//! never mutated afterwards; derived values (version, contributors,
//! summary) are computed from the stored fields on demand.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::location::Location;
use crate::manifest::author::Author;
use crate::manifest::changelog::ChangelogEntry;
use crate::manifest::dependency::DependencyEntry;
use crate::manifest::license::{Copyright, License};
use crate::manifest::policy::{AccessMode, AiAccess, Backend, Frontend, Status, ThreadSafety};
use crate::util::Symbol;

/// Immutable metadata record of one code unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestNode {
    location: Location,

    #[serde(default)]
    description: String,

    #[serde(default)]
    status: Status,

    /// Release history, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    changelog: Vec<ChangelogEntry>,

    /// This unit's own requirements, not including inherited ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<DependencyEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    authors: Vec<Author>,

    /// Unset means the authors maintain the unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maintainers: Option<Vec<Author>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    copyright: Option<Copyright>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    license: Option<License>,

    #[serde(default)]
    frontend: Frontend,

    #[serde(default)]
    backend: Backend,

    #[serde(default)]
    thread_safety: ThreadSafety,

    #[serde(default)]
    access_mode: AccessMode,

    #[serde(default)]
    ai_access: AiAccess,

    /// Free-form extras that have no dedicated field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    additional_info: BTreeMap<String, serde_json::Value>,

    #[serde(skip)]
    parent: Option<Arc<ManifestNode>>,
}

impl ManifestNode {
    /// Create a node with default metadata at a location.
    pub fn new(location: Location) -> Self {
        ManifestNode {
            location,
            description: String::new(),
            status: Status::default(),
            changelog: Vec::new(),
            dependencies: Vec::new(),
            authors: Vec::new(),
            maintainers: None,
            copyright: None,
            license: None,
            frontend: Frontend::default(),
            backend: Backend::default(),
            thread_safety: ThreadSafety::default(),
            access_mode: AccessMode::default(),
            ai_access: AiAccess::default(),
            additional_info: BTreeMap::new(),
            parent: None,
        }
    }

    /// Derive a child node of `parent` at `location`.
    ///
    /// The child starts as a copy of the parent, so every field the caller
    /// does not replace is inherited. Replacement is wholesale: a child
    /// that sets `dependencies` replaces the inherited list, it does not
    /// append to it.
    pub fn create_child(parent: &Arc<ManifestNode>, location: Location) -> ManifestNode {
        ManifestNode {
            location,
            parent: Some(Arc::clone(parent)),
            ..(**parent).clone()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_changelog(mut self, changelog: Vec<ChangelogEntry>) -> Self {
        self.changelog = changelog;
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<DependencyEntry>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_authors(mut self, authors: Vec<Author>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_maintainers(mut self, maintainers: Vec<Author>) -> Self {
        self.maintainers = Some(maintainers);
        self
    }

    pub fn with_copyright(mut self, copyright: Copyright) -> Self {
        self.copyright = Some(copyright);
        self
    }

    pub fn with_license(mut self, license: License) -> Self {
        self.license = Some(license);
        self
    }

    pub fn with_frontend(mut self, frontend: Frontend) -> Self {
        self.frontend = frontend;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_thread_safety(mut self, thread_safety: ThreadSafety) -> Self {
        self.thread_safety = thread_safety;
        self
    }

    pub fn with_access_mode(mut self, access_mode: AccessMode) -> Self {
        self.access_mode = access_mode;
        self
    }

    pub fn with_ai_access(mut self, ai_access: AiAccess) -> Self {
        self.ai_access = ai_access;
        self
    }

    /// Attach a free-form metadata value.
    pub fn with_info(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.additional_info.insert(key.into(), value);
        self
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Fully-qualified name of the described unit.
    pub fn fqn(&self) -> Symbol {
        self.location.fqn()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn changelog(&self) -> &[ChangelogEntry] {
        &self.changelog
    }

    /// This unit's own declared dependencies.
    pub fn dependencies(&self) -> &[DependencyEntry] {
        &self.dependencies
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    /// The maintainers, defaulting to the authors when none are set.
    pub fn maintainers(&self) -> &[Author] {
        match &self.maintainers {
            Some(maintainers) => maintainers,
            None => &self.authors,
        }
    }

    pub fn copyright(&self) -> Option<&Copyright> {
        self.copyright.as_ref()
    }

    pub fn license(&self) -> Option<&License> {
        self.license.as_ref()
    }

    pub fn frontend(&self) -> Frontend {
        self.frontend
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn thread_safety(&self) -> ThreadSafety {
        self.thread_safety
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    pub fn ai_access(&self) -> AiAccess {
        self.ai_access
    }

    pub fn additional_info(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.additional_info
    }

    pub fn parent(&self) -> Option<&Arc<ManifestNode>> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Current version: the newest changelog entry, if any.
    pub fn version(&self) -> Option<&Version> {
        self.changelog.last().map(|entry| entry.version())
    }

    /// Date of the first release.
    pub fn created(&self) -> Option<NaiveDate> {
        self.changelog.first().and_then(|entry| entry.date())
    }

    /// Date of the newest release.
    pub fn updated(&self) -> Option<NaiveDate> {
        self.changelog.last().and_then(|entry| entry.date())
    }

    /// Everyone credited on this unit: authors, maintainers, and changelog
    /// authors, deduplicated by tag in first-seen order.
    pub fn contributors(&self) -> Vec<Author> {
        let mut seen: Vec<Symbol> = Vec::new();
        let mut contributors: Vec<Author> = Vec::new();

        let changelog_authors = self.changelog.iter().filter_map(|entry| entry.author());
        let credited = self
            .authors
            .iter()
            .chain(self.maintainers())
            .chain(changelog_authors);

        for author in credited {
            if !seen.contains(&author.tag()) {
                seen.push(author.tag());
                contributors.push(author.clone());
            }
        }

        contributors
    }

    /// One-paragraph description of the unit.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.description.is_empty() {
            parts.push(self.description.clone());
        }
        if let Some(version) = self.version() {
            parts.push(format!("Version: {}", version));
        }
        if !self.authors.is_empty() {
            let names: Vec<&str> = self.authors.iter().map(|a| a.name()).collect();
            parts.push(format!("Authors: {}", names.join(", ")));
        }
        let maintainers = self.maintainers();
        if !maintainers.is_empty() {
            let names: Vec<&str> = maintainers.iter().map(|a| a.name()).collect();
            parts.push(format!("Maintainers: {}", names.join(", ")));
        }
        if let Some(ref license) = self.license {
            parts.push(format!("License: {}", license.name()));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("{}.", parts.join(". "))
        }
    }

    /// Serialize the node to a JSON value. The parent link is omitted.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl fmt::Display for ManifestNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.fqn(), self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::UnitPath;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_node() -> ManifestNode {
        ManifestNode::new(Location::module(UnitPath::new("acme.gauges")))
            .with_description("Depth and pressure gauges")
            .with_authors(vec![Author::new("jnaut", "Jo Naut")])
            .with_license(License::mit())
            .with_changelog(vec![
                ChangelogEntry::new(Version::new(0, 1, 0)).on(date(2024, 1, 10)),
                ChangelogEntry::new(Version::new(0, 2, 0))
                    .on(date(2024, 3, 1))
                    .by(Author::new("rvane", "Rin Vane")),
            ])
    }

    #[test]
    fn test_defaults() {
        let node = ManifestNode::new(Location::module(UnitPath::new("acme")));
        assert_eq!(node.description(), "");
        assert_eq!(node.status(), Status::Development);
        assert_eq!(node.thread_safety(), ThreadSafety::Unsafe);
        assert_eq!(node.access_mode(), AccessMode::Sync);
        assert_eq!(node.ai_access(), AiAccess::ALL);
        assert!(node.frontend().is_empty());
        assert!(node.backend().is_empty());
        assert!(node.version().is_none());
        assert!(node.is_root());
    }

    #[test]
    fn test_version_created_updated_from_changelog() {
        let node = sample_node();
        assert_eq!(node.version(), Some(&Version::new(0, 2, 0)));
        assert_eq!(node.created(), Some(date(2024, 1, 10)));
        assert_eq!(node.updated(), Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_maintainers_default_to_authors() {
        let node = sample_node();
        assert_eq!(node.maintainers(), node.authors());

        let with_own = sample_node().with_maintainers(vec![Author::new("mkeel", "Mo Keel")]);
        assert_eq!(with_own.maintainers().len(), 1);
        assert_eq!(with_own.maintainers()[0].name(), "Mo Keel");
    }

    #[test]
    fn test_contributors_dedup_by_tag() {
        let node = sample_node()
            .with_maintainers(vec![
                Author::new("jnaut", "Jo Naut (maintainer hat)"),
                Author::new("mkeel", "Mo Keel"),
            ]);

        let contributors = node.contributors();
        let tags: Vec<&str> = contributors.iter().map(|a| a.tag().as_str()).collect();
        assert_eq!(tags, ["jnaut", "mkeel", "rvane"]);
    }

    #[test]
    fn test_create_child_inherits_unset_fields() {
        let parent = Arc::new(sample_node());
        let child =
            ManifestNode::create_child(&parent, Location::module(UnitPath::new("acme.gauges.depth")))
                .with_description("Depth gauge");

        assert_eq!(child.description(), "Depth gauge");
        // Inherited wholesale from the parent.
        assert_eq!(child.authors(), parent.authors());
        assert_eq!(child.license(), parent.license());
        assert_eq!(child.version(), parent.version());
        assert_eq!(child.parent().map(|p| p.fqn()), Some(parent.fqn()));
        assert!(!child.is_root());
    }

    #[test]
    fn test_create_child_replaces_lists_wholesale() {
        let parent = Arc::new(
            sample_node().with_dependencies(vec![
                DependencyEntry::new("serde", Version::new(1, 0, 0)),
                DependencyEntry::new("chrono", Version::new(0, 4, 0)),
            ]),
        );

        let child =
            ManifestNode::create_child(&parent, Location::module(UnitPath::new("acme.gauges.depth")))
                .with_dependencies(vec![DependencyEntry::new("tracing", Version::new(0, 1, 0))]);

        assert_eq!(child.dependencies().len(), 1);
        assert_eq!(child.dependencies()[0].name().as_str(), "tracing");
        // The parent's own list is untouched.
        assert_eq!(parent.dependencies().len(), 2);
    }

    #[test]
    fn test_summary_shape() {
        let node = sample_node();
        assert_eq!(
            node.summary(),
            "Depth and pressure gauges. Version: 0.2.0. Authors: Jo Naut. \
             Maintainers: Jo Naut. License: MIT License."
        );

        let empty = ManifestNode::new(Location::module(UnitPath::new("acme")));
        assert_eq!(empty.summary(), "");
    }

    #[test]
    fn test_json_round_trip_drops_parent() {
        let parent = Arc::new(sample_node());
        let child =
            ManifestNode::create_child(&parent, Location::module(UnitPath::new("acme.gauges.depth")))
                .with_description("Depth gauge");

        let json = child.to_json().unwrap();
        let back: ManifestNode = serde_json::from_value(json).unwrap();
        assert_eq!(back.description(), "Depth gauge");
        assert!(back.parent().is_none());
    }
}
