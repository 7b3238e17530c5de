//! Dependency declarations.
//!
//! A [`DependencyEntry`] describes one requirement of a unit: what it
//! needs, which version, and how hard the version constraint is. Entries
//! are plain data; aggregation and conflict analysis live in the report
//! modules.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::util::Symbol;

/// Where a required package comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// Another unit of the same application.
    Internal,
    /// A package from an external ecosystem.
    #[default]
    #[serde(rename = "external-package")]
    External,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Internal => write!(f, "internal"),
            DependencyKind::External => write!(f, "external-package"),
        }
    }
}

/// Why a dependency is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Build,
    Runtime,
    #[default]
    Automatic,
    Development,
}

impl Category {
    pub fn description(&self) -> &'static str {
        match self {
            Category::Build => "Required for building the package",
            Category::Runtime => "Required for running the package (minimal set)",
            Category::Automatic => "Will be added automatically by the system if required",
            Category::Development => "Only needed for development/testing (optional)",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Build => write!(f, "build"),
            Category::Runtime => write!(f, "runtime"),
            Category::Automatic => write!(f, "automatic"),
            Category::Development => write!(f, "development"),
        }
    }
}

/// How the declared version constrains candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Floor: the declared version or anything newer.
    #[default]
    Minimum,
    /// Pin: exactly the declared version.
    Exact,
    /// Ceiling: the declared version or anything older.
    Maximum,
    /// No constraint; the version is informational.
    None,
}

impl Direction {
    /// Comparison operator for display.
    pub fn sign(&self) -> &'static str {
        match self {
            Direction::Minimum => ">=",
            Direction::Exact => "==",
            Direction::Maximum => "<=",
            Direction::None => "*",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Direction::Minimum => "Minimum version of the dependency (default)",
            Direction::Exact => "Exact version of the dependency",
            Direction::Maximum => "Maximum version of the dependency",
            Direction::None => "No version constraint",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Minimum => write!(f, "minimum"),
            Direction::Exact => write!(f, "exact"),
            Direction::Maximum => write!(f, "maximum"),
            Direction::None => write!(f, "none"),
        }
    }
}

/// One declared requirement of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEntry {
    name: Symbol,
    version: Version,

    #[serde(default)]
    direction: Direction,

    #[serde(default)]
    kind: DependencyKind,

    #[serde(default)]
    category: Category,

    /// Override of where to fetch the package from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Url>,
}

impl DependencyEntry {
    /// Declare a dependency with the default minimum-version constraint.
    pub fn new(name: impl AsRef<str>, version: Version) -> Self {
        DependencyEntry {
            name: Symbol::new(name),
            version,
            direction: Direction::default(),
            kind: DependencyKind::default(),
            category: Category::default(),
            source: None,
        }
    }

    /// Declare a floor constraint (same as [`DependencyEntry::new`]).
    pub fn minimum(name: impl AsRef<str>, version: Version) -> Self {
        DependencyEntry::new(name, version)
    }

    /// Declare an exact pin.
    pub fn exact(name: impl AsRef<str>, version: Version) -> Self {
        DependencyEntry::new(name, version).with_direction(Direction::Exact)
    }

    /// Declare a ceiling constraint.
    pub fn maximum(name: impl AsRef<str>, version: Version) -> Self {
        DependencyEntry::new(name, version).with_direction(Direction::Maximum)
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_kind(mut self, kind: DependencyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_source(mut self, source: Url) -> Self {
        self.source = Some(source);
        self
    }

    pub fn name(&self) -> Symbol {
        self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn source(&self) -> Option<&Url> {
        self.source.as_ref()
    }

    /// Check if a concrete version satisfies this constraint.
    pub fn satisfied_by(&self, candidate: &Version) -> bool {
        match self.direction {
            Direction::Minimum => candidate >= &self.version,
            Direction::Exact => candidate == &self.version,
            Direction::Maximum => candidate <= &self.version,
            Direction::None => true,
        }
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}) [{}]",
            self.name,
            self.direction.sign(),
            self.version,
            self.kind
        )?;
        if let Some(ref source) = self.source {
            write!(f, " @ {}", source)?;
        }
        write!(f, " [{}]", self.category)
    }
}
