//! Unit metadata and the hierarchy built from it.
//!
//! This module carries everything a unit declares about itself:
//! - Manifest nodes (description, status, changelog, credits, license,
//!   policy flags, dependencies)
//! - The manifest tree relating nodes to their parents and children
//! - Dependency aggregation, conflict analysis, and report statistics

pub mod aggregate;
pub mod author;
pub mod changelog;
pub mod conflict;
pub mod dependency;
pub mod errors;
pub mod license;
pub mod node;
pub mod policy;
pub mod tree;

pub use aggregate::{
    dependency_report, effective_dependencies, DependencyReport, DependencyStats, ReportOptions,
};
pub use author::Author;
pub use changelog::ChangelogEntry;
pub use conflict::{analyze, ConflictKind, ConflictPolicy, ConflictRecord};
pub use dependency::{Category, DependencyEntry, DependencyKind, Direction};
pub use errors::ManifestError;
pub use license::{Copyright, License};
pub use node::ManifestNode;
pub use policy::{AccessMode, AiAccess, Backend, BackendGroup, Frontend, Status, ThreadSafety};
pub use tree::{ManifestTree, TreeVisit};
