//! Keelson - Header/implementation resolution and manifest metadata
//!
//! This crate provides the core library functionality for Keelson,
//! including component resolution and construction, manifest hierarchy
//! traversal, and dependency aggregation with conflict analysis.

pub mod component;
pub mod core;
pub mod manifest;
pub mod util;

pub use crate::component::{ComponentRegistry, Constructor, Contract, ResolveError, UnitLoader};
pub use crate::core::{ClassTag, Location, TypeDescriptor, UnitKind, UnitPath};
pub use crate::manifest::{
    dependency_report, effective_dependencies, Author, ChangelogEntry, ConflictPolicy,
    ConflictRecord, DependencyEntry, DependencyReport, License, ManifestError, ManifestNode,
    ManifestTree, ReportOptions, Status,
};
pub use crate::util::{Diagnostic, Severity, Symbol};
