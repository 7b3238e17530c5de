//! Dependency aggregation across the manifest hierarchy.
//!
//! A unit's effective dependencies are the union of its own declared list
//! and the own lists of its ancestors. Aggregation always works from own
//! lists, never from inherited copies, so an entry a child inherited
//! unchanged is counted once. [`dependency_report`] materializes that set
//! per unit (optionally over the whole subtree) and runs conflict analysis
//! over everything it collected.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::manifest::conflict::{self, ConflictPolicy, ConflictRecord};
use crate::manifest::dependency::{Category, DependencyEntry, DependencyKind};
use crate::manifest::node::ManifestNode;
use crate::manifest::tree::ManifestTree;
use crate::util::{ConflictSetError, Severity, Symbol};

/// Options controlling a dependency report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    recursive: bool,
    kind_filter: Option<String>,
    category_filter: Option<String>,
    policy: ConflictPolicy,
}

impl ReportOptions {
    /// Default options: recurse into sub-units, no filters, advisory
    /// conflict policy.
    pub fn new() -> Self {
        ReportOptions {
            recursive: true,
            kind_filter: None,
            category_filter: None,
            policy: ConflictPolicy::default(),
        }
    }

    /// Cover the queried unit and its ancestors only, not its sub-units.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Keep only entries of the named dependency kind. Matching ignores
    /// case.
    pub fn with_kind_filter(mut self, filter: impl Into<String>) -> Self {
        self.kind_filter = Some(filter.into());
        self
    }

    /// Keep only entries of the named category. Matching ignores case.
    pub fn with_category_filter(mut self, filter: impl Into<String>) -> Self {
        self.category_filter = Some(filter.into());
        self
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    fn matches(&self, entry: &DependencyEntry) -> bool {
        if let Some(ref kind) = self.kind_filter {
            if !kind.eq_ignore_ascii_case(&entry.kind().to_string()) {
                return false;
            }
        }
        if let Some(ref category) = self.category_filter {
            if !category.eq_ignore_ascii_case(&entry.category().to_string()) {
                return false;
            }
        }
        true
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions::new()
    }
}

/// Aggregate counts over a dependency report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStats {
    /// Units that contributed at least one entry.
    pub total_units: usize,
    pub total_entries: usize,
    pub total_conflicts: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_kind: BTreeMap<DependencyKind, usize>,
}

/// Dependencies per unit, detected conflicts, and summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Each covered unit's own declared entries, keyed by unit name.
    pub dependencies: BTreeMap<Symbol, Vec<DependencyEntry>>,
    pub conflicts: Vec<ConflictRecord>,
    pub stats: DependencyStats,
}

impl DependencyReport {
    /// All listed entries, in unit-name order.
    pub fn entries(&self) -> impl Iterator<Item = &DependencyEntry> + '_ {
        self.dependencies.values().flatten()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Fail when any conflict was recorded as an error.
    ///
    /// Advisory reports always pass; only a strict policy stamps its
    /// records with error severity.
    pub fn into_result(self) -> Result<DependencyReport, ConflictSetError> {
        let fatal = self
            .conflicts
            .iter()
            .any(|record| record.severity == Severity::Error);
        if !fatal {
            return Ok(self);
        }

        let packages: HashSet<Symbol> = self.conflicts.iter().map(|r| r.package).collect();
        Err(ConflictSetError {
            package_count: packages.len(),
            conflict_count: self.conflicts.len(),
            details: self.conflicts.iter().map(|r| r.describe()).collect(),
        })
    }

    /// Serialize the report to a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl std::fmt::Display for DependencyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} dependency entries across {} unit(s), {} conflict(s)",
            self.stats.total_entries, self.stats.total_units, self.stats.total_conflicts
        )
    }
}

/// The union of a unit's own dependencies and its ancestors' own lists.
///
/// The chain is walked once, nearest ancestor first; identical entries
/// keep their first occurrence. A cycle through explicit parent links
/// ends the walk instead of looping.
pub fn effective_dependencies(tree: &ManifestTree, node: &Arc<ManifestNode>) -> Vec<DependencyEntry> {
    let mut effective: Vec<DependencyEntry> = Vec::new();
    for ancestor in ancestry(tree, node) {
        for entry in ancestor.dependencies() {
            if !effective.contains(entry) {
                effective.push(entry.clone());
            }
        }
    }
    effective
}

/// Collect dependencies for `root` and analyze them for conflicts.
///
/// The covered units are the root and its ancestors, plus every unit
/// below the root when the options say so. Each unit contributes its own
/// declared list exactly once, filtered per the options.
pub fn dependency_report(
    tree: &ManifestTree,
    root: &Arc<ManifestNode>,
    options: &ReportOptions,
) -> DependencyReport {
    let mut covered: Vec<Arc<ManifestNode>> = Vec::new();
    let mut seen: HashSet<Symbol> = HashSet::new();

    for ancestor in ancestry(tree, root) {
        if seen.insert(ancestor.fqn()) {
            covered.push(ancestor);
        }
    }
    if options.recursive {
        for visit in tree.walk(root) {
            if !visit.cyclic && seen.insert(visit.node.fqn()) {
                covered.push(visit.node);
            }
        }
    }

    let mut dependencies: BTreeMap<Symbol, Vec<DependencyEntry>> = BTreeMap::new();
    for node in covered {
        let listed: Vec<DependencyEntry> = node
            .dependencies()
            .iter()
            .filter(|entry| options.matches(entry))
            .cloned()
            .collect();
        if !listed.is_empty() {
            dependencies.insert(node.fqn(), listed);
        }
    }

    let conflicts = conflict::analyze(dependencies.values().flatten(), options.policy);
    for record in &conflicts {
        tracing::warn!("dependency conflict: {}", record.describe());
    }

    let stats = tally(&dependencies, conflicts.len());
    tracing::debug!(
        "dependency report for `{}`: {} entries, {} unit(s), {} conflict(s)",
        root.fqn(),
        stats.total_entries,
        stats.total_units,
        stats.total_conflicts
    );

    DependencyReport {
        dependencies,
        conflicts,
        stats,
    }
}

/// The node followed by its ancestors, nearest first, cycle-guarded.
fn ancestry(tree: &ManifestTree, node: &Arc<ManifestNode>) -> Vec<Arc<ManifestNode>> {
    let mut chain: Vec<Arc<ManifestNode>> = Vec::new();
    let mut visited: HashSet<Symbol> = HashSet::new();
    let mut current = Arc::clone(node);

    loop {
        if !visited.insert(current.fqn()) {
            break;
        }
        chain.push(Arc::clone(&current));
        match tree.parent(&current) {
            Some(parent) => current = parent,
            None => break,
        }
    }

    chain
}

fn tally(
    dependencies: &BTreeMap<Symbol, Vec<DependencyEntry>>,
    total_conflicts: usize,
) -> DependencyStats {
    let mut stats = DependencyStats {
        total_units: dependencies.len(),
        total_conflicts,
        ..DependencyStats::default()
    };

    for entry in dependencies.values().flatten() {
        stats.total_entries += 1;
        *stats.by_category.entry(entry.category()).or_insert(0) += 1;
        *stats.by_kind.entry(entry.kind()).or_insert(0) += 1;
    }

    stats
}
