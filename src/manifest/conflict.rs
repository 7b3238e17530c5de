//! Dependency conflict detection.
//!
//! [`analyze`] groups an effective dependency set by package name and
//! checks each group for unsatisfiable version constraints. Detection is
//! purely advisory by default; a strict policy upgrades every record to
//! an error so callers can fail a build on it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::manifest::dependency::{DependencyEntry, Direction};
use crate::util::{Diagnostic, Severity, Symbol};

/// The way a group of constraints contradicts itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// Two or more exact pins name different versions.
    MultipleExact,
    /// The single exact pin sits below a declared minimum.
    ExactBelowMinimum,
    /// The single exact pin sits above a declared maximum.
    ExactAboveMaximum,
    /// The greatest minimum exceeds the smallest maximum.
    NoValidVersion,
}

impl ConflictKind {
    fn phrase(&self) -> &'static str {
        match self {
            ConflictKind::MultipleExact => "multiple exact version pins",
            ConflictKind::ExactBelowMinimum => "exact pin below a required minimum",
            ConflictKind::ExactAboveMaximum => "exact pin above an allowed maximum",
            ConflictKind::NoValidVersion => "no version satisfies the combined constraints",
        }
    }

    fn remediation(&self) -> &'static str {
        match self {
            ConflictKind::MultipleExact => "Align the exact pins on a single version",
            ConflictKind::ExactBelowMinimum => {
                "Raise the exact pin to meet the minimum, or lower the minimum"
            }
            ConflictKind::ExactAboveMaximum => {
                "Lower the exact pin under the maximum, or raise the maximum"
            }
            ConflictKind::NoValidVersion => {
                "Relax the minimum or the maximum until the range is non-empty"
            }
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::MultipleExact => write!(f, "multiple-exact"),
            ConflictKind::ExactBelowMinimum => write!(f, "exact-below-minimum"),
            ConflictKind::ExactAboveMaximum => write!(f, "exact-above-maximum"),
            ConflictKind::NoValidVersion => write!(f, "no-valid-version"),
        }
    }
}

/// How detected conflicts are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Conflicts are warnings; reports always succeed.
    #[default]
    Advisory,
    /// Conflicts are errors; turning a report into a result fails.
    Strict,
}

impl ConflictPolicy {
    /// The severity stamped onto records under this policy.
    pub fn severity(&self) -> Severity {
        match self {
            ConflictPolicy::Advisory => Severity::Warning,
            ConflictPolicy::Strict => Severity::Error,
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, ConflictPolicy::Strict)
    }
}

/// One detected contradiction among a package's constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// The dependency name the constraints disagree about.
    pub package: Symbol,

    pub kind: ConflictKind,

    pub severity: Severity,

    /// The constraints involved, not necessarily the whole group.
    pub entries: Vec<DependencyEntry>,
}

impl ConflictRecord {
    /// One-line human description of the conflict.
    pub fn describe(&self) -> String {
        let constraints: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{} {}", e.direction().sign(), e.version()))
            .collect();
        format!(
            "{}: {} ({})",
            self.package,
            self.kind.phrase(),
            constraints.join(", ")
        )
    }

    /// Render the record as a diagnostic with the involved constraints
    /// as context lines.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = match self.severity {
            Severity::Error => Diagnostic::error(self.describe()),
            _ => Diagnostic::warning(self.describe()),
        };
        for entry in &self.entries {
            diag = diag.with_context(entry.to_string());
        }
        diag.with_suggestion(self.kind.remediation())
    }
}

impl std::fmt::Display for ConflictRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.describe())
    }
}

/// Check an effective dependency set for contradictory constraints.
///
/// Entries are grouped by package name; each group yields at most one
/// record, the first matching kind in declaration order above. Entries
/// with an unconstrained direction never participate. Records come back
/// sorted by package name.
pub fn analyze<'a, I>(entries: I, policy: ConflictPolicy) -> Vec<ConflictRecord>
where
    I: IntoIterator<Item = &'a DependencyEntry>,
{
    let mut groups: BTreeMap<Symbol, Vec<&DependencyEntry>> = BTreeMap::new();
    for entry in entries {
        if entry.direction() == Direction::None {
            continue;
        }
        groups.entry(entry.name()).or_default().push(entry);
    }

    groups
        .into_iter()
        .filter_map(|(package, group)| conflict_for(package, &group, policy.severity()))
        .collect()
}

fn conflict_for(
    package: Symbol,
    group: &[&DependencyEntry],
    severity: Severity,
) -> Option<ConflictRecord> {
    let exacts: Vec<&DependencyEntry> = with_direction(group, Direction::Exact);
    let minimums: Vec<&DependencyEntry> = with_direction(group, Direction::Minimum);
    let maximums: Vec<&DependencyEntry> = with_direction(group, Direction::Maximum);

    // Identical pins repeated across units agree; only distinct versions clash.
    let pins: BTreeSet<&semver::Version> = exacts.iter().map(|e| e.version()).collect();
    if pins.len() >= 2 {
        return Some(record(package, ConflictKind::MultipleExact, severity, exacts));
    }

    if let Some(pin) = pins.into_iter().next() {
        let violated_minimums: Vec<&DependencyEntry> = minimums
            .iter()
            .copied()
            .filter(|e| e.version() > pin)
            .collect();
        if !violated_minimums.is_empty() {
            let mut involved = exacts;
            involved.extend(violated_minimums);
            return Some(record(package, ConflictKind::ExactBelowMinimum, severity, involved));
        }

        let violated_maximums: Vec<&DependencyEntry> = maximums
            .iter()
            .copied()
            .filter(|e| e.version() < pin)
            .collect();
        if !violated_maximums.is_empty() {
            let mut involved = exacts;
            involved.extend(violated_maximums);
            return Some(record(package, ConflictKind::ExactAboveMaximum, severity, involved));
        }
    }

    let greatest_min = minimums.iter().map(|e| e.version()).max();
    let smallest_max = maximums.iter().map(|e| e.version()).min();
    if let (Some(gmin), Some(smax)) = (greatest_min, smallest_max) {
        if gmin > smax {
            let involved: Vec<&DependencyEntry> = minimums
                .iter()
                .copied()
                .filter(|e| e.version() == gmin)
                .chain(maximums.iter().copied().filter(|e| e.version() == smax))
                .collect();
            return Some(record(package, ConflictKind::NoValidVersion, severity, involved));
        }
    }

    None
}

fn with_direction<'a>(group: &[&'a DependencyEntry], direction: Direction) -> Vec<&'a DependencyEntry> {
    group
        .iter()
        .copied()
        .filter(|e| e.direction() == direction)
        .collect()
}

fn record(
    package: Symbol,
    kind: ConflictKind,
    severity: Severity,
    entries: Vec<&DependencyEntry>,
) -> ConflictRecord {
    ConflictRecord {
        package,
        kind,
        severity,
        entries: entries.into_iter().cloned().collect(),
    }
}
