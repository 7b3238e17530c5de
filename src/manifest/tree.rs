//! Manifest hierarchy.
//!
//! A [`ManifestTree`] indexes registered nodes by fully-qualified name and
//! derives the hierarchy between them. Parentage prefers the explicit
//! parent reference a node was created with; nodes without one fall back
//! to their location: a method belongs to its type, a type to its unit,
//! and a unit to the unit one path segment up. Only registered nodes
//! appear as structural parents or children.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::manifest::errors::ManifestError;
use crate::manifest::node::ManifestNode;
use crate::util::Symbol;

/// One step of a tree walk.
#[derive(Debug, Clone)]
pub struct TreeVisit {
    /// The node visited.
    pub node: Arc<ManifestNode>,

    /// Distance from the walk's root.
    pub depth: usize,

    /// True when the node was already visited on this walk; the walk does
    /// not descend past it again.
    pub cyclic: bool,
}

/// Index of manifest nodes and the hierarchy between them.
#[derive(Debug, Default)]
pub struct ManifestTree {
    nodes: BTreeMap<Symbol, Arc<ManifestNode>>,
}

impl ManifestTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        ManifestTree {
            nodes: BTreeMap::new(),
        }
    }

    /// Register a node under its fully-qualified name.
    pub fn register(&mut self, node: Arc<ManifestNode>) -> Result<(), ManifestError> {
        let fqn = node.fqn();
        if self.nodes.contains_key(&fqn) {
            return Err(ManifestError::DuplicateNode { fqn });
        }
        self.nodes.insert(fqn, node);
        Ok(())
    }

    /// Get a node by fully-qualified name.
    pub fn get(&self, fqn: Symbol) -> Option<&Arc<ManifestNode>> {
        self.nodes.get(&fqn)
    }

    /// Get a node by name, with typo suggestions on failure.
    pub fn lookup(&self, fqn: Symbol) -> Result<&Arc<ManifestNode>, ManifestError> {
        self.nodes.get(&fqn).ok_or_else(|| ManifestError::UnknownNode {
            fqn,
            suggestions: self.near_names(fqn),
        })
    }

    /// The parent of a node: its explicit parent reference if it has one,
    /// otherwise the registered node at its enclosing location.
    pub fn parent(&self, node: &ManifestNode) -> Option<Arc<ManifestNode>> {
        if let Some(parent) = node.parent() {
            return Some(Arc::clone(parent));
        }
        let fqn = Self::structural_parent_fqn(node)?;
        self.nodes.get(&fqn).cloned()
    }

    /// Direct children of a node, sorted by name. One level only: a node
    /// whose own parent is missing from the tree is nobody's child.
    pub fn children(&self, node: &ManifestNode) -> Vec<Arc<ManifestNode>> {
        let fqn = node.fqn();
        self.nodes
            .values()
            .filter(|candidate| candidate.fqn() != fqn)
            .filter(|candidate| self.parent_fqn(candidate) == Some(fqn))
            .cloned()
            .collect()
    }

    /// Nodes with no parent in the tree, sorted by name.
    pub fn roots(&self) -> Vec<Arc<ManifestNode>> {
        self.nodes
            .values()
            .filter(|node| self.parent(node).is_none())
            .cloned()
            .collect()
    }

    /// Walk the subtree under `root` depth-first, parents before children.
    ///
    /// Every node is recorded once; a node reached again on the same walk
    /// is recorded with the cyclic flag set and not descended into.
    pub fn walk(&self, root: &Arc<ManifestNode>) -> Vec<TreeVisit> {
        let mut visits = Vec::new();
        let mut visited = HashSet::new();
        self.walk_into(root, 0, &mut visited, &mut visits);
        visits
    }

    /// Descend from `root` along a dotted path of short names.
    ///
    /// Each path segment must name a direct child whose marker-stripped
    /// name extends the accumulated path, so `find(root, "gauges.depth")`
    /// reaches the depth unit even when its units carry role markers.
    pub fn find(&self, root: &Arc<ManifestNode>, path: &str) -> Option<Arc<ManifestNode>> {
        let mut current = Arc::clone(root);
        let mut accumulated = current.location().short_fqn().as_str().to_string();

        for segment in path.split('.').filter(|s| !s.is_empty()) {
            accumulated.push('.');
            accumulated.push_str(segment);
            current = self
                .children(&current)
                .into_iter()
                .find(|child| child.location().short_fqn().as_str() == accumulated)?;
        }

        Some(current)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All registered nodes, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ManifestNode>> + '_ {
        self.nodes.values()
    }

    fn walk_into(
        &self,
        node: &Arc<ManifestNode>,
        depth: usize,
        visited: &mut HashSet<Symbol>,
        visits: &mut Vec<TreeVisit>,
    ) {
        let cyclic = !visited.insert(node.fqn());
        visits.push(TreeVisit {
            node: Arc::clone(node),
            depth,
            cyclic,
        });
        if cyclic {
            return;
        }
        for child in self.children(node) {
            self.walk_into(&child, depth + 1, visited, visits);
        }
    }

    /// The name a node's parent would be registered under.
    fn parent_fqn(&self, node: &ManifestNode) -> Option<Symbol> {
        if let Some(parent) = node.parent() {
            return Some(parent.fqn());
        }
        Self::structural_parent_fqn(node)
    }

    fn structural_parent_fqn(node: &ManifestNode) -> Option<Symbol> {
        let location = node.location();
        match location.enclosing() {
            Some(enclosing) => Some(enclosing.fqn()),
            None => location.unit().parent().map(|unit| unit.as_symbol()),
        }
    }

    /// Registered names close to `fqn`, for typo suggestions.
    fn near_names(&self, fqn: Symbol) -> Vec<Symbol> {
        let needle = fqn.last_segment().to_ascii_lowercase();
        self.nodes
            .keys()
            .filter(|key| {
                let last = key.last_segment().to_ascii_lowercase();
                last == needle || last.starts_with(&needle) || needle.starts_with(&last)
            })
            .take(3)
            .copied()
            .collect()
    }
}
