//! Registered type descriptions.
//!
//! A [`TypeDescriptor`] is the registry's view of one application type:
//! its unit, its class tag, and its relation to other registered types.
//! Descriptors are plain data; behavior such as resolution lives in the
//! component registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::location::{Location, UnitPath};
use crate::core::tag::ClassTag;
use crate::util::Symbol;

/// Description of one registered type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    location: Location,
    tag: ClassTag,
    /// Fully-qualified name of an explicitly chosen implementation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    override_target: Option<Symbol>,
    /// Fully-qualified names of supertypes, nearest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ancestors: Vec<Symbol>,
}

impl TypeDescriptor {
    /// Describe a type declared in `unit` with the given role.
    pub fn new(unit: UnitPath, type_name: impl AsRef<str>, tag: ClassTag) -> Self {
        TypeDescriptor {
            location: Location::type_in(unit, type_name),
            tag,
            override_target: None,
            ancestors: Vec::new(),
        }
    }

    /// Pin resolution of this type to a specific implementation.
    pub fn with_override(mut self, target: impl AsRef<str>) -> Self {
        self.override_target = Some(Symbol::new(target));
        self
    }

    /// Record the supertype chain, nearest first.
    pub fn with_ancestors<I, S>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ancestors = ancestors.into_iter().map(Symbol::new).collect();
        self
    }

    /// Fully-qualified name of the described type.
    pub fn name(&self) -> Symbol {
        self.location.fqn()
    }

    /// The unit the type is declared in.
    pub fn unit(&self) -> UnitPath {
        self.location.unit()
    }

    /// The role the type plays in resolution.
    pub fn tag(&self) -> ClassTag {
        self.tag
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Explicitly pinned implementation, if any.
    pub fn override_target(&self) -> Option<Symbol> {
        self.override_target
    }

    /// Supertype chain, nearest first.
    pub fn ancestors(&self) -> &[Symbol] {
        &self.ancestors
    }

    /// The immediate supertype, if one was recorded.
    pub fn direct_parent(&self) -> Option<Symbol> {
        self.ancestors.first().copied()
    }

    /// Whether `supertype` is the immediate supertype of this type.
    pub fn is_direct_child_of(&self, supertype: Symbol) -> bool {
        self.direct_parent() == Some(supertype)
    }

    /// Whether `supertype` appears anywhere in the supertype chain.
    pub fn inherits_from(&self, supertype: Symbol) -> bool {
        self.ancestors.contains(&supertype)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name(), self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_unit_qualified() {
        let desc = TypeDescriptor::new(UnitPath::new("acme.gauges_h"), "DepthGauge", ClassTag::Header);
        assert_eq!(desc.name().as_str(), "acme.gauges_h.DepthGauge");
        assert_eq!(desc.unit().as_str(), "acme.gauges_h");
        assert_eq!(desc.tag(), ClassTag::Header);
    }

    #[test]
    fn test_ancestry_queries() {
        let header = Symbol::new("acme.gauges_h.DepthGauge");
        let base = Symbol::new("acme.core.Instrument");
        let desc = TypeDescriptor::new(UnitPath::new("acme.gauges_impl"), "DepthGaugeImpl", ClassTag::Impl)
            .with_ancestors([header.as_str(), base.as_str()]);

        assert!(desc.is_direct_child_of(header));
        assert!(!desc.is_direct_child_of(base));
        assert!(desc.inherits_from(header));
        assert!(desc.inherits_from(base));
        assert!(!desc.inherits_from(Symbol::new("acme.other.Thing")));
        assert_eq!(desc.direct_parent(), Some(header));
    }

    #[test]
    fn test_override_is_carried() {
        let desc = TypeDescriptor::new(UnitPath::new("acme.doors"), "Hatch", ClassTag::Header)
            .with_override("acme.doors.SteelHatch");
        assert_eq!(
            desc.override_target().map(|s| s.as_str()),
            Some("acme.doors.SteelHatch")
        );
    }
}
