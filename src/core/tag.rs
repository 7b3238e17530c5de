//! Component classification tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a registered component type.
///
/// The tag decides how construction requests are routed: headers are
/// resolved to an implementation first, impls and bundles construct as
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassTag {
    /// Interface type; callers program against it.
    Header,
    /// Concrete type providing the behavior for a header.
    Impl,
    /// Self-contained type, simultaneously interface and implementation.
    Bundle,
}

impl ClassTag {
    /// Human-readable explanation of the tag.
    pub fn description(&self) -> &'static str {
        match self {
            ClassTag::Header => "interface type resolved to an implementation at construction",
            ClassTag::Impl => "concrete implementation of a header",
            ClassTag::Bundle => "self-contained type acting as its own implementation",
        }
    }

    /// Whether a type with this tag is its own implementation.
    pub fn is_self_implementing(&self) -> bool {
        matches!(self, ClassTag::Impl | ClassTag::Bundle)
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassTag::Header => write!(f, "header"),
            ClassTag::Impl => write!(f, "impl"),
            ClassTag::Bundle => write!(f, "bundle"),
        }
    }
}
