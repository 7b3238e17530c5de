//! Code-unit identity.
//!
//! A [`UnitPath`] addresses a loadable unit by dotted path; a [`Location`]
//! addresses a code unit inside it: the unit itself, a type declared in it,
//! or a method on such a type. Role markers (`_h`, `_impl`, terminal
//! `header`/`impl` segments) are stripped in exactly one place, the short
//! forms, so nothing else in the crate parses name suffixes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::Symbol;

/// Role-marker suffixes recognized on unit paths, checked in order.
const ROLE_MARKERS: [&str; 4] = [".header", ".impl", "_h", "_impl"];

/// Invalid combination of location fields.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location has an empty unit path")]
    EmptyUnit,

    #[error("location `{unit}.{function}` names a function without a type")]
    MissingType { unit: String, function: String },
}

/// Dotted path of a loadable unit, e.g. `acme.gauges.depth_h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitPath(Symbol);

impl UnitPath {
    /// Create a unit path from a dotted string.
    pub fn new(path: impl AsRef<str>) -> Self {
        UnitPath(Symbol::new(path))
    }

    /// The interned path symbol.
    pub fn as_symbol(&self) -> Symbol {
        self.0
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &'static str {
        self.0.as_str()
    }

    /// The unit one path segment up, if any.
    pub fn parent(&self) -> Option<UnitPath> {
        self.0.parent().map(UnitPath)
    }

    /// The final path segment.
    pub fn last_segment(&self) -> &'static str {
        self.0.last_segment()
    }

    /// Append a segment, producing a nested unit path.
    pub fn join(&self, segment: impl AsRef<str>) -> UnitPath {
        UnitPath(self.0.join(segment))
    }

    /// The path with any role marker stripped (`acme.gauges_h` ->
    /// `acme.gauges`, `acme.doors.header` -> `acme.doors`).
    pub fn short(&self) -> Symbol {
        let path = self.0.as_str();
        for marker in ROLE_MARKERS {
            if let Some(stripped) = path.strip_suffix(marker) {
                if !stripped.is_empty() {
                    return Symbol::new(stripped);
                }
            }
        }
        self.0
    }

    /// Whether the path carries a header role marker.
    pub fn is_header_unit(&self) -> bool {
        let path = self.0.as_str();
        path.ends_with("_h") || path.ends_with(".header")
    }

    /// Whether the path carries an implementation role marker.
    pub fn is_impl_unit(&self) -> bool {
        let path = self.0.as_str();
        path.ends_with("_impl") || path.ends_with(".impl")
    }

    /// The sibling implementation unit named by convention, if this unit
    /// carries a header marker (`acme.gauges.depth_h` ->
    /// `acme.gauges.depth_impl`, `acme.doors.header` -> `acme.doors.impl`).
    pub fn implementation_sibling(&self) -> Option<UnitPath> {
        let last = self.last_segment();
        if last == "header" {
            return Some(UnitPath(self.0.with_last_segment("impl")));
        }
        if let Some(stem) = last.strip_suffix("_h") {
            if !stem.is_empty() {
                return Some(UnitPath(self.0.with_last_segment(format!("{stem}_impl"))));
            }
        }
        None
    }
}

impl fmt::Display for UnitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for UnitPath {
    fn from(s: &str) -> Self {
        UnitPath::new(s)
    }
}

/// The kind of code unit a location points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// A loadable unit (module or package of the host application).
    Module,
    /// A type declared inside a unit.
    Type,
    /// A method on a type.
    Method,
}

impl UnitKind {
    /// Whether a unit of this kind may directly contain one of `other`.
    pub fn can_contain(&self, other: UnitKind) -> bool {
        match self {
            UnitKind::Module => matches!(other, UnitKind::Module | UnitKind::Type),
            UnitKind::Type => matches!(other, UnitKind::Method),
            UnitKind::Method => false,
        }
    }

    /// Whether a unit of this kind may sit directly inside one of `other`.
    pub fn can_be_contained_in(&self, other: UnitKind) -> bool {
        other.can_contain(*self)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Module => write!(f, "module"),
            UnitKind::Type => write!(f, "type"),
            UnitKind::Method => write!(f, "method"),
        }
    }
}

/// Addressable identity of a code unit.
///
/// Exactly one of three shapes holds: unit only, unit + type, or
/// unit + type + function. The constructors make other combinations
/// unrepresentable; deserialization validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocation", into = "RawLocation")]
pub struct Location {
    unit: UnitPath,
    type_name: Option<Symbol>,
    function_name: Option<Symbol>,
}

impl Location {
    /// Location of a unit itself.
    pub fn module(unit: UnitPath) -> Self {
        Location {
            unit,
            type_name: None,
            function_name: None,
        }
    }

    /// Location of a type declared in a unit.
    pub fn type_in(unit: UnitPath, type_name: impl AsRef<str>) -> Self {
        Location {
            unit,
            type_name: Some(Symbol::new(type_name)),
            function_name: None,
        }
    }

    /// Location of a method on a type.
    pub fn method_in(
        unit: UnitPath,
        type_name: impl AsRef<str>,
        function_name: impl AsRef<str>,
    ) -> Self {
        Location {
            unit,
            type_name: Some(Symbol::new(type_name)),
            function_name: Some(Symbol::new(function_name)),
        }
    }

    /// The unit portion of the location.
    pub fn unit(&self) -> UnitPath {
        self.unit
    }

    /// The type name, for type and method locations.
    pub fn type_name(&self) -> Option<Symbol> {
        self.type_name
    }

    /// The function name, for method locations.
    pub fn function_name(&self) -> Option<Symbol> {
        self.function_name
    }

    /// The kind of code unit this location points at.
    pub fn kind(&self) -> UnitKind {
        match (self.type_name, self.function_name) {
            (Some(_), Some(_)) => UnitKind::Method,
            (Some(_), None) => UnitKind::Type,
            (None, _) => UnitKind::Module,
        }
    }

    pub fn is_module(&self) -> bool {
        self.kind() == UnitKind::Module
    }

    pub fn is_type(&self) -> bool {
        self.kind() == UnitKind::Type
    }

    pub fn is_method(&self) -> bool {
        self.kind() == UnitKind::Method
    }

    /// Fully-qualified name: unit path plus type and function if present.
    pub fn fqn(&self) -> Symbol {
        match (self.type_name, self.function_name) {
            (Some(ty), Some(func)) => Symbol::new(format!("{}.{}.{}", self.unit, ty, func)),
            (Some(ty), None) => Symbol::new(format!("{}.{}", self.unit, ty)),
            (None, _) => self.unit.as_symbol(),
        }
    }

    /// Fully-qualified name with role markers stripped from the unit.
    pub fn short_fqn(&self) -> Symbol {
        let short_unit = self.unit.short();
        match (self.type_name, self.function_name) {
            (Some(ty), Some(func)) => Symbol::new(format!("{short_unit}.{ty}.{func}")),
            (Some(ty), None) => Symbol::new(format!("{short_unit}.{ty}")),
            (None, _) => short_unit,
        }
    }

    /// The name of the unit within its container: the last path segment
    /// for modules, the type name for types, the function name for methods.
    pub fn local_name(&self) -> &'static str {
        match (self.type_name, self.function_name) {
            (Some(_), Some(func)) => func.as_str(),
            (Some(ty), None) => ty.as_str(),
            (None, _) => self.unit.short().last_segment(),
        }
    }

    /// The location one containment level up: a method's type, a type's
    /// unit. Module locations have no containing location of their own.
    pub fn enclosing(&self) -> Option<Location> {
        match (self.type_name, self.function_name) {
            (Some(ty), Some(_)) => Some(Location::type_in(self.unit, ty)),
            (Some(_), None) => Some(Location::module(self.unit)),
            (None, _) => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fqn(), f)
    }
}

/// Serialized form of a [`Location`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLocation {
    unit: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    type_name: Option<String>,
    #[serde(rename = "function", default, skip_serializing_if = "Option::is_none")]
    function_name: Option<String>,
}

impl TryFrom<RawLocation> for Location {
    type Error = LocationError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        if raw.unit.is_empty() {
            return Err(LocationError::EmptyUnit);
        }
        match (raw.type_name, raw.function_name) {
            (None, Some(function)) => Err(LocationError::MissingType {
                unit: raw.unit,
                function,
            }),
            (None, None) => Ok(Location::module(UnitPath::new(raw.unit))),
            (Some(ty), None) => Ok(Location::type_in(UnitPath::new(raw.unit), ty)),
            (Some(ty), Some(function)) => {
                Ok(Location::method_in(UnitPath::new(raw.unit), ty, function))
            }
        }
    }
}

impl From<Location> for RawLocation {
    fn from(loc: Location) -> Self {
        RawLocation {
            unit: loc.unit.as_str().to_string(),
            type_name: loc.type_name.map(|s| s.as_str().to_string()),
            function_name: loc.function_name.map(|s| s.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_path_short_strips_markers() {
        assert_eq!(UnitPath::new("acme.gauges_h").short().as_str(), "acme.gauges");
        assert_eq!(
            UnitPath::new("acme.gauges_impl").short().as_str(),
            "acme.gauges"
        );
        assert_eq!(
            UnitPath::new("acme.doors.header").short().as_str(),
            "acme.doors"
        );
        assert_eq!(
            UnitPath::new("acme.doors.impl").short().as_str(),
            "acme.doors"
        );
        assert_eq!(UnitPath::new("acme.plain").short().as_str(), "acme.plain");
    }

    #[test]
    fn test_implementation_sibling() {
        assert_eq!(
            UnitPath::new("acme.gauges.depth_h").implementation_sibling(),
            Some(UnitPath::new("acme.gauges.depth_impl"))
        );
        assert_eq!(
            UnitPath::new("acme.doors.header").implementation_sibling(),
            Some(UnitPath::new("acme.doors.impl"))
        );
        assert_eq!(UnitPath::new("acme.plain").implementation_sibling(), None);
        // A bare `_h` segment has no stem to build a sibling from
        assert_eq!(UnitPath::new("acme._h").implementation_sibling(), None);
    }

    #[test]
    fn test_location_shapes_and_kinds() {
        let unit = UnitPath::new("acme.gauges");

        let module = Location::module(unit);
        assert_eq!(module.kind(), UnitKind::Module);
        assert_eq!(module.fqn().as_str(), "acme.gauges");

        let ty = Location::type_in(unit, "DepthGauge");
        assert_eq!(ty.kind(), UnitKind::Type);
        assert_eq!(ty.fqn().as_str(), "acme.gauges.DepthGauge");

        let method = Location::method_in(unit, "DepthGauge", "read");
        assert_eq!(method.kind(), UnitKind::Method);
        assert_eq!(method.fqn().as_str(), "acme.gauges.DepthGauge.read");
    }

    #[test]
    fn test_short_fqn_and_local_name() {
        let ty = Location::type_in(UnitPath::new("acme.gauges.depth_h"), "DepthGauge");
        assert_eq!(ty.short_fqn().as_str(), "acme.gauges.depth.DepthGauge");
        assert_eq!(ty.local_name(), "DepthGauge");

        let module = Location::module(UnitPath::new("acme.gauges.depth_h"));
        assert_eq!(module.local_name(), "depth");
    }

    #[test]
    fn test_enclosing() {
        let unit = UnitPath::new("acme.gauges");
        let method = Location::method_in(unit, "DepthGauge", "read");
        assert_eq!(method.enclosing(), Some(Location::type_in(unit, "DepthGauge")));
        assert_eq!(
            Location::type_in(unit, "DepthGauge").enclosing(),
            Some(Location::module(unit))
        );
        assert_eq!(Location::module(unit).enclosing(), None);
    }

    #[test]
    fn test_containment_matrix() {
        assert!(UnitKind::Module.can_contain(UnitKind::Module));
        assert!(UnitKind::Module.can_contain(UnitKind::Type));
        assert!(!UnitKind::Module.can_contain(UnitKind::Method));
        assert!(UnitKind::Type.can_contain(UnitKind::Method));
        assert!(!UnitKind::Type.can_contain(UnitKind::Type));
        assert!(!UnitKind::Method.can_contain(UnitKind::Module));
        assert!(UnitKind::Method.can_be_contained_in(UnitKind::Type));
    }

    #[test]
    fn test_deserialize_rejects_function_without_type() {
        let err = serde_json::from_str::<Location>(
            r#"{"unit": "acme.gauges", "function": "read"}"#,
        );
        assert!(err.is_err());
        let msg = err.unwrap_err().to_string();
        assert!(msg.contains("without a type"));
    }

    #[test]
    fn test_serde_round_trip() {
        let loc = Location::type_in(UnitPath::new("acme.gauges"), "DepthGauge");
        let json = serde_json::to_string(&loc).unwrap();
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(loc, back);
    }
}
