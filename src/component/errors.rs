//! Component resolution error types and diagnostics.

use thiserror::Error;

use crate::core::location::UnitPath;
use crate::core::tag::ClassTag;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::Symbol;

/// Why an explicit implementation binding was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideFault {
    /// The bound name is not registered at all.
    TargetMissing,
    /// The bound type is registered but does not carry the `impl` tag.
    NotAnImpl(ClassTag),
    /// The bound type does not inherit from the header it is bound to.
    NotASubtype,
}

impl std::fmt::Display for OverrideFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverrideFault::TargetMissing => write!(f, "the target is not registered"),
            OverrideFault::NotAnImpl(tag) => {
                write!(f, "the target is tagged `{}`, not `impl`", tag)
            }
            OverrideFault::NotASubtype => {
                write!(f, "the target does not inherit from the header")
            }
        }
    }
}

/// Error during implementation resolution or construction.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not resolve an implementation for header `{header}`")]
    NoImplementation {
        header: Symbol,
        searched_unit: UnitPath,
    },

    #[error("invalid implementation binding `{header}` -> `{target}`: {fault}")]
    InvalidOverride {
        header: Symbol,
        target: Symbol,
        fault: OverrideFault,
    },

    #[error("unknown type: `{name}`")]
    UnknownType {
        name: Symbol,
        suggestions: Vec<Symbol>,
    },

    #[error("contract `{contract}` is not bound to a header")]
    UnboundContract { contract: &'static str },

    #[error("no constructor registered for `{resolved}`")]
    NoConstructor {
        resolved: Symbol,
        contract: &'static str,
    },

    #[error("failed to load unit `{unit}`")]
    UnitLoad {
        unit: UnitPath,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::NoImplementation {
                header,
                searched_unit,
            } => Diagnostic::error(format!(
                "could not resolve an implementation for header `{}`",
                header
            ))
            .with_location(header.as_str())
            .with_context(format!(
                "searched unit `{}` for `impl` subtypes of the header",
                searched_unit
            ))
            .with_suggestion(suggestions::REGISTER_IMPL.to_string())
            .with_suggestion(suggestions::BIND_EXPLICIT.to_string())
            .with_suggestion(suggestions::RECLASSIFY_BUNDLE.to_string()),

            ResolveError::InvalidOverride {
                header,
                target,
                fault,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "invalid implementation binding `{}` -> `{}`",
                    header, target
                ))
                .with_location(header.as_str())
                .with_context(fault.to_string());

                diag = match fault {
                    OverrideFault::TargetMissing => diag
                        .with_suggestion(format!("Register `{}` before binding it", target))
                        .with_suggestion(suggestions::CHECK_SPELLING.to_string()),
                    OverrideFault::NotAnImpl(_) => diag.with_suggestion(format!(
                        "Tag `{}` as `impl` or bind a different type",
                        target
                    )),
                    OverrideFault::NotASubtype => diag.with_suggestion(format!(
                        "Bind an implementation that inherits from `{}`",
                        header
                    )),
                };

                diag
            }

            ResolveError::UnknownType {
                name,
                suggestions: candidates,
            } => {
                let mut diag = Diagnostic::error(format!("unknown type: `{}`", name));

                if !candidates.is_empty() {
                    let names: Vec<&str> = candidates.iter().map(|s| s.as_str()).collect();
                    diag = diag.with_context(format!("did you mean: {}?", names.join(", ")));
                }

                diag.with_suggestion(suggestions::CHECK_SPELLING.to_string())
                    .with_suggestion(suggestions::REGISTER_UNIT.to_string())
            }

            ResolveError::UnboundContract { contract } => {
                Diagnostic::error(format!("contract `{}` is not bound to a header", contract))
                    .with_suggestion(
                        "Register the header or bundle under this contract before constructing"
                            .to_string(),
                    )
            }

            ResolveError::NoConstructor { resolved, contract } => {
                Diagnostic::error(format!("no constructor registered for `{}`", resolved))
                    .with_context(format!("while constructing against contract `{}`", contract))
                    .with_suggestion(format!(
                        "Register `{}` with a constructor for this contract",
                        resolved
                    ))
            }

            ResolveError::UnitLoad { unit, source } => {
                Diagnostic::error(format!("failed to load unit `{}`", unit))
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::REGISTER_UNIT.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_implementation_diagnostic_names_remediations() {
        let err = ResolveError::NoImplementation {
            header: Symbol::new("acme.gauges_h.DepthGauge"),
            searched_unit: UnitPath::new("acme.gauges_impl"),
        };

        let diag = err.to_diagnostic();
        let output = diag.format(false);

        assert!(output.contains("acme.gauges_h.DepthGauge"));
        assert!(output.contains("acme.gauges_impl"));
        assert!(output.contains("1."));
        assert!(output.contains("2."));
        assert!(output.contains("3."));
        assert!(output.contains("registry.bind"));
        assert!(output.contains("bundle"));
    }

    #[test]
    fn test_invalid_override_diagnostic() {
        let err = ResolveError::InvalidOverride {
            header: Symbol::new("acme.doors_h.Hatch"),
            target: Symbol::new("acme.valves.BallValve"),
            fault: OverrideFault::NotASubtype,
        };

        let diag = err.to_diagnostic();
        let output = diag.format(false);

        assert!(output.contains("acme.doors_h.Hatch"));
        assert!(output.contains("acme.valves.BallValve"));
        assert!(output.contains("does not inherit"));
    }

    #[test]
    fn test_unknown_type_lists_candidates() {
        let err = ResolveError::UnknownType {
            name: Symbol::new("acme.gauges_h.DeptGauge"),
            suggestions: vec![Symbol::new("acme.gauges_h.DepthGauge")],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("did you mean"));
        assert!(output.contains("DepthGauge"));
    }
}
