//! Manifest and tree error types.

use thiserror::Error;

use crate::core::location::LocationError;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::Symbol;

/// Error while building or querying a manifest tree.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid location: {0}")]
    InvalidLocation(#[from] LocationError),

    #[error("a manifest is already registered at `{fqn}`")]
    DuplicateNode { fqn: Symbol },

    #[error("no manifest registered at `{fqn}`")]
    UnknownNode {
        fqn: Symbol,
        suggestions: Vec<Symbol>,
    },
}

impl ManifestError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ManifestError::InvalidLocation(source) => {
                Diagnostic::error(format!("invalid location: {}", source))
                    .with_suggestion("Give a method location both a unit and a type".to_string())
            }

            ManifestError::DuplicateNode { fqn } => {
                Diagnostic::error(format!("a manifest is already registered at `{}`", fqn))
                    .with_location(fqn.as_str())
                    .with_suggestion(
                        "Register each location once; update the existing node instead".to_string(),
                    )
            }

            ManifestError::UnknownNode {
                fqn,
                suggestions: candidates,
            } => {
                let mut diag =
                    Diagnostic::error(format!("no manifest registered at `{}`", fqn));

                if !candidates.is_empty() {
                    let names: Vec<&str> = candidates.iter().map(|s| s.as_str()).collect();
                    diag = diag.with_context(format!("did you mean: {}?", names.join(", ")));
                }

                diag.with_suggestion(suggestions::CHECK_SPELLING.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_node_diagnostic() {
        let err = ManifestError::DuplicateNode {
            fqn: Symbol::new("acme.gauges"),
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("already registered"));
        assert!(output.contains("acme.gauges"));
    }

    #[test]
    fn test_unknown_node_lists_candidates() {
        let err = ManifestError::UnknownNode {
            fqn: Symbol::new("acme.gauge"),
            suggestions: vec![Symbol::new("acme.gauges")],
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("did you mean: acme.gauges?"));
    }
}
