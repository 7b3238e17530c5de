//! User-facing diagnostic messages.
//!
//! Every fatal error carries the failing name plus concrete suggestions
//! for fixing it. Frontends render diagnostics; this crate only builds
//! them.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common suggestion messages for consistent wording across errors.
pub mod suggestions {
    /// Suggestion when a header has no implementation anywhere.
    pub const REGISTER_IMPL: &str =
        "Register an implementation type in the conventional sibling unit";

    /// Suggestion to bind an implementation explicitly.
    pub const BIND_EXPLICIT: &str =
        "Bind an implementation explicitly with `registry.bind(header, impl)`";

    /// Suggestion to reclassify a self-contained type.
    pub const RECLASSIFY_BUNDLE: &str =
        "Tag the type as `bundle` if it carries its own implementation";

    /// Suggestion when a name lookup fails outright.
    pub const CHECK_SPELLING: &str =
        "Check that the fully-qualified name is spelled correctly";

    /// Suggestion when a unit has not been registered.
    pub const REGISTER_UNIT: &str =
        "Ensure the unit is registered or reachable through a unit loader";
}

/// Severity level for diagnostics and conflict records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A diagnostic message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related code unit (fully-qualified name)
    pub location: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add the code unit the diagnostic refers to.
    pub fn with_location(mut self, fqn: impl Into<String>) -> Self {
        self.location = Some(fqn.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        // Severity prefix with optional color
        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
                Severity::Help => "\x1b[1;32mhelp\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
                Severity::Help => "help",
            }
        };

        // Main message
        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        // Location if present
        if let Some(ref fqn) = self.location {
            output.push_str(&format!("  --> {}\n", fqn));
        }

        // Context lines
        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }

        // Suggestions
        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Unsatisfiable dependency constraints, raised when a strict-mode report
/// is turned into a result.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("{conflict_count} dependency conflict(s) across {package_count} package(s)")]
#[diagnostic(
    code(keelson::deps::conflicts),
    help("Align the constraints listed above, or run with an advisory policy to inspect the full report")
)]
pub struct ConflictSetError {
    pub package_count: usize,
    pub conflict_count: usize,
    /// One pre-rendered line per conflict.
    pub details: Vec<String>,
}
