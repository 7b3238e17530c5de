//! Shared utilities

pub mod diagnostic;
pub mod interning;

pub use diagnostic::{ConflictSetError, Diagnostic, Severity};
pub use interning::Symbol;
