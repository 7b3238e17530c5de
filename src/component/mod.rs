//! Component registration, resolution, and construction.
//!
//! This module carries the runtime half of Keelson:
//! - Construction contracts tying header names to Rust interfaces
//! - The component registry with its resolution rules
//! - Resolution error types and diagnostics

pub mod contract;
pub mod errors;
pub mod registry;

pub use contract::{Constructor, Contract};
pub use errors::{OverrideFault, ResolveError};
pub use registry::{ComponentRegistry, UnitLoader};
