//! Core data structures for Keelson.
//!
//! This module contains the foundational vocabulary used throughout Keelson:
//! - Role tags classifying registered types (header / impl / bundle)
//! - Code-unit identity (unit paths, locations, unit kinds)
//! - Registered type descriptions

pub mod descriptor;
pub mod location;
pub mod tag;

pub use descriptor::TypeDescriptor;
pub use location::{Location, LocationError, UnitKind, UnitPath};
pub use tag::ClassTag;
