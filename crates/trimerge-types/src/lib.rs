//! Foundation types for TriMerge.
//!
//! This crate provides the types shared by every other TriMerge crate: paths
//! that address a location inside a record tree, and the conflict records the
//! merge engine emits when the curated and incoming versions disagree.
//!
//! # Key Types
//!
//! - [`Path`] / [`Segment`] -- Address of a location in a tree (field names
//!   and list indices)
//! - [`Conflict`] / [`ConflictKind`] -- A divergence the engine could not
//!   silently resolve

pub mod conflict;
pub mod path;

pub use conflict::{Conflict, ConflictKind};
pub use path::{Path, Segment};
