//! Three-way merge engine for TriMerge.
//!
//! Reconciles a common-ancestor baseline (`root`), a curated version
//! (`head`), and an incoming version (`update`) of the same hierarchical
//! record into one merged tree plus an ordered list of conflicts. Objects
//! merge field by field under per-path fallback policies; lists are aligned
//! by pluggable comparators and assembled by per-path unification
//! operations.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use trimerge_engine::{merge, MergeConfig};
//!
//! let root = json!({"control_number": 963517});
//! let head = json!({"control_number": 963518});
//! let update = json!({"control_number": 963519});
//!
//! let result = merge(&root, &head, &update, &MergeConfig::default());
//! assert_eq!(result.merged, json!({"control_number": 963518}));
//! assert_eq!(result.conflicts.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod merger;
pub mod recorder;

mod dict_merger;
mod list_unifier;

pub use config::{FieldFallback, ListUnifyOp, MergeConfig};
pub use error::ConfigError;
pub use merger::{merge, MergeResult};
pub use recorder::ConflictRecorder;
