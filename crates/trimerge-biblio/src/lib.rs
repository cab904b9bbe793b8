//! Bibliographic merge policies for TriMerge.
//!
//! The engine is generic; this crate supplies the domain: the per-field
//! policy tables for curated bibliographic records (which comparator aligns
//! each list, which unification operation governs membership, which side
//! wins divergent scalars), the author-name tokenizer, and the normalizers
//! the author comparator short-circuits through.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use trimerge_biblio::head_preferred;
//! use trimerge_engine::merge;
//!
//! let root = json!({"control_number": 963517});
//! let head = json!({"control_number": 963518});
//! let update = json!({"control_number": 963519});
//!
//! let result = merge(&root, &head, &update, &head_preferred());
//! assert_eq!(result.merged, json!({"control_number": 963518}));
//! ```

pub mod normalizers;
pub mod policies;
pub mod tokenizer;

pub use normalizers::{IdNormalizer, NameKeyNormalizer};
pub use policies::{
    author_comparator, bibliographic_config, head_preferred, reference_comparator,
    source_comparator, update_preferred,
};
pub use tokenizer::PhraseTokenizer;
