//! Entity comparators for TriMerge.
//!
//! List elements have no stable identity, so deciding that two elements of
//! independently edited lists denote the same logical entity takes a
//! configurable strategy. This crate provides the closed set of strategies
//! the merge engine consumes:
//!
//! - [`Comparator::Equality`] -- deep value equality, the engine-wide default
//! - [`KeySetComparator`] -- ordered key-field groups ("match by DOI if both
//!   have one, else by ISBN")
//! - [`DistanceComparator`] -- a prioritized [`Normalizer`] chain with an
//!   exact short-circuit, falling back to a numeric distance function under a
//!   match threshold
//!
//! A comparator never fails: missing or ambiguous data yields "no match",
//! which biases the engine toward treating entities as unrelated rather than
//! merging them by accident.

pub mod comparator;
pub mod distance;
pub mod normalize;
pub mod tokenize;

pub use comparator::{Comparator, KeySetComparator};
pub use distance::{token_distance, DistanceComparator, DistanceFn, NameDistance};
pub use normalize::Normalizer;
pub use tokenize::{NameTokenizer, TokenizedName};
