//! Canonical-key normalizers for the distance comparator's priority chain.

use serde_json::Value;

/// Derives a canonical string key from an entity, or nothing when the entity
/// lacks the data this normalizer works from.
///
/// Normalizers are tried in chain order; the first one that produces a key
/// for *both* entities under comparison decides by string equality, so
/// identity-based normalizers (a stable id) should precede name-based ones of
/// increasing leniency. A `None` is not a mismatch, only an abstention.
pub trait Normalizer: Send + Sync {
    /// A canonical key for `entity`, or `None` to abstain.
    fn normalize(&self, entity: &Value) -> Option<String>;
}

impl<F> Normalizer for F
where
    F: Fn(&Value) -> Option<String> + Send + Sync,
{
    fn normalize(&self, entity: &Value) -> Option<String> {
        self(entity)
    }
}
