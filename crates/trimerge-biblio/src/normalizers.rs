//! Author normalizers for the distance comparator's priority chain.

use std::sync::Arc;

use serde_json::Value;

use trimerge_match::{NameTokenizer, Normalizer};

/// Extracts the first identifier of a given schema from an author's `ids`
/// list.
///
/// Only the first matching id is consulted. This is safe because the
/// normalization is not the final decider: an author without the id simply
/// falls through to the next normalizer in the chain.
#[derive(Clone, Debug)]
pub struct IdNormalizer {
    schema: String,
}

impl IdNormalizer {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
        }
    }
}

impl Normalizer for IdNormalizer {
    fn normalize(&self, entity: &Value) -> Option<String> {
        let ids = entity.get("ids")?.as_array()?;
        ids.iter().find_map(|id| {
            let schema = id.get("schema")?.as_str()?;
            if schema.eq_ignore_ascii_case(&self.schema) {
                id.get("value")?.as_str().map(str::to_string)
            } else {
                None
            }
        })
    }
}

/// Canonical name key built from an author's `full_name`.
///
/// The strictness is tunable: the full key keeps every given name, a given
/// limit truncates them, and `initials_only` reduces the kept given names to
/// their first letters. A chain of these with decreasing strictness confirms
/// progressively looser exact matches before any distance arithmetic runs.
#[derive(Clone)]
pub struct NameKeyNormalizer {
    tokenizer: Arc<dyn NameTokenizer>,
    given_limit: Option<usize>,
    initials_only: bool,
}

impl NameKeyNormalizer {
    pub fn new(tokenizer: Arc<dyn NameTokenizer>) -> Self {
        Self {
            tokenizer,
            given_limit: None,
            initials_only: false,
        }
    }

    /// Keep only the first `limit` given-name tokens.
    pub fn with_given_limit(mut self, limit: usize) -> Self {
        self.given_limit = Some(limit);
        self
    }

    /// Reduce kept given-name tokens to their first letters.
    pub fn initials_only(mut self) -> Self {
        self.initials_only = true;
        self
    }
}

impl Normalizer for NameKeyNormalizer {
    fn normalize(&self, entity: &Value) -> Option<String> {
        let name = entity.get("full_name")?.as_str()?;
        let tokens = self.tokenizer.tokenize(name);
        if tokens.lastname_tokens.is_empty() {
            return None;
        }

        let mut key: Vec<String> = tokens
            .lastname_tokens
            .iter()
            .map(|t| t.to_lowercase())
            .collect();

        let mut given: Vec<String> = tokens
            .other_tokens
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        if let Some(limit) = self.given_limit {
            given.truncate(limit);
        }
        if self.initials_only {
            given = given
                .iter()
                .filter_map(|t| t.chars().next())
                .map(|c| c.to_string())
                .collect();
        }

        key.extend(given);
        Some(key.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::tokenizer::PhraseTokenizer;

    fn author(name: &str) -> Value {
        json!({"full_name": name})
    }

    #[test]
    fn id_normalizer_finds_schema_case_insensitively() {
        let normalizer = IdNormalizer::new("ORCID");
        let entity = json!({"ids": [
            {"schema": "INSPIRE BAI", "value": "J.Smith.1"},
            {"schema": "orcid", "value": "0000-0002-1825-0097"},
        ]});
        assert_eq!(
            normalizer.normalize(&entity),
            Some("0000-0002-1825-0097".to_string())
        );
    }

    #[test]
    fn id_normalizer_abstains_without_ids() {
        let normalizer = IdNormalizer::new("ORCID");
        assert_eq!(normalizer.normalize(&author("Smith, J.")), None);
        assert_eq!(normalizer.normalize(&json!({"ids": []})), None);
    }

    #[test]
    fn full_key_keeps_every_given_name() {
        let normalizer = NameKeyNormalizer::new(Arc::new(PhraseTokenizer));
        assert_eq!(
            normalizer.normalize(&author("Smith, John Edward")),
            Some("smith john edward".to_string())
        );
    }

    #[test]
    fn given_limit_truncates() {
        let normalizer = NameKeyNormalizer::new(Arc::new(PhraseTokenizer)).with_given_limit(1);
        assert_eq!(
            normalizer.normalize(&author("Smith, John Edward")),
            Some("smith john".to_string())
        );
    }

    #[test]
    fn initials_key_confirms_abbreviated_forms() {
        let normalizer = NameKeyNormalizer::new(Arc::new(PhraseTokenizer))
            .with_given_limit(1)
            .initials_only();
        assert_eq!(
            normalizer.normalize(&author("Smith, John")),
            normalizer.normalize(&author("Smith, J."))
        );
    }

    #[test]
    fn name_key_abstains_without_lastname() {
        let normalizer = NameKeyNormalizer::new(Arc::new(PhraseTokenizer));
        assert_eq!(normalizer.normalize(&author("")), None);
        assert_eq!(normalizer.normalize(&json!({})), None);
    }
}
