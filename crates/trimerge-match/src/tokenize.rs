//! The tokenizer contract for name-based matching.
//!
//! Splitting a free-text author name into classified token groups is a
//! natural-language problem the engine does not own. Callers supply an
//! implementation of [`NameTokenizer`]; the distance machinery treats its
//! output opaquely.

/// A name split into last-name tokens and everything else.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenizedName {
    /// Tokens belonging to the family-name phrase.
    pub lastname_tokens: Vec<String>,
    /// Given names, initials, suffixes.
    pub other_tokens: Vec<String>,
}

/// Splits a free-text name into classified token groups.
///
/// A token of length one is treated as an initial by the distance function;
/// tokenizers do not need to mark initials themselves.
pub trait NameTokenizer: Send + Sync {
    fn tokenize(&self, name: &str) -> TokenizedName;
}
