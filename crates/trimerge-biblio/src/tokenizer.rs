//! Name-phrase tokenization for bibliographic author strings.

use trimerge_match::{NameTokenizer, TokenizedName};

/// Comma-convention author-name tokenizer.
///
/// Bibliographic author strings put the family name first: `"Smith, John
/// E."`. Everything before the first comma is the last-name phrase; the rest
/// are given names, initials, and suffixes. Without a comma the final word
/// is taken as the family name (`"John Smith"`). Periods and inner commas
/// separate tokens, so `"J.R."` yields two initials.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhraseTokenizer;

impl NameTokenizer for PhraseTokenizer {
    fn tokenize(&self, name: &str) -> TokenizedName {
        match name.split_once(',') {
            Some((last, rest)) => TokenizedName {
                lastname_tokens: words(last),
                other_tokens: words(rest),
            },
            None => {
                let mut tokens = words(name);
                match tokens.pop() {
                    Some(last) => TokenizedName {
                        lastname_tokens: vec![last],
                        other_tokens: tokens,
                    },
                    None => TokenizedName::default(),
                }
            }
        }
    }
}

fn words(phrase: &str) -> Vec<String> {
    phrase
        .split(|c: char| c.is_whitespace() || c == '.' || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
