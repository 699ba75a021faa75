//! Special-token extraction.
//!
//! Before ordinary pre-tokenization, text may be cut on literal occurrences
//! of allowed special tokens. The earliest occurrence wins; when several
//! tokens start at the same position the longest one wins.

use mergerank_core::{Result, TokenizerError, Vocabulary};
use regex::Regex;

/// Which special tokens `encode_with_special_tokens` recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedSpecial<'a> {
    /// Every special token of the vocabulary
    All,
    /// Only the listed tokens
    Only(&'a [&'a str]),
}

/// A piece of text between or at special-token occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Ordinary text to pre-tokenize and merge
    Text(&'t str),
    /// A special-token literal with its reserved ID
    Special(&'t str, u32),
}

/// Finds special-token literals in text.
#[derive(Debug, Clone)]
pub struct SpecialTokenMatcher {
    /// Alternation of escaped literals, longest first; `None` when empty
    regex: Option<Regex>,
}

impl SpecialTokenMatcher {
    /// Build a matcher for the given special tokens.
    ///
    /// Fails with `InvalidConfig` when a name is not a special token of
    /// `vocab`.
    pub fn new(vocab: &Vocabulary, allowed: AllowedSpecial<'_>) -> Result<Self> {
        let mut names: Vec<&str> = match allowed {
            AllowedSpecial::All => vocab.special_tokens().iter().map(|(name, _)| name).collect(),
            AllowedSpecial::Only(names) => {
                if let Some(unknown) = names.iter().find(|n| vocab.special_token_id(n).is_none()) {
                    return Err(TokenizerError::InvalidConfig(format!(
                        "{:?} is not a special token of this vocabulary",
                        unknown
                    )));
                }
                names.to_vec()
            }
        };

        if names.is_empty() {
            return Ok(Self { regex: None });
        }

        // Leftmost-first alternation: longer literals must come first
        names.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();

        let pattern = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&pattern).map_err(|e| {
            TokenizerError::InvalidConfig(format!("special token pattern: {}", e))
        })?;

        Ok(Self { regex: Some(regex) })
    }

    /// Check if the matcher recognizes no tokens.
    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    /// Cut text into ordinary and special segments, in order.
    ///
    /// Empty text segments are omitted.
    pub fn segments<'t>(&self, text: &'t str, vocab: &Vocabulary) -> Vec<Segment<'t>> {
        let Some(regex) = &self.regex else {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::Text(text)]
            };
        };

        let mut segments = Vec::new();
        let mut last = 0;

        for m in regex.find_iter(text) {
            // Every alternative of the pattern is a registered special token
            let Some(id) = vocab.special_token_id(m.as_str()) else {
                continue;
            };
            if m.start() > last {
                segments.push(Segment::Text(&text[last..m.start()]));
            }
            segments.push(Segment::Special(m.as_str(), id));
            last = m.end();
        }

        if last < text.len() {
            segments.push(Segment::Text(&text[last..]));
        }

        segments
    }
}
