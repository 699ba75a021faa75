//! Text splitting for pre-tokenization.
//!
//! Text is cut into chunks by an ordered rule set before BPE merging. At each
//! scan position the first rule that matches wins:
//!
//! 1. contraction suffix: `'s 't 're 've 'm 'll 'd` (case-insensitive)
//! 2. word: an optional non-letter, non-digit, non-newline prefix then letters
//! 3. digits: 1 to 3 numeric characters
//! 4. symbols: an optional space, non-space non-alphanumerics, trailing newlines
//! 5. newlines: whitespace ending in a run of `\r`/`\n`
//! 6. trailing whitespace: whitespace not followed by a non-space
//! 7. whitespace: any other whitespace run
//!
//! Rule 6 needs a lookahead the `regex` crate lacks; it is applied by hand on
//! top of rule 7 matches. Concatenating the chunks always gives back the
//! input byte for byte.

use regex::Regex;
use std::sync::OnceLock;

/// Combined pattern for rules 1-5 and 7, one named group per rule.
const SPLIT_PATTERN: &str = concat!(
    r"(?P<contraction>'(?i:s|t|re|ve|m|ll|d))",
    r"|(?P<word>[^\r\n\p{L}\p{N}]?\p{L}+)",
    r"|(?P<digits>\p{N}{1,3})",
    r"|(?P<symbols> ?[^\s\p{L}\p{N}]+[\r\n]*)",
    r"|(?P<newlines>\s*[\r\n]+)",
    r"|(?P<whitespace>\s+)",
);

/// The rule that produced a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitRule {
    /// `'s`, `'t`, `'re`, `'ve`, `'m`, `'ll`, `'d`
    Contraction,
    /// Optional one-character prefix followed by letters
    Word,
    /// One to three digits
    Digits,
    /// Optional space, punctuation/symbol run, trailing newlines
    Symbols,
    /// Whitespace run ending in newlines
    Newlines,
    /// Whitespace not followed by a non-space character
    TrailingWhitespace,
    /// Any remaining whitespace
    Whitespace,
    /// A character no rule matched (a gap in the rule set)
    Unmatched,
}

impl SplitRule {
    const GROUPS: [(&'static str, SplitRule); 6] = [
        ("contraction", SplitRule::Contraction),
        ("word", SplitRule::Word),
        ("digits", SplitRule::Digits),
        ("symbols", SplitRule::Symbols),
        ("newlines", SplitRule::Newlines),
        ("whitespace", SplitRule::Whitespace),
    ];
}

/// A pre-tokenized chunk of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'t> {
    /// The chunk text
    pub text: &'t str,
    /// Byte offset of the chunk in the input
    pub start: usize,
    /// Rule that produced the chunk
    pub rule: SplitRule,
}

impl Chunk<'_> {
    /// Byte offset one past the end of the chunk.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

fn split_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant covered by tests
    RE.get_or_init(|| Regex::new(SPLIT_PATTERN).expect("built-in split pattern is valid"))
}

/// Text splitter for pre-tokenization.
///
/// Cheap to construct and to clone; the compiled pattern is shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct Splitter;

impl Splitter {
    /// Create a new splitter with the built-in rule set.
    pub fn new() -> Self {
        Self
    }

    /// Lazily split text into chunks.
    ///
    /// Each call returns a fresh iterator over the same chunks.
    pub fn split<'t>(&self, text: &'t str) -> Chunks<'t> {
        Chunks {
            regex: split_regex(),
            text,
            pos: 0,
            gap_end: 0,
        }
    }

    /// Split text into chunk strings.
    pub fn split_to_strings<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.split(text).map(|chunk| chunk.text).collect()
    }
}

/// Lazy iterator over the chunks of a text.
#[derive(Debug, Clone)]
pub struct Chunks<'t> {
    regex: &'static Regex,
    text: &'t str,
    pos: usize,
    /// End of a pending run of unmatched characters
    gap_end: usize,
}

impl<'t> Chunks<'t> {
    fn emit(&mut self, end: usize, rule: SplitRule) -> Chunk<'t> {
        let chunk = Chunk {
            text: &self.text[self.pos..end],
            start: self.pos,
            rule,
        };
        self.pos = end;
        chunk
    }

    /// Emit the next unmatched character as its own chunk.
    fn emit_unmatched(&mut self) -> Option<Chunk<'t>> {
        let ch = self.text[self.pos..].chars().next()?;
        tracing::warn!(
            offset = self.pos,
            ch = ?ch,
            "no split rule matched, emitting singleton chunk"
        );
        Some(self.emit(self.pos + ch.len_utf8(), SplitRule::Unmatched))
    }
}

impl<'t> Iterator for Chunks<'t> {
    type Item = Chunk<'t>;

    fn next(&mut self) -> Option<Chunk<'t>> {
        if self.pos >= self.text.len() {
            return None;
        }
        if self.pos < self.gap_end {
            return self.emit_unmatched();
        }

        let Some(caps) = self.regex.captures_at(self.text, self.pos) else {
            self.gap_end = self.text.len();
            return self.emit_unmatched();
        };
        let whole = caps.get(0)?;

        if whole.start() > self.pos {
            self.gap_end = whole.start();
            return self.emit_unmatched();
        }

        let rule = SplitRule::GROUPS
            .iter()
            .find(|(name, _)| caps.name(name).is_some())
            .map_or(SplitRule::Unmatched, |&(_, rule)| rule);

        if rule != SplitRule::Whitespace {
            return Some(self.emit(whole.end(), rule));
        }

        // `\s+(?!\S)`: a run reaching the end of the text matches whole; a
        // longer run before a non-space gives back its last character.
        let run = whole.as_str();
        if whole.end() == self.text.len() {
            return Some(self.emit(whole.end(), SplitRule::TrailingWhitespace));
        }
        match run.char_indices().next_back() {
            Some((last, _)) if last > 0 => {
                Some(self.emit(self.pos + last, SplitRule::TrailingWhitespace))
            }
            _ => Some(self.emit(whole.end(), SplitRule::Whitespace)),
        }
    }
}
