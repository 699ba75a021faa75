//! Byte-level BPE encoding (tiktoken-style).
//!
//! A chunk is split into one symbol per byte. The adjacent pair whose
//! concatenation is the lowest-rank piece of the vocabulary is merged, its
//! neighbours get new candidates, and this repeats until no adjacent pair
//! spells a known piece. Symbols live in a doubly-linked list over the chunk
//! and candidates in a min-heap, so a chunk of `L` bytes merges in
//! `O(L log L)`.

use crate::core::{MergeCandidate, MergeQueue, MergeRanks, Vocabulary};
use crate::{Result, TokenizerError};
use std::ops::Range;
use std::sync::Arc;

const NONE: usize = usize::MAX;

/// A live or absorbed symbol of the chunk being merged.
#[derive(Debug, Clone, Copy)]
struct Symbol {
    /// Byte offset of the symbol's first byte (never changes)
    start: usize,
    /// Byte offset one past the symbol's last byte
    end: usize,
    /// Index of the previous live symbol
    prev: usize,
    /// Index of the next live symbol
    next: usize,
    /// False once merged into its left neighbour
    alive: bool,
}

/// Per-chunk merge state: symbol list plus candidate heap.
struct MergeState<'a> {
    bytes: &'a [u8],
    ranks: &'a MergeRanks,
    symbols: Vec<Symbol>,
    queue: MergeQueue,
}

impl<'a> MergeState<'a> {
    fn new(bytes: &'a [u8], ranks: &'a MergeRanks) -> Self {
        let len = bytes.len();
        let symbols = (0..len)
            .map(|i| Symbol {
                start: i,
                end: i + 1,
                prev: if i == 0 { NONE } else { i - 1 },
                next: if i + 1 == len { NONE } else { i + 1 },
                alive: true,
            })
            .collect();

        let mut state = Self {
            bytes,
            ranks,
            symbols,
            queue: MergeQueue::with_capacity(len),
        };

        for i in 0..len.saturating_sub(1) {
            state.push_candidate(i, i + 1);
        }

        state
    }

    /// Queue the merge of `left` and `right` if their concatenation is a piece.
    fn push_candidate(&mut self, left: usize, right: usize) {
        let start = self.symbols[left].start;
        let end = self.symbols[right].end;

        if let Some(rank) = self.ranks.rank(&self.bytes[start..end]) {
            self.queue
                .push(MergeCandidate::new(rank, left, right, end));
        }
    }

    fn is_live(symbols: &[Symbol], candidate: &MergeCandidate) -> bool {
        let left = &symbols[candidate.left];
        let right = &symbols[candidate.right];

        left.alive && right.alive && left.next == candidate.right && right.end == candidate.right_end
    }

    /// Apply merges until no candidate remains.
    fn run(mut self) -> Vec<Range<usize>> {
        loop {
            let symbols = &self.symbols;
            let Some(candidate) = self
                .queue
                .pop_live(|c| Self::is_live(symbols, c))
            else {
                break;
            };

            let right = self.symbols[candidate.right];
            let left_idx = candidate.left;

            self.symbols[candidate.right].alive = false;
            self.symbols[left_idx].end = right.end;
            self.symbols[left_idx].next = right.next;
            if right.next != NONE {
                self.symbols[right.next].prev = left_idx;
            }

            let prev = self.symbols[left_idx].prev;
            if prev != NONE {
                self.push_candidate(prev, left_idx);
            }
            if right.next != NONE {
                self.push_candidate(left_idx, right.next);
            }
        }

        let mut pieces = Vec::new();
        let mut idx = if self.symbols.is_empty() { NONE } else { 0 };
        while idx != NONE {
            let symbol = &self.symbols[idx];
            pieces.push(symbol.start..symbol.end);
            idx = symbol.next;
        }
        pieces
    }
}

/// Merge `bytes` against `ranks` and return the byte range of every final piece.
///
/// Ranges are in order and cover `bytes` exactly.
pub fn merge_boundaries(bytes: &[u8], ranks: &MergeRanks) -> Vec<Range<usize>> {
    match bytes.len() {
        0 => Vec::new(),
        1 => vec![0..1],
        _ => MergeState::new(bytes, ranks).run(),
    }
}

/// Byte-level BPE encoder and decoder over a shared vocabulary.
#[derive(Debug, Clone)]
pub struct ByteLevelEncoder {
    vocab: Arc<Vocabulary>,
}

impl ByteLevelEncoder {
    /// Create a new encoder sharing the given vocabulary.
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    /// The vocabulary this encoder reads.
    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Encode one pre-tokenized chunk.
    pub fn encode_chunk(&self, chunk: &str) -> Result<Vec<u32>> {
        let mut ids = Vec::new();
        self.encode_bytes_into(chunk.as_bytes(), &mut ids)?;
        Ok(ids)
    }

    /// Encode raw chunk bytes, appending IDs to `out`.
    pub fn encode_bytes_into(&self, chunk: &[u8], out: &mut Vec<u32>) -> Result<()> {
        for range in merge_boundaries(chunk, self.vocab.merge_ranks()) {
            let piece = &chunk[range];
            let id = self.vocab.piece_to_id(piece).ok_or_else(|| {
                let chunk = String::from_utf8_lossy(chunk).into_owned();
                tracing::error!(piece = ?piece, chunk = %chunk, "merged symbol has no vocabulary entry");
                TokenizerError::UnknownPiece {
                    bytes: piece.to_vec(),
                    chunk,
                }
            })?;
            out.push(id);
        }
        Ok(())
    }

    /// Decode token IDs to raw bytes.
    ///
    /// Special tokens decode to their literal string.
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(ids.len() * 4);

        for &id in ids {
            let piece = self
                .vocab
                .piece_bytes(id)
                .ok_or(TokenizerError::UnknownTokenId(id))?;
            bytes.extend_from_slice(piece);
        }

        Ok(bytes)
    }

    /// Decode token IDs to a string, failing on invalid UTF-8.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        let bytes = self.decode_bytes(ids)?;
        String::from_utf8(bytes).map_err(|e| TokenizerError::InvalidUtf8 {
            valid_up_to: e.utf8_error().valid_up_to(),
        })
    }

    /// Decode token IDs to a string, replacing invalid UTF-8.
    pub fn decode_lossy(&self, ids: &[u32]) -> Result<String> {
        let bytes = self.decode_bytes(ids)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(pieces: &[(&str, u32)], special: &[&str]) -> ByteLevelEncoder {
        let table = pieces.iter().map(|&(p, r)| (p.as_bytes().to_vec(), r));
        let vocab = Vocabulary::from_merge_table(table, special.iter().copied()).unwrap();
        ByteLevelEncoder::new(Arc::new(vocab))
    }

    fn pieces(encoder: &ByteLevelEncoder, text: &str) -> Vec<String> {
        let ids = encoder.encode_chunk(text).unwrap();
        ids.iter()
            .map(|&id| String::from_utf8_lossy(encoder.vocab().piece_bytes(id).unwrap()).into_owned())
            .collect()
    }

    #[test]
    fn test_no_merges_yields_bytes() {
        let encoder = encoder(&[], &[]);
        assert_eq!(encoder.encode_chunk("ab").unwrap(), vec![97, 98]);
        assert!(encoder.encode_chunk("").unwrap().is_empty());
    }

    #[test]
    fn test_vo_us() {
        let encoder = encoder(&[("vo", 0), ("us", 1)], &[]);
        assert_eq!(pieces(&encoder, "vous"), vec!["vo", "us"]);
    }

    #[test]
    fn test_lowest_rank_beats_leftmost() {
        // A left-to-right scan would merge "vo" first; "ou" has the lower rank
        let encoder = encoder(&[("ou", 0), ("vo", 1), ("us", 2)], &[]);
        assert_eq!(pieces(&encoder, "vous"), vec!["v", "ou", "s"]);
    }

    #[test]
    fn test_merges_cascade() {
        let encoder = encoder(&[("vo", 0), ("us", 1), ("vous", 2)], &[]);
        assert_eq!(pieces(&encoder, "vous"), vec!["vous"]);
    }

    #[test]
    fn test_repeated_pair_merges_leftmost_first() {
        let encoder = encoder(&[("aa", 0)], &[]);
        assert_eq!(pieces(&encoder, "aaa"), vec!["aa", "a"]);
        assert_eq!(pieces(&encoder, "aaaa"), vec!["aa", "aa"]);
    }

    #[test]
    fn test_unreachable_piece_is_not_produced() {
        // "abc" exists but neither "ab" nor "bc" does
        let encoder = encoder(&[("abc", 0)], &[]);
        assert_eq!(pieces(&encoder, "abc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_multibyte_merges() {
        let e_acute = "é".as_bytes();
        let table = vec![(e_acute.to_vec(), 0u32), ("ré".as_bytes().to_vec(), 1)];
        let vocab = Vocabulary::from_merge_table(table, [""; 0]).unwrap();
        let encoder = ByteLevelEncoder::new(Arc::new(vocab));

        assert_eq!(encoder.encode_chunk("ré").unwrap(), vec![257]);
        assert_eq!(encoder.encode_chunk("é").unwrap(), vec![256]);
    }

    #[test]
    fn test_merge_boundaries_cover_input() {
        let encoder = encoder(&[("he", 0), ("ll", 1), ("hell", 2), ("o!", 3)], &[]);
        let bytes = b"hello!";
        let ranges = merge_boundaries(bytes, encoder.vocab().merge_ranks());

        assert_eq!(ranges, vec![0..4, 4..6]);
    }

    #[test]
    fn test_decode_roundtrip() {
        let encoder = encoder(&[("he", 0), ("ll", 1), ("hell", 2), ("o ", 3)], &["<eot>"]);
        let text = "hello world, ça va?";
        let ids = encoder.encode_chunk(text).unwrap();
        assert_eq!(encoder.decode(&ids).unwrap(), text);
    }

    #[test]
    fn test_decode_special_token_literal() {
        let encoder = encoder(&[], &["<eot>"]);
        let mut ids = encoder.encode_chunk("hi").unwrap();
        ids.push(256);
        assert_eq!(encoder.decode(&ids).unwrap(), "hi<eot>");
    }

    #[test]
    fn test_decode_unknown_id() {
        let encoder = encoder(&[], &[]);
        let err = encoder.decode_bytes(&[999_999]).unwrap_err();
        assert!(matches!(err, TokenizerError::UnknownTokenId(999_999)));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let encoder = encoder(&[], &[]);
        // First byte of "é" alone
        let err = encoder.decode(&[0xC3]).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidUtf8 { valid_up_to: 0 }));
        assert_eq!(encoder.decode_lossy(&[0xC3]).unwrap(), "\u{FFFD}");
    }
}
