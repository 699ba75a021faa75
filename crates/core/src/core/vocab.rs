//! Vocabulary storage and lookup.
//!
//! A [`Vocabulary`] is built once from a merge-rank table (piece bytes ->
//! rank) plus an ordered list of special tokens, and is immutable afterwards.
//! IDs are dense and assigned deterministically:
//!
//! - `0..256`: the 256 single-byte pieces, ID == byte value
//! - `256..256 + M`: the M multi-byte pieces, by ascending rank
//! - `256 + M..256 + M + K`: the K special tokens, in the order given

use super::merges::{MergeRanks, MergeStats, RankedPiece};
use crate::error::{Result, TokenizerError};
use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;

/// Number of single-byte base pieces.
pub const BASE_VOCAB_SIZE: usize = 256;

/// A single vocabulary entry, tagged by how it was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabEntry {
    /// One of the 256 raw byte values.
    ///
    /// `rank` is set when the merge table listed the byte explicitly.
    BaseByte { byte: u8, rank: Option<u32> },
    /// A multi-byte piece produced by merging.
    MergedPiece { bytes: Vec<u8>, rank: u32 },
    /// A reserved literal string never produced by merging.
    SpecialToken { name: CompactString },
}

impl VocabEntry {
    /// Bytes this entry decodes to.
    pub fn bytes(&self) -> &[u8] {
        match self {
            VocabEntry::BaseByte { byte, .. } => std::slice::from_ref(byte),
            VocabEntry::MergedPiece { bytes, .. } => bytes,
            VocabEntry::SpecialToken { name } => name.as_bytes(),
        }
    }

    /// Merge rank, if the entry has one.
    pub fn rank(&self) -> Option<u32> {
        match self {
            VocabEntry::BaseByte { rank, .. } => *rank,
            VocabEntry::MergedPiece { rank, .. } => Some(*rank),
            VocabEntry::SpecialToken { .. } => None,
        }
    }

    /// Check if this entry is a special token.
    pub fn is_special(&self) -> bool {
        matches!(self, VocabEntry::SpecialToken { .. })
    }
}

/// Registry of special tokens, in ID order.
#[derive(Debug, Clone, Default)]
pub struct SpecialTokens {
    /// Token strings, index `i` has ID `first_id + i`
    names: Vec<CompactString>,
    /// Forward lookup: token string -> ID
    ids: AHashMap<CompactString, u32>,
    /// ID of the first special token
    first_id: u32,
}

impl SpecialTokens {
    /// Look up the ID of a special token.
    #[inline]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Check if an ID is a special token.
    #[inline]
    pub fn is_special(&self, id: u32) -> bool {
        id >= self.first_id && ((id - self.first_id) as usize) < self.names.len()
    }

    /// Iterate over `(name, id)` pairs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(move |(i, name)| (name.as_str(), self.first_id + i as u32))
    }

    /// Number of special tokens.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if there are no special tokens.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Immutable byte-level BPE vocabulary.
///
/// Shared read-only between encoders (usually behind an `Arc`).
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Entry for every ID, index == ID
    entries: Vec<VocabEntry>,
    /// Multi-byte pieces, keyed by bytes
    merges: MergeRanks,
    /// Special tokens
    special: SpecialTokens,
}

impl Vocabulary {
    /// Build a vocabulary from a merge-rank table and special tokens.
    ///
    /// Single-byte entries of the table only record a rank on the matching
    /// base byte; every other entry becomes a merged piece. Fails with
    /// [`TokenizerError::InvalidVocabulary`] when a piece is empty or
    /// listed twice, a rank is used twice, or a special token is empty,
    /// repeated, or spells the same bytes as a normal piece.
    pub fn from_merge_table<I, P, S, T>(merge_table: I, special_tokens: S) -> Result<Self>
    where
        I: IntoIterator<Item = (P, u32)>,
        P: Into<Vec<u8>>,
        S: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut base_ranks: [Option<u32>; BASE_VOCAB_SIZE] = [None; BASE_VOCAB_SIZE];
        let mut merged: Vec<(Vec<u8>, u32)> = Vec::new();
        let mut seen_ranks = AHashSet::new();
        let mut seen_pieces = AHashSet::new();

        for (piece, rank) in merge_table {
            let piece: Vec<u8> = piece.into();

            if piece.is_empty() {
                return Err(TokenizerError::InvalidVocabulary(format!(
                    "empty piece with rank {}",
                    rank
                )));
            }
            if !seen_ranks.insert(rank) {
                return Err(TokenizerError::InvalidVocabulary(format!(
                    "rank {} is assigned to more than one piece (second: {:?})",
                    rank,
                    String::from_utf8_lossy(&piece)
                )));
            }
            if !seen_pieces.insert(piece.clone()) {
                return Err(TokenizerError::InvalidVocabulary(format!(
                    "piece {:?} is listed more than once",
                    String::from_utf8_lossy(&piece)
                )));
            }

            if let [byte] = piece.as_slice() {
                base_ranks[*byte as usize] = Some(rank);
            } else {
                merged.push((piece, rank));
            }
        }

        merged.sort_unstable_by_key(|&(_, rank)| rank);

        let special_names: Vec<CompactString> = special_tokens
            .into_iter()
            .map(|name| CompactString::new(name.as_ref()))
            .collect();

        let total = BASE_VOCAB_SIZE + merged.len() + special_names.len();
        if total > u32::MAX as usize {
            return Err(TokenizerError::InvalidVocabulary(format!(
                "{} entries do not fit in 32-bit token IDs",
                total
            )));
        }

        let mut entries = Vec::with_capacity(total);
        entries.extend(
            base_ranks
                .iter()
                .enumerate()
                .map(|(byte, &rank)| VocabEntry::BaseByte {
                    byte: byte as u8,
                    rank,
                }),
        );

        let mut merges = MergeRanks::with_capacity(merged.len());
        for (bytes, rank) in merged {
            let id = entries.len() as u32;
            merges.insert(bytes.clone(), RankedPiece { rank, id });
            entries.push(VocabEntry::MergedPiece { bytes, rank });
        }

        let first_id = entries.len() as u32;
        let mut ids = AHashMap::with_capacity(special_names.len());
        for name in &special_names {
            if name.is_empty() {
                return Err(TokenizerError::InvalidVocabulary(
                    "empty special token".to_string(),
                ));
            }
            if seen_pieces.contains(name.as_bytes())
                || name.len() == 1
                || merges.contains(name.as_bytes())
            {
                return Err(TokenizerError::InvalidVocabulary(format!(
                    "special token {:?} collides with a normal piece",
                    name
                )));
            }

            let id = entries.len() as u32;
            if ids.insert(name.clone(), id).is_some() {
                return Err(TokenizerError::InvalidVocabulary(format!(
                    "special token {:?} is listed more than once",
                    name
                )));
            }
            entries.push(VocabEntry::SpecialToken { name: name.clone() });
        }

        tracing::debug!(
            base = BASE_VOCAB_SIZE,
            merged = merges.len(),
            special = special_names.len(),
            "built vocabulary"
        );

        Ok(Self {
            entries,
            merges,
            special: SpecialTokens {
                names: special_names,
                ids,
                first_id,
            },
        })
    }

    /// Vocabulary with only the 256 base bytes and the given special tokens.
    pub fn byte_level<S, T>(special_tokens: S) -> Result<Self>
    where
        S: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self::from_merge_table(std::iter::empty::<(Vec<u8>, u32)>(), special_tokens)
    }

    /// Get the entry for an ID.
    #[inline]
    pub fn entry(&self, id: u32) -> Option<&VocabEntry> {
        self.entries.get(id as usize)
    }

    /// Get the bytes an ID decodes to.
    ///
    /// Special tokens decode to their literal string.
    #[inline]
    pub fn piece_bytes(&self, id: u32) -> Option<&[u8]> {
        self.entry(id).map(VocabEntry::bytes)
    }

    /// Get the ID of a normal (non-special) piece.
    #[inline]
    pub fn piece_to_id(&self, bytes: &[u8]) -> Option<u32> {
        match bytes {
            [] => None,
            [byte] => Some(*byte as u32),
            _ => self.merges.get(bytes).map(|p| p.id),
        }
    }

    /// Get the ID of a special token.
    #[inline]
    pub fn special_token_id(&self, name: &str) -> Option<u32> {
        self.special.get(name)
    }

    /// Check if an ID is a special token.
    #[inline]
    pub fn is_special(&self, id: u32) -> bool {
        self.special.is_special(id)
    }

    /// Get the merge rank of an ID, if it has one.
    pub fn rank_of(&self, id: u32) -> Option<u32> {
        self.entry(id).and_then(VocabEntry::rank)
    }

    /// Multi-byte piece table used by the merger.
    #[inline]
    pub fn merge_ranks(&self) -> &MergeRanks {
        &self.merges
    }

    /// Special token registry.
    #[inline]
    pub fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }

    /// Iterate over all entries in ID order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &VocabEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, entry)| (id as u32, entry))
    }

    /// Every ranked normal piece as `(bytes, rank)`, by ascending rank.
    ///
    /// This is the merge table the vocabulary was built from.
    pub fn ranked_pieces(&self) -> Vec<(&[u8], u32)> {
        let mut pieces: Vec<(&[u8], u32)> = self
            .entries
            .iter()
            .filter(|entry| !entry.is_special())
            .filter_map(|entry| entry.rank().map(|rank| (entry.bytes(), rank)))
            .collect();
        pieces.sort_unstable_by_key(|&(_, rank)| rank);
        pieces
    }

    /// Total number of IDs.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the base alphabet is always present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of multi-byte pieces.
    pub fn num_merged(&self) -> usize {
        self.merges.len()
    }

    /// Number of special tokens.
    pub fn num_special(&self) -> usize {
        self.special.len()
    }

    /// Summary statistics.
    pub fn stats(&self) -> VocabularyStats {
        VocabularyStats {
            total: self.len(),
            base: BASE_VOCAB_SIZE,
            merged: self.num_merged(),
            special: self.num_special(),
            ranked_base: self
                .entries
                .iter()
                .take(BASE_VOCAB_SIZE)
                .filter(|e| e.rank().is_some())
                .count(),
            merges: self.merges.stats(),
        }
    }
}

/// Summary statistics about a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyStats {
    /// Total number of IDs
    pub total: usize,
    /// Number of base byte pieces (always 256)
    pub base: usize,
    /// Number of merged pieces
    pub merged: usize,
    /// Number of special tokens
    pub special: usize,
    /// Base bytes that carried an explicit rank
    pub ranked_base: usize,
    /// Merge table statistics
    pub merges: MergeStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pieces: &[(&str, u32)]) -> Vec<(Vec<u8>, u32)> {
        pieces
            .iter()
            .map(|&(p, r)| (p.as_bytes().to_vec(), r))
            .collect()
    }

    #[test]
    fn test_id_layout() {
        let vocab = Vocabulary::from_merge_table(
            table(&[("lo", 9), ("he", 2), ("hel", 5)]),
            ["<|endoftext|>", "<|pad|>"],
        )
        .unwrap();

        assert_eq!(vocab.len(), 256 + 3 + 2);
        assert_eq!(vocab.piece_to_id(b"a"), Some(b'a' as u32));
        assert_eq!(vocab.piece_to_id(b"he"), Some(256));
        assert_eq!(vocab.piece_to_id(b"hel"), Some(257));
        assert_eq!(vocab.piece_to_id(b"lo"), Some(258));
        assert_eq!(vocab.special_token_id("<|endoftext|>"), Some(259));
        assert_eq!(vocab.special_token_id("<|pad|>"), Some(260));
        assert_eq!(vocab.piece_bytes(260), Some(b"<|pad|>".as_slice()));
        assert!(vocab.piece_bytes(261).is_none());
    }

    #[test]
    fn test_single_byte_pieces_keep_byte_ids() {
        let vocab =
            Vocabulary::from_merge_table(table(&[("b", 0), ("a", 1), ("ab", 2)]), [""; 0]).unwrap();

        assert_eq!(vocab.len(), 257);
        assert_eq!(vocab.rank_of(b'b' as u32), Some(0));
        assert_eq!(vocab.rank_of(b'a' as u32), Some(1));
        assert_eq!(vocab.rank_of(b'c' as u32), None);
        assert_eq!(vocab.piece_to_id(b"ab"), Some(256));
        assert_eq!(vocab.stats().ranked_base, 2);
    }

    #[test]
    fn test_entries_are_tagged() {
        let vocab = Vocabulary::from_merge_table(table(&[("ab", 0)]), ["<s>"]).unwrap();

        assert!(matches!(
            vocab.entry(0),
            Some(VocabEntry::BaseByte { byte: 0, rank: None })
        ));
        assert!(matches!(
            vocab.entry(256),
            Some(VocabEntry::MergedPiece { rank: 0, .. })
        ));
        assert!(vocab.entry(257).unwrap().is_special());
        assert!(vocab.is_special(257));
        assert!(!vocab.is_special(256));
    }

    #[test]
    fn test_duplicate_rank_rejected() {
        let err = Vocabulary::from_merge_table(table(&[("ab", 1), ("cd", 1)]), [""; 0]);
        assert!(matches!(err, Err(TokenizerError::InvalidVocabulary(_))));
    }

    #[test]
    fn test_duplicate_piece_rejected() {
        let err = Vocabulary::from_merge_table(table(&[("ab", 1), ("ab", 2)]), [""; 0]);
        assert!(matches!(err, Err(TokenizerError::InvalidVocabulary(_))));
    }

    #[test]
    fn test_empty_piece_rejected() {
        let err = Vocabulary::from_merge_table(vec![(Vec::new(), 0u32)], [""; 0]);
        assert!(matches!(err, Err(TokenizerError::InvalidVocabulary(_))));
    }

    #[test]
    fn test_special_collision_rejected() {
        let err = Vocabulary::from_merge_table(table(&[("<s>", 0)]), ["<s>"]);
        assert!(matches!(err, Err(TokenizerError::InvalidVocabulary(_))));

        // Single characters are always base pieces
        let err = Vocabulary::byte_level(["x"]);
        assert!(matches!(err, Err(TokenizerError::InvalidVocabulary(_))));

        let err = Vocabulary::byte_level(["<s>", "<s>"]);
        assert!(matches!(err, Err(TokenizerError::InvalidVocabulary(_))));
    }

    #[test]
    fn test_ranked_pieces_in_rank_order() {
        let vocab =
            Vocabulary::from_merge_table(table(&[("cd", 7), ("a", 3), ("ab", 1)]), ["<s>"])
                .unwrap();

        let ranked = vocab.ranked_pieces();
        assert_eq!(
            ranked,
            vec![(b"ab".as_slice(), 1), (b"a".as_slice(), 3), (b"cd".as_slice(), 7)]
        );
    }

    #[test]
    fn test_special_registry_iter() {
        let vocab = Vocabulary::byte_level(["<a>", "<b>"]).unwrap();
        let specials: Vec<_> = vocab.special_tokens().iter().collect();
        assert_eq!(specials, vec![("<a>", 256), ("<b>", 257)]);
    }
}
