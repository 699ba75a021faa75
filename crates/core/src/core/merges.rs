//! Merge-rank table for byte-level BPE.
//!
//! Every multi-byte piece of the vocabulary is stored here keyed by its raw
//! bytes. Two adjacent symbols may merge exactly when the concatenation of
//! their bytes is a key of this table; the piece's rank orders the merges
//! (lower rank = merged first).

use ahash::AHashMap;

/// Rank and token ID of a merged (multi-byte) piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedPiece {
    /// Merge priority (lower = higher priority)
    pub rank: u32,
    /// Token ID assigned by the vocabulary loader
    pub id: u32,
}

/// Lookup table: piece bytes -> (rank, id).
#[derive(Debug, Clone, Default)]
pub struct MergeRanks {
    pieces: AHashMap<Vec<u8>, RankedPiece>,
    max_rank: Option<u32>,
}

impl MergeRanks {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `capacity` pieces.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pieces: AHashMap::with_capacity(capacity),
            max_rank: None,
        }
    }

    /// Insert a merged piece.
    ///
    /// Returns the previous entry when `bytes` was already present.
    pub(crate) fn insert(&mut self, bytes: Vec<u8>, piece: RankedPiece) -> Option<RankedPiece> {
        self.max_rank = Some(self.max_rank.map_or(piece.rank, |r| r.max(piece.rank)));
        self.pieces.insert(bytes, piece)
    }

    /// Look up the merged piece spelled by `bytes`.
    #[inline]
    pub fn get(&self, bytes: &[u8]) -> Option<RankedPiece> {
        self.pieces.get(bytes).copied()
    }

    /// Rank of the piece spelled by `bytes`, if it is a merged piece.
    #[inline]
    pub fn rank(&self, bytes: &[u8]) -> Option<u32> {
        self.pieces.get(bytes).map(|p| p.rank)
    }

    /// Check if `bytes` is a merged piece.
    #[inline]
    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.pieces.contains_key(bytes)
    }

    /// Number of merged pieces.
    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Check if the table holds no merged pieces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Highest rank in the table.
    pub fn max_rank(&self) -> Option<u32> {
        self.max_rank
    }

    /// Length in bytes of the longest merged piece.
    pub fn longest_piece(&self) -> usize {
        self.pieces.keys().map(Vec::len).max().unwrap_or(0)
    }

    /// Get statistics about the table.
    pub fn stats(&self) -> MergeStats {
        let min_rank = self.pieces.values().map(|p| p.rank).min();

        MergeStats {
            count: self.len(),
            min_rank,
            max_rank: self.max_rank,
            longest_piece: self.longest_piece(),
        }
    }
}

/// Statistics about a merge-rank table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of merged pieces
    pub count: usize,
    /// Lowest rank, if any
    pub min_rank: Option<u32>,
    /// Highest rank, if any
    pub max_rank: Option<u32>,
    /// Longest piece in bytes
    pub longest_piece: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(rank: u32, id: u32) -> RankedPiece {
        RankedPiece { rank, id }
    }

    #[test]
    fn test_insert_and_get() {
        let mut ranks = MergeRanks::new();
        ranks.insert(b"ab".to_vec(), piece(3, 256));
        ranks.insert(b"abc".to_vec(), piece(7, 257));

        assert_eq!(ranks.get(b"ab"), Some(piece(3, 256)));
        assert_eq!(ranks.rank(b"abc"), Some(7));
        assert_eq!(ranks.get(b"bc"), None);
        assert!(ranks.contains(b"ab"));
        assert_eq!(ranks.len(), 2);
    }

    #[test]
    fn test_insert_reports_previous() {
        let mut ranks = MergeRanks::new();
        assert!(ranks.insert(b"ab".to_vec(), piece(0, 256)).is_none());
        assert_eq!(ranks.insert(b"ab".to_vec(), piece(1, 257)), Some(piece(0, 256)));
    }

    #[test]
    fn test_stats() {
        let mut ranks = MergeRanks::new();
        ranks.insert(b"ab".to_vec(), piece(4, 256));
        ranks.insert(b"cd".to_vec(), piece(2, 257));
        ranks.insert(b"abcd".to_vec(), piece(9, 258));

        let stats = ranks.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min_rank, Some(2));
        assert_eq!(stats.max_rank, Some(9));
        assert_eq!(stats.longest_piece, 4);
    }

    #[test]
    fn test_empty_stats() {
        let stats = MergeRanks::new().stats();
        assert_eq!(stats, MergeStats::default());
    }
}
