//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that chains
//! normalization, pre-tokenization, the chunk cache and the byte-level
//! merger over one shared vocabulary.

use crate::io::{TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::{
    AllowedSpecial, Chunks, NormalizationForm, Normalizer, Segment, SpecialTokenMatcher, Splitter,
};
use crate::utils::{CacheStats, EncodingCache, DEFAULT_CACHE_CAPACITY};
use mergerank_core::{ByteLevelEncoder, Result, TokenizerError, Vocabulary};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Unicode normalization applied before splitting
    pub normalization: NormalizationForm,
    /// Capacity for the chunk cache (0 disables it)
    pub cache_capacity: usize,
    /// Minimum number of chunks before `encode_parallel` uses the thread pool
    pub parallel_threshold: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationForm::None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            parallel_threshold: 64,
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    vocab: Option<Arc<Vocabulary>>,
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vocabulary (required).
    pub fn vocabulary(mut self, vocab: impl Into<Arc<Vocabulary>>) -> Self {
        self.vocab = Some(vocab.into());
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: TokenizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the normalization form.
    pub fn normalization(mut self, form: NormalizationForm) -> Self {
        self.config.normalization = form;
        self
    }

    /// Set the chunk cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Set the chunk count from which `encode_parallel` goes parallel.
    pub fn parallel_threshold(mut self, chunks: usize) -> Self {
        self.config.parallel_threshold = chunks;
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        let vocab = self.vocab.ok_or_else(|| {
            TokenizerError::InvalidConfig("a vocabulary is required to build a tokenizer".into())
        })?;
        Tokenizer::with_config(vocab, self.config)
    }
}

/// Main tokenizer struct.
///
/// Holds no mutable state besides the chunk cache, so one instance can be
/// shared between threads and used for concurrent encode calls.
#[derive(Debug)]
pub struct Tokenizer {
    /// Vocabulary
    vocab: Arc<Vocabulary>,
    /// Merger and decoder
    encoder: ByteLevelEncoder,
    /// Text splitter
    splitter: Splitter,
    /// Unicode normalizer
    normalizer: Normalizer,
    /// Chunk text -> IDs
    cache: EncodingCache,
    /// Matcher for every special token of the vocabulary
    special: SpecialTokenMatcher,
    /// Configuration
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a tokenizer with the default configuration.
    pub fn new(vocab: impl Into<Arc<Vocabulary>>) -> Result<Self> {
        Self::with_config(vocab, TokenizerConfig::default())
    }

    /// Create a tokenizer with the given configuration.
    pub fn with_config(vocab: impl Into<Arc<Vocabulary>>, config: TokenizerConfig) -> Result<Self> {
        let vocab = vocab.into();
        let special = SpecialTokenMatcher::new(&vocab, AllowedSpecial::All)?;

        tracing::debug!(
            vocab_size = vocab.len(),
            normalization = ?config.normalization,
            cache_capacity = config.cache_capacity,
            "created tokenizer"
        );

        Ok(Self {
            encoder: ByteLevelEncoder::new(Arc::clone(&vocab)),
            vocab,
            splitter: Splitter::new(),
            normalizer: Normalizer::new(config.normalization),
            cache: EncodingCache::with_capacity(config.cache_capacity),
            special,
            config,
        })
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Load a tokenizer from a tiktoken file, a saved directory or a
    /// `tokenizer.json`.
    ///
    /// `special_tokens` is only used for tiktoken files.
    pub fn from_file<S, T>(path: &Path, special_tokens: S) -> Result<Self>
    where
        S: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self::new(TokenizerLoader::load_any(path, special_tokens)?)
    }

    /// Load a tokenizer from a directory written by [`Tokenizer::save`].
    pub fn load(path: &Path) -> Result<Self> {
        Self::new(TokenizerLoader::load(path)?)
    }

    /// Save the vocabulary to a directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        TokenizerSaver::new(&self.vocab).save(path)
    }

    /// Encode text to token IDs.
    ///
    /// Special-token literals in `text` are encoded as ordinary bytes.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let text = self.normalizer.normalize(text);
        let mut ids = Vec::with_capacity(text.len() / 3 + 1);
        self.encode_ordinary_into(&text, &mut ids)?;
        Ok(ids)
    }

    /// Encode text, emitting the reserved ID of every allowed special token
    /// that appears literally in it.
    pub fn encode_with_special_tokens(
        &self,
        text: &str,
        allowed: AllowedSpecial<'_>,
    ) -> Result<Vec<u32>> {
        let listed;
        let matcher = match allowed {
            AllowedSpecial::All => &self.special,
            AllowedSpecial::Only(_) => {
                listed = SpecialTokenMatcher::new(&self.vocab, allowed)?;
                &listed
            }
        };

        let mut ids = Vec::with_capacity(text.len() / 3 + 1);
        for segment in matcher.segments(text, &self.vocab) {
            match segment {
                Segment::Special(_, id) => ids.push(id),
                Segment::Text(part) => {
                    let part = self.normalizer.normalize(part);
                    self.encode_ordinary_into(&part, &mut ids)?;
                }
            }
        }
        Ok(ids)
    }

    /// Encode many texts on the rayon pool, results in input order.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }

    /// Encode one text, merging its chunks on the rayon pool.
    ///
    /// Produces the same IDs as [`Tokenizer::encode`]. Texts with fewer
    /// chunks than the configured threshold are encoded sequentially.
    pub fn encode_parallel(&self, text: &str) -> Result<Vec<u32>> {
        let text = self.normalizer.normalize(text);
        let chunks: Vec<&str> = self.splitter.split_to_strings(&text);

        if chunks.len() < self.config.parallel_threshold {
            let mut ids = Vec::with_capacity(text.len() / 3 + 1);
            for chunk in chunks {
                ids.extend(self.encode_chunk(chunk)?);
            }
            return Ok(ids);
        }

        let per_chunk: Vec<Vec<u32>> = chunks
            .par_iter()
            .map(|chunk| self.encode_chunk(chunk))
            .collect::<Result<_>>()?;
        Ok(per_chunk.concat())
    }

    /// Encode a single pre-tokenized chunk, going through the cache.
    pub fn encode_chunk(&self, chunk: &str) -> Result<Vec<u32>> {
        self.cache
            .get_or_encode(chunk, |chunk| self.encoder.encode_chunk(chunk))
    }

    fn encode_ordinary_into(&self, text: &str, ids: &mut Vec<u32>) -> Result<()> {
        for chunk in self.splitter.split(text) {
            let chunk_ids = self.encode_chunk(chunk.text)?;
            tracing::trace!(chunk = chunk.text, rule = ?chunk.rule, ids = ?chunk_ids, "encoded chunk");
            ids.extend(chunk_ids);
        }
        Ok(())
    }

    /// Decode token IDs to raw bytes.
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        self.encoder.decode_bytes(ids)
    }

    /// Decode token IDs back to text, failing on invalid UTF-8.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.encoder.decode(ids)
    }

    /// Decode token IDs back to text, replacing invalid UTF-8.
    pub fn decode_lossy(&self, ids: &[u32]) -> Result<String> {
        self.encoder.decode_lossy(ids)
    }

    /// Get the bytes of a single token.
    pub fn id_to_piece(&self, id: u32) -> Option<&[u8]> {
        self.vocab.piece_bytes(id)
    }

    /// Get the ID of a normal piece.
    pub fn piece_to_id(&self, bytes: &[u8]) -> Option<u32> {
        self.vocab.piece_to_id(bytes)
    }

    /// Get the ID of a special token.
    pub fn special_token_id(&self, name: &str) -> Option<u32> {
        self.vocab.special_token_id(name)
    }

    /// Split text into pre-tokenizer chunks (no normalization applied).
    pub fn split<'t>(&self, text: &'t str) -> Chunks<'t> {
        self.splitter.split(text)
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Get the configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Get chunk cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached chunk.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        let table = vec![
            (b"vo".to_vec(), 0u32),
            (b"us".to_vec(), 1),
            (b" v".to_vec(), 2),
            (b" vo".to_vec(), 3),
        ];
        Vocabulary::from_merge_table(table, ["<|endoftext|>"]).unwrap()
    }

    #[test]
    fn test_builder_requires_vocabulary() {
        let err = Tokenizer::builder().build().unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_builder() {
        let tokenizer = Tokenizer::builder()
            .vocabulary(vocab())
            .cache_capacity(16)
            .parallel_threshold(1)
            .build()
            .unwrap();

        assert_eq!(tokenizer.vocab_size(), 256 + 4 + 1);
        assert_eq!(tokenizer.config().cache_capacity, 16);
        assert_eq!(tokenizer.config().normalization, NormalizationForm::None);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let tokenizer = Tokenizer::new(vocab()).unwrap();

        let text = "vous, vous!";
        let ids = tokenizer.encode(text).unwrap();
        assert_eq!(ids, vec![256, 257, b',' as u32, 259, 257, b'!' as u32]);
        assert_eq!(tokenizer.decode(&ids).unwrap(), text);
    }

    #[test]
    fn test_ordinary_encode_ignores_special_literals() {
        let tokenizer = Tokenizer::new(vocab()).unwrap();
        let eot = tokenizer.special_token_id("<|endoftext|>").unwrap();

        let ids = tokenizer.encode("vous<|endoftext|>").unwrap();
        assert!(!ids.contains(&eot));

        let ids = tokenizer
            .encode_with_special_tokens("vous<|endoftext|>", AllowedSpecial::All)
            .unwrap();
        assert_eq!(ids, vec![256, 257, eot]);
        assert_eq!(tokenizer.decode(&ids).unwrap(), "vous<|endoftext|>");
    }

    #[test]
    fn test_encode_parallel_matches_encode() {
        let tokenizer = Tokenizer::builder()
            .vocabulary(vocab())
            .parallel_threshold(2)
            .build()
            .unwrap();

        let text = "vous vous vous, 123 vous!\n".repeat(20);
        assert_eq!(
            tokenizer.encode_parallel(&text).unwrap(),
            tokenizer.encode(&text).unwrap()
        );
    }

    #[test]
    fn test_encode_batch_keeps_order() {
        let tokenizer = Tokenizer::new(vocab()).unwrap();
        let texts = ["vous", "us", " vo"];

        let batch = tokenizer.encode_batch(&texts).unwrap();
        assert_eq!(batch, vec![vec![256, 257], vec![257], vec![259]]);
    }

    #[test]
    fn test_cache_does_not_change_output() {
        let cached = Tokenizer::new(vocab()).unwrap();
        let uncached = Tokenizer::builder()
            .vocabulary(vocab())
            .cache_capacity(0)
            .build()
            .unwrap();

        let text = "vous vous vous";
        let first = cached.encode(text).unwrap();
        let second = cached.encode(text).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, uncached.encode(text).unwrap());
        assert!(cached.cache_stats().hits > 0);
        assert_eq!(uncached.cache_stats().capacity, 0);
    }

    #[test]
    fn test_normalization_is_applied() {
        let tokenizer = Tokenizer::builder()
            .vocabulary(Vocabulary::byte_level([""; 0]).unwrap())
            .normalization(NormalizationForm::NFC)
            .build()
            .unwrap();

        // "e" + combining acute accent composes to "é"
        let ids = tokenizer.encode("e\u{301}").unwrap();
        assert_eq!(tokenizer.decode(&ids).unwrap(), "\u{e9}");
    }

    #[test]
    fn test_lookups() {
        let tokenizer = Tokenizer::new(vocab()).unwrap();

        assert_eq!(tokenizer.piece_to_id(b"us"), Some(257));
        assert_eq!(tokenizer.id_to_piece(257), Some(&b"us"[..]));
        assert_eq!(tokenizer.id_to_piece(4096), None);
        assert!(matches!(
            tokenizer.decode(&[999_999]),
            Err(TokenizerError::UnknownTokenId(999_999))
        ));
    }

    #[test]
    fn test_tokenizer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tokenizer>();
    }
}
