//! Byte-level BPE: chunk the text, spell each chunk in the byte alphabet,
//! apply merge rules best-rank-first, then look the symbols up in the
//! vocabulary.

use std::path::Path;

use log::{debug, warn};

use crate::byte_level::{self, ByteAlphabet};
use crate::error::{Error, Result};
use crate::merges::{MergeRule, MergeTable};
use crate::split::{self, Chunks};
use crate::vocab::Vocabulary;

pub const TOKENS_FILE: &str = "tokenizer-tokens.bin";
pub const MERGES_FILE: &str = "tokenizer-bpe.bin";

/// Immutable tokenizer state. Freely shared across threads once built.
#[derive(Debug, Clone)]
pub struct BpeEncoder {
    vocab: Vocabulary,
    merges: MergeTable,
}

impl BpeEncoder {
    pub fn new(vocab: Vocabulary, merges: MergeTable) -> Self {
        BpeEncoder { vocab, merges }
    }

    /// Builds an encoder from the two raw resources: the NUL-delimited token
    /// list and the merge list.
    pub fn from_resources(tokens: &[u8], merges: &[u8]) -> Result<Self> {
        let vocab = Vocabulary::from_resource(tokens)?;
        let merges = MergeTable::from_resource(merges)?;
        debug!(
            "loaded tokenizer: {} tokens, {} merge rules",
            vocab.len(),
            merges.len()
        );
        Ok(BpeEncoder::new(vocab, merges))
    }

    /// Loads `tokenizer-tokens.bin` and `tokenizer-bpe.bin` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read(&path).map_err(|e| Error::io(path, e))
        };
        let tokens = read(TOKENS_FILE)?;
        let merges = read(MERGES_FILE)?;
        debug!("reading tokenizer data from {}", dir.display());
        BpeEncoder::from_resources(&tokens, &merges)
    }

    /// Builds an encoder from in-memory token strings and merge pairs, mostly
    /// for small synthetic vocabularies.
    pub fn from_parts<T, A, B>(tokens: T, merges: impl IntoIterator<Item = (A, B)>) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        A: Into<String>,
        B: Into<String>,
    {
        let vocab = Vocabulary::new(tokens.into_iter().map(Into::into).collect());
        BpeEncoder::new(vocab, MergeTable::new(merges))
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Lazily encodes `text`. Each call starts over from the beginning.
    pub fn encode_iter<'a>(&'a self, text: &'a str) -> Encode<'a> {
        Encode {
            encoder: self,
            alphabet: byte_level::alphabet(),
            chunks: split::split(text),
            pending: Vec::new().into_iter(),
        }
    }

    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.encode_iter(text).collect()
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.encode_iter(text).count()
    }

    /// Reassembles the raw bytes behind `ids`.
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        let alphabet = byte_level::alphabet();
        let mut out = Vec::with_capacity(ids.len() * 4);
        for &id in ids {
            let token = self.vocab.token(id).ok_or(Error::UnknownTokenId(id))?;
            for symbol in token.chars() {
                let byte = alphabet
                    .decode(symbol)
                    .ok_or(Error::UnknownSymbol { id, symbol })?;
                out.push(byte);
            }
        }
        Ok(out)
    }

    /// Decodes `ids` to text. Byte sequences that are not valid UTF-8 on
    /// their own (an id list cut inside a character) become U+FFFD.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        let bytes = self.decode_bytes(ids)?;
        Ok(match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    fn chunk_ids(&self, alphabet: &ByteAlphabet, chunk: &str) -> Vec<u32> {
        let symbols = bpe(&self.merges, alphabet.symbols(chunk.as_bytes()));
        let mut ids = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            match self.vocab.id(symbol) {
                Some(id) => ids.push(id),
                None => warn!("no encoding found for token {:?}", symbol),
            }
        }
        ids
    }
}

/// Applies merge rules to `symbols` until none matches.
///
/// Every round shrinks the sequence, so there are fewer rounds than symbols.
pub fn bpe(merges: &MergeTable, mut symbols: Vec<String>) -> Vec<String> {
    let mut scratch = String::new();
    while merge_round(merges, &mut symbols, &mut scratch) {}
    symbols
}

/// One merge round: finds the best-ranked adjacent pair anywhere in the
/// sequence and merges every non-overlapping occurrence of it, left to right.
/// Returns `false`, leaving `symbols` untouched, when no pair has a rule.
pub fn merge_round(merges: &MergeTable, symbols: &mut Vec<String>, scratch: &mut String) -> bool {
    let best = symbols
        .windows(2)
        .filter_map(|pair| merges.rank(&pair[0], &pair[1], scratch))
        .min();
    match best {
        Some(rank) => {
            merge_all(symbols, merges.rule(rank));
            true
        }
        None => false,
    }
}

fn merge_all(symbols: &mut Vec<String>, rule: &MergeRule) {
    let n = symbols.len();
    let mut dst = 0;
    let mut src = 0;
    while src < n {
        if src + 1 < n && symbols[src] == rule.first && symbols[src + 1] == rule.second {
            symbols[dst] = rule.result.clone();
            src += 2;
        } else {
            symbols.swap(dst, src);
            src += 1;
        }
        dst += 1;
    }
    symbols.truncate(dst);
}

/// Lazy token id stream returned by [`BpeEncoder::encode_iter`].
#[derive(Clone)]
pub struct Encode<'a> {
    encoder: &'a BpeEncoder,
    alphabet: &'static ByteAlphabet,
    chunks: Chunks<'a>,
    pending: std::vec::IntoIter<u32>,
}

impl Iterator for Encode<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if let Some(id) = self.pending.next() {
                return Some(id);
            }
            let chunk = self.chunks.next()?;
            self.pending = self.encoder.chunk_ids(self.alphabet, chunk).into_iter();
        }
    }
}
