//! Synthetic vocabulary shared by the unit and integration tests.

use crate::bpe::BpeEncoder;
use crate::byte_level;

/// Every single-byte symbol (id = byte value) plus merges for a handful of
/// English words, so any text round-trips and "Hello" and " world" are one
/// token each.
pub fn tiny_encoder() -> BpeEncoder {
    let alphabet = byte_level::alphabet();
    let mut tokens: Vec<String> = (0u8..=255).map(|b| alphabet.encode(b).to_string()).collect();
    let merges = [
        ("H", "e"),
        ("l", "l"),
        ("He", "ll"),
        ("Hell", "o"),
        ("Ġ", "w"),
        ("o", "r"),
        ("Ġw", "or"),
        ("Ġwor", "l"),
        ("Ġworl", "d"),
        ("Ġ", "t"),
        ("h", "e"),
        ("Ġt", "he"),
        ("Ġ", "Ġ"),
    ];
    tokens.extend(merges.iter().map(|(a, b)| format!("{a}{b}")));
    BpeEncoder::from_parts(tokens, merges)
}
