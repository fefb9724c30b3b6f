//! GPT-2 byte-level alphabet: a bijection between the 256 byte values and 256
//! displayable characters, so that string-based merge rules can operate over
//! arbitrary bytes.
//!
//! Printable ASCII and most of Latin-1 (0x21..=0x7E, 0xA1..=0xAC, 0xAE..=0xFF)
//! map to themselves; the remaining 68 bytes map to U+0100..=U+0143 in
//! ascending byte order.

use std::sync::LazyLock;

/// One past the highest code point the alphabet assigns.
const SYMBOL_LIMIT: usize = 0x100 + 68;

static ALPHABET: LazyLock<ByteAlphabet> = LazyLock::new(ByteAlphabet::build);

/// Returns the process-wide alphabet, building it on first use.
pub fn alphabet() -> &'static ByteAlphabet {
    &ALPHABET
}

pub struct ByteAlphabet {
    to_char: [char; 256],
    to_byte: [Option<u8>; SYMBOL_LIMIT],
}

impl ByteAlphabet {
    fn build() -> Self {
        let to_char = byte_to_char_table();
        let mut to_byte = [None; SYMBOL_LIMIT];
        for (b, &ch) in to_char.iter().enumerate() {
            to_byte[ch as usize] = Some(b as u8);
        }
        ByteAlphabet { to_char, to_byte }
    }

    #[inline]
    pub fn encode(&self, byte: u8) -> char {
        self.to_char[byte as usize]
    }

    /// Maps a symbol back to its byte; `None` if the symbol is not in the alphabet.
    #[inline]
    pub fn decode(&self, symbol: char) -> Option<u8> {
        self.to_byte.get(symbol as usize).copied().flatten()
    }

    /// Encode raw bytes into one single-character string per byte, the
    /// starting point of a merge sequence.
    pub fn symbols(&self, input: &[u8]) -> Vec<String> {
        input.iter().map(|&b| self.encode(b).to_string()).collect()
    }
}

fn byte_to_char_table() -> [char; 256] {
    let mut table = ['\0'; 256];
    let mut n: u32 = 0;
    for b in 0u16..256 {
        let cp = match b as u8 {
            0x21..=0x7E | 0xA1..=0xAC | 0xAE..=0xFF => b as u32,
            _ => {
                let c = 0x100 + n;
                n += 1;
                c
            }
        };
        // Every value is below U+0144, well inside the scalar range.
        table[b as usize] = char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER);
    }
    table
}
