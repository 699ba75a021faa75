//! GPT-2 byte-to-unicode alphabet.
//!
//! HuggingFace `tokenizer.json` files spell byte-level pieces with one
//! printable character per byte. Printable ASCII and most of Latin-1 map to
//! themselves; the remaining 68 bytes map to `U+0100` onwards in byte order.

use ahash::AHashMap;
use std::sync::OnceLock;

fn is_direct(byte: u8) -> bool {
    matches!(byte, b'!'..=b'~' | 0xA1..=0xAC | 0xAE..=0xFF)
}

fn byte_to_char() -> &'static [char; 256] {
    static TABLE: OnceLock<[char; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = ['\0'; 256];
        let mut next = 0x100u32;
        for byte in 0..=255u8 {
            table[byte as usize] = if is_direct(byte) {
                byte as char
            } else {
                let ch = char::from_u32(next).unwrap_or(char::REPLACEMENT_CHARACTER);
                next += 1;
                ch
            };
        }
        table
    })
}

fn char_to_byte() -> &'static AHashMap<char, u8> {
    static TABLE: OnceLock<AHashMap<char, u8>> = OnceLock::new();
    TABLE.get_or_init(|| {
        byte_to_char()
            .iter()
            .enumerate()
            .map(|(byte, &ch)| (ch, byte as u8))
            .collect()
    })
}

/// Spell raw bytes in the byte-level alphabet.
pub fn bytes_to_alphabet(bytes: &[u8]) -> String {
    let table = byte_to_char();
    bytes.iter().map(|&b| table[b as usize]).collect()
}

/// Map a byte-level spelling back to raw bytes.
///
/// Returns the first character outside the alphabet on failure.
pub fn alphabet_to_bytes(text: &str) -> std::result::Result<Vec<u8>, char> {
    let table = char_to_byte();
    text.chars()
        .map(|ch| table.get(&ch).copied().ok_or(ch))
        .collect()
}
