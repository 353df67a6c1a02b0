//! RFC 4648 base32 encoding without padding.
//!
//! Tokens only ever need encoding; decoding is never required because the
//! encoded text itself is the storage key stem.

/// The standard RFC 4648 alphabet. Every symbol is an unreserved URL character.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Number of characters produced when encoding `len` bytes without padding.
pub const fn encoded_len(len: usize) -> usize {
    (len * 8).div_ceil(5)
}

/// Encodes `data` as unpadded base32.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(data.len()));
    let mut buffer: u64 = 0;
    let mut bits_left = 0;

    for &byte in data {
        buffer = (buffer << 8) | byte as u64;
        bits_left += 8;
        while bits_left >= 5 {
            bits_left -= 5;
            let index = ((buffer >> bits_left) & 0x1F) as usize;
            out.push(ALPHABET[index] as char);
        }
    }
    if bits_left > 0 {
        let index = ((buffer << (5 - bits_left)) & 0x1F) as usize;
        out.push(ALPHABET[index] as char);
    }
    out
}

/// Returns true if `c` belongs to [`ALPHABET`].
pub fn is_alphabet_char(c: char) -> bool {
    matches!(c, 'A'..='Z' | '2'..='7')
}
