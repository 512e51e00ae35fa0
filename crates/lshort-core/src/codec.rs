//! Positional base-57 codec for sequence numbers.
//!
//! The alphabet drops every glyph that is easy to confuse with another one
//! (`0`/`O`, `1`/`I`/`l`), so keys can be read aloud or retyped from print.
//! Symbols are listed in ASCII order, which makes keys of equal length sort
//! the same way as the numbers they encode.

use crate::error::CodecError;
use crate::short_key::ShortKey;
use smol_str::SmolStr;

/// The key alphabet, in ascending ASCII order.
pub const ALPHABET: &[u8; 57] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Longest key produced by [`encode`] (`u64::MAX` needs 11 symbols).
pub const MAX_KEY_LEN: usize = 11;

const BASE: u64 = ALPHABET.len() as u64;
const INVALID: u8 = u8::MAX;
const DIGITS: [u8; 128] = build_digit_table();

const fn build_digit_table() -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

fn digit(symbol: char) -> Option<u64> {
    if !symbol.is_ascii() {
        return None;
    }
    match DIGITS[symbol as usize] {
        INVALID => None,
        d => Some(d as u64),
    }
}

/// Encodes a sequence number as a short key.
///
/// Total over `u64`: every value has exactly one key, and distinct values
/// never share a key.
pub fn encode(mut n: u64) -> ShortKey {
    let mut buf = [0u8; MAX_KEY_LEN];
    let mut pos = MAX_KEY_LEN;
    loop {
        pos -= 1;
        buf[pos] = ALPHABET[(n % BASE) as usize];
        n /= BASE;
        if n == 0 {
            break;
        }
    }
    let key: SmolStr = buf[pos..].iter().map(|&b| char::from(b)).collect();
    ShortKey::from_encoded(key)
}

/// Decodes a short key back into the sequence number it was encoded from.
///
/// Only canonical keys are accepted: a key longer than one symbol may not
/// start with the zero symbol, so every number has a single spelling.
pub fn decode(key: &str) -> Result<u64, CodecError> {
    if key.is_empty() {
        return Err(CodecError::Empty);
    }
    if key.len() > 1 && key.as_bytes()[0] == ALPHABET[0] {
        return Err(CodecError::NonCanonical(key.to_string()));
    }

    key.chars()
        .enumerate()
        .try_fold(0u64, |acc, (position, symbol)| {
            let d = digit(symbol).ok_or(CodecError::InvalidSymbol { symbol, position })?;
            acc.checked_mul(BASE)
                .and_then(|v| v.checked_add(d))
                .ok_or_else(|| CodecError::Overflow(key.to_string()))
        })
}

/// Returns `true` if `key` could have been produced by [`encode`].
pub fn is_valid_key(key: &str) -> bool {
    decode(key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const CONFUSABLE: &[char] = &['0', '1', 'O', 'I', 'l'];

    #[test]
    fn alphabet_excludes_confusable_glyphs() {
        for c in CONFUSABLE {
            assert!(!ALPHABET.contains(&(*c as u8)), "alphabet contains {c:?}");
        }
        assert!(ALPHABET.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn encodes_small_values() {
        assert_eq!(encode(0).as_str(), "2");
        assert_eq!(encode(1).as_str(), "3");
        assert_eq!(encode(56).as_str(), "z");
        assert_eq!(encode(57).as_str(), "32");
        assert_eq!(encode(57 * 57).as_str(), "322");
    }

    #[test]
    fn encodes_max_value_within_key_length() {
        let key = encode(u64::MAX);
        assert_eq!(key.as_str().len(), MAX_KEY_LEN);
        assert_eq!(decode(key.as_str()), Ok(u64::MAX));
    }

    #[test]
    fn encode_is_injective_over_sampled_ranges() {
        let mut seen = HashSet::new();
        let ranges = [0..20_000u64, u64::MAX - 20_000..u64::MAX];
        for n in ranges.into_iter().flatten() {
            assert!(seen.insert(encode(n)), "duplicate key for {n}");
        }
    }

    #[test]
    fn keys_only_use_alphabet_symbols() {
        for n in (0..u64::MAX).step_by(u64::MAX as usize / 4096) {
            let key = encode(n);
            assert!(
                key.as_str().bytes().all(|b| ALPHABET.contains(&b)),
                "{key} has a symbol outside the alphabet"
            );
        }
    }

    #[test]
    fn equal_length_keys_sort_numerically() {
        let a = encode(100);
        let b = encode(101);
        let c = encode(57 * 57);
        assert!(a.as_str() < b.as_str());
        assert!(b.as_str().len() < c.as_str().len());
    }

    #[test]
    fn shorter_keys_hold_smaller_numbers() {
        let last_two = encode(57 * 57 - 1);
        let first_three = encode(57 * 57);
        assert_eq!(last_two.as_str(), "zz");
        assert_eq!(first_three.as_str(), "322");
        assert!(last_two.as_str().len() < first_three.as_str().len());
        assert_eq!(encode(3000).as_str().len(), 2);
    }

    #[test]
    fn decode_round_trips() {
        for n in [1u64, 57, 58, 3249, 1 << 32, 1 << 63] {
            assert_eq!(decode(encode(n).as_str()), Ok(n));
        }
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert_eq!(decode(""), Err(CodecError::Empty));
        assert_eq!(
            decode("ab0"),
            Err(CodecError::InvalidSymbol {
                symbol: '0',
                position: 2
            })
        );
        assert_eq!(
            decode("_links"),
            Err(CodecError::InvalidSymbol {
                symbol: '_',
                position: 0
            })
        );
        assert!(matches!(decode("23"), Err(CodecError::NonCanonical(_))));
        assert!(matches!(decode("zzzzzzzzzzzz"), Err(CodecError::Overflow(_))));
        assert!(matches!(decode("ké"), Err(CodecError::InvalidSymbol { .. })));
    }

    #[test]
    fn validity_check() {
        assert!(is_valid_key("3"));
        assert!(is_valid_key(encode(987_654_321).as_str()));
        assert!(!is_valid_key("doesnotexist0"));
        assert!(!is_valid_key("hello world"));
    }
}
