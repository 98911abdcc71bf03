//! Additive (Caesar) substitution over the latin alphabet.
//!
//! Only characters that lower-case to a single ASCII letter are touched;
//! everything else passes through unchanged. Case is kept, and the output
//! always has exactly one character per input character.

use crate::{
  Shift,
  Tendril,
};

const ALPHABET_LEN: i64 = 26;

/// Whether `c` takes part in the substitution.
///
/// A character is encodable when its ASCII lower-case form lies in
/// `'a'..='z'`. Full Unicode case folding is not used: U+212A KELVIN SIGN
/// folds to `k` but stays untouched here.
pub fn is_encodable(c: char) -> bool {
  matches!(c.to_ascii_lowercase(), 'a'..='z')
}

/// Rotates `c` by `shift` positions, wrapping around the alphabet.
///
/// Negative shifts rotate backwards, so `encode(encode(c, s), -s) == c` for
/// every ASCII letter.
pub fn encode(c: char, shift: Shift) -> char {
  if !is_encodable(c) {
    return c;
  }

  let base = if c.is_ascii_lowercase() { b'a' } else { b'A' };
  let index = i64::from(u32::from(c)) - i64::from(base);
  let offset = (index + i64::from(shift.get())).rem_euclid(ALPHABET_LEN);
  char::from(base + offset as u8)
}

pub fn decode(c: char, shift: Shift) -> char {
  encode(c, shift.negate())
}

pub fn encode_str(text: &str, shift: Shift) -> Tendril {
  let mut res = Tendril::new();
  encode_with(text.chars(), shift, &mut res);
  res
}

pub fn encode_with(text: impl Iterator<Item = char>, shift: Shift, buf: &mut Tendril) {
  text.for_each(|c| buf.push(encode(c, shift)));
}
