//! Key events as the input-method host delivers them.
//!
//! A key event is an X11-style keysym plus a modifier bit mask. Only the
//! modifiers in [`ModifierMask::TRACKED`] matter to the engine, so lock keys
//! never change what a key press does.

use std::{
  fmt,
  str::FromStr,
};

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
  /// Modifier state, bit-compatible with the host's modifier type.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct ModifierMask: u32 {
    const SHIFT   = 1 << 0;
    const LOCK    = 1 << 1;
    const CONTROL = 1 << 2;
    const ALT     = 1 << 3;
    const MOD2    = 1 << 4;
    const SUPER   = 1 << 26;
    const RELEASE = 1 << 30;
  }
}

impl ModifierMask {
  pub const TRACKED: Self = Self::CONTROL
    .union(Self::ALT)
    .union(Self::SHIFT)
    .union(Self::SUPER)
    .union(Self::RELEASE);

  /// The tracked modifiers, ignoring shift.
  pub const fn significant(self) -> Self {
    self.intersection(Self::TRACKED).difference(Self::SHIFT)
  }

  pub const fn is_release(self) -> bool {
    self.contains(Self::RELEASE)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keysym(pub u32);

impl Keysym {
  pub const BACKSPACE: Self = Self(0xff08);
  pub const TAB: Self = Self(0xff09);
  pub const RETURN: Self = Self(0xff0d);
  pub const ESCAPE: Self = Self(0xff1b);
  pub const HOME: Self = Self(0xff50);
  pub const LEFT: Self = Self(0xff51);
  pub const UP: Self = Self(0xff52);
  pub const RIGHT: Self = Self(0xff53);
  pub const DOWN: Self = Self(0xff54);
  pub const END: Self = Self(0xff57);
  pub const DELETE: Self = Self(0xffff);

  /// Hardware keycode sent along with synthetic `Left` presses.
  pub const LEFT_KEYCODE: u32 = 105;

  pub const fn get(self) -> u32 {
    self.0
  }

  /// Cursor, editing and other keys from the `0xff00` block, which have no
  /// printable representation.
  pub const fn is_function_key(self) -> bool {
    self.0 >= 0xff00 && self.0 <= 0xffff
  }

  /// The keysym read as a code point. Values that are not Unicode scalar
  /// values yield `None`.
  pub const fn to_char(self) -> Option<char> {
    char::from_u32(self.0)
  }

  const NAMED: [(&'static str, Self); 12] = [
    ("space", Self(0x20)),
    ("bs", Self::BACKSPACE),
    ("tab", Self::TAB),
    ("ret", Self::RETURN),
    ("esc", Self::ESCAPE),
    ("home", Self::HOME),
    ("left", Self::LEFT),
    ("up", Self::UP),
    ("right", Self::RIGHT),
    ("down", Self::DOWN),
    ("end", Self::END),
    ("del", Self::DELETE),
  ];

  fn name(self) -> Option<&'static str> {
    Self::NAMED
      .iter()
      .find(|(_, keysym)| *keysym == self)
      .map(|(name, _)| *name)
  }
}

impl From<char> for Keysym {
  fn from(c: char) -> Self {
    Self(c as u32)
  }
}

impl fmt::Display for Keysym {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(name) = self.name() {
      return f.write_str(name);
    }
    match self.to_char() {
      Some(c) if !c.is_control() && !c.is_whitespace() && c != '-' => write!(f, "{c}"),
      _ => write!(f, "{:#x}", self.0),
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseKeyPressError {
  #[error("empty key literal")]
  Empty,
  #[error("repeated key modifier '{0}-'")]
  RepeatedModifier(String),
  #[error("invalid key modifier '{0}-'")]
  InvalidModifier(String),
  #[error("unknown key '{0}'")]
  UnknownKey(String),
}

/// A single key event: what was pressed and under which modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
  pub keysym: Keysym,
  pub state:  ModifierMask,
}

impl KeyPress {
  pub const fn new(keysym: Keysym, state: ModifierMask) -> Self {
    Self { keysym, state }
  }

  pub fn char(c: char) -> Self {
    Self::new(Keysym::from(c), ModifierMask::empty())
  }
}

impl fmt::Display for KeyPress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let prefixes = [
      (ModifierMask::RELEASE, "R-"),
      (ModifierMask::CONTROL, "C-"),
      (ModifierMask::ALT, "A-"),
      (ModifierMask::SUPER, "M-"),
      (ModifierMask::SHIFT, "S-"),
    ];
    for (modifier, prefix) in prefixes {
      if self.state.contains(modifier) {
        f.write_str(prefix)?;
      }
    }
    write!(f, "{}", self.keysym)
  }
}

impl FromStr for KeyPress {
  type Err = ParseKeyPressError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
      return Err(ParseKeyPressError::Empty);
    }

    if trimmed == "-" {
      return Ok(Self::char('-'));
    }

    let mut tokens: Vec<_> = trimmed.split('-').collect();
    let key_token = tokens.pop().ok_or(ParseKeyPressError::Empty)?;

    let mut state = ModifierMask::empty();
    for token in tokens {
      let modifier = token.trim();
      if modifier.is_empty() {
        continue;
      }

      let bit = match modifier.to_ascii_uppercase().as_str() {
        "S" | "SHIFT" => ModifierMask::SHIFT,
        "C" | "CTRL" | "CONTROL" => ModifierMask::CONTROL,
        "A" | "ALT" => ModifierMask::ALT,
        "M" | "SUPER" => ModifierMask::SUPER,
        "R" | "RELEASE" => ModifierMask::RELEASE,
        _ => return Err(ParseKeyPressError::InvalidModifier(modifier.to_string())),
      };
      if state.contains(bit) {
        return Err(ParseKeyPressError::RepeatedModifier(modifier.to_string()));
      }
      state.insert(bit);
    }

    Ok(Self::new(parse_keysym(key_token)?, state))
  }
}

fn parse_keysym(token: &str) -> Result<Keysym, ParseKeyPressError> {
  let mut chars = token.chars();
  if let (Some(c), None) = (chars.next(), chars.next()) {
    return Ok(Keysym::from(c));
  }

  if let Some(hex) = token
    .strip_prefix("0x")
    .or_else(|| token.strip_prefix("0X"))
  {
    return u32::from_str_radix(hex, 16)
      .map(Keysym)
      .map_err(|_| ParseKeyPressError::UnknownKey(token.to_string()));
  }

  let keysym = match token.to_ascii_lowercase().as_str() {
    "space" => Keysym(0x20),
    "minus" => Keysym::from('-'),
    "enter" | "ret" | "return" => Keysym::RETURN,
    "esc" | "escape" => Keysym::ESCAPE,
    "backspace" | "bs" => Keysym::BACKSPACE,
    "tab" => Keysym::TAB,
    "delete" | "del" => Keysym::DELETE,
    "home" => Keysym::HOME,
    "end" => Keysym::END,
    "left" => Keysym::LEFT,
    "right" => Keysym::RIGHT,
    "up" => Keysym::UP,
    "down" => Keysym::DOWN,
    invalid => return Err(ParseKeyPressError::UnknownKey(invalid.to_string())),
  };
  Ok(keysym)
}

#[cfg(test)]
mod test {
  use super::*;

  fn press(s: &str) -> KeyPress {
    s.parse().unwrap()
  }

  #[test]
  fn test_significant_ignores_shift_and_locks() {
    let state = ModifierMask::SHIFT | ModifierMask::LOCK | ModifierMask::MOD2;
    assert!(state.significant().is_empty());

    let state = ModifierMask::SHIFT | ModifierMask::CONTROL;
    assert_eq!(state.significant(), ModifierMask::CONTROL);

    let state = ModifierMask::RELEASE;
    assert_eq!(state.significant(), ModifierMask::RELEASE);
  }

  #[test]
  fn test_bits_match_host_layout() {
    assert_eq!(ModifierMask::CONTROL.bits(), 4);
    assert_eq!(ModifierMask::ALT.bits(), 8);
    assert_eq!(ModifierMask::SUPER.bits(), 0x0400_0000);
    assert_eq!(ModifierMask::RELEASE.bits(), 0x4000_0000);
  }

  #[test]
  fn test_keysym_to_char() {
    assert_eq!(Keysym(0x61).to_char(), Some('a'));
    assert_eq!(Keysym(0xd800).to_char(), None);
    assert_eq!(Keysym(0x0100_0041).to_char(), None);
    assert!(Keysym::LEFT.is_function_key());
    assert!(!Keysym::from('a').is_function_key());
  }

  #[test]
  fn test_parse_plain_keys() {
    assert_eq!(press("a"), KeyPress::char('a'));
    assert_eq!(press("-"), KeyPress::char('-'));
    assert_eq!(press("space").keysym, Keysym(0x20));
    assert_eq!(press("left").keysym, Keysym::LEFT);
    assert_eq!(press("0xff0d").keysym, Keysym::RETURN);
  }

  #[test]
  fn test_parse_modifiers() {
    let key = press("C-S-e");
    assert_eq!(key.keysym, Keysym::from('e'));
    assert_eq!(key.state, ModifierMask::CONTROL | ModifierMask::SHIFT);

    let key = press("R-ctrl-e");
    assert_eq!(key.state, ModifierMask::CONTROL | ModifierMask::RELEASE);

    assert_eq!(press("M-a").state, ModifierMask::SUPER);
    assert_eq!(press("A-x").state, ModifierMask::ALT);
  }

  #[test]
  fn test_parse_errors() {
    assert_eq!("".parse::<KeyPress>(), Err(ParseKeyPressError::Empty));
    assert_eq!(
      "C-C-e".parse::<KeyPress>(),
      Err(ParseKeyPressError::RepeatedModifier("C".into()))
    );
    assert_eq!(
      "X-e".parse::<KeyPress>(),
      Err(ParseKeyPressError::InvalidModifier("X".into()))
    );
    assert_eq!(
      "nope".parse::<KeyPress>(),
      Err(ParseKeyPressError::UnknownKey("nope".into()))
    );
  }

  #[test]
  fn test_display_round_trips() {
    for literal in ["a", "C-S-e", "R-C-e", "A-x", "M-q", "left", "space", "0xd800"] {
      assert_eq!(press(literal).to_string(), literal);
    }
  }
}
