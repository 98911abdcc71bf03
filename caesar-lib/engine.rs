//! Key event interpretation.
//!
//! A [`CaesarEngine`] looks at one key event at a time and decides between
//! three outcomes:
//!
//! - a plain letter (no modifiers besides shift) is committed encrypted,
//! - `Ctrl+E` re-commits the selection (or the whole field when nothing is
//!   selected) encrypted, `Ctrl+Shift+E` decrypts it instead,
//! - anything else is left to the host.
//!
//! The engine keeps no state besides its shift. All text access goes
//! through the [`Host`] it is handed per call.

use std::cmp::Ordering;

use caesar_core::{
  Shift,
  cipher,
};

use crate::{
  host::{
    Host,
    Result,
  },
  input::{
    KeyPress,
    Keysym,
    ModifierMask,
  },
};

/// How chatty the engine is in its debug output.
///
/// Level 1 covers what gets encrypted, level 2 the surrounding text the
/// host reported, level 3 the engine lifecycle. Results never depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Verbosity(u8);

impl Verbosity {
  pub const QUIET: Self = Self(0);

  pub const fn new(level: u8) -> Self {
    Self(level)
  }

  pub const fn get(self) -> u8 {
    self.0
  }

  pub const fn enabled(self, level: u8) -> bool {
    level <= self.0
  }
}

macro_rules! debug_at {
  ($verbosity:expr, $level:expr, $($arg:tt)+) => {
    if $verbosity.enabled($level) {
      log::debug!($($arg)+);
    }
  };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaesarEngine {
  shift:     Shift,
  verbosity: Verbosity,
}

impl CaesarEngine {
  pub fn new(shift: Shift, verbosity: Verbosity) -> Self {
    debug_at!(verbosity, 3, "initializing engine with shift {shift}");
    Self { shift, verbosity }
  }

  /// Engine for the instance registered as `name`, e.g. `caesar:13`.
  pub fn for_name(name: &str, verbosity: Verbosity) -> Self {
    Self::new(Shift::for_engine(name), verbosity)
  }

  pub const fn shift(&self) -> Shift {
    self.shift
  }

  pub const fn verbosity(&self) -> Verbosity {
    self.verbosity
  }

  /// Called when the engine becomes the active one. Reading the surrounding
  /// text once tells the host that this engine relies on it.
  pub fn enable<H: Host>(&mut self, host: &mut H) -> Result<()> {
    host.surrounding_text()?;
    debug_at!(self.verbosity, 3, "engine enabled, shift is {}", self.shift);
    Ok(())
  }

  pub fn process_key<H: Host>(&self, host: &mut H, key: KeyPress) -> Result<bool> {
    self.process_key_event(host, key.keysym, 0, key.state)
  }

  /// Handles one key event and returns whether it was consumed. Errors from
  /// the host are passed on untouched.
  pub fn process_key_event<H: Host>(
    &self,
    host: &mut H,
    keysym: Keysym,
    _keycode: u32,
    state: ModifierMask,
  ) -> Result<bool> {
    let modifiers = state.significant();

    if modifiers.is_empty() {
      let Some(c) = keysym.to_char().filter(|&c| cipher::is_encodable(c)) else {
        return Ok(false);
      };
      debug_at!(self.verbosity, 1, "encrypting character: {c}");
      let encrypted = cipher::encode(c, self.shift);
      host.commit_text(encrypted.encode_utf8(&mut [0; 4]))?;
      return Ok(true);
    }

    if is_transform_key(keysym) && modifiers == ModifierMask::CONTROL {
      let shift = if state.contains(ModifierMask::SHIFT) {
        self.shift.negate()
      } else {
        self.shift
      };
      self.transform_surrounding_text(host, shift)?;
      return Ok(true);
    }

    Ok(false)
  }

  /// Re-commits the selection, or the whole field when nothing is selected,
  /// rotated by `shift`, then walks the caret back with synthetic `Left`
  /// presses.
  fn transform_surrounding_text<H: Host>(&self, host: &mut H, shift: Shift) -> Result<()> {
    let surrounding = host.surrounding_text()?;
    let (cursor, anchor) = (surrounding.cursor, surrounding.anchor);
    debug_at!(self.verbosity, 2, "surrounding text is '{}'", surrounding.text);
    debug_at!(self.verbosity, 2, "cursor is at {cursor}");
    debug_at!(self.verbosity, 2, "anchor is at {anchor}");

    let operand = match cursor.cmp(&anchor) {
      Ordering::Greater => char_slice(&surrounding.text, anchor, cursor),
      Ordering::Less => char_slice(&surrounding.text, cursor, anchor),
      Ordering::Equal => surrounding.text.clone(),
    };

    debug_at!(self.verbosity, 1, "encrypting text '{operand}' with shift {shift}");
    let encrypted = cipher::encode_str(&operand, shift);
    debug_at!(self.verbosity, 1, "encrypted text is '{encrypted}'");

    if !surrounding.has_selection() {
      let len = surrounding.len();
      let offset = 0isize.saturating_sub_unsigned(cursor);
      debug_at!(self.verbosity, 2, "deleting {len} characters at {offset}");
      host.delete_surrounding_text(offset, len)?;
    }
    host.commit_text(&encrypted)?;

    // commit leaves the caret after the inserted text
    let moves = operand.chars().count().saturating_sub(cursor);
    for _ in 0..moves {
      host.forward_key_event(Keysym::LEFT, Keysym::LEFT_KEYCODE, ModifierMask::empty())?;
    }
    Ok(())
  }
}

fn is_transform_key(keysym: Keysym) -> bool {
  keysym
    .to_char()
    .is_some_and(|c| c.to_lowercase().eq(['e']))
}

/// Characters `start..end` of `text`, clamped to its length.
fn char_slice(text: &str, start: usize, end: usize) -> String {
  text
    .chars()
    .skip(start)
    .take(end.saturating_sub(start))
    .collect()
}
