//! Host boundary for the engine.
//!
//! The lib only defines the interface, its error type and an in-memory
//! text field. Whatever owns the real text buffer (an input-method daemon
//! connection, a test, the session driver) implements [`Host`].

use thiserror::Error;

use crate::input::{
  KeyPress,
  Keysym,
  ModifierMask,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
  #[error("surrounding text is not available from the focused client")]
  SurroundingTextUnavailable,
  #[error("connection to the input context was lost")]
  Disconnected,
  #[error("host rejected the request: {0}")]
  Rejected(String),
}

pub type Result<T> = std::result::Result<T, HostError>;

/// Text around the caret. Offsets count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SurroundingText {
  pub text:   String,
  pub cursor: usize,
  pub anchor: usize,
}

impl SurroundingText {
  pub fn new(text: impl Into<String>, cursor: usize, anchor: usize) -> Self {
    Self {
      text: text.into(),
      cursor,
      anchor,
    }
  }

  pub fn has_selection(&self) -> bool {
    self.cursor != self.anchor
  }

  pub fn len(&self) -> usize {
    self.text.chars().count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Operations the engine may perform on the focused text field. Every call
/// is synchronous and completes before the engine continues.
pub trait Host {
  fn surrounding_text(&mut self) -> Result<SurroundingText>;
  /// Inserts `text` at the caret, replacing the active selection if any.
  fn commit_text(&mut self, text: &str) -> Result<()>;
  /// Deletes `len` characters starting `offset` characters from the caret.
  fn delete_surrounding_text(&mut self, offset: isize, len: usize) -> Result<()>;
  /// Feeds a key event back into the host's regular key handling.
  fn forward_key_event(&mut self, keysym: Keysym, keycode: u32, state: ModifierMask) -> Result<()>;
}

impl<H: Host + ?Sized> Host for &mut H {
  fn surrounding_text(&mut self) -> Result<SurroundingText> {
    (**self).surrounding_text()
  }

  fn commit_text(&mut self, text: &str) -> Result<()> {
    (**self).commit_text(text)
  }

  fn delete_surrounding_text(&mut self, offset: isize, len: usize) -> Result<()> {
    (**self).delete_surrounding_text(offset, len)
  }

  fn forward_key_event(&mut self, keysym: Keysym, keycode: u32, state: ModifierMask) -> Result<()> {
    (**self).forward_key_event(keysym, keycode, state)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
  SurroundingText,
  CommitText(String),
  DeleteSurroundingText {
    offset: isize,
    len:    usize,
  },
  ForwardKeyEvent {
    keysym:  Keysym,
    keycode: u32,
    state:   ModifierMask,
  },
}

/// A single-line text field held in memory.
///
/// It behaves like a typical toolkit entry: committing replaces the
/// selection and leaves a collapsed caret after the inserted text, and a
/// plain `Left` collapses a selection to its start before it moves the
/// caret. Every boundary call is recorded.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
  text:   Vec<char>,
  cursor: usize,
  anchor: usize,
  calls:  Vec<HostCall>,
}

impl MemoryHost {
  /// A field holding `text` with the caret at its end.
  pub fn new(text: &str) -> Self {
    let text: Vec<char> = text.chars().collect();
    let end = text.len();
    Self {
      text,
      cursor: end,
      anchor: end,
      calls: Vec::new(),
    }
  }

  pub fn with_selection(text: &str, cursor: usize, anchor: usize) -> Self {
    let mut host = Self::new(text);
    host.select(cursor, anchor);
    host
  }

  pub fn set_text(&mut self, text: &str) {
    self.text = text.chars().collect();
    self.select(self.text.len(), self.text.len());
  }

  /// Moves the caret to `cursor` and the selection anchor to `anchor`, both
  /// clamped to the text.
  pub fn select(&mut self, cursor: usize, anchor: usize) {
    self.cursor = cursor.min(self.text.len());
    self.anchor = anchor.min(self.text.len());
  }

  pub fn text(&self) -> String {
    self.text.iter().collect()
  }

  pub const fn cursor(&self) -> usize {
    self.cursor
  }

  pub const fn anchor(&self) -> usize {
    self.anchor
  }

  pub fn calls(&self) -> &[HostCall] {
    &self.calls
  }

  pub fn take_calls(&mut self) -> Vec<HostCall> {
    std::mem::take(&mut self.calls)
  }

  fn selection_span(&self) -> (usize, usize) {
    (self.cursor.min(self.anchor), self.cursor.max(self.anchor))
  }

  fn collapse_to(&mut self, pos: usize) {
    self.cursor = pos;
    self.anchor = pos;
  }

  fn replace_selection(&mut self, text: &str) {
    let (start, end) = self.selection_span();
    let inserted: Vec<char> = text.chars().collect();
    let len = inserted.len();
    self.text.splice(start..end, inserted);
    self.collapse_to(start + len);
  }

  /// The field's own handling of a key the input method did not consume.
  /// Returns whether the key changed anything.
  pub fn apply_key(&mut self, key: KeyPress) -> bool {
    if key.state.is_release() || !key.state.significant().is_empty() {
      return false;
    }

    let (start, end) = self.selection_span();
    match key.keysym {
      Keysym::LEFT if start != end => self.collapse_to(start),
      Keysym::LEFT => self.collapse_to(self.cursor.saturating_sub(1)),
      Keysym::RIGHT if start != end => self.collapse_to(end),
      Keysym::RIGHT => self.collapse_to((self.cursor + 1).min(self.text.len())),
      Keysym::HOME => self.collapse_to(0),
      Keysym::END => self.collapse_to(self.text.len()),
      Keysym::BACKSPACE if start != end => self.replace_selection(""),
      Keysym::BACKSPACE if start > 0 => {
        self.text.remove(start - 1);
        self.collapse_to(start - 1);
      },
      Keysym::DELETE if start != end => self.replace_selection(""),
      Keysym::DELETE if start < self.text.len() => {
        self.text.remove(start);
      },
      keysym if keysym.is_function_key() => return false,
      keysym => {
        match keysym.to_char() {
          Some(c) if !c.is_control() => self.replace_selection(c.encode_utf8(&mut [0; 4])),
          _ => return false,
        }
      },
    }
    true
  }
}

impl Host for MemoryHost {
  fn surrounding_text(&mut self) -> Result<SurroundingText> {
    self.calls.push(HostCall::SurroundingText);
    Ok(SurroundingText::new(self.text(), self.cursor, self.anchor))
  }

  fn commit_text(&mut self, text: &str) -> Result<()> {
    self.calls.push(HostCall::CommitText(text.to_string()));
    self.replace_selection(text);
    Ok(())
  }

  fn delete_surrounding_text(&mut self, offset: isize, len: usize) -> Result<()> {
    self
      .calls
      .push(HostCall::DeleteSurroundingText { offset, len });
    let start = self
      .cursor
      .saturating_add_signed(offset)
      .min(self.text.len());
    let end = start.saturating_add(len).min(self.text.len());
    self.text.drain(start..end);
    self.collapse_to(start);
    Ok(())
  }

  fn forward_key_event(&mut self, keysym: Keysym, keycode: u32, state: ModifierMask) -> Result<()> {
    self.calls.push(HostCall::ForwardKeyEvent {
      keysym,
      keycode,
      state,
    });
    self.apply_key(KeyPress::new(keysym, state));
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_surrounding_text_counts_characters() {
    let surrounding = SurroundingText::new("añb😀", 4, 1);
    assert_eq!(surrounding.len(), 4);
    assert!(surrounding.has_selection());
    assert!(!surrounding.is_empty());

    let surrounding = SurroundingText::new("", 0, 0);
    assert_eq!(surrounding.len(), 0);
    assert!(surrounding.is_empty());
    assert!(!surrounding.has_selection());
  }

  #[test]
  fn test_commit_replaces_selection() {
    let mut host = MemoryHost::with_selection("hello world", 6, 11);
    host.commit_text("there").unwrap();
    assert_eq!(host.text(), "hello there");
    assert_eq!((host.cursor(), host.anchor()), (11, 11));

    let mut host = MemoryHost::with_selection("abc", 1, 1);
    host.commit_text("xy").unwrap();
    assert_eq!(host.text(), "axybc");
    assert_eq!(host.cursor(), 3);
  }

  #[test]
  fn test_delete_is_relative_to_cursor() {
    let mut host = MemoryHost::with_selection("hello world", 5, 5);
    host.delete_surrounding_text(-5, 11).unwrap();
    assert_eq!(host.text(), "");
    assert_eq!(host.cursor(), 0);

    let mut host = MemoryHost::with_selection("abcdef", 4, 4);
    host.delete_surrounding_text(-2, 1).unwrap();
    assert_eq!(host.text(), "abdef");
    assert_eq!(host.cursor(), 2);
  }

  #[test]
  fn test_delete_clamps_to_text() {
    let mut host = MemoryHost::with_selection("abc", 1, 1);
    host.delete_surrounding_text(-4, 10).unwrap();
    assert_eq!(host.text(), "");
  }

  #[test]
  fn test_left_collapses_then_moves() {
    let mut host = MemoryHost::with_selection("abcdef", 5, 2);
    host
      .forward_key_event(Keysym::LEFT, Keysym::LEFT_KEYCODE, ModifierMask::empty())
      .unwrap();
    assert_eq!((host.cursor(), host.anchor()), (2, 2));
    host
      .forward_key_event(Keysym::LEFT, Keysym::LEFT_KEYCODE, ModifierMask::empty())
      .unwrap();
    assert_eq!(host.cursor(), 1);
    host.select(0, 0);
    assert!(host.apply_key(KeyPress::new(Keysym::LEFT, ModifierMask::empty())));
    assert_eq!(host.cursor(), 0);
  }

  #[test]
  fn test_apply_key_edits() {
    let mut host = MemoryHost::new("ab");
    assert!(host.apply_key(KeyPress::char('c')));
    assert!(host.apply_key(KeyPress::new(Keysym::BACKSPACE, ModifierMask::empty())));
    assert!(host.apply_key(KeyPress::new(Keysym::HOME, ModifierMask::empty())));
    assert!(host.apply_key(KeyPress::new(Keysym::DELETE, ModifierMask::empty())));
    assert_eq!(host.text(), "b");
    assert!(!host.apply_key(KeyPress::new(Keysym::from('x'), ModifierMask::CONTROL)));
    assert!(!host.apply_key(KeyPress::new(Keysym::RETURN, ModifierMask::empty())));
    assert_eq!(host.text(), "b");
  }

  #[test]
  fn test_calls_are_recorded() {
    let mut host = MemoryHost::new("abc");
    host.surrounding_text().unwrap();
    host.commit_text("d").unwrap();
    assert_eq!(host.take_calls(), vec![
      HostCall::SurroundingText,
      HostCall::CommitText("d".into()),
    ]);
    assert!(host.calls().is_empty());
  }
}
