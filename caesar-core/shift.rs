//! Rotation amount and the engine-name binding.
//!
//! Engine instances are registered under names such as `caesar:13`. The
//! numeric suffix after the first `:` selects the shift; a bare name keeps
//! [`Shift::DEFAULT`].

use std::{
  fmt,
  num::ParseIntError,
  ops::RangeInclusive,
};

use thiserror::Error;

/// Name every engine instance is registered under, optionally followed by
/// `:<shift>`.
pub const ENGINE_PREFIX: &str = "caesar";

/// Shifts that get an instance even without an explicit declaration. 26 is
/// left out since it wraps around to the identity.
pub const GENERATED_SHIFTS: RangeInclusive<i32> = 1..=25;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShiftError {
  #[error("invalid shift '{suffix}' in engine name '{name}': {source}")]
  Invalid {
    name:   String,
    suffix: String,
    #[source]
    source: ParseIntError,
  },
}

pub type Result<T> = std::result::Result<T, ShiftError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shift(i32);

impl Shift {
  /// Caesar's own choice.
  pub const DEFAULT: Self = Self(3);

  pub const fn new(shift: i32) -> Self {
    Self(shift)
  }

  pub const fn get(self) -> i32 {
    self.0
  }

  /// The inverse rotation. Reduced modulo the alphabet first so that
  /// `i32::MIN` has an inverse too.
  pub const fn negate(self) -> Self {
    Self(-self.0.rem_euclid(26))
  }

  /// Strict parse of the shift carried by an engine name.
  pub fn from_engine_name(name: &str) -> Result<Self> {
    let Some((_, suffix)) = name.split_once(':') else {
      return Ok(Self::DEFAULT);
    };

    suffix
      .trim()
      .parse::<i32>()
      .map(Self)
      .map_err(|source| {
        ShiftError::Invalid {
          name: name.to_string(),
          suffix: suffix.to_string(),
          source,
        }
      })
  }

  /// Shift for the instance called `name`, falling back to the default
  /// with a warning when the suffix does not parse.
  pub fn for_engine(name: &str) -> Self {
    Self::from_engine_name(name).unwrap_or_else(|err| {
      log::warn!("{err}");
      Self::DEFAULT
    })
  }
}

impl Default for Shift {
  fn default() -> Self {
    Self::DEFAULT
  }
}

impl From<i32> for Shift {
  fn from(value: i32) -> Self {
    Self::new(value)
  }
}

impl fmt::Display for Shift {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:+}", self.0)
  }
}

pub fn engine_name(shift: Shift) -> String {
  format!("{ENGINE_PREFIX}:{}", shift.get())
}
