//! Engine instances by name.
//!
//! One engine type backs every instance. Declared names come first, then
//! `caesar:1` through `caesar:25` for any shift not already declared.

use caesar_core::shift::{
  self,
  GENERATED_SHIFTS,
  Shift,
};
use thiserror::Error;

use crate::engine::{
  CaesarEngine,
  Verbosity,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FactoryError {
  #[error("no engine named '{0}' is registered")]
  UnknownEngine(String),
}

pub type Result<T> = std::result::Result<T, FactoryError>;

#[derive(Debug, Clone)]
pub struct EngineFactory {
  names:     Vec<String>,
  verbosity: Verbosity,
}

impl EngineFactory {
  pub fn new<I, S>(declared: I, verbosity: Verbosity) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut names: Vec<String> = Vec::new();
    for name in declared {
      let name = name.into();
      if !names.contains(&name) {
        names.push(name);
      }
    }

    for n in GENERATED_SHIFTS {
      let name = shift::engine_name(Shift::new(n));
      if names.contains(&name) {
        continue;
      }
      names.push(name);
    }

    Self { names, verbosity }
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.iter().any(|n| n == name)
  }

  pub fn create(&self, name: &str) -> Result<CaesarEngine> {
    if !self.contains(name) {
      return Err(FactoryError::UnknownEngine(name.to_string()));
    }
    log::debug!("creating engine '{name}'");
    Ok(CaesarEngine::for_name(name, self.verbosity))
  }
}

impl Default for EngineFactory {
  fn default() -> Self {
    Self::new([shift::ENGINE_PREFIX], Verbosity::QUIET)
  }
}
