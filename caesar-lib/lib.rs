pub mod engine;
pub mod factory;
pub mod host;
pub mod input;

pub use caesar_core::{
  Shift,
  Tendril,
  cipher,
  shift,
};
