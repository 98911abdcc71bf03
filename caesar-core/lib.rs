use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod cipher;
pub mod shift;

pub use shift::Shift;

pub type Tendril = SmartString<LazyCompact>;
