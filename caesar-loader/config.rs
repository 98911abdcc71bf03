use std::{
  fs,
  io::ErrorKind,
  path::Path,
};

use anyhow::{
  Context,
  Result,
};
use serde::Deserialize;

pub const DEFAULT_COMPONENT: &str = "org.freedesktop.IBus.Caesar";
pub const DEFAULT_ENGINE: &str = "caesar";

/// User configuration, read from `config.toml`.
///
/// ```toml
/// component = "org.freedesktop.IBus.Caesar"
/// default-engine = "caesar:13"
/// engines = ["caesar", "caesar:13", "caesar:-1"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  /// Name the engine process answers to on the input-method bus.
  pub component:      String,
  /// Instance activated by `--set-engine`.
  pub default_engine: String,
  /// Explicitly declared instances. `caesar:1` to `caesar:25` are always
  /// added on top.
  pub engines:        Vec<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      component:      DEFAULT_COMPONENT.to_string(),
      default_engine: DEFAULT_ENGINE.to_string(),
      engines:        vec![DEFAULT_ENGINE.to_string()],
    }
  }
}

impl Config {
  pub fn parse(source: &str) -> Result<Self> {
    toml::from_str(source).context("failed to parse config")
  }

  /// Reads `path`, falling back to the defaults when it does not exist.
  pub fn load(path: &Path) -> Result<Self> {
    match fs::read_to_string(path) {
      Ok(source) => {
        Self::parse(&source).with_context(|| format!("invalid config file {}", path.display()))
      },
      Err(err) if err.kind() == ErrorKind::NotFound => {
        log::debug!("no config at {}, using defaults", path.display());
        Ok(Self::default())
      },
      Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
  }

  /// [`Config::load`] on the initialized config file.
  pub fn load_default() -> Result<Self> {
    Self::load(&crate::config_file())
  }
}
