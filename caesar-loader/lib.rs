pub mod config;

use std::{
  fmt,
  path::{
    Path,
    PathBuf,
  },
  sync::OnceLock,
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};

static CONFIG_FILE: OnceLock<PathBuf> = OnceLock::new();

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

pub fn initialize_config_file(specified_file: Option<PathBuf>) {
  let config_file = specified_file.unwrap_or_else(default_config_file);
  CONFIG_FILE.set(config_file).ok();
}

pub fn initialize_log_file(specified_file: Option<PathBuf>) {
  let log_file = specified_file.unwrap_or_else(default_log_file);
  ensure_parent_dir(&log_file);
  LOG_FILE.set(log_file).ok();
}

/// `$CAESAR_CONFIG_DIR`, or `caesar` under the platform config directory.
pub fn config_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("CAESAR_CONFIG_DIR") {
    return PathBuf::from(dir);
  }
  platform_dir(
    choose_base_strategy().map(|strategy| strategy.config_dir()),
    "config",
  )
}

pub fn cache_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("CAESAR_CACHE_DIR") {
    return PathBuf::from(dir);
  }
  platform_dir(
    choose_base_strategy().map(|strategy| strategy.cache_dir()),
    "cache",
  )
}

/// `caesar` under `base`. Without a home directory the system temp dir
/// stands in, so paths never end up relative to the working directory.
fn platform_dir<E: fmt::Display>(base: Result<PathBuf, E>, kind: &str) -> PathBuf {
  let mut path = base.unwrap_or_else(|err| {
    let fallback = std::env::temp_dir();
    log::warn!("no {kind} directory ({err}), using {}", fallback.display());
    fallback
  });
  path.push("caesar");
  path
}

pub fn config_file() -> PathBuf {
  CONFIG_FILE.get_or_init(default_config_file).clone()
}

pub fn log_file() -> PathBuf {
  LOG_FILE
    .get_or_init(|| {
      let path = default_log_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn default_log_file() -> PathBuf {
  cache_dir().join("caesar.log")
}

fn default_config_file() -> PathBuf {
  config_dir().join("config.toml")
}

fn ensure_parent_dir(path: &Path) {
  if let Some(parent) = path.parent()
    && !parent.exists()
  {
    std::fs::create_dir_all(parent).ok();
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn platform_dir_appends_app_name() {
    let base: Result<PathBuf, &str> = Ok(PathBuf::from("/home/user/.config"));
    assert_eq!(platform_dir(base, "config"), PathBuf::from("/home/user/.config/caesar"));
  }

  #[test]
  fn missing_home_falls_back_to_temp_dir() {
    let path = platform_dir(Err::<PathBuf, _>("home directory not found"), "config");
    assert_eq!(path, std::env::temp_dir().join("caesar"));
    assert!(path.is_absolute());
  }
}
