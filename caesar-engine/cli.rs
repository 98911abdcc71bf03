use std::path::PathBuf;

use anyhow::{
  Result,
  bail,
};
use clap::{
  ArgAction,
  Parser,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliOptions {
  /// Launched by the input-method daemon rather than by a user.
  pub exec_by_host: bool,
  pub set_engine:   bool,
  pub engine:       Option<String>,
  pub verbosity:    u8,
  /// `Some(None)` logs to the default log file.
  pub log_file:     Option<Option<PathBuf>>,
  pub config_file:  Option<PathBuf>,
}

impl CliOptions {
  pub fn parse() -> Result<Self> {
    let raw = RawCli::parse();
    raw.try_into()
  }

  /// Instance to activate before reading any input.
  pub fn startup_engine<'a>(&'a self, default_engine: &'a str) -> Option<&'a str> {
    self
      .engine
      .as_deref()
      .or_else(|| self.set_engine.then_some(default_engine))
  }
}

#[derive(Parser, Debug)]
#[command(name = "ibus-engine-caesar", about, long_about = None, version)]
struct RawCli {
  /// Executed by the input-method daemon
  #[arg(short = 'i', long = "ibus")]
  ibus: bool,

  /// Activate the configured default engine at startup
  #[arg(short = 's', long = "set-engine")]
  set_engine: bool,

  /// Activate a specific engine instance at startup, e.g. caesar:13
  #[arg(short = 'e', long = "engine", value_name = "NAME")]
  engine: Option<String>,

  /// Enable debugging (repeat for more verbosity)
  #[arg(short = 'D', long = "debug", action = ArgAction::Count)]
  verbosity: u8,

  /// Also write logs to a file (the default log file when FILE is omitted)
  #[arg(long = "log", value_name = "FILE", num_args = 0..=1)]
  log_file: Option<Option<PathBuf>>,

  /// Load configuration from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE")]
  config_file: Option<PathBuf>,
}

impl TryFrom<RawCli> for CliOptions {
  type Error = anyhow::Error;

  fn try_from(raw: RawCli) -> Result<Self> {
    if let Some(engine) = &raw.engine
      && engine.trim().is_empty()
    {
      bail!("engine name must not be empty");
    }

    Ok(Self {
      exec_by_host: raw.ibus,
      set_engine:   raw.set_engine,
      engine:       raw.engine,
      verbosity:    raw.verbosity,
      log_file:     raw.log_file,
      config_file:  raw.config_file,
    })
  }
}
