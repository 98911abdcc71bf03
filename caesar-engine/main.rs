//! Caesar cipher input method engine.
//!
//! Letters typed while the engine is active are committed rotated by the
//! instance's shift; `Ctrl+E` encrypts the selection in place and
//! `Ctrl+Shift+E` decrypts it. The process reads host commands from stdin,
//! see [`session`].

mod cli;
mod logging;
mod session;

use std::io;

use anyhow::Result;
use caesar_lib::{
  engine::Verbosity,
  factory::EngineFactory,
};
use caesar_loader::config::Config;

use crate::{
  cli::CliOptions,
  session::Session,
};

fn main() -> Result<()> {
  let args = CliOptions::parse()?;

  caesar_loader::initialize_config_file(args.config_file.clone());
  let log_file = args.log_file.clone().map(|file| {
    caesar_loader::initialize_log_file(file);
    caesar_loader::log_file()
  });
  logging::setup_logging(args.verbosity, log_file.as_deref())?;

  let config = Config::load_default()?;
  let verbosity = Verbosity::new(args.verbosity);
  let factory = EngineFactory::new(config.engines.iter().cloned(), verbosity);
  log::debug!("{} engine instances available", factory.names().len());

  if args.exec_by_host {
    log::info!("started by the input-method daemon as {}", config.component);
  } else {
    log::info!("running component {} standalone", config.component);
  }

  let stdout = io::stdout();
  let mut session = Session::new(factory, stdout.lock(), args.exec_by_host);
  if let Some(name) = args.startup_engine(&config.default_engine) {
    session.activate(name)?;
  }

  session.run(io::stdin().lock())
}
