use std::path::Path;

use anyhow::{
  Context,
  Result,
};
use log::LevelFilter;

/// Installs the global logger. Warnings always reach stderr, any `-D` turns
/// on debug output.
pub fn setup_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
  let mut dispatch = fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.target(),
        record.level(),
        message
      ))
    })
    .level(level_filter(verbosity))
    .chain(std::io::stderr());

  if let Some(path) = log_file {
    let file = fern::log_file(path)
      .with_context(|| format!("failed to open log file {}", path.display()))?;
    dispatch = dispatch.chain(file);
  }

  dispatch.apply().context("a logger is already installed")?;
  Ok(())
}

fn level_filter(verbosity: u8) -> LevelFilter {
  match verbosity {
    0 => LevelFilter::Warn,
    _ => LevelFilter::Debug,
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn any_debug_flag_enables_debug_output() {
    assert_eq!(level_filter(0), LevelFilter::Warn);
    assert_eq!(level_filter(1), LevelFilter::Debug);
    assert_eq!(level_filter(3), LevelFilter::Debug);
  }
}
