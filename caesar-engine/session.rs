//! Line-oriented stand-in for the input-method host.
//!
//! The session owns an in-memory text field and feeds it key events through
//! the active engine, one command per input line:
//!
//! ```text
//! text hello world     replace the field, caret at the end
//! cursor 5 [anchor]    move the caret (and selection anchor)
//! engine caesar:13     create and enable an instance
//! key C-e              deliver a key event
//! show                 print the field
//! quit
//! ```

use std::{
  io::{
    BufRead,
    Write,
  },
  str::FromStr,
};

use anyhow::Result;
use caesar_lib::{
  engine::CaesarEngine,
  factory::EngineFactory,
  host::MemoryHost,
  input::{
    KeyPress,
    ParseKeyPressError,
  },
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Text(String),
  Cursor { cursor: usize, anchor: usize },
  Engine(String),
  Key(KeyPress),
  Show,
  Help,
  Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
  #[error("unknown command '{0}', try 'help'")]
  Unknown(String),
  #[error("'{0}' needs an argument")]
  MissingArgument(&'static str),
  #[error("invalid offset '{0}'")]
  InvalidOffset(String),
  #[error(transparent)]
  Key(#[from] ParseKeyPressError),
}

impl FromStr for Command {
  type Err = ParseCommandError;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, rest) = line
      .trim_start()
      .split_once(' ')
      .unwrap_or((line.trim(), ""));

    match name {
      // the field may legitimately start or end with spaces
      "text" => Ok(Self::Text(rest.to_string())),
      "cursor" => {
        let mut offsets = rest.split_whitespace().map(|offset| {
          offset
            .parse::<usize>()
            .map_err(|_| ParseCommandError::InvalidOffset(offset.to_string()))
        });
        let cursor = offsets
          .next()
          .ok_or(ParseCommandError::MissingArgument("cursor"))??;
        let anchor = offsets.next().transpose()?.unwrap_or(cursor);
        Ok(Self::Cursor { cursor, anchor })
      },
      "engine" => {
        match rest.trim() {
          "" => Err(ParseCommandError::MissingArgument("engine")),
          engine => Ok(Self::Engine(engine.to_string())),
        }
      },
      "key" => {
        match rest.trim() {
          "" => Err(ParseCommandError::MissingArgument("key")),
          key => Ok(Self::Key(key.parse()?)),
        }
      },
      "show" => Ok(Self::Show),
      "help" => Ok(Self::Help),
      "quit" | "exit" => Ok(Self::Quit),
      unknown => Err(ParseCommandError::Unknown(unknown.to_string())),
    }
  }
}

struct ActiveEngine {
  name:   String,
  engine: CaesarEngine,
}

pub struct Session<W> {
  factory:      EngineFactory,
  host:         MemoryHost,
  active:       Option<ActiveEngine>,
  exec_by_host: bool,
  out:          W,
}

impl<W: Write> Session<W> {
  pub fn new(factory: EngineFactory, out: W, exec_by_host: bool) -> Self {
    Self {
      factory,
      host: MemoryHost::default(),
      active: None,
      exec_by_host,
      out,
    }
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  /// Creates the instance called `name` and makes it the active engine.
  pub fn activate(&mut self, name: &str) -> Result<()> {
    let mut engine = self.factory.create(name)?;
    engine.enable(&mut self.host)?;
    self.host.take_calls();
    log::info!("activated engine '{name}' with shift {}", engine.shift());
    self.active = Some(ActiveEngine {
      name: name.to_string(),
      engine,
    });
    Ok(())
  }

  pub fn run(&mut self, input: impl BufRead) -> Result<()> {
    if !self.exec_by_host {
      let active = self.active.as_ref().map_or("none", |active| active.name.as_str());
      writeln!(self.out, "caesar session, active engine: {active} (type 'help')")?;
    }

    for line in input.lines() {
      let line = line?;
      if line.trim().is_empty() || line.trim_start().starts_with('#') {
        continue;
      }

      let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(err) => {
          writeln!(self.out, "error: {err}")?;
          continue;
        },
      };

      if command == Command::Quit {
        break;
      }
      if let Err(err) = self.execute(command) {
        log::warn!("{err:#}");
        writeln!(self.out, "error: {err:#}")?;
      }
    }

    self.out.flush()?;
    Ok(())
  }

  pub fn execute(&mut self, command: Command) -> Result<()> {
    match command {
      Command::Text(text) => {
        self.host.set_text(&text);
        self.report_field(None)
      },
      Command::Cursor { cursor, anchor } => {
        self.host.select(cursor, anchor);
        self.report_field(None)
      },
      Command::Engine(name) => {
        self.activate(&name)?;
        let shift = self
          .active
          .as_ref()
          .map(|active| active.engine.shift())
          .unwrap_or_default();
        writeln!(self.out, "engine={name} shift={shift}")?;
        Ok(())
      },
      Command::Key(key) => {
        let consumed = self.deliver(key)?;
        self.report_field(Some(consumed))
      },
      Command::Show => self.report_field(None),
      Command::Help => {
        writeln!(
          self.out,
          "commands: text <s> | cursor <n> [anchor] | engine <name> | key <key> | show | quit"
        )?;
        writeln!(self.out, "keys: a, E, space, left, 0xff0d, C-e, C-S-e, A-x, R-C-e")?;
        Ok(())
      },
      Command::Quit => Ok(()),
    }
  }

  /// Hands `key` to the active engine, applying the field's own handling
  /// when the engine does not consume it.
  fn deliver(&mut self, key: KeyPress) -> Result<bool> {
    let consumed = match &self.active {
      Some(active) => active.engine.process_key(&mut self.host, key)?,
      None => false,
    };
    for call in self.host.take_calls() {
      log::debug!("host call: {call:?}");
    }
    if !consumed {
      self.host.apply_key(key);
    }
    Ok(consumed)
  }

  fn report_field(&mut self, consumed: Option<bool>) -> Result<()> {
    if let Some(consumed) = consumed {
      write!(self.out, "consumed={consumed} ")?;
    }
    writeln!(
      self.out,
      "text={:?} cursor={} anchor={}",
      self.host.text(),
      self.host.cursor(),
      self.host.anchor()
    )?;
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use caesar_lib::engine::Verbosity;

  use super::*;

  fn run_script(script: &str, engine: Option<&str>) -> String {
    let factory = EngineFactory::new(["caesar"], Verbosity::QUIET);
    let mut session = Session::new(factory, Vec::new(), true);
    if let Some(name) = engine {
      session.activate(name).unwrap();
    }
    session.run(script.as_bytes()).unwrap();
    String::from_utf8(session.into_inner()).unwrap()
  }

  #[test]
  fn parse_commands() {
    assert_eq!("text  two spaces".parse::<Command>(), Ok(Command::Text(" two spaces".into())));
    assert_eq!("text".parse::<Command>(), Ok(Command::Text(String::new())));
    assert_eq!("cursor 3".parse::<Command>(), Ok(Command::Cursor { cursor: 3, anchor: 3 }));
    assert_eq!("cursor 3 7".parse::<Command>(), Ok(Command::Cursor { cursor: 3, anchor: 7 }));
    assert_eq!("engine caesar:2".parse::<Command>(), Ok(Command::Engine("caesar:2".into())));
    assert_eq!(
      "key C-e".parse::<Command>(),
      Ok(Command::Key(KeyPress::new(
        caesar_lib::input::Keysym::from('e'),
        caesar_lib::input::ModifierMask::CONTROL
      )))
    );
    assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
  }

  #[test]
  fn parse_errors() {
    assert_eq!(
      "cursor".parse::<Command>(),
      Err(ParseCommandError::MissingArgument("cursor"))
    );
    assert_eq!(
      "cursor x".parse::<Command>(),
      Err(ParseCommandError::InvalidOffset("x".into()))
    );
    assert_eq!(
      "key".parse::<Command>(),
      Err(ParseCommandError::MissingArgument("key"))
    );
    assert!(matches!("key X-e".parse::<Command>(), Err(ParseCommandError::Key(_))));
    assert_eq!(
      "frobnicate".parse::<Command>(),
      Err(ParseCommandError::Unknown("frobnicate".into()))
    );
  }

  #[test]
  fn typing_without_engine_passes_through() {
    let output = run_script("key h\nkey i\n", None);
    assert_eq!(
      output,
      "consumed=false text=\"h\" cursor=1 anchor=1\nconsumed=false text=\"hi\" cursor=2 anchor=2\n"
    );
  }

  #[test]
  fn typing_and_transforming() {
    let script = "\
      # type, then decrypt the whole field in place
      key h
      key i
      key space
      key !
      cursor 1
      key C-S-e
    ";
    let output = run_script(script, Some("caesar"));
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines, [
      "consumed=true text=\"k\" cursor=1 anchor=1",
      "consumed=true text=\"kl\" cursor=2 anchor=2",
      "consumed=false text=\"kl \" cursor=3 anchor=3",
      "consumed=false text=\"kl !\" cursor=4 anchor=4",
      "text=\"kl !\" cursor=1 anchor=1",
      "consumed=true text=\"hi !\" cursor=1 anchor=1",
    ]);
  }

  #[test]
  fn switching_engines() {
    let output = run_script("engine caesar:13\nkey a\nengine rot13\nquit\nkey a\n", None);
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines, [
      "engine=caesar:13 shift=+13",
      "consumed=true text=\"n\" cursor=1 anchor=1",
      "error: no engine named 'rot13' is registered",
    ]);
  }

  #[test]
  fn banner_only_outside_host() {
    let factory = EngineFactory::default();
    let mut session = Session::new(factory, Vec::new(), false);
    session.run("show\n".as_bytes()).unwrap();
    let output = String::from_utf8(session.into_inner()).unwrap();
    assert!(output.starts_with("caesar session, active engine: none"));
    assert!(output.ends_with("text=\"\" cursor=0 anchor=0\n"));
  }
}
