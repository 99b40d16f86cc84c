//! Interactive stepping over a [`Vm`].
//!
//! Commands are read one per line and picked by their first letter:
//!
//! | Command                   | Effect                                 |
//! |---------------------------|----------------------------------------|
//! | `s`, `stop`               | leave the debugger                     |
//! | `n`, `next`, empty line   | execute one instruction                |
//! | `d`, `dump [start] [end]` | print a memory table                   |
//! | `r`, `run`                | execute until the machine halts        |
//! | `m`, `memory [addr...]`   | print the cells at the given addresses |
//! | `i`                       | print the instruction pointer          |

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::vm::{Error, Vm};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Stop,
  Next,
  Dump {
    start: Option<usize>,
    end: Option<usize>,
  },
  Run,
  Memory(Vec<usize>),
  Pointer,
  Unknown(String),
}

impl Command {
  pub fn parse(line: &str) -> Self {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
      return Self::Next;
    };
    let addresses: Vec<usize> = words.map_while(|word| word.parse().ok()).collect();
    match name.chars().next() {
      Some('s') => Self::Stop,
      Some('n') => Self::Next,
      Some('r') => Self::Run,
      Some('i') => Self::Pointer,
      Some('d') => Self::Dump {
        start: addresses.first().copied(),
        end: addresses.get(1).copied(),
      },
      Some('m') => Self::Memory(addresses),
      _ => Self::Unknown(name.to_string()),
    }
  }
}

/// How a debugging session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Halted,
  Stopped,
}

/// Reads commands from its own stream, or from the machine's input when none
/// is given (see [`Debugger::sharing_input`]).
pub struct Debugger<C, W> {
  commands: Option<C>,
  out: W,
}

impl<W: Write> Debugger<io::Empty, W> {
  /// A debugger that takes its command lines from the machine's own input, so
  /// commands and program input interleave on one stream.
  pub fn sharing_input(out: W) -> Self {
    Self { commands: None, out }
  }
}

impl<C, W> Debugger<C, W>
where
  C: BufRead,
  W: Write,
{
  pub fn new(commands: C, out: W) -> Self {
    Self {
      commands: Some(commands),
      out,
    }
  }

  /// Prompt for commands until the machine halts or the user stops. Running
  /// out of commands counts as stopping.
  pub fn run<I, O>(&mut self, vm: &mut Vm<I, O>) -> Result<Outcome, Error>
  where
    I: BufRead,
    O: Write,
  {
    while !vm.is_halted() {
      write!(self.out, "$")?;
      self.out.flush()?;
      let mut line = String::new();
      let read = match &mut self.commands {
        Some(commands) => commands.read_line(&mut line)?,
        None => vm.input_mut().read_line(&mut line)?,
      };
      if read == 0 {
        return Ok(Outcome::Stopped);
      }
      let command = Command::parse(&line);
      debug!(?command, ip = vm.ip(), "debugger command");
      match command {
        Command::Stop => return Ok(Outcome::Stopped),
        Command::Next => vm.step()?,
        Command::Run => vm.execute()?,
        Command::Pointer => writeln!(self.out, "{}", vm.ip())?,
        Command::Dump { start, end } => {
          let start = start.unwrap_or(0);
          let end = end.unwrap_or(vm.memory().len());
          write!(self.out, "{}", vm.dump(start..end))?;
        }
        Command::Memory(addresses) => {
          for address in addresses {
            write!(self.out, "{} ", vm.peek(address))?;
          }
          writeln!(self.out)?;
        }
        Command::Unknown(name) => writeln!(self.out, "unknown command `{name}`")?,
      }
    }
    Ok(Outcome::Halted)
  }

  pub fn into_output(self) -> W {
    self.out
  }
}
