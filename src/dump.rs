use std::fmt;

use crate::vm::Value;

const COLUMNS: usize = 8;
const WIDTH: usize = 10;

/// A read-only, printable window onto the tape.
///
/// ```text
/// MEMORY DUMP
///                      0          1          2
/// 0000000000:          1          0         99
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Dump<'a> {
  start: usize,
  cells: &'a [Value],
}

impl<'a> Dump<'a> {
  pub fn new(start: usize, cells: &'a [Value]) -> Self {
    Self { start, cells }
  }

  /// Address of the first cell shown
  pub fn start(&self) -> usize {
    self.start
  }

  pub fn cells(&self) -> &'a [Value] {
    self.cells
  }
}

impl fmt::Display for Dump<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "MEMORY DUMP ")?;
    write!(f, "{:>w$}", " ", w = WIDTH + 1)?;
    for column in 0..COLUMNS.min(self.cells.len()) {
      write!(f, "{:>w$}", column, w = WIDTH + 1)?;
    }
    writeln!(f)?;
    for (row, chunk) in self.cells.chunks(COLUMNS).enumerate() {
      if row > 0 {
        writeln!(f)?;
      }
      write!(f, "{:0w$}: ", self.start + row * COLUMNS, w = WIDTH)?;
      for cell in chunk {
        write!(f, "{:>w$} ", cell, w = WIDTH)?;
      }
    }
    writeln!(f)
  }
}
