use std::ops::Range;

use tracing::debug;

use crate::dump::Dump;
use crate::vm::{Error, Value, MEMORY_LIMIT};

/// The machine's tape. Cells past the end are implicitly zero; touching one
/// during execution materializes every cell up to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
  cells: Vec<Value>,
  limit: usize,
}

impl Default for Memory {
  fn default() -> Self {
    Self::new(Vec::new(), MEMORY_LIMIT)
  }
}

impl Memory {
  pub fn new(cells: Vec<Value>, limit: usize) -> Self {
    Self { cells, limit }
  }

  /// Cap future growth. Cells that already exist stay readable.
  pub fn set_limit(&mut self, limit: usize) {
    self.limit = limit;
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn as_slice(&self) -> &[Value] {
    &self.cells
  }

  /// Read a cell that must already exist.
  pub fn get(&self, address: usize) -> Option<Value> {
    self.cells.get(address).copied()
  }

  /// Read a cell without growing the tape.
  pub fn peek(&self, address: usize) -> Value {
    self.get(address).unwrap_or(0)
  }

  /// Read a cell, growing the tape up to it if needed.
  pub fn read(&mut self, address: usize) -> Result<Value, Error> {
    self.grow_to(address)?;
    Ok(self.cells[address])
  }

  pub fn write(&mut self, address: usize, value: Value) -> Result<(), Error> {
    self.grow_to(address)?;
    self.cells[address] = value;
    Ok(())
  }

  /// Tabular view of `range`, clamped to the current length.
  pub fn dump(&self, range: Range<usize>) -> Dump<'_> {
    let end = range.end.min(self.cells.len());
    let start = range.start.min(end);
    Dump::new(start, &self.cells[start..end])
  }

  fn grow_to(&mut self, address: usize) -> Result<(), Error> {
    if address < self.cells.len() {
      return Ok(());
    }
    if address >= self.limit {
      return Err(Error::MemoryLimit {
        address,
        limit: self.limit,
      });
    }
    debug!(from = self.cells.len(), to = address + 1, "growing tape");
    self.cells.resize(address + 1, 0);
    Ok(())
  }
}
