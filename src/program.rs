use std::io::{self, BufRead};
use std::iter::Peekable;
use std::str::FromStr;

use crate::vm::Value;

/// The initial contents of a machine's tape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
  cells: Vec<Value>,
}

impl Program {
  pub fn cells(&self) -> &[Value] {
    &self.cells
  }

  pub fn into_cells(self) -> Vec<Value> {
    self.cells
  }

  /// Parse the first line of `reader`, ignoring anything after it.
  pub fn read_first_line<R>(mut reader: R) -> Result<Self, ParseError>
  where
    R: BufRead,
  {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    line.parse()
  }
}

impl From<Vec<Value>> for Program {
  fn from(cells: Vec<Value>) -> Self {
    Self { cells }
  }
}

/// Why a program text could not be turned into cells. Offsets count
/// characters from the start of the text.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
  #[error("could not read character `{character}` at position {offset}")]
  UnexpectedCharacter { character: char, offset: usize },

  #[error("expected digits after sign at position {offset}")]
  UnexpectedEnd { offset: usize },

  #[error("integer `{literal}` at position {offset} does not fit in 64 bits")]
  OutOfRange { literal: String, offset: usize },

  #[error("I/O error while reading program: {0}")]
  Io(#[from] io::Error),
}

impl FromStr for Program {
  type Err = ParseError;

  /// Comma separated integers with optional whitespace around them. A comma
  /// is only consumed when it directly follows an integer.
  fn from_str(text: &str) -> Result<Self, Self::Err> {
    let mut chars = text.chars().enumerate().peekable();
    let mut cells = Vec::new();
    loop {
      while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
      let Some(&(offset, c)) = chars.peek() else {
        break;
      };
      if !(c.is_ascii_digit() || c == '+' || c == '-') {
        return Err(ParseError::UnexpectedCharacter { character: c, offset });
      }
      cells.push(integer(&mut chars, offset)?);
      chars.next_if(|(_, c)| *c == ',');
    }
    Ok(cells.into())
  }
}

fn integer<I>(chars: &mut Peekable<I>, offset: usize) -> Result<Value, ParseError>
where
  I: Iterator<Item = (usize, char)>,
{
  let mut literal = String::new();
  if let Some((_, sign)) = chars.next_if(|(_, c)| *c == '+' || *c == '-') {
    literal.push(sign);
  }
  while let Some((_, digit)) = chars.next_if(|(_, c)| c.is_ascii_digit()) {
    literal.push(digit);
  }
  if literal.len() == 1 && !literal.starts_with(|c: char| c.is_ascii_digit()) {
    return match chars.peek() {
      Some(&(offset, character)) => Err(ParseError::UnexpectedCharacter { character, offset }),
      None => Err(ParseError::UnexpectedEnd { offset }),
    };
  }
  literal
    .parse()
    .map_err(|_| ParseError::OutOfRange { literal, offset })
}
