use std::io::{self, BufRead};

use crate::vm::{Error, Value};

/// Read the next whitespace-delimited integer from `reader`.
///
/// The whitespace that terminates the token is left unread, so a line-based
/// host (such as the debugger sharing standard input) sees the rest of the line.
pub fn read_value<R>(reader: &mut R) -> Result<Value, Error>
where
  R: BufRead + ?Sized,
{
  let token = read_token(reader)?;
  if token.is_empty() {
    return Err(Error::InputExhausted);
  }
  token.parse().map_err(|_| Error::InvalidInput { token })
}

fn read_token<R>(reader: &mut R) -> io::Result<String>
where
  R: BufRead + ?Sized,
{
  let mut token = Vec::new();
  loop {
    let buf = reader.fill_buf()?;
    if buf.is_empty() {
      break;
    }
    let mut used = 0;
    let mut done = false;
    for &byte in buf {
      if byte.is_ascii_whitespace() {
        if !token.is_empty() {
          done = true;
          break;
        }
      } else {
        token.push(byte);
      }
      used += 1;
    }
    reader.consume(used);
    if done {
      break;
    }
  }
  Ok(String::from_utf8_lossy(&token).into_owned())
}
