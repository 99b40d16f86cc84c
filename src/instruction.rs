use crate::opcode::Opcode;
use crate::vm::Value;

/// Per-operand interpretation of a fetched cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// The cell holds an address; the operand is the value stored there.
  Position,
  /// The cell holds the operand itself.
  Immediate,
  /// The cell holds an offset from the relative base.
  Relative,
}

impl TryFrom<Value> for Mode {
  type Error = Value;

  fn try_from(digit: Value) -> Result<Self, Self::Error> {
    match digit {
      0 => Ok(Self::Position),
      1 => Ok(Self::Immediate),
      2 => Ok(Self::Relative),
      _ => Err(digit),
    }
  }
}

/// A decoded instruction word.
///
/// Mode digits are kept raw: an undefined digit only fails once an operand
/// actually consumes it, so `1199` is still a valid halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
  pub opcode: Opcode,
  pub modes: [Value; 3],
}

impl Instruction {
  /// Split `word` into its opcode (low two digits) and three mode digits.
  ///
  /// Fails with the offending opcode value if it is not in the opcode table.
  pub fn decode(word: Value) -> Result<Self, Value> {
    let opcode = Opcode::try_from(word % 100)?;
    let modes = [(word / 100) % 10, (word / 1000) % 10, (word / 10000) % 10];
    Ok(Self { opcode, modes })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_opcode_defaults_to_position() {
    let inst = Instruction::decode(1).unwrap();
    assert_eq!(inst.opcode, Opcode::Add);
    assert_eq!(inst.modes, [0, 0, 0]);
  }

  #[test]
  fn modes_read_left_to_right() {
    let inst = Instruction::decode(21002).unwrap();
    assert_eq!(inst.opcode, Opcode::Multiply);
    assert_eq!(inst.modes, [0, 1, 2]);

    let inst = Instruction::decode(1102).unwrap();
    assert_eq!(inst.modes, [1, 1, 0]);

    let inst = Instruction::decode(204).unwrap();
    assert_eq!(inst.opcode, Opcode::Output);
    assert_eq!(Mode::try_from(inst.modes[0]), Ok(Mode::Relative));
  }

  #[test]
  fn unknown_opcode() {
    assert_eq!(Instruction::decode(0), Err(0));
    assert_eq!(Instruction::decode(1234), Err(34));
    assert_eq!(Instruction::decode(-1), Err(-1));
  }

  #[test]
  fn undefined_mode_digit_survives_decode() {
    let inst = Instruction::decode(30104).unwrap();
    assert_eq!(inst.modes, [1, 0, 3]);
    assert_eq!(Mode::try_from(inst.modes[2]), Err(3));
  }

  #[test]
  fn mode_digits() {
    assert_eq!(Mode::try_from(0), Ok(Mode::Position));
    assert_eq!(Mode::try_from(1), Ok(Mode::Immediate));
    assert_eq!(Mode::try_from(2), Ok(Mode::Relative));
    assert_eq!(Mode::try_from(9), Err(9));
  }
}
