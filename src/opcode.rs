use crate::vm::Value;

/// How an operand cell is consumed by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
  /// Resolved to a value, any addressing mode
  Value,
  /// Resolved to a write target, never immediate
  Address,
}

const BINARY_STORE: &[Operand] = &[Operand::Value, Operand::Value, Operand::Address];
const BINARY: &[Operand] = &[Operand::Value, Operand::Value];
const UNARY: &[Operand] = &[Operand::Value];
const STORE: &[Operand] = &[Operand::Address];

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// | Operation | Semantics           | Operands     |
  /// |-----------|---------------------|--------------|
  /// | Add       | `m[dst] ← a + b`    | `a, b, dst`  |
  Add = 1,

  /// | Operation | Semantics           | Operands     |
  /// |-----------|---------------------|--------------|
  /// | Multiply  | `m[dst] ← a × b`    | `a, b, dst`  |
  Multiply = 2,

  /// Reads one integer from the input source, prompting with `>` when the
  /// source is interactive.
  ///
  /// | Operation | Semantics           | Operands |
  /// |-----------|---------------------|----------|
  /// | Input     | `m[dst] ← in`       | `dst`    |
  Input = 3,

  /// | Operation | Semantics           | Operands |
  /// |-----------|---------------------|----------|
  /// | Output    | `out ← a`           | `a`      |
  Output = 4,

  /// | Operation    | Semantics            | Operands |
  /// |--------------|----------------------|----------|
  /// | Jump If True | `if a ≠ 0 : ip ← b`  | `a, b`   |
  JumpIfTrue = 5,

  /// | Operation     | Semantics            | Operands |
  /// |---------------|----------------------|----------|
  /// | Jump If False | `if a = 0 : ip ← b`  | `a, b`   |
  JumpIfFalse = 6,

  /// | Operation | Semantics                  | Operands    |
  /// |-----------|----------------------------|-------------|
  /// | Less Than | `m[dst] ← a < b ? 1 : 0`   | `a, b, dst` |
  LessThan = 7,

  /// | Operation | Semantics                  | Operands    |
  /// |-----------|----------------------------|-------------|
  /// | Equals    | `m[dst] ← a = b ? 1 : 0`   | `a, b, dst` |
  Equals = 8,

  /// | Operation            | Semantics      | Operands |
  /// |----------------------|----------------|----------|
  /// | Adjust Relative Base | `rb ← rb + a`  | `a`      |
  AdjustRelativeBase = 9,

  /// | Operation | Semantics          | Operands |
  /// |-----------|--------------------|----------|
  /// | Halt      | `(stop execution)` | none     |
  Halt = 99,
}

impl Opcode {
  /// Operand kinds in fetch order.
  pub const fn operands(self) -> &'static [Operand] {
    match self {
      Self::Add | Self::Multiply | Self::LessThan | Self::Equals => BINARY_STORE,
      Self::Input => STORE,
      Self::Output | Self::AdjustRelativeBase => UNARY,
      Self::JumpIfTrue | Self::JumpIfFalse => BINARY,
      Self::Halt => &[],
    }
  }
}

impl TryFrom<Value> for Opcode {
  type Error = Value;

  fn try_from(code: Value) -> Result<Self, Self::Error> {
    Ok(match code {
      1 => Self::Add,
      2 => Self::Multiply,
      3 => Self::Input,
      4 => Self::Output,
      5 => Self::JumpIfTrue,
      6 => Self::JumpIfFalse,
      7 => Self::LessThan,
      8 => Self::Equals,
      9 => Self::AdjustRelativeBase,
      99 => Self::Halt,
      _ => return Err(code),
    })
  }
}
