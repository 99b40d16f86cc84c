use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::ops::Range;

use tracing::{debug, trace, warn};

use crate::dump::Dump;
use crate::input;
use crate::instruction::{Instruction, Mode};
use crate::memory::Memory;
use crate::opcode::{Opcode, Operand};
use crate::program::{ParseError, Program};

/// The type of a single tape cell
pub type Value = i64;

/// Steps `execute` may take before giving up on a program
pub const MAX_STEPS: usize = 1_000_000;

/// Cells the tape may grow to
pub const MEMORY_LIMIT: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
  Ready,
  Halted,
}

/// Tunables of a single machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
  /// Steps a single `execute` call may take before failing with
  /// [`Error::Runaway`].
  pub max_steps: usize,
  /// Tape growth past this many cells fails with [`Error::MemoryLimit`].
  pub memory_limit: usize,
  /// Whether the input source is a person at a terminal, in which case
  /// `Input` prints a `>` prompt before blocking.
  pub interactive: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      max_steps: MAX_STEPS,
      memory_limit: MEMORY_LIMIT,
      interactive: false,
    }
  }
}

/// An intcode machine reading from `I` and writing to `O`.
///
/// The machine owns its tape; hosts only ever see it through [`Vm::memory`],
/// [`Vm::peek`] and [`Vm::dump`], none of which grow it.
#[derive(Debug)]
pub struct Vm<I = StdinLock<'static>, O = Stdout> {
  // offset of the next cell to fetch
  ip: usize,
  relative_base: Value,
  memory: Memory,
  state: State,
  config: Config,
  input: I,
  output: O,
}

impl Vm {
  /// Create a machine over the process's standard streams.
  pub fn new(program: impl Into<Program>) -> Self {
    let config = Config {
      interactive: true,
      ..Config::default()
    };
    Self::with_io(program, io::stdin().lock(), io::stdout()).with_config(config)
  }

  /// Create a machine with nothing loaded yet
  pub fn empty() -> Self {
    Self::new(Program::default())
  }

  /// Parse `text` and create a machine over the standard streams.
  pub fn parse(text: &str) -> Result<Self, ParseError> {
    Ok(Self::new(text.parse::<Program>()?))
  }
}

impl Default for Vm {
  fn default() -> Self {
    Self::empty()
  }
}

impl<I, O> Vm<I, O>
where
  I: BufRead,
  O: Write,
{
  pub fn with_io(program: impl Into<Program>, input: I, output: O) -> Self {
    let config = Config::default();
    Self {
      ip: 0,
      relative_base: 0,
      memory: Memory::new(program.into().into_cells(), config.memory_limit),
      state: State::Ready,
      config,
      input,
      output,
    }
  }

  pub fn with_config(mut self, config: Config) -> Self {
    self.config = config;
    self.memory.set_limit(config.memory_limit);
    self
  }

  /// Replace the tape with `program` and start over from the first cell.
  pub fn load(&mut self, program: impl Into<Program>) {
    let cells = program.into().into_cells();
    debug!(cells = cells.len(), "loading program");
    self.memory = Memory::new(cells, self.config.memory_limit);
    self.ip = 0;
    self.relative_base = 0;
    self.state = State::Ready;
  }

  /// Decode and execute exactly one instruction.
  ///
  /// A failure part way through leaves whatever the instruction already did
  /// (tape growth, an input consumed) in place.
  pub fn step(&mut self) -> Result<(), Error> {
    if self.state == State::Halted {
      return Err(Error::MachineHalted);
    }
    Task::new(self).run()
  }

  /// Step until the machine halts, or fail with [`Error::Runaway`] once
  /// `max_steps` steps have gone by without halting. An empty tape has
  /// nothing to run and returns immediately.
  pub fn execute(&mut self) -> Result<(), Error> {
    if self.memory.is_empty() {
      return Ok(());
    }
    for _ in 0..self.config.max_steps {
      if self.state == State::Halted {
        return Ok(());
      }
      self.step()?;
    }
    if self.state == State::Halted {
      return Ok(());
    }
    warn!(steps = self.config.max_steps, ip = self.ip, "step limit reached");
    Err(Error::Runaway {
      steps: self.config.max_steps,
    })
  }

  /// Offset of the next cell the machine will fetch
  pub fn ip(&self) -> usize {
    self.ip
  }

  pub fn relative_base(&self) -> Value {
    self.relative_base
  }

  pub fn is_halted(&self) -> bool {
    self.state == State::Halted
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn memory(&self) -> &[Value] {
    self.memory.as_slice()
  }

  /// The value at `address`, zero past the end of the tape
  pub fn peek(&self, address: usize) -> Value {
    self.memory.peek(address)
  }

  pub fn dump(&self, range: Range<usize>) -> Dump<'_> {
    self.memory.dump(range)
  }

  /// The machine's input source, for a host that reads from the same stream
  /// between steps.
  pub fn input_mut(&mut self) -> &mut I {
    &mut self.input
  }

  pub fn output(&self) -> &O {
    &self.output
  }

  pub fn into_output(self) -> O {
    self.output
  }
}

/// An error that occurred while loading or executing a program
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Parse(#[from] ParseError),

  #[error("out of bounds: fetch at {address} past the end of a {length} cell tape")]
  OutOfBounds { address: usize, length: usize },

  #[error("address {address} is past the memory limit of {limit} cells")]
  MemoryLimit { address: usize, limit: usize },

  /// `address` is the pointer after the opcode fetch, one past the opcode cell.
  #[error("unknown opcode {opcode} at position {address}")]
  UnknownOpcode { opcode: Value, address: usize },

  #[error("unknown addressing mode {mode} in instruction at {address}")]
  InvalidMode { mode: Value, address: usize },

  #[error("addressing mode {mode} cannot be used for a write target (instruction at {address})")]
  IncompatibleMode { mode: Value, address: usize },

  #[error("negative address {address} in instruction at {at}")]
  NegativeAddress { address: Value, at: usize },

  #[error("arithmetic overflow in instruction at {address}")]
  Overflow { address: usize },

  #[error("input exhausted")]
  InputExhausted,

  #[error("expected an integer on input, got `{token}`")]
  InvalidInput { token: String },

  #[error("machine is halted")]
  MachineHalted,

  #[error("reached the limit of {steps} steps without halting")]
  Runaway { steps: usize },

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),
}

/// Operands of one instruction, resolved in fetch order.
#[derive(Debug, Default)]
struct Operands {
  values: [Value; 2],
  // only meaningful for opcodes whose table ends in `Operand::Address`
  target: usize,
}

struct Task<'vm, I, O> {
  vm: &'vm mut Vm<I, O>,
  // address of the instruction being executed
  pc: usize,
}

impl<'vm, I, O> Task<'vm, I, O>
where
  I: BufRead,
  O: Write,
{
  fn new(vm: &'vm mut Vm<I, O>) -> Self {
    let pc = vm.ip;
    Self { vm, pc }
  }

  #[inline]
  fn eat(&mut self) -> Result<Value, Error> {
    let value = self.vm.memory.get(self.vm.ip).ok_or(Error::OutOfBounds {
      address: self.vm.ip,
      length: self.vm.memory.len(),
    })?;
    self.vm.ip += 1;
    Ok(value)
  }

  fn address(&self, raw: Value) -> Result<usize, Error> {
    raw.try_into().map_err(|_| Error::NegativeAddress {
      address: raw,
      at: self.pc,
    })
  }

  fn relative(&self, offset: Value) -> Result<usize, Error> {
    let raw = offset
      .checked_add(self.vm.relative_base)
      .ok_or(Error::Overflow { address: self.pc })?;
    self.address(raw)
  }

  fn eat_value(&mut self, mode: Value) -> Result<Value, Error> {
    let mode = Mode::try_from(mode).map_err(|mode| Error::InvalidMode {
      mode,
      address: self.pc,
    })?;
    let raw = self.eat()?;
    match mode {
      Mode::Immediate => Ok(raw),
      Mode::Position => {
        let address = self.address(raw)?;
        self.vm.memory.read(address)
      }
      Mode::Relative => {
        let address = self.relative(raw)?;
        self.vm.memory.read(address)
      }
    }
  }

  fn eat_address(&mut self, mode: Value) -> Result<usize, Error> {
    match Mode::try_from(mode) {
      Ok(Mode::Position) => {
        let raw = self.eat()?;
        self.address(raw)
      }
      Ok(Mode::Relative) => {
        let raw = self.eat()?;
        self.relative(raw)
      }
      Ok(Mode::Immediate) => Err(Error::IncompatibleMode {
        mode,
        address: self.pc,
      }),
      Err(mode) => Err(Error::InvalidMode {
        mode,
        address: self.pc,
      }),
    }
  }

  fn eat_operands(&mut self, inst: &Instruction) -> Result<Operands, Error> {
    let mut operands = Operands::default();
    let mut values = operands.values.iter_mut();
    for (kind, &mode) in inst.opcode.operands().iter().zip(&inst.modes) {
      match kind {
        Operand::Value => {
          let value = self.eat_value(mode)?;
          if let Some(slot) = values.next() {
            *slot = value;
          }
        }
        Operand::Address => operands.target = self.eat_address(mode)?,
      }
    }
    Ok(operands)
  }

  fn run(&mut self) -> Result<(), Error> {
    let word = self.eat()?;
    let inst = Instruction::decode(word).map_err(|opcode| Error::UnknownOpcode {
      opcode,
      address: self.vm.ip,
    })?;
    trace!(pc = self.pc, word, opcode = ?inst.opcode, "decoded");
    let Operands {
      values: [a, b],
      target,
    } = self.eat_operands(&inst)?;
    match inst.opcode {
      Opcode::Add => add(self, a, b, target),
      Opcode::Multiply => multiply(self, a, b, target),
      Opcode::Input => read_input(self, target),
      Opcode::Output => write_output(self, a),
      Opcode::JumpIfTrue => jump_if(self, a != 0, b),
      Opcode::JumpIfFalse => jump_if(self, a == 0, b),
      Opcode::LessThan => self.vm.memory.write(target, Value::from(a < b)),
      Opcode::Equals => self.vm.memory.write(target, Value::from(a == b)),
      Opcode::AdjustRelativeBase => adjust_relative_base(self, a),
      Opcode::Halt => halt(self),
    }
  }
}

// m[dst] ← a + b
fn add<I, O>(task: &mut Task<'_, I, O>, a: Value, b: Value, target: usize) -> Result<(), Error>
where
  I: BufRead,
  O: Write,
{
  let sum = a
    .checked_add(b)
    .ok_or(Error::Overflow { address: task.pc })?;
  task.vm.memory.write(target, sum)
}

// m[dst] ← a × b
fn multiply<I, O>(task: &mut Task<'_, I, O>, a: Value, b: Value, target: usize) -> Result<(), Error>
where
  I: BufRead,
  O: Write,
{
  let product = a
    .checked_mul(b)
    .ok_or(Error::Overflow { address: task.pc })?;
  task.vm.memory.write(target, product)
}

// m[dst] ← in
fn read_input<I, O>(task: &mut Task<'_, I, O>, target: usize) -> Result<(), Error>
where
  I: BufRead,
  O: Write,
{
  if task.vm.config.interactive {
    write!(task.vm.output, ">")?;
    task.vm.output.flush()?;
  }
  let value = input::read_value(&mut task.vm.input)?;
  task.vm.memory.write(target, value)
}

// out ← a
fn write_output<I, O>(task: &mut Task<'_, I, O>, a: Value) -> Result<(), Error>
where
  I: BufRead,
  O: Write,
{
  writeln!(task.vm.output, "{a}")?;
  Ok(())
}

// if cond : ip ← target
fn jump_if<I, O>(task: &mut Task<'_, I, O>, cond: bool, target: Value) -> Result<(), Error>
where
  I: BufRead,
  O: Write,
{
  if cond {
    task.vm.ip = task.address(target)?;
  }
  Ok(())
}

// rb ← rb + a
fn adjust_relative_base<I, O>(task: &mut Task<'_, I, O>, a: Value) -> Result<(), Error>
where
  I: BufRead,
  O: Write,
{
  task.vm.relative_base = task
    .vm
    .relative_base
    .checked_add(a)
    .ok_or(Error::Overflow { address: task.pc })?;
  debug!(relative_base = task.vm.relative_base, "relative base adjusted");
  Ok(())
}

// (stop execution)
fn halt<I, O>(task: &mut Task<'_, I, O>) -> Result<(), Error>
where
  I: BufRead,
  O: Write,
{
  debug!(pc = task.pc, "halted");
  task.vm.state = State::Halted;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  type TestVm<'a> = Vm<&'a [u8], Vec<u8>>;

  fn machine(program: &[Value], input: &'static str) -> TestVm<'static> {
    Vm::with_io(program.to_vec(), input.as_bytes(), Vec::new())
  }

  fn run(program: &[Value], input: &'static str) -> String {
    let mut vm = machine(program, input);
    vm.execute().unwrap();
    String::from_utf8(vm.into_output()).unwrap()
  }

  fn memory_after(program: &[Value]) -> Vec<Value> {
    let mut vm = machine(program, "");
    vm.execute().unwrap();
    vm.memory().to_vec()
  }

  mod programs {
    use super::*;

    #[test]
    fn halt_only_leaves_memory_alone() {
      assert_eq!(memory_after(&[99]), vec![99]);
      assert_eq!(memory_after(&[99, 5, -3, 1102]), vec![99, 5, -3, 1102]);
    }

    #[test]
    fn day_one() {
      assert_eq!(memory_after(&[1, 0, 0, 0, 99]), vec![2, 0, 0, 0, 99]);
      assert_eq!(memory_after(&[2, 3, 0, 3, 99]), vec![2, 3, 0, 6, 99]);
      assert_eq!(memory_after(&[2, 4, 4, 5, 99, 0]), vec![2, 4, 4, 5, 99, 9801]);
      assert_eq!(
        memory_after(&[1, 1, 1, 4, 99, 5, 6, 0, 99]),
        vec![30, 1, 1, 4, 2, 5, 6, 0, 99]
      );
    }

    #[test]
    fn echo() {
      assert_eq!(run(&[3, 0, 4, 0, 99], "66"), "66\n");
    }

    #[test]
    fn large_immediate() {
      assert_eq!(run(&[104, 1125899906842624, 99], ""), "1125899906842624\n");
    }

    #[test]
    fn large_product() {
      assert_eq!(
        run(&[1102, 34915192, 34915192, 7, 4, 7, 99, 0], ""),
        "1219070632396864\n"
      );
    }

    #[test]
    fn relative_mode() {
      assert_eq!(run(&[109, -1, 4, 1, 99], ""), "-1\n");
      assert_eq!(run(&[109, -1, 104, 1, 99], ""), "1\n");
      assert_eq!(run(&[109, -1, 204, 1, 99], ""), "109\n");
      assert_eq!(run(&[109, 1, 9, 2, 204, -6, 99], ""), "204\n");
      assert_eq!(run(&[109, 1, 109, 9, 204, -6, 99], ""), "204\n");
      assert_eq!(run(&[109, 1, 209, -1, 204, -106, 99], ""), "204\n");
      assert_eq!(run(&[109, 1, 3, 3, 204, 2, 99], "1"), "1\n");
      assert_eq!(run(&[109, 1, 203, 2, 204, 2, 99], "1"), "1\n");
    }

    #[test]
    fn quine() {
      let program = [
        109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
      ];
      let expected: String = program.iter().map(|v| format!("{v}\n")).collect();
      assert_eq!(run(&program, ""), expected);
    }

    #[test]
    fn compare_with_eight() {
      // position mode, equal to 8
      let program = [3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8];
      assert_eq!(run(&program, "8"), "1\n");
      assert_eq!(run(&program, "7"), "0\n");
      // immediate mode, less than 8
      let program = [3, 3, 1107, -1, 8, 3, 4, 3, 99];
      assert_eq!(run(&program, "5"), "1\n");
      assert_eq!(run(&program, "9"), "0\n");
    }

    #[test]
    fn jumps() {
      let position = [3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9];
      let immediate = [3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1];
      for program in [&position[..], &immediate[..]] {
        assert_eq!(run(program, "0"), "0\n");
        assert_eq!(run(program, "42"), "1\n");
      }
    }
  }

  mod step {
    use super::*;

    #[test]
    fn new() {
      let vm = machine(&[1, 0, 0, 0, 99], "");
      assert_eq!(vm.ip(), 0);
      assert_eq!(vm.relative_base(), 0);
      assert!(!vm.is_halted());
      assert_eq!(vm.config(), &Config::default());
    }

    #[test]
    fn one_instruction_per_step() {
      let mut vm = machine(&[1, 0, 0, 0, 2, 0, 0, 0, 99], "");
      vm.step().unwrap();
      assert_eq!(vm.ip(), 4);
      assert_eq!(vm.memory()[0], 2);
      vm.step().unwrap();
      assert_eq!(vm.ip(), 8);
      assert_eq!(vm.memory()[0], 4);
      assert!(!vm.is_halted());
      vm.step().unwrap();
      assert_eq!(vm.ip(), 9);
      assert!(vm.is_halted());
    }

    #[test]
    fn cant_step_past_halt() {
      let mut vm = machine(&[99], "");
      vm.step().unwrap();
      assert!(matches!(vm.step(), Err(Error::MachineHalted)));
      assert_eq!(vm.ip(), 1);
      // execute on a halted machine is a no-op
      vm.execute().unwrap();
    }

    #[test]
    fn jump_taken_and_not_taken() {
      let mut vm = machine(&[1105, 1, 7, 1105, 0, 0, 99, 1106, 0, 3], "");
      vm.step().unwrap();
      assert_eq!(vm.ip(), 7);
      vm.step().unwrap();
      assert_eq!(vm.ip(), 3);
      vm.step().unwrap();
      assert_eq!(vm.ip(), 6);
      vm.step().unwrap();
      assert!(vm.is_halted());
    }

    #[test]
    fn relative_base_accumulates() {
      let mut vm = machine(&[109, 5, 109, -2, 99], "");
      vm.step().unwrap();
      assert_eq!(vm.relative_base(), 5);
      vm.step().unwrap();
      assert_eq!(vm.relative_base(), 3);
    }

    #[test]
    fn comparisons_write_flags() {
      let mut vm = machine(&[1107, 1, 2, 9, 1108, 3, 4, 10, 99, 7, 7], "");
      vm.execute().unwrap();
      assert_eq!(vm.memory()[9..], [1, 0]);
    }
  }

  mod streams {
    use super::*;

    #[test]
    fn prompt_only_when_interactive() {
      let program: Vec<Value> = vec![3, 0, 4, 0, 99];
      let mut vm = Vm::with_io(program.clone(), "5".as_bytes(), Vec::new());
      vm.execute().unwrap();
      assert_eq!(vm.output(), b"5\n");

      let config = Config {
        interactive: true,
        ..Config::default()
      };
      let mut vm = Vm::with_io(program, "5".as_bytes(), Vec::new()).with_config(config);
      vm.execute().unwrap();
      assert_eq!(vm.output(), b">5\n");
    }

    #[test]
    fn input_exhausted() {
      let mut vm = machine(&[3, 0, 3, 1, 99], "4");
      assert!(matches!(vm.execute(), Err(Error::InputExhausted)));
      assert_eq!(vm.memory()[0], 4);
      assert_eq!(vm.ip(), 4);
    }

    #[test]
    fn invalid_input() {
      let mut vm = machine(&[3, 0, 99], "four");
      assert!(matches!(
        vm.execute(),
        Err(Error::InvalidInput { token }) if token == "four"
      ));
    }

    #[test]
    fn several_inputs() {
      let program = [3, 13, 3, 14, 1, 13, 14, 15, 4, 15, 99, 0, 0, 0, 0, 0];
      assert_eq!(run(&program, "2 40"), "42\n");
      assert_eq!(run(&program, "2\n40\n"), "42\n");
    }
  }

  mod errors {
    use super::*;

    #[test]
    fn unknown_opcode() {
      let mut vm = machine(&[1101, 1, 1, 0, 42], "");
      vm.step().unwrap();
      assert!(matches!(
        vm.step(),
        Err(Error::UnknownOpcode { opcode: 42, address: 5 })
      ));
      assert_eq!(vm.ip(), 5);
    }

    #[test]
    fn fetch_past_end() {
      let mut vm = machine(&[1, 0, 0], "");
      assert!(matches!(
        vm.step(),
        Err(Error::OutOfBounds { address: 3, length: 3 })
      ));
      // no halt and running off the end of the tape
      let mut vm = machine(&[1101, 0, 0, 0], "");
      assert!(matches!(vm.execute(), Err(Error::OutOfBounds { address: 4, .. })));
    }

    #[test]
    fn immediate_write_target() {
      let mut vm = machine(&[11101, 1, 1, 0, 99], "");
      assert!(matches!(
        vm.step(),
        Err(Error::IncompatibleMode { mode: 1, address: 0 })
      ));
      let mut vm = machine(&[103, 0, 99], "1");
      assert!(matches!(vm.step(), Err(Error::IncompatibleMode { .. })));
    }

    #[test]
    fn invalid_mode() {
      let mut vm = machine(&[304, 0, 99], "");
      assert!(matches!(
        vm.step(),
        Err(Error::InvalidMode { mode: 3, address: 0 })
      ));
      let mut vm = machine(&[50001, 0, 0, 0, 99], "");
      assert!(matches!(vm.step(), Err(Error::InvalidMode { mode: 5, .. })));
    }

    #[test]
    fn negative_address() {
      let mut vm = machine(&[4, -1, 99], "");
      assert!(matches!(
        vm.step(),
        Err(Error::NegativeAddress { address: -1, at: 0 })
      ));
      let mut vm = machine(&[1105, 1, -5, 99], "");
      assert!(matches!(vm.step(), Err(Error::NegativeAddress { address: -5, .. })));
    }

    #[test]
    fn overflow() {
      let mut vm = machine(&[1101, Value::MAX, 1, 0, 99], "");
      assert!(matches!(vm.step(), Err(Error::Overflow { address: 0 })));
      let mut vm = machine(&[1102, Value::MAX, 2, 0, 99], "");
      assert!(matches!(vm.step(), Err(Error::Overflow { .. })));
    }

    #[test]
    fn partial_instruction_is_not_rolled_back() {
      // first operand grows the tape, the second is an invalid mode
      let mut vm = machine(&[30001, 9, 0, 0, 99], "");
      assert!(vm.step().is_err());
      assert_eq!(vm.memory().len(), 10);
      assert_eq!(vm.ip(), 3);
    }

    #[test]
    fn memory_limit() {
      let config = Config {
        memory_limit: 16,
        ..Config::default()
      };
      let mut vm = machine(&[1101, 1, 1, 100, 99], "").with_config(config);
      assert!(matches!(
        vm.step(),
        Err(Error::MemoryLimit { address: 100, limit: 16 })
      ));
    }
  }

  mod runaway {
    use super::*;

    fn limited(program: &[Value], max_steps: usize) -> TestVm<'static> {
      let config = Config {
        max_steps,
        ..Config::default()
      };
      machine(program, "").with_config(config)
    }

    #[test]
    fn infinite_loop_fails_after_exactly_the_limit() {
      let mut vm = limited(&[1105, 1, 0], 10);
      assert!(matches!(vm.execute(), Err(Error::Runaway { steps: 10 })));
      assert!(!vm.is_halted());
    }

    #[test]
    fn counts_every_step() {
      // increments cell 7 once per trip around the loop
      let mut vm = limited(&[101, 1, 7, 7, 1105, 1, 0, 0], 7);
      assert!(vm.execute().is_err());
      // seven steps: four adds and three jumps
      assert_eq!(vm.memory()[7], 4);
      assert_eq!(vm.ip(), 4);
    }

    #[test]
    fn halting_on_the_last_allowed_step_is_fine() {
      let mut vm = limited(&[1101, 0, 0, 0, 99], 2);
      vm.execute().unwrap();
      assert!(vm.is_halted());
      let mut vm = limited(&[1101, 0, 0, 0, 99], 1);
      assert!(matches!(vm.execute(), Err(Error::Runaway { steps: 1 })));
    }

    #[test]
    fn default_limit() {
      let mut vm = machine(&[1105, 1, 0], "");
      assert!(matches!(vm.execute(), Err(Error::Runaway { steps: MAX_STEPS })));
    }

    #[test]
    fn empty_tape_does_nothing() {
      let mut vm = machine(&[], "");
      vm.execute().unwrap();
      assert!(!vm.is_halted());
      assert!(vm.memory().is_empty());
    }
  }

  mod memory {
    use super::*;

    #[test]
    fn reads_past_the_end_grow_the_tape() {
      let mut vm = machine(&[4, 10, 99], "");
      vm.step().unwrap();
      assert_eq!(vm.memory(), &[4, 10, 99, 0, 0, 0, 0, 0, 0, 0, 0]);
      assert_eq!(vm.output(), b"0\n");
    }

    #[test]
    fn writes_past_the_end_grow_the_tape() {
      let mut vm = machine(&[1101, 2, 3, 6, 99], "");
      vm.step().unwrap();
      assert_eq!(vm.memory(), &[1101, 2, 3, 6, 99, 0, 5]);
    }

    #[test]
    fn immediate_reads_never_grow() {
      let mut vm = machine(&[104, 1000, 99], "");
      vm.execute().unwrap();
      assert_eq!(vm.memory().len(), 3);
    }

    #[test]
    fn inspection_is_side_effect_free() {
      let vm = machine(&[1, 0, 0, 0, 99], "");
      let before = vm.memory().to_vec();
      assert_eq!(vm.peek(1000), 0);
      let text = vm.dump(0..1000).to_string();
      assert!(text.contains("0000000000:"));
      assert_eq!(vm.dump(3..1000).cells(), &[0, 99]);
      assert_eq!(vm.memory(), &before[..]);
      assert_eq!(vm.ip(), 0);
    }

    #[test]
    fn load_resets() {
      let mut vm = machine(&[109, 3, 99], "");
      vm.execute().unwrap();
      assert!(vm.is_halted());
      vm.load(vec![1101, 1, 2, 0, 99_i64]);
      assert_eq!(vm.ip(), 0);
      assert_eq!(vm.relative_base(), 0);
      assert!(!vm.is_halted());
      vm.execute().unwrap();
      assert_eq!(vm.memory()[0], 3);
    }

    #[test]
    fn empty_then_load() {
      let mut vm: TestVm<'static> = Vm::with_io(Program::default(), "".as_bytes(), Vec::new());
      assert!(vm.memory().is_empty());
      vm.load("1102,3,4,5,99".parse::<Program>().unwrap());
      vm.execute().unwrap();
      assert_eq!(vm.memory(), &[1102, 3, 4, 5, 99, 12]);
    }
  }
}
