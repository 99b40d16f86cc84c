//! Interpreter for intcode, the decimal-encoded instruction format where each
//! cell of a single growable tape is either an opcode (with its addressing
//! modes packed into the higher digits) or an operand.
//!
//! ```
//! use intcode::vm::Vm;
//!
//! let mut vm = Vm::with_io(vec![1, 0, 0, 0, 99_i64], "".as_bytes(), Vec::new());
//! vm.execute().unwrap();
//! assert_eq!(vm.memory(), &[2, 0, 0, 0, 99]);
//! ```

pub mod debugger;
pub mod dump;
pub mod input;
pub mod instruction;
pub mod memory;
pub mod opcode;
pub mod program;
pub mod vm;
