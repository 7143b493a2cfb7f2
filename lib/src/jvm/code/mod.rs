//! Method bytecode
//!
//! ### Structure
//!
//! Despite being pushed off into [just another method attribute](crate::jvm::class_file::Code),
//! the bytecode is arguably the most important part of the class file - it contains the actual
//! executable instructions. [`decode`] turns the raw [list of bytecode instructions][0] into a
//! flat sequence of [`Instruction`]s:
//!
//!   - instructions that only differ in their opcode share a variant (all branches are
//!     [`Instruction::Jump`], all field accesses are [`Instruction::Field`], ...)
//!   - `wide` doesn't show up at all, but instead gets merged into the instruction it modifies
//!   - jump offsets become [`Label`]s, with a [`Instruction::Label`] placed before the target
//!   - source line information becomes [`Instruction::LineNumber`] pseudo-instructions
//!
//! ### Opcodes
//!
//! [`opcodes`] has a constant for every opcode along with its mnemonic. The mnemonic list
//! ([`mnemonics`]) is also the vocabulary of instruction references in patch scripts.
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-6.html#jvms-6.5

mod decoder;
mod instruction;
pub mod opcodes;

pub use decoder::*;
pub use instruction::*;
pub use opcodes::{mnemonics, opcode_name, PSEUDO_OPCODE};
