//! # retro86-core
//!
//! Core abstractions for the retro86 disassembler. This crate defines the
//! IA-32 vocabulary shared by the decoder and its consumers: registers,
//! segment registers, access widths, the operand tree, the mnemonic set,
//! and the decoded-instruction type.

pub mod arch;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod register;

pub use arch::Bitness;
pub use instruction::{Instruction, Repeat};
pub use opcode::Opcode;
pub use operand::{Operand, Width};
pub use register::{Register, Segment};
