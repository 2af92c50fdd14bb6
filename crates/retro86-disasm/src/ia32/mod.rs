//! IA-32 instruction decoder.
//!
//! Dispatch is table-driven: a 256-entry one-byte map, a 256-entry 0F map,
//! reg-field group tables, and per-escape x87 tables select a mnemonic and
//! an operand template; the decode session then materialises operands
//! through the ModR/M + SIB machinery under the effective operand and
//! address sizes.

mod context;
mod decoder;
mod modrm;
mod opcodes;
mod opcodes_0f;
mod x87;

pub use decoder::Ia32Disassembler;
