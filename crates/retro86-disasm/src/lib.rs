//! # retro86-disasm
//!
//! Streaming IA-32 (x86, 16/32-bit) instruction decoder.
//!
//! One [`Ia32Disassembler::disassemble`] call consumes bytes from a
//! [`ByteSource`] and produces a single structured
//! [`retro86_core::Instruction`]. The decoder handles:
//! - legacy prefixes (LOCK, REP/REPNE, segment overrides, operand/address
//!   size) with duplicate detection
//! - the one-byte opcode map and the 0F two-byte map
//! - the nine ModR/M "group" sub-tables
//! - the eight x87 escape maps (D8-DF)
//! - ModR/M and SIB effective-address decoding in 16- and 32-bit modes
//! - LOCK/REP/REPNE pairing legality

pub mod error;
pub mod ia32;
pub mod source;

pub use error::DecodeError;
pub use ia32::Ia32Disassembler;
pub use source::{ByteSource, SliceReader};
