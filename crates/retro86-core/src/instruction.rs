//! Decoded-instruction representation.

use crate::{Opcode, Operand};

/// Repeat-prefix state attached to an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Repeat {
    #[default]
    None,
    /// REP/REPE (0xF3).
    Equal,
    /// REPNE (0xF2).
    NotEqual,
}

/// A single decoded IA-32 instruction.
///
/// Immutable once constructed by the decoder; `operands` holds at most
/// three entries, in the order the encoding supplied them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    /// Address at which decoding began.
    pub address: u64,
    /// Decoded mnemonic.
    pub opcode: Opcode,
    /// A legal LOCK prefix preceded the opcode.
    pub locked: bool,
    /// Near (same-segment) variant of CALL/RET/JMP.
    pub near: bool,
    /// Repeat prefix.
    pub repeat: Repeat,
    /// Operands in append order (0..=3).
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Number of operands.
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Operand by zero-based slot, if present.
    pub fn operand(&self, slot: usize) -> Option<&Operand> {
        self.operands.get(slot)
    }
}
