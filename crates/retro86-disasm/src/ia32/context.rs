//! Per-instruction decode state.

use retro86_core::{Bitness, Instruction, Opcode, Operand, Repeat, Segment};

use super::modrm::ModRM;
use crate::error::{DecodeError, PrefixKind};

/// Mutable state for one `disassemble` call.
///
/// Created fresh per instruction, mutated by the dispatch helpers, and
/// consumed by [`DecodeContext::finish`]. The cached ModR/M byte is read
/// at most once per instruction.
#[derive(Debug)]
pub struct DecodeContext {
    pub operand_size: Bitness,
    pub address_size: Bitness,
    pub operand_size_overridden: bool,
    pub address_size_overridden: bool,
    pub segment_override: Option<Segment>,
    pub locked: bool,
    pub repeat: Repeat,
    pub modrm: Option<ModRM>,
    pub opcode: Opcode,
    pub near: bool,
    pub start_address: u64,
    operands: Vec<Operand>,
}

impl DecodeContext {
    /// Fresh context with both sizes at the processor default.
    pub fn new(default_size: Bitness, start_address: u64) -> Self {
        Self {
            operand_size: default_size,
            address_size: default_size,
            operand_size_overridden: false,
            address_size_overridden: false,
            segment_override: None,
            locked: false,
            repeat: Repeat::None,
            modrm: None,
            opcode: Opcode::Invalid,
            near: false,
            start_address,
            operands: Vec::new(),
        }
    }

    /// Effective segment for a memory operand: the override, or DS.
    pub fn segment(&self) -> Segment {
        self.segment_override.unwrap_or(Segment::Ds)
    }

    /// Appends an operand. Instructions carry at most three; the opcode
    /// tables never exceed that.
    pub fn push(&mut self, operand: Operand) -> &mut Self {
        debug_assert!(self.operands.len() < 3, "operand slots exhausted");
        self.operands.push(operand);
        self
    }

    /// Validates prefix pairing and materialises the instruction.
    pub fn finish(self) -> Result<Instruction, DecodeError> {
        debug_assert!(self.opcode != Opcode::Invalid, "finish before dispatch");

        if self.locked {
            let register_dest = matches!(self.operands.first(), Some(Operand::Register(_)));
            if register_dest || !self.opcode.accepts_lock() {
                return Err(DecodeError::InvalidPrefixUse {
                    address: self.start_address,
                    prefix: PrefixKind::Lock,
                });
            }
        }

        match self.repeat {
            Repeat::Equal if !self.opcode.accepts_rep() => {
                return Err(DecodeError::InvalidPrefixUse {
                    address: self.start_address,
                    prefix: PrefixKind::Rep,
                });
            }
            Repeat::NotEqual if !self.opcode.accepts_repne() => {
                return Err(DecodeError::InvalidPrefixUse {
                    address: self.start_address,
                    prefix: PrefixKind::Repne,
                });
            }
            _ => {}
        }

        Ok(Instruction {
            address: self.start_address,
            opcode: self.opcode,
            locked: self.locked,
            near: self.near,
            repeat: self.repeat,
            operands: self.operands,
        })
    }
}
