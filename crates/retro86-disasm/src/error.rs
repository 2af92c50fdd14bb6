//! Decode error types.

use std::fmt;

use thiserror::Error;

/// Prefix categories named by duplicate-prefix errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixCategory {
    OperandSize,
    AddressSize,
    SegmentOverride,
    Lock,
    Repeat,
}

impl fmt::Display for PrefixCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OperandSize => "operand size",
            Self::AddressSize => "address size",
            Self::SegmentOverride => "segment override",
            Self::Lock => "LOCK",
            Self::Repeat => "repeat",
        })
    }
}

/// Prefixes whose pairing with a mnemonic can be illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixKind {
    Lock,
    Rep,
    Repne,
}

impl fmt::Display for PrefixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lock => "LOCK",
            Self::Rep => "REP",
            Self::Repne => "REPNE",
        })
    }
}

/// Error type for instruction decoding.
///
/// Every variant is fatal for the current instruction: the decoder never
/// returns a partial result and never retries. The variant is the error
/// kind, so callers can discriminate a truncated stream from an invalid
/// encoding without parsing the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Byte source exhausted mid-instruction.
    #[error("truncated instruction at {address:#x}")]
    Truncated { address: u64 },

    /// Unallocated primary, secondary or group opcode cell.
    #[error("invalid opcode {byte:#04x} at {address:#x}")]
    InvalidOpcode { address: u64, byte: u8 },

    /// Impossible scale/base combination in a SIB byte.
    #[error("invalid sib byte at {address:#x}")]
    InvalidSib { address: u64 },

    /// The same prefix category appeared twice before the opcode.
    #[error("multiple {category} prefixes at {address:#x}")]
    DuplicatePrefix {
        address: u64,
        category: PrefixCategory,
    },

    /// The call site required a memory form but ModR/M encoded mod == 3.
    #[error("expected memory operand at {address:#x}")]
    ExpectedMemory { address: u64 },

    /// The call site required a register form.
    #[error("expected register operand at {address:#x}")]
    ExpectedRegister { address: u64 },

    /// LOCK/REP/REPNE paired with an ineligible mnemonic or destination.
    #[error("invalid use of {prefix} prefix at {address:#x}")]
    InvalidPrefixUse { address: u64, prefix: PrefixKind },

    /// Out-of-range encoded GPR index.
    #[error("invalid register {index}")]
    InvalidRegister { index: u8 },

    /// Out-of-range encoded segment-register index.
    #[error("invalid segment register {index}")]
    InvalidSegment { index: u8 },

    /// Out-of-range encoded control-register index.
    #[error("invalid control register {index}")]
    InvalidControlRegister { index: u8 },
}
