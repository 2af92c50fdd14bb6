//! x87 FPU escape decoding (opcode bytes 0xD8-0xDF).
//!
//! The encoding depends on both the escape byte and the ModR/M byte:
//! - ModR/M < 0xC0: memory operand, the reg field selects the instruction
//! - ModR/M >= 0xC0: register form over ST(i), a different table keyed on
//!   the whole ModR/M byte

use retro86_core::Opcode;

/// Memory-operand width class of an ESC memory form.
///
/// `Environment` and `State` resolve to 14/28 and 94/108 bytes depending
/// on the effective operand size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscMem {
    Single,
    Double,
    ExtendedReal,
    Int16,
    Int32,
    Int64,
    PackedBcd,
    /// FPU control/status word (two bytes).
    ControlWord,
    /// FLDENV/FSTENV area.
    Environment,
    /// FSAVE/FRSTOR area.
    State,
}

/// Operand shape of an ESC register form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscReg {
    /// No operands (FCHS, FLD1, FUCOMPP, ...).
    NoOperands,
    /// ST(i) alone.
    Sti,
    /// ST(0), ST(i).
    St0Sti,
    /// ST(i), ST(0).
    StiSt0,
    /// FSTSW AX.
    Ax,
}

/// Memory-form table entry.
#[derive(Debug, Clone, Copy)]
pub struct EscMemEntry {
    pub opcode: Opcode,
    pub width: EscMem,
}

/// Register-form lookup result.
#[derive(Debug, Clone, Copy)]
pub struct EscRegEntry {
    pub opcode: Opcode,
    pub form: EscReg,
}

const fn mem(opcode: Opcode, width: EscMem) -> Option<EscMemEntry> {
    Some(EscMemEntry { opcode, width })
}

const fn reg(opcode: Opcode, form: EscReg) -> Option<EscRegEntry> {
    Some(EscRegEntry { opcode, form })
}

// ============================================================================
// D8: single-precision arithmetic
// ============================================================================

/// D8 /r with memory operand: m32fp arithmetic.
pub static ESC_D8_MEM: [Option<EscMemEntry>; 8] = [
    mem(Opcode::Fadd, EscMem::Single),
    mem(Opcode::Fmul, EscMem::Single),
    mem(Opcode::Fcom, EscMem::Single),
    mem(Opcode::Fcomp, EscMem::Single),
    mem(Opcode::Fsub, EscMem::Single),
    mem(Opcode::Fsubr, EscMem::Single),
    mem(Opcode::Fdiv, EscMem::Single),
    mem(Opcode::Fdivr, EscMem::Single),
];

/// D8 with register operand: ST(0), ST(i) arithmetic; FCOM/FCOMP take a
/// lone ST(i).
pub fn lookup_d8_reg(modrm: u8) -> Option<EscRegEntry> {
    match modrm {
        0xC0..=0xC7 => reg(Opcode::Fadd, EscReg::St0Sti),
        0xC8..=0xCF => reg(Opcode::Fmul, EscReg::St0Sti),
        0xD0..=0xD7 => reg(Opcode::Fcom, EscReg::Sti),
        0xD8..=0xDF => reg(Opcode::Fcomp, EscReg::Sti),
        0xE0..=0xE7 => reg(Opcode::Fsub, EscReg::St0Sti),
        0xE8..=0xEF => reg(Opcode::Fsubr, EscReg::St0Sti),
        0xF0..=0xF7 => reg(Opcode::Fdiv, EscReg::St0Sti),
        0xF8..=0xFF => reg(Opcode::Fdivr, EscReg::St0Sti),
        _ => None,
    }
}

// ============================================================================
// D9: load/store, control word, constants, transcendentals
// ============================================================================

/// D9 /r with memory operand.
pub static ESC_D9_MEM: [Option<EscMemEntry>; 8] = [
    mem(Opcode::Fld, EscMem::Single),
    None,
    mem(Opcode::Fst, EscMem::Single),
    mem(Opcode::Fstp, EscMem::Single),
    mem(Opcode::Fldenv, EscMem::Environment),
    mem(Opcode::Fldcw, EscMem::ControlWord),
    mem(Opcode::Fstenv, EscMem::Environment),
    mem(Opcode::Fstcw, EscMem::ControlWord),
];

/// D9 with register operand: stack ops, constant loads, transcendentals.
pub fn lookup_d9_reg(modrm: u8) -> Option<EscRegEntry> {
    match modrm {
        0xC0..=0xC7 => reg(Opcode::Fld, EscReg::Sti),
        0xC8..=0xCF => reg(Opcode::Fxch, EscReg::Sti),
        0xD0 => reg(Opcode::Fnop, EscReg::NoOperands),
        0xE0 => reg(Opcode::Fchs, EscReg::NoOperands),
        0xE1 => reg(Opcode::Fabs, EscReg::NoOperands),
        0xE4 => reg(Opcode::Ftst, EscReg::NoOperands),
        0xE5 => reg(Opcode::Fxam, EscReg::NoOperands),
        0xE8 => reg(Opcode::Fld1, EscReg::NoOperands),
        0xE9 => reg(Opcode::Fldl2t, EscReg::NoOperands),
        0xEA => reg(Opcode::Fldl2e, EscReg::NoOperands),
        0xEB => reg(Opcode::Fldpi, EscReg::NoOperands),
        0xEC => reg(Opcode::Fldlg2, EscReg::NoOperands),
        0xED => reg(Opcode::Fldln2, EscReg::NoOperands),
        0xEE => reg(Opcode::Fldz, EscReg::NoOperands),
        0xF0 => reg(Opcode::F2xm1, EscReg::NoOperands),
        0xF1 => reg(Opcode::Fyl2x, EscReg::NoOperands),
        0xF2 => reg(Opcode::Fptan, EscReg::NoOperands),
        0xF3 => reg(Opcode::Fpatan, EscReg::NoOperands),
        0xF4 => reg(Opcode::Fxtract, EscReg::NoOperands),
        0xF5 => reg(Opcode::Fprem1, EscReg::NoOperands),
        0xF6 => reg(Opcode::Fdecstp, EscReg::NoOperands),
        0xF7 => reg(Opcode::Fincstp, EscReg::NoOperands),
        0xF8 => reg(Opcode::Fprem, EscReg::NoOperands),
        0xF9 => reg(Opcode::Fyl2xp1, EscReg::NoOperands),
        0xFA => reg(Opcode::Fsqrt, EscReg::NoOperands),
        0xFB => reg(Opcode::Fsincos, EscReg::NoOperands),
        0xFC => reg(Opcode::Frndint, EscReg::NoOperands),
        0xFD => reg(Opcode::Fscale, EscReg::NoOperands),
        0xFE => reg(Opcode::Fsin, EscReg::NoOperands),
        0xFF => reg(Opcode::Fcos, EscReg::NoOperands),
        _ => None,
    }
}

// ============================================================================
// DA: 32-bit integer arithmetic and conditional moves
// ============================================================================

/// DA /r with memory operand: m32int arithmetic.
pub static ESC_DA_MEM: [Option<EscMemEntry>; 8] = [
    mem(Opcode::Fiadd, EscMem::Int32),
    mem(Opcode::Fimul, EscMem::Int32),
    mem(Opcode::Ficom, EscMem::Int32),
    mem(Opcode::Ficomp, EscMem::Int32),
    mem(Opcode::Fisub, EscMem::Int32),
    mem(Opcode::Fisubr, EscMem::Int32),
    mem(Opcode::Fidiv, EscMem::Int32),
    mem(Opcode::Fidivr, EscMem::Int32),
];

/// DA with register operand: FCMOVcc and FUCOMPP.
pub fn lookup_da_reg(modrm: u8) -> Option<EscRegEntry> {
    match modrm {
        0xC0..=0xC7 => reg(Opcode::Fcmovb, EscReg::St0Sti),
        0xC8..=0xCF => reg(Opcode::Fcmove, EscReg::St0Sti),
        0xD0..=0xD7 => reg(Opcode::Fcmovbe, EscReg::St0Sti),
        0xD8..=0xDF => reg(Opcode::Fcmovu, EscReg::St0Sti),
        0xE9 => reg(Opcode::Fucompp, EscReg::NoOperands),
        _ => None,
    }
}

// ============================================================================
// DB: 32-bit integer load/store, extended real, FCMOVNcc, FCOMI
// ============================================================================

/// DB /r with memory operand.
pub static ESC_DB_MEM: [Option<EscMemEntry>; 8] = [
    mem(Opcode::Fild, EscMem::Int32),
    mem(Opcode::Fisttp, EscMem::Int32),
    mem(Opcode::Fist, EscMem::Int32),
    mem(Opcode::Fistp, EscMem::Int32),
    None,
    mem(Opcode::Fld, EscMem::ExtendedReal),
    None,
    mem(Opcode::Fstp, EscMem::ExtendedReal),
];

/// DB with register operand.
pub fn lookup_db_reg(modrm: u8) -> Option<EscRegEntry> {
    match modrm {
        0xC0..=0xC7 => reg(Opcode::Fcmovnb, EscReg::St0Sti),
        0xC8..=0xCF => reg(Opcode::Fcmovne, EscReg::St0Sti),
        0xD0..=0xD7 => reg(Opcode::Fcmovnbe, EscReg::St0Sti),
        0xD8..=0xDF => reg(Opcode::Fcmovnu, EscReg::St0Sti),
        0xE2 => reg(Opcode::Fclex, EscReg::NoOperands),
        0xE3 => reg(Opcode::Finit, EscReg::NoOperands),
        0xE8..=0xEF => reg(Opcode::Fucomi, EscReg::St0Sti),
        0xF0..=0xF7 => reg(Opcode::Fcomi, EscReg::St0Sti),
        _ => None,
    }
}

// ============================================================================
// DC: double-precision arithmetic
// ============================================================================

/// DC /r with memory operand: m64fp arithmetic.
pub static ESC_DC_MEM: [Option<EscMemEntry>; 8] = [
    mem(Opcode::Fadd, EscMem::Double),
    mem(Opcode::Fmul, EscMem::Double),
    mem(Opcode::Fcom, EscMem::Double),
    mem(Opcode::Fcomp, EscMem::Double),
    mem(Opcode::Fsub, EscMem::Double),
    mem(Opcode::Fsubr, EscMem::Double),
    mem(Opcode::Fdiv, EscMem::Double),
    mem(Opcode::Fdivr, EscMem::Double),
];

/// DC with register operand: ST(i), ST(0) arithmetic (subtraction and
/// division swap direction relative to D8).
pub fn lookup_dc_reg(modrm: u8) -> Option<EscRegEntry> {
    match modrm {
        0xC0..=0xC7 => reg(Opcode::Fadd, EscReg::StiSt0),
        0xC8..=0xCF => reg(Opcode::Fmul, EscReg::StiSt0),
        0xE0..=0xE7 => reg(Opcode::Fsubr, EscReg::StiSt0),
        0xE8..=0xEF => reg(Opcode::Fsub, EscReg::StiSt0),
        0xF0..=0xF7 => reg(Opcode::Fdivr, EscReg::StiSt0),
        0xF8..=0xFF => reg(Opcode::Fdiv, EscReg::StiSt0),
        _ => None,
    }
}

// ============================================================================
// DD: double-precision load/store and FPU state
// ============================================================================

/// DD /r with memory operand.
pub static ESC_DD_MEM: [Option<EscMemEntry>; 8] = [
    mem(Opcode::Fld, EscMem::Double),
    mem(Opcode::Fisttp, EscMem::Int64),
    mem(Opcode::Fst, EscMem::Double),
    mem(Opcode::Fstp, EscMem::Double),
    mem(Opcode::Frstor, EscMem::State),
    None,
    mem(Opcode::Fsave, EscMem::State),
    mem(Opcode::Fstsw, EscMem::ControlWord),
];

/// DD with register operand.
pub fn lookup_dd_reg(modrm: u8) -> Option<EscRegEntry> {
    match modrm {
        0xC0..=0xC7 => reg(Opcode::Ffree, EscReg::Sti),
        0xD0..=0xD7 => reg(Opcode::Fst, EscReg::Sti),
        0xD8..=0xDF => reg(Opcode::Fstp, EscReg::Sti),
        0xE0..=0xE7 => reg(Opcode::Fucom, EscReg::Sti),
        0xE8..=0xEF => reg(Opcode::Fucomp, EscReg::Sti),
        _ => None,
    }
}

// ============================================================================
// DE: 16-bit integer arithmetic and pop arithmetic
// ============================================================================

/// DE /r with memory operand: m16int arithmetic.
pub static ESC_DE_MEM: [Option<EscMemEntry>; 8] = [
    mem(Opcode::Fiadd, EscMem::Int16),
    mem(Opcode::Fimul, EscMem::Int16),
    mem(Opcode::Ficom, EscMem::Int16),
    mem(Opcode::Ficomp, EscMem::Int16),
    mem(Opcode::Fisub, EscMem::Int16),
    mem(Opcode::Fisubr, EscMem::Int16),
    mem(Opcode::Fidiv, EscMem::Int16),
    mem(Opcode::Fidivr, EscMem::Int16),
];

/// DE with register operand: arithmetic with pop.
pub fn lookup_de_reg(modrm: u8) -> Option<EscRegEntry> {
    match modrm {
        0xC0..=0xC7 => reg(Opcode::Faddp, EscReg::StiSt0),
        0xC8..=0xCF => reg(Opcode::Fmulp, EscReg::StiSt0),
        0xD9 => reg(Opcode::Fcompp, EscReg::NoOperands),
        0xE0..=0xE7 => reg(Opcode::Fsubrp, EscReg::StiSt0),
        0xE8..=0xEF => reg(Opcode::Fsubp, EscReg::StiSt0),
        0xF0..=0xF7 => reg(Opcode::Fdivrp, EscReg::StiSt0),
        0xF8..=0xFF => reg(Opcode::Fdivp, EscReg::StiSt0),
        _ => None,
    }
}

// ============================================================================
// DF: 16/64-bit integer load/store, BCD, status word
// ============================================================================

/// DF /r with memory operand.
pub static ESC_DF_MEM: [Option<EscMemEntry>; 8] = [
    mem(Opcode::Fild, EscMem::Int16),
    mem(Opcode::Fisttp, EscMem::Int16),
    mem(Opcode::Fist, EscMem::Int16),
    mem(Opcode::Fistp, EscMem::Int16),
    mem(Opcode::Fbld, EscMem::PackedBcd),
    mem(Opcode::Fild, EscMem::Int64),
    mem(Opcode::Fbstp, EscMem::PackedBcd),
    mem(Opcode::Fistp, EscMem::Int64),
];

/// DF with register operand.
pub fn lookup_df_reg(modrm: u8) -> Option<EscRegEntry> {
    match modrm {
        0xE0 => reg(Opcode::Fstsw, EscReg::Ax),
        0xE8..=0xEF => reg(Opcode::Fucomip, EscReg::St0Sti),
        0xF0..=0xF7 => reg(Opcode::Fcomip, EscReg::St0Sti),
        _ => None,
    }
}

/// Memory-form lookup for an escape byte and ModR/M reg field.
pub fn decode_mem(escape: u8, reg: u8) -> Option<EscMemEntry> {
    let table = match escape {
        0xD8 => &ESC_D8_MEM,
        0xD9 => &ESC_D9_MEM,
        0xDA => &ESC_DA_MEM,
        0xDB => &ESC_DB_MEM,
        0xDC => &ESC_DC_MEM,
        0xDD => &ESC_DD_MEM,
        0xDE => &ESC_DE_MEM,
        0xDF => &ESC_DF_MEM,
        _ => return None,
    };
    table[(reg & 7) as usize]
}

/// Register-form lookup for an escape byte and full ModR/M byte.
pub fn decode_reg(escape: u8, modrm: u8) -> Option<EscRegEntry> {
    match escape {
        0xD8 => lookup_d8_reg(modrm),
        0xD9 => lookup_d9_reg(modrm),
        0xDA => lookup_da_reg(modrm),
        0xDB => lookup_db_reg(modrm),
        0xDC => lookup_dc_reg(modrm),
        0xDD => lookup_dd_reg(modrm),
        0xDE => lookup_de_reg(modrm),
        0xDF => lookup_df_reg(modrm),
        _ => None,
    }
}
