//! Two-byte (0F escape) opcode map and its group tables.

use retro86_core::{Opcode, Segment};

use super::opcodes::{OpcodeEntry, Pattern};

const NONE_ENTRY: Option<OpcodeEntry> = None;

const fn entry(opcode: Opcode, pattern: Pattern) -> Option<OpcodeEntry> {
    Some(OpcodeEntry::new(opcode, pattern))
}

/// Two-byte opcode map, indexed by the byte following 0x0F.
///
/// Cells left unallocated raise an invalid-opcode error.
pub static OPCODE_TABLE_0F: [Option<OpcodeEntry>; 256] = {
    let mut t: [Option<OpcodeEntry>; 256] = [NONE_ENTRY; 256];

    t[0x00] = entry(Opcode::Invalid, Pattern::Group6);
    t[0x01] = entry(Opcode::Invalid, Pattern::Group7);
    t[0x02] = entry(Opcode::Lar, Pattern::GvEw);
    t[0x03] = entry(Opcode::Lsl, Pattern::GvEw);
    t[0x06] = entry(Opcode::Clts, Pattern::None);

    // MOV to/from control and debug registers.
    t[0x20] = entry(Opcode::Mov, Pattern::RegCr);
    t[0x21] = entry(Opcode::Mov, Pattern::RegDr);
    t[0x22] = entry(Opcode::Mov, Pattern::CrReg);
    t[0x23] = entry(Opcode::Mov, Pattern::DrReg);

    // Long-form conditional jumps.
    t[0x80] = entry(Opcode::Jo, Pattern::Jz);
    t[0x81] = entry(Opcode::Jno, Pattern::Jz);
    t[0x82] = entry(Opcode::Jb, Pattern::Jz);
    t[0x83] = entry(Opcode::Jae, Pattern::Jz);
    t[0x84] = entry(Opcode::Je, Pattern::Jz);
    t[0x85] = entry(Opcode::Jne, Pattern::Jz);
    t[0x86] = entry(Opcode::Jbe, Pattern::Jz);
    t[0x87] = entry(Opcode::Ja, Pattern::Jz);
    t[0x88] = entry(Opcode::Js, Pattern::Jz);
    t[0x89] = entry(Opcode::Jns, Pattern::Jz);
    t[0x8A] = entry(Opcode::Jp, Pattern::Jz);
    t[0x8B] = entry(Opcode::Jnp, Pattern::Jz);
    t[0x8C] = entry(Opcode::Jl, Pattern::Jz);
    t[0x8D] = entry(Opcode::Jge, Pattern::Jz);
    t[0x8E] = entry(Opcode::Jle, Pattern::Jz);
    t[0x8F] = entry(Opcode::Jg, Pattern::Jz);

    // Byte set-on-condition.
    t[0x90] = entry(Opcode::Seto, Pattern::Eb);
    t[0x91] = entry(Opcode::Setno, Pattern::Eb);
    t[0x92] = entry(Opcode::Setb, Pattern::Eb);
    t[0x93] = entry(Opcode::Setae, Pattern::Eb);
    t[0x94] = entry(Opcode::Sete, Pattern::Eb);
    t[0x95] = entry(Opcode::Setne, Pattern::Eb);
    t[0x96] = entry(Opcode::Setbe, Pattern::Eb);
    t[0x97] = entry(Opcode::Seta, Pattern::Eb);
    t[0x98] = entry(Opcode::Sets, Pattern::Eb);
    t[0x99] = entry(Opcode::Setns, Pattern::Eb);
    t[0x9A] = entry(Opcode::Setp, Pattern::Eb);
    t[0x9B] = entry(Opcode::Setnp, Pattern::Eb);
    t[0x9C] = entry(Opcode::Setl, Pattern::Eb);
    t[0x9D] = entry(Opcode::Setge, Pattern::Eb);
    t[0x9E] = entry(Opcode::Setle, Pattern::Eb);
    t[0x9F] = entry(Opcode::Setg, Pattern::Eb);

    t[0xA0] = entry(Opcode::Push, Pattern::PushSeg(Segment::Fs));
    t[0xA1] = entry(Opcode::Pop, Pattern::PopSeg(Segment::Fs));
    t[0xA3] = entry(Opcode::Bt, Pattern::EvGv);
    t[0xA4] = entry(Opcode::Shld, Pattern::EvGvIb);
    t[0xA5] = entry(Opcode::Shld, Pattern::EvGvCl);
    t[0xA8] = entry(Opcode::Push, Pattern::PushSeg(Segment::Gs));
    t[0xA9] = entry(Opcode::Pop, Pattern::PopSeg(Segment::Gs));
    t[0xAB] = entry(Opcode::Bts, Pattern::EvGv);
    t[0xAC] = entry(Opcode::Shrd, Pattern::EvGvIb);
    t[0xAD] = entry(Opcode::Shrd, Pattern::EvGvCl);
    t[0xAF] = entry(Opcode::Imul, Pattern::GvEv);

    t[0xB2] = entry(Opcode::Lss, Pattern::GvMp);
    t[0xB3] = entry(Opcode::Btr, Pattern::EvGv);
    t[0xB4] = entry(Opcode::Lfs, Pattern::GvMp);
    t[0xB5] = entry(Opcode::Lgs, Pattern::GvMp);
    t[0xB6] = entry(Opcode::Movzx, Pattern::GvEb);
    t[0xB7] = entry(Opcode::Movzx, Pattern::GvEw);
    t[0xBA] = entry(Opcode::Invalid, Pattern::Group8);
    t[0xBB] = entry(Opcode::Btc, Pattern::EvGv);
    t[0xBC] = entry(Opcode::Bsf, Pattern::GvEv);
    t[0xBD] = entry(Opcode::Bsr, Pattern::GvEv);
    t[0xBE] = entry(Opcode::Movsx, Pattern::GvEb);
    t[0xBF] = entry(Opcode::Movsx, Pattern::GvEw);

    t
};

/// Group 6 (0F 00): descriptor-table ops keyed by the reg field.
pub static GROUP6_OPS: [Option<Opcode>; 8] = [
    Some(Opcode::Sldt),
    Some(Opcode::Sidt),
    Some(Opcode::Lgdt),
    Some(Opcode::Ltr),
    Some(Opcode::Verr),
    Some(Opcode::Verw),
    None,
    None,
];

/// Group 8 (0F BA): immediate bit tests; /0../3 are unallocated.
pub static GROUP8_OPS: [Option<Opcode>; 8] = [
    None,
    None,
    None,
    None,
    Some(Opcode::Bt),
    Some(Opcode::Bts),
    Some(Opcode::Btr),
    Some(Opcode::Btc),
];
