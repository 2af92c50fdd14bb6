//! One-byte opcode map and group tables.

use retro86_core::{Opcode, Segment};

/// Operand template executed by the decode session.
///
/// `E`/`G` pairings follow the Intel notation: `E` is the ModR/M r/m slot
/// (register or memory), `G` the reg-field GPR; `b`/`w`/`v` select byte,
/// word or operand-size width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// No operands.
    None,
    /// E_b, G_b.
    EbGb,
    /// E_v, G_v.
    EvGv,
    /// G_b, E_b.
    GbEb,
    /// G_v, E_v.
    GvEv,
    /// AL, imm8.
    AlIb,
    /// eAX, operand-size immediate.
    AccIv,
    /// Segment-register push.
    PushSeg(Segment),
    /// Segment-register pop.
    PopSeg(Segment),
    /// Operand-size register from the low three opcode bits.
    Reg,
    /// eAX, register from the low three opcode bits (XCHG row).
    AccReg,
    /// 8-bit register from the low opcode bits, imm8 (B0-B7).
    RegIb,
    /// Operand-size register from the low opcode bits, immediate (B8-BF).
    RegIv,
    /// BOUND G_v, M_a.
    GvMa,
    /// ARPL E_w, G_w.
    EwGw,
    /// Operand-size immediate (PUSH Iz).
    Iz,
    /// imm8 (PUSH Ib, INT n, AAM, AAD).
    Ib,
    /// IMUL G_v, E_v, Iz.
    GvEvIz,
    /// IMUL G_v, E_v, imm8.
    GvEvIb,
    /// 8-bit PC-relative target.
    Jb,
    /// Operand-size PC-relative target.
    Jz,
    /// E_b alone (SETcc).
    Eb,
    /// MOV E_w, S_w.
    EwSw,
    /// MOV S_w, E_w.
    SwEw,
    /// LEA G_v, M: effective address, no dereference.
    GvM,
    /// Far-pointer immediate (CALL/JMP ptr16:16/32).
    Ap,
    /// MOV AL, moffs8.
    AlOb,
    /// MOV eAX, moffs.
    AccOv,
    /// MOV moffs8, AL.
    ObAl,
    /// MOV moffs, eAX.
    OvAcc,
    /// MOV E_b, imm8.
    EbIb,
    /// MOV E_v, Iz.
    EvIz,
    /// imm16 (RET iw).
    Iw,
    /// imm16, imm8 (ENTER).
    IwIb,
    /// String operation; true = byte-sized form.
    Strings { byte: bool },
    /// XLAT.
    Xlat,
    /// IN acc, imm8; true = AL.
    InIb { byte: bool },
    /// OUT imm8, acc.
    OutIb { byte: bool },
    /// IN acc, DX.
    InDx { byte: bool },
    /// OUT DX, acc.
    OutDx { byte: bool },
    /// Group 1 immediate ALU; the form fixes widths.
    Group1(Group1Form),
    /// Group 1A: POP E_v (0x8F).
    Group1A,
    /// Group 2 shifts/rotates.
    Group2(Group2Form),
    /// Group 3 unary ops; true = byte form (0xF6).
    Group3 { byte: bool },
    /// Group 4: INC/DEC E_b (0xFE).
    Group4,
    /// Group 5: INC/DEC/CALL/JMP/PUSH E_v (0xFF).
    Group5,
    /// x87 escape (opcode bytes D8-DF).
    Esc,
    /// Two-byte escape (0x0F).
    Escape,
    /// G_v, E_w (LAR/LSL, MOVZX/MOVSX word forms).
    GvEw,
    /// G_v, E_b (MOVZX/MOVSX byte forms).
    GvEb,
    /// MOV r32, CRx.
    RegCr,
    /// MOV CRx, r32.
    CrReg,
    /// MOV r32, DRx.
    RegDr,
    /// MOV DRx, r32.
    DrReg,
    /// SHLD/SHRD E_v, G_v, imm8.
    EvGvIb,
    /// SHLD/SHRD E_v, G_v, CL.
    EvGvCl,
    /// Far load G_v, M_p (LES/LDS/LSS/LFS/LGS).
    GvMp,
    /// Group 6 (0F 00).
    Group6,
    /// Group 7 (0F 01).
    Group7,
    /// Group 8 (0F BA): bit ops E_v, imm8.
    Group8,
}

/// Operand widths of the three Group-1 encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group1Form {
    /// 0x80/0x82: E_b, imm8.
    EbIb,
    /// 0x81: E_v, Iz.
    EvIz,
    /// 0x83: E_v, sign-extended imm8.
    EvIb,
}

/// Operand and count forms of the Group-2 encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group2Form {
    /// 0xC0: E_b, imm8.
    EbIb,
    /// 0xC1: E_v, imm8.
    EvIb,
    /// 0xD0: E_b, 1.
    EbOne,
    /// 0xD1: E_v, 1.
    EvOne,
    /// 0xD2: E_b, CL.
    EbCl,
    /// 0xD3: E_v, CL.
    EvCl,
}

/// Opcode table entry.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeEntry {
    /// Mnemonic, or `Invalid` when a sub-table supplies it.
    pub opcode: Opcode,
    /// Operand template.
    pub pattern: Pattern,
    /// Marks the near variant of CALL/JMP/RET rows.
    pub near: bool,
}

impl OpcodeEntry {
    pub const fn new(opcode: Opcode, pattern: Pattern) -> Self {
        Self {
            opcode,
            pattern,
            near: false,
        }
    }

    pub const fn near(mut self) -> Self {
        self.near = true;
        self
    }
}

/// Const None for array initialization (stable Rust compatibility).
const NONE_ENTRY: Option<OpcodeEntry> = None;

const fn entry(opcode: Opcode, pattern: Pattern) -> Option<OpcodeEntry> {
    Some(OpcodeEntry::new(opcode, pattern))
}

/// One-byte opcode map.
///
/// Prefix bytes (26/2E/36/3E/64/65/66/67/F0/F2/F3) are consumed by the
/// prefix collector before dispatch and deliberately left unallocated
/// here, together with the genuinely invalid cells (0xD6, 0xF1).
pub static OPCODE_TABLE: [Option<OpcodeEntry>; 256] = {
    let mut t: [Option<OpcodeEntry>; 256] = [NONE_ENTRY; 256];

    // The regular ALU block: six encodings per mnemonic, plus the
    // embedded segment push/pop cells.
    t[0x00] = entry(Opcode::Add, Pattern::EbGb);
    t[0x01] = entry(Opcode::Add, Pattern::EvGv);
    t[0x02] = entry(Opcode::Add, Pattern::GbEb);
    t[0x03] = entry(Opcode::Add, Pattern::GvEv);
    t[0x04] = entry(Opcode::Add, Pattern::AlIb);
    t[0x05] = entry(Opcode::Add, Pattern::AccIv);
    t[0x06] = entry(Opcode::Push, Pattern::PushSeg(Segment::Es));
    t[0x07] = entry(Opcode::Pop, Pattern::PopSeg(Segment::Es));
    t[0x08] = entry(Opcode::Or, Pattern::EbGb);
    t[0x09] = entry(Opcode::Or, Pattern::EvGv);
    t[0x0A] = entry(Opcode::Or, Pattern::GbEb);
    t[0x0B] = entry(Opcode::Or, Pattern::GvEv);
    t[0x0C] = entry(Opcode::Or, Pattern::AlIb);
    t[0x0D] = entry(Opcode::Or, Pattern::AccIv);
    t[0x0E] = entry(Opcode::Push, Pattern::PushSeg(Segment::Cs));
    t[0x0F] = entry(Opcode::Invalid, Pattern::Escape);
    t[0x10] = entry(Opcode::Adc, Pattern::EbGb);
    t[0x11] = entry(Opcode::Adc, Pattern::EvGv);
    t[0x12] = entry(Opcode::Adc, Pattern::GbEb);
    t[0x13] = entry(Opcode::Adc, Pattern::GvEv);
    t[0x14] = entry(Opcode::Adc, Pattern::AlIb);
    t[0x15] = entry(Opcode::Adc, Pattern::AccIv);
    t[0x16] = entry(Opcode::Push, Pattern::PushSeg(Segment::Ss));
    t[0x17] = entry(Opcode::Pop, Pattern::PopSeg(Segment::Ss));
    t[0x18] = entry(Opcode::Sbb, Pattern::EbGb);
    t[0x19] = entry(Opcode::Sbb, Pattern::EvGv);
    t[0x1A] = entry(Opcode::Sbb, Pattern::GbEb);
    t[0x1B] = entry(Opcode::Sbb, Pattern::GvEv);
    t[0x1C] = entry(Opcode::Sbb, Pattern::AlIb);
    t[0x1D] = entry(Opcode::Sbb, Pattern::AccIv);
    t[0x1E] = entry(Opcode::Push, Pattern::PushSeg(Segment::Ds));
    t[0x1F] = entry(Opcode::Pop, Pattern::PopSeg(Segment::Ds));
    t[0x20] = entry(Opcode::And, Pattern::EbGb);
    t[0x21] = entry(Opcode::And, Pattern::EvGv);
    t[0x22] = entry(Opcode::And, Pattern::GbEb);
    t[0x23] = entry(Opcode::And, Pattern::GvEv);
    t[0x24] = entry(Opcode::And, Pattern::AlIb);
    t[0x25] = entry(Opcode::And, Pattern::AccIv);
    t[0x27] = entry(Opcode::Daa, Pattern::None);
    t[0x28] = entry(Opcode::Sub, Pattern::EbGb);
    t[0x29] = entry(Opcode::Sub, Pattern::EvGv);
    t[0x2A] = entry(Opcode::Sub, Pattern::GbEb);
    t[0x2B] = entry(Opcode::Sub, Pattern::GvEv);
    t[0x2C] = entry(Opcode::Sub, Pattern::AlIb);
    t[0x2D] = entry(Opcode::Sub, Pattern::AccIv);
    t[0x2F] = entry(Opcode::Das, Pattern::None);
    t[0x30] = entry(Opcode::Xor, Pattern::EbGb);
    t[0x31] = entry(Opcode::Xor, Pattern::EvGv);
    t[0x32] = entry(Opcode::Xor, Pattern::GbEb);
    t[0x33] = entry(Opcode::Xor, Pattern::GvEv);
    t[0x34] = entry(Opcode::Xor, Pattern::AlIb);
    t[0x35] = entry(Opcode::Xor, Pattern::AccIv);
    t[0x37] = entry(Opcode::Aaa, Pattern::None);
    t[0x38] = entry(Opcode::Cmp, Pattern::EbGb);
    t[0x39] = entry(Opcode::Cmp, Pattern::EvGv);
    t[0x3A] = entry(Opcode::Cmp, Pattern::GbEb);
    t[0x3B] = entry(Opcode::Cmp, Pattern::GvEv);
    t[0x3C] = entry(Opcode::Cmp, Pattern::AlIb);
    t[0x3D] = entry(Opcode::Cmp, Pattern::AccIv);
    t[0x3F] = entry(Opcode::Aas, Pattern::None);

    // INC/DEC/PUSH/POP reg rows.
    let mut i = 0;
    while i < 8 {
        t[0x40 + i] = entry(Opcode::Inc, Pattern::Reg);
        t[0x48 + i] = entry(Opcode::Dec, Pattern::Reg);
        t[0x50 + i] = entry(Opcode::Push, Pattern::Reg);
        t[0x58 + i] = entry(Opcode::Pop, Pattern::Reg);
        i += 1;
    }

    t[0x60] = entry(Opcode::Pusha, Pattern::None);
    t[0x61] = entry(Opcode::Popa, Pattern::None);
    t[0x62] = entry(Opcode::Bound, Pattern::GvMa);
    t[0x63] = entry(Opcode::Arpl, Pattern::EwGw);
    t[0x68] = entry(Opcode::Push, Pattern::Iz);
    t[0x69] = entry(Opcode::Imul, Pattern::GvEvIz);
    t[0x6A] = entry(Opcode::Push, Pattern::Ib);
    t[0x6B] = entry(Opcode::Imul, Pattern::GvEvIb);
    t[0x6C] = entry(Opcode::Ins, Pattern::Strings { byte: true });
    t[0x6D] = entry(Opcode::Ins, Pattern::Strings { byte: false });
    t[0x6E] = entry(Opcode::Outs, Pattern::Strings { byte: true });
    t[0x6F] = entry(Opcode::Outs, Pattern::Strings { byte: false });

    // Short conditional jumps.
    t[0x70] = entry(Opcode::Jo, Pattern::Jb);
    t[0x71] = entry(Opcode::Jno, Pattern::Jb);
    t[0x72] = entry(Opcode::Jb, Pattern::Jb);
    t[0x73] = entry(Opcode::Jae, Pattern::Jb);
    t[0x74] = entry(Opcode::Je, Pattern::Jb);
    t[0x75] = entry(Opcode::Jne, Pattern::Jb);
    t[0x76] = entry(Opcode::Jbe, Pattern::Jb);
    t[0x77] = entry(Opcode::Ja, Pattern::Jb);
    t[0x78] = entry(Opcode::Js, Pattern::Jb);
    t[0x79] = entry(Opcode::Jns, Pattern::Jb);
    t[0x7A] = entry(Opcode::Jp, Pattern::Jb);
    t[0x7B] = entry(Opcode::Jnp, Pattern::Jb);
    t[0x7C] = entry(Opcode::Jl, Pattern::Jb);
    t[0x7D] = entry(Opcode::Jge, Pattern::Jb);
    t[0x7E] = entry(Opcode::Jle, Pattern::Jb);
    t[0x7F] = entry(Opcode::Jg, Pattern::Jb);

    t[0x80] = entry(Opcode::Invalid, Pattern::Group1(Group1Form::EbIb));
    t[0x81] = entry(Opcode::Invalid, Pattern::Group1(Group1Form::EvIz));
    // 0x82 is the documented-as-undefined alias of 0x80.
    t[0x82] = entry(Opcode::Invalid, Pattern::Group1(Group1Form::EbIb));
    t[0x83] = entry(Opcode::Invalid, Pattern::Group1(Group1Form::EvIb));
    t[0x84] = entry(Opcode::Test, Pattern::EbGb);
    t[0x85] = entry(Opcode::Test, Pattern::EvGv);
    t[0x86] = entry(Opcode::Xchg, Pattern::EbGb);
    t[0x87] = entry(Opcode::Xchg, Pattern::EvGv);
    t[0x88] = entry(Opcode::Mov, Pattern::EbGb);
    t[0x89] = entry(Opcode::Mov, Pattern::EvGv);
    t[0x8A] = entry(Opcode::Mov, Pattern::GbEb);
    t[0x8B] = entry(Opcode::Mov, Pattern::GvEv);
    t[0x8C] = entry(Opcode::Mov, Pattern::EwSw);
    t[0x8D] = entry(Opcode::Lea, Pattern::GvM);
    t[0x8E] = entry(Opcode::Mov, Pattern::SwEw);
    t[0x8F] = entry(Opcode::Pop, Pattern::Group1A);

    t[0x90] = entry(Opcode::Nop, Pattern::None);
    let mut i = 1;
    while i < 8 {
        t[0x90 + i] = entry(Opcode::Xchg, Pattern::AccReg);
        i += 1;
    }
    t[0x98] = entry(Opcode::Cbw, Pattern::None);
    t[0x99] = entry(Opcode::Cwd, Pattern::None);
    t[0x9A] = entry(Opcode::Call, Pattern::Ap);
    t[0x9B] = entry(Opcode::Wait, Pattern::None);
    t[0x9C] = entry(Opcode::Pushf, Pattern::None);
    t[0x9D] = entry(Opcode::Popf, Pattern::None);
    t[0x9E] = entry(Opcode::Sahf, Pattern::None);
    t[0x9F] = entry(Opcode::Lahf, Pattern::None);

    t[0xA0] = entry(Opcode::Mov, Pattern::AlOb);
    t[0xA1] = entry(Opcode::Mov, Pattern::AccOv);
    t[0xA2] = entry(Opcode::Mov, Pattern::ObAl);
    t[0xA3] = entry(Opcode::Mov, Pattern::OvAcc);
    t[0xA4] = entry(Opcode::Movs, Pattern::Strings { byte: true });
    t[0xA5] = entry(Opcode::Movs, Pattern::Strings { byte: false });
    t[0xA6] = entry(Opcode::Cmps, Pattern::Strings { byte: true });
    t[0xA7] = entry(Opcode::Cmps, Pattern::Strings { byte: false });
    t[0xA8] = entry(Opcode::Test, Pattern::AlIb);
    t[0xA9] = entry(Opcode::Test, Pattern::AccIv);
    t[0xAA] = entry(Opcode::Stos, Pattern::Strings { byte: true });
    t[0xAB] = entry(Opcode::Stos, Pattern::Strings { byte: false });
    t[0xAC] = entry(Opcode::Lods, Pattern::Strings { byte: true });
    t[0xAD] = entry(Opcode::Lods, Pattern::Strings { byte: false });
    t[0xAE] = entry(Opcode::Scas, Pattern::Strings { byte: true });
    t[0xAF] = entry(Opcode::Scas, Pattern::Strings { byte: false });

    let mut i = 0;
    while i < 8 {
        t[0xB0 + i] = entry(Opcode::Mov, Pattern::RegIb);
        t[0xB8 + i] = entry(Opcode::Mov, Pattern::RegIv);
        i += 1;
    }

    t[0xC0] = entry(Opcode::Invalid, Pattern::Group2(Group2Form::EbIb));
    t[0xC1] = entry(Opcode::Invalid, Pattern::Group2(Group2Form::EvIb));
    t[0xC2] = Some(OpcodeEntry::new(Opcode::Ret, Pattern::Iw).near());
    t[0xC3] = Some(OpcodeEntry::new(Opcode::Ret, Pattern::None).near());
    t[0xC4] = entry(Opcode::Les, Pattern::GvMp);
    t[0xC5] = entry(Opcode::Lds, Pattern::GvMp);
    t[0xC6] = entry(Opcode::Mov, Pattern::EbIb);
    t[0xC7] = entry(Opcode::Mov, Pattern::EvIz);
    t[0xC8] = entry(Opcode::Enter, Pattern::IwIb);
    t[0xC9] = entry(Opcode::Leave, Pattern::None);
    t[0xCA] = entry(Opcode::Ret, Pattern::Iw);
    t[0xCB] = entry(Opcode::Ret, Pattern::None);
    t[0xCC] = entry(Opcode::Int3, Pattern::None);
    t[0xCD] = entry(Opcode::Int, Pattern::Ib);
    t[0xCE] = entry(Opcode::Into, Pattern::None);
    t[0xCF] = entry(Opcode::Iret, Pattern::None);

    t[0xD0] = entry(Opcode::Invalid, Pattern::Group2(Group2Form::EbOne));
    t[0xD1] = entry(Opcode::Invalid, Pattern::Group2(Group2Form::EvOne));
    t[0xD2] = entry(Opcode::Invalid, Pattern::Group2(Group2Form::EbCl));
    t[0xD3] = entry(Opcode::Invalid, Pattern::Group2(Group2Form::EvCl));
    t[0xD4] = entry(Opcode::Aam, Pattern::Ib);
    t[0xD5] = entry(Opcode::Aad, Pattern::Ib);
    t[0xD7] = entry(Opcode::Xlat, Pattern::Xlat);
    let mut i = 0;
    while i < 8 {
        t[0xD8 + i] = entry(Opcode::Invalid, Pattern::Esc);
        i += 1;
    }

    t[0xE0] = entry(Opcode::Loopne, Pattern::Jb);
    t[0xE1] = entry(Opcode::Loope, Pattern::Jb);
    t[0xE2] = entry(Opcode::Loop, Pattern::Jb);
    t[0xE3] = entry(Opcode::Jcxz, Pattern::Jb);
    t[0xE4] = entry(Opcode::In, Pattern::InIb { byte: true });
    t[0xE5] = entry(Opcode::In, Pattern::InIb { byte: false });
    t[0xE6] = entry(Opcode::Out, Pattern::OutIb { byte: true });
    t[0xE7] = entry(Opcode::Out, Pattern::OutIb { byte: false });
    t[0xE8] = Some(OpcodeEntry::new(Opcode::Call, Pattern::Jz).near());
    t[0xE9] = Some(OpcodeEntry::new(Opcode::Jmp, Pattern::Jz).near());
    t[0xEA] = entry(Opcode::Jmp, Pattern::Ap);
    t[0xEB] = Some(OpcodeEntry::new(Opcode::Jmp, Pattern::Jb).near());
    t[0xEC] = entry(Opcode::In, Pattern::InDx { byte: true });
    t[0xED] = entry(Opcode::In, Pattern::InDx { byte: false });
    t[0xEE] = entry(Opcode::Out, Pattern::OutDx { byte: true });
    t[0xEF] = entry(Opcode::Out, Pattern::OutDx { byte: false });

    t[0xF4] = entry(Opcode::Hlt, Pattern::None);
    t[0xF5] = entry(Opcode::Cmc, Pattern::None);
    t[0xF6] = entry(Opcode::Invalid, Pattern::Group3 { byte: true });
    t[0xF7] = entry(Opcode::Invalid, Pattern::Group3 { byte: false });
    t[0xF8] = entry(Opcode::Clc, Pattern::None);
    t[0xF9] = entry(Opcode::Stc, Pattern::None);
    t[0xFA] = entry(Opcode::Cli, Pattern::None);
    t[0xFB] = entry(Opcode::Sti, Pattern::None);
    t[0xFC] = entry(Opcode::Cld, Pattern::None);
    t[0xFD] = entry(Opcode::Std, Pattern::None);
    t[0xFE] = entry(Opcode::Invalid, Pattern::Group4);
    t[0xFF] = entry(Opcode::Invalid, Pattern::Group5);

    t
};

/// Group 1 (0x80-0x83): immediate ALU, keyed by the ModR/M reg field.
pub static GROUP1_OPS: [Opcode; 8] = [
    Opcode::Add,
    Opcode::Or,
    Opcode::Adc,
    Opcode::Sbb,
    Opcode::And,
    Opcode::Sub,
    Opcode::Xor,
    Opcode::Cmp,
];

/// Group 2 (0xC0/0xC1, 0xD0-0xD3): shifts and rotates; /6 is unallocated.
pub static GROUP2_OPS: [Option<Opcode>; 8] = [
    Some(Opcode::Rol),
    Some(Opcode::Ror),
    Some(Opcode::Rcl),
    Some(Opcode::Rcr),
    Some(Opcode::Shl),
    Some(Opcode::Shr),
    None,
    Some(Opcode::Sar),
];

/// Group 3 (0xF6/0xF7): unary ops; /1 is unallocated.
pub static GROUP3_OPS: [Option<Opcode>; 8] = [
    Some(Opcode::Test),
    None,
    Some(Opcode::Not),
    Some(Opcode::Neg),
    Some(Opcode::Mul),
    Some(Opcode::Imul),
    Some(Opcode::Div),
    Some(Opcode::Idiv),
];

/// Group 4 (0xFE): INC/DEC E_b only.
pub static GROUP4_OPS: [Option<Opcode>; 8] = [
    Some(Opcode::Inc),
    Some(Opcode::Dec),
    None,
    None,
    None,
    None,
    None,
    None,
];
