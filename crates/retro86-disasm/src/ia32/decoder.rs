//! IA-32 instruction decoder.

use retro86_core::{Bitness, Instruction, Opcode, Operand, Register, Repeat, Segment, Width};

use super::context::DecodeContext;
use super::modrm::{ModRM, RmAccess, Sib};
use super::opcodes::{
    Group1Form, Group2Form, Pattern, GROUP1_OPS, GROUP2_OPS, GROUP3_OPS, GROUP4_OPS, OPCODE_TABLE,
};
use super::opcodes_0f::{GROUP6_OPS, GROUP8_OPS, OPCODE_TABLE_0F};
use super::x87::{self, EscMem, EscReg};
use crate::error::{DecodeError, PrefixCategory};
use crate::source::{ByteSource, SliceReader};

/// IA-32 (16/32-bit) instruction decoder.
///
/// Construction fixes the processor default for both operand and address
/// size. A decoder is cheap to create and reusable across calls; each
/// `disassemble` owns a fresh decode context.
#[derive(Debug, Clone, Copy)]
pub struct Ia32Disassembler {
    default_size: Bitness,
}

impl Ia32Disassembler {
    /// Creates a decoder for the given processor default size.
    pub fn new(default_size: Bitness) -> Self {
        Self { default_size }
    }

    /// Decodes a single instruction from `source`.
    ///
    /// The stream advances exactly as far as the instruction requires on
    /// success; after an error the position is unspecified.
    pub fn disassemble<S: ByteSource>(&self, source: &mut S) -> Result<Instruction, DecodeError> {
        let ctx = DecodeContext::new(self.default_size, source.address());
        Decode { source, ctx }.run()
    }

    /// Decodes a single instruction from a byte slice mapped at `address`.
    /// Returns the instruction and the number of bytes consumed.
    pub fn decode_slice(
        &self,
        bytes: &[u8],
        address: u64,
    ) -> Result<(Instruction, usize), DecodeError> {
        let mut reader = SliceReader::new(bytes, address);
        let instruction = self.disassemble(&mut reader)?;
        Ok((instruction, reader.offset()))
    }

    /// Decodes a buffer front to back, one result per instruction.
    /// A decode error consumes a single byte before continuing.
    pub fn disassemble_all(
        &self,
        bytes: &[u8],
        address: u64,
    ) -> Vec<Result<Instruction, DecodeError>> {
        let mut results = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            match self.decode_slice(&bytes[offset..], address + offset as u64) {
                Ok((instruction, size)) => {
                    offset += size.max(1);
                    results.push(Ok(instruction));
                }
                Err(e) => {
                    offset += 1;
                    results.push(Err(e));
                }
            }
        }
        results
    }
}

/// One decode session: the byte source plus the per-instruction context.
struct Decode<'a, S: ByteSource> {
    source: &'a mut S,
    ctx: DecodeContext,
}

impl<S: ByteSource> Decode<'_, S> {
    fn run(mut self) -> Result<Instruction, DecodeError> {
        let opcode_byte = self.collect_prefixes()?;
        self.dispatch(opcode_byte)?;
        self.ctx.finish()
    }

    // ------------------------------------------------------------------
    // byte readers
    // ------------------------------------------------------------------

    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        self.source.next_byte().ok_or(DecodeError::Truncated {
            address: self.ctx.start_address,
        })
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let lo = self.read_byte()?;
        let hi = self.read_byte()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let b0 = self.read_byte()?;
        let b1 = self.read_byte()?;
        let b2 = self.read_byte()?;
        let b3 = self.read_byte()?;
        Ok(u32::from_le_bytes([b0, b1, b2, b3]))
    }

    /// Operand-size immediate.
    fn read_iv(&mut self) -> Result<Operand, DecodeError> {
        match self.ctx.operand_size {
            Bitness::Bits16 => {
                let value = self.read_u16()?;
                Ok(Operand::imm(value as i64, Width::Word))
            }
            Bitness::Bits32 => {
                let value = self.read_u32()?;
                Ok(Operand::imm(value as i64, Width::Dword))
            }
        }
    }

    // ------------------------------------------------------------------
    // prefix collector
    // ------------------------------------------------------------------

    /// Reads legacy prefixes until a non-prefix byte arrives and returns
    /// that byte. Each prefix category may appear at most once.
    fn collect_prefixes(&mut self) -> Result<u8, DecodeError> {
        loop {
            let byte = self.read_byte()?;
            match byte {
                0x66 => {
                    if self.ctx.operand_size_overridden {
                        return Err(self.duplicate(PrefixCategory::OperandSize));
                    }
                    self.ctx.operand_size_overridden = true;
                    self.ctx.operand_size = self.ctx.operand_size.toggled();
                }
                0x67 => {
                    if self.ctx.address_size_overridden {
                        return Err(self.duplicate(PrefixCategory::AddressSize));
                    }
                    self.ctx.address_size_overridden = true;
                    self.ctx.address_size = self.ctx.address_size.toggled();
                }
                0x26 | 0x2E | 0x36 | 0x3E | 0x64 | 0x65 => {
                    if self.ctx.segment_override.is_some() {
                        return Err(self.duplicate(PrefixCategory::SegmentOverride));
                    }
                    self.ctx.segment_override = Some(match byte {
                        0x26 => Segment::Es,
                        0x2E => Segment::Cs,
                        0x36 => Segment::Ss,
                        0x3E => Segment::Ds,
                        0x64 => Segment::Fs,
                        _ => Segment::Gs,
                    });
                }
                0xF0 => {
                    if self.ctx.locked {
                        return Err(self.duplicate(PrefixCategory::Lock));
                    }
                    self.ctx.locked = true;
                }
                0xF2 => {
                    if self.ctx.repeat != Repeat::None {
                        return Err(self.duplicate(PrefixCategory::Repeat));
                    }
                    self.ctx.repeat = Repeat::NotEqual;
                }
                0xF3 => {
                    if self.ctx.repeat != Repeat::None {
                        return Err(self.duplicate(PrefixCategory::Repeat));
                    }
                    self.ctx.repeat = Repeat::Equal;
                }
                _ => return Ok(byte),
            }
        }
    }

    fn duplicate(&self, category: PrefixCategory) -> DecodeError {
        DecodeError::DuplicatePrefix {
            address: self.ctx.start_address,
            category,
        }
    }

    fn invalid_opcode(&self, byte: u8) -> DecodeError {
        DecodeError::InvalidOpcode {
            address: self.ctx.start_address,
            byte,
        }
    }

    // ------------------------------------------------------------------
    // dispatch
    // ------------------------------------------------------------------

    fn dispatch(&mut self, byte: u8) -> Result<(), DecodeError> {
        let entry = OPCODE_TABLE[byte as usize].ok_or_else(|| self.invalid_opcode(byte))?;
        self.ctx.opcode = entry.opcode;
        self.ctx.near = entry.near;
        self.exec(entry.pattern, byte)
    }

    fn dispatch_escape(&mut self) -> Result<(), DecodeError> {
        let byte = self.read_byte()?;
        let entry = OPCODE_TABLE_0F[byte as usize].ok_or_else(|| self.invalid_opcode(byte))?;
        self.ctx.opcode = entry.opcode;
        self.ctx.near = entry.near;
        self.exec(entry.pattern, byte)
    }

    /// Executes one operand template. `byte` is the opcode byte that
    /// selected the entry (the low bits and the x87 escapes key on it).
    fn exec(&mut self, pattern: Pattern, byte: u8) -> Result<(), DecodeError> {
        let v = self.ctx.operand_size.width();
        match pattern {
            Pattern::None => {}

            Pattern::EbGb => {
                let rm = self.rm_operand(Width::Byte, RmAccess::Any)?;
                let reg = self.reg_gpr(Width::Byte)?;
                self.ctx.push(rm).push(reg);
            }
            Pattern::EvGv => {
                let rm = self.rm_operand(v, RmAccess::Any)?;
                let reg = self.reg_gpr(v)?;
                self.ctx.push(rm).push(reg);
            }
            Pattern::GbEb => {
                let reg = self.reg_gpr(Width::Byte)?;
                let rm = self.rm_operand(Width::Byte, RmAccess::Any)?;
                self.ctx.push(reg).push(rm);
            }
            Pattern::GvEv => {
                let reg = self.reg_gpr(v)?;
                let rm = self.rm_operand(v, RmAccess::Any)?;
                self.ctx.push(reg).push(rm);
            }
            Pattern::AlIb => {
                let imm = self.read_byte()?;
                self.ctx
                    .push(Operand::reg(Register::Al))
                    .push(Operand::imm(imm as i64, Width::Byte));
            }
            Pattern::AccIv => {
                let acc = self.acc();
                let imm = self.read_iv()?;
                self.ctx.push(acc).push(imm);
            }

            Pattern::PushSeg(segment) | Pattern::PopSeg(segment) => {
                self.ctx.push(Operand::Segment(segment));
            }

            Pattern::Reg => {
                let reg = self.gpr(byte & 7, v)?;
                self.ctx.push(reg);
            }
            Pattern::AccReg => {
                let acc = self.acc();
                let reg = self.gpr(byte & 7, v)?;
                self.ctx.push(acc).push(reg);
            }
            Pattern::RegIb => {
                let reg = self.gpr(byte & 7, Width::Byte)?;
                let imm = self.read_byte()?;
                self.ctx.push(reg).push(Operand::imm(imm as i64, Width::Byte));
            }
            Pattern::RegIv => {
                let reg = self.gpr(byte & 7, v)?;
                let imm = self.read_iv()?;
                self.ctx.push(reg).push(imm);
            }

            Pattern::GvMa => {
                let reg = self.reg_gpr(v)?;
                let rm = self.rm_operand(v, RmAccess::MemoryOnly)?;
                self.ctx.push(reg).push(rm);
            }
            Pattern::EwGw => {
                let rm = self.rm_operand(Width::Word, RmAccess::Any)?;
                let reg = self.reg_gpr(Width::Word)?;
                self.ctx.push(rm).push(reg);
            }

            Pattern::Iz => {
                let imm = self.read_iv()?;
                self.ctx.push(imm);
            }
            Pattern::Ib => {
                let imm = self.read_byte()?;
                self.ctx.push(Operand::imm(imm as i64, Width::Byte));
            }
            Pattern::GvEvIz => {
                let reg = self.reg_gpr(v)?;
                let rm = self.rm_operand(v, RmAccess::Any)?;
                let imm = self.read_iv()?;
                self.ctx.push(reg).push(rm).push(imm);
            }
            Pattern::GvEvIb => {
                let reg = self.reg_gpr(v)?;
                let rm = self.rm_operand(v, RmAccess::Any)?;
                let imm = self.read_byte()? as i8 as i64;
                self.ctx.push(reg).push(rm).push(Operand::imm(imm, Width::Byte));
            }

            Pattern::Jb => {
                let disp = self.read_byte()? as i8 as i64;
                let target = self.branch_target(disp);
                self.ctx.push(target);
            }
            Pattern::Jz => {
                let disp = match self.ctx.operand_size {
                    Bitness::Bits16 => self.read_u16()? as i16 as i64,
                    Bitness::Bits32 => self.read_u32()? as i32 as i64,
                };
                let target = self.branch_target(disp);
                self.ctx.push(target);
            }

            Pattern::Eb => {
                let rm = self.rm_operand(Width::Byte, RmAccess::Any)?;
                self.ctx.push(rm);
            }

            Pattern::EwSw => {
                let rm = self.rm_operand(Width::Word, RmAccess::Any)?;
                let seg = self.reg_segment()?;
                self.ctx.push(rm).push(seg);
            }
            Pattern::SwEw => {
                let seg = self.reg_segment()?;
                let rm = self.rm_operand(Width::Word, RmAccess::Any)?;
                self.ctx.push(seg).push(rm);
            }

            Pattern::GvM | Pattern::GvMp => {
                let reg = self.reg_gpr(v)?;
                let address = self.rm_operand(v, RmAccess::Address)?;
                self.ctx.push(reg).push(address);
            }

            Pattern::Ap => {
                let (offset, width) = match self.ctx.operand_size {
                    Bitness::Bits16 => (self.read_u16()? as u32, Width::FarPointer16),
                    Bitness::Bits32 => (self.read_u32()?, Width::FarPointer32),
                };
                let segment = self.read_u16()?;
                self.ctx.push(Operand::FarPointer {
                    segment,
                    offset,
                    width,
                });
            }

            Pattern::AlOb => {
                let mem = self.moffs(Width::Byte)?;
                self.ctx.push(Operand::reg(Register::Al)).push(mem);
            }
            Pattern::AccOv => {
                let acc = self.acc();
                let mem = self.moffs(v)?;
                self.ctx.push(acc).push(mem);
            }
            Pattern::ObAl => {
                let mem = self.moffs(Width::Byte)?;
                self.ctx.push(mem).push(Operand::reg(Register::Al));
            }
            Pattern::OvAcc => {
                let acc = self.acc();
                let mem = self.moffs(v)?;
                self.ctx.push(mem).push(acc);
            }

            Pattern::EbIb => {
                let rm = self.rm_operand(Width::Byte, RmAccess::Any)?;
                let imm = self.read_byte()?;
                self.ctx.push(rm).push(Operand::imm(imm as i64, Width::Byte));
            }
            Pattern::EvIz => {
                let rm = self.rm_operand(v, RmAccess::Any)?;
                let imm = self.read_iv()?;
                self.ctx.push(rm).push(imm);
            }

            Pattern::Iw => {
                let imm = self.read_u16()?;
                self.ctx.push(Operand::imm(imm as i64, Width::Word));
            }
            Pattern::IwIb => {
                let first = self.read_u16()?;
                let second = self.read_byte()?;
                self.ctx
                    .push(Operand::imm(first as i64, Width::Word))
                    .push(Operand::imm(second as i64, Width::Byte));
            }

            Pattern::Strings { byte } => self.strings(byte)?,
            Pattern::Xlat => {}

            Pattern::InIb { byte } => {
                let acc = self.acc_for(byte);
                let port = self.read_byte()?;
                self.ctx.push(acc).push(Operand::imm(port as i64, Width::Byte));
            }
            Pattern::OutIb { byte } => {
                let acc = self.acc_for(byte);
                let port = self.read_byte()?;
                self.ctx.push(Operand::imm(port as i64, Width::Byte)).push(acc);
            }
            Pattern::InDx { byte } => {
                let acc = self.acc_for(byte);
                self.ctx.push(acc).push(Operand::reg(Register::Dx));
            }
            Pattern::OutDx { byte } => {
                let acc = self.acc_for(byte);
                self.ctx.push(Operand::reg(Register::Dx)).push(acc);
            }

            Pattern::Group1(form) => self.group1(form)?,
            Pattern::Group1A => self.group1a(byte)?,
            Pattern::Group2(form) => self.group2(form, byte)?,
            Pattern::Group3 { byte: is_byte } => self.group3(is_byte, byte)?,
            Pattern::Group4 => self.group4(byte)?,
            Pattern::Group5 => self.group5(byte)?,
            Pattern::Group6 => self.group6(byte)?,
            Pattern::Group7 => self.group7(byte)?,
            Pattern::Group8 => self.group8(byte)?,

            Pattern::Esc => self.esc(byte)?,
            Pattern::Escape => self.dispatch_escape()?,

            Pattern::GvEw => {
                let reg = self.reg_gpr(v)?;
                let rm = self.rm_operand(Width::Word, RmAccess::Any)?;
                self.ctx.push(reg).push(rm);
            }
            Pattern::GvEb => {
                let reg = self.reg_gpr(v)?;
                let rm = self.rm_operand(Width::Byte, RmAccess::Any)?;
                self.ctx.push(reg).push(rm);
            }

            Pattern::RegCr => {
                let rm = self.rm_operand(Width::Dword, RmAccess::RegisterOnly)?;
                let cr = self.reg_control()?;
                self.ctx.push(rm).push(cr);
            }
            Pattern::CrReg => {
                let cr = self.reg_control()?;
                let rm = self.rm_operand(Width::Dword, RmAccess::RegisterOnly)?;
                self.ctx.push(cr).push(rm);
            }
            Pattern::RegDr => {
                let rm = self.rm_operand(Width::Dword, RmAccess::RegisterOnly)?;
                let dr = self.reg_debug()?;
                self.ctx.push(rm).push(dr);
            }
            Pattern::DrReg => {
                let dr = self.reg_debug()?;
                let rm = self.rm_operand(Width::Dword, RmAccess::RegisterOnly)?;
                self.ctx.push(dr).push(rm);
            }

            Pattern::EvGvIb => {
                let rm = self.rm_operand(v, RmAccess::Any)?;
                let reg = self.reg_gpr(v)?;
                let imm = self.read_byte()?;
                self.ctx
                    .push(rm)
                    .push(reg)
                    .push(Operand::imm(imm as i64, Width::Byte));
            }
            Pattern::EvGvCl => {
                let rm = self.rm_operand(v, RmAccess::Any)?;
                let reg = self.reg_gpr(v)?;
                self.ctx.push(rm).push(reg).push(Operand::reg(Register::Cl));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // pattern helpers
    // ------------------------------------------------------------------

    /// eAX at the effective operand size.
    fn acc(&self) -> Operand {
        match self.ctx.operand_size {
            Bitness::Bits16 => Operand::reg(Register::Ax),
            Bitness::Bits32 => Operand::reg(Register::Eax),
        }
    }

    /// AL for byte forms, eAX otherwise.
    fn acc_for(&self, byte: bool) -> Operand {
        if byte {
            Operand::reg(Register::Al)
        } else {
            self.acc()
        }
    }

    /// PC-relative target: the displacement rebased to the address after
    /// the instruction.
    fn branch_target(&self, disp: i64) -> Operand {
        let target = (self.source.address() as i64).wrapping_add(disp);
        Operand::imm(target, self.ctx.operand_size.width())
    }

    /// MOV offset forms: an absolute address-size offset dereferenced at
    /// the given width.
    fn moffs(&mut self, width: Width) -> Result<Operand, DecodeError> {
        let offset = match self.ctx.address_size {
            Bitness::Bits16 => Operand::imm(self.read_u16()? as i64, Width::Word),
            Bitness::Bits32 => Operand::imm(self.read_u32()? as i64, Width::Dword),
        };
        Ok(Operand::indirect(offset, width, self.ctx.segment()))
    }

    /// Implicit SI/DI operands of the string instructions.
    fn strings(&mut self, byte: bool) -> Result<(), DecodeError> {
        let width = if byte {
            Width::Byte
        } else {
            self.ctx.operand_size.width()
        };
        let (si, di) = match self.ctx.address_size {
            Bitness::Bits16 => (Register::Si, Register::Di),
            Bitness::Bits32 => (Register::Esi, Register::Edi),
        };
        let source = Operand::indirect(Operand::reg(si), width, self.ctx.segment());
        let dest = Operand::indirect(Operand::reg(di), width, Segment::Es);
        match self.ctx.opcode {
            Opcode::Movs => {
                self.ctx.push(dest).push(source);
            }
            Opcode::Cmps => {
                self.ctx.push(source).push(dest);
            }
            Opcode::Stos | Opcode::Scas => {
                self.ctx.push(dest);
            }
            Opcode::Lods => {
                self.ctx.push(source);
            }
            Opcode::Ins => {
                self.ctx.push(dest).push(Operand::reg(Register::Dx));
            }
            Opcode::Outs => {
                self.ctx.push(Operand::reg(Register::Dx)).push(source);
            }
            _ => unreachable!("string template on non-string opcode"),
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // group dispatch
    // ------------------------------------------------------------------

    fn group1(&mut self, form: Group1Form) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        self.ctx.opcode = GROUP1_OPS[m.reg as usize];
        let (rm, imm) = match form {
            Group1Form::EbIb => {
                let rm = self.rm_operand(Width::Byte, RmAccess::Any)?;
                let imm = self.read_byte()? as i64;
                (rm, Operand::imm(imm, Width::Byte))
            }
            Group1Form::EvIz => {
                let rm = self.rm_operand(self.ctx.operand_size.width(), RmAccess::Any)?;
                let imm = self.read_iv()?;
                (rm, imm)
            }
            Group1Form::EvIb => {
                let rm = self.rm_operand(self.ctx.operand_size.width(), RmAccess::Any)?;
                let imm = self.read_byte()? as i8 as i64;
                (rm, Operand::imm(imm, Width::Byte))
            }
        };
        self.ctx.push(rm).push(imm);
        Ok(())
    }

    fn group1a(&mut self, byte: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        if m.reg != 0 {
            return Err(self.invalid_opcode(byte));
        }
        let rm = self.rm_operand(self.ctx.operand_size.width(), RmAccess::Any)?;
        self.ctx.push(rm);
        Ok(())
    }

    fn group2(&mut self, form: Group2Form, byte: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        self.ctx.opcode = GROUP2_OPS[m.reg as usize].ok_or_else(|| self.invalid_opcode(byte))?;
        let width = match form {
            Group2Form::EbIb | Group2Form::EbOne | Group2Form::EbCl => Width::Byte,
            _ => self.ctx.operand_size.width(),
        };
        let rm = self.rm_operand(width, RmAccess::Any)?;
        let count = match form {
            Group2Form::EbIb | Group2Form::EvIb => {
                let imm = self.read_byte()?;
                Operand::imm(imm as i64, Width::Byte)
            }
            Group2Form::EbOne | Group2Form::EvOne => Operand::imm(1, Width::Byte),
            Group2Form::EbCl | Group2Form::EvCl => Operand::reg(Register::Cl),
        };
        self.ctx.push(rm).push(count);
        Ok(())
    }

    fn group3(&mut self, is_byte: bool, byte: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        self.ctx.opcode = GROUP3_OPS[m.reg as usize].ok_or_else(|| self.invalid_opcode(byte))?;
        let width = if is_byte {
            Width::Byte
        } else {
            self.ctx.operand_size.width()
        };
        let rm = self.rm_operand(width, RmAccess::Any)?;
        self.ctx.push(rm);
        if self.ctx.opcode == Opcode::Test {
            let imm = if is_byte {
                let value = self.read_byte()?;
                Operand::imm(value as i64, Width::Byte)
            } else {
                self.read_iv()?
            };
            self.ctx.push(imm);
        }
        Ok(())
    }

    fn group4(&mut self, byte: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        self.ctx.opcode = GROUP4_OPS[m.reg as usize].ok_or_else(|| self.invalid_opcode(byte))?;
        let rm = self.rm_operand(Width::Byte, RmAccess::Any)?;
        self.ctx.push(rm);
        Ok(())
    }

    fn group5(&mut self, byte: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        let v = self.ctx.operand_size.width();
        let far = match self.ctx.operand_size {
            Bitness::Bits16 => Width::FarPointer16,
            Bitness::Bits32 => Width::FarPointer32,
        };
        let (opcode, near, rm) = match m.reg {
            0 => (Opcode::Inc, false, self.rm_operand(v, RmAccess::Any)?),
            1 => (Opcode::Dec, false, self.rm_operand(v, RmAccess::Any)?),
            2 => (Opcode::Call, true, self.rm_operand(v, RmAccess::Any)?),
            3 => (
                Opcode::Call,
                false,
                self.rm_operand(far, RmAccess::MemoryOnly)?,
            ),
            4 => (Opcode::Jmp, true, self.rm_operand(v, RmAccess::Any)?),
            5 => (
                Opcode::Jmp,
                false,
                self.rm_operand(far, RmAccess::MemoryOnly)?,
            ),
            6 => (Opcode::Push, false, self.rm_operand(v, RmAccess::Any)?),
            _ => return Err(self.invalid_opcode(byte)),
        };
        self.ctx.opcode = opcode;
        self.ctx.near = near;
        self.ctx.push(rm);
        Ok(())
    }

    fn group6(&mut self, byte: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        self.ctx.opcode = GROUP6_OPS[m.reg as usize].ok_or_else(|| self.invalid_opcode(byte))?;
        let rm = self.rm_operand(Width::Word, RmAccess::Any)?;
        self.ctx.push(rm);
        Ok(())
    }

    fn group7(&mut self, byte: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        let descriptor = match self.ctx.operand_size {
            Bitness::Bits16 => Width::PseudoDescriptor6,
            Bitness::Bits32 => Width::PseudoDescriptor10,
        };
        let (opcode, rm) = match m.reg {
            0 => (
                Opcode::Sgdt,
                self.rm_operand(descriptor, RmAccess::MemoryOnly)?,
            ),
            1 => (
                Opcode::Sidt,
                self.rm_operand(descriptor, RmAccess::MemoryOnly)?,
            ),
            2 => (
                Opcode::Lgdt,
                self.rm_operand(descriptor, RmAccess::MemoryOnly)?,
            ),
            3 => (
                Opcode::Lidt,
                self.rm_operand(descriptor, RmAccess::MemoryOnly)?,
            ),
            4 => (Opcode::Smsw, self.rm_operand(Width::Word, RmAccess::Any)?),
            6 => (Opcode::Lmsw, self.rm_operand(Width::Word, RmAccess::Any)?),
            _ => return Err(self.invalid_opcode(byte)),
        };
        self.ctx.opcode = opcode;
        self.ctx.push(rm);
        Ok(())
    }

    fn group8(&mut self, byte: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        self.ctx.opcode = GROUP8_OPS[m.reg as usize].ok_or_else(|| self.invalid_opcode(byte))?;
        let rm = self.rm_operand(self.ctx.operand_size.width(), RmAccess::Any)?;
        let imm = self.read_byte()?;
        self.ctx.push(rm).push(Operand::imm(imm as i64, Width::Byte));
        Ok(())
    }

    // ------------------------------------------------------------------
    // x87 escapes
    // ------------------------------------------------------------------

    fn esc(&mut self, escape: u8) -> Result<(), DecodeError> {
        let m = self.modrm()?;
        if m.is_register() {
            let entry =
                x87::decode_reg(escape, m.byte()).ok_or_else(|| self.invalid_opcode(escape))?;
            self.ctx.opcode = entry.opcode;
            match entry.form {
                EscReg::NoOperands => {}
                EscReg::Sti => {
                    self.ctx.push(Operand::FpuStack(m.rm));
                }
                EscReg::St0Sti => {
                    self.ctx.push(Operand::FpuStack(0)).push(Operand::FpuStack(m.rm));
                }
                EscReg::StiSt0 => {
                    self.ctx.push(Operand::FpuStack(m.rm)).push(Operand::FpuStack(0));
                }
                EscReg::Ax => {
                    self.ctx.push(Operand::reg(Register::Ax));
                }
            }
        } else {
            let entry =
                x87::decode_mem(escape, m.reg).ok_or_else(|| self.invalid_opcode(escape))?;
            self.ctx.opcode = entry.opcode;
            let width = self.esc_width(entry.width);
            let rm = self.rm_operand(width, RmAccess::Any)?;
            self.ctx.push(rm);
        }
        Ok(())
    }

    /// Memory width of an ESC form; the environment and state areas track
    /// the effective operand size.
    fn esc_width(&self, mem: EscMem) -> Width {
        match mem {
            EscMem::Single => Width::Single,
            EscMem::Double => Width::Double,
            EscMem::ExtendedReal => Width::ExtendedReal,
            EscMem::Int16 => Width::Word,
            EscMem::Int32 => Width::Dword,
            EscMem::Int64 => Width::Qword,
            EscMem::PackedBcd => Width::PackedBcd,
            EscMem::ControlWord => Width::BytePair,
            EscMem::Environment => match self.ctx.operand_size {
                Bitness::Bits16 => Width::FpuEnvironment14,
                Bitness::Bits32 => Width::FpuEnvironment28,
            },
            EscMem::State => match self.ctx.operand_size {
                Bitness::Bits16 => Width::FpuState94,
                Bitness::Bits32 => Width::FpuState108,
            },
        }
    }

    // ------------------------------------------------------------------
    // ModR/M + SIB
    // ------------------------------------------------------------------

    /// Reads the ModR/M byte on first demand; later calls reuse the cache.
    fn modrm(&mut self) -> Result<ModRM, DecodeError> {
        if let Some(m) = self.ctx.modrm {
            return Ok(m);
        }
        let m = ModRM::parse(self.read_byte()?);
        self.ctx.modrm = Some(m);
        Ok(m)
    }

    /// GPR operand for an encoded index, range-checked.
    fn gpr(&self, index: u8, width: Width) -> Result<Operand, DecodeError> {
        Register::gpr(index, width)
            .map(Operand::Register)
            .ok_or(DecodeError::InvalidRegister { index })
    }

    /// The reg field as a GPR.
    fn reg_gpr(&mut self, width: Width) -> Result<Operand, DecodeError> {
        let m = self.modrm()?;
        self.gpr(m.reg, width)
    }

    /// The reg field as a segment register.
    fn reg_segment(&mut self) -> Result<Operand, DecodeError> {
        let m = self.modrm()?;
        Segment::from_index(m.reg)
            .map(Operand::Segment)
            .ok_or(DecodeError::InvalidSegment { index: m.reg })
    }

    /// The reg field as a control register; CR4 and up are rejected.
    fn reg_control(&mut self) -> Result<Operand, DecodeError> {
        let m = self.modrm()?;
        Register::control(m.reg)
            .map(Operand::Register)
            .ok_or(DecodeError::InvalidControlRegister { index: m.reg })
    }

    /// The reg field as a debug register.
    fn reg_debug(&mut self) -> Result<Operand, DecodeError> {
        let m = self.modrm()?;
        Register::debug(m.reg)
            .map(Operand::Register)
            .ok_or(DecodeError::InvalidRegister { index: m.reg })
    }

    /// Materialises the r/m slot under the effective address size.
    fn rm_operand(&mut self, width: Width, access: RmAccess) -> Result<Operand, DecodeError> {
        let m = self.modrm()?;
        if m.is_register() {
            if matches!(access, RmAccess::MemoryOnly | RmAccess::Address) {
                return Err(DecodeError::ExpectedMemory {
                    address: self.ctx.start_address,
                });
            }
            return self.gpr(m.rm, width);
        }
        if access == RmAccess::RegisterOnly {
            return Err(DecodeError::ExpectedRegister {
                address: self.ctx.start_address,
            });
        }
        let address = match self.ctx.address_size {
            Bitness::Bits16 => self.address16(m)?,
            Bitness::Bits32 => self.address32(m)?,
        };
        if access == RmAccess::Address {
            return Ok(address);
        }
        Ok(Operand::indirect(address, width, self.ctx.segment()))
    }

    /// The eight classic 16-bit addressing forms.
    fn address16(&mut self, m: ModRM) -> Result<Operand, DecodeError> {
        if m.mod_ == 0 && m.rm == 6 {
            let disp = self.read_u16()?;
            return Ok(Operand::imm(disp as i64, Width::Word));
        }
        let base = match m.rm {
            0 => Operand::sum(Operand::reg(Register::Bx), Operand::reg(Register::Si)),
            1 => Operand::sum(Operand::reg(Register::Bx), Operand::reg(Register::Di)),
            2 => Operand::sum(Operand::reg(Register::Bp), Operand::reg(Register::Si)),
            3 => Operand::sum(Operand::reg(Register::Bp), Operand::reg(Register::Di)),
            4 => Operand::reg(Register::Si),
            5 => Operand::reg(Register::Di),
            6 => Operand::reg(Register::Bp),
            _ => Operand::reg(Register::Bx),
        };
        self.append_displacement(base, m.mod_)
    }

    /// 32-bit addressing: SIB under rm == 4, absolute under mod == 0 &&
    /// rm == 5, a single GPR otherwise.
    fn address32(&mut self, m: ModRM) -> Result<Operand, DecodeError> {
        if m.rm == 4 {
            return self.sib_address(m);
        }
        if m.mod_ == 0 && m.rm == 5 {
            let disp = self.read_u32()?;
            return Ok(Operand::imm(disp as i64, Width::Dword));
        }
        let base = self.gpr(m.rm, Width::Dword)?;
        self.append_displacement(base, m.mod_)
    }

    /// Appends the mod-selected displacement: sign-extended disp8 under
    /// mod == 1, an address-size displacement under mod == 2.
    fn append_displacement(&mut self, base: Operand, mod_: u8) -> Result<Operand, DecodeError> {
        match mod_ {
            1 => {
                let disp = self.read_byte()? as i8 as i64;
                Ok(Operand::sum(base, Operand::imm(disp, Width::Byte)))
            }
            2 => match self.ctx.address_size {
                Bitness::Bits16 => {
                    let disp = self.read_u16()? as i16 as i64;
                    Ok(Operand::sum(base, Operand::imm(disp, Width::Word)))
                }
                Bitness::Bits32 => {
                    let disp = self.read_u32()? as i32 as i64;
                    Ok(Operand::sum(base, Operand::imm(disp, Width::Dword)))
                }
            },
            _ => Ok(base),
        }
    }

    /// Scale-index-base decoding. Index 4 means no scaled index. Base 5
    /// under mod == 0 has no base register; the substituted displacement
    /// size is keyed on the scale field, and scale == 3 does not encode a
    /// valid form there.
    fn sib_address(&mut self, m: ModRM) -> Result<Operand, DecodeError> {
        let sib = Sib::parse(self.read_byte()?);
        let index = if sib.index == 4 {
            None
        } else {
            let reg = self.gpr(sib.index, Width::Dword)?;
            Some(Operand::scaled(reg, sib.scale_factor()))
        };

        if sib.base == 5 && m.mod_ == 0 {
            let disp = match sib.scale {
                0 | 1 => {
                    let value = self.read_u32()? as i32 as i64;
                    Operand::imm(value, Width::Dword)
                }
                2 => {
                    let value = self.read_byte()? as i8 as i64;
                    Operand::imm(value, Width::Byte)
                }
                _ => {
                    return Err(DecodeError::InvalidSib {
                        address: self.ctx.start_address,
                    })
                }
            };
            return Ok(match index {
                Some(scaled) => Operand::sum(scaled, disp),
                None => disp,
            });
        }

        let base = self.gpr(sib.base, Width::Dword)?;
        let expr = match index {
            Some(scaled) => Operand::sum(base, scaled),
            None => base,
        };
        self.append_displacement(expr, m.mod_)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrefixKind;

    fn decode32(bytes: &[u8]) -> Result<Instruction, DecodeError> {
        Ia32Disassembler::new(Bitness::Bits32)
            .decode_slice(bytes, 0x1000)
            .map(|(instruction, _)| instruction)
    }

    fn decode16(bytes: &[u8]) -> Result<Instruction, DecodeError> {
        Ia32Disassembler::new(Bitness::Bits16)
            .decode_slice(bytes, 0x1000)
            .map(|(instruction, _)| instruction)
    }

    #[test]
    fn nop() {
        let insn = decode32(&[0x90]).unwrap();
        assert_eq!(insn.opcode, Opcode::Nop);
        assert!(insn.operands.is_empty());
        assert!(!insn.near);
    }

    #[test]
    fn ret_is_near() {
        let insn = decode32(&[0xc3]).unwrap();
        assert_eq!(insn.opcode, Opcode::Ret);
        assert!(insn.near);
        assert!(insn.operands.is_empty());
    }

    #[test]
    fn far_ret_is_not_near() {
        let insn = decode32(&[0xcb]).unwrap();
        assert_eq!(insn.opcode, Opcode::Ret);
        assert!(!insn.near);

        let insn = decode32(&[0xca, 0x08, 0x00]).unwrap();
        assert_eq!(insn.opcode, Opcode::Ret);
        assert!(!insn.near);
        assert_eq!(insn.operands[0], Operand::imm(8, Width::Word));
    }

    #[test]
    fn hlt() {
        let insn = decode32(&[0xf4]).unwrap();
        assert_eq!(insn.opcode, Opcode::Hlt);
    }

    #[test]
    fn add_gv_ev_register_direct() {
        // add eax, ebx
        let insn = decode32(&[0x03, 0xc3]).unwrap();
        assert_eq!(insn.opcode, Opcode::Add);
        assert_eq!(insn.operands.len(), 2);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));
        assert_eq!(insn.operands[1], Operand::reg(Register::Ebx));
    }

    #[test]
    fn operand_size_override_selects_word_registers() {
        // add ax, bx
        let insn = decode32(&[0x66, 0x03, 0xc3]).unwrap();
        assert_eq!(insn.opcode, Opcode::Add);
        assert_eq!(insn.operands[0], Operand::reg(Register::Ax));
        assert_eq!(insn.operands[1], Operand::reg(Register::Bx));
    }

    #[test]
    fn lock_with_memory_destination() {
        // lock add [eax], eax
        let insn = decode32(&[0xf0, 0x01, 0x00]).unwrap();
        assert_eq!(insn.opcode, Opcode::Add);
        assert!(insn.locked);
        assert!(insn.operands[0].is_memory());
    }

    #[test]
    fn lock_with_register_destination_is_rejected() {
        let err = decode32(&[0xf0, 0x89, 0xc3]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidPrefixUse {
                address: 0x1000,
                prefix: PrefixKind::Lock
            }
        );
    }

    #[test]
    fn lea_yields_a_bare_effective_address() {
        // lea eax, [ecx+ebx]
        let insn = decode32(&[0x8d, 0x04, 0x19]).unwrap();
        assert_eq!(insn.opcode, Opcode::Lea);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));
        assert_eq!(
            insn.operands[1],
            Operand::sum(
                Operand::reg(Register::Ecx),
                Operand::scaled(Operand::reg(Register::Ebx), 1)
            )
        );
        assert!(!insn.operands[1].is_memory());
    }

    #[test]
    fn mov_with_sib_scale_and_disp8() {
        // mov eax, [edx + ecx*4 + 0x10]
        let insn = decode32(&[0x8b, 0x44, 0x8a, 0x10]).unwrap();
        assert_eq!(insn.opcode, Opcode::Mov);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));
        let expected = Operand::indirect(
            Operand::sum(
                Operand::sum(
                    Operand::reg(Register::Edx),
                    Operand::scaled(Operand::reg(Register::Ecx), 4),
                ),
                Operand::imm(0x10, Width::Byte),
            ),
            Width::Dword,
            Segment::Ds,
        );
        assert_eq!(insn.operands[1], expected);
    }

    #[test]
    fn repne_cmps() {
        let insn = decode32(&[0xf2, 0xa6]).unwrap();
        assert_eq!(insn.opcode, Opcode::Cmps);
        assert_eq!(insn.repeat, Repeat::NotEqual);
    }

    #[test]
    fn repne_on_non_string_op_is_rejected() {
        let err = decode32(&[0xf2, 0x90]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidPrefixUse {
                address: 0x1000,
                prefix: PrefixKind::Repne
            }
        );
    }

    #[test]
    fn short_jmp_backwards_targets_its_own_start() {
        // jmp $-0 (EB FE loops forever)
        let insn = decode32(&[0xeb, 0xfe]).unwrap();
        assert_eq!(insn.opcode, Opcode::Jmp);
        assert!(insn.near);
        assert_eq!(insn.operands[0], Operand::imm(0x1000, Width::Dword));
    }

    #[test]
    fn fld1() {
        let insn = decode32(&[0xd9, 0xe8]).unwrap();
        assert_eq!(insn.opcode, Opcode::Fld1);
        assert!(insn.operands.is_empty());
    }

    #[test]
    fn movzx_byte_source() {
        // movzx eax, bl
        let insn = decode32(&[0x0f, 0xb6, 0xc3]).unwrap();
        assert_eq!(insn.opcode, Opcode::Movzx);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));
        assert_eq!(insn.operands[1], Operand::reg(Register::Bl));
    }

    #[test]
    fn sixteen_bit_default_absolute_disp() {
        // add ax, [0x1234]
        let insn = decode16(&[0x03, 0x06, 0x34, 0x12]).unwrap();
        assert_eq!(insn.opcode, Opcode::Add);
        assert_eq!(insn.operands[0], Operand::reg(Register::Ax));
        assert_eq!(
            insn.operands[1],
            Operand::indirect(Operand::imm(0x1234, Width::Word), Width::Word, Segment::Ds)
        );
    }

    #[test]
    fn duplicate_prefixes_are_rejected() {
        let cases: [(&[u8], PrefixCategory); 5] = [
            (&[0x66, 0x66, 0x90], PrefixCategory::OperandSize),
            (&[0x67, 0x67, 0x90], PrefixCategory::AddressSize),
            (&[0x26, 0x3e, 0x90], PrefixCategory::SegmentOverride),
            (&[0xf0, 0xf0, 0x90], PrefixCategory::Lock),
            (&[0xf3, 0xf2, 0xa6], PrefixCategory::Repeat),
        ];
        for (bytes, category) in cases {
            let err = decode32(bytes).unwrap_err();
            assert_eq!(
                err,
                DecodeError::DuplicatePrefix {
                    address: 0x1000,
                    category
                },
                "bytes {bytes:02x?}"
            );
        }
    }

    #[test]
    fn truncated_inputs() {
        assert!(matches!(
            decode32(&[]),
            Err(DecodeError::Truncated { .. })
        ));
        assert!(matches!(
            decode32(&[0x03]),
            Err(DecodeError::Truncated { .. })
        ));
        assert!(matches!(
            decode32(&[0x66]),
            Err(DecodeError::Truncated { .. })
        ));
        assert!(matches!(
            decode32(&[0xb8, 0x01, 0x02]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn unallocated_cells_are_invalid() {
        assert!(matches!(
            decode32(&[0xd6]),
            Err(DecodeError::InvalidOpcode { byte: 0xd6, .. })
        ));
        assert!(matches!(
            decode32(&[0xf1]),
            Err(DecodeError::InvalidOpcode { byte: 0xf1, .. })
        ));
        assert!(matches!(
            decode32(&[0x0f, 0xff, 0x00]),
            Err(DecodeError::InvalidOpcode { byte: 0xff, .. })
        ));
    }

    #[test]
    fn group1_immediate_selects_mnemonic_from_reg_field() {
        // add ebx, 0x11223344
        let insn = decode32(&[0x81, 0xc3, 0x44, 0x33, 0x22, 0x11]).unwrap();
        assert_eq!(insn.opcode, Opcode::Add);
        assert_eq!(insn.operands[0], Operand::reg(Register::Ebx));
        assert_eq!(insn.operands[1], Operand::imm(0x11223344, Width::Dword));
    }

    #[test]
    fn group1_sign_extended_immediate() {
        // sub eax, -1
        let insn = decode32(&[0x83, 0xe8, 0xff]).unwrap();
        assert_eq!(insn.opcode, Opcode::Sub);
        assert_eq!(insn.operands[1], Operand::imm(-1, Width::Byte));
    }

    #[test]
    fn group2_shift_forms() {
        // shl eax, 5
        let insn = decode32(&[0xc1, 0xe0, 0x05]).unwrap();
        assert_eq!(insn.opcode, Opcode::Shl);
        assert_eq!(insn.operands[1], Operand::imm(5, Width::Byte));

        // shl eax, 1
        let insn = decode32(&[0xd1, 0xe0]).unwrap();
        assert_eq!(insn.opcode, Opcode::Shl);
        assert_eq!(insn.operands[1], Operand::imm(1, Width::Byte));

        // shl al, cl
        let insn = decode32(&[0xd2, 0xe0]).unwrap();
        assert_eq!(insn.operands[0], Operand::reg(Register::Al));
        assert_eq!(insn.operands[1], Operand::reg(Register::Cl));
    }

    #[test]
    fn group3_test_reads_an_immediate() {
        // test al, 0x55
        let insn = decode32(&[0xf6, 0xc0, 0x55]).unwrap();
        assert_eq!(insn.opcode, Opcode::Test);
        assert_eq!(insn.operands[0], Operand::reg(Register::Al));
        assert_eq!(insn.operands[1], Operand::imm(0x55, Width::Byte));

        // neg eax reads none
        let insn = decode32(&[0xf7, 0xd8]).unwrap();
        assert_eq!(insn.opcode, Opcode::Neg);
        assert_eq!(insn.operands.len(), 1);
    }

    #[test]
    fn group5_near_and_far_branches() {
        // call eax
        let insn = decode32(&[0xff, 0xd0]).unwrap();
        assert_eq!(insn.opcode, Opcode::Call);
        assert!(insn.near);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));

        // jmp far [eax]
        let insn = decode32(&[0xff, 0x28]).unwrap();
        assert_eq!(insn.opcode, Opcode::Jmp);
        assert!(!insn.near);
        assert_eq!(
            insn.operands[0],
            Operand::indirect(
                Operand::reg(Register::Eax),
                Width::FarPointer32,
                Segment::Ds
            )
        );

        // far call requires a memory operand
        assert!(matches!(
            decode32(&[0xff, 0xd8]),
            Err(DecodeError::ExpectedMemory { .. })
        ));
    }

    #[test]
    fn far_call_immediate() {
        let insn = decode32(&[0x9a, 0x78, 0x56, 0x34, 0x12, 0xcd, 0xab]).unwrap();
        assert_eq!(insn.opcode, Opcode::Call);
        assert!(!insn.near);
        assert_eq!(
            insn.operands[0],
            Operand::FarPointer {
                segment: 0xabcd,
                offset: 0x12345678,
                width: Width::FarPointer32
            }
        );
    }

    #[test]
    fn segment_override_reaches_memory_operands() {
        // mov eax, fs:[0x11223344]
        let insn = decode32(&[0x64, 0xa1, 0x44, 0x33, 0x22, 0x11]).unwrap();
        assert_eq!(insn.opcode, Opcode::Mov);
        assert_eq!(
            insn.operands[1],
            Operand::indirect(
                Operand::imm(0x11223344, Width::Dword),
                Width::Dword,
                Segment::Fs
            )
        );
    }

    #[test]
    fn address_size_override_uses_16_bit_forms() {
        // mov eax, [bx]
        let insn = decode32(&[0x67, 0x8b, 0x07]).unwrap();
        assert_eq!(insn.opcode, Opcode::Mov);
        assert_eq!(
            insn.operands[1],
            Operand::indirect(Operand::reg(Register::Bx), Width::Dword, Segment::Ds)
        );
    }

    #[test]
    fn mov_to_control_register() {
        // mov cr0, eax
        let insn = decode32(&[0x0f, 0x22, 0xc0]).unwrap();
        assert_eq!(insn.opcode, Opcode::Mov);
        assert_eq!(insn.operands[0], Operand::reg(Register::Cr0));
        assert_eq!(insn.operands[1], Operand::reg(Register::Eax));

        // cr4 is out of range here
        assert!(matches!(
            decode32(&[0x0f, 0x22, 0xe0]),
            Err(DecodeError::InvalidControlRegister { index: 4 })
        ));
    }

    #[test]
    fn bound_requires_memory() {
        assert!(matches!(
            decode32(&[0x62, 0xc0]),
            Err(DecodeError::ExpectedMemory { .. })
        ));
    }

    #[test]
    fn sib_without_base_uses_scale_keyed_displacement() {
        // mov eax, [ebx + 0x11223344] via SIB base == 5, scale 0
        let insn = decode32(&[0x8b, 0x04, 0x1d, 0x44, 0x33, 0x22, 0x11]).unwrap();
        let expected = Operand::indirect(
            Operand::sum(
                Operand::scaled(Operand::reg(Register::Ebx), 1),
                Operand::imm(0x11223344, Width::Dword),
            ),
            Width::Dword,
            Segment::Ds,
        );
        assert_eq!(insn.operands[1], expected);

        // scale == 3 with base == 5 does not encode a valid form
        assert!(matches!(
            decode32(&[0x8b, 0x04, 0xdd, 0x00]),
            Err(DecodeError::InvalidSib { .. })
        ));
    }

    #[test]
    fn xchg_with_accumulator() {
        let insn = decode32(&[0x93]).unwrap();
        assert_eq!(insn.opcode, Opcode::Xchg);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));
        assert_eq!(insn.operands[1], Operand::reg(Register::Ebx));
    }

    #[test]
    fn push_segment_registers() {
        let insn = decode32(&[0x0e]).unwrap();
        assert_eq!(insn.opcode, Opcode::Push);
        assert_eq!(insn.operands[0], Operand::Segment(Segment::Cs));

        let insn = decode32(&[0x0f, 0xa0]).unwrap();
        assert_eq!(insn.opcode, Opcode::Push);
        assert_eq!(insn.operands[0], Operand::Segment(Segment::Fs));
    }

    #[test]
    fn long_conditional_jump() {
        // je +0x10 (0F 84 disp32), 6 bytes long
        let insn = decode32(&[0x0f, 0x84, 0x10, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(insn.opcode, Opcode::Je);
        assert_eq!(insn.operands[0], Operand::imm(0x1016, Width::Dword));
    }

    #[test]
    fn setcc_byte_destination() {
        let insn = decode32(&[0x0f, 0x94, 0xc0]).unwrap();
        assert_eq!(insn.opcode, Opcode::Sete);
        assert_eq!(insn.operands[0], Operand::reg(Register::Al));
    }

    #[test]
    fn shld_with_immediate_count() {
        // shld eax, ebx, 4
        let insn = decode32(&[0x0f, 0xa4, 0xd8, 0x04]).unwrap();
        assert_eq!(insn.opcode, Opcode::Shld);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));
        assert_eq!(insn.operands[1], Operand::reg(Register::Ebx));
        assert_eq!(insn.operands[2], Operand::imm(4, Width::Byte));
    }

    #[test]
    fn descriptor_table_width_follows_operand_size() {
        // sgdt [eax]
        let insn = decode32(&[0x0f, 0x01, 0x00]).unwrap();
        assert_eq!(insn.opcode, Opcode::Sgdt);
        assert_eq!(
            insn.operands[0],
            Operand::indirect(
                Operand::reg(Register::Eax),
                Width::PseudoDescriptor10,
                Segment::Ds
            )
        );

        let insn = decode32(&[0x66, 0x0f, 0x01, 0x00]).unwrap();
        assert_eq!(
            insn.operands[0],
            Operand::indirect(
                Operand::reg(Register::Eax),
                Width::PseudoDescriptor6,
                Segment::Ds
            )
        );
    }

    #[test]
    fn x87_memory_widths() {
        // fadd dword [eax]
        let insn = decode32(&[0xd8, 0x00]).unwrap();
        assert_eq!(insn.opcode, Opcode::Fadd);
        assert_eq!(
            insn.operands[0],
            Operand::indirect(Operand::reg(Register::Eax), Width::Single, Segment::Ds)
        );

        // fstcw [esi]
        let insn = decode32(&[0xd9, 0x3e]).unwrap();
        assert_eq!(insn.opcode, Opcode::Fstcw);
        assert_eq!(
            insn.operands[0],
            Operand::indirect(Operand::reg(Register::Esi), Width::BytePair, Segment::Ds)
        );

        // fsave [esi] tracks the operand size
        let insn = decode32(&[0xdd, 0x36]).unwrap();
        assert_eq!(insn.opcode, Opcode::Fsave);
        assert_eq!(
            insn.operands[0],
            Operand::indirect(Operand::reg(Register::Esi), Width::FpuState108, Segment::Ds)
        );
        let insn = decode32(&[0x66, 0xdd, 0x36]).unwrap();
        assert_eq!(
            insn.operands[0],
            Operand::indirect(Operand::reg(Register::Esi), Width::FpuState94, Segment::Ds)
        );
    }

    #[test]
    fn x87_register_forms() {
        // faddp st(1), st(0)
        let insn = decode32(&[0xde, 0xc1]).unwrap();
        assert_eq!(insn.opcode, Opcode::Faddp);
        assert_eq!(insn.operands[0], Operand::FpuStack(1));
        assert_eq!(insn.operands[1], Operand::FpuStack(0));

        // fstsw ax
        let insn = decode32(&[0xdf, 0xe0]).unwrap();
        assert_eq!(insn.opcode, Opcode::Fstsw);
        assert_eq!(insn.operands[0], Operand::reg(Register::Ax));

        // fucompp has no operands
        let insn = decode32(&[0xda, 0xe9]).unwrap();
        assert_eq!(insn.opcode, Opcode::Fucompp);
        assert!(insn.operands.is_empty());

        // the undocumented FSTP1 alias is rejected
        assert!(matches!(
            decode32(&[0xd9, 0xd8]),
            Err(DecodeError::InvalidOpcode { .. })
        ));
    }

    #[test]
    fn string_ops_carry_implicit_operands() {
        // movsd: es:[edi] <- ds:[esi]
        let insn = decode32(&[0xa5]).unwrap();
        assert_eq!(insn.opcode, Opcode::Movs);
        assert_eq!(
            insn.operands[0],
            Operand::indirect(Operand::reg(Register::Edi), Width::Dword, Segment::Es)
        );
        assert_eq!(
            insn.operands[1],
            Operand::indirect(Operand::reg(Register::Esi), Width::Dword, Segment::Ds)
        );

        // the override retargets the SI side only
        let insn = decode32(&[0x26, 0xa4]).unwrap();
        assert_eq!(
            insn.operands[1],
            Operand::indirect(Operand::reg(Register::Esi), Width::Byte, Segment::Es)
        );
    }

    #[test]
    fn rep_movs_is_legal() {
        let insn = decode32(&[0xf3, 0xa4]).unwrap();
        assert_eq!(insn.opcode, Opcode::Movs);
        assert_eq!(insn.repeat, Repeat::Equal);
    }

    #[test]
    fn in_out_forms() {
        let insn = decode32(&[0xe4, 0x60]).unwrap();
        assert_eq!(insn.opcode, Opcode::In);
        assert_eq!(insn.operands[0], Operand::reg(Register::Al));
        assert_eq!(insn.operands[1], Operand::imm(0x60, Width::Byte));

        let insn = decode32(&[0xed]).unwrap();
        assert_eq!(insn.opcode, Opcode::In);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));
        assert_eq!(insn.operands[1], Operand::reg(Register::Dx));

        let insn = decode32(&[0xee]).unwrap();
        assert_eq!(insn.opcode, Opcode::Out);
        assert_eq!(insn.operands[0], Operand::reg(Register::Dx));
        assert_eq!(insn.operands[1], Operand::reg(Register::Al));
    }

    #[test]
    fn enter_reads_two_immediates() {
        let insn = decode32(&[0xc8, 0x10, 0x00, 0x02]).unwrap();
        assert_eq!(insn.opcode, Opcode::Enter);
        assert_eq!(insn.operands[0], Operand::imm(0x10, Width::Word));
        assert_eq!(insn.operands[1], Operand::imm(2, Width::Byte));
    }

    #[test]
    fn int_vector() {
        let insn = decode32(&[0xcd, 0x21]).unwrap();
        assert_eq!(insn.opcode, Opcode::Int);
        assert_eq!(insn.operands[0], Operand::imm(0x21, Width::Byte));

        let insn = decode32(&[0xcc]).unwrap();
        assert_eq!(insn.opcode, Opcode::Int3);
        assert!(insn.operands.is_empty());
    }

    #[test]
    fn xlat_has_no_operands() {
        let insn = decode32(&[0xd7]).unwrap();
        assert_eq!(insn.opcode, Opcode::Xlat);
        assert!(insn.operands.is_empty());
    }

    #[test]
    fn push_immediate_width_follows_operand_size() {
        let insn = decode32(&[0x68, 0x78, 0x56, 0x34, 0x12]).unwrap();
        assert_eq!(insn.opcode, Opcode::Push);
        assert_eq!(insn.operands[0], Operand::imm(0x12345678, Width::Dword));

        let insn = decode32(&[0x66, 0x68, 0x34, 0x12]).unwrap();
        assert_eq!(insn.operands[0], Operand::imm(0x1234, Width::Word));
    }

    #[test]
    fn movsx_word_source() {
        // 0F BF is movsx Gv, Ew
        let insn = decode32(&[0x0f, 0xbf, 0xc1]).unwrap();
        assert_eq!(insn.opcode, Opcode::Movsx);
        assert_eq!(insn.operands[0], Operand::reg(Register::Eax));
        assert_eq!(insn.operands[1], Operand::reg(Register::Cx));
    }

    #[test]
    fn pop_group_requires_zero_extension() {
        let insn = decode32(&[0x8f, 0x00]).unwrap();
        assert_eq!(insn.opcode, Opcode::Pop);
        assert!(insn.operands[0].is_memory());

        assert!(matches!(
            decode32(&[0x8f, 0x08]),
            Err(DecodeError::InvalidOpcode { byte: 0x8f, .. })
        ));
    }

    #[test]
    fn disassemble_all_skips_bad_bytes() {
        let results =
            Ia32Disassembler::new(Bitness::Bits32).disassemble_all(&[0x90, 0xd6, 0xc3], 0x1000);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn decode_consumes_exact_lengths() {
        let disasm = Ia32Disassembler::new(Bitness::Bits32);
        let cases: [(&[u8], usize); 6] = [
            (&[0x90], 1),
            (&[0x03, 0xc3], 2),
            (&[0x8b, 0x44, 0x8a, 0x10], 4),
            (&[0x81, 0xc3, 0x44, 0x33, 0x22, 0x11], 6),
            (&[0x9a, 0x78, 0x56, 0x34, 0x12, 0xcd, 0xab], 7),
            (&[0x66, 0x68, 0x34, 0x12], 4),
        ];
        for (bytes, expected) in cases {
            let (_, size) = disasm.decode_slice(bytes, 0).unwrap();
            assert_eq!(size, expected, "bytes {bytes:02x?}");
        }
    }
}
