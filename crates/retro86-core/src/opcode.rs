//! The closed IA-32 mnemonic set.

/// Instruction mnemonics recognised by the decoder.
///
/// `Invalid` is the decode context's initial value; a finished instruction
/// never carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Opcode {
    Invalid,

    // Integer ALU
    Add,
    Or,
    Adc,
    Sbb,
    And,
    Sub,
    Xor,
    Cmp,
    Inc,
    Dec,
    Neg,
    Not,
    Mul,
    Imul,
    Div,
    Idiv,
    Test,

    // BCD adjust
    Daa,
    Das,
    Aaa,
    Aas,
    Aam,
    Aad,

    // Stack and data movement
    Push,
    Pop,
    Pusha,
    Popa,
    Pushf,
    Popf,
    Mov,
    Xchg,
    Lea,
    Xlat,
    Cbw,
    Cwd,
    Sahf,
    Lahf,

    // Shifts and rotates
    Rol,
    Ror,
    Rcl,
    Rcr,
    Shl,
    Shr,
    Sar,

    // Control transfer
    Call,
    Ret,
    Jmp,
    Jo,
    Jno,
    Jb,
    Jae,
    Je,
    Jne,
    Jbe,
    Ja,
    Js,
    Jns,
    Jp,
    Jnp,
    Jl,
    Jge,
    Jle,
    Jg,
    Loop,
    Loope,
    Loopne,
    Jcxz,
    Int,
    Int3,
    Into,
    Iret,
    Enter,
    Leave,

    // String and port I/O
    Movs,
    Cmps,
    Stos,
    Lods,
    Scas,
    Ins,
    Outs,
    In,
    Out,

    // Far-pointer loads
    Les,
    Lds,
    Lss,
    Lfs,
    Lgs,

    // Checks
    Bound,
    Arpl,

    // Flag and machine control
    Nop,
    Wait,
    Hlt,
    Cmc,
    Clc,
    Stc,
    Cli,
    Sti,
    Cld,
    Std,

    // Two-byte map: system
    Sldt,
    Sidt,
    Sgdt,
    Lgdt,
    Lidt,
    Ltr,
    Verr,
    Verw,
    Smsw,
    Lmsw,
    Lar,
    Lsl,
    Clts,

    // Two-byte map: SETcc
    Seto,
    Setno,
    Setb,
    Setae,
    Sete,
    Setne,
    Setbe,
    Seta,
    Sets,
    Setns,
    Setp,
    Setnp,
    Setl,
    Setge,
    Setle,
    Setg,

    // Two-byte map: bit operations and wide shifts
    Bt,
    Bts,
    Btr,
    Btc,
    Bsf,
    Bsr,
    Shld,
    Shrd,
    Movzx,
    Movsx,

    // x87 arithmetic
    Fadd,
    Fmul,
    Fcom,
    Fcomp,
    Fsub,
    Fsubr,
    Fdiv,
    Fdivr,
    Faddp,
    Fmulp,
    Fsubp,
    Fsubrp,
    Fdivp,
    Fdivrp,
    Fcompp,
    Fiadd,
    Fimul,
    Ficom,
    Ficomp,
    Fisub,
    Fisubr,
    Fidiv,
    Fidivr,

    // x87 data transfer
    Fld,
    Fst,
    Fstp,
    Fxch,
    Fild,
    Fist,
    Fistp,
    Fisttp,
    Fbld,
    Fbstp,
    Fcmovb,
    Fcmove,
    Fcmovbe,
    Fcmovu,
    Fcmovnb,
    Fcmovne,
    Fcmovnbe,
    Fcmovnu,

    // x87 comparison
    Fucom,
    Fucomp,
    Fucompp,
    Fcomi,
    Fcomip,
    Fucomi,
    Fucomip,
    Ftst,
    Fxam,

    // x87 constants
    Fld1,
    Fldl2t,
    Fldl2e,
    Fldpi,
    Fldlg2,
    Fldln2,
    Fldz,

    // x87 transcendental and misc
    F2xm1,
    Fyl2x,
    Fyl2xp1,
    Fptan,
    Fpatan,
    Fxtract,
    Fprem,
    Fprem1,
    Fdecstp,
    Fincstp,
    Fsqrt,
    Fsincos,
    Frndint,
    Fscale,
    Fsin,
    Fcos,
    Fchs,
    Fabs,
    Fnop,
    Ffree,

    // x87 control
    Fldenv,
    Fstenv,
    Frstor,
    Fsave,
    Fstsw,
    Fstcw,
    Fldcw,
    Fclex,
    Finit,
}

impl Opcode {
    /// Canonical lower-case mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Invalid => "(invalid)",
            Self::Add => "add",
            Self::Or => "or",
            Self::Adc => "adc",
            Self::Sbb => "sbb",
            Self::And => "and",
            Self::Sub => "sub",
            Self::Xor => "xor",
            Self::Cmp => "cmp",
            Self::Inc => "inc",
            Self::Dec => "dec",
            Self::Neg => "neg",
            Self::Not => "not",
            Self::Mul => "mul",
            Self::Imul => "imul",
            Self::Div => "div",
            Self::Idiv => "idiv",
            Self::Test => "test",
            Self::Daa => "daa",
            Self::Das => "das",
            Self::Aaa => "aaa",
            Self::Aas => "aas",
            Self::Aam => "aam",
            Self::Aad => "aad",
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Pusha => "pusha",
            Self::Popa => "popa",
            Self::Pushf => "pushf",
            Self::Popf => "popf",
            Self::Mov => "mov",
            Self::Xchg => "xchg",
            Self::Lea => "lea",
            Self::Xlat => "xlat",
            Self::Cbw => "cbw",
            Self::Cwd => "cwd",
            Self::Sahf => "sahf",
            Self::Lahf => "lahf",
            Self::Rol => "rol",
            Self::Ror => "ror",
            Self::Rcl => "rcl",
            Self::Rcr => "rcr",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::Sar => "sar",
            Self::Call => "call",
            Self::Ret => "ret",
            Self::Jmp => "jmp",
            Self::Jo => "jo",
            Self::Jno => "jno",
            Self::Jb => "jb",
            Self::Jae => "jae",
            Self::Je => "je",
            Self::Jne => "jne",
            Self::Jbe => "jbe",
            Self::Ja => "ja",
            Self::Js => "js",
            Self::Jns => "jns",
            Self::Jp => "jp",
            Self::Jnp => "jnp",
            Self::Jl => "jl",
            Self::Jge => "jge",
            Self::Jle => "jle",
            Self::Jg => "jg",
            Self::Loop => "loop",
            Self::Loope => "loope",
            Self::Loopne => "loopne",
            Self::Jcxz => "jcxz",
            Self::Int => "int",
            Self::Int3 => "int3",
            Self::Into => "into",
            Self::Iret => "iret",
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::Movs => "movs",
            Self::Cmps => "cmps",
            Self::Stos => "stos",
            Self::Lods => "lods",
            Self::Scas => "scas",
            Self::Ins => "ins",
            Self::Outs => "outs",
            Self::In => "in",
            Self::Out => "out",
            Self::Les => "les",
            Self::Lds => "lds",
            Self::Lss => "lss",
            Self::Lfs => "lfs",
            Self::Lgs => "lgs",
            Self::Bound => "bound",
            Self::Arpl => "arpl",
            Self::Nop => "nop",
            Self::Wait => "wait",
            Self::Hlt => "hlt",
            Self::Cmc => "cmc",
            Self::Clc => "clc",
            Self::Stc => "stc",
            Self::Cli => "cli",
            Self::Sti => "sti",
            Self::Cld => "cld",
            Self::Std => "std",
            Self::Sldt => "sldt",
            Self::Sidt => "sidt",
            Self::Sgdt => "sgdt",
            Self::Lgdt => "lgdt",
            Self::Lidt => "lidt",
            Self::Ltr => "ltr",
            Self::Verr => "verr",
            Self::Verw => "verw",
            Self::Smsw => "smsw",
            Self::Lmsw => "lmsw",
            Self::Lar => "lar",
            Self::Lsl => "lsl",
            Self::Clts => "clts",
            Self::Seto => "seto",
            Self::Setno => "setno",
            Self::Setb => "setb",
            Self::Setae => "setae",
            Self::Sete => "sete",
            Self::Setne => "setne",
            Self::Setbe => "setbe",
            Self::Seta => "seta",
            Self::Sets => "sets",
            Self::Setns => "setns",
            Self::Setp => "setp",
            Self::Setnp => "setnp",
            Self::Setl => "setl",
            Self::Setge => "setge",
            Self::Setle => "setle",
            Self::Setg => "setg",
            Self::Bt => "bt",
            Self::Bts => "bts",
            Self::Btr => "btr",
            Self::Btc => "btc",
            Self::Bsf => "bsf",
            Self::Bsr => "bsr",
            Self::Shld => "shld",
            Self::Shrd => "shrd",
            Self::Movzx => "movzx",
            Self::Movsx => "movsx",
            Self::Fadd => "fadd",
            Self::Fmul => "fmul",
            Self::Fcom => "fcom",
            Self::Fcomp => "fcomp",
            Self::Fsub => "fsub",
            Self::Fsubr => "fsubr",
            Self::Fdiv => "fdiv",
            Self::Fdivr => "fdivr",
            Self::Faddp => "faddp",
            Self::Fmulp => "fmulp",
            Self::Fsubp => "fsubp",
            Self::Fsubrp => "fsubrp",
            Self::Fdivp => "fdivp",
            Self::Fdivrp => "fdivrp",
            Self::Fcompp => "fcompp",
            Self::Fiadd => "fiadd",
            Self::Fimul => "fimul",
            Self::Ficom => "ficom",
            Self::Ficomp => "ficomp",
            Self::Fisub => "fisub",
            Self::Fisubr => "fisubr",
            Self::Fidiv => "fidiv",
            Self::Fidivr => "fidivr",
            Self::Fld => "fld",
            Self::Fst => "fst",
            Self::Fstp => "fstp",
            Self::Fxch => "fxch",
            Self::Fild => "fild",
            Self::Fist => "fist",
            Self::Fistp => "fistp",
            Self::Fisttp => "fisttp",
            Self::Fbld => "fbld",
            Self::Fbstp => "fbstp",
            Self::Fcmovb => "fcmovb",
            Self::Fcmove => "fcmove",
            Self::Fcmovbe => "fcmovbe",
            Self::Fcmovu => "fcmovu",
            Self::Fcmovnb => "fcmovnb",
            Self::Fcmovne => "fcmovne",
            Self::Fcmovnbe => "fcmovnbe",
            Self::Fcmovnu => "fcmovnu",
            Self::Fucom => "fucom",
            Self::Fucomp => "fucomp",
            Self::Fucompp => "fucompp",
            Self::Fcomi => "fcomi",
            Self::Fcomip => "fcomip",
            Self::Fucomi => "fucomi",
            Self::Fucomip => "fucomip",
            Self::Ftst => "ftst",
            Self::Fxam => "fxam",
            Self::Fld1 => "fld1",
            Self::Fldl2t => "fldl2t",
            Self::Fldl2e => "fldl2e",
            Self::Fldpi => "fldpi",
            Self::Fldlg2 => "fldlg2",
            Self::Fldln2 => "fldln2",
            Self::Fldz => "fldz",
            Self::F2xm1 => "f2xm1",
            Self::Fyl2x => "fyl2x",
            Self::Fyl2xp1 => "fyl2xp1",
            Self::Fptan => "fptan",
            Self::Fpatan => "fpatan",
            Self::Fxtract => "fxtract",
            Self::Fprem => "fprem",
            Self::Fprem1 => "fprem1",
            Self::Fdecstp => "fdecstp",
            Self::Fincstp => "fincstp",
            Self::Fsqrt => "fsqrt",
            Self::Fsincos => "fsincos",
            Self::Frndint => "frndint",
            Self::Fscale => "fscale",
            Self::Fsin => "fsin",
            Self::Fcos => "fcos",
            Self::Fchs => "fchs",
            Self::Fabs => "fabs",
            Self::Fnop => "fnop",
            Self::Ffree => "ffree",
            Self::Fldenv => "fldenv",
            Self::Fstenv => "fstenv",
            Self::Frstor => "frstor",
            Self::Fsave => "fsave",
            Self::Fstsw => "fstsw",
            Self::Fstcw => "fstcw",
            Self::Fldcw => "fldcw",
            Self::Fclex => "fclex",
            Self::Finit => "finit",
        }
    }

    /// Whether a LOCK prefix may legally precede this mnemonic.
    pub fn accepts_lock(&self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Adc
                | Self::And
                | Self::Btc
                | Self::Btr
                | Self::Bts
                | Self::Dec
                | Self::Inc
                | Self::Neg
                | Self::Not
                | Self::Or
                | Self::Sbb
                | Self::Sub
                | Self::Xor
                | Self::Xchg
        )
    }

    /// Whether a REP/REPE prefix may legally precede this mnemonic.
    pub fn accepts_rep(&self) -> bool {
        matches!(
            self,
            Self::Ins | Self::Outs | Self::Movs | Self::Lods | Self::Stos | Self::Cmps | Self::Scas
        )
    }

    /// Whether a REPNE prefix may legally precede this mnemonic.
    pub fn accepts_repne(&self) -> bool {
        matches!(self, Self::Cmps | Self::Scas)
    }
}
