/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use std::fmt::{Display, Formatter};

/// Every opcode of the machine. The numbering is dense from `Hcf` up to `R2rFmulD`,
/// `0xFE` and `0xFF` are unassigned.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpCode {
    // Control
    Hcf = 0x00, // Host call: vector byte, sub-function byte
    BraB,
    Bra,
    BsrB,
    Bsr,
    Jmp,
    Jsr,
    Rts,
    Stop,

    // Monadic branches, compare to zero
    BizB = 0x09,
    BizW,
    BizL,
    BizQ,
    FbizS,
    FbizD,
    BnzB,
    BnzW,
    BnzL,
    BnzQ,
    FbnzS,
    FbnzD,
    BmiB,
    BmiW,
    BmiL,
    BmiQ,
    FbmiS,
    FbmiD,
    BplB,
    BplW,
    BplL,
    BplQ,
    FbplS,
    FbplD,

    // Dyadic branches, signed and float
    BltB = 0x21,
    BltW,
    BltL,
    BltQ,
    FbltS,
    FbltD,
    BleB,
    BleW,
    BleL,
    BleQ,
    FbleS,
    FbleD,
    BeqB,
    BeqW,
    BeqL,
    BeqQ,
    FbeqS,
    FbeqD,
    BgeB,
    BgeW,
    BgeL,
    BgeQ,
    FbgeS,
    FbgeD,
    BgtB,
    BgtW,
    BgtL,
    BgtQ,
    FbgtS,
    FbgtD,
    BneB,
    BneW,
    BneL,
    BneQ,
    FbneS,
    FbneD,

    // Dyadic branches, unsigned
    BloB = 0x45,
    BloW,
    BloL,
    BloQ,
    BlsB,
    BlsW,
    BlsL,
    BlsQ,
    BhsB,
    BhsW,
    BhsL,
    BhsQ,
    BhiB,
    BhiW,
    BhiL,
    BhiQ,

    // Bit test branches
    BbsB = 0x55,
    BbsW,
    BbsL,
    BbsQ,
    BbcB,
    BbcW,
    BbcL,
    BbcQ,

    // Loop and register optimised branches
    Dbnz = 0x5D,
    RDbnz,
    RBmc,
    R2rBdc,

    // Data movement
    MoveB = 0x61,
    MoveW,
    MoveL,
    MoveQ,
    FmoveS,
    FmoveD,
    FmovelS,
    FmoveqS,
    FmovelD,
    FmoveqD,
    FmovesL,
    FmovesQ,
    FmovedL,
    FmovedQ,
    FmovesD,
    FmovedS,
    Lea,
    Savem,
    Loadm,
    Fsavem,
    Floadm,

    // Logical
    AndB = 0x76,
    AndW,
    AndL,
    AndQ,
    OrB,
    OrW,
    OrL,
    OrQ,
    EorB,
    EorW,
    EorL,
    EorQ,
    NotB,
    NotW,
    NotL,
    NotQ,
    LslB,
    LslW,
    LslL,
    LslQ,
    LsrB,
    LsrW,
    LsrL,
    LsrQ,
    AslB,
    AslW,
    AslL,
    AslQ,
    AsrB,
    AsrW,
    AsrL,
    AsrQ,
    RolB,
    RolW,
    RolL,
    RolQ,
    RorB,
    RorW,
    RorL,
    RorQ,
    BclrB,
    BclrW,
    BclrL,
    BclrQ,
    BsetB,
    BsetW,
    BsetL,
    BsetQ,

    // Bit fields. Only Bfffo and Bfcnt have handlers.
    Bfclr = 0xA6,
    Bfset,
    Bfins,
    Bfexts,
    Bfextu,
    Bfffo,
    Bfcnt,
    Bfxxx,

    // Arithmetic
    ExtbW = 0xAE,
    ExtbL,
    ExtbQ,
    ExtwL,
    ExtwQ,
    ExtlQ,
    NegB,
    NegW,
    NegL,
    NegQ,
    FnegS,
    FnegD,
    AddB,
    AddW,
    AddL,
    AddQ,
    FaddS,
    FaddD,
    SubB,
    SubW,
    SubL,
    SubQ,
    FsubS,
    FsubD,
    MulsL,
    MulsQ,
    MuluL,
    MuluQ,
    FmulS,
    FmulD,
    DivsL,
    DivsQ,
    DivuL,
    DivuQ,
    FdivS,
    FdivD,
    ModsL,
    ModsQ,
    ModuL,
    ModuQ,
    FmodS,
    FmodD,

    // Float math
    FsqrtS = 0xD8,
    FsqrtD,
    FsinS,
    FsinD,
    FcosS,
    FcosD,
    FtanS,
    FtanD,
    FasinS,
    FasinD,
    FacosS,
    FacosD,
    FatanS,
    FatanD,
    FetoxS,
    FetoxD,
    FlognS,
    FlognD,
    Flog2S,
    Flog2D,
    FtwotoxS,
    FtwotoxD,

    // Register to register fast path
    R2rMoveL = 0xEE,
    R2rMoveQ,

    // Diagnostics: timestamp into r14
    Mark = 0xF0,

    R2rFmoveS = 0xF1,
    R2rFmoveD,
    R2rAndQ,
    R2rOrQ,
    R2rEorQ,
    R2rAddL,
    R2rAddQ,
    R2rSubL,
    R2rSubQ,
    R2rMulsQ,
    R2rFaddD,
    R2rFsubD,
    R2rFmulD,
}

/// Operand width selected by an opcode suffix.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Width {
    Byte,
    Word,
    Long,
    Quad,
    Single,
    Double,
}

impl Width {
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Long | Self::Single => 4,
            Self::Quad | Self::Double => 8,
        }
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Single | Self::Double)
    }

    const SIGNED_ORDER: [Self; 6] = [
        Self::Byte,
        Self::Word,
        Self::Long,
        Self::Quad,
        Self::Single,
        Self::Double,
    ];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MonadicCondition {
    Zero,
    NonZero,
    Minus,
    Plus,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DyadicCondition {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    // unsigned
    Lo,
    Ls,
    Hs,
    Hi,
}

/// Number of monadic branch opcodes, the valid range of an `R_BMC` condition byte.
pub const MONADIC_BRANCH_COUNT: u8 = OpCode::BltB as u8 - OpCode::BizB as u8;

/// Number of dyadic branch opcodes, the valid range of an `R2R_BDC` condition byte.
pub const DYADIC_BRANCH_COUNT: u8 = OpCode::BbsB as u8 - OpCode::BltB as u8;

const SIGNED_DYADIC_COUNT: u8 = OpCode::BloB as u8 - OpCode::BltB as u8;

/// Decodes a monadic branch condition index (`0..MONADIC_BRANCH_COUNT`).
#[must_use]
pub const fn monadic_condition(index: u8) -> Option<(MonadicCondition, Width)> {
    if index >= MONADIC_BRANCH_COUNT {
        return None;
    }
    let condition = match index / 6 {
        0 => MonadicCondition::Zero,
        1 => MonadicCondition::NonZero,
        2 => MonadicCondition::Minus,
        _ => MonadicCondition::Plus,
    };
    Some((condition, Width::SIGNED_ORDER[(index % 6) as usize]))
}

/// Decodes a dyadic branch condition index (`0..DYADIC_BRANCH_COUNT`).
#[must_use]
pub const fn dyadic_condition(index: u8) -> Option<(DyadicCondition, Width)> {
    if index >= DYADIC_BRANCH_COUNT {
        return None;
    }
    if index < SIGNED_DYADIC_COUNT {
        let condition = match index / 6 {
            0 => DyadicCondition::Lt,
            1 => DyadicCondition::Le,
            2 => DyadicCondition::Eq,
            3 => DyadicCondition::Ge,
            4 => DyadicCondition::Gt,
            _ => DyadicCondition::Ne,
        };
        return Some((condition, Width::SIGNED_ORDER[(index % 6) as usize]));
    }
    let unsigned = index - SIGNED_DYADIC_COUNT;
    let condition = match unsigned / 4 {
        0 => DyadicCondition::Lo,
        1 => DyadicCondition::Ls,
        2 => DyadicCondition::Hs,
        _ => DyadicCondition::Hi,
    };
    Some((condition, Width::SIGNED_ORDER[(unsigned % 4) as usize]))
}

impl OpCode {
    pub const LAST: Self = Self::R2rFmulD;

    /// Condition and width of a monadic branch opcode.
    #[must_use]
    pub const fn monadic_branch(self) -> Option<(MonadicCondition, Width)> {
        let value = self as u8;
        if value < Self::BizB as u8 {
            return None;
        }
        monadic_condition(value - Self::BizB as u8)
    }

    /// Condition and width of a dyadic branch opcode.
    #[must_use]
    pub const fn dyadic_branch(self) -> Option<(DyadicCondition, Width)> {
        let value = self as u8;
        if value < Self::BltB as u8 {
            return None;
        }
        dyadic_condition(value - Self::BltB as u8)
    }

    /// Index to put in the condition byte of `R_BMC` / `R2R_BDC` for an equivalent branch.
    #[must_use]
    pub const fn condition_index(self) -> Option<u8> {
        if self.monadic_branch().is_some() {
            Some(self as u8 - Self::BizB as u8)
        } else if self.dyadic_branch().is_some() {
            Some(self as u8 - Self::BltB as u8)
        } else {
            None
        }
    }

    /// The handler can never produce a new status, so the dispatch loop does not re-check it.
    #[must_use]
    pub const fn is_fast_path(self) -> bool {
        matches!(
            self,
            Self::BraB
                | Self::Bra
                | Self::BsrB
                | Self::Bsr
                | Self::RDbnz
                | Self::Mark
                | Self::R2rMoveL
                | Self::R2rMoveQ
                | Self::R2rFmoveS
                | Self::R2rFmoveD
                | Self::R2rAndQ
                | Self::R2rOrQ
                | Self::R2rEorQ
                | Self::R2rAddL
                | Self::R2rAddQ
                | Self::R2rSubL
                | Self::R2rSubQ
                | Self::R2rMulsQ
                | Self::R2rFaddD
                | Self::R2rFsubD
                | Self::R2rFmulD
        )
    }

    #[allow(clippy::too_many_lines)]
    #[must_use]
    pub const fn as_string(&self) -> &'static str {
        match self {
            Self::Hcf => "hcf",
            Self::BraB => "bra.b",
            Self::Bra => "bra",
            Self::BsrB => "bsr.b",
            Self::Bsr => "bsr",
            Self::Jmp => "jmp",
            Self::Jsr => "jsr",
            Self::Rts => "rts",
            Self::Stop => "stop",

            Self::BizB => "biz.b",
            Self::BizW => "biz.w",
            Self::BizL => "biz.l",
            Self::BizQ => "biz.q",
            Self::FbizS => "fbiz.s",
            Self::FbizD => "fbiz.d",
            Self::BnzB => "bnz.b",
            Self::BnzW => "bnz.w",
            Self::BnzL => "bnz.l",
            Self::BnzQ => "bnz.q",
            Self::FbnzS => "fbnz.s",
            Self::FbnzD => "fbnz.d",
            Self::BmiB => "bmi.b",
            Self::BmiW => "bmi.w",
            Self::BmiL => "bmi.l",
            Self::BmiQ => "bmi.q",
            Self::FbmiS => "fbmi.s",
            Self::FbmiD => "fbmi.d",
            Self::BplB => "bpl.b",
            Self::BplW => "bpl.w",
            Self::BplL => "bpl.l",
            Self::BplQ => "bpl.q",
            Self::FbplS => "fbpl.s",
            Self::FbplD => "fbpl.d",

            Self::BltB => "blt.b",
            Self::BltW => "blt.w",
            Self::BltL => "blt.l",
            Self::BltQ => "blt.q",
            Self::FbltS => "fblt.s",
            Self::FbltD => "fblt.d",
            Self::BleB => "ble.b",
            Self::BleW => "ble.w",
            Self::BleL => "ble.l",
            Self::BleQ => "ble.q",
            Self::FbleS => "fble.s",
            Self::FbleD => "fble.d",
            Self::BeqB => "beq.b",
            Self::BeqW => "beq.w",
            Self::BeqL => "beq.l",
            Self::BeqQ => "beq.q",
            Self::FbeqS => "fbeq.s",
            Self::FbeqD => "fbeq.d",
            Self::BgeB => "bge.b",
            Self::BgeW => "bge.w",
            Self::BgeL => "bge.l",
            Self::BgeQ => "bge.q",
            Self::FbgeS => "fbge.s",
            Self::FbgeD => "fbge.d",
            Self::BgtB => "bgt.b",
            Self::BgtW => "bgt.w",
            Self::BgtL => "bgt.l",
            Self::BgtQ => "bgt.q",
            Self::FbgtS => "fbgt.s",
            Self::FbgtD => "fbgt.d",
            Self::BneB => "bne.b",
            Self::BneW => "bne.w",
            Self::BneL => "bne.l",
            Self::BneQ => "bne.q",
            Self::FbneS => "fbne.s",
            Self::FbneD => "fbne.d",

            Self::BloB => "blo.b",
            Self::BloW => "blo.w",
            Self::BloL => "blo.l",
            Self::BloQ => "blo.q",
            Self::BlsB => "bls.b",
            Self::BlsW => "bls.w",
            Self::BlsL => "bls.l",
            Self::BlsQ => "bls.q",
            Self::BhsB => "bhs.b",
            Self::BhsW => "bhs.w",
            Self::BhsL => "bhs.l",
            Self::BhsQ => "bhs.q",
            Self::BhiB => "bhi.b",
            Self::BhiW => "bhi.w",
            Self::BhiL => "bhi.l",
            Self::BhiQ => "bhi.q",

            Self::BbsB => "bbs.b",
            Self::BbsW => "bbs.w",
            Self::BbsL => "bbs.l",
            Self::BbsQ => "bbs.q",
            Self::BbcB => "bbc.b",
            Self::BbcW => "bbc.w",
            Self::BbcL => "bbc.l",
            Self::BbcQ => "bbc.q",

            Self::Dbnz => "dbnz",
            Self::RDbnz => "r.dbnz",
            Self::RBmc => "r.bmc",
            Self::R2rBdc => "r2r.bdc",

            Self::MoveB => "move.b",
            Self::MoveW => "move.w",
            Self::MoveL => "move.l",
            Self::MoveQ => "move.q",
            Self::FmoveS => "fmove.s",
            Self::FmoveD => "fmove.d",
            Self::FmovelS => "fmove.l.s",
            Self::FmoveqS => "fmove.q.s",
            Self::FmovelD => "fmove.l.d",
            Self::FmoveqD => "fmove.q.d",
            Self::FmovesL => "fmove.s.l",
            Self::FmovesQ => "fmove.s.q",
            Self::FmovedL => "fmove.d.l",
            Self::FmovedQ => "fmove.d.q",
            Self::FmovesD => "fmove.s.d",
            Self::FmovedS => "fmove.d.s",
            Self::Lea => "lea",
            Self::Savem => "savem",
            Self::Loadm => "loadm",
            Self::Fsavem => "fsavem",
            Self::Floadm => "floadm",

            Self::AndB => "and.b",
            Self::AndW => "and.w",
            Self::AndL => "and.l",
            Self::AndQ => "and.q",
            Self::OrB => "or.b",
            Self::OrW => "or.w",
            Self::OrL => "or.l",
            Self::OrQ => "or.q",
            Self::EorB => "eor.b",
            Self::EorW => "eor.w",
            Self::EorL => "eor.l",
            Self::EorQ => "eor.q",
            Self::NotB => "not.b",
            Self::NotW => "not.w",
            Self::NotL => "not.l",
            Self::NotQ => "not.q",
            Self::LslB => "lsl.b",
            Self::LslW => "lsl.w",
            Self::LslL => "lsl.l",
            Self::LslQ => "lsl.q",
            Self::LsrB => "lsr.b",
            Self::LsrW => "lsr.w",
            Self::LsrL => "lsr.l",
            Self::LsrQ => "lsr.q",
            Self::AslB => "asl.b",
            Self::AslW => "asl.w",
            Self::AslL => "asl.l",
            Self::AslQ => "asl.q",
            Self::AsrB => "asr.b",
            Self::AsrW => "asr.w",
            Self::AsrL => "asr.l",
            Self::AsrQ => "asr.q",
            Self::RolB => "rol.b",
            Self::RolW => "rol.w",
            Self::RolL => "rol.l",
            Self::RolQ => "rol.q",
            Self::RorB => "ror.b",
            Self::RorW => "ror.w",
            Self::RorL => "ror.l",
            Self::RorQ => "ror.q",
            Self::BclrB => "bclr.b",
            Self::BclrW => "bclr.w",
            Self::BclrL => "bclr.l",
            Self::BclrQ => "bclr.q",
            Self::BsetB => "bset.b",
            Self::BsetW => "bset.w",
            Self::BsetL => "bset.l",
            Self::BsetQ => "bset.q",

            Self::Bfclr => "bfclr",
            Self::Bfset => "bfset",
            Self::Bfins => "bfins",
            Self::Bfexts => "bfexts",
            Self::Bfextu => "bfextu",
            Self::Bfffo => "bfffo",
            Self::Bfcnt => "bfcnt",
            Self::Bfxxx => "bfxxx",

            Self::ExtbW => "extb.w",
            Self::ExtbL => "extb.l",
            Self::ExtbQ => "extb.q",
            Self::ExtwL => "extw.l",
            Self::ExtwQ => "extw.q",
            Self::ExtlQ => "extl.q",
            Self::NegB => "neg.b",
            Self::NegW => "neg.w",
            Self::NegL => "neg.l",
            Self::NegQ => "neg.q",
            Self::FnegS => "fneg.s",
            Self::FnegD => "fneg.d",
            Self::AddB => "add.b",
            Self::AddW => "add.w",
            Self::AddL => "add.l",
            Self::AddQ => "add.q",
            Self::FaddS => "fadd.s",
            Self::FaddD => "fadd.d",
            Self::SubB => "sub.b",
            Self::SubW => "sub.w",
            Self::SubL => "sub.l",
            Self::SubQ => "sub.q",
            Self::FsubS => "fsub.s",
            Self::FsubD => "fsub.d",
            Self::MulsL => "muls.l",
            Self::MulsQ => "muls.q",
            Self::MuluL => "mulu.l",
            Self::MuluQ => "mulu.q",
            Self::FmulS => "fmul.s",
            Self::FmulD => "fmul.d",
            Self::DivsL => "divs.l",
            Self::DivsQ => "divs.q",
            Self::DivuL => "divu.l",
            Self::DivuQ => "divu.q",
            Self::FdivS => "fdiv.s",
            Self::FdivD => "fdiv.d",
            Self::ModsL => "mods.l",
            Self::ModsQ => "mods.q",
            Self::ModuL => "modu.l",
            Self::ModuQ => "modu.q",
            Self::FmodS => "fmod.s",
            Self::FmodD => "fmod.d",

            Self::FsqrtS => "fsqrt.s",
            Self::FsqrtD => "fsqrt.d",
            Self::FsinS => "fsin.s",
            Self::FsinD => "fsin.d",
            Self::FcosS => "fcos.s",
            Self::FcosD => "fcos.d",
            Self::FtanS => "ftan.s",
            Self::FtanD => "ftan.d",
            Self::FasinS => "fasin.s",
            Self::FasinD => "fasin.d",
            Self::FacosS => "facos.s",
            Self::FacosD => "facos.d",
            Self::FatanS => "fatan.s",
            Self::FatanD => "fatan.d",
            Self::FetoxS => "fetox.s",
            Self::FetoxD => "fetox.d",
            Self::FlognS => "flogn.s",
            Self::FlognD => "flogn.d",
            Self::Flog2S => "flog2.s",
            Self::Flog2D => "flog2.d",
            Self::FtwotoxS => "ftwotox.s",
            Self::FtwotoxD => "ftwotox.d",

            Self::R2rMoveL => "r2r.move.l",
            Self::R2rMoveQ => "r2r.move.q",
            Self::Mark => "mark",
            Self::R2rFmoveS => "r2r.fmove.s",
            Self::R2rFmoveD => "r2r.fmove.d",
            Self::R2rAndQ => "r2r.and.q",
            Self::R2rOrQ => "r2r.or.q",
            Self::R2rEorQ => "r2r.eor.q",
            Self::R2rAddL => "r2r.add.l",
            Self::R2rAddQ => "r2r.add.q",
            Self::R2rSubL => "r2r.sub.l",
            Self::R2rSubQ => "r2r.sub.q",
            Self::R2rMulsQ => "r2r.muls.q",
            Self::R2rFaddD => "r2r.fadd.d",
            Self::R2rFsubD => "r2r.fsub.d",
            Self::R2rFmulD => "r2r.fmul.d",
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UnassignedOpCode(pub u8);

impl Display for UnassignedOpCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unassigned opcode 0x{:02X}", self.0)
    }
}

impl std::error::Error for UnassignedOpCode {}

impl TryFrom<u8> for OpCode {
    type Error = UnassignedOpCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::LAST as u8 {
            return Err(UnassignedOpCode(value));
        }
        // Safety: discriminants are dense from 0 up to and including `LAST`
        Ok(unsafe { std::mem::transmute::<u8, Self>(value) })
    }
}
