/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */

//! Effective address mode byte layout.
//!
//! The high nibble selects the family, the low nibble is either a register number
//! or a family specific sub-mode.

pub const FAMILY_SHIFT: u8 = 4;
pub const LOW_NIBBLE: u8 = 0x0F;

/// Scale and width of the index register in the indexed families.
pub const INDEX_SCALE_MASK: u8 = 0b0011;
pub const INDEX_WIDTH_SHIFT: u8 = 2;

/// Same-as-destination operand, only meaningful for a source.
pub const SAME_AS_DESTINATION: u8 = 0xD0;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EaFamily {
    RegisterDirect = 0x0,
    FloatRegisterDirect = 0x1,
    RegisterIndirect = 0x2,
    PostIncrement = 0x3,
    PostDecrement = 0x4,
    PreIncrement = 0x5,
    PreDecrement = 0x6,
    IndirectDisplacement = 0x7,
    Indexed = 0x8,
    IndexedDisplacement = 0x9,
    PcIndexed = 0xA,
    PcIndexedDisplacement = 0xB,
    Other = 0xC,
    SameAsDestination = 0xD,
    Reserved0 = 0xE,
    Reserved1 = 0xF,
}

impl EaFamily {
    #[must_use]
    pub const fn from_mode(mode: u8) -> Self {
        match mode >> FAMILY_SHIFT {
            0x0 => Self::RegisterDirect,
            0x1 => Self::FloatRegisterDirect,
            0x2 => Self::RegisterIndirect,
            0x3 => Self::PostIncrement,
            0x4 => Self::PostDecrement,
            0x5 => Self::PreIncrement,
            0x6 => Self::PreDecrement,
            0x7 => Self::IndirectDisplacement,
            0x8 => Self::Indexed,
            0x9 => Self::IndexedDisplacement,
            0xA => Self::PcIndexed,
            0xB => Self::PcIndexedDisplacement,
            0xC => Self::Other,
            0xD => Self::SameAsDestination,
            0xE => Self::Reserved0,
            _ => Self::Reserved1,
        }
    }

    /// Families that move the base register and are allowed for `savem`/`loadm`.
    #[must_use]
    pub const fn is_stepping(self) -> bool {
        matches!(
            self,
            Self::PostIncrement | Self::PostDecrement | Self::PreIncrement | Self::PreDecrement
        )
    }

    #[must_use]
    pub const fn mode(self, low: u8) -> u8 {
        ((self as u8) << FAMILY_SHIFT) | (low & LOW_NIBBLE)
    }
}

/// Width of the index register, sign extended before scaling.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexWidth {
    Byte = 0,
    Word = 1,
    Long = 2,
    Quad = 3,
}

impl IndexWidth {
    #[must_use]
    pub const fn from_submode(submode: u8) -> Self {
        match (submode >> INDEX_WIDTH_SHIFT) & 0b11 {
            0 => Self::Byte,
            1 => Self::Word,
            2 => Self::Long,
            _ => Self::Quad,
        }
    }
}

/// Builds the low nibble of an indexed mode.
#[must_use]
pub const fn index_submode(width: IndexWidth, scale_shift: u8) -> u8 {
    ((width as u8) << INDEX_WIDTH_SHIFT) | (scale_shift & INDEX_SCALE_MASK)
}

/// Sub-modes of the `Other` family.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OtherMode {
    /// Small integer 0-8 encoded in the mode byte itself.
    SmallInteger(u8),
    ImmediateByte,
    ImmediateWord,
    ImmediateLong,
    ImmediateQuad,
    ImmediateSingle,
    ImmediateDouble,
    /// 32-bit displacement from the program counter after the displacement.
    PcDisplacement,
}

pub const SMALL_INTEGER_MAX: u8 = 8;
pub const OTHER_IMMEDIATE_BYTE: u8 = 9;
pub const OTHER_IMMEDIATE_WORD: u8 = 10;
pub const OTHER_IMMEDIATE_LONG: u8 = 11;
pub const OTHER_IMMEDIATE_QUAD: u8 = 12;
pub const OTHER_IMMEDIATE_SINGLE: u8 = 13;
pub const OTHER_IMMEDIATE_DOUBLE: u8 = 14;
pub const OTHER_PC_DISPLACEMENT: u8 = 15;

impl OtherMode {
    #[must_use]
    pub const fn from_submode(submode: u8) -> Self {
        match submode & LOW_NIBBLE {
            OTHER_IMMEDIATE_BYTE => Self::ImmediateByte,
            OTHER_IMMEDIATE_WORD => Self::ImmediateWord,
            OTHER_IMMEDIATE_LONG => Self::ImmediateLong,
            OTHER_IMMEDIATE_QUAD => Self::ImmediateQuad,
            OTHER_IMMEDIATE_SINGLE => Self::ImmediateSingle,
            OTHER_IMMEDIATE_DOUBLE => Self::ImmediateDouble,
            OTHER_PC_DISPLACEMENT => Self::PcDisplacement,
            small => Self::SmallInteger(small),
        }
    }

    #[must_use]
    pub const fn submode(self) -> u8 {
        match self {
            Self::SmallInteger(value) => value,
            Self::ImmediateByte => OTHER_IMMEDIATE_BYTE,
            Self::ImmediateWord => OTHER_IMMEDIATE_WORD,
            Self::ImmediateLong => OTHER_IMMEDIATE_LONG,
            Self::ImmediateQuad => OTHER_IMMEDIATE_QUAD,
            Self::ImmediateSingle => OTHER_IMMEDIATE_SINGLE,
            Self::ImmediateDouble => OTHER_IMMEDIATE_DOUBLE,
            Self::PcDisplacement => OTHER_PC_DISPLACEMENT,
        }
    }

    /// Number of extension bytes that follow the mode byte.
    #[must_use]
    pub const fn extension_size(self) -> usize {
        match self {
            Self::SmallInteger(_) => 0,
            Self::ImmediateByte => 1,
            Self::ImmediateWord => 2,
            Self::ImmediateLong | Self::ImmediateSingle | Self::PcDisplacement => 4,
            Self::ImmediateQuad | Self::ImmediateDouble => 8,
        }
    }
}
