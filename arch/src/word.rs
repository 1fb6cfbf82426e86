use color_print::cformat;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::{mode::AddrMode, op::Mnemonic, reg::Reg};

/// First address handed out to code and data.
pub const MEMORY_BASE: u32 = 100;
/// Number of addressable words (21-bit address space).
pub const MEMORY_SIZE: u32 = 1 << 21;

pub const WORD_MASK: u32 = 0xFF_FFFF;
pub const VALUE_BITS: u32 = 21;
pub const VALUE_MASK: u32 = (1 << VALUE_BITS) - 1;

// ----------------------------------------------------------------------------
// Field layouts

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub shift: u32,
    pub mask: u32,
}

impl Field {
    const fn new(shift: u32, width: u32) -> Field {
        Field {
            shift,
            mask: (1 << width) - 1,
        }
    }

    pub const fn put(self, value: u32) -> u32 {
        (value & self.mask) << self.shift
    }

    pub const fn get(self, bin: u32) -> u32 {
        (bin >> self.shift) & self.mask
    }
}

/// Instruction word, bit 0 first:
/// `E | R | A | funct(4) | dst_mode(2) | dst_reg(3) | src_mode(2) | src_reg(3) | opcode(4) | unused(3)`
pub struct InstLayout;

impl InstLayout {
    pub const E: Field = Field::new(0, 1);
    pub const R: Field = Field::new(1, 1);
    pub const A: Field = Field::new(2, 1);
    pub const FUNCT: Field = Field::new(3, 4);
    pub const DST_MODE: Field = Field::new(7, 2);
    pub const DST_REG: Field = Field::new(9, 3);
    pub const SRC_MODE: Field = Field::new(12, 2);
    pub const SRC_REG: Field = Field::new(14, 3);
    pub const OPCODE: Field = Field::new(17, 4);
    pub const UNUSED: Field = Field::new(21, 3);
}

/// Extension word: `E | R | A | value(21)`
pub struct ExtLayout;

impl ExtLayout {
    pub const E: Field = Field::new(0, 1);
    pub const R: Field = Field::new(1, 1);
    pub const A: Field = Field::new(2, 1);
    pub const VALUE: Field = Field::new(3, VALUE_BITS);
}

// ----------------------------------------------------------------------------
// A/R/E

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
pub enum Are {
    Absolute = 0b100,
    Relocatable = 0b010,
    External = 0b001,
}

impl Are {
    pub fn bits(self) -> u32 {
        u8::from(self) as u32
    }

    /// Reads the low three bits; anything but exactly one flag is `None`.
    pub fn from_bits(bin: u32) -> Option<Are> {
        Are::try_from((bin & 0b111) as u8).ok()
    }

    pub fn letter(self) -> char {
        match self {
            Are::Absolute => 'A',
            Are::Relocatable => 'R',
            Are::External => 'E',
        }
    }
}

// ----------------------------------------------------------------------------
// Instruction word

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstWord {
    pub opcode: u8,
    pub funct: u8,
    pub src_mode: AddrMode,
    pub src_reg: Reg,
    pub dst_mode: AddrMode,
    pub dst_reg: Reg,
    pub are: Are,
}

impl InstWord {
    pub fn to_bin(&self) -> u32 {
        InstLayout::OPCODE.put(self.opcode as u32)
            | InstLayout::SRC_REG.put(self.src_reg.index() as u32)
            | InstLayout::SRC_MODE.put(self.src_mode.bits() as u32)
            | InstLayout::DST_REG.put(self.dst_reg.index() as u32)
            | InstLayout::DST_MODE.put(self.dst_mode.bits() as u32)
            | InstLayout::FUNCT.put(self.funct as u32)
            | self.are.bits()
    }

    pub fn from_bin(bin: u32) -> Option<InstWord> {
        if bin & !WORD_MASK != 0 || InstLayout::UNUSED.get(bin) != 0 {
            return None;
        }
        Some(InstWord {
            opcode: InstLayout::OPCODE.get(bin) as u8,
            funct: InstLayout::FUNCT.get(bin) as u8,
            src_mode: AddrMode::try_from(InstLayout::SRC_MODE.get(bin) as u8).ok()?,
            src_reg: Reg::try_from(InstLayout::SRC_REG.get(bin) as u8).ok()?,
            dst_mode: AddrMode::try_from(InstLayout::DST_MODE.get(bin) as u8).ok()?,
            dst_reg: Reg::try_from(InstLayout::DST_REG.get(bin) as u8).ok()?,
            are: Are::from_bits(bin)?,
        })
    }

    pub fn cformat(&self) -> String {
        let name = match Mnemonic::from_code(self.opcode, self.funct) {
            Some(m) => cformat!("<r>{:<4}</>", m.name()),
            None => cformat!("<r,s>{:<4}</>", "????"),
        };
        cformat!(
            "{} <b>src={}:{} dst={}:{}</> <m>{}</>",
            name,
            self.src_mode.bits(),
            self.src_reg,
            self.dst_mode.bits(),
            self.dst_reg,
            self.are.letter()
        )
    }
}

// ----------------------------------------------------------------------------
// Extension word

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtWord {
    pub value: u32,
    pub are: Are,
}

impl ExtWord {
    pub fn new(value: u32, are: Are) -> ExtWord {
        ExtWord {
            value: value & VALUE_MASK,
            are,
        }
    }

    /// Two's complement into 21 bits: negative values wrap to `value + 2^21`.
    pub fn signed(value: i64, are: Are) -> ExtWord {
        ExtWord::new(value.rem_euclid(1 << VALUE_BITS) as u32, are)
    }

    pub fn to_signed(&self) -> i64 {
        if self.value & (1 << (VALUE_BITS - 1)) != 0 {
            self.value as i64 - (1 << VALUE_BITS)
        } else {
            self.value as i64
        }
    }

    pub fn to_bin(&self) -> u32 {
        ExtLayout::VALUE.put(self.value) | self.are.bits()
    }

    pub fn from_bin(bin: u32) -> Option<ExtWord> {
        if bin & !WORD_MASK != 0 {
            return None;
        }
        Some(ExtWord {
            value: ExtLayout::VALUE.get(bin),
            are: Are::from_bits(bin)?,
        })
    }

    pub fn cformat(&self) -> String {
        cformat!("<y>{:>8}</> <m>{}</>", self.to_signed(), self.are.letter())
    }
}
