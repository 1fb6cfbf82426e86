use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::reg::Reg;

/// Operand addressing mode, numbered by its 2-bit field value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
)]
#[repr(u8)]
pub enum AddrMode {
    #[default]
    #[strum(serialize = "immediate")]
    Immediate = 0,
    #[strum(serialize = "direct")]
    Direct = 1,
    #[strum(serialize = "relative")]
    Relative = 2,
    #[strum(serialize = "register-direct")]
    Register = 3,
}

impl AddrMode {
    pub const ALL: [AddrMode; 4] = [
        AddrMode::Immediate,
        AddrMode::Direct,
        AddrMode::Relative,
        AddrMode::Register,
    ];

    pub fn bits(self) -> u8 {
        self.into()
    }
}

// ----------------------------------------------------------------------------
// Set of addressing modes

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modes(u8);

impl Modes {
    pub const NONE: Modes = Modes(0);

    pub const fn of(modes: &[AddrMode]) -> Modes {
        let mut bits = 0;
        let mut i = 0;
        while i < modes.len() {
            bits |= 1 << (modes[i] as u8);
            i += 1;
        }
        Modes(bits)
    }

    pub fn contains(self, mode: AddrMode) -> bool {
        self.0 & (1 << mode.bits()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = AddrMode> {
        AddrMode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl std::fmt::Display for Modes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = self.iter().map(|m| m.to_string()).collect();
        write!(f, "{}", names.join(", "))
    }
}

// ----------------------------------------------------------------------------
// Operand

/// A raw operand token split into its addressing mode and payload.
/// Immediate keeps the text after `#`, Relative the label after `&`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    Immediate(&'a str),
    Direct(&'a str),
    Relative(&'a str),
    Register(Reg),
}

impl<'a> Operand<'a> {
    pub fn classify(token: &'a str) -> Operand<'a> {
        if let Some(imm) = token.strip_prefix('#') {
            return Operand::Immediate(imm);
        }
        if let Some(label) = token.strip_prefix('&') {
            return Operand::Relative(label);
        }
        match Reg::parse(token) {
            Ok(reg) => Operand::Register(reg),
            Err(_) => Operand::Direct(token),
        }
    }

    pub fn mode(&self) -> AddrMode {
        match self {
            Operand::Immediate(_) => AddrMode::Immediate,
            Operand::Direct(_) => AddrMode::Direct,
            Operand::Relative(_) => AddrMode::Relative,
            Operand::Register(_) => AddrMode::Register,
        }
    }

    /// Register index folded into the instruction word, 0 for other modes.
    pub fn reg(&self) -> Reg {
        match self {
            Operand::Register(reg) => *reg,
            _ => Reg::R0,
        }
    }
}
