use bimap::BiMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::mode::{AddrMode, Modes};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Mnemonic {
    Mov,
    Cmp,
    Add,
    Sub,
    Lea,
    Clr,
    Not,
    Inc,
    Dec,
    Jmp,
    Bne,
    Jsr,
    Red,
    Prn,
    Rts,
    Stop,
}

static OP_STR: Lazy<BiMap<Mnemonic, &'static str>> = Lazy::new(|| {
    let mut map: BiMap<Mnemonic, &'static str> = BiMap::new();
    map.insert(Mnemonic::Mov, "mov");
    map.insert(Mnemonic::Cmp, "cmp");
    map.insert(Mnemonic::Add, "add");
    map.insert(Mnemonic::Sub, "sub");
    map.insert(Mnemonic::Lea, "lea");
    map.insert(Mnemonic::Clr, "clr");
    map.insert(Mnemonic::Not, "not");
    map.insert(Mnemonic::Inc, "inc");
    map.insert(Mnemonic::Dec, "dec");
    map.insert(Mnemonic::Jmp, "jmp");
    map.insert(Mnemonic::Bne, "bne");
    map.insert(Mnemonic::Jsr, "jsr");
    map.insert(Mnemonic::Red, "red");
    map.insert(Mnemonic::Prn, "prn");
    map.insert(Mnemonic::Rts, "rts");
    map.insert(Mnemonic::Stop, "stop");
    map
});

impl Mnemonic {
    pub const ALL: [Mnemonic; 16] = [
        Mnemonic::Mov,
        Mnemonic::Cmp,
        Mnemonic::Add,
        Mnemonic::Sub,
        Mnemonic::Lea,
        Mnemonic::Clr,
        Mnemonic::Not,
        Mnemonic::Inc,
        Mnemonic::Dec,
        Mnemonic::Jmp,
        Mnemonic::Bne,
        Mnemonic::Jsr,
        Mnemonic::Red,
        Mnemonic::Prn,
        Mnemonic::Rts,
        Mnemonic::Stop,
    ];

    pub fn parse(s: &str) -> Result<Mnemonic, String> {
        if let Some(mnemonic) = OP_STR.get_by_right(s) {
            Ok(*mnemonic)
        } else {
            Err(format!("Unknown Operation Name: `{}`", s))
        }
    }

    pub fn name(&self) -> &'static str {
        OP_STR.get_by_left(self).copied().unwrap_or("???")
    }

    /// Inverse of `(opcode, funct)`, used when decoding a finished word.
    pub fn from_code(opcode: u8, funct: u8) -> Option<Mnemonic> {
        Mnemonic::ALL
            .into_iter()
            .find(|m| m.opcode() == opcode && m.funct() == funct)
    }
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ----------------------------------------------------------------------------
// Operand slots

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Source,
    Destination,
}

impl Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Source => write!(f, "source"),
            Slot::Destination => write!(f, "destination"),
        }
    }
}

// ----------------------------------------------------------------------------
// Catalog

/// Encoding and operand rules of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub opcode: u8,
    pub funct: u8,
    pub arity: usize,
    pub src: Modes,
    pub dst: Modes,
}

const IMM: AddrMode = AddrMode::Immediate;
const DIR: AddrMode = AddrMode::Direct;
const REL: AddrMode = AddrMode::Relative;
const REG: AddrMode = AddrMode::Register;

const fn info(opcode: u8, funct: u8, arity: usize, src: &[AddrMode], dst: &[AddrMode]) -> OpInfo {
    OpInfo {
        opcode,
        funct,
        arity,
        src: Modes::of(src),
        dst: Modes::of(dst),
    }
}

impl Mnemonic {
    pub fn info(&self) -> OpInfo {
        use Mnemonic::*;
        match self {
            Mov => info(0, 0, 2, &[IMM, DIR, REG], &[DIR, REG]),
            Cmp => info(1, 0, 2, &[IMM, DIR, REG], &[IMM, DIR, REG]),
            Add => info(2, 1, 2, &[IMM, DIR, REG], &[DIR, REG]),
            Sub => info(2, 2, 2, &[IMM, DIR, REG], &[DIR, REG]),
            Lea => info(4, 0, 2, &[DIR], &[DIR, REG]),
            Clr => info(5, 1, 1, &[], &[DIR, REG]),
            Not => info(5, 2, 1, &[], &[DIR, REG]),
            Inc => info(5, 3, 1, &[], &[DIR, REG]),
            Dec => info(5, 4, 1, &[], &[DIR, REG]),
            Jmp => info(9, 1, 1, &[], &[DIR, REL]),
            Bne => info(9, 2, 1, &[], &[DIR, REL]),
            Jsr => info(9, 3, 1, &[], &[DIR, REL]),
            Red => info(12, 0, 1, &[], &[DIR, REG]),
            Prn => info(13, 0, 1, &[], &[IMM, DIR, REG]),
            Rts => info(14, 0, 0, &[], &[]),
            Stop => info(15, 0, 0, &[], &[]),
        }
    }

    pub fn opcode(&self) -> u8 {
        self.info().opcode
    }

    pub fn funct(&self) -> u8 {
        self.info().funct
    }

    pub fn arity(&self) -> usize {
        self.info().arity
    }

    /// Legal modes of a slot. The source slot only exists for two-operand instructions.
    pub fn legal(&self, slot: Slot) -> Modes {
        match slot {
            Slot::Source => self.info().src,
            Slot::Destination => self.info().dst,
        }
    }
}

impl OpInfo {
    /// Operand rules shared by every mnemonic with this opcode.
    pub fn by_opcode(opcode: u8) -> Option<OpInfo> {
        Mnemonic::ALL
            .into_iter()
            .map(|m| m.info())
            .find(|info| info.opcode == opcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        for m in Mnemonic::ALL {
            assert_eq!(Mnemonic::parse(m.name()), Ok(m));
        }
        assert!(Mnemonic::parse("hoge").is_err());
        assert!(Mnemonic::parse("MOV").is_err());
    }

    #[test]
    fn codes_are_unique() {
        for m in Mnemonic::ALL {
            assert_eq!(Mnemonic::from_code(m.opcode(), m.funct()), Some(m));
        }
        assert_eq!(Mnemonic::from_code(3, 0), None);
    }

    #[test]
    fn arity_by_opcode() {
        assert_eq!(OpInfo::by_opcode(0).map(|i| i.arity), Some(2));
        assert_eq!(OpInfo::by_opcode(9).map(|i| i.arity), Some(1));
        assert_eq!(OpInfo::by_opcode(15).map(|i| i.arity), Some(0));
        assert_eq!(OpInfo::by_opcode(3), None);
    }

    macro_rules! test_legal {
        ($($name:ident: $op:expr, $slot:expr => [$($ok:ident),*] not [$($ng:ident),*],)*) => {
            $(
                #[test]
                fn $name() {
                    let modes = $op.legal($slot);
                    $(assert!(modes.contains(AddrMode::$ok), "{} should allow {}", $op, AddrMode::$ok);)*
                    $(assert!(!modes.contains(AddrMode::$ng), "{} should reject {}", $op, AddrMode::$ng);)*
                }
            )*
        }
    }

    test_legal! {
        legal_mov_src: Mnemonic::Mov, Slot::Source => [Immediate, Direct, Register] not [Relative],
        legal_mov_dst: Mnemonic::Mov, Slot::Destination => [Direct, Register] not [Immediate, Relative],
        legal_cmp_dst: Mnemonic::Cmp, Slot::Destination => [Immediate, Direct, Register] not [Relative],
        legal_lea_src: Mnemonic::Lea, Slot::Source => [Direct] not [Immediate, Relative, Register],
        legal_inc_dst: Mnemonic::Inc, Slot::Destination => [Direct, Register] not [Immediate, Relative],
        legal_jmp_dst: Mnemonic::Jmp, Slot::Destination => [Direct, Relative] not [Immediate, Register],
        legal_prn_dst: Mnemonic::Prn, Slot::Destination => [Immediate, Direct, Register] not [Relative],
        legal_rts_dst: Mnemonic::Rts, Slot::Destination => [] not [Immediate, Direct, Relative, Register],
        legal_clr_src: Mnemonic::Clr, Slot::Source => [] not [Immediate, Direct, Relative, Register],
    }
}
