use arch::{
    mode::{AddrMode, Operand},
    op::{Mnemonic, Slot},
    reg::{looks_like_register, Reg},
    word::{Are, ExtWord, InstWord},
};

use crate::{error::Error, ident, parser::tokens};

/// One word of an encoded instruction, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Fully encoded now.
    Word(u32),
    /// Placeholder whose value depends on `label`.
    Deferred { label: String, mode: AddrMode },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub op: Mnemonic,
    pub parts: Vec<Part>,
}

/// Validates and encodes one instruction. Nothing is produced on error, so
/// a rejected line never leaves partial words behind.
pub fn encode(name: &str, operands: &str) -> Result<Encoded, Error> {
    let op = Mnemonic::parse(name).map_err(|_| Error::UnknownOperation(name.to_string()))?;
    let args = tokens(operands);
    if args.len() != op.arity() {
        return Err(Error::OperandCount {
            op: name.to_string(),
            expected: op.arity(),
            got: args.len(),
        });
    }

    let (src, dst) = match args.as_slice() {
        [src, dst] => (Some(check(op, Slot::Source, src)?), Some(check(op, Slot::Destination, dst)?)),
        [dst] => (None, Some(check(op, Slot::Destination, dst)?)),
        _ => (None, None),
    };

    let word = InstWord {
        opcode: op.opcode(),
        funct: op.funct(),
        src_mode: src.map(|o| o.mode()).unwrap_or_default(),
        src_reg: src.map(|o| o.reg()).unwrap_or_default(),
        dst_mode: dst.map(|o| o.mode()).unwrap_or_default(),
        dst_reg: dst.map(|o| o.reg()).unwrap_or_default(),
        are: Are::Absolute,
    };

    let mut parts = vec![Part::Word(word.to_bin())];
    for operand in [src, dst].into_iter().flatten() {
        match operand {
            Operand::Register(_) => {}
            Operand::Immediate(text) => {
                let value = parse_immediate(text)?;
                parts.push(Part::Word(ExtWord::signed(value, Are::Absolute).to_bin()));
            }
            Operand::Direct(label) | Operand::Relative(label) => parts.push(Part::Deferred {
                label: label.to_string(),
                mode: operand.mode(),
            }),
        }
    }
    Ok(Encoded { op, parts })
}

/// Classifies `token` for `slot`, rejecting illegal modes and malformed payloads.
fn check<'a>(op: Mnemonic, slot: Slot, token: &'a str) -> Result<Operand<'a>, Error> {
    let operand = Operand::classify(token);
    let allowed = op.legal(slot);
    if !allowed.contains(operand.mode()) {
        return Err(Error::IllegalMode {
            op: op.name().to_string(),
            slot,
            mode: operand.mode(),
            allowed,
        });
    }
    match operand {
        Operand::Immediate(text) => {
            parse_immediate(text)?;
        }
        Operand::Direct(label) | Operand::Relative(label) => {
            if looks_like_register(label) && Reg::parse(label).is_err() {
                return Err(Error::InvalidRegister(label.to_string()));
            }
            ident::check_label(label)?;
        }
        Operand::Register(_) => {}
    }
    Ok(operand)
}

fn parse_immediate(text: &str) -> Result<i64, Error> {
    text.parse::<i32>()
        .map(i64::from)
        .map_err(|_| Error::InvalidImmediate(format!("#{text}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(name: &str, operands: &str) -> Vec<Part> {
        encode(name, operands).unwrap().parts
    }

    #[test]
    fn mnemonic_is_reported() {
        assert_eq!(encode("bne", "&L").unwrap().op, Mnemonic::Bne);
        assert_eq!(encode("stop", "").unwrap().op, Mnemonic::Stop);
    }

    #[test]
    fn mov_imm_reg() {
        assert_eq!(
            words("mov", "#5, r2"),
            vec![Part::Word(0x000584), Part::Word((5 << 3) | 0b100)]
        );
    }

    #[test]
    fn negative_immediate() {
        let parts = words("prn", "#-1");
        assert_eq!(parts[1], Part::Word((0x1F_FFFF << 3) | 0b100));
    }

    #[test]
    fn register_operands_need_no_extension() {
        assert_eq!(words("add", "r1, r7").len(), 1);
        assert_eq!(words("clr", "r3").len(), 1);
        assert_eq!(words("stop", "").len(), 1);
    }

    #[test]
    fn labels_are_deferred() {
        let parts = words("lea", "STR, r6");
        assert_eq!(
            parts[1],
            Part::Deferred {
                label: "STR".to_string(),
                mode: AddrMode::Direct
            }
        );
        let parts = words("jmp", "&LOOP");
        assert_eq!(
            parts[1],
            Part::Deferred {
                label: "LOOP".to_string(),
                mode: AddrMode::Relative
            }
        );
    }

    #[test]
    fn word_count_matches_modes() {
        for (src, dst, expected) in [
            ("r1", "r2", 1),
            ("#1", "r2", 2),
            ("r1", "X", 2),
            ("#1", "X", 3),
            ("Y", "X", 3),
        ] {
            assert_eq!(words("cmp", &format!("{src}, {dst}")).len(), expected);
        }
    }

    #[test]
    fn unused_slots_are_zero() {
        let Part::Word(bin) = words("rts", "")[0].clone() else {
            panic!("first part must be a word");
        };
        assert_eq!(bin, (14 << 17) | 0b100);
    }

    macro_rules! test_reject {
        ($($name:ident: $op:expr, $args:expr => $pat:pat,)*) => {
            $(
                #[test]
                fn $name() {
                    let result = encode($op, $args);
                    assert!(matches!(result, Err($pat)), "{:?}", result);
                }
            )*
        }
    }

    test_reject! {
        reject_unknown: "move", "r1, r2" => Error::UnknownOperation(_),
        reject_too_many: "mov", "r1, r2, r3" => Error::OperandCount { expected: 2, got: 3, .. },
        reject_too_few: "inc", "" => Error::OperandCount { expected: 1, got: 0, .. },
        reject_rts_operand: "rts", "r1" => Error::OperandCount { expected: 0, got: 1, .. },
        reject_inc_imm: "inc", "#3" => Error::IllegalMode { slot: Slot::Destination, mode: AddrMode::Immediate, .. },
        reject_lea_src_reg: "lea", "r1, r2" => Error::IllegalMode { slot: Slot::Source, .. },
        reject_mov_relative: "mov", "&X, r1" => Error::IllegalMode { mode: AddrMode::Relative, .. },
        reject_jmp_reg: "jmp", "r1" => Error::IllegalMode { mode: AddrMode::Register, .. },
        reject_bad_register: "clr", "r8" => Error::InvalidRegister(_),
        reject_bad_immediate: "prn", "#abc" => Error::InvalidImmediate(_),
        reject_bad_label: "clr", "9lives" => Error::InvalidLabel(_),
        reject_reserved_label: "clr", "stop" => Error::ReservedLabel(_),
    }
}
