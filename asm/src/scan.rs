use arch::word::WORD_MASK;

use crate::{
    config::Config,
    encode::{encode, Part},
    error::{Error, Fatal},
    ident,
    msg::Msgs,
    parser::{split_word, tokens, Line},
    store::{Store, WordKind},
};

/// Output of the first pass, and the only thing the resolver accepts.
#[derive(Debug)]
pub struct ScanResult {
    pub lines: Vec<Line>,
    pub store: Store,
    /// Instruction words emitted.
    pub ic: u32,
    /// Data words emitted.
    pub dc: u32,
    pub msgs: Msgs,
}

/// First pass over expanded source. Recoverable problems land in `msgs`;
/// an `Err` means the file cannot be assembled at all and carries what
/// was reported up to that point.
pub fn scan(lines: Vec<Line>, config: &Config) -> Result<ScanResult, Fatal> {
    let mut scanner = Scanner {
        config,
        lines: &lines,
        store: Store::new(config.base),
        ic: 0,
        dc: 0,
        msgs: Msgs::new(),
    };
    for idx in 0..lines.len() {
        if let Err(err) = scanner.line(idx) {
            return Err(Fatal {
                err,
                msgs: scanner.msgs,
            });
        }
    }
    let Scanner {
        store, ic, dc, msgs, ..
    } = scanner;
    log::debug!(
        "scan: {} lines, ic={} dc={} symbols={} pending={}",
        lines.len(),
        ic,
        dc,
        store.symbols().count(),
        store.pending().len()
    );
    Ok(ScanResult {
        lines,
        store,
        ic,
        dc,
        msgs,
    })
}

struct Scanner<'a> {
    config: &'a Config,
    lines: &'a [Line],
    store: Store,
    ic: u32,
    dc: u32,
    msgs: Msgs,
}

impl<'a> Scanner<'a> {
    fn src(&self, idx: usize) -> &'a Line {
        &self.lines[idx]
    }

    fn line(&mut self, idx: usize) -> Result<(), Error> {
        let line = self.src(idx);
        if line.is_blank_or_comment() {
            return Ok(());
        }
        if line.len() > self.config.max_line_len {
            self.msgs
                .error(Error::LineTooLong(self.config.max_line_len), line);
            return Ok(());
        }
        log::trace!("{:>4} {:04} | {}", line.no(), self.store.next_address(), line.raw());

        let (mut word, mut rest) = split_word(line.raw());
        let mut label = None;
        if let Some(name) = word.strip_suffix(':') {
            if let Err(err) = ident::check_label(name) {
                self.msgs.error(err, line);
                return Ok(());
            }
            if self.define(idx, name) {
                label = Some(name);
            }
            (word, rest) = split_word(rest);
        }

        match word {
            "" => Ok(()),
            ".data" => self.data(idx, label, rest),
            ".string" => self.string(idx, label, rest),
            ".entry" | ".extern" => {
                self.symbol_directive(idx, word, rest);
                Ok(())
            }
            op => self.instruction(idx, op, rest),
        }
    }

    /// Registers `name` at the current address. False if it was already taken.
    fn define(&mut self, idx: usize, name: &str) -> bool {
        let line = self.src(idx);
        let address = self.store.next_address();
        let prev = match self.store.define(name, address, idx) {
            None => return true,
            Some(sym) => sym.line,
        };
        let err = Error::RedefinedLabel(name.to_string());
        if self.config.compat {
            self.msgs.warn(err, line);
        } else {
            self.msgs.error(err, line);
        }
        let prev = self.src(prev);
        self.msgs
            .note(Error::PreviousDefinition(name.to_string()), prev);
        false
    }

    fn data(&mut self, idx: usize, label: Option<&str>, rest: &str) -> Result<(), Error> {
        let line = self.src(idx);
        let values = tokens(rest);
        if values.is_empty() {
            self.msgs.error(Error::EmptyData, line);
            return Ok(());
        }
        for text in values {
            match text.parse::<i32>() {
                Ok(value) => self.data_word(idx, label, value)?,
                Err(_) => self
                    .msgs
                    .error(Error::InvalidInteger(text.to_string()), line),
            }
        }
        Ok(())
    }

    fn string(&mut self, idx: usize, label: Option<&str>, rest: &str) -> Result<(), Error> {
        let line = self.src(idx);
        let text = rest.trim();
        if text.is_empty() {
            self.msgs.error(Error::MissingString, line);
            return Ok(());
        }
        let body = match text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
        {
            Some(body) if !body.contains('"') => body,
            _ => {
                self.msgs.error(Error::InvalidString(text.to_string()), line);
                return Ok(());
            }
        };
        for c in body.chars() {
            self.data_word(idx, label, c as i32)?;
        }
        self.data_word(idx, label, 0)
    }

    fn data_word(&mut self, idx: usize, label: Option<&str>, value: i32) -> Result<(), Error> {
        self.store
            .emit(value as u32 & WORD_MASK, WordKind::Data, idx)?;
        self.dc += 1;
        if let Some(label) = label {
            self.store.push_value(label, value);
        }
        Ok(())
    }

    fn symbol_directive(&mut self, idx: usize, directive: &str, rest: &str) {
        let line = self.src(idx);
        let (name, trailing) = split_word(rest);
        if name.is_empty() {
            self.msgs
                .error(Error::MissingSymbol(directive.to_string()), line);
            return;
        }
        if let Err(err) = ident::check_label(name) {
            self.msgs.error(err, line);
            return;
        }
        let trailing = trailing.trim();
        if !trailing.is_empty() {
            self.msgs.error(
                Error::TrailingText(directive.to_string(), trailing.to_string()),
                line,
            );
            return;
        }
        if directive == ".entry" {
            self.store.declare_entry(name, idx);
        } else {
            self.store.declare_extern(name, idx);
        }
    }

    fn instruction(&mut self, idx: usize, op: &str, rest: &str) -> Result<(), Error> {
        let encoded = match encode(op, rest) {
            Ok(encoded) => encoded,
            Err(err) => {
                let line = self.src(idx);
                self.msgs.error(err, line);
                return Ok(());
            }
        };
        log::trace!("{}: {} word(s)", encoded.op, encoded.parts.len());
        for (n, part) in encoded.parts.iter().enumerate() {
            match part {
                Part::Word(bin) => {
                    let kind = if n == 0 { WordKind::Inst } else { WordKind::Ext };
                    self.store.emit(*bin, kind, idx)?;
                }
                Part::Deferred { label, mode } => {
                    self.store.defer(label, *mode, idx)?;
                }
            }
            self.ic += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::mode::AddrMode;

    fn run(src: &str) -> ScanResult {
        scan(Line::split("t.am", src), &Config::default()).unwrap()
    }

    #[test]
    fn shared_counter() {
        let r = run("MAIN: mov #5, r2\nX: .data 7,-1,3\nS: .string \"ab\"\nstop\n");
        assert_eq!((r.ic, r.dc), (3, 6));
        assert_eq!(r.store.symbol("MAIN").unwrap().address, 100);
        assert_eq!(r.store.symbol("X").unwrap().address, 102);
        assert_eq!(r.store.symbol("S").unwrap().address, 105);
        assert_eq!(r.store.symbol("X").unwrap().values, vec![7, -1, 3]);
        assert_eq!(r.store.symbol("S").unwrap().values, vec![97, 98, 0]);
        assert_eq!(r.store.objects()[3].value, 0xFF_FFFF);
        assert_eq!(r.store.next_address(), 109);
        assert!(r.msgs.is_empty());
    }

    #[test]
    fn pending_words() {
        let r = run("jmp &L\nL: lea STR, r1\n");
        let pending = r.store.pending();
        assert_eq!(pending.len(), 2);
        assert_eq!((pending[0].address, pending[0].mode), (101, AddrMode::Relative));
        assert_eq!((pending[1].address, pending[1].mode), (103, AddrMode::Direct));
        assert_eq!(pending[1].label, "STR");
    }

    #[test]
    fn bad_data_token_skips_only_itself() {
        let r = run(".data 1, x, 3\n");
        assert_eq!(r.dc, 2);
        assert_eq!(r.msgs.error_count(), 1);
    }

    #[test]
    fn malformed_string_is_skipped() {
        for src in [".string abc", ".string \"abc", ".string \"a\"b\"", ".string"] {
            let r = run(src);
            assert_eq!(r.dc, 0, "{src}");
            assert_eq!(r.msgs.error_count(), 1, "{src}");
        }
    }

    #[test]
    fn illegal_mode_emits_nothing() {
        let r = run("inc #1\n");
        assert_eq!(r.msgs.error_count(), 1);
        assert!(r.store.objects().is_empty());
    }

    #[test]
    fn long_line_is_rejected() {
        let r = run(&format!(".data {}\n", "1,".repeat(40)));
        assert_eq!(r.msgs.error_count(), 1);
        assert!(r.store.objects().is_empty());
    }

    #[test]
    fn redefinition() {
        let r = run("A: stop\nA: rts\n");
        assert_eq!(r.msgs.error_count(), 1);
        assert_eq!(r.msgs.len(), 2);
        assert_eq!(r.store.symbol("A").unwrap().address, 100);

        let cfg = Config {
            compat: true,
            ..Config::default()
        };
        let r = scan(Line::split("t.am", "A: stop\nA: rts\n"), &cfg).unwrap();
        assert!(!r.msgs.has_error());
        assert_eq!(r.store.symbol("A").unwrap().address, 100);
    }

    #[test]
    fn redefined_label_does_not_collect_values() {
        let cfg = Config {
            compat: true,
            ..Config::default()
        };
        let r = scan(Line::split("t.am", "D: .data 1\nD: .data 2\n"), &cfg).unwrap();
        assert_eq!(r.store.symbol("D").unwrap().values, vec![1]);
    }

    #[test]
    fn symbol_directives() {
        let r = run(".entry MAIN\n.extern W\n.entry\n.extern 1x\n.entry A B\n");
        assert_eq!(r.store.entries().len(), 1);
        assert_eq!(r.store.externs().len(), 1);
        assert_eq!(r.msgs.error_count(), 3);
    }

    #[test]
    fn lone_label_and_comments() {
        let r = run("; comment\n\nEND:\n   ; indented\n");
        assert!(r.msgs.is_empty());
        assert_eq!(r.store.symbol("END").unwrap().address, 100);
        assert!(r.store.objects().is_empty());
    }

    #[test]
    fn invalid_label_discards_line() {
        let r = run("1A: stop\nmov: stop\n");
        assert_eq!(r.msgs.error_count(), 2);
        assert!(r.store.objects().is_empty());
    }
}
