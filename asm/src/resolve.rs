use arch::{
    mode::AddrMode,
    word::{Are, ExtWord},
};

use crate::{
    config::Config,
    error::{Error, Fatal},
    msg::Msgs,
    parser::Line,
    scan::ScanResult,
    store::{PendingWord, Store},
};

/// A fully resolved file, ready for the emitter.
#[derive(Debug)]
pub struct Assembly {
    pub lines: Vec<Line>,
    pub store: Store,
    pub ic: u32,
    pub dc: u32,
    pub msgs: Msgs,
}

impl Assembly {
    /// No error was recorded in either pass.
    pub fn is_ok(&self) -> bool {
        !self.msgs.has_error()
    }
}

/// Second pass: fills in entry addresses and every pending word.
pub fn resolve(scan: ScanResult, config: &Config) -> Result<Assembly, Fatal> {
    let ScanResult {
        lines,
        store,
        ic,
        dc,
        msgs,
    } = scan;
    let mut resolver = Resolver {
        compat: config.compat,
        lines: &lines,
        store,
        msgs,
    };
    resolver.extern_conflicts();
    resolver.entries();
    for pending in resolver.store.take_pending() {
        if let Err(err) = resolver.pending(&pending) {
            return Err(Fatal {
                err,
                msgs: resolver.msgs,
            });
        }
    }
    let Resolver { store, msgs, .. } = resolver;
    log::debug!(
        "resolve: entries={} extern uses={} errors={}",
        store.entries().iter().filter(|e| e.address.is_some()).count(),
        store.externs().iter().filter(|e| e.address.is_some()).count(),
        msgs.error_count()
    );
    Ok(Assembly {
        lines,
        store,
        ic,
        dc,
        msgs,
    })
}

struct Resolver<'a> {
    compat: bool,
    lines: &'a [Line],
    store: Store,
    msgs: Msgs,
}

impl<'a> Resolver<'a> {
    /// An error by default, a warning in compat mode.
    fn soft_error(&mut self, err: Error, line: usize) {
        let line = &self.lines[line];
        if self.compat {
            self.msgs.warn(err, line);
        } else {
            self.msgs.error(err, line);
        }
    }

    fn extern_conflicts(&mut self) {
        let defined: Vec<(String, usize)> = self
            .store
            .externs()
            .iter()
            .filter(|e| e.address.is_none() && self.store.symbol(&e.symbol).is_some())
            .map(|e| (e.symbol.clone(), e.line))
            .collect();
        for (symbol, line) in defined {
            self.msgs
                .error(Error::ExternDefined(symbol), &self.lines[line]);
        }
    }

    fn entries(&mut self) {
        for idx in 0..self.store.entries().len() {
            let entry = &self.store.entries()[idx];
            let (label, line) = (entry.label.clone(), entry.line);
            if self.store.is_external(&label) {
                self.msgs
                    .error(Error::ExternEntry(label), &self.lines[line]);
                continue;
            }
            match self.store.symbol(&label).map(|sym| sym.address) {
                Some(address) => self.store.entries_mut()[idx].address = Some(address),
                None => self.soft_error(Error::UndefinedEntry(label), line),
            }
        }
    }

    fn pending(&mut self, pending: &PendingWord) -> Result<(), Error> {
        let target = self.store.symbol(&pending.label).map(|sym| sym.address);
        let word = match pending.mode {
            AddrMode::Relative => {
                let target = match target {
                    Some(address) => Some(address as i64),
                    None if self.store.is_external(&pending.label) => self.fallback(
                        Error::RelativeExtern(pending.label.clone()),
                        pending.line,
                    ),
                    None => self.fallback(
                        Error::UndefinedLabel(pending.label.clone()),
                        pending.line,
                    ),
                };
                target.map(|t| ExtWord::signed(t - (pending.address as i64 + 1), Are::Absolute))
            }
            _ if self.store.is_external(&pending.label) => {
                self.store
                    .use_extern(&pending.label, pending.address, pending.line);
                Some(ExtWord::new(0, Are::External))
            }
            _ => match target {
                Some(address) => Some(ExtWord::new(address, Are::Relocatable)),
                None => self
                    .fallback(Error::UndefinedLabel(pending.label.clone()), pending.line)
                    .map(|t| ExtWord::signed(t, Are::Relocatable)),
            },
        };
        log::trace!("{:04} {} {:?} -> {:?}", pending.address, pending.label, pending.mode, word);

        // Checked even when unresolved: a bad address means the passes disagree.
        let slot = self.store.word_mut(pending.address)?;
        if let Some(word) = word {
            slot.value = word.to_bin();
        }
        Ok(())
    }

    /// Address an unresolvable label stands for in legacy mode.
    fn fallback(&mut self, err: Error, line: usize) -> Option<i64> {
        self.soft_error(err, line);
        self.compat.then_some(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;

    fn run_with(src: &str, config: &Config) -> Assembly {
        let lines = Line::split("t.am", src);
        resolve(scan(lines, config).unwrap(), config).unwrap()
    }

    fn run(src: &str) -> Assembly {
        run_with(src, &Config::default())
    }

    fn compat() -> Config {
        Config {
            compat: true,
            ..Config::default()
        }
    }

    fn word(asm: &Assembly, address: u32) -> ExtWord {
        let bin = asm.store.objects()[(address - 100) as usize].value;
        ExtWord::from_bin(bin).unwrap()
    }

    #[test]
    fn relative_distance() {
        // LOOP at 102, `jmp &LOOP` first word at 106, extension at 107
        let asm = run("mov r1, r2\nstop\nLOOP: stop\nrts\nrts\nrts\njmp &LOOP\n");
        assert!(asm.is_ok());
        assert_eq!(asm.store.symbol("LOOP").unwrap().address, 102);
        let ext = word(&asm, 107);
        assert_eq!(ext.value, (1 << 21) - 6);
        assert_eq!(ext.are, Are::Absolute);
        assert_eq!(ext.to_signed(), -6);
    }

    #[test]
    fn direct_is_relocatable() {
        let asm = run("prn X\nstop\nX: .data 4\n");
        assert!(asm.is_ok());
        let ext = word(&asm, 101);
        assert_eq!((ext.value, ext.are), (103, Are::Relocatable));
    }

    #[test]
    fn external_reference() {
        let asm = run(".extern W\nprn W\njsr W\nprn W\n");
        assert!(asm.is_ok());
        for address in [101, 103, 105] {
            assert_eq!(word(&asm, address), ExtWord::new(0, Are::External));
        }
        let uses: Vec<u32> = asm
            .store
            .externs()
            .iter()
            .filter_map(|e| e.address)
            .collect();
        assert_eq!(uses, vec![101, 103, 105]);
    }

    #[test]
    fn entries_resolve() {
        let asm = run(".entry MAIN\nMAIN: stop\n");
        assert!(asm.is_ok());
        assert_eq!(asm.store.entries()[0].address, Some(100));
    }

    #[test]
    fn undefined_label() {
        let asm = run("prn NOPE\n");
        assert_eq!(asm.msgs.error_count(), 1);
        assert_eq!(asm.store.objects()[1].value, 0);

        let asm = run_with("prn NOPE\n", &compat());
        assert!(asm.is_ok());
        let ext = word(&asm, 101);
        assert_eq!((ext.value, ext.are), (0x1F_FFFF, Are::Relocatable));
    }

    #[test]
    fn undefined_entry() {
        let asm = run(".entry GHOST\nstop\n");
        assert_eq!(asm.msgs.error_count(), 1);

        let asm = run_with(".entry GHOST\nstop\n", &compat());
        assert!(asm.is_ok());
        assert_eq!(asm.store.entries()[0].address, None);
    }

    #[test]
    fn relative_to_extern() {
        let asm = run(".extern W\njmp &W\n");
        assert!(matches!(
            asm.msgs.iter().next().map(|m| &m.err),
            Some(Error::RelativeExtern(_))
        ));
        assert!(asm.store.externs().iter().all(|e| e.address.is_none()));
    }

    #[test]
    fn extern_conflicts_are_errors_in_both_modes() {
        let src = ".extern A\nA: stop\n.entry W\n.extern W\n";
        for config in [Config::default(), compat()] {
            let asm = run_with(src, &config);
            assert_eq!(asm.msgs.error_count(), 2);
        }
    }
}
