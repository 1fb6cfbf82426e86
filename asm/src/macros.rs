use indexmap::IndexMap;

use crate::{
    config::Config,
    error::Error,
    ident::{self, MACRO_CLOSE, MACRO_OPEN},
    msg::Msgs,
    parser::{split_word, tokens, Line},
};

struct Open {
    name: String,
    line: usize,
    body: Vec<String>,
    /// Header was rejected; the body is swallowed but never registered.
    broken: bool,
}

/// Replaces every macro invocation with its body and drops the definitions.
/// Any error fails the whole file.
pub fn expand(lines: &[Line], config: &Config) -> Result<Vec<String>, Msgs> {
    let mut msgs = Msgs::new();
    let mut macros: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut open: Option<Open> = None;
    let mut out = vec![];

    for (idx, line) in lines.iter().enumerate() {
        if line.len() > config.max_line_len {
            msgs.error(Error::LineTooLong(config.max_line_len), line);
            continue;
        }
        let (head, rest) = split_word(line.raw());

        if head == MACRO_OPEN {
            if let Some(outer) = &open {
                msgs.error(Error::NestedMacro(outer.name.clone()), line);
                continue;
            }
            let args = tokens(rest);
            let name = args.first().copied().unwrap_or_default();
            let err = if args.len() != 1 {
                Some(Error::MacroHeader)
            } else if !ident::is_ident(name) || ident::is_reserved(name) {
                Some(Error::InvalidMacroName(name.to_string()))
            } else if macros.contains_key(name) {
                Some(Error::RedefinedMacro(name.to_string()))
            } else {
                None
            };
            let broken = err.is_some();
            if let Some(err) = err {
                msgs.error(err, line);
            }
            open = Some(Open {
                name: name.to_string(),
                line: idx,
                body: vec![],
                broken,
            });
            continue;
        }

        if head == MACRO_CLOSE {
            if !rest.trim().is_empty() {
                msgs.error(Error::MacroEndArgs, line);
            }
            match open.take() {
                Some(def) if !def.broken => {
                    log::debug!("macro `{}`: {} lines", def.name, def.body.len());
                    macros.insert(def.name, def.body);
                }
                Some(_) => {}
                None => msgs.error(Error::StrayMacroEnd, line),
            }
            continue;
        }

        if let Some(def) = &mut open {
            def.body.push(line.raw().to_string());
            continue;
        }

        match macros.get(head) {
            Some(body) if rest.trim().is_empty() => out.extend(body.iter().cloned()),
            _ => out.push(line.raw().to_string()),
        }
    }

    if let Some(def) = open {
        msgs.error(Error::UnclosedMacro(def.name), &lines[def.line]);
    }
    if msgs.has_error() {
        Err(msgs)
    } else {
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> Result<Vec<String>, Msgs> {
        expand(&Line::split("t.as", src), &Config::default())
    }

    #[test]
    fn body_is_inlined() {
        let out = run("mcro twice\n inc r1\n inc r1\nmcroend\nMAIN: mov r1, r2\ntwice\nstop\ntwice\n")
            .unwrap();
        assert_eq!(
            out,
            vec!["MAIN: mov r1, r2", " inc r1", " inc r1", "stop", " inc r1", " inc r1"]
        );
    }

    #[test]
    fn empty_macro() {
        assert_eq!(run("mcro nop\nmcroend\nnop\nstop\n").unwrap(), vec!["stop"]);
    }

    #[test]
    fn use_before_definition_passes_through() {
        assert_eq!(
            run("later\nmcro later\nstop\nmcroend\n").unwrap(),
            vec!["later"]
        );
    }

    macro_rules! test_macro_error {
        ($($name:ident: $src:expr => $pat:pat,)*) => {
            $(
                #[test]
                fn $name() {
                    let msgs = run($src).unwrap_err();
                    assert_eq!(msgs.error_count(), 1);
                    let err = &msgs.iter().next().unwrap().err;
                    assert!(matches!(err, $pat), "{:?}", err);
                }
            )*
        }
    }

    test_macro_error! {
        missing_name: "mcro\nmcroend\n" => Error::MacroHeader,
        extra_name: "mcro a b\nmcroend\n" => Error::MacroHeader,
        mnemonic_name: "mcro mov\nmcroend\n" => Error::InvalidMacroName(_),
        register_name: "mcro r1\nmcroend\n" => Error::InvalidMacroName(_),
        directive_name: "mcro data\nmcroend\n" => Error::InvalidMacroName(_),
        bad_ident: "mcro 9m\nmcroend\n" => Error::InvalidMacroName(_),
        duplicate: "mcro m\nmcroend\nmcro m\nmcroend\n" => Error::RedefinedMacro(_),
        nested: "mcro a\nmcro b\nmcroend\n" => Error::NestedMacro(_),
        end_args: "mcro a\nmcroend a\n" => Error::MacroEndArgs,
        stray_end: "stop\nmcroend\n" => Error::StrayMacroEnd,
        unclosed: "mcro a\nstop\n" => Error::UnclosedMacro(_),
    }

    #[test]
    fn long_line() {
        let msgs = run(&format!("; {}\n", "x".repeat(80))).unwrap_err();
        assert!(matches!(
            msgs.iter().next().map(|m| &m.err),
            Some(Error::LineTooLong(80))
        ));
    }
}
