use arch::{op::Mnemonic, reg::looks_like_register};
use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::error::Error;

pub const MAX_LABEL_LEN: usize = 31;

pub const DIRECTIVES: [&str; 4] = [".data", ".string", ".entry", ".extern"];
pub const MACRO_OPEN: &str = "mcro";
pub const MACRO_CLOSE: &str = "mcroend";

/// Words that can never name a label or a macro.
static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set: HashSet<&'static str> = HashSet::new();
    set.extend(Mnemonic::ALL.iter().map(|m| m.name()));
    set.extend(DIRECTIVES.iter().map(|d| d.trim_start_matches('.')));
    set.insert(MACRO_OPEN);
    set.insert(MACRO_CLOSE);
    set
});

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(name) || looks_like_register(name)
}

/// Letter first, then letters and digits, at most 31 characters.
pub fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(head) if head.is_ascii_alphabetic() => {
            name.len() <= MAX_LABEL_LEN && chars.all(|c| c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

pub fn check_label(name: &str) -> Result<(), Error> {
    if !is_ident(name) {
        return Err(Error::InvalidLabel(name.to_string()));
    }
    if is_reserved(name) {
        return Err(Error::ReservedLabel(name.to_string()));
    }
    Ok(())
}
