use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{error::Error, resolve::Assembly};

/// `<ic> <dc>` header, then `AAAA HHHHHH` per word.
pub fn object_listing(asm: &Assembly) -> String {
    let mut out = format!("{} {}\n", asm.ic, asm.dc);
    for word in asm.store.objects() {
        out.push_str(&format!("{:04} {:06X}\n", word.address, word.value));
    }
    out
}

pub fn entry_listing(asm: &Assembly) -> String {
    asm.store
        .entries()
        .iter()
        .filter_map(|e| e.address.map(|a| format!("{} {:04}\n", e.label, a)))
        .collect()
}

/// Use sites only; bare `.extern` declarations are not listed.
pub fn extern_listing(asm: &Assembly) -> String {
    asm.store
        .externs()
        .iter()
        .filter_map(|e| e.address.map(|a| format!("{} {:04}\n", e.symbol, a)))
        .collect()
}

/// `stem` with `.ext` appended, keeping any dots already in the stem.
pub fn output_path(stem: &Path, ext: &str) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

/// Writes `.ob`, `.ent` and `.ext` next to `stem`. Nothing is written for
/// a file with errors.
pub fn write_outputs(asm: &Assembly, stem: &Path) -> Result<Vec<PathBuf>, Error> {
    if !asm.is_ok() {
        return Ok(vec![]);
    }
    let outputs = [
        ("ob", object_listing(asm)),
        ("ent", entry_listing(asm)),
        ("ext", extern_listing(asm)),
    ];
    let mut written = vec![];
    for (ext, text) in outputs {
        let path = output_path(stem, ext);
        fs::write(&path, text).map_err(|e| Error::FileCreate(path.display().to_string(), e))?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
