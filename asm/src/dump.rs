use arch::word::{ExtWord, InstWord};
use color_print::cformat;

use crate::{
    resolve::Assembly,
    store::{ObjectWord, WordKind},
};

fn decode(word: &ObjectWord) -> String {
    let text = match word.kind {
        WordKind::Inst => InstWord::from_bin(word.value).map(|w| w.cformat()),
        WordKind::Ext => ExtWord::from_bin(word.value).map(|w| w.cformat()),
        WordKind::Data => {
            let signed = ((word.value << 8) as i32) >> 8;
            Some(cformat!("<c>{:>8}</>", signed))
        }
    };
    text.unwrap_or_else(|| cformat!("<r,s>{:>8}</>", "??"))
}

/// Source next to its object words, one row per word.
pub fn print_dump(asm: &Assembly) {
    let path = asm.lines.first().map(|l| l.path()).unwrap_or("");
    println!(
        "{}+------[{}]{}",
        "-".repeat(14),
        path,
        "-".repeat(45usize.saturating_sub(path.len()))
    );

    let mut words = asm.store.objects().iter().peekable();
    for (idx, line) in asm.lines.iter().enumerate() {
        let mut first = true;
        while let Some(word) = words.next_if(|w| w.line == idx) {
            let src = if first { line.raw() } else { "" };
            println!(
                "[{:04}] {:06X} | {:>4}: {:<40} {}",
                word.address,
                word.value,
                if first { line.no().to_string() } else { String::new() },
                src,
                decode(word)
            );
            first = false;
        }
        if first {
            println!("{:14}| {:>4}: {}", "", line.no(), line.raw());
        }
    }
    println!("--------------+-----------------------------------------------------");
}
