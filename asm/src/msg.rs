use color_print::cprintln;

use crate::{error::Error, parser::Line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgKind {
    Error,
    Warn,
    Note,
}

#[derive(Debug)]
pub struct Msg {
    pub kind: MsgKind,
    pub err: Error,
    pub line: Option<Line>,
}

impl Msg {
    pub fn print(&self) {
        match self.kind {
            MsgKind::Error => cprintln!("<red,bold>error</>: {}", self.err),
            MsgKind::Warn => cprintln!("<yellow,bold>warn</>: {}", self.err),
            MsgKind::Note => cprintln!("<green,bold>note</>: {}", self.err),
        }
        if let Some(line) = &self.line {
            cprintln!("     <blue>--></> <underline>{}</>", line.pos());
            cprintln!("      <blue>|</>");
            cprintln!(" <blue>{:>4} |</> {}", line.no(), line.raw());
            cprintln!("      <blue>|</>");
        }
    }
}

/// Diagnostics collected while a file is processed, in report order.
#[derive(Debug, Default)]
pub struct Msgs(Vec<Msg>);

impl Msgs {
    pub fn new() -> Self {
        Msgs(vec![])
    }

    fn push(&mut self, kind: MsgKind, err: Error, line: &Line) {
        log::debug!("{:?} at {}: {}", kind, line.pos(), err);
        self.0.push(Msg {
            kind,
            err,
            line: Some(line.clone()),
        });
    }

    pub fn error(&mut self, err: Error, line: &Line) {
        self.push(MsgKind::Error, err, line);
    }

    pub fn warn(&mut self, err: Error, line: &Line) {
        self.push(MsgKind::Warn, err, line);
    }

    pub fn note(&mut self, err: Error, line: &Line) {
        self.push(MsgKind::Note, err, line);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|msg| msg.kind == MsgKind::Error)
    }

    pub fn error_count(&self) -> usize {
        self.0.iter().filter(|msg| msg.kind == MsgKind::Error).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Msg> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dump(&self) {
        for msg in &self.0 {
            msg.print();
        }
    }
}
