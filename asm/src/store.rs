use arch::{
    mode::AddrMode,
    word::{MEMORY_SIZE, WORD_MASK},
};

use crate::{
    error::Error,
    label::{Labels, Symbol},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    /// `None` until the resolver finds the label.
    pub address: Option<u32>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternUse {
    pub symbol: String,
    /// `None` for the `.extern` declaration itself, otherwise a use site.
    pub address: Option<u32>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Inst,
    Ext,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectWord {
    pub address: u32,
    pub value: u32,
    pub kind: WordKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWord {
    pub address: u32,
    pub label: String,
    pub mode: AddrMode,
    pub line: usize,
}

/// Everything one assembly run knows about its file. Object words are kept
/// gap-free from `base`, so the word at `address` lives at `address - base`.
#[derive(Debug)]
pub struct Store {
    base: u32,
    labels: Labels,
    entries: Vec<Entry>,
    externs: Vec<ExternUse>,
    objects: Vec<ObjectWord>,
    pending: Vec<PendingWord>,
}

impl Store {
    pub fn new(base: u32) -> Self {
        Store {
            base,
            labels: Labels::new(),
            entries: vec![],
            externs: vec![],
            objects: vec![],
            pending: vec![],
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn next_address(&self) -> u32 {
        self.base + self.objects.len() as u32
    }

    // ------------------------------------------------------------------------
    // Symbols

    /// Returns the earlier symbol when `label` is already defined.
    pub fn define(&mut self, label: &str, address: u32, line: usize) -> Option<&Symbol> {
        self.labels.insert(label, address, line)
    }

    pub fn push_value(&mut self, label: &str, value: i32) {
        self.labels.push_value(label, value);
    }

    pub fn symbol(&self, label: &str) -> Option<&Symbol> {
        self.labels.get(label)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.labels.iter()
    }

    // ------------------------------------------------------------------------
    // Object image

    pub fn emit(&mut self, value: u32, kind: WordKind, line: usize) -> Result<u32, Error> {
        let address = self.next_address();
        if address >= MEMORY_SIZE {
            return Err(Error::MemoryOverflow(address, MEMORY_SIZE));
        }
        self.objects.push(ObjectWord {
            address,
            value: value & WORD_MASK,
            kind,
            line,
        });
        Ok(address)
    }

    /// Emits a zero placeholder to be filled in once `label` is known.
    pub fn defer(&mut self, label: &str, mode: AddrMode, line: usize) -> Result<u32, Error> {
        let address = self.emit(0, WordKind::Ext, line)?;
        self.pending.push(PendingWord {
            address,
            label: label.to_string(),
            mode,
            line,
        });
        Ok(address)
    }

    pub fn word_mut(&mut self, address: u32) -> Result<&mut ObjectWord, Error> {
        address
            .checked_sub(self.base)
            .and_then(|idx| self.objects.get_mut(idx as usize))
            .ok_or(Error::Consistency(address))
    }

    pub fn objects(&self) -> &[ObjectWord] {
        &self.objects
    }

    pub fn pending(&self) -> &[PendingWord] {
        &self.pending
    }

    /// Hands the pending list over for resolution; it is not kept afterwards.
    pub fn take_pending(&mut self) -> Vec<PendingWord> {
        std::mem::take(&mut self.pending)
    }

    // ------------------------------------------------------------------------
    // Entries & externs

    pub fn declare_entry(&mut self, label: &str, line: usize) {
        if self.entries.iter().any(|e| e.label == label) {
            return;
        }
        self.entries.push(Entry {
            label: label.to_string(),
            address: None,
            line,
        });
    }

    pub fn declare_extern(&mut self, symbol: &str, line: usize) {
        self.add_extern(symbol, None, line);
    }

    pub fn use_extern(&mut self, symbol: &str, address: u32, line: usize) {
        self.add_extern(symbol, Some(address), line);
    }

    fn add_extern(&mut self, symbol: &str, address: Option<u32>, line: usize) {
        if self
            .externs
            .iter()
            .any(|e| e.symbol == symbol && e.address == address)
        {
            return;
        }
        self.externs.push(ExternUse {
            symbol: symbol.to_string(),
            address,
            line,
        });
    }

    pub fn is_external(&self, label: &str) -> bool {
        self.externs.iter().any(|e| e.symbol == label)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub fn externs(&self) -> &[ExternUse] {
        &self.externs
    }
}
