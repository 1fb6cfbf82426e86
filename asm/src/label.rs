use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub label: String,
    pub address: u32,
    /// Words stored by `.data`/`.string` on the defining line, in source order.
    pub values: Vec<i32>,
    /// Index of the defining line in the expanded source.
    pub line: usize,
}

/// Symbol table in definition order. The first definition of a label is kept.
#[derive(Debug, Default)]
pub struct Labels {
    labels: IndexMap<String, Symbol>,
}

impl Labels {
    pub fn new() -> Self {
        Labels {
            labels: IndexMap::new(),
        }
    }

    /// Registers `name`; if it already exists the table is left untouched
    /// and the existing symbol is returned.
    pub fn insert(&mut self, name: &str, address: u32, line: usize) -> Option<&Symbol> {
        if self.labels.contains_key(name) {
            return self.labels.get(name);
        }
        self.labels.insert(
            name.to_string(),
            Symbol {
                label: name.to_string(),
                address,
                values: vec![],
                line,
            },
        );
        None
    }

    pub fn push_value(&mut self, name: &str, value: i32) {
        if let Some(sym) = self.labels.get_mut(name) {
            sym.values.push(value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.labels.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.labels.values()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
