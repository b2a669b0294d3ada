//! Symbol table: identity-keyed symbol storage with merge-on-insert.
//!
//! The table is the mutable intermediate between the builder and the
//! immutable [`SymbolGraph`](crate::graph::SymbolGraph). Inserting a symbol
//! whose [`SymbolKey`] is already present merges the two (spans appended,
//! payloads unioned) instead of creating a duplicate.

use std::collections::HashMap;

use crate::symbols::{QualifiedName, Symbol, SymbolId, SymbolKey, SymbolKind};

/// Identity-keyed symbol storage.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<SymbolKey, SymbolId>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if the table holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Insert a symbol, merging with an existing one of the same identity.
    ///
    /// Returns the ID of the (possibly pre-existing) symbol.
    pub fn insert(&mut self, mut symbol: Symbol) -> SymbolId {
        let key = symbol.key();
        if let Some(&id) = self.index.get(&key) {
            self.symbols[id.index()].absorb(symbol);
            return id;
        }
        let id = SymbolId::new(self.symbols.len() as u32);
        symbol.id = id;
        self.symbols.push(symbol);
        self.index.insert(key, id);
        id
    }

    /// Get a symbol by ID.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.index())
    }

    /// ID of the symbol with the given identity.
    pub fn id_of(&self, name: &QualifiedName, kind: SymbolKind) -> Option<SymbolId> {
        self.index.get(&SymbolKey::new(name.clone(), kind)).copied()
    }

    /// The symbol with the given identity.
    pub fn lookup(&self, name: &QualifiedName, kind: SymbolKind) -> Option<&Symbol> {
        self.id_of(name, kind).and_then(|id| self.get(id))
    }

    pub(crate) fn lookup_mut(&mut self, name: &QualifiedName, kind: SymbolKind) -> Option<&mut Symbol> {
        let id = self.id_of(name, kind)?;
        self.get_mut(id)
    }

    /// Iterate over symbols in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Merge another table into this one, symbol by symbol, in its ID order.
    pub fn merge(&mut self, other: SymbolTable) {
        for symbol in other.symbols {
            self.insert(symbol);
        }
    }

    /// Reorder symbols by identity (qualified name, then kind) and reassign
    /// IDs, so the same set of inputs always yields the same IDs.
    ///
    /// Links already stored in payloads are not remapped; call this before
    /// resolution.
    pub fn canonicalize(&mut self) {
        let mut symbols = std::mem::take(&mut self.symbols);
        symbols.sort_by_key(Symbol::key);
        self.index.clear();
        for (i, symbol) in symbols.iter_mut().enumerate() {
            symbol.id = SymbolId::new(i as u32);
            self.index.insert(symbol.key(), symbol.id);
        }
        self.symbols = symbols;
    }

    /// Consume the table, returning symbols in ID order.
    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{FileId, SourceSpan};
    use crate::symbols::{SymbolPayload, Visibility};

    fn namespace(name: &str, file: &str, line: u32) -> Symbol {
        Symbol::new(
            QualifiedName::parse(name),
            Visibility::Unspecified,
            SourceSpan::new(FileId::new(file), 0, 1, line, line),
            SymbolPayload::Namespace,
        )
    }

    #[test]
    fn insert_merges_identical_identity() {
        let mut table = SymbolTable::new();
        let a = table.insert(namespace("graphics", "a.cpp", 1));
        let b = table.insert(namespace("graphics", "a.cpp", 20));
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(a).unwrap().spans.len(), 2);
    }

    #[test]
    fn merge_keeps_spans_from_both_files() {
        let mut first = SymbolTable::new();
        first.insert(namespace("graphics", "a.cpp", 1));
        let mut second = SymbolTable::new();
        second.insert(namespace("graphics", "b.cpp", 1));
        second.insert(namespace("graphics.detail", "b.cpp", 2));
        first.merge(second);
        assert_eq!(first.len(), 2);
        let ns = first
            .lookup(&QualifiedName::parse("graphics"), SymbolKind::Namespace)
            .unwrap();
        let files: Vec<&str> = ns.spans.iter().map(|s| s.file.as_str()).collect();
        assert_eq!(files, vec!["a.cpp", "b.cpp"]);
    }

    #[test]
    fn canonicalize_orders_by_identity() {
        let mut table = SymbolTable::new();
        table.insert(namespace("zeta", "a.cpp", 1));
        table.insert(namespace("alpha", "a.cpp", 2));
        table.canonicalize();
        let names: Vec<String> = table.iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(
            table.id_of(&QualifiedName::parse("zeta"), SymbolKind::Namespace),
            Some(SymbolId::new(1))
        );
        assert_eq!(table.get(SymbolId::new(1)).unwrap().id, SymbolId::new(1));
    }
}
