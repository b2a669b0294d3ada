//! The symbol graph: the immutable, queryable result of one indexing run.
//!
//! A [`SymbolGraph`] is built once from a resolved [`SymbolTable`] and never
//! changes afterwards. It is safe to share between threads; the indexer
//! publishes each new graph as a fresh snapshot.
//!
//! # Queries
//!
//! | Query                         | Answer                                          |
//! |-------------------------------|-------------------------------------------------|
//! | [`SymbolGraph::lookup`]       | symbol with an exact qualified name             |
//! | [`SymbolGraph::children`]     | symbols declared directly in a scope            |
//! | [`SymbolGraph::implementors`] | types overriding every abstract method of a type|
//! | [`SymbolGraph::override_chain`] | a method and everything it overrides          |
//! | [`SymbolGraph::find`]         | suffix path with optional parameter types       |
//! | [`SymbolGraph::bases_of`] / [`SymbolGraph::derived_of`] | resolved inheritance edges |
//!
//! Every list is returned in ID order, which is qualified-name order.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::error::IndexError;
use crate::span::{ContentHash, FileId};
use crate::symbols::{
    split_top_level, QualifiedName, Symbol, SymbolId, SymbolKey, SymbolKind,
};
use crate::table::SymbolTable;

/// Per-file bookkeeping for one indexed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file: FileId,
    /// SHA-256 of the file's bytes.
    pub content_hash: ContentHash,
    /// Adapter that extracted the file.
    pub language: String,
    /// Size of the input in bytes.
    pub bytes: usize,
}

/// Immutable symbol graph.
#[derive(Debug, Clone, Default)]
pub struct SymbolGraph {
    symbols: Vec<Symbol>,
    by_key: HashMap<SymbolKey, SymbolId>,
    children: HashMap<QualifiedName, Vec<SymbolId>>,
    derived: HashMap<SymbolId, Vec<SymbolId>>,
    files: BTreeMap<FileId, FileRecord>,
    diagnostics: Vec<Diagnostic>,
}

/// Kind preference when a qualified name is shared by several kinds.
const LOOKUP_ORDER: [SymbolKind; 5] = [
    SymbolKind::Namespace,
    SymbolKind::Type,
    SymbolKind::Method,
    SymbolKind::Field,
    SymbolKind::Constructor,
];

impl SymbolGraph {
    /// Freeze a resolved table into a graph.
    pub fn new(table: SymbolTable, files: Vec<FileRecord>, diagnostics: Vec<Diagnostic>) -> Self {
        let symbols = table.into_symbols();
        let mut by_key = HashMap::with_capacity(symbols.len());
        let mut children: HashMap<QualifiedName, Vec<SymbolId>> = HashMap::new();
        let mut derived: HashMap<SymbolId, Vec<SymbolId>> = HashMap::new();

        for symbol in &symbols {
            by_key.insert(symbol.key(), symbol.id);
            if let Some(parent) = symbol.name.parent() {
                children.entry(parent).or_default().push(symbol.id);
            }
            if let Some(payload) = symbol.as_type() {
                for base in &payload.bases {
                    if let Some(target) = base.link.and_then(|l| l.resolved()) {
                        let list = derived.entry(target).or_default();
                        if !list.contains(&symbol.id) {
                            list.push(symbol.id);
                        }
                    }
                }
            }
        }

        SymbolGraph {
            symbols,
            by_key,
            children,
            derived,
            files: files.into_iter().map(|f| (f.file.clone(), f)).collect(),
            diagnostics,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// All symbols in ID order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Symbol by ID.
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Stable identifier of a symbol.
    pub fn stable_id(&self, id: SymbolId) -> Option<String> {
        self.symbol(id).map(Symbol::stable_id)
    }

    /// Run-level diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Indexed files, ordered by identifier.
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    /// Record for one file.
    pub fn file(&self, file: &FileId) -> Option<&FileRecord> {
        self.files.get(file)
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if the graph holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols with at least one declaration in `file`.
    pub fn symbols_in_file(&self, file: &FileId) -> Vec<&Symbol> {
        self.symbols.iter().filter(|s| s.declared_in(file)).collect()
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Symbol with exactly this qualified name (`.` or `::` separated).
    ///
    /// When several kinds share the name, namespaces win over types, types
    /// over methods, and so on.
    pub fn lookup(&self, path: &str) -> Option<&Symbol> {
        let name = QualifiedName::parse(path);
        LOOKUP_ORDER
            .iter()
            .find_map(|kind| self.lookup_name(&name, *kind))
    }

    /// Symbol with this qualified name and kind.
    pub fn lookup_kind(&self, path: &str, kind: SymbolKind) -> Option<&Symbol> {
        self.lookup_name(&QualifiedName::parse(path), kind)
    }

    /// Symbol with this identity.
    pub fn lookup_name(&self, name: &QualifiedName, kind: SymbolKind) -> Option<&Symbol> {
        self.by_key
            .get(&SymbolKey::new(name.clone(), kind))
            .and_then(|id| self.symbol(*id))
    }

    /// Symbols declared directly in a scope. The empty path is the global
    /// scope.
    pub fn children(&self, scope: &str) -> Vec<&Symbol> {
        self.children
            .get(&QualifiedName::parse(scope))
            .map(|ids| ids.iter().filter_map(|id| self.symbol(*id)).collect())
            .unwrap_or_default()
    }

    /// Suffix lookup with optional parameter types.
    ///
    /// `spec` is a `.`- or `::`-separated path matched against the tail of
    /// every qualified name, optionally followed by a parenthesized parameter
    /// type list. With a list, only methods and constructors having a
    /// matching signature are returned; `()` selects zero-parameter overloads.
    ///
    /// Returns an error only for a malformed spec.
    pub fn find(&self, spec: &str) -> Result<Vec<&Symbol>, IndexError> {
        let (path, params) = parse_find_spec(spec)?;
        let matches = self
            .symbols
            .iter()
            .filter(|s| s.name.ends_with(path.segments()))
            .filter(|s| match &params {
                None => true,
                Some(types) => s.signatures().iter().any(|sig| sig.matches_param_types(types)),
            })
            .collect();
        Ok(matches)
    }

    // ------------------------------------------------------------------------
    // Inheritance
    // ------------------------------------------------------------------------

    /// Resolved direct bases of a type, in declared order.
    pub fn bases_of(&self, id: SymbolId) -> Vec<&Symbol> {
        self.base_ids(id)
            .into_iter()
            .filter_map(|b| self.symbol(b))
            .collect()
    }

    /// Types listing `id` as a resolved direct base.
    pub fn derived_of(&self, id: SymbolId) -> Vec<&Symbol> {
        self.derived
            .get(&id)
            .map(|ids| ids.iter().filter_map(|d| self.symbol(*d)).collect())
            .unwrap_or_default()
    }

    fn base_ids(&self, id: SymbolId) -> Vec<SymbolId> {
        self.symbol(id)
            .and_then(Symbol::as_type)
            .map(|t| {
                t.bases
                    .iter()
                    .filter_map(|b| b.link.and_then(|l| l.resolved()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `id` followed by its ancestors, breadth-first, declared base order
    /// within a level, each type once.
    fn ancestry(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                order.push(current);
                queue.extend(self.base_ids(current));
            }
        }
        order
    }

    /// All transitive descendants of a type, breadth-first.
    fn descendants(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut order = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut queue: VecDeque<SymbolId> = self.derived.get(&id).cloned().unwrap_or_default().into();
        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                order.push(current);
                if let Some(next) = self.derived.get(&current) {
                    queue.extend(next.iter().copied());
                }
            }
        }
        order
    }

    /// Nearest method called `name` visible from type `id` (its own first,
    /// then ancestors breadth-first).
    fn nearest_method(&self, id: SymbolId, name: &str) -> Option<&Symbol> {
        self.ancestry(id).into_iter().find_map(|t| {
            let owner = self.symbol(t)?;
            self.lookup_name(&owner.name.child(name), SymbolKind::Method)
        })
    }

    /// Abstract methods a type leaves open: for every method name visible
    /// from the type, the nearest declaration, when that declaration is
    /// abstract.
    fn open_abstract_methods(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut seen = HashSet::new();
        let mut open = Vec::new();
        for type_id in self.ancestry(id) {
            let Some(owner) = self.symbol(type_id) else {
                continue;
            };
            for child in self.children.get(&owner.name).into_iter().flatten() {
                let Some(method) = self.symbol(*child) else {
                    continue;
                };
                if method.kind() != SymbolKind::Method || !seen.insert(method.simple_name()) {
                    continue;
                }
                if let Some(nearest) = self.nearest_method(id, method.simple_name()) {
                    if nearest.as_method().is_some_and(|m| m.flags.is_abstract) {
                        open.push(nearest.id);
                    }
                }
            }
        }
        open
    }

    /// Types implementing an abstract type: descendants in which every
    /// abstract method the type leaves open is overridden (directly or
    /// transitively) by a concrete method.
    ///
    /// Returns an empty list when the path is not a type or the type leaves
    /// no abstract method open.
    pub fn implementors(&self, type_path: &str) -> Vec<&Symbol> {
        let Some(target) = self.lookup_kind(type_path, SymbolKind::Type) else {
            return Vec::new();
        };
        let required = self.open_abstract_methods(target.id);
        if required.is_empty() {
            return Vec::new();
        }
        let mut result: Vec<&Symbol> = self
            .descendants(target.id)
            .into_iter()
            .filter(|d| {
                required.iter().all(|abstract_id| {
                    let Some(name) = self.symbol(*abstract_id).map(Symbol::simple_name) else {
                        return false;
                    };
                    self.nearest_method(*d, name).is_some_and(|m| {
                        m.as_method().is_some_and(|p| !p.flags.is_abstract)
                            && self.override_chain_of(m.id).iter().any(|s| s.id == *abstract_id)
                    })
                })
            })
            .filter_map(|d| self.symbol(d))
            .collect();
        result.sort_by_key(|s| s.id);
        result
    }

    /// The method itself followed by each method it overrides, nearest first.
    pub fn override_chain(&self, method_path: &str) -> Vec<&Symbol> {
        self.lookup_kind(method_path, SymbolKind::Method)
            .map(|m| self.override_chain_of(m.id))
            .unwrap_or_default()
    }

    /// Override chain starting at a method ID.
    pub fn override_chain_of(&self, id: SymbolId) -> Vec<&Symbol> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(id);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let Some(symbol) = self.symbol(id) else {
                break;
            };
            chain.push(symbol);
            current = symbol.as_method().and_then(|m| m.overridden());
        }
        chain
    }
}

/// Split a find spec into its path and optional parameter type list.
fn parse_find_spec(spec: &str) -> Result<(QualifiedName, Option<Vec<String>>), IndexError> {
    let spec = spec.trim();
    let (path_text, params) = match spec.find('(') {
        Some(open) => {
            let Some(inner) = spec[open + 1..].strip_suffix(')') else {
                return Err(IndexError::invalid_query(spec, "unbalanced parameter list"));
            };
            let types: Vec<String> = if inner.trim().is_empty() {
                Vec::new()
            } else {
                split_top_level(inner, ',')
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .collect()
            };
            if types.iter().any(String::is_empty) {
                return Err(IndexError::invalid_query(spec, "empty parameter type"));
            }
            (&spec[..open], Some(types))
        }
        None => (spec, None),
    };
    let path = QualifiedName::parse(path_text);
    if path.is_root() {
        return Err(IndexError::invalid_query(spec, "empty symbol path"));
    }
    Ok((path, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;
    use crate::span::SourceSpan;
    use crate::symbols::{
        BaseRef, MethodFlags, MethodPayload, Signature, SymbolPayload, TypeKind, TypePayload,
        Visibility,
    };

    fn span() -> SourceSpan {
        SourceSpan::new(FileId::new("t.cpp"), 0, 1, 1, 1)
    }

    struct Fixture(SymbolTable);

    impl Fixture {
        fn new() -> Self {
            Fixture(SymbolTable::new())
        }

        fn ty(mut self, name: &str, bases: &[&str]) -> Self {
            self.0.insert(Symbol::new(
                QualifiedName::parse(name),
                Visibility::Public,
                span(),
                SymbolPayload::Type(TypePayload {
                    type_kind: TypeKind::Class,
                    bases: bases.iter().map(|b| BaseRef::new(*b)).collect(),
                    is_abstract: false,
                }),
            ));
            self
        }

        fn method(mut self, name: &str, params: &str, flags: MethodFlags) -> Self {
            self.0.insert(Symbol::new(
                QualifiedName::parse(name),
                Visibility::Public,
                span(),
                SymbolPayload::Method(MethodPayload::new(Signature::new("void", params), flags)),
            ));
            self
        }

        fn build(self) -> SymbolGraph {
            let mut table = self.0;
            table.canonicalize();
            let diagnostics = resolve(&mut table);
            SymbolGraph::new(table, Vec::new(), diagnostics)
        }
    }

    fn pure() -> MethodFlags {
        MethodFlags {
            is_virtual: true,
            is_abstract: true,
            ..MethodFlags::default()
        }
    }

    fn names(symbols: &[&Symbol]) -> Vec<String> {
        symbols.iter().map(|s| s.name.to_string()).collect()
    }

    mod lookup {
        use super::*;

        #[test]
        fn lookup_and_children() {
            let graph = Fixture::new()
                .ty("gfx.Shape", &[])
                .method("gfx.Shape.area", "", pure())
                .method("gfx.Shape.draw", "", pure())
                .build();
            assert_eq!(graph.lookup("gfx::Shape").unwrap().kind(), SymbolKind::Type);
            assert_eq!(
                names(&graph.children("gfx.Shape")),
                vec!["gfx.Shape.area", "gfx.Shape.draw"]
            );
            assert_eq!(names(&graph.children("")), Vec::<String>::new());
            assert!(graph.lookup("gfx.Square").is_none());
        }

        #[test]
        fn find_by_suffix_and_params() {
            let graph = Fixture::new()
                .ty("app.Logger", &[])
                .method("app.Logger.Write", "string text", MethodFlags::default())
                .method("app.Logger.Write", "string text, int level", MethodFlags::default())
                .build();
            assert_eq!(names(&graph.find("Logger.Write").unwrap()), vec!["app.Logger.Write"]);
            assert_eq!(graph.find("Write(String, int)").unwrap().len(), 1);
            assert!(graph.find("Write()").unwrap().is_empty());
            assert!(graph.find("Write(string").is_err());
            assert!(graph.find("()").is_err());
        }
    }

    mod inheritance {
        use super::*;

        #[test]
        fn implementors_require_every_abstract_method() {
            let graph = Fixture::new()
                .ty("Shape", &[])
                .method("Shape.area", "", pure())
                .method("Shape.draw", "", pure())
                .ty("Circle", &["Shape"])
                .method("Circle.area", "", MethodFlags::default())
                .method("Circle.draw", "", MethodFlags::default())
                .ty("Partial", &["Shape"])
                .method("Partial.area", "", MethodFlags::default())
                .ty("Filled", &["Partial"])
                .method("Filled.draw", "", MethodFlags::default())
                .build();
            assert_eq!(names(&graph.implementors("Shape")), vec!["Circle", "Filled"]);
            assert!(graph.implementors("Circle").is_empty());
        }

        #[test]
        fn override_chain_walks_to_root() {
            let graph = Fixture::new()
                .ty("A", &[])
                .method("A.m", "", pure())
                .ty("B", &["A"])
                .method("B.m", "", MethodFlags::default())
                .ty("C", &["B"])
                .method("C.m", "", MethodFlags::default())
                .build();
            assert_eq!(names(&graph.override_chain("C.m")), vec!["C.m", "B.m", "A.m"]);
            let b = graph.lookup("B").unwrap().id;
            assert_eq!(names(&graph.bases_of(b)), vec!["A"]);
            assert_eq!(names(&graph.derived_of(b)), vec!["C"]);
        }
    }
}
