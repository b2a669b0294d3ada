//! Relationship resolver: links base references and override bindings in a
//! merged symbol table.
//!
//! Runs single-threaded after all files are merged. It is the only stage that
//! mutates symbols after the builder. Three passes:
//!
//! 1. **Bases.** Each written base reference is looked up in the owning
//!    type's namespace, then each enclosing scope innermost to outermost,
//!    then globally by name. Global matches are taken in qualified-name
//!    order; more than one match is reported as ambiguous.
//! 2. **Cycles.** A resolved base edge that makes a type its own ancestor is
//!    re-marked [`UnresolvedReason::Cycle`]. Types are visited in ID order, so
//!    the edge that is cut does not depend on input order.
//! 3. **Overrides.** For every non-static method, ancestors are walked
//!    breadth-first (closest first, declared base order within a level) and
//!    the method binds to the first same-named method that is virtual,
//!    abstract, or itself an override.
//!
//! Every walk carries a visited set, so malformed input always terminates.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::symbols::{Link, QualifiedName, SymbolId, SymbolKind, UnresolvedReason};
use crate::table::SymbolTable;

/// Resolve every relationship in `table`, returning reference diagnostics.
///
/// The table should be canonicalized first so ambiguous fallbacks and cycle
/// cuts are deterministic.
pub fn resolve(table: &mut SymbolTable) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    resolve_bases(table, &mut diagnostics);
    break_cycles(table, &mut diagnostics);
    resolve_overrides(table, &mut diagnostics);
    debug!(
        symbols = table.len(),
        diagnostics = diagnostics.len(),
        "resolution complete"
    );
    diagnostics
}

// ============================================================================
// Bases
// ============================================================================

fn resolve_bases(table: &mut SymbolTable, diagnostics: &mut Vec<Diagnostic>) {
    // Simple name -> types carrying it, in ID (qualified-name) order.
    let mut by_simple_name: HashMap<String, Vec<SymbolId>> = HashMap::new();
    for symbol in table.iter() {
        if symbol.kind() == SymbolKind::Type {
            by_simple_name
                .entry(symbol.simple_name().to_string())
                .or_default()
                .push(symbol.id);
        }
    }

    let type_ids: Vec<SymbolId> = table
        .iter()
        .filter(|s| s.kind() == SymbolKind::Type)
        .map(|s| s.id)
        .collect();

    for owner_id in type_ids {
        let Some(owner) = table.get(owner_id) else {
            continue;
        };
        let scope = owner.name.parent().unwrap_or_default();
        let owner_name = owner.name.clone();
        let owner_span = owner.span().cloned();
        let paths: Vec<(QualifiedName, String)> = owner
            .as_type()
            .map(|t| {
                t.bases
                    .iter()
                    .map(|b| (b.path.clone(), b.written.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let mut links = Vec::with_capacity(paths.len());
        for (path, written) in paths {
            let link = if path.is_root() {
                None
            } else {
                scope
                    .ancestors_inclusive()
                    .find_map(|s| table.id_of(&s.join(&path), SymbolKind::Type))
            };
            let link = match link {
                Some(id) => Link::Resolved(id),
                None => {
                    let candidates: Vec<SymbolId> = path
                        .name()
                        .and_then(|name| by_simple_name.get(name))
                        .map(|ids| {
                            ids.iter()
                                .copied()
                                .filter(|id| {
                                    table
                                        .get(*id)
                                        .is_some_and(|s| s.name.ends_with(path.segments()))
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    match candidates.first() {
                        Some(&first) => {
                            if candidates.len() > 1 {
                                let chosen = table
                                    .get(first)
                                    .map(|s| s.name.to_string())
                                    .unwrap_or_default();
                                diagnostics.extend(owner_span.clone().map(|span| {
                                    Diagnostic::at(
                                        DiagnosticKind::AmbiguousBase,
                                        span,
                                        format!(
                                            "base '{}' of '{}' matches {} types; using '{}'",
                                            written,
                                            owner_name,
                                            candidates.len(),
                                            chosen
                                        ),
                                    )
                                }));
                            }
                            Link::Resolved(first)
                        }
                        None => {
                            diagnostics.extend(owner_span.clone().map(|span| {
                                Diagnostic::at(
                                    DiagnosticKind::UnresolvedBase,
                                    span,
                                    format!("base '{}' of '{}' not found", written, owner_name),
                                )
                            }));
                            Link::Unresolved(UnresolvedReason::NotFound)
                        }
                    }
                }
            };
            trace!(owner = %owner_name, base = %written, ?link, "base");
            links.push(link);
        }

        if let Some(payload) = table.get_mut(owner_id).and_then(|s| s.as_type_mut()) {
            for (base, link) in payload.bases.iter_mut().zip(links) {
                base.link = Some(link);
            }
        }
    }
}

/// Resolved base edges of a type, in declared order.
fn resolved_bases(table: &SymbolTable, id: SymbolId) -> Vec<SymbolId> {
    table
        .get(id)
        .and_then(|s| s.as_type())
        .map(|t| {
            t.bases
                .iter()
                .filter_map(|b| b.link.and_then(|l| l.resolved()))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Cycles
// ============================================================================

fn reaches(table: &SymbolTable, from: SymbolId, target: SymbolId) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        if id == target {
            return true;
        }
        if visited.insert(id) {
            stack.extend(resolved_bases(table, id));
        }
    }
    false
}

fn break_cycles(table: &mut SymbolTable, diagnostics: &mut Vec<Diagnostic>) {
    let type_ids: Vec<SymbolId> = table
        .iter()
        .filter(|s| s.kind() == SymbolKind::Type)
        .map(|s| s.id)
        .collect();

    for id in type_ids {
        let edge_count = table
            .get(id)
            .and_then(|s| s.as_type())
            .map_or(0, |t| t.bases.len());
        for index in 0..edge_count {
            let target = table
                .get(id)
                .and_then(|s| s.as_type())
                .and_then(|t| t.bases[index].link)
                .and_then(|l| l.resolved());
            let Some(target) = target else {
                continue;
            };
            if !reaches(table, target, id) {
                continue;
            }
            let Some(symbol) = table.get_mut(id) else {
                continue;
            };
            let name = symbol.name.to_string();
            let span = symbol.span().cloned();
            if let Some(payload) = symbol.as_type_mut() {
                let base = &mut payload.bases[index];
                base.link = Some(Link::Unresolved(UnresolvedReason::Cycle));
                debug!(owner = %name, base = %base.written, "inheritance cycle cut");
                diagnostics.extend(span.map(|span| {
                    Diagnostic::at(
                        DiagnosticKind::InheritanceCycle,
                        span,
                        format!("base '{}' of '{}' forms an inheritance cycle", base.written, name),
                    )
                }));
            }
        }
    }
}

// ============================================================================
// Overrides
// ============================================================================

struct OverrideResolver<'t> {
    table: &'t SymbolTable,
    memo: HashMap<SymbolId, Option<SymbolId>>,
    in_progress: HashSet<SymbolId>,
}

impl<'t> OverrideResolver<'t> {
    /// Same-named method declared directly in `type_id`.
    fn method_in(&self, type_id: SymbolId, name: &str) -> Option<SymbolId> {
        let owner = self.table.get(type_id)?;
        self.table.id_of(&owner.name.child(name), SymbolKind::Method)
    }

    /// The method `method_id` overrides, if any.
    fn binding(&mut self, method_id: SymbolId) -> Option<SymbolId> {
        if let Some(result) = self.memo.get(&method_id) {
            return *result;
        }
        if !self.in_progress.insert(method_id) {
            return None;
        }
        let result = self.search(method_id);
        self.in_progress.remove(&method_id);
        self.memo.insert(method_id, result);
        result
    }

    fn search(&mut self, method_id: SymbolId) -> Option<SymbolId> {
        let table = self.table;
        let method = table.get(method_id)?;
        if method.as_method()?.flags.is_static {
            return None;
        }
        let name = method.simple_name().to_string();
        let owner = method.name.parent()?;
        let owner_id = table.id_of(&owner, SymbolKind::Type)?;

        let mut visited = HashSet::from([owner_id]);
        let mut queue: VecDeque<SymbolId> = resolved_bases(table, owner_id).into();
        while let Some(ancestor) = queue.pop_front() {
            if !visited.insert(ancestor) {
                continue;
            }
            if let Some(candidate) = self.method_in(ancestor, &name) {
                let dispatchable = table
                    .get(candidate)
                    .and_then(|s| s.as_method())
                    .is_some_and(|m| m.flags.is_dispatchable());
                if dispatchable || self.binding(candidate).is_some() {
                    return Some(candidate);
                }
            }
            queue.extend(resolved_bases(table, ancestor));
        }
        None
    }
}

fn resolve_overrides(table: &mut SymbolTable, diagnostics: &mut Vec<Diagnostic>) {
    let method_ids: Vec<SymbolId> = table
        .iter()
        .filter(|s| s.kind() == SymbolKind::Method)
        .map(|s| s.id)
        .collect();

    let bindings: Vec<(SymbolId, Option<SymbolId>)> = {
        let mut resolver = OverrideResolver {
            table: &*table,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        };
        method_ids
            .iter()
            .map(|&id| (id, resolver.binding(id)))
            .collect()
    };

    for (id, target) in bindings {
        let Some(symbol) = table.get_mut(id) else {
            continue;
        };
        let name = symbol.name.to_string();
        let span = symbol.span().cloned();
        let Some(payload) = symbol.as_method_mut() else {
            continue;
        };
        match target {
            Some(target) => {
                trace!(method = %name, target = %target, "override bound");
                payload.overrides = Some(Link::Resolved(target));
            }
            None if payload.flags.is_override => {
                payload.overrides = Some(Link::Unresolved(UnresolvedReason::NotFound));
                diagnostics.extend(span.map(|span| {
                    Diagnostic::at(
                        DiagnosticKind::UnresolvedOverride,
                        span,
                        format!("'{}' is marked override but no virtual ancestor method was found", name),
                    )
                }));
            }
            None => payload.overrides = None,
        }
    }
}
