//! Symbol table builder: one file's declaration events to a symbol table.
//!
//! The builder keeps a scope stack. Every declaration is qualified with the
//! names of the open scopes, attached to its span, and inserted into the
//! file's table (merging with any earlier declaration of the same identity).
//!
//! Base references are stored on their type's payload exactly as written and
//! left unlinked; the resolver links them after all files are merged.

use tracing::trace;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::events::DeclEvent;
use crate::span::{FileId, SourceSpan};
use crate::symbols::{
    BaseRef, ConstructorPayload, FieldPayload, MethodPayload, QualifiedName, Symbol, SymbolKey,
    SymbolKind, SymbolPayload, TypePayload, Visibility,
};
use crate::table::SymbolTable;

/// A base reference awaiting resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBase {
    /// Qualified name of the type that lists the base.
    pub owner: QualifiedName,
    /// The reference text as written.
    pub written: String,
}

/// Result of building one file.
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    /// Symbols declared in the file.
    pub table: SymbolTable,
    /// Scope diagnostics raised while building.
    pub diagnostics: Vec<Diagnostic>,
}

impl FileTable {
    /// Base references declared in this file, in declaration order.
    pub fn pending_bases(&self) -> Vec<PendingBase> {
        self.table
            .iter()
            .filter_map(|symbol| symbol.as_type().map(|t| (symbol, t)))
            .flat_map(|(symbol, payload)| {
                payload.bases.iter().map(move |base| PendingBase {
                    owner: symbol.name.clone(),
                    written: base.written.clone(),
                })
            })
            .collect()
    }
}

/// One open scope.
struct Frame {
    /// Fully qualified name of the innermost scope this frame opened.
    name: QualifiedName,
    /// Every symbol this frame opened, with the span to widen on close.
    opened: Vec<(SymbolKey, SourceSpan)>,
    /// Current section access for members declared directly in this scope.
    section: Visibility,
}

struct Builder {
    file: FileId,
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    stack: Vec<Frame>,
}

/// Build a symbol table from one file's events.
pub fn build_file(file: &FileId, events: &[DeclEvent]) -> FileTable {
    let mut builder = Builder {
        file: file.clone(),
        table: SymbolTable::new(),
        diagnostics: Vec::new(),
        stack: Vec::new(),
    };
    for event in events {
        trace!(file = %builder.file, event = event.label(), "build");
        builder.apply(event);
    }
    // Frames still open here were never closed by the recognizer; their
    // spans stay as opened.
    builder.stack.clear();
    FileTable {
        table: builder.table,
        diagnostics: builder.diagnostics,
    }
}

impl Builder {
    fn scope(&self) -> QualifiedName {
        self.stack
            .last()
            .map(|frame| frame.name.clone())
            .unwrap_or_default()
    }

    fn section(&self) -> Visibility {
        self.stack
            .last()
            .map(|frame| frame.section)
            .unwrap_or_default()
    }

    fn apply(&mut self, event: &DeclEvent) {
        match event {
            DeclEvent::EnterNamespace { path, span } => self.enter_namespace(path, span),
            DeclEvent::ExitScope { end, end_line } => self.exit_scope(*end, *end_line),
            DeclEvent::EnterType {
                name,
                bases,
                type_kind,
                visibility,
                is_abstract,
                span,
            } => {
                let qualified = self.scope().join(&QualifiedName::parse(name));
                let payload = TypePayload {
                    type_kind: *type_kind,
                    bases: bases.iter().map(BaseRef::new).collect(),
                    is_abstract: *is_abstract,
                };
                let visibility = visibility.unwrap_or_else(|| self.section());
                let symbol = Symbol::new(
                    qualified.clone(),
                    visibility,
                    span.clone(),
                    SymbolPayload::Type(payload),
                );
                self.table.insert(symbol);
                self.stack.push(Frame {
                    name: qualified.clone(),
                    opened: vec![(SymbolKey::new(qualified, SymbolKind::Type), span.clone())],
                    section: Visibility::Unspecified,
                });
            }
            DeclEvent::Method {
                name,
                signature,
                flags,
                visibility,
                span,
            } => {
                let qualified = self.member_name(name, span);
                let visibility = visibility.unwrap_or_else(|| self.section());
                if flags.is_abstract {
                    if let Some(owner) = qualified.parent() {
                        if let Some(owner) = self.table.lookup_mut(&owner, SymbolKind::Type) {
                            if let Some(payload) = owner.as_type_mut() {
                                payload.is_abstract = true;
                            }
                        }
                    }
                }
                let payload = MethodPayload::new(signature.clone(), *flags);
                self.table.insert(Symbol::new(
                    qualified,
                    visibility,
                    span.clone(),
                    SymbolPayload::Method(payload),
                ));
            }
            DeclEvent::Field {
                name,
                type_text,
                visibility,
                span,
            } => {
                let qualified = self.member_name(&QualifiedName::new([name.as_str()]), span);
                let visibility = visibility.unwrap_or_else(|| self.section());
                self.table.insert(Symbol::new(
                    qualified,
                    visibility,
                    span.clone(),
                    SymbolPayload::Field(FieldPayload {
                        type_text: type_text.clone(),
                    }),
                ));
            }
            DeclEvent::Constructor {
                name,
                signature,
                visibility,
                span,
            } => {
                let qualified = self.member_name(name, span);
                let visibility = visibility.unwrap_or_else(|| self.section());
                self.table.insert(Symbol::new(
                    qualified,
                    visibility,
                    span.clone(),
                    SymbolPayload::Constructor(ConstructorPayload {
                        signatures: vec![signature.clone()],
                    }),
                ));
            }
            DeclEvent::AccessSection { visibility, .. } => {
                if let Some(frame) = self.stack.last_mut() {
                    frame.section = *visibility;
                }
            }
        }
    }

    fn enter_namespace(&mut self, path: &QualifiedName, span: &SourceSpan) {
        let mut name = self.scope();
        let mut opened = Vec::with_capacity(path.len());
        for segment in path.segments() {
            name = name.child(segment.as_str());
            self.table.insert(Symbol::new(
                name.clone(),
                Visibility::Unspecified,
                span.clone(),
                SymbolPayload::Namespace,
            ));
            opened.push((SymbolKey::new(name.clone(), SymbolKind::Namespace), span.clone()));
        }
        self.stack.push(Frame {
            name,
            opened,
            section: Visibility::Unspecified,
        });
    }

    fn exit_scope(&mut self, end: usize, end_line: u32) {
        let Some(frame) = self.stack.pop() else {
            trace!(file = %self.file, "exit with no open scope");
            return;
        };
        for (key, opening) in frame.opened {
            if let Some(symbol) = self.table.lookup_mut(&key.name, key.kind) {
                if let Some(span) = symbol.spans.iter_mut().find(|s| **s == opening) {
                    span.extend_to(end, end_line);
                }
            }
        }
    }

    /// Qualify a member name against the current scope, reporting members
    /// that have no enclosing scope at all.
    fn member_name(&mut self, name: &QualifiedName, span: &SourceSpan) -> QualifiedName {
        if self.stack.is_empty() && name.len() < 2 {
            self.diagnostics.push(Diagnostic::at(
                DiagnosticKind::DeclarationOutsideScope,
                span.clone(),
                format!("'{}' is declared outside any scope", name),
            ));
        }
        self.scope().join(name)
    }
}
