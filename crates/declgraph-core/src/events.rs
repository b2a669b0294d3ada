//! Declaration events: the contract between a language recognizer and the
//! symbol table builder.
//!
//! A recognizer turns one file's token stream into an ordered list of
//! [`DeclEvent`]s. Events describe structure only (scope entry and exit,
//! declarations, access sections); they carry no IDs and no resolution state.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::span::SourceSpan;
use crate::symbols::{MethodFlags, QualifiedName, Signature, TypeKind, Visibility};

/// One recognized declaration-level event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum DeclEvent {
    /// Open a namespace. A dotted or `::`-nested name opens one scope per
    /// segment, all closed by a single [`DeclEvent::ExitScope`].
    EnterNamespace { path: QualifiedName, span: SourceSpan },

    /// Close the innermost open scope at byte `end` on line `end_line`.
    ExitScope { end: usize, end_line: u32 },

    /// Open a type scope.
    EnterType {
        name: String,
        /// Base references as written, in declared order.
        bases: Vec<String>,
        type_kind: TypeKind,
        /// Inline access modifier, if any.
        visibility: Option<Visibility>,
        /// Declared `abstract` on the type itself.
        is_abstract: bool,
        span: SourceSpan,
    },

    /// A method declaration or definition. `name` may be qualified relative
    /// to the current scope (`Circle::area` written at namespace scope).
    Method {
        name: QualifiedName,
        signature: Signature,
        flags: MethodFlags,
        visibility: Option<Visibility>,
        span: SourceSpan,
    },

    /// A field declaration.
    Field {
        name: String,
        type_text: String,
        visibility: Option<Visibility>,
        span: SourceSpan,
    },

    /// A constructor. `name` is the constructor's written name, which may be
    /// qualified for out-of-line definitions (`Circle::Circle`).
    Constructor {
        name: QualifiedName,
        signature: Signature,
        visibility: Option<Visibility>,
        span: SourceSpan,
    },

    /// A section access label (`public:`) applying to following members of
    /// the current scope.
    AccessSection {
        visibility: Visibility,
        span: SourceSpan,
    },
}

impl DeclEvent {
    /// Short event name for logging.
    pub fn label(&self) -> &'static str {
        match self {
            DeclEvent::EnterNamespace { .. } => "enter_namespace",
            DeclEvent::ExitScope { .. } => "exit_scope",
            DeclEvent::EnterType { .. } => "enter_type",
            DeclEvent::Method { .. } => "method",
            DeclEvent::Field { .. } => "field",
            DeclEvent::Constructor { .. } => "constructor",
            DeclEvent::AccessSection { .. } => "access_section",
        }
    }
}

/// Everything a language adapter produced for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExtraction {
    /// Declaration events in source order.
    pub events: Vec<DeclEvent>,
    /// Structural diagnostics raised while scanning and recognizing.
    pub diagnostics: Vec<Diagnostic>,
}
