//! Non-fatal diagnostics collected during an indexing run.
//!
//! | Category     | Kinds                                                        |
//! |--------------|--------------------------------------------------------------|
//! | `structural` | `unbalanced_braces`, `stray_close_brace`                     |
//! | `scope`      | `declaration_outside_scope`                                  |
//! | `reference`  | `unresolved_base`, `inheritance_cycle`, `ambiguous_base`, `unresolved_override` |
//! | `input`      | `unreadable_input`                                           |
//!
//! None of these stop a run. `unreadable_input` removes one file's
//! contribution; everything else is recovered from in place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::{FileId, SourceSpan};

/// Specific diagnostic condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnbalancedBraces,
    StrayCloseBrace,
    DeclarationOutsideScope,
    UnresolvedBase,
    InheritanceCycle,
    AmbiguousBase,
    UnresolvedOverride,
    UnreadableInput,
}

/// Coarse diagnostic grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    Structural,
    Scope,
    Reference,
    Input,
}

impl DiagnosticKind {
    /// The category this kind belongs to.
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            DiagnosticKind::UnbalancedBraces | DiagnosticKind::StrayCloseBrace => {
                DiagnosticCategory::Structural
            }
            DiagnosticKind::DeclarationOutsideScope => DiagnosticCategory::Scope,
            DiagnosticKind::UnresolvedBase
            | DiagnosticKind::InheritanceCycle
            | DiagnosticKind::AmbiguousBase
            | DiagnosticKind::UnresolvedOverride => DiagnosticCategory::Reference,
            DiagnosticKind::UnreadableInput => DiagnosticCategory::Input,
        }
    }

    /// Stable code used in JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::UnbalancedBraces => "unbalanced_braces",
            DiagnosticKind::StrayCloseBrace => "stray_close_brace",
            DiagnosticKind::DeclarationOutsideScope => "declaration_outside_scope",
            DiagnosticKind::UnresolvedBase => "unresolved_base",
            DiagnosticKind::InheritanceCycle => "inheritance_cycle",
            DiagnosticKind::AmbiguousBase => "ambiguous_base",
            DiagnosticKind::UnresolvedOverride => "unresolved_override",
            DiagnosticKind::UnreadableInput => "unreadable_input",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// File the diagnostic applies to.
    pub file: FileId,
    /// Precise location, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

impl Diagnostic {
    /// Diagnostic anchored at a span.
    pub fn at(kind: DiagnosticKind, span: SourceSpan, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            file: span.file.clone(),
            span: Some(span),
        }
    }

    /// Diagnostic for a whole file.
    pub fn for_file(kind: DiagnosticKind, file: FileId, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            file,
            span: None,
        }
    }

    /// The diagnostic's category.
    pub fn category(&self) -> DiagnosticCategory {
        self.kind.category()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some(span) => write!(f, "{}: {} ({})", span, self.message, self.kind),
            None => write!(f, "{}: {} ({})", self.file, self.message, self.kind),
        }
    }
}
