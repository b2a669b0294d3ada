//! JSON output types for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input, same output (symbols in qualified-name
//!    order, diagnostics in discovery order)
//! 3. **Stable references:** links between symbols are expressed as stable
//!    IDs plus qualified names, never as internal indexes
//! 4. **Versioned:** `schema_version` enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::error::{IndexError, OutputErrorCode};
use crate::graph::{FileRecord, SymbolGraph};
use crate::span::SourceSpan;
use crate::symbols::{
    Link, MethodFlags, Signature, Symbol, SymbolKind, SymbolPayload, TypeKind, UnresolvedReason,
    Visibility,
};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Symbol Output
// ============================================================================

/// A base reference or override binding in output form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOutput {
    /// Whether the reference resolved to a symbol.
    pub resolved: bool,
    /// Reference text as written (base references only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<String>,
    /// Qualified name of the target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Stable ID of the target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Why the reference is unresolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnresolvedReason>,
}

impl LinkOutput {
    fn from_link(graph: &SymbolGraph, link: Option<Link>, written: Option<String>) -> Self {
        match link {
            Some(Link::Resolved(id)) => {
                let target = graph.symbol(id);
                LinkOutput {
                    resolved: true,
                    written,
                    target: target.map(|s| s.name.to_string()),
                    target_id: target.map(Symbol::stable_id),
                    reason: None,
                }
            }
            Some(Link::Unresolved(reason)) => LinkOutput {
                resolved: false,
                written,
                target: None,
                target_id: None,
                reason: Some(reason),
            },
            None => LinkOutput {
                resolved: false,
                written,
                target: None,
                target_id: None,
                reason: None,
            },
        }
    }
}

/// One symbol in output form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolOutput {
    pub stable_id: String,
    /// Dotted qualified name.
    pub name: String,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    pub spans: Vec<SourceSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_kind: Option<TypeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub bases: Vec<LinkOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub signatures: Vec<Signature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<MethodFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<LinkOutput>,
    /// Declared type of a field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

impl SymbolOutput {
    /// Render a graph symbol.
    pub fn from_symbol(graph: &SymbolGraph, symbol: &Symbol) -> Self {
        let mut out = SymbolOutput {
            stable_id: symbol.stable_id(),
            name: symbol.name.to_string(),
            kind: symbol.kind(),
            visibility: symbol.visibility,
            spans: symbol.spans.clone(),
            type_kind: None,
            is_abstract: None,
            bases: Vec::new(),
            signatures: symbol.signatures().to_vec(),
            flags: None,
            overrides: None,
            field_type: None,
        };
        match &symbol.payload {
            SymbolPayload::Namespace | SymbolPayload::Constructor(_) => {}
            SymbolPayload::Type(t) => {
                out.type_kind = Some(t.type_kind);
                out.is_abstract = Some(t.is_abstract);
                out.bases = t
                    .bases
                    .iter()
                    .map(|b| LinkOutput::from_link(graph, b.link, Some(b.written.clone())))
                    .collect();
            }
            SymbolPayload::Method(m) => {
                out.flags = Some(m.flags);
                out.overrides = m
                    .overrides
                    .map(|link| LinkOutput::from_link(graph, Some(link), None));
            }
            SymbolPayload::Field(f) => out.field_type = Some(f.type_text.clone()),
        }
        out
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response for `index`: the whole graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub files: Vec<FileRecord>,
    pub symbols: Vec<SymbolOutput>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GraphResponse {
    /// Render a full graph.
    pub fn new(graph: &SymbolGraph) -> Self {
        GraphResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            files: graph.files().cloned().collect(),
            symbols: graph
                .symbols()
                .iter()
                .map(|s| SymbolOutput::from_symbol(graph, s))
                .collect(),
            diagnostics: graph.diagnostics().to_vec(),
        }
    }
}

/// Response for a query subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Query name (`lookup`, `children`, ...).
    pub query: String,
    /// Query argument as given.
    pub argument: String,
    pub symbols: Vec<SymbolOutput>,
}

impl QueryResponse {
    /// Render a query result.
    pub fn new(
        graph: &SymbolGraph,
        query: impl Into<String>,
        argument: impl Into<String>,
        symbols: &[&Symbol],
    ) -> Self {
        QueryResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            query: query.into(),
            argument: argument.into(),
            symbols: symbols
                .iter()
                .map(|s| SymbolOutput::from_symbol(graph, s))
                .collect(),
        }
    }
}

/// Error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from an IndexError.
    pub fn from_error(err: &IndexError) -> Self {
        ErrorResponse::new(OutputErrorCode::from(err).code(), err.to_string())
    }

    /// Create an error response with just code and message.
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code,
                message: message.into(),
            },
        }
    }
}

// ============================================================================
// Response Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// This is the single output path for the CLI.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
