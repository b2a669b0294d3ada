//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

// span module - file identity and source locations
use declgraph::span::{ContentHash, FileId, SourceSpan};

// symbols module - the symbol model
use declgraph::symbols::{
    BaseRef, ConstructorPayload, FieldPayload, Link, MethodFlags, MethodPayload, QualifiedName,
    Signature, Symbol, SymbolId, SymbolKey, SymbolKind, SymbolPayload, TypeKind, TypePayload,
    UnresolvedReason, Visibility,
};

// events module - recognizer output
use declgraph::events::{DeclEvent, FileExtraction};

// diagnostics module - non-fatal findings
use declgraph::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticKind};

// error module - error types and codes
use declgraph::error::{IndexError, OutputErrorCode};

// ============================================================================
// Pipeline Stages
// ============================================================================

use declgraph::adapter::LanguageAdapter;
use declgraph::builder::{build_file, FileTable, PendingBase};
use declgraph::resolver::resolve;
use declgraph::table::SymbolTable;

// graph module - immutable query surface
use declgraph::graph::{FileRecord, SymbolGraph};

// output module - JSON output types
use declgraph::output::{
    emit_response, ErrorInfo, ErrorResponse, GraphResponse, LinkOutput, QueryResponse,
    SymbolOutput,
};

// ============================================================================
// Language Support
// ============================================================================

use declgraph::cfamily::recognizer::recognize;
use declgraph::cfamily::scanner::{scan, Scanner, Token, TokenKind};
use declgraph::cfamily::{CFamilyAdapter, Dialect, UnknownDialect};

// ============================================================================
// Driver
// ============================================================================

use declgraph::config::{
    CliOverrides, ConfigFile, ConfigSource, ConfigValue, IndexerConfig, CONFIG_FILE_NAME,
    DEFAULT_MAX_FILE_BYTES, ENV_DIALECT, ENV_MAX_FILE_BYTES, ENV_THREADS,
};
use declgraph::indexer::{CancelToken, GraphHandle, Indexer, SourceFile};

#[test]
fn api_surface_compiles() {
    // Verifies that all the imports above resolve.
}

#[test]
fn adapter_is_object_safe() {
    let adapter: Box<dyn LanguageAdapter> = Box::new(CFamilyAdapter::default());
    assert_eq!(adapter.name(), "c-family");
}
