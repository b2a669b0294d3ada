//! Core infrastructure for declgraph.
//!
//! This crate provides the language-agnostic half of the symbol extraction
//! pipeline. Language adapters (see `declgraph-cfamily`) turn source text into
//! declaration events; everything from there on lives here:
//!
//! - `span`: File identifiers, source spans, content hashes
//! - `symbols`: Qualified names, symbol kinds, payloads, links, stable IDs
//! - `events`: Declaration events produced by language adapters
//! - `diagnostics`: Non-fatal diagnostics and their categories
//! - `error`: Run-level error type and output error codes
//! - `adapter`: The language adapter trait
//! - `table`: Identity-keyed symbol table with merge-on-insert
//! - `builder`: Events to per-file symbol tables
//! - `resolver`: Base-type and override resolution over a merged table
//! - `graph`: The immutable symbol graph and its queries
//! - `output`: JSON output types and emission

pub mod adapter;
pub mod builder;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod graph;
pub mod output;
pub mod resolver;
pub mod span;
pub mod symbols;
pub mod table;
