//! declgraph: symbol extraction and indexing for C-family source.
//!
//! Source text flows through a scanner, a declaration recognizer, a per-file
//! symbol table builder and a cross-file relationship resolver, ending in an
//! immutable [`SymbolGraph`](graph::SymbolGraph) that answers structural
//! queries (lookup, children, implementors, override chains).

// Core infrastructure - re-exported from declgraph-core
pub use declgraph_core::adapter;
pub use declgraph_core::builder;
pub use declgraph_core::diagnostics;
pub use declgraph_core::error;
pub use declgraph_core::events;
pub use declgraph_core::graph;
pub use declgraph_core::output;
pub use declgraph_core::resolver;
pub use declgraph_core::span;
pub use declgraph_core::symbols;
pub use declgraph_core::table;

// Language support
pub use declgraph_cfamily as cfamily;

// Driver
pub mod config;
pub mod indexer;
