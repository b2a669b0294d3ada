//! The indexing driver: per-file pipelines in parallel, then merge, resolve
//! and publish.
//!
//! ## Run Phases
//!
//! 1. **Extract** (parallel, one task per file): validate the bytes, run the
//!    language adapter, build the file's symbol table.
//! 2. **Merge** (single-threaded): every file's table, in file-ID order, into
//!    one table; canonicalize IDs.
//! 3. **Resolve** (single-threaded): bases, cycles, overrides.
//! 4. **Publish**: swap the new [`SymbolGraph`] in atomically.
//!
//! Cancellation is checked before each file, before merge and before
//! publish. A cancelled run changes nothing: the indexer keeps its previous
//! per-file state and readers keep the previous snapshot.
//!
//! ## Re-indexing
//!
//! The indexer remembers each file's table. Indexing a file again replaces
//! that file's contribution and leaves every other file's symbols as they
//! were; the merge and resolve phases always run over the full set.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use declgraph_cfamily::CFamilyAdapter;
use declgraph_core::adapter::LanguageAdapter;
use declgraph_core::builder::{build_file, FileTable};
use declgraph_core::diagnostics::{Diagnostic, DiagnosticKind};
use declgraph_core::error::IndexError;
use declgraph_core::graph::{FileRecord, SymbolGraph};
use declgraph_core::resolver::resolve;
use declgraph_core::span::{ContentHash, FileId};
use declgraph_core::table::SymbolTable;

use crate::config::IndexerConfig;

// ============================================================================
// Inputs
// ============================================================================

/// One input file: an identifier and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub id: FileId,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source file from raw bytes.
    pub fn new(id: impl Into<FileId>, bytes: impl Into<Vec<u8>>) -> Self {
        SourceFile {
            id: id.into(),
            bytes: bytes.into(),
        }
    }

    /// Validate the bytes and borrow them as text.
    fn text(&self, max_bytes: u64) -> Result<&str, IndexError> {
        if self.bytes.len() as u64 > max_bytes {
            return Err(IndexError::unreadable(
                self.id.clone(),
                format!("{} bytes exceeds the {} byte limit", self.bytes.len(), max_bytes),
            ));
        }
        if self.bytes.contains(&0) {
            return Err(IndexError::unreadable(self.id.clone(), "contains NUL bytes"));
        }
        std::str::from_utf8(&self.bytes).map_err(|e| {
            IndexError::unreadable(self.id.clone(), format!("invalid UTF-8: {}", e))
        })
    }
}

/// Cooperative cancellation flag shared between a run and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), IndexError> {
        if self.is_cancelled() {
            Err(IndexError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// Cheap, cloneable read handle on the published graph.
///
/// Readers holding a loaded snapshot keep it alive after a newer one is
/// published.
#[derive(Debug, Clone)]
pub struct GraphHandle(Arc<ArcSwap<SymbolGraph>>);

impl GraphHandle {
    /// The current snapshot.
    pub fn load(&self) -> Arc<SymbolGraph> {
        self.0.load_full()
    }
}

/// Everything remembered about one indexed file.
#[derive(Debug)]
struct FileEntry {
    record: FileRecord,
    /// `None` when the file was rejected as unreadable.
    table: Option<FileTable>,
    /// Scanner, recognizer and builder diagnostics, in that order.
    diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// Indexer
// ============================================================================

/// Incremental indexer owning the per-file state and the published graph.
pub struct Indexer {
    adapters: Vec<Box<dyn LanguageAdapter>>,
    max_file_bytes: u64,
    pool: rayon::ThreadPool,
    files: BTreeMap<FileId, Arc<FileEntry>>,
    current: Arc<ArcSwap<SymbolGraph>>,
}

impl Indexer {
    /// Create an indexer with the C-family adapter and an empty graph.
    pub fn new(config: &IndexerConfig) -> Result<Self, IndexError> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("declgraph-{}", i));
        if let Some(threads) = config.threads.value {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().map_err(|e| IndexError::ThreadPool {
            message: e.to_string(),
        })?;
        Ok(Indexer {
            adapters: vec![Box::new(CFamilyAdapter::new(config.default_dialect.value))],
            max_file_bytes: config.max_file_bytes.value,
            pool,
            files: BTreeMap::new(),
            current: Arc::new(ArcSwap::from_pointee(SymbolGraph::default())),
        })
    }

    /// Register an additional adapter, consulted before the existing ones.
    pub fn with_adapter(mut self, adapter: Box<dyn LanguageAdapter>) -> Self {
        self.adapters.insert(0, adapter);
        self
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<SymbolGraph> {
        self.current.load_full()
    }

    /// A read handle that follows future publishes.
    pub fn handle(&self) -> GraphHandle {
        GraphHandle(Arc::clone(&self.current))
    }

    /// Files currently contributing to the graph, in ID order.
    pub fn files(&self) -> impl Iterator<Item = &FileId> {
        self.files.keys()
    }

    /// Index (or re-index) `sources` and publish the resulting graph.
    ///
    /// Files not in `sources` keep their previous contribution. On
    /// cancellation nothing changes and [`IndexError::Cancelled`] is
    /// returned.
    pub fn index(
        &mut self,
        sources: Vec<SourceFile>,
        cancel: &CancelToken,
    ) -> Result<Arc<SymbolGraph>, IndexError> {
        let _span = info_span!("index", files = sources.len()).entered();
        let adapters = &self.adapters;
        let max_bytes = self.max_file_bytes;
        let entries: Vec<FileEntry> = self.pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    cancel.check()?;
                    Ok(extract(adapters, max_bytes, source))
                })
                .collect::<Result<Vec<_>, IndexError>>()
        })?;

        let mut next = self.files.clone();
        for entry in entries {
            next.insert(entry.record.file.clone(), Arc::new(entry));
        }
        self.publish(next, cancel)
    }

    /// Drop files from the graph and publish the result.
    pub fn remove(
        &mut self,
        files: &[FileId],
        cancel: &CancelToken,
    ) -> Result<Arc<SymbolGraph>, IndexError> {
        let mut next = self.files.clone();
        for file in files {
            next.remove(file);
        }
        self.publish(next, cancel)
    }

    fn publish(
        &mut self,
        next: BTreeMap<FileId, Arc<FileEntry>>,
        cancel: &CancelToken,
    ) -> Result<Arc<SymbolGraph>, IndexError> {
        cancel.check()?;

        let mut table = SymbolTable::new();
        let mut diagnostics = Vec::new();
        let mut records = Vec::with_capacity(next.len());
        for entry in next.values() {
            if let Some(built) = &entry.table {
                table.merge(built.table.clone());
            }
            diagnostics.extend(entry.diagnostics.iter().cloned());
            records.push(entry.record.clone());
        }
        table.canonicalize();
        diagnostics.extend(resolve(&mut table));
        let graph = Arc::new(SymbolGraph::new(table, records, diagnostics));

        cancel.check()?;
        self.files = next;
        self.current.store(Arc::clone(&graph));
        info!(
            files = graph.files().count(),
            symbols = graph.len(),
            diagnostics = graph.diagnostics().len(),
            "snapshot published"
        );
        Ok(graph)
    }
}

/// Run one file through validation, extraction and building.
fn extract(adapters: &[Box<dyn LanguageAdapter>], max_bytes: u64, source: &SourceFile) -> FileEntry {
    let adapter = adapters
        .iter()
        .find(|a| a.can_handle(&source.id))
        .or_else(|| adapters.last());
    let record = FileRecord {
        file: source.id.clone(),
        content_hash: ContentHash::compute(&source.bytes),
        language: adapter.map(|a| a.name().to_string()).unwrap_or_default(),
        bytes: source.bytes.len(),
    };

    let text = match source.text(max_bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %source.id, error = %err, "file rejected");
            return FileEntry {
                record,
                table: None,
                diagnostics: vec![Diagnostic::for_file(
                    DiagnosticKind::UnreadableInput,
                    source.id.clone(),
                    err.to_string(),
                )],
            };
        }
    };
    let Some(adapter) = adapter else {
        return FileEntry {
            record,
            table: None,
            diagnostics: Vec::new(),
        };
    };

    let extraction = adapter.extract(&source.id, text);
    let built = build_file(&source.id, &extraction.events);
    debug!(
        file = %source.id,
        events = extraction.events.len(),
        symbols = built.table.len(),
        diagnostics = extraction.diagnostics.len() + built.diagnostics.len(),
        "file indexed"
    );
    let mut diagnostics = extraction.diagnostics;
    diagnostics.extend(built.diagnostics.iter().cloned());
    FileEntry {
        record,
        table: Some(built),
        diagnostics,
    }
}
