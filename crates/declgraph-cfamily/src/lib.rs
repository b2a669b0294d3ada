//! C-family language support for declgraph.
//!
//! This crate turns C++, C# and Java source text into declaration events:
//! - `scanner`: structural tokenizer (comments, literals, bodies, braces)
//! - `recognizer`: declaration patterns to [`DeclEvent`]s
//! - `language`: dialects and file-extension mapping
//!
//! [`CFamilyAdapter`] wires the two stages together behind
//! [`LanguageAdapter`].
//!
//! [`DeclEvent`]: declgraph_core::events::DeclEvent

pub mod language;
pub mod recognizer;
pub mod scanner;

use declgraph_core::adapter::LanguageAdapter;
use declgraph_core::events::FileExtraction;
use declgraph_core::span::FileId;
use tracing::debug;

pub use language::{Dialect, UnknownDialect};

/// Language adapter for every C-family dialect.
///
/// The dialect comes from the file extension; files with an unknown
/// extension use `default_dialect`.
///
/// ```
/// use declgraph_cfamily::{CFamilyAdapter, Dialect};
/// use declgraph_core::adapter::LanguageAdapter;
/// use declgraph_core::span::FileId;
///
/// let adapter = CFamilyAdapter::new(Dialect::Cpp);
/// let file = FileId::new("shape.hpp");
/// let extraction = adapter.extract(&file, "namespace graphics { class Shape {}; }");
/// assert_eq!(extraction.events.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CFamilyAdapter {
    default_dialect: Dialect,
}

impl CFamilyAdapter {
    /// Create an adapter that falls back to `default_dialect`.
    pub fn new(default_dialect: Dialect) -> Self {
        CFamilyAdapter { default_dialect }
    }

    /// Dialect used for files with an unknown extension.
    pub fn default_dialect(&self) -> Dialect {
        self.default_dialect
    }

    /// Dialect that applies to `file`.
    pub fn dialect_for(&self, file: &FileId) -> Dialect {
        Dialect::for_file(file).unwrap_or(self.default_dialect)
    }
}

impl LanguageAdapter for CFamilyAdapter {
    fn name(&self) -> &str {
        "c-family"
    }

    fn can_handle(&self, file: &FileId) -> bool {
        Dialect::for_file(file).is_some()
    }

    fn extract(&self, file: &FileId, content: &str) -> FileExtraction {
        let dialect = self.dialect_for(file);
        let mut scanner = scanner::Scanner::new(file, content);
        let events = recognizer::recognize(dialect, file, scanner.by_ref());
        let diagnostics = scanner.into_diagnostics();
        debug!(
            file = %file,
            dialect = %dialect,
            events = events.len(),
            diagnostics = diagnostics.len(),
            "extracted declarations"
        );
        FileExtraction {
            events,
            diagnostics,
        }
    }
}
