//! Language adapter trait.
//!
//! A [`LanguageAdapter`] turns the text of one file into a
//! [`FileExtraction`]: declaration events plus structural diagnostics. The
//! core crate never inspects source text itself; every grammar decision lives
//! behind this trait.
//!
//! # Contract
//!
//! - `extract` never fails. Malformed input produces diagnostics and a best
//!   effort event list.
//! - `extract` is a pure function of `(file, content)`; adapters are shared
//!   across worker threads.
//! - Adapters do not allocate symbol IDs. The builder owns identity.

use crate::events::FileExtraction;
use crate::span::FileId;

/// Pluggable per-language declaration extractor.
pub trait LanguageAdapter: Send + Sync {
    /// Short name for logs and output (`"cpp"`, `"csharp"`, `"java"`).
    fn name(&self) -> &str;

    /// True if this adapter recognizes the file by its identifier.
    fn can_handle(&self, file: &FileId) -> bool;

    /// Extract declaration events from one file.
    fn extract(&self, file: &FileId, content: &str) -> FileExtraction;
}
