//! Source positions: file identifiers, spans and content hashes.
//!
//! Every entity produced by the pipeline carries a [`SourceSpan`] pointing back
//! at the text it came from. Offsets are byte offsets into the file content
//! (0-indexed, half-open `[start, end)`); lines are 1-indexed.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash type for content verification (SHA-256, stored as hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an input file, as supplied by the caller.
///
/// The engine makes no assumption about what the identifier means; it is
/// typically a workspace-relative path. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Arc<str>);

impl FileId {
    /// Create a new file ID.
    pub fn new(id: impl AsRef<str>) -> Self {
        FileId(Arc::from(id.as_ref()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension (without the dot), if the identifier looks like a path.
    pub fn extension(&self) -> Option<&str> {
        let name = self.0.rsplit(&['/', '\\'][..]).next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            None
        } else {
            Some(ext)
        }
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        FileId::new(value)
    }
}

impl From<String> for FileId {
    fn from(value: String) -> Self {
        FileId::new(value)
    }
}

/// Location of an entity in its originating file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// File the entity was declared in.
    pub file: FileId,
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-indexed line of `start`.
    pub start_line: u32,
    /// 1-indexed line of the last byte covered.
    pub end_line: u32,
}

impl SourceSpan {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(file: FileId, start: usize, end: usize, start_line: u32, end_line: u32) -> Self {
        assert!(
            start <= end,
            "SourceSpan start ({}) must be <= end ({})",
            start,
            end
        );
        SourceSpan {
            file,
            start,
            end,
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Widen this span to end at `end`. Never shrinks.
    pub fn extend_to(&mut self, end: usize, end_line: u32) {
        if end >= self.end {
            self.end = end;
            self.end_line = end_line.max(self.start_line);
        }
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.file == other.file && self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.file, self.start_line)
        } else {
            write!(f, "{}:{}-{}", self.file, self.start_line, self.end_line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_hex_sha256() {
        let hash = ContentHash::compute(b"class Shape {};");
        assert_eq!(hash.0.len(), 64);
        assert!(hash.0.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, ContentHash::compute(b"class Shape {};"));
        assert_ne!(hash, ContentHash::compute(b"class Circle {};"));
    }

    #[test]
    fn file_id_extension() {
        assert_eq!(FileId::new("src/shape.hpp").extension(), Some("hpp"));
        assert_eq!(FileId::new("Shape.cs").extension(), Some("cs"));
        assert_eq!(FileId::new("dir.d/Makefile").extension(), None);
        assert_eq!(FileId::new(".hidden").extension(), None);
        assert_eq!(FileId::new("snippet").extension(), None);
    }

    #[test]
    fn file_id_serializes_as_plain_string() {
        let id = FileId::new("a/b.cpp");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a/b.cpp\"");
    }

    #[test]
    fn span_display_single_and_multi_line() {
        let file = FileId::new("shape.cpp");
        let single = SourceSpan::new(file.clone(), 0, 10, 3, 3);
        assert_eq!(single.to_string(), "shape.cpp:3");
        let multi = SourceSpan::new(file, 0, 40, 3, 9);
        assert_eq!(multi.to_string(), "shape.cpp:3-9");
    }

    #[test]
    fn extend_to_only_grows() {
        let mut span = SourceSpan::new(FileId::new("a.cpp"), 5, 10, 1, 1);
        span.extend_to(30, 4);
        assert_eq!((span.end, span.end_line), (30, 4));
        span.extend_to(20, 2);
        assert_eq!((span.end, span.end_line), (30, 4));
        assert_eq!(span.len(), 25);
    }

    #[test]
    #[should_panic(expected = "must be <= end")]
    fn inverted_span_panics() {
        let _ = SourceSpan::new(FileId::new("a.cpp"), 10, 5, 1, 1);
    }
}
