//! C-family dialects and their file extensions.

use std::fmt;
use std::str::FromStr;

use declgraph_core::span::FileId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The C-family flavor that selects keyword semantics in the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Cpp,
    CSharp,
    Java,
}

/// Dialect name not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dialect '{0}' (expected cpp, csharp or java)")]
pub struct UnknownDialect(pub String);

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Dialect; 3] = [Dialect::Cpp, Dialect::CSharp, Dialect::Java];

    /// Short name used in configuration and output.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Cpp => "cpp",
            Dialect::CSharp => "csharp",
            Dialect::Java => "java",
        }
    }

    /// File extensions (without the dot) handled by this dialect.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Dialect::Cpp => &["c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx"],
            Dialect::CSharp => &["cs"],
            Dialect::Java => &["java"],
        }
    }

    /// Dialect for a file extension, compared case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Dialect> {
        let ext = ext.to_ascii_lowercase();
        Dialect::ALL
            .into_iter()
            .find(|d| d.extensions().contains(&ext.as_str()))
    }

    /// Dialect for a file identifier, if its extension is known.
    pub fn for_file(file: &FileId) -> Option<Dialect> {
        file.extension().and_then(Dialect::from_extension)
    }

    /// `public:` style access sections.
    pub(crate) fn has_access_sections(&self) -> bool {
        matches!(self, Dialect::Cpp)
    }

    /// Instance methods are virtual unless declared otherwise.
    pub(crate) fn methods_virtual_by_default(&self) -> bool {
        matches!(self, Dialect::Java)
    }

    /// Body-less interface members are abstract.
    pub(crate) fn has_interfaces(&self) -> bool {
        matches!(self, Dialect::CSharp | Dialect::Java)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpp" | "c++" | "cxx" | "c" => Ok(Dialect::Cpp),
            "csharp" | "c#" | "cs" => Ok(Dialect::CSharp),
            "java" => Ok(Dialect::Java),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_map_to_dialects() {
        assert_eq!(Dialect::for_file(&FileId::new("a/shape.hpp")), Some(Dialect::Cpp));
        assert_eq!(Dialect::for_file(&FileId::new("Shape.CS")), Some(Dialect::CSharp));
        assert_eq!(Dialect::for_file(&FileId::new("Shape.java")), Some(Dialect::Java));
        assert_eq!(Dialect::for_file(&FileId::new("notes.md")), None);
        assert_eq!(Dialect::for_file(&FileId::new("snippet")), None);
    }

    #[test]
    fn parse_names() {
        assert_eq!("C#".parse::<Dialect>(), Ok(Dialect::CSharp));
        assert_eq!("c++".parse::<Dialect>(), Ok(Dialect::Cpp));
        assert_eq!(
            "rust".parse::<Dialect>().unwrap_err().to_string(),
            "unknown dialect 'rust' (expected cpp, csharp or java)"
        );
    }
}
