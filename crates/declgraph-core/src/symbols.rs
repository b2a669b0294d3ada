//! Symbol model: qualified names, kinds, payloads and resolution links.
//!
//! This module provides the data model shared by every pipeline stage:
//! - [`QualifiedName`]: ordered scope segments, the primary identity key
//! - [`Symbol`]: one logical declaration (possibly seen at several spans)
//! - [`SymbolPayload`]: kind-specific attributes (bases, flags, signatures)
//! - [`Link`]: a resolved or explicitly unresolved relationship
//!
//! # Identity
//!
//! A symbol's identity is its [`SymbolKey`]: qualified name plus kind. Two
//! declarations with the same key denote the same logical symbol and are
//! merged (a reopened namespace, a forward declaration followed by its
//! definition, an out-of-line method definition, a C# partial class).
//!
//! [`SymbolId`] values are dense indexes assigned by the symbol table. They are
//! only meaningful within one table or graph. Use [`Symbol::stable_id`] for an
//! identifier that survives re-indexing.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::span::{FileId, SourceSpan};

// ============================================================================
// ID Types
// ============================================================================

/// Index of a symbol within a symbol table or graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Create a new symbol ID.
    pub fn new(id: u32) -> Self {
        SymbolId(id)
    }

    /// The ID as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym_{}", self.0)
    }
}

// ============================================================================
// Qualified Names
// ============================================================================

/// Ordered sequence of scope names from the outermost namespace down to a
/// symbol's own name.
///
/// The empty name is the file-root (global) scope. Display joins segments
/// with `.`; [`QualifiedName::parse`] accepts both `.` and `::` separators.
///
/// ```
/// use declgraph_core::symbols::QualifiedName;
///
/// let name = QualifiedName::parse("graphics::Circle::area");
/// assert_eq!(name.to_string(), "graphics.Circle.area");
/// assert_eq!(name.name(), Some("area"));
/// assert_eq!(name.parent().unwrap().to_string(), "graphics.Circle");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(Vec<String>);

impl QualifiedName {
    /// The global scope.
    pub fn root() -> Self {
        QualifiedName(Vec::new())
    }

    /// Build a name from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QualifiedName(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a `.`- or `::`-separated path. Empty segments are dropped, so a
    /// leading `::` (C++ global qualification) yields a plain path.
    pub fn parse(text: &str) -> Self {
        QualifiedName(
            text.split("::")
                .flat_map(|part| part.split('.'))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// All segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the global scope.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The last segment (the symbol's own name).
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The enclosing scope, or `None` for the root.
    pub fn parent(&self) -> Option<QualifiedName> {
        if self.0.is_empty() {
            None
        } else {
            Some(QualifiedName(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// This name extended with one more segment.
    pub fn child(&self, segment: impl Into<String>) -> QualifiedName {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        QualifiedName(segments)
    }

    /// This name extended with all segments of `other`.
    pub fn join(&self, other: &QualifiedName) -> QualifiedName {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        QualifiedName(segments)
    }

    /// True if the trailing segments of `self` equal `suffix`.
    pub fn ends_with(&self, suffix: &[String]) -> bool {
        self.0.ends_with(suffix)
    }

    /// This scope followed by each enclosing scope, innermost to outermost,
    /// ending with the root.
    pub fn ancestors_inclusive(&self) -> impl Iterator<Item = QualifiedName> + '_ {
        (0..=self.0.len())
            .rev()
            .map(move |len| QualifiedName(self.0[..len].to_vec()))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Kind of symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Namespace,
    Type,
    Method,
    Field,
    Constructor,
}

impl SymbolKind {
    /// Lowercase name used in output and stable IDs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Namespace => "namespace",
            SymbolKind::Type => "type",
            SymbolKind::Method => "method",
            SymbolKind::Field => "field",
            SymbolKind::Constructor => "constructor",
        }
    }

    /// Kinds that open a scope other declarations can live in.
    pub fn is_scope(&self) -> bool {
        matches!(self, SymbolKind::Namespace | SymbolKind::Type)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared access level.
///
/// `Unspecified` means the source did not say; the engine never applies a
/// language default (a C++ `class` member without a section stays
/// `Unspecified` rather than becoming `Private`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    /// C# `internal`.
    Internal,
    #[default]
    Unspecified,
}

impl Visibility {
    /// Parse an access keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            "internal" => Some(Visibility::Internal),
            _ => None,
        }
    }
}

/// Flavor of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
}

// ============================================================================
// Signatures and Flags
// ============================================================================

/// Method or constructor signature, kept as opaque text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Return type text as written (empty for constructors).
    pub return_type: String,
    /// Parameter list text, without the surrounding parentheses.
    pub params: String,
}

/// Leading parameter modifiers that are not part of the type.
const PARAM_MODIFIERS: &[&str] = &["ref ", "out ", "in ", "params ", "this ", "final "];

impl Signature {
    /// Create a new signature.
    pub fn new(return_type: impl Into<String>, params: impl Into<String>) -> Self {
        Signature {
            return_type: return_type.into(),
            params: params.into(),
        }
    }

    /// Best-effort parameter type list.
    ///
    /// Splits on top-level commas (respecting `<>`, `()` and `[]` nesting),
    /// drops default values and parameter modifiers, and keeps the text
    /// before the parameter name. `void` alone means no parameters.
    ///
    /// ```
    /// use declgraph_core::symbols::Signature;
    ///
    /// let sig = Signature::new("void", "Dictionary<string, int> map, ref int count = 0");
    /// assert_eq!(sig.param_types(), vec!["Dictionary<string, int>", "int"]);
    /// ```
    pub fn param_types(&self) -> Vec<String> {
        let trimmed = self.params.trim();
        if trimmed.is_empty() || trimmed == "void" {
            return Vec::new();
        }
        split_top_level(trimmed, ',')
            .into_iter()
            .filter_map(|param| {
                let mut param = param.trim();
                if let Some(eq) = find_top_level(param, '=') {
                    param = param[..eq].trim();
                }
                let lower = param.to_ascii_lowercase();
                for modifier in PARAM_MODIFIERS {
                    if lower.starts_with(modifier) {
                        param = param[modifier.len()..].trim();
                        break;
                    }
                }
                if param.is_empty() {
                    None
                } else {
                    Some(param_type_of(param).to_string())
                }
            })
            .collect()
    }

    /// Compare requested parameter types against this signature.
    ///
    /// Comparison is case-insensitive and whitespace-insensitive; a requested
    /// type also matches a declared type that ends with `.Requested` or
    /// `::Requested` (so `String` matches `System.String`).
    pub fn matches_param_types(&self, requested: &[String]) -> bool {
        let declared = self.param_types();
        if declared.len() != requested.len() {
            return false;
        }
        declared.iter().zip(requested).all(|(decl, req)| {
            let decl = normalize_type(decl);
            let req = normalize_type(req);
            decl == req || decl.ends_with(&format!(".{}", req)) || decl.ends_with(&format!("::{}", req))
        })
    }
}

fn normalize_type(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Split `text` on `sep` where it appears outside any bracket nesting.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            _ if c == sep && depth <= 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn find_top_level(text: &str, needle: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            _ if c == needle && depth <= 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// The type portion of a `type name` parameter: everything before the last
/// top-level space. A lone word is taken to be the type.
fn param_type_of(param: &str) -> &str {
    let mut depth = 0i32;
    let mut last_space = None;
    for (i, c) in param.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ' ' if depth == 0 => last_space = Some(i),
            _ => {}
        }
    }
    match last_space {
        Some(i) if i > 0 => param[..i].trim_end(),
        _ => param,
    }
}

/// Method declaration flags as recognized from the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodFlags {
    /// Declared (or implied) virtual.
    pub is_virtual: bool,
    /// Pure virtual / abstract: no body.
    pub is_abstract: bool,
    /// Carries an override marker (`override`, `@Override`).
    pub is_override: bool,
    /// Static members never participate in dispatch.
    pub is_static: bool,
}

impl MethodFlags {
    /// Union of two flag sets (used when a declaration and its definition merge).
    pub fn union(self, other: MethodFlags) -> MethodFlags {
        MethodFlags {
            is_virtual: self.is_virtual || other.is_virtual,
            is_abstract: self.is_abstract || other.is_abstract,
            is_override: self.is_override || other.is_override,
            is_static: self.is_static || other.is_static,
        }
    }

    /// Flags for a method group after a distinct overload joins it.
    ///
    /// The group stays static only while every overload is static, so one
    /// virtual overload keeps the name dispatchable.
    pub fn overload(self, other: MethodFlags) -> MethodFlags {
        MethodFlags {
            is_static: self.is_static && other.is_static,
            ..self.union(other)
        }
    }

    /// True if a derived method of the same name can override this one.
    pub fn is_dispatchable(&self) -> bool {
        (self.is_virtual || self.is_abstract) && !self.is_static
    }
}

// ============================================================================
// Links
// ============================================================================

/// Why a relationship could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No symbol with that name exists anywhere in the merged table.
    NotFound,
    /// Resolving the reference would make a type its own ancestor.
    Cycle,
}

/// A named relationship after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "target")]
pub enum Link {
    Resolved(SymbolId),
    Unresolved(UnresolvedReason),
}

impl Link {
    /// The target symbol, if resolved.
    pub fn resolved(&self) -> Option<SymbolId> {
        match self {
            Link::Resolved(id) => Some(*id),
            Link::Unresolved(_) => None,
        }
    }
}

/// A base-type reference as written in a type's base list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRef {
    /// The reference text as written (generic arguments included).
    pub written: String,
    /// Parsed lookup path (generic arguments stripped).
    pub path: QualifiedName,
    /// `None` until the resolver has run.
    pub link: Option<Link>,
}

impl BaseRef {
    /// Create an unresolved-yet base reference from source text.
    ///
    /// ```
    /// use declgraph_core::symbols::BaseRef;
    ///
    /// let base = BaseRef::new("std::vector<Shape*>");
    /// assert_eq!(base.path.to_string(), "std.vector");
    /// assert!(base.link.is_none());
    /// ```
    pub fn new(written: impl Into<String>) -> Self {
        let written = written.into();
        let path = QualifiedName::parse(&strip_generic_args(&written));
        BaseRef {
            written,
            path,
            link: None,
        }
    }
}

/// Remove `<...>` argument lists (nested included) from a type reference.
fn strip_generic_args(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0u32;
    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

// ============================================================================
// Payloads
// ============================================================================

/// Attributes of a Type symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePayload {
    /// Class, struct, interface or enum.
    pub type_kind: TypeKind,
    /// Base types in declared order.
    pub bases: Vec<BaseRef>,
    /// Declares at least one abstract method, or is declared abstract.
    pub is_abstract: bool,
}

/// Attributes of a Method symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodPayload {
    /// Distinct signatures in declaration order; non-empty for indexed symbols.
    pub signatures: Vec<Signature>,
    /// Declaration flags (merged across declarations).
    pub flags: MethodFlags,
    /// Method this one overrides. `None` if the method does not override.
    pub overrides: Option<Link>,
}

impl MethodPayload {
    /// Create a payload for a single declaration.
    pub fn new(signature: Signature, flags: MethodFlags) -> Self {
        MethodPayload {
            signatures: vec![signature],
            flags,
            overrides: None,
        }
    }

    /// The first declared signature.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    /// The resolved override target, if any.
    pub fn overridden(&self) -> Option<SymbolId> {
        self.overrides.and_then(|link| link.resolved())
    }
}

/// Attributes of a Field symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPayload {
    /// Declared type text.
    pub type_text: String,
}

/// Attributes of a Constructor symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorPayload {
    /// Distinct signatures in declaration order.
    pub signatures: Vec<Signature>,
}

/// Kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SymbolPayload {
    Namespace,
    Type(TypePayload),
    Method(MethodPayload),
    Field(FieldPayload),
    Constructor(ConstructorPayload),
}

impl SymbolPayload {
    /// The symbol kind this payload belongs to.
    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolPayload::Namespace => SymbolKind::Namespace,
            SymbolPayload::Type(_) => SymbolKind::Type,
            SymbolPayload::Method(_) => SymbolKind::Method,
            SymbolPayload::Field(_) => SymbolKind::Field,
            SymbolPayload::Constructor(_) => SymbolKind::Constructor,
        }
    }

    /// Fold a later declaration of the same symbol into this payload.
    fn absorb(&mut self, other: SymbolPayload) {
        match (self, other) {
            (SymbolPayload::Type(mine), SymbolPayload::Type(theirs)) => {
                for base in theirs.bases {
                    if !mine.bases.iter().any(|b| b.path == base.path) {
                        mine.bases.push(base);
                    }
                }
                mine.is_abstract |= theirs.is_abstract;
            }
            (SymbolPayload::Method(mine), SymbolPayload::Method(theirs)) => {
                let new_overload = theirs
                    .signatures
                    .iter()
                    .any(|sig| !mine.signatures.iter().any(|s| s.params == sig.params));
                // An out-of-line definition drops `static`, so only a new
                // overload may clear it.
                mine.flags = if new_overload {
                    mine.flags.overload(theirs.flags)
                } else {
                    mine.flags.union(theirs.flags)
                };
                push_distinct(&mut mine.signatures, theirs.signatures);
            }
            (SymbolPayload::Constructor(mine), SymbolPayload::Constructor(theirs)) => {
                push_distinct(&mut mine.signatures, theirs.signatures);
            }
            (SymbolPayload::Field(mine), SymbolPayload::Field(theirs)) => {
                if mine.type_text.is_empty() {
                    mine.type_text = theirs.type_text;
                }
            }
            _ => {}
        }
    }
}

fn push_distinct(into: &mut Vec<Signature>, from: Vec<Signature>) {
    for sig in from {
        // An out-of-line definition repeats the declaration's parameter list;
        // only the parameters decide whether it is a new overload.
        if !into.iter().any(|s| s.params == sig.params) {
            into.push(sig);
        }
    }
}

// ============================================================================
// Symbol
// ============================================================================

/// Identity of a logical symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolKey {
    pub name: QualifiedName,
    pub kind: SymbolKind,
}

impl SymbolKey {
    /// Create a new key.
    pub fn new(name: QualifiedName, kind: SymbolKind) -> Self {
        SymbolKey { name, kind }
    }
}

/// One logical declared entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Index within the owning table or graph.
    pub id: SymbolId,
    /// Qualified name.
    pub name: QualifiedName,
    /// Declared access level.
    pub visibility: Visibility,
    /// Every place this symbol was declared, in the order seen. Non-empty for
    /// indexed symbols.
    pub spans: Vec<SourceSpan>,
    /// Kind-specific attributes (also determines the kind).
    pub payload: SymbolPayload,
}

impl Symbol {
    /// Create a new symbol. The ID is assigned on insertion into a table.
    pub fn new(
        name: QualifiedName,
        visibility: Visibility,
        span: SourceSpan,
        payload: SymbolPayload,
    ) -> Self {
        Symbol {
            id: SymbolId::new(0),
            name,
            visibility,
            spans: vec![span],
            payload,
        }
    }

    /// Symbol kind.
    pub fn kind(&self) -> SymbolKind {
        self.payload.kind()
    }

    /// Identity key.
    pub fn key(&self) -> SymbolKey {
        SymbolKey::new(self.name.clone(), self.kind())
    }

    /// The symbol's own (unqualified) name.
    pub fn simple_name(&self) -> &str {
        self.name.name().unwrap_or("")
    }

    /// First declaration site.
    ///
    /// `None` only for a symbol deserialized without spans.
    pub fn span(&self) -> Option<&SourceSpan> {
        self.spans.first()
    }

    /// True if any declaration of this symbol is in `file`.
    pub fn declared_in(&self, file: &FileId) -> bool {
        self.spans.iter().any(|s| &s.file == file)
    }

    /// Type attributes, if this is a Type.
    pub fn as_type(&self) -> Option<&TypePayload> {
        match &self.payload {
            SymbolPayload::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Method attributes, if this is a Method.
    pub fn as_method(&self) -> Option<&MethodPayload> {
        match &self.payload {
            SymbolPayload::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Field attributes, if this is a Field.
    pub fn as_field(&self) -> Option<&FieldPayload> {
        match &self.payload {
            SymbolPayload::Field(f) => Some(f),
            _ => None,
        }
    }

    /// Constructor attributes, if this is a Constructor.
    pub fn as_constructor(&self) -> Option<&ConstructorPayload> {
        match &self.payload {
            SymbolPayload::Constructor(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn as_type_mut(&mut self) -> Option<&mut TypePayload> {
        match &mut self.payload {
            SymbolPayload::Type(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn as_method_mut(&mut self) -> Option<&mut MethodPayload> {
        match &mut self.payload {
            SymbolPayload::Method(m) => Some(m),
            _ => None,
        }
    }

    /// All signatures of a method or constructor (empty for other kinds).
    pub fn signatures(&self) -> &[Signature] {
        match &self.payload {
            SymbolPayload::Method(m) => &m.signatures,
            SymbolPayload::Constructor(c) => &c.signatures,
            _ => &[],
        }
    }

    /// Merge a later declaration with the same key into this symbol.
    ///
    /// Spans are appended in order (duplicates dropped), an unspecified
    /// visibility is filled in, and payloads are unioned.
    pub fn absorb(&mut self, other: Symbol) {
        debug_assert_eq!(self.key(), other.key());
        for span in other.spans {
            if !self.spans.contains(&span) {
                self.spans.push(span);
            }
        }
        if self.visibility == Visibility::Unspecified {
            self.visibility = other.visibility;
        }
        self.payload.absorb(other.payload);
    }

    /// Deterministic identifier derived from the qualified name and kind.
    ///
    /// Does not depend on positions or on the order files were indexed, so
    /// cross references built on it stay valid across re-indexing. Format is
    /// `sym_` followed by 16 hex characters (first 64 bits of a SHA-256).
    pub fn stable_id(&self) -> String {
        stable_id_for(&self.name, self.kind())
    }
}

/// Compute the stable ID for a qualified name and kind.
pub fn stable_id_for(name: &QualifiedName, kind: SymbolKind) -> String {
    let mut hasher = Sha256::new();
    for segment in name.segments() {
        hasher.update(segment.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");
    hasher.update(kind.as_str().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("sym_{}", &digest[..16])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: u32) -> SourceSpan {
        SourceSpan::new(FileId::new("shapes.cpp"), 0, 10, line, line)
    }

    mod qualified_name {
        use super::*;

        #[test]
        fn parse_accepts_both_separators() {
            assert_eq!(
                QualifiedName::parse("a::b.c"),
                QualifiedName::new(["a", "b", "c"])
            );
            assert_eq!(QualifiedName::parse("::Shape"), QualifiedName::new(["Shape"]));
            assert!(QualifiedName::parse("").is_root());
        }

        #[test]
        fn ancestors_run_innermost_to_root() {
            let name = QualifiedName::new(["a", "b"]);
            let all: Vec<String> = name.ancestors_inclusive().map(|n| n.to_string()).collect();
            assert_eq!(all, vec!["a.b", "a", ""]);
        }

        #[test]
        fn child_and_join() {
            let ns = QualifiedName::new(["graphics"]);
            assert_eq!(ns.child("Shape").to_string(), "graphics.Shape");
            let rel = QualifiedName::new(["Circle", "area"]);
            assert_eq!(ns.join(&rel).to_string(), "graphics.Circle.area");
            assert!(ns.join(&rel).ends_with(&["Circle".to_string(), "area".to_string()]));
        }

        #[test]
        fn ordering_is_lexicographic_by_segment() {
            let mut names = vec![
                QualifiedName::parse("b.A"),
                QualifiedName::parse("a.Z"),
                QualifiedName::parse("a"),
            ];
            names.sort();
            let shown: Vec<String> = names.iter().map(|n| n.to_string()).collect();
            assert_eq!(shown, vec!["a", "a.Z", "b.A"]);
        }
    }

    mod signatures {
        use super::*;

        #[test]
        fn param_types_drop_names_and_defaults() {
            let sig = Signature::new("void", "const std::string& name, int count = 3");
            assert_eq!(sig.param_types(), vec!["const std::string&", "int"]);
        }

        #[test]
        fn void_and_empty_mean_no_params() {
            assert!(Signature::new("int", "void").param_types().is_empty());
            assert!(Signature::new("int", "  ").param_types().is_empty());
        }

        #[test]
        fn matching_is_case_insensitive_with_namespace_suffix() {
            let sig = Signature::new("void", "System.String text, out int n");
            assert!(sig.matches_param_types(&["string".to_string(), "INT".to_string()]));
            assert!(!sig.matches_param_types(&["string".to_string()]));
            assert!(!sig.matches_param_types(&["int".to_string(), "int".to_string()]));
        }
    }

    mod merging {
        use super::*;

        #[test]
        fn method_declaration_and_definition_merge() {
            let decl = Symbol::new(
                QualifiedName::parse("graphics.Circle.area"),
                Visibility::Public,
                span(15),
                SymbolPayload::Method(MethodPayload::new(
                    Signature::new("double", ""),
                    MethodFlags {
                        is_override: true,
                        ..MethodFlags::default()
                    },
                )),
            );
            let def = Symbol::new(
                QualifiedName::parse("graphics.Circle.area"),
                Visibility::Unspecified,
                span(40),
                SymbolPayload::Method(MethodPayload::new(
                    Signature::new("double", ""),
                    MethodFlags::default(),
                )),
            );
            let mut merged = decl.clone();
            merged.absorb(def);
            assert_eq!(merged.spans.len(), 2);
            assert_eq!(merged.visibility, Visibility::Public);
            let method = merged.as_method().unwrap();
            assert_eq!(method.signatures.len(), 1);
            assert!(method.flags.is_override);
        }

        #[test]
        fn overloads_keep_distinct_signatures() {
            let mut first = Symbol::new(
                QualifiedName::parse("Logger.Write"),
                Visibility::Public,
                span(1),
                SymbolPayload::Method(MethodPayload::new(
                    Signature::new("void", "string text"),
                    MethodFlags::default(),
                )),
            );
            first.absorb(Symbol::new(
                QualifiedName::parse("Logger.Write"),
                Visibility::Public,
                span(2),
                SymbolPayload::Method(MethodPayload::new(
                    Signature::new("void", "string text, int level"),
                    MethodFlags::default(),
                )),
            ));
            assert_eq!(first.signatures().len(), 2);
        }

        #[test]
        fn type_bases_union_without_duplicates() {
            let mut a = Symbol::new(
                QualifiedName::parse("App.Widget"),
                Visibility::Public,
                span(1),
                SymbolPayload::Type(TypePayload {
                    type_kind: TypeKind::Class,
                    bases: vec![BaseRef::new("Control")],
                    is_abstract: false,
                }),
            );
            a.absorb(Symbol::new(
                QualifiedName::parse("App.Widget"),
                Visibility::Unspecified,
                span(9),
                SymbolPayload::Type(TypePayload {
                    type_kind: TypeKind::Class,
                    bases: vec![BaseRef::new("Control"), BaseRef::new("IDisposable")],
                    is_abstract: false,
                }),
            ));
            let bases: Vec<&str> = a
                .as_type()
                .unwrap()
                .bases
                .iter()
                .map(|b| b.written.as_str())
                .collect();
            assert_eq!(bases, vec!["Control", "IDisposable"]);
        }

        fn method(line: u32, params: &str, flags: MethodFlags) -> Symbol {
            Symbol::new(
                QualifiedName::parse("Registry.find"),
                Visibility::Public,
                span(line),
                SymbolPayload::Method(MethodPayload::new(Signature::new("void", params), flags)),
            )
        }

        #[test]
        fn virtual_overload_clears_static() {
            let statics = MethodFlags {
                is_static: true,
                ..MethodFlags::default()
            };
            let mut merged = method(1, "int key", statics);
            merged.absorb(method(
                2,
                "double key",
                MethodFlags {
                    is_virtual: true,
                    ..MethodFlags::default()
                },
            ));
            let flags = merged.as_method().unwrap().flags;
            assert!(!flags.is_static);
            assert!(flags.is_dispatchable());

            // Two static overloads stay static.
            let mut both = method(1, "int key", statics);
            both.absorb(method(2, "double key", statics));
            assert!(both.as_method().unwrap().flags.is_static);
        }

        #[test]
        fn out_of_line_definition_keeps_static() {
            let mut merged = method(
                1,
                "int key",
                MethodFlags {
                    is_static: true,
                    ..MethodFlags::default()
                },
            );
            merged.absorb(method(30, "int key", MethodFlags::default()));
            assert!(merged.as_method().unwrap().flags.is_static);
        }
    }

    mod accessors {
        use super::*;

        #[test]
        fn deserialized_symbol_without_spans_has_no_span() {
            let symbol = Symbol::new(
                QualifiedName::parse("Registry.find"),
                Visibility::Public,
                span(1),
                SymbolPayload::Method(MethodPayload::new(
                    Signature::new("void", ""),
                    MethodFlags::default(),
                )),
            );
            let mut json = serde_json::to_value(&symbol).unwrap();
            json["spans"] = serde_json::json!([]);
            let stripped: Symbol = serde_json::from_value(json).unwrap();
            assert!(stripped.span().is_none());
            assert_eq!(symbol.span(), Some(&span(1)));
        }

        #[test]
        fn method_without_signatures_has_no_signature() {
            let payload = MethodPayload {
                signatures: Vec::new(),
                flags: MethodFlags::default(),
                overrides: None,
            };
            assert!(payload.signature().is_none());
        }
    }

    mod stable_ids {
        use super::*;

        #[test]
        fn stable_id_ignores_position() {
            let a = stable_id_for(&QualifiedName::parse("graphics.Shape"), SymbolKind::Type);
            let b = stable_id_for(&QualifiedName::parse("graphics::Shape"), SymbolKind::Type);
            assert_eq!(a, b);
            assert!(a.starts_with("sym_"));
            assert_eq!(a.len(), 20);
        }

        #[test]
        fn stable_id_distinguishes_kind_and_segmentation() {
            let name = QualifiedName::parse("graphics.Circle");
            assert_ne!(
                stable_id_for(&name, SymbolKind::Type),
                stable_id_for(&name, SymbolKind::Namespace)
            );
            assert_ne!(
                stable_id_for(&QualifiedName::new(["ab", "c"]), SymbolKind::Type),
                stable_id_for(&QualifiedName::new(["a", "bc"]), SymbolKind::Type)
            );
        }
    }
}
