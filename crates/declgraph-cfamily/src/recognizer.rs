//! Declaration recognizer: structural tokens to declaration events.
//!
//! The recognizer groups tokens into statements (ended by `;`, `{`, `}` or a
//! function body) and classifies each statement by pattern:
//!
//! | Pattern                                   | Event                      |
//! |-------------------------------------------|----------------------------|
//! | `namespace a::b {` / `namespace A.B;`     | `EnterNamespace`           |
//! | `package a.b;` (Java)                     | `EnterNamespace`           |
//! | `class Name : Base, Other {`              | `EnterType`                |
//! | `public:` (C++)                           | `AccessSection`            |
//! | `type name(params) tail ;` or body        | `Method`                   |
//! | `Name(params)` inside type `Name`         | `Constructor`              |
//! | `type name [= init] ;`                    | `Field`                    |
//! | `}` closing a namespace or type           | `ExitScope`                |
//!
//! Anything else is skipped silently: function bodies never reach the
//! recognizer, and unrecognized blocks are skipped whole.

use declgraph_core::events::DeclEvent;
use declgraph_core::span::{FileId, SourceSpan};
use declgraph_core::symbols::{MethodFlags, QualifiedName, Signature, TypeKind, Visibility};

use crate::language::Dialect;
use crate::scanner::{Token, TokenKind};

/// What an open `{` means.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Namespace,
    Type { name: String, kind: TypeKind },
    /// Enum body: skipped, but its close still ends the type.
    Enum,
    /// `extern "C" {` or an anonymous namespace: members belong to the
    /// enclosing scope.
    Transparent,
    /// Anything unrecognized; contents ignored.
    Skip,
}

impl Scope {
    fn emits_exit(&self) -> bool {
        matches!(self, Scope::Namespace | Scope::Type { .. } | Scope::Enum)
    }

    fn is_skipping(&self) -> bool {
        matches!(self, Scope::Enum | Scope::Skip)
    }
}

/// How a statement ended.
#[derive(Debug, Clone, Copy)]
enum Terminator<'t, 'a> {
    Semi(&'t Token<'a>),
    Block(&'t Token<'a>),
    Body(&'t Token<'a>),
}

impl Terminator<'_, '_> {
    fn token(&self) -> &Token<'_> {
        match self {
            Terminator::Semi(t) | Terminator::Block(t) | Terminator::Body(t) => t,
        }
    }
}

/// Declaration modifiers collected from the front of a statement.
#[derive(Debug, Default)]
struct Modifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    is_virtual: bool,
    is_abstract: bool,
    is_override: bool,
    is_final: bool,
    is_default: bool,
    is_friend: bool,
    is_typedef: bool,
    /// `extern "C"` linkage prefix.
    linkage: bool,
}

/// Words that modify a declaration without being part of its type.
fn is_modifier(dialect: Dialect, word: &str) -> bool {
    let common = matches!(
        word,
        "public"
            | "protected"
            | "private"
            | "static"
            | "virtual"
            | "abstract"
            | "override"
            | "final"
            | "sealed"
            | "extern"
            | "inline"
            | "friend"
            | "typedef"
            | "export"
            | "volatile"
    );
    common
        || match dialect {
            Dialect::Cpp => matches!(
                word,
                "explicit"
                    | "constexpr"
                    | "consteval"
                    | "constinit"
                    | "mutable"
                    | "thread_local"
                    | "register"
            ),
            Dialect::CSharp => matches!(
                word,
                "internal" | "readonly" | "partial" | "async" | "unsafe" | "new" | "event" | "required"
            ),
            Dialect::Java => matches!(
                word,
                "synchronized" | "native" | "transient" | "strictfp" | "default"
            ),
        }
}

/// Statements starting with these words declare nothing the engine tracks.
const IGNORED_LEADERS: &[&str] = &[
    "using",
    "import",
    "static_assert",
    "return",
    "goto",
    "delegate",
    "asm",
    "module",
];

struct Recognizer<'a> {
    dialect: Dialect,
    file: FileId,
    events: Vec<DeclEvent>,
    scopes: Vec<Scope>,
    /// File-scoped namespaces (`namespace A;`, `package a;`) to close at EOF.
    file_scoped: usize,
    stmt: Vec<Token<'a>>,
    last_end: usize,
    last_line: u32,
}

/// Turn one file's token stream into declaration events.
pub fn recognize<'a, I>(dialect: Dialect, file: &FileId, tokens: I) -> Vec<DeclEvent>
where
    I: IntoIterator<Item = Token<'a>>,
{
    let mut recognizer = Recognizer {
        dialect,
        file: file.clone(),
        events: Vec::new(),
        scopes: Vec::new(),
        file_scoped: 0,
        stmt: Vec::new(),
        last_end: 0,
        last_line: 1,
    };
    for token in tokens {
        recognizer.feed(token);
    }
    recognizer.finish()
}

impl<'a> Recognizer<'a> {
    fn feed(&mut self, token: Token<'a>) {
        self.last_end = token.end;
        self.last_line = token.end_line;

        if self.scopes.last().is_some_and(Scope::is_skipping) {
            match token.kind {
                TokenKind::LBrace => self.scopes.push(Scope::Skip),
                TokenKind::RBrace => self.close(&token),
                _ => {}
            }
            return;
        }

        match token.kind {
            TokenKind::Semi => {
                let stmt = std::mem::take(&mut self.stmt);
                if !stmt.is_empty() {
                    self.statement(&stmt, Terminator::Semi(&token));
                }
            }
            TokenKind::LBrace => {
                let stmt = std::mem::take(&mut self.stmt);
                let scope = if stmt.is_empty() {
                    None
                } else {
                    self.statement(&stmt, Terminator::Block(&token))
                };
                self.scopes.push(scope.unwrap_or(Scope::Skip));
            }
            TokenKind::Body => {
                let stmt = std::mem::take(&mut self.stmt);
                if !stmt.is_empty() {
                    self.statement(&stmt, Terminator::Body(&token));
                }
            }
            TokenKind::RBrace => {
                self.stmt.clear();
                self.close(&token);
            }
            TokenKind::Colon if self.access_section(&token) => {}
            _ => self.stmt.push(token),
        }
    }

    fn close(&mut self, token: &Token<'a>) {
        if let Some(scope) = self.scopes.pop() {
            if scope.emits_exit() {
                self.events.push(DeclEvent::ExitScope {
                    end: token.end,
                    end_line: token.end_line,
                });
            }
        }
    }

    fn finish(mut self) -> Vec<DeclEvent> {
        for _ in 0..self.file_scoped {
            self.events.push(DeclEvent::ExitScope {
                end: self.last_end,
                end_line: self.last_line,
            });
        }
        self.events
    }

    /// Innermost scope that is not transparent.
    fn enclosing(&self) -> Option<&Scope> {
        self.scopes.iter().rev().find(|s| **s != Scope::Transparent)
    }

    fn enclosing_type(&self) -> Option<(&str, TypeKind)> {
        match self.enclosing() {
            Some(Scope::Type { name, kind }) => Some((name.as_str(), *kind)),
            _ => None,
        }
    }

    fn span(&self, first: &Token<'_>, last: &Token<'_>) -> SourceSpan {
        SourceSpan::new(
            self.file.clone(),
            first.start,
            last.end.max(first.start),
            first.line,
            last.end_line,
        )
    }

    /// `public:` (and Qt's `public slots:`) inside a C++ type.
    fn access_section(&mut self, colon: &Token<'a>) -> bool {
        if !self.dialect.has_access_sections() || self.enclosing_type().is_none() {
            return false;
        }
        let keyword_index = match self.stmt.as_slice() {
            [.., kw] if kw.kind == TokenKind::Ident => self.stmt.len() - 1,
            _ => return false,
        };
        let mut index = keyword_index;
        if matches!(self.stmt[index].text, "slots" | "Q_SLOTS") && index > 0 {
            index -= 1;
        }
        let Some(visibility) = Visibility::from_keyword(self.stmt[index].text)
            .filter(|v| *v != Visibility::Internal)
        else {
            return false;
        };
        let span = self.span(&self.stmt[index], colon);
        self.events.push(DeclEvent::AccessSection { visibility, span });
        self.stmt.clear();
        true
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    /// Classify one statement. Returns the scope a `{` terminator opens.
    fn statement(&mut self, tokens: &[Token<'a>], term: Terminator<'_, 'a>) -> Option<Scope> {
        let (mods, is_override_annotation, rest) = self.prefix(tokens);
        let span = self.span(&tokens[0], term.token());

        if mods.is_friend {
            return None;
        }
        if mods.linkage && rest.is_empty() {
            return matches!(term, Terminator::Block(_)).then_some(Scope::Transparent);
        }
        let first = rest.first()?;

        if first.kind == TokenKind::Ident {
            match first.text {
                "namespace" => return self.namespace(&rest[1..], term, span),
                "package" if self.dialect == Dialect::Java => {
                    return self.namespace(&rest[1..], term, span)
                }
                "class" | "struct" | "union" | "interface" | "enum" | "record"
                    if !function_params(rest).is_some_and(|p| elaborated_return(rest, p)) =>
                {
                    return self.type_decl(rest, &mods, term, span);
                }
                word if IGNORED_LEADERS.contains(&word) => return None,
                _ => {}
            }
        }
        if mods.is_typedef {
            return None;
        }

        let mut mods = mods;
        mods.is_override |= is_override_annotation;
        match function_params(rest) {
            Some(params) => {
                self.function(rest, params, &mods, term, span);
                None
            }
            None => self.fields(rest, &mods, term, span),
        }
    }

    /// Strip annotations, attributes, template prefixes and modifiers.
    fn prefix<'t>(&self, tokens: &'t [Token<'a>]) -> (Modifiers, bool, &'t [Token<'a>]) {
        let mut mods = Modifiers::default();
        let mut override_annotation = false;
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::Annotation => {
                    let name = token.text.split('(').next().unwrap_or("").trim();
                    if name == "@Override" || name.ends_with(".Override") {
                        override_annotation = true;
                    }
                    i += 1;
                }
                TokenKind::Brackets => i += 1,
                TokenKind::Ident if token.text == "template" => {
                    i += 1;
                    if tokens.get(i).is_some_and(|t| t.is_punct('<')) {
                        i = skip_angles(tokens, i);
                    }
                }
                TokenKind::Ident if token.text == "extern" => {
                    i += 1;
                    if tokens.get(i).is_some_and(|t| t.kind == TokenKind::Literal) {
                        mods.linkage = true;
                        i += 1;
                    }
                }
                TokenKind::Ident if is_modifier(self.dialect, token.text) => {
                    match token.text {
                        "static" => mods.is_static = true,
                        "virtual" => mods.is_virtual = true,
                        "abstract" => mods.is_abstract = true,
                        "override" => mods.is_override = true,
                        "final" | "sealed" => mods.is_final = true,
                        "default" => mods.is_default = true,
                        "friend" => mods.is_friend = true,
                        "typedef" => mods.is_typedef = true,
                        word => {
                            if let Some(v) = Visibility::from_keyword(word) {
                                mods.visibility = Some(v);
                            }
                        }
                    }
                    i += 1;
                }
                _ => break,
            }
        }
        (mods, override_annotation, &tokens[i..])
    }

    fn namespace(
        &mut self,
        rest: &[Token<'a>],
        term: Terminator<'_, 'a>,
        span: SourceSpan,
    ) -> Option<Scope> {
        if rest.iter().any(|t| t.is_punct('=')) {
            // Namespace alias.
            return None;
        }
        let path = QualifiedName::new(
            rest.iter()
                .take_while(|t| {
                    matches!(t.kind, TokenKind::Ident | TokenKind::ColonColon)
                        || t.is_punct('.')
                })
                .filter(|t| t.kind == TokenKind::Ident)
                .map(|t| t.text),
        );
        match term {
            Terminator::Block(_) if path.is_root() => Some(Scope::Transparent),
            Terminator::Block(_) => {
                self.events.push(DeclEvent::EnterNamespace { path, span });
                Some(Scope::Namespace)
            }
            Terminator::Semi(_) if !path.is_root() && self.dialect != Dialect::Cpp => {
                self.events.push(DeclEvent::EnterNamespace { path, span });
                self.file_scoped += 1;
                None
            }
            _ => None,
        }
    }

    fn type_decl(
        &mut self,
        rest: &[Token<'a>],
        mods: &Modifiers,
        term: Terminator<'_, 'a>,
        span: SourceSpan,
    ) -> Option<Scope> {
        let keyword = rest[0].text;
        let mut i = 1;
        if keyword == "enum" && rest.get(i).is_some_and(|t| t.is_ident("class") || t.is_ident("struct")) {
            i += 1;
        }
        let type_kind = match keyword {
            "struct" | "union" => TypeKind::Struct,
            "interface" => TypeKind::Interface,
            "enum" => TypeKind::Enum,
            _ => TypeKind::Class,
        };

        // Head: everything up to generic parameters or the base list.
        let head_end = rest[i..]
            .iter()
            .position(|t| {
                t.kind == TokenKind::Colon
                    || t.is_punct('<')
                    || t.kind == TokenKind::Params
                    || ["extends", "implements", "where", "permits"]
                        .iter()
                        .any(|kw| t.is_ident(kw))
            })
            .map_or(rest.len(), |p| p + i);
        let head: Vec<&Token<'a>> = rest[i..head_end]
            .iter()
            .filter(|t| {
                t.kind != TokenKind::Brackets && !t.is_ident("final") && !t.is_ident("sealed")
            })
            .collect();

        // C-style variable with an elaborated type: `struct stat buf;`
        if matches!(term, Terminator::Semi(_))
            && matches!(keyword, "struct" | "union" | "enum")
            && head.len() >= 2
            && head.iter().all(|t| t.kind == TokenKind::Ident)
        {
            return self.fields(rest, mods, term, span);
        }

        let name = qualified_tail(&head);
        if name.is_empty() {
            return matches!(term, Terminator::Block(_)).then_some(Scope::Skip);
        }

        let mut j = head_end;
        if rest.get(j).is_some_and(|t| t.is_punct('<')) {
            j = skip_angles(rest, j);
        }
        let bases = if type_kind == TypeKind::Enum {
            Vec::new()
        } else {
            base_list(&rest[j.min(rest.len())..])
        };

        let simple = name.rsplit("::").next().unwrap_or(name.as_str()).to_string();
        let event = DeclEvent::EnterType {
            name,
            bases,
            type_kind,
            visibility: mods.visibility,
            is_abstract: mods.is_abstract,
            span,
        };
        match term {
            Terminator::Block(_) => {
                self.events.push(event);
                if type_kind == TypeKind::Enum {
                    Some(Scope::Enum)
                } else {
                    Some(Scope::Type {
                        name: simple,
                        kind: type_kind,
                    })
                }
            }
            Terminator::Semi(t) => {
                // Forward declaration: a type symbol with no members.
                self.events.push(event);
                self.events.push(DeclEvent::ExitScope {
                    end: t.end,
                    end_line: t.end_line,
                });
                None
            }
            Terminator::Body(_) => None,
        }
    }

    fn function(
        &mut self,
        rest: &[Token<'a>],
        params: usize,
        mods: &Modifiers,
        term: Terminator<'_, 'a>,
        span: SourceSpan,
    ) {
        if matches!(term, Terminator::Block(_)) {
            return;
        }
        let Some((name_start, segments)) = function_name(rest, params) else {
            return;
        };
        let return_type = join_tokens(&rest[..name_start]);
        let param_text = collapse_whitespace(
            rest[params]
                .text
                .strip_prefix('(')
                .and_then(|s| s.strip_suffix(')'))
                .unwrap_or(rest[params].text),
        );
        let tail = rest
            .get(params + 1)
            .filter(|t| t.kind == TokenKind::Opaque)
            .map_or("", |t| t.text);
        let compact_tail: String = tail.chars().filter(|c| !c.is_whitespace()).collect();
        let has_body = matches!(term, Terminator::Body(_)) || compact_tail.contains("=>");

        let Some(last) = segments.last().cloned() else {
            return;
        };
        let enclosing = self.enclosing_type();
        let is_constructor = return_type.is_empty()
            && !last.starts_with('~')
            && match segments.len() {
                1 => enclosing.is_some_and(|(name, _)| name == last),
                n => strip_generics(&segments[n - 2]) == last,
            };

        if is_constructor {
            self.events.push(DeclEvent::Constructor {
                name: QualifiedName::new(segments),
                signature: Signature::new("", param_text),
                visibility: mods.visibility,
                span,
            });
            return;
        }
        if return_type.is_empty() && !last.starts_with('~') {
            // Macro invocation or call expression.
            return;
        }

        let in_interface = enclosing.is_some_and(|(_, kind)| kind == TypeKind::Interface);
        let in_type = enclosing.is_some() && segments.len() == 1;
        let interface_abstract = self.dialect.has_interfaces()
            && in_interface
            && !has_body
            && !mods.is_static
            && !mods.is_default;
        let is_abstract = mods.is_abstract || compact_tail.ends_with("=0") || interface_abstract;
        let implicit_virtual = self.dialect.methods_virtual_by_default()
            && in_type
            && !mods.is_static
            && !mods.is_final
            && mods.visibility != Some(Visibility::Private);
        let tail_override = tail
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .any(|w| w == "override");

        let flags = MethodFlags {
            is_virtual: mods.is_virtual || is_abstract || implicit_virtual || in_interface,
            is_abstract,
            is_override: mods.is_override || tail_override,
            is_static: mods.is_static,
        };
        self.events.push(DeclEvent::Method {
            name: QualifiedName::new(segments),
            signature: Signature::new(return_type, param_text),
            flags,
            visibility: mods.visibility,
            span,
        });
    }

    /// Field declarations (one event per declarator). A C# property or a C++
    /// brace initializer (`double radius{1.0}`) opens a block that is skipped.
    fn fields(
        &mut self,
        rest: &[Token<'a>],
        mods: &Modifiers,
        term: Terminator<'_, 'a>,
        span: SourceSpan,
    ) -> Option<Scope> {
        let block = matches!(term, Terminator::Block(_));
        let property = block && self.dialect == Dialect::CSharp && self.enclosing_type().is_some();
        let brace_init = block
            && self.dialect == Dialect::Cpp
            && !rest.iter().any(|t| t.kind == TokenKind::Params);
        if block && !(property || brace_init) {
            return None;
        }
        let property = block;
        if matches!(term, Terminator::Body(_)) {
            return None;
        }

        let mut declarators = split_commas(rest).into_iter();
        let Some(first) = declarators.next() else {
            return property.then_some(Scope::Skip);
        };
        let first = cut_initializer(first);
        let Some((name_index, suffix)) = declarator_name(first) else {
            return property.then_some(Scope::Skip);
        };
        if name_index == 0 {
            return property.then_some(Scope::Skip);
        }
        let base_type = join_tokens(&first[..name_index]);
        let mut declared = vec![(first[name_index].text.to_string(), format!("{}{}", base_type, suffix))];

        for declarator in declarators {
            let declarator = cut_initializer(declarator);
            if let Some((index, suffix)) = declarator_name(declarator) {
                declared.push((
                    declarator[index].text.to_string(),
                    format!("{}{}", base_type, suffix),
                ));
            }
        }

        for (name, type_text) in declared {
            self.events.push(DeclEvent::Field {
                name,
                type_text,
                visibility: mods.visibility,
                span: span.clone(),
            });
        }
        property.then_some(Scope::Skip)
    }
}

// ============================================================================
// Token helpers
// ============================================================================

/// Index just past the `>` matching the `<` at `open`.
fn skip_angles(tokens: &[Token<'_>], open: usize) -> usize {
    let mut depth = 0i32;
    for (i, t) in tokens.iter().enumerate().skip(open) {
        if t.is_punct('<') {
            depth += 1;
        } else if t.is_punct('>') {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        } else if matches!(t.kind, TokenKind::Semi | TokenKind::LBrace) {
            return i;
        }
    }
    tokens.len()
}

/// Index of the `<` matching the `>` at `close`, scanning backwards.
fn match_angles_back(tokens: &[Token<'_>], close: usize) -> Option<usize> {
    let mut depth = 0i32;
    for i in (0..=close).rev() {
        if tokens[i].is_punct('>') {
            depth += 1;
        } else if tokens[i].is_punct('<') {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Trailing `A::B::C` run of a token list, as written.
fn qualified_tail(tokens: &[&Token<'_>]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut expect_ident = true;
    for t in tokens.iter().rev() {
        match t.kind {
            TokenKind::Ident if expect_ident => {
                parts.push(t.text);
                expect_ident = false;
            }
            TokenKind::ColonColon if !expect_ident => expect_ident = true,
            _ => break,
        }
    }
    parts.reverse();
    parts.join("::")
}

/// Index of the parameter list if the statement looks like a function
/// declaration: the first `(...)` group outside template arguments, provided
/// no `=` comes before it. Operator names (`operator==`, `operator<`) are
/// exempt from both checks.
fn function_params(rest: &[Token<'_>]) -> Option<usize> {
    let mut in_operator = false;
    let mut angle = 0i32;
    for (i, t) in rest.iter().enumerate() {
        if t.is_ident("operator") {
            in_operator = true;
            continue;
        }
        if !in_operator {
            if t.is_punct('=') {
                return None;
            }
            if t.is_punct('<') {
                angle += 1;
            } else if t.is_punct('>') {
                angle -= 1;
            }
        }
        if t.kind == TokenKind::Params && i > 0 && angle <= 0 {
            // `operator()` names itself with an empty group.
            let is_operator_name = t.text == "()"
                && rest[i - 1].is_ident("operator")
                && rest.get(i + 1).is_some_and(|n| n.kind == TokenKind::Params);
            if !is_operator_name {
                return Some(i);
            }
        }
    }
    None
}

/// `struct Node* head()`: the type keyword starts an elaborated return type.
/// Between the keyword and the parameter list there are only names, `::`,
/// `*` and `&`, and either a pointer/reference or a second name.
fn elaborated_return(rest: &[Token<'_>], params: usize) -> bool {
    let between = &rest[1..params];
    let plain = between.iter().all(|t| {
        matches!(t.kind, TokenKind::Ident | TokenKind::ColonColon)
            || t.is_punct('*')
            || t.is_punct('&')
    });
    let names = between.iter().filter(|t| t.kind == TokenKind::Ident).count();
    let indirection = between.iter().any(|t| t.is_punct('*') || t.is_punct('&'));
    plain && (names >= 2 || indirection)
}

/// Start index and qualified segments of a function's name.
fn function_name(rest: &[Token<'_>], params: usize) -> Option<(usize, Vec<String>)> {
    let mut name_start;
    let mut segments: Vec<String> = Vec::new();

    if let Some(op) = rest[..params].iter().rposition(|t| t.is_ident("operator")) {
        let symbol: String = rest[op + 1..params].iter().map(|t| t.text).collect();
        segments.push(format!("operator{}", symbol));
        name_start = op;
    } else {
        let mut k = params.checked_sub(1)?;
        if rest[k].is_punct('>') {
            // Generic method: `Foo<T>(...)`.
            k = match_angles_back(rest, k)?.checked_sub(1)?;
        }
        if rest[k].kind != TokenKind::Ident {
            return None;
        }
        name_start = k;
        if k > 0 && rest[k - 1].is_punct('~') {
            segments.push(format!("~{}", rest[k].text));
            name_start = k - 1;
        } else {
            segments.push(rest[k].text.to_string());
        }
    }

    // Qualification: `ns::Type::name`.
    while name_start >= 1 && rest[name_start - 1].kind == TokenKind::ColonColon {
        let Some(mut q) = name_start.checked_sub(2) else {
            name_start -= 1;
            break;
        };
        if rest[q].is_punct('>') {
            q = match_angles_back(rest, q)?.checked_sub(1)?;
        }
        if rest[q].kind != TokenKind::Ident {
            break;
        }
        segments.insert(0, rest[q].text.to_string());
        name_start = q;
    }
    Some((name_start, segments))
}

/// Base references after a type head: `: A, B<T>` or `extends A implements B`.
fn base_list(tokens: &[Token<'_>]) -> Vec<String> {
    let mut collecting = false;
    let mut current: Vec<&Token<'_>> = Vec::new();
    let mut bases = Vec::new();
    let mut angle = 0i32;

    let mut flush = |current: &mut Vec<&Token<'_>>, bases: &mut Vec<String>| {
        let parts: Vec<&Token<'_>> = current
            .iter()
            .copied()
            .skip_while(|t| {
                matches!(t.text, "public" | "protected" | "private" | "virtual" | "internal")
            })
            .collect();
        let written = join_refs(&parts);
        if !written.is_empty() {
            bases.push(written);
        }
        current.clear();
    };

    for t in tokens {
        if angle == 0 {
            if t.kind == TokenKind::Colon || t.is_ident("extends") || t.is_ident("implements") {
                if collecting {
                    flush(&mut current, &mut bases);
                }
                collecting = true;
                continue;
            }
            if t.is_ident("where") || t.is_ident("permits") {
                break;
            }
            if t.kind == TokenKind::Comma {
                flush(&mut current, &mut bases);
                continue;
            }
        }
        if !collecting || t.kind == TokenKind::Params {
            continue;
        }
        if t.is_punct('<') {
            angle += 1;
        } else if t.is_punct('>') {
            angle -= 1;
        }
        current.push(t);
    }
    if collecting {
        flush(&mut current, &mut bases);
    }
    bases
}

/// Split on top-level commas (outside `<...>`).
fn split_commas<'t, 'a>(tokens: &'t [Token<'a>]) -> Vec<&'t [Token<'a>]> {
    let mut parts = Vec::new();
    let mut angle = 0i32;
    let mut start = 0;
    for (i, t) in tokens.iter().enumerate() {
        if t.is_punct('<') {
            angle += 1;
        } else if t.is_punct('>') {
            angle -= 1;
        } else if t.kind == TokenKind::Comma && angle <= 0 {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Drop an initializer (`= ...`) or bit-field width (`: 3`).
fn cut_initializer<'t, 'a>(tokens: &'t [Token<'a>]) -> &'t [Token<'a>] {
    let end = tokens
        .iter()
        .position(|t| t.is_punct('=') || t.kind == TokenKind::Colon)
        .unwrap_or(tokens.len());
    &tokens[..end]
}

/// Index of a declarator's name plus any array suffix written after it.
fn declarator_name(tokens: &[Token<'_>]) -> Option<(usize, String)> {
    let mut end = tokens.len();
    let mut suffix = String::new();
    while end > 0 && tokens[end - 1].kind == TokenKind::Brackets {
        suffix.insert_str(0, tokens[end - 1].text);
        end -= 1;
    }
    let index = end.checked_sub(1)?;
    (tokens[index].kind == TokenKind::Ident).then_some((index, suffix))
}

fn is_wordy(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident | TokenKind::Number | TokenKind::Literal | TokenKind::Annotation
    )
}

/// Join type tokens into readable text: `const std::string&`,
/// `Dictionary<string, int>`, `unsigned long`.
fn join_tokens(tokens: &[Token<'_>]) -> String {
    let refs: Vec<&Token<'_>> = tokens.iter().collect();
    join_refs(&refs)
}

fn join_refs(tokens: &[&Token<'_>]) -> String {
    let mut out = String::new();
    let mut prev: Option<TokenKind> = None;
    for t in tokens {
        if t.kind == TokenKind::Annotation {
            continue;
        }
        if let Some(p) = prev {
            if (is_wordy(p) && is_wordy(t.kind)) || p == TokenKind::Comma {
                out.push(' ');
            }
        }
        out.push_str(t.text);
        prev = Some(t.kind);
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_generics(segment: &str) -> &str {
    segment.split('<').next().unwrap_or(segment)
}
