//! Structural scanner for C-family source text.
//!
//! The scanner turns raw text into a flat, lazy sequence of coarse
//! [`Token`]s annotated with byte offsets, lines and brace depth. It knows just
//! enough lexical structure to find declarations reliably:
//!
//! - comments, string and character literals (including C++ raw strings, C#
//!   verbatim and interpolated strings, Java text blocks) are skipped, so
//!   braces inside them never count
//! - preprocessor lines (with backslash continuation) are skipped
//! - a parenthesized group is one [`TokenKind::Params`] token
//! - everything between a parameter list and its terminating `;` or `{` is
//!   one [`TokenKind::Opaque`] token (`const`, `= 0`, `override`, an
//!   initializer list, a `throws` clause)
//! - a `{...}` directly following a parameter list is a function body and is
//!   captured whole as one [`TokenKind::Body`] token, never tokenized
//!
//! Malformed input is never fatal. A `}` with nothing open is dropped and
//! reported; braces still open at end of file are closed with synthetic
//! [`TokenKind::RBrace`] tokens and reported once.

use std::collections::VecDeque;

use declgraph_core::diagnostics::{Diagnostic, DiagnosticKind};
use declgraph_core::span::{FileId, SourceSpan};

/// Coarse token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident,
    /// Numeric literal.
    Number,
    /// String or character literal.
    Literal,
    LBrace,
    RBrace,
    Colon,
    ColonColon,
    Comma,
    Semi,
    /// A balanced `(...)` group, parentheses included.
    Params,
    /// A balanced `[...]` group, brackets included.
    Brackets,
    /// Signature tail between a parameter list and its `;` or body.
    Opaque,
    /// A function body, braces included.
    Body,
    /// `@Name`, with its argument list if present.
    Annotation,
    /// Any other single character.
    Punct(char),
}

/// One structural token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Source text (empty for synthetic closes).
    pub text: &'a str,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Line of `start`.
    pub line: u32,
    /// Line of the last byte.
    pub end_line: u32,
    /// Brace depth outside this token. For `{` and `}` this is the depth of
    /// the scope that contains the block.
    pub depth: u32,
}

impl Token<'_> {
    /// True for an identifier with exactly this text.
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }

    /// True for the given punctuation character.
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

/// Keywords that end a signature tail: a declaration keyword after a
/// parameter list means the list belonged to something else (a macro call).
const TAIL_STOP_KEYWORDS: &[&str] = &[
    "class",
    "struct",
    "interface",
    "enum",
    "namespace",
    "package",
    "union",
    "record",
];

/// Lazy structural tokenizer over one file.
pub struct Scanner<'a> {
    src: &'a str,
    file: FileId,
    pos: usize,
    line: u32,
    depth: u32,
    /// Nothing but whitespace seen since the last newline.
    at_line_start: bool,
    /// The previous token was the `operator` keyword.
    after_operator: bool,
    /// A type keyword was seen in the current statement: a `(` group here is
    /// a record's primary constructor or a `new()` constraint, never a
    /// function parameter list.
    type_head: bool,
    /// Identifiers seen since the type keyword, while only identifiers and
    /// `::` have followed it. `struct Node* head()` and `struct stat get()`
    /// name a return type, not a type head.
    head_idents: Option<u32>,
    /// Angle depth inside `template <...>`, where `class` names a parameter.
    template_angles: Option<u32>,
    pending: VecDeque<Token<'a>>,
    diagnostics: Vec<Diagnostic>,
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `src`.
    pub fn new(file: &FileId, src: &'a str) -> Self {
        Scanner {
            src,
            file: file.clone(),
            pos: 0,
            line: 1,
            depth: 0,
            at_line_start: true,
            after_operator: false,
            type_head: false,
            head_idents: None,
            template_angles: None,
            pending: VecDeque::new(),
            diagnostics: Vec::new(),
            finished: false,
        }
    }

    /// Consume the scanner, returning its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // ------------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------------

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.at_line_start = true;
        } else if !c.is_whitespace() {
            self.at_line_start = false;
        }
        Some(c)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    fn span(&self, start: usize, line: u32) -> SourceSpan {
        SourceSpan::new(self.file.clone(), start, self.pos, line, self.line)
    }

    fn token(&self, kind: TokenKind, start: usize, line: u32, depth: u32) -> Token<'a> {
        Token {
            kind,
            text: &self.src[start..self.pos],
            start,
            end: self.pos,
            line,
            end_line: self.line,
            depth,
        }
    }

    // ------------------------------------------------------------------------
    // Trivia and literals
    // ------------------------------------------------------------------------

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.starts_with("//") => self.skip_line(),
                Some('/') if self.starts_with("/*") => self.skip_block_comment(),
                Some('#') if self.at_line_start => self.skip_preprocessor(),
                _ => return,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        self.bump_n(2);
        while self.peek().is_some() {
            if self.starts_with("*/") {
                self.bump_n(2);
                return;
            }
            self.bump();
        }
    }

    fn skip_preprocessor(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '\\' if matches!(self.peek_at(1), Some('\n')) => self.bump_n(2),
                '\\' if self.starts_with("\\\r\n") => self.bump_n(3),
                '\n' => return,
                '/' if self.starts_with("/*") => self.skip_block_comment(),
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Skip a quoted literal starting at the opening quote. Ends at the
    /// closing quote or, for an unterminated literal, at end of line.
    fn skip_quoted(&mut self, quote: char) {
        self.bump();
        while let Some(c) = self.peek() {
            match c {
                '\\' => self.bump_n(2),
                '\n' => return,
                _ if c == quote => {
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// C# verbatim string body: `""` is an escaped quote.
    fn skip_verbatim(&mut self) {
        self.bump();
        while let Some(c) = self.peek() {
            self.bump();
            if c == '"' {
                if self.peek() == Some('"') {
                    self.bump();
                } else {
                    return;
                }
            }
        }
    }

    /// Java text block / C# raw string: `"""` ... `"""`.
    fn skip_triple_quoted(&mut self) {
        self.bump_n(3);
        while self.peek().is_some() {
            if self.starts_with("\"\"\"") {
                self.bump_n(3);
                return;
            }
            if self.peek() == Some('\\') {
                self.bump_n(2);
            } else {
                self.bump();
            }
        }
    }

    /// C++ raw string starting at the opening quote: `"delim( ... )delim"`.
    fn skip_raw_string(&mut self) {
        let rest = self.rest();
        let delim_end = rest[1..]
            .find('(')
            .filter(|&i| i <= 16 && !rest[1..1 + i].contains(char::is_whitespace));
        let Some(delim_len) = delim_end else {
            self.skip_quoted('"');
            return;
        };
        let closing = format!("){}\"", &rest[1..1 + delim_len]);
        let body_start = 1 + delim_len + 1;
        match rest[body_start..].find(&closing) {
            Some(i) => {
                let target = self.pos + body_start + i + closing.len();
                while self.pos < target && self.bump().is_some() {}
            }
            None => while self.bump().is_some() {},
        }
    }

    /// If the cursor is at a literal or comment, skip it and return true.
    fn skip_literal_or_comment(&mut self, prev: Option<char>) -> bool {
        match self.peek() {
            Some('/') if self.starts_with("//") => self.skip_line(),
            Some('/') if self.starts_with("/*") => self.skip_block_comment(),
            Some('"') if self.starts_with("\"\"\"") => self.skip_triple_quoted(),
            Some('"') => self.skip_quoted('"'),
            Some('\'') => {
                // C++14 digit separator, not a character literal.
                let separator = prev.is_some_and(|p| p.is_ascii_alphanumeric())
                    && self.peek_at(1).is_some_and(|n| n.is_ascii_alphanumeric())
                    && self.peek_at(2) != Some('\'');
                if separator {
                    self.bump();
                } else {
                    self.skip_quoted('\'');
                }
            }
            Some('@') if self.peek_at(1) == Some('"') => {
                self.bump();
                self.skip_verbatim();
            }
            Some('@') if self.starts_with("@$\"") => {
                self.bump_n(2);
                self.skip_verbatim();
            }
            Some('$') if self.starts_with("$@\"") => {
                self.bump_n(2);
                self.skip_verbatim();
            }
            Some('$') if self.peek_at(1) == Some('"') => {
                self.bump();
                if self.starts_with("\"\"\"") {
                    self.skip_triple_quoted();
                } else {
                    self.skip_quoted('"');
                }
            }
            _ => return false,
        }
        true
    }

    /// Skip a balanced group starting at `open`. Returns false if the input
    /// ended first.
    fn skip_balanced(&mut self, open: char, close: char) -> bool {
        self.bump();
        let mut depth = 1u32;
        let mut prev = Some(open);
        loop {
            if self.skip_literal_or_comment(prev) {
                prev = None;
                continue;
            }
            let Some(c) = self.bump() else {
                return false;
            };
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            }
            prev = Some(c);
        }
    }

    // ------------------------------------------------------------------------
    // Signature tails and bodies
    // ------------------------------------------------------------------------

    /// After a parameter list: queue the signature tail and a body, if any.
    fn scan_tail(&mut self) {
        self.skip_trivia();
        let start = self.pos;
        let start_line = self.line;
        let mut end = start;
        let mut end_line = start_line;
        let mut saw_where = false;
        loop {
            let before = self.pos;
            let before_line = self.line;
            match self.peek() {
                None | Some(';') | Some('{') | Some('}') => break,
                Some('(') => {
                    self.skip_balanced('(', ')');
                }
                Some('[') => {
                    self.skip_balanced('[', ']');
                }
                Some(c) if is_ident_start(c) => {
                    let word = self.read_ident();
                    if word == "where" {
                        saw_where = true;
                    } else if !saw_where && TAIL_STOP_KEYWORDS.contains(&word) {
                        self.pos = before;
                        self.line = before_line;
                        break;
                    }
                }
                Some(c) if c.is_whitespace() => {
                    self.skip_trivia();
                    continue;
                }
                Some('/') if self.starts_with("//") || self.starts_with("/*") => {
                    self.skip_trivia();
                    continue;
                }
                _ => {
                    if !self.skip_literal_or_comment(None) {
                        self.bump();
                    }
                }
            }
            end = self.pos;
            end_line = self.line;
        }
        if end > start {
            self.pending.push_back(Token {
                kind: TokenKind::Opaque,
                text: &self.src[start..end],
                start,
                end,
                line: start_line,
                end_line,
                depth: self.depth,
            });
        }
        if self.peek() == Some('{') {
            let body_start = self.pos;
            let body_line = self.line;
            if !self.skip_balanced('{', '}') {
                self.diagnostics.push(Diagnostic::at(
                    DiagnosticKind::UnbalancedBraces,
                    self.span(body_start, body_line),
                    "function body is not closed before end of file",
                ));
            }
            let body = self.token(TokenKind::Body, body_start, body_line, self.depth);
            self.pending.push_back(body);
        }
    }

    fn read_ident(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn finish(&mut self) {
        self.finished = true;
        if self.depth == 0 {
            return;
        }
        let end = self.src.len();
        self.diagnostics.push(Diagnostic::at(
            DiagnosticKind::UnbalancedBraces,
            SourceSpan::new(self.file.clone(), end, end, self.line, self.line),
            format!("{} brace(s) still open at end of file", self.depth),
        ));
        while self.depth > 0 {
            self.depth -= 1;
            self.pending.push_back(Token {
                kind: TokenKind::RBrace,
                text: "",
                start: end,
                end,
                line: self.line,
                end_line: self.line,
                depth: self.depth,
            });
        }
    }

    fn scan_token(&mut self) -> Option<Token<'a>> {
        loop {
            self.skip_trivia();
            let start = self.pos;
            let line = self.line;
            let depth = self.depth;
            let c = self.peek()?;

            // Literals first: `@"`, `$"`, prefixed and raw strings.
            if matches!(c, '"' | '\'' | '@' | '$') && self.skip_literal_or_comment(None) {
                return Some(self.token(TokenKind::Literal, start, line, depth));
            }

            if is_ident_start(c) {
                let word = self.read_ident();
                if self.peek() == Some('"') {
                    if matches!(word, "R" | "LR" | "uR" | "UR" | "u8R") {
                        self.skip_raw_string();
                        return Some(self.token(TokenKind::Literal, start, line, depth));
                    }
                    if matches!(word, "L" | "u" | "U" | "u8") {
                        self.skip_quoted('"');
                        return Some(self.token(TokenKind::Literal, start, line, depth));
                    }
                }
                self.after_operator = word == "operator";
                if word == "template" {
                    self.template_angles = Some(0);
                } else if self.template_angles.is_none() && TAIL_STOP_KEYWORDS.contains(&word) {
                    self.type_head = true;
                    self.head_idents = Some(0);
                } else if let Some(n) = self.head_idents {
                    self.head_idents = Some(n + 1);
                }
                return Some(self.token(TokenKind::Ident, start, line, depth));
            }

            if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) {
                let mut prev = c;
                self.bump();
                while let Some(n) = self.peek() {
                    let exponent_sign = matches!(n, '+' | '-') && matches!(prev, 'e' | 'E' | 'p' | 'P');
                    let separator = n == '\'' && self.peek_at(1).is_some_and(|d| d.is_ascii_alphanumeric());
                    if n.is_ascii_alphanumeric() || n == '_' || n == '.' || exponent_sign || separator {
                        prev = n;
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.after_operator = false;
                return Some(self.token(TokenKind::Number, start, line, depth));
            }

            let was_operator = std::mem::replace(&mut self.after_operator, false);
            if matches!(c, '{' | '}' | ';') {
                self.type_head = false;
                self.template_angles = None;
            }
            if self.head_idents.is_some() && !self.starts_with("::") {
                let elaborated = matches!(c, '*' | '&')
                    || (c == '(' && self.head_idents.is_some_and(|n| n >= 2));
                if elaborated {
                    self.type_head = false;
                }
                self.head_idents = None;
            }
            let kind = match c {
                '{' => {
                    self.bump();
                    self.depth += 1;
                    TokenKind::LBrace
                }
                '}' => {
                    self.bump();
                    if self.depth == 0 {
                        self.diagnostics.push(Diagnostic::at(
                            DiagnosticKind::StrayCloseBrace,
                            self.span(start, line),
                            "closing brace with no open scope",
                        ));
                        continue;
                    }
                    self.depth -= 1;
                    return Some(self.token(TokenKind::RBrace, start, line, self.depth));
                }
                ':' if self.starts_with("::") => {
                    self.bump_n(2);
                    TokenKind::ColonColon
                }
                ':' => {
                    self.bump();
                    TokenKind::Colon
                }
                ',' => {
                    self.bump();
                    TokenKind::Comma
                }
                ';' => {
                    self.bump();
                    TokenKind::Semi
                }
                '(' => {
                    self.skip_balanced('(', ')');
                    let token = self.token(TokenKind::Params, start, line, depth);
                    // `operator()` names itself with an empty group; the
                    // parameter list is the next group.
                    if (was_operator && token.text == "()") || self.type_head {
                        return Some(token);
                    }
                    self.pending.push_back(token);
                    self.scan_tail();
                    return self.pending.pop_front();
                }
                '[' => {
                    self.skip_balanced('[', ']');
                    TokenKind::Brackets
                }
                '@' if self.peek_at(1).is_some_and(is_ident_start) => {
                    self.bump();
                    while let Some(n) = self.peek() {
                        if is_ident_continue(n) || n == '.' {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    let name_end = self.pos;
                    let name_line = self.line;
                    self.skip_trivia();
                    if self.peek() == Some('(') {
                        self.skip_balanced('(', ')');
                    } else {
                        self.pos = name_end;
                        self.line = name_line;
                    }
                    TokenKind::Annotation
                }
                other => {
                    self.bump();
                    self.template_angles = match (self.template_angles, other) {
                        (Some(n), '<') => Some(n + 1),
                        (Some(1), '>') => None,
                        (Some(n), '>') => Some(n.saturating_sub(1)),
                        (angles, _) => angles,
                    };
                    // A run of operator characters after `operator` stays
                    // flagged so `operator==` and `operator<<` keep their
                    // parameter list handling.
                    if was_operator && !other.is_alphanumeric() {
                        self.after_operator = true;
                    }
                    TokenKind::Punct(other)
                }
            };
            return Some(self.token(kind, start, line, depth));
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }
        if self.finished {
            return None;
        }
        match self.scan_token() {
            Some(token) => Some(token),
            None => {
                self.finish();
                self.pending.pop_front()
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

/// Scan a whole file eagerly. Convenience for tests and tools.
pub fn scan<'a>(file: &FileId, src: &'a str) -> (Vec<Token<'a>>, Vec<Diagnostic>) {
    let mut scanner = Scanner::new(file, src);
    let tokens: Vec<Token<'a>> = scanner.by_ref().collect();
    (tokens, scanner.into_diagnostics())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        scan(&FileId::new("t.cpp"), src)
            .0
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(src: &str) -> Vec<String> {
        scan(&FileId::new("t.cpp"), src)
            .0
            .into_iter()
            .map(|t| t.text.to_string())
            .collect()
    }

    mod structure {
        use super::*;

        #[test]
        fn class_head_and_braces() {
            let (tokens, diags) = scan(&FileId::new("t.cpp"), "class Circle : public Shape {\n};");
            let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    TokenKind::Ident,
                    TokenKind::Ident,
                    TokenKind::Colon,
                    TokenKind::Ident,
                    TokenKind::Ident,
                    TokenKind::LBrace,
                    TokenKind::RBrace,
                    TokenKind::Semi,
                ]
            );
            assert_eq!(tokens[5].depth, 0);
            assert_eq!(tokens[6].depth, 0);
            assert_eq!(tokens[6].line, 2);
            assert!(diags.is_empty());
        }

        #[test]
        fn method_signature_tail_and_body() {
            let src = "double area() const override { return 3.14 * r * r; }";
            assert_eq!(
                kinds(src),
                vec![
                    TokenKind::Ident,
                    TokenKind::Ident,
                    TokenKind::Params,
                    TokenKind::Opaque,
                    TokenKind::Body,
                ]
            );
            assert_eq!(texts(src)[3], "const override");
        }

        #[test]
        fn pure_virtual_tail() {
            let src = "virtual void draw() const = 0;";
            assert_eq!(
                texts(src),
                vec!["virtual", "void", "draw", "()", "const = 0", ";"]
            );
        }

        #[test]
        fn constructor_initializer_list_stays_in_tail() {
            let src = "Circle(double r) : radius(r) {}";
            assert_eq!(texts(src), vec!["Circle", "(double r)", ": radius(r)", "{}"]);
        }

        #[test]
        fn scope_separator() {
            assert_eq!(
                kinds("a::b"),
                vec![TokenKind::Ident, TokenKind::ColonColon, TokenKind::Ident]
            );
        }

        #[test]
        fn call_operator_keeps_its_parameter_list() {
            let src = "bool operator()(int x) const;";
            assert_eq!(
                texts(src),
                vec!["bool", "operator", "()", "(int x)", "const", ";"]
            );
        }

        #[test]
        fn macro_call_does_not_swallow_class() {
            let src = "DECLARE_THING(x)\nclass Foo {};";
            let texts = texts(src);
            assert!(texts.contains(&"class".to_string()));
            assert!(texts.contains(&"{".to_string()));
        }

        #[test]
        fn record_parameters_do_not_start_a_body() {
            let src = "record Point(int X, int Y) { }";
            assert_eq!(
                kinds(src),
                vec![
                    TokenKind::Ident,
                    TokenKind::Ident,
                    TokenKind::Params,
                    TokenKind::LBrace,
                    TokenKind::RBrace,
                ]
            );
        }

        #[test]
        fn template_class_parameter_keeps_function_body() {
            let src = "template <class T> void f(T x) { }";
            assert_eq!(kinds(src).last(), Some(&TokenKind::Body));
        }

        #[test]
        fn csharp_constraint_clause_stays_in_tail() {
            let src = "void Run<T>(T item) where T : class, new() { }";
            let texts = texts(src);
            assert_eq!(texts[texts.len() - 2], "where T : class, new()");
            assert_eq!(texts[texts.len() - 1], "{ }");
        }
    }

    mod literals {
        use super::*;

        #[test]
        fn braces_in_comments_and_strings_do_not_count() {
            let src = r#"
                // {
                /* { { */
                const char* s = "{";
                char c = '{';
                namespace a { }
            "#;
            let (tokens, diags) = scan(&FileId::new("t.cpp"), src);
            let braces = tokens
                .iter()
                .filter(|t| matches!(t.kind, TokenKind::LBrace | TokenKind::RBrace))
                .count();
            assert_eq!(braces, 2);
            assert!(diags.is_empty());
        }

        #[test]
        fn raw_and_verbatim_strings() {
            let (tokens, _) = scan(
                &FileId::new("t.cpp"),
                "auto s = R\"x(})\")x\"; var v = @\"a\"\"}\"; x",
            );
            assert_eq!(tokens.last().unwrap().text, "x");
            assert!(tokens.iter().all(|t| t.kind != TokenKind::RBrace));
        }

        #[test]
        fn preprocessor_lines_are_skipped() {
            let src = "#define OPEN { \\\n  more {\nint x;";
            assert_eq!(texts(src), vec!["int", "x", ";"]);
        }

        #[test]
        fn annotation_with_arguments() {
            let src = "@SuppressWarnings(\"unchecked\") @Override void run();";
            let (tokens, _) = scan(&FileId::new("T.java"), src);
            assert_eq!(tokens[0].kind, TokenKind::Annotation);
            assert_eq!(tokens[0].text, "@SuppressWarnings(\"unchecked\")");
            assert_eq!(tokens[1].text, "@Override");
        }

        #[test]
        fn digit_separators() {
            assert_eq!(texts("int x = 1'000'000;"), vec!["int", "x", "=", "1'000'000", ";"]);
        }
    }

    mod recovery {
        use super::*;

        #[test]
        fn stray_close_brace_is_dropped_and_reported() {
            let (tokens, diags) = scan(&FileId::new("t.cpp"), "} int x;");
            assert_eq!(tokens[0].text, "int");
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].kind, DiagnosticKind::StrayCloseBrace);
        }

        #[test]
        fn open_braces_are_closed_at_end_of_file() {
            let src = "namespace a { class B {";
            let (tokens, diags) = scan(&FileId::new("t.cpp"), src);
            let closes: Vec<&Token> = tokens
                .iter()
                .filter(|t| t.kind == TokenKind::RBrace)
                .collect();
            assert_eq!(closes.len(), 2);
            assert_eq!(closes[0].depth, 1);
            assert_eq!(closes[1].depth, 0);
            assert_eq!(closes[1].start, src.len());
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].kind, DiagnosticKind::UnbalancedBraces);
        }

        #[test]
        fn unterminated_body_is_reported() {
            let (tokens, diags) = scan(&FileId::new("t.cpp"), "void f() { if (x) {");
            assert_eq!(tokens.last().unwrap().kind, TokenKind::Body);
            assert_eq!(diags.len(), 1);
        }
    }
}
