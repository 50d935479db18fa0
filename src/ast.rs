//! The parser's output tree: a faithful, unresolved reflection of the token
//! stream's grammar. Nothing here performs semantic validation — that is
//! the resolver's job. Every node carries its own span via `start()`/`end()`
//! so diagnostics raised later can point at precise source ranges without
//! re-walking the tree.

use crate::position::Span;
use crate::token::TokenKind;

/// A parsed `.http` file: an ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub name: String,
    pub statements: Vec<Statement>,
}

impl File {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            statements: Vec::new(),
        }
    }
}

/// A single identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// A `key: value` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: Ident,
    pub value: Expression,
}

impl Header {
    pub fn start(&self) -> Span {
        self.key.span
    }
    pub fn end(&self) -> Span {
        self.value.end()
    }
}

/// An HTTP method token, kept alongside its source span and literal text
/// (the literal text matters when the scanner emitted a plain `Ident`
/// rather than a recognized `MethodXxx` token, so the resolver can still
/// report what the caller actually typed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub token: TokenKind,
    pub text: String,
    pub span: Span,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `@ident = expr` at top level.
    Var(VarStatement),
    /// `@prompt ident [description]` at top level.
    Prompt(PromptStatement),
    /// A full HTTP request block.
    Request(Request),
}

impl Statement {
    pub fn start(&self) -> Span {
        match self {
            Statement::Var(v) => v.at_span,
            Statement::Prompt(p) => p.at_span,
            Statement::Request(r) => r.start(),
        }
    }

    pub fn end(&self) -> Span {
        match self {
            Statement::Var(v) => v.value.as_ref().map(|e| e.end()).unwrap_or(v.name.span),
            Statement::Prompt(p) => p
                .description
                .as_ref()
                .map(|e| e.end())
                .unwrap_or(p.name.span),
            Statement::Request(r) => r.end(),
        }
    }
}

/// `@ident = expr` at top level, or a bare keyword flag (`@no-redirect`,
/// no `=`). `value` is `None` exactly when the source had no `=` — the
/// resolver rejects a missing value for ordinary vars/keywords that
/// require one and rejects a *present* value for `no-redirect`, so the AST
/// has to be able to represent both shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarStatement {
    pub at_span: Span,
    pub name: Ident,
    pub value: Option<Expression>,
}

/// `@prompt ident [description]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptStatement {
    pub at_span: Span,
    pub name: Ident,
    pub description: Option<Expression>,
}

/// A single request-scoped directive (`# @timeout = 5s`, etc.) found in
/// `Headers` mode, ahead of the request's header list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub at_span: Span,
    pub keyword: TokenKind,
    pub name: Option<Ident>,
    pub value: Option<Expression>,
}

/// Where a request body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRef {
    /// The body is the literal bytes captured after the blank line.
    Inline(Span),
    /// `< path/to/file` — the body is read from an external file.
    File(Expression),
}

/// A parsed request block: a separator-delimited unit consisting of a
/// method/URL/version line, zero or more directives and headers, an
/// optional body, and an optional response-capture marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub separator_span: Option<Span>,
    pub comment: Option<Span>,
    pub method: Method,
    pub url: Expression,
    pub http_version: Option<Span>,
    pub directives: Vec<Directive>,
    pub headers: Vec<Header>,
    pub body: Option<BodyRef>,
    /// `> path/to/file` — capture the response to a file.
    pub response_capture: Option<Expression>,
    /// `<> path/to/file` — reference a previous request's captured response.
    /// Holds a path expression, not an `Ident`: response-ref targets are
    /// arbitrary file paths (`response.200.json`), which are not valid
    /// identifiers under this grammar's ident-charset rule.
    pub response_ref: Option<Expression>,
}

impl Request {
    pub fn start(&self) -> Span {
        self.separator_span.unwrap_or(self.method.span)
    }

    pub fn end(&self) -> Span {
        if let Some(r) = &self.response_ref {
            return r.end();
        }
        if let Some(e) = &self.response_capture {
            return e.end();
        }
        if let Some(body) = &self.body {
            return match body {
                BodyRef::Inline(span) => *span,
                BodyRef::File(e) => e.end(),
            };
        }
        if let Some(h) = self.headers.last() {
            return h.end();
        }
        if let Some(d) = self.directives.last() {
            return d.value.as_ref().map(|e| e.end()).unwrap_or(
                d.name.as_ref().map(|n| n.span).unwrap_or(d.at_span),
            );
        }
        if let Some(v) = self.http_version {
            return v;
        }
        self.url.end()
    }
}

/// A value expression: literal text, a URL, an interpolation reference, or
/// (internal only — not part of the spec's named variant set, added to
/// resolve the "concatenation of segments" requirement against the
/// closed 3-variant `Expression` type) a concatenation of several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// A literal run of text.
    TextLiteral(Span),
    /// A scanned URL segment, kept distinct from `TextLiteral` because the
    /// resolver validates it against `url::Url` while plain text literals
    /// (header values, directive values) are not URL-checked.
    Url(Span),
    /// `{{ident}}`.
    Interpolation(Ident),
    /// Several segments scanned back-to-back with no separator between
    /// them, e.g. `{{base}}/items/{{id}}`.
    Concat(Vec<Expression>),
}

impl Expression {
    pub fn start(&self) -> Span {
        match self {
            Expression::TextLiteral(s) | Expression::Url(s) => *s,
            Expression::Interpolation(i) => i.span,
            Expression::Concat(parts) => parts.first().map(|p| p.start()).unwrap_or(Span::at(0)),
        }
    }

    pub fn end(&self) -> Span {
        match self {
            Expression::TextLiteral(s) | Expression::Url(s) => *s,
            Expression::Interpolation(i) => i.span,
            Expression::Concat(parts) => parts.last().map(|p| p.end()).unwrap_or(Span::at(0)),
        }
    }

    /// Flattens a freshly-built expression: a `Concat` of exactly one part
    /// collapses to that part, keeping the tree from growing spurious
    /// single-child wrapper nodes.
    pub fn concat(mut parts: Vec<Expression>) -> Expression {
        if parts.len() == 1 {
            parts.pop().expect("len checked above")
        } else {
            Expression::Concat(parts)
        }
    }
}
