//! Recursive-descent parser: token stream to AST.
//!
//! One token of lookahead, hand-written, no parser generator — the grammar
//! is small and context-sensitive in a way that maps cleanly onto explicit
//! recursive functions rather than a table-driven approach. Every parse
//! function either consumes at least one token or records an error and
//! calls [`Parser::synchronize`], which itself always advances at least
//! once; this is what makes the no-infinite-loops property hold without a
//! separate step counter, unlike the scanner's `MAX_INTERNAL_STEPS` safety
//! net.

pub mod error;

use crate::ast::{self, BodyRef, Expression, Ident, Method, Statement};
use crate::diagnostic::Diagnostic;
use crate::position::Span;
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};
use error::SyntaxError;

/// Maps a recognized keyword [`TokenKind`] back to the lowercase directive
/// name the resolver's keyword table dispatches on. The scanner already did
/// this lookup once (source text -> `TokenKind`); the parser un-does it for
/// `ast::VarStatement`/`ast::Directive`, whose `name: Ident` field the
/// resolver re-checks against the same table.
fn keyword_name_str(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::KwName => "name",
        TokenKind::KwPrompt => "prompt",
        TokenKind::KwTimeout => "timeout",
        TokenKind::KwConnectionTimeout => "connection-timeout",
        TokenKind::KwNoRedirect => "no-redirect",
        _ => "",
    }
}

/// Parses a complete `.http` source buffer into an [`ast::File`].
///
/// Owns an internal [`Scanner`] and keeps exactly one token of lookahead in
/// `cur`. `on_error` is called synchronously for every [`SyntaxError`] as it
/// is discovered, in addition to (not instead of) the error being appended
/// to [`Parser::diagnostics`].
pub struct Parser<H: FnMut(&Diagnostic)> {
    scanner: Scanner,
    cur: Token,
    name: String,
    diagnostics: Vec<Diagnostic>,
    on_error: H,
    had_error: bool,
}

impl Parser<fn(&Diagnostic)> {
    /// Creates a parser with no error-handler callback (diagnostics are
    /// still collected and retrievable via [`Parser::diagnostics`]).
    pub fn new_silent(name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        fn noop(_: &Diagnostic) {}
        Self::new(name, source, noop as fn(&Diagnostic))
    }
}

impl<H: FnMut(&Diagnostic)> Parser<H> {
    /// Creates a parser over `source`, named `name` for diagnostics.
    pub fn new(name: impl Into<String>, source: impl Into<Vec<u8>>, on_error: H) -> Self {
        let name = name.into();
        let mut scanner = Scanner::new(name.clone(), source);
        let cur = scanner.scan();
        Self {
            scanner,
            cur,
            name,
            diagnostics: Vec::new(),
            on_error,
            had_error: false,
        }
    }

    /// Diagnostics accumulated so far, in discovery order. Does not include
    /// the scanner's own lexical diagnostics — fetch those separately via
    /// whatever scanner produced this parser's tokens; later stages never
    /// re-report an earlier stage's diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Parses the whole source as a `.http` file.
    ///
    /// Returns `(file, true)` on a clean parse. If any [`SyntaxError`] was
    /// recorded, returns `(ast::File::empty(name), false)` instead — the
    /// zero value a failed parse always returns — even though parsing kept
    /// going past the first error to surface every diagnostic in one pass.
    pub fn parse(&mut self) -> (ast::File, bool) {
        let mut statements = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::Eof => break,
                TokenKind::Comment | TokenKind::Error => {
                    // Comments carry no AST node; scanner `Error` tokens were
                    // already diagnosed by the scanner, so the parser just
                    // steps over them rather than re-reporting.
                    self.advance();
                }
                TokenKind::At => {
                    if let Some(stmt) = self.parse_global_directive() {
                        statements.push(stmt);
                    }
                }
                TokenKind::Separator => {
                    let sep_span = self.cur.span();
                    self.advance();
                    statements.push(Statement::Request(self.parse_request(Some(sep_span))));
                }
                k if k.is_method() => {
                    statements.push(Statement::Request(self.parse_request(None)));
                }
                _ => {
                    let found = self.cur_text();
                    let span = self.cur.span();
                    self.error(SyntaxError::UnexpectedToken { found, span });
                    self.synchronize();
                }
            }
        }
        if self.had_error {
            (ast::File::empty(self.name.clone()), false)
        } else {
            (
                ast::File {
                    name: self.name.clone(),
                    statements,
                },
                true,
            )
        }
    }

    fn advance(&mut self) {
        self.cur = self.scanner.scan();
    }

    fn cur_text(&self) -> String {
        let span = self.cur.span();
        let src = self.scanner.source();
        let end = span.end_offset.min(src.len());
        let start = span.start_offset.min(end);
        String::from_utf8_lossy(&src[start..end]).into_owned()
    }

    fn text_at(&self, span: Span) -> String {
        let src = self.scanner.source();
        let end = span.end_offset.min(src.len());
        let start = span.start_offset.min(end);
        String::from_utf8_lossy(&src[start..end]).into_owned()
    }

    fn ident_at(&self, span: Span) -> Ident {
        Ident {
            name: self.text_at(span),
            span,
        }
    }

    fn error(&mut self, err: SyntaxError) {
        let diag = Diagnostic::new(self.name.clone(), err.to_string(), err.span());
        (self.on_error)(&diag);
        self.diagnostics.push(diag);
        self.had_error = true;
    }

    /// Skips tokens until one that can plausibly begin a new top-level
    /// statement (`Separator`, `@`, a method keyword, or `Eof`). Always
    /// advances at least once since the caller only invokes this when `cur`
    /// is already none of those.
    fn synchronize(&mut self) {
        loop {
            match self.cur.kind {
                TokenKind::Eof | TokenKind::Separator | TokenKind::At => return,
                k if k.is_method() => return,
                _ => self.advance(),
            }
        }
    }

    /// `@ident [= value]` or `@prompt ident [description]` at top level.
    fn parse_global_directive(&mut self) -> Option<Statement> {
        let at_span = self.cur.span();
        self.advance(); // past '@'
        match self.cur.kind {
            TokenKind::KwPrompt => {
                self.advance();
                let name = match self.cur.kind {
                    TokenKind::Ident => {
                        let id = self.ident_at(self.cur.span());
                        self.advance();
                        id
                    }
                    _ => {
                        let span = self.cur.span();
                        self.error(SyntaxError::MissingDirectiveName { span });
                        self.synchronize();
                        return None;
                    }
                };
                let description = self.maybe_text_expr();
                Some(Statement::Prompt(ast::PromptStatement {
                    at_span,
                    name,
                    description,
                }))
            }
            kw if kw.is_keyword() => {
                let name_span = self.cur.span();
                self.advance();
                let value = self.maybe_eq_value();
                Some(Statement::Var(ast::VarStatement {
                    at_span,
                    name: Ident {
                        name: keyword_name_str(kw).to_string(),
                        span: name_span,
                    },
                    value,
                }))
            }
            TokenKind::Ident => {
                let name = self.ident_at(self.cur.span());
                self.advance();
                let value = self.maybe_eq_value();
                Some(Statement::Var(ast::VarStatement { at_span, name, value }))
            }
            _ => {
                let span = self.cur.span();
                self.error(SyntaxError::MissingDirectiveName { span });
                self.synchronize();
                None
            }
        }
    }

    /// A request-scoped directive (`# @ident ...`), found in `Headers` mode
    /// ahead of the header list.
    fn parse_request_directive(&mut self) -> ast::Directive {
        let at_span = self.cur.span();
        self.advance(); // past '@'
        match self.cur.kind {
            TokenKind::KwPrompt => {
                self.advance();
                let name = match self.cur.kind {
                    TokenKind::Ident => {
                        let id = self.ident_at(self.cur.span());
                        self.advance();
                        Some(id)
                    }
                    _ => {
                        let span = self.cur.span();
                        self.error(SyntaxError::MissingDirectiveName { span });
                        None
                    }
                };
                let value = self.maybe_text_expr();
                ast::Directive {
                    at_span,
                    keyword: TokenKind::KwPrompt,
                    name,
                    value,
                }
            }
            kw if kw.is_keyword() => {
                self.advance();
                let value = self.maybe_eq_value();
                ast::Directive {
                    at_span,
                    keyword: kw,
                    name: None,
                    value,
                }
            }
            TokenKind::Ident => {
                let name = self.ident_at(self.cur.span());
                self.advance();
                let value = self.maybe_eq_value();
                ast::Directive {
                    at_span,
                    keyword: TokenKind::Ident,
                    name: Some(name),
                    value,
                }
            }
            _ => {
                let span = self.cur.span();
                self.error(SyntaxError::MissingDirectiveName { span });
                ast::Directive {
                    at_span,
                    keyword: TokenKind::Ident,
                    name: None,
                    value: None,
                }
            }
        }
    }

    /// `= value`, consumed only if present. The `=` is optional on a
    /// global/request directive.
    fn maybe_eq_value(&mut self) -> Option<Expression> {
        if self.cur.kind != TokenKind::Eq {
            return None;
        }
        self.advance();
        let parts = self.parse_segments(Expression::TextLiteral);
        Some(Expression::concat(parts))
    }

    /// A prompt's free-text description, if the scanner produced a
    /// non-empty `Text` token for it. The scanner always emits the token
    /// (possibly zero-width) right after a prompt name, so this always
    /// consumes exactly one token when called at the right point.
    fn maybe_text_expr(&mut self) -> Option<Expression> {
        if self.cur.kind != TokenKind::Text {
            return None;
        }
        let span = self.cur.span();
        self.advance();
        if span.start_offset == span.end_offset {
            None
        } else {
            Some(Expression::TextLiteral(span))
        }
    }

    /// Parses a sequence of `Text`/`{{ident}}` segments, as found in a URL,
    /// header value, or directive value. `wrap_text` distinguishes a URL
    /// segment (validated later against `url::Url`) from a plain literal
    /// (header/directive values, never URL-checked) — see the `Concat`
    /// note on [`ast::Expression`].
    fn parse_segments(&mut self, wrap_text: fn(Span) -> Expression) -> Vec<Expression> {
        let mut parts = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::Text => {
                    parts.push(wrap_text(self.cur.span()));
                    self.advance();
                }
                TokenKind::OpenInterp => {
                    self.advance();
                    match self.cur.kind {
                        TokenKind::Ident => {
                            let ident = self.ident_at(self.cur.span());
                            self.advance();
                            if self.cur.kind == TokenKind::CloseInterp {
                                self.advance();
                            } else {
                                let span = self.cur.span();
                                let found = self.cur_text();
                                self.error(SyntaxError::UnexpectedToken { found, span });
                            }
                            parts.push(Expression::Interpolation(ident));
                        }
                        _ => {
                            let span = self.cur.span();
                            let found = self.cur_text();
                            self.error(SyntaxError::UnexpectedToken { found, span });
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
        parts
    }

    /// A single `Text` token naming a path (`< path`, `> path`, `<> path`).
    fn parse_path_text(&mut self) -> Expression {
        if self.cur.kind == TokenKind::Text {
            let span = self.cur.span();
            self.advance();
            Expression::TextLiteral(span)
        } else {
            let span = self.cur.span();
            let found = self.cur_text();
            self.error(SyntaxError::UnexpectedToken { found, span });
            Expression::TextLiteral(Span::at(span.start_offset))
        }
    }

    /// A full request block: method line, request-scoped directives,
    /// headers, optional body, optional response section(s).
    fn parse_request(&mut self, separator_span: Option<Span>) -> ast::Request {
        let comment = if separator_span.is_some() && self.cur.kind == TokenKind::Comment {
            let span = self.cur.span();
            self.advance();
            if span.start_offset == span.end_offset {
                None
            } else {
                Some(span)
            }
        } else {
            None
        };

        debug_assert!(self.cur.kind.is_method(), "caller must check is_method()");
        let method = Method {
            token: self.cur.kind,
            text: self.cur_text(),
            span: self.cur.span(),
        };
        self.advance();

        let url_start = self.cur.span();
        let url_parts = self.parse_segments(Expression::Url);
        let url = if url_parts.is_empty() {
            self.error(SyntaxError::MissingUrl { span: url_start });
            Expression::Url(Span::at(url_start.start_offset))
        } else {
            Expression::concat(url_parts)
        };

        let http_version = if self.cur.kind == TokenKind::HttpVersion {
            let span = self.cur.span();
            self.advance();
            Some(span)
        } else {
            None
        };

        let mut directives = Vec::new();
        while self.cur.kind == TokenKind::At {
            directives.push(self.parse_request_directive());
        }

        let mut headers = Vec::new();
        while self.cur.kind == TokenKind::Header {
            headers.push(self.parse_header());
        }

        let body = match self.cur.kind {
            TokenKind::LeftAngle => {
                self.advance();
                Some(BodyRef::File(self.parse_path_text()))
            }
            TokenKind::Body => {
                let span = self.cur.span();
                self.advance();
                Some(BodyRef::Inline(span))
            }
            _ => None,
        };

        let mut response_capture = None;
        let mut response_ref = None;
        loop {
            match self.cur.kind {
                TokenKind::RightAngle => {
                    self.advance();
                    response_capture = Some(self.parse_path_text());
                }
                TokenKind::ResponseRef => {
                    self.advance();
                    response_ref = Some(self.parse_path_text());
                }
                _ => break,
            }
        }

        ast::Request {
            separator_span,
            comment,
            method,
            url,
            http_version,
            directives,
            headers,
            body,
            response_capture,
            response_ref,
        }
    }

    fn parse_header(&mut self) -> ast::Header {
        let key = self.ident_at(self.cur.span());
        self.advance(); // past the Header token
        if self.cur.kind == TokenKind::Colon {
            self.advance();
        } else {
            let span = self.cur.span();
            self.error(SyntaxError::MissingColon { span });
        }
        let parts = self.parse_segments(Expression::TextLiteral);
        ast::Header {
            key,
            value: Expression::concat(parts),
        }
    }
}
