//! Byte-stream scanner: turns raw `.http` source bytes into a token stream.
//!
//! The scanner tracks a small, flat lexer mode (`TopLevel`/`Headers`/`Body`)
//! — not a general mode stack, since the grammar is not recursive in
//! lexer-mode space — plus a short-lived `Expect` state used to thread
//! multi-token constructs (a header's `name`/`:`/`value`, an interpolation's
//! `{{`/ident/`}}`) across successive [`Scanner::scan`] calls. Neither piece
//! of state is a stack: both are single values overwritten on every
//! transition.
//!
//! Every byte of input is accounted for: recognized bytes advance the
//! cursor as part of a token or a silent skip (blank lines, inline
//! whitespace); unrecognized bytes or invalid UTF-8 are reported as a
//! [`Diagnostic`] and skipped one byte at a time via an [`TokenKind::Error`]
//! token. The scanner never panics and never stalls — see the `scanner
//! progress` property test at the bottom of this module and the fuzz test
//! in `tests/fuzz_robustness.rs`.

use crate::diagnostic::Diagnostic;
use crate::position::Span;
use crate::token::{lookup_keyword, lookup_method, Token, TokenKind};

/// Defensive cap on the number of zero-byte-consuming internal state
/// transitions `scan()` may take before it forces an `Error` token. The
/// state graph below is a DAG with no such cycles, so this should never
/// trigger; it exists so a latent bug degrades to "bad token" rather than
/// "hang", which is what the fuzz-robustness requirement actually demands.
const MAX_INTERNAL_STEPS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    TopLevel,
    Headers,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegKind {
    Url,
    HeaderValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Nothing pending: next call dispatches fresh off `mode` and the
    /// current line's leading bytes.
    LineStart,
    /// Scanning `Text`/`{{`-interpolation segments for a URL or header value.
    Segment(SegKind),
    /// Just finished a URL; an `HTTP/x.y` token may follow on the same line.
    MaybeVersion,
    /// Just emitted a `Header` token; next must be `:`.
    HeaderColon,
    /// Just emitted `@`; the next ident is checked against the keyword table.
    AfterAt,
    /// Just emitted `KwPrompt`; the next ident is the prompt's own name
    /// (never keyword-checked), then free text to end of line.
    PromptName,
    /// Just scanned a prompt's name; the rest of the line (if any) is its
    /// description, scanned as a single trimmed `Text` token.
    PromptDescription,
    /// Just emitted `<`, `>`, or `<>`; the rest of the line is a path,
    /// scanned as a single trimmed `Text` token.
    PathValue,
    /// Just emitted `###`; an optional same-line comment may follow.
    SeparatorCommentTail,
    /// Just emitted `=` in a directive; the rest of the line is the value.
    DirectiveValue,
    /// Just emitted `{{`; scanning the interpolation's identifier.
    InterpIdent(SegKind),
    /// Just scanned the interpolation identifier; next must be `}}`.
    AfterInterpIdent(SegKind),
}

/// Tokenizes `.http` source bytes, one [`Token`] per [`Scanner::scan`] call.
pub struct Scanner {
    name: String,
    src: Vec<u8>,
    offset: usize,
    mode: Mode,
    expect: Expect,
    diagnostics: Vec<Diagnostic>,
    done: bool,
}

impl Scanner {
    /// Creates a scanner over `src`, named `name` for diagnostics.
    pub fn new(name: impl Into<String>, src: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
            offset: 0,
            mode: Mode::TopLevel,
            expect: Expect::LineStart,
            diagnostics: Vec::new(),
            done: false,
        }
    }

    /// The raw source bytes this scanner was built over.
    pub fn source(&self) -> &[u8] {
        &self.src
    }

    /// The file name this scanner reports diagnostics against.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Diagnostics accumulated so far, in discovery order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn push_diag(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(self.name.clone(), message, span));
    }

    fn at_eof(&self) -> bool {
        self.offset >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.offset).copied()
    }

    fn peek_at(&self, delta: usize) -> Option<u8> {
        self.src.get(self.offset + delta).copied()
    }

    /// Skips spaces and tabs (not newlines) at the cursor.
    fn skip_inline_ws(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.offset += 1;
        }
    }

    /// True if, from the cursor, only inline whitespace remains before a
    /// newline or EOF (i.e. the rest of "this line" is blank).
    fn rest_of_line_is_blank(&self) -> bool {
        let mut o = self.offset;
        while let Some(b) = self.src.get(o).copied() {
            match b {
                b' ' | b'\t' => o += 1,
                b'\n' => return true,
                _ => return false,
            }
        }
        true
    }

    /// Consumes a full blank line (leading whitespace plus the newline).
    fn consume_blank_line(&mut self) {
        self.skip_inline_ws();
        if self.peek() == Some(b'\n') {
            self.offset += 1;
        }
    }

    /// Returns the length of a `#`-run at the cursor, if it is 3 or more
    /// (a separator) — otherwise `None`.
    fn separator_run_len(&self) -> Option<usize> {
        let mut n = 0;
        while self.peek_at(n) == Some(b'#') {
            n += 1;
        }
        if n >= 3 {
            Some(n)
        } else {
            None
        }
    }

    fn is_ident_start(b: u8) -> bool {
        b.is_ascii_alphabetic() || b == b'_'
    }

    fn is_ident_continue(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
    }

    /// Scans the maximal identifier-charset run at the cursor. Returns
    /// `None` if the cursor isn't at a valid identifier start.
    fn scan_ident_span(&mut self) -> Option<Span> {
        let start = self.offset;
        if !self.peek().map(Self::is_ident_start).unwrap_or(false) {
            return None;
        }
        self.offset += 1;
        while self.peek().map(Self::is_ident_continue).unwrap_or(false) {
            self.offset += 1;
        }
        Some(Span::new(start, self.offset))
    }

    /// Validates that `bytes` is well-formed UTF-8, returning the number of
    /// leading valid bytes if not. Used to keep every emitted token span a
    /// valid `&str` by construction.
    fn valid_utf8_prefix_len(bytes: &[u8]) -> usize {
        match std::str::from_utf8(bytes) {
            Ok(_) => bytes.len(),
            Err(e) => e.valid_up_to(),
        }
    }

    /// True if, starting at byte offset `o`, the rest of the line is
    /// (optional inline whitespace, then) an `HTTP/x.y` version token and
    /// nothing else. Used to decide whether whitespace inside a `Url`
    /// segment is the boundary before a trailing version token (and should
    /// end the URL run) or just more — malformed but diagnostic-worthy —
    /// URL text to keep consuming: `GET not a url` should resolve to a
    /// single invalid-URL span covering the whole `not a url`, not stop at
    /// the first space.
    fn looks_like_version_tail(&self, mut o: usize) -> bool {
        while matches!(self.src.get(o).copied(), Some(b' ') | Some(b'\t')) {
            o += 1;
        }
        if !(self.src.get(o).copied() == Some(b'H')
            && self.src.get(o + 1).copied() == Some(b'T')
            && self.src.get(o + 2).copied() == Some(b'T')
            && self.src.get(o + 3).copied() == Some(b'P')
            && self.src.get(o + 4).copied() == Some(b'/'))
        {
            return false;
        }
        o += 5;
        let mut saw_digit = false;
        while self
            .src
            .get(o)
            .copied()
            .map(|b| b.is_ascii_digit() || b == b'.')
            .unwrap_or(false)
        {
            saw_digit |= self.src[o].is_ascii_digit();
            o += 1;
        }
        if !saw_digit {
            return false;
        }
        while matches!(self.src.get(o).copied(), Some(b' ') | Some(b'\t')) {
            o += 1;
        }
        matches!(self.src.get(o).copied(), Some(b'\n') | None)
    }

    /// Scans a run of bytes starting at the cursor, stopping before any of:
    /// EOF, `\n`, or the start of a `{{` interpolation. For `Url` segments,
    /// inline whitespace only stops the run when it is immediately
    /// followed by a trailing `HTTP/x.y` version token (or end of line) —
    /// otherwise it is consumed as (malformed) URL text, so a later stage
    /// can still validate and diagnose the whole thing as one span.
    /// Returns `None` if nothing can be consumed (i.e. the run would be
    /// empty) and does not advance the cursor.
    fn scan_text_run(&mut self, kind: SegKind) -> Option<Span> {
        let start = self.offset;
        let mut o = self.offset;
        loop {
            match self.src.get(o).copied() {
                None => break,
                Some(b'\n') => break,
                Some(b'{') if self.src.get(o + 1).copied() == Some(b'{') => break,
                Some(b' ') | Some(b'\t') if kind == SegKind::Url => {
                    if self.looks_like_version_tail(o) {
                        break;
                    }
                    o += 1;
                }
                Some(_) => o += 1,
            }
        }
        if o == start {
            return None;
        }
        let valid = Self::valid_utf8_prefix_len(&self.src[start..o]);
        let end = start + valid;
        if end == start {
            return None;
        }
        self.offset = end;
        Some(Span::new(start, end))
    }

    /// Scans the rest of the current line (excluding the newline) as a
    /// single trimmed span, consuming the trailing newline if present.
    fn scan_line_remainder_trimmed(&mut self) -> Span {
        let start = self.offset;
        let mut o = self.offset;
        while let Some(b) = self.src.get(o).copied() {
            if b == b'\n' {
                break;
            }
            o += 1;
        }
        let valid = Self::valid_utf8_prefix_len(&self.src[start..o]);
        let raw_end = start + valid;
        // Trim trailing inline whitespace within the valid range.
        let mut end = raw_end;
        while end > start && matches!(self.src[end - 1], b' ' | b'\t' | b'\r') {
            end -= 1;
        }
        // Trim leading inline whitespace.
        let mut trimmed_start = start;
        while trimmed_start < end && matches!(self.src[trimmed_start], b' ' | b'\t') {
            trimmed_start += 1;
        }
        self.offset = o;
        if self.peek() == Some(b'\n') {
            self.offset += 1;
        }
        Span::new(trimmed_start, end.max(trimmed_start))
    }

    /// Produces the next token. Terminates the stream with `Eof` (or an
    /// `Error` token for unrecoverable cases); callers should stop once
    /// `Eof` is returned.
    pub fn scan(&mut self) -> Token {
        if self.done {
            return Token::new(TokenKind::Eof, self.offset, self.offset);
        }
        for _ in 0..MAX_INTERNAL_STEPS {
            if let Some(tok) = self.step() {
                if tok.kind == TokenKind::Eof {
                    self.done = true;
                }
                return tok;
            }
        }
        // Structural safety net only; see MAX_INTERNAL_STEPS doc comment.
        let start = self.offset;
        self.offset = (self.offset + 1).min(self.src.len());
        self.push_diag("scanner could not make progress", Span::new(start, self.offset));
        Token::new(TokenKind::Error, start, self.offset)
    }

    /// Runs one step of the state machine. Returns `Some(token)` when a
    /// token is ready to emit, or `None` if it only changed internal state
    /// and `scan()` should loop again.
    fn step(&mut self) -> Option<Token> {
        match self.expect {
            Expect::Segment(kind) => return Some(self.step_segment(kind)),
            Expect::InterpIdent(kind) => return Some(self.step_interp_ident(kind)),
            Expect::AfterInterpIdent(kind) => return Some(self.step_after_interp_ident(kind)),
            Expect::MaybeVersion => return Some(self.step_maybe_version()),
            Expect::HeaderColon => return Some(self.step_header_colon()),
            Expect::AfterAt => return Some(self.step_after_at()),
            Expect::PromptName => return Some(self.step_prompt_name()),
            Expect::PromptDescription => return Some(self.step_prompt_description()),
            Expect::PathValue => return Some(self.step_path_value()),
            Expect::SeparatorCommentTail => return Some(self.step_separator_comment_tail()),
            Expect::DirectiveValue => return Some(self.step_directive_value()),
            Expect::LineStart => {}
        }

        if self.at_eof() {
            return Some(Token::new(TokenKind::Eof, self.offset, self.offset));
        }

        match self.mode {
            Mode::TopLevel => self.step_top_level(),
            Mode::Headers => self.step_headers(),
            Mode::Body => self.step_body(),
        }
    }

    fn step_top_level(&mut self) -> Option<Token> {
        self.skip_inline_ws();
        if self.at_eof() {
            return Some(Token::new(TokenKind::Eof, self.offset, self.offset));
        }
        if self.peek() == Some(b'\n') {
            self.offset += 1;
            return None;
        }
        if let Some(n) = self.separator_run_len() {
            let start = self.offset;
            self.offset += n;
            self.expect = Expect::SeparatorCommentTail;
            self.mode = Mode::TopLevel;
            return Some(Token::new(TokenKind::Separator, start, self.offset));
        }
        if self.peek() == Some(b'#') {
            let span = self.scan_line_remainder_trimmed();
            return Some(Token::new(TokenKind::Comment, span.start_offset, span.end_offset));
        }
        if self.peek() == Some(b'@') {
            let start = self.offset;
            self.offset += 1;
            self.expect = Expect::AfterAt;
            return Some(Token::new(TokenKind::At, start, self.offset));
        }
        if let Some(span) = self.scan_ident_span() {
            let text = std::str::from_utf8(&self.src[span.start_offset..span.end_offset]).unwrap_or("");
            let is_shout_case = text.bytes().all(|b| b.is_ascii_uppercase());
            let kind = if is_shout_case {
                lookup_method(text).unwrap_or(TokenKind::Ident)
            } else {
                TokenKind::Ident
            };
            if kind.is_method() {
                self.skip_inline_ws();
                self.expect = Expect::Segment(SegKind::Url);
            }
            return Some(Token::new(kind, span.start_offset, span.end_offset));
        }
        self.recover_one_byte()
    }

    fn step_headers(&mut self) -> Option<Token> {
        if self.rest_of_line_is_blank() {
            self.consume_blank_line();
            self.mode = Mode::Body;
            return None;
        }
        if let Some(n) = self.separator_run_len() {
            let start = self.offset;
            self.offset += n;
            self.expect = Expect::SeparatorCommentTail;
            self.mode = Mode::TopLevel;
            return Some(Token::new(TokenKind::Separator, start, self.offset));
        }
        if self.peek() == Some(b'#') {
            // `#` followed (after optional inline whitespace) by `@` opens a
            // request-scoped directive; any other `#` line is a comment.
            let mut o = self.offset + 1;
            while matches!(self.src.get(o).copied(), Some(b' ') | Some(b'\t')) {
                o += 1;
            }
            if self.src.get(o).copied() == Some(b'@') {
                self.offset = o;
                let start = self.offset;
                self.offset += 1;
                self.expect = Expect::AfterAt;
                return Some(Token::new(TokenKind::At, start, self.offset));
            }
            let span = self.scan_line_remainder_trimmed();
            return Some(Token::new(TokenKind::Comment, span.start_offset, span.end_offset));
        }
        if let Some(span) = self.scan_ident_span() {
            self.expect = Expect::HeaderColon;
            return Some(Token::new(TokenKind::Header, span.start_offset, span.end_offset));
        }
        self.recover_one_byte()
    }

    fn step_body(&mut self) -> Option<Token> {
        if self.rest_of_line_is_blank() {
            self.consume_blank_line();
            return None;
        }
        if let Some(n) = self.separator_run_len() {
            let start = self.offset;
            self.offset += n;
            self.expect = Expect::SeparatorCommentTail;
            self.mode = Mode::TopLevel;
            return Some(Token::new(TokenKind::Separator, start, self.offset));
        }
        if self.peek() == Some(b'<') && self.peek_at(1) == Some(b'>') {
            let start = self.offset;
            self.offset += 2;
            self.skip_inline_ws();
            self.expect = Expect::PathValue;
            return Some(Token::new(TokenKind::ResponseRef, start, self.offset));
        }
        if self.peek() == Some(b'<') {
            let start = self.offset;
            self.offset += 1;
            self.skip_inline_ws();
            self.expect = Expect::PathValue;
            return Some(Token::new(TokenKind::LeftAngle, start, self.offset));
        }
        if self.peek() == Some(b'>') {
            let start = self.offset;
            self.offset += 1;
            self.skip_inline_ws();
            self.expect = Expect::PathValue;
            return Some(Token::new(TokenKind::RightAngle, start, self.offset));
        }
        // Otherwise: consume lines verbatim until a blank line, a `###`
        // line, or EOF. This is the only multi-line token the scanner
        // produces.
        let start = self.offset;
        let mut o = self.offset;
        loop {
            // Advance to the end of the current line, then consume its
            // terminating `\n` (if any) before testing the *next* line —
            // the newline itself is never a line start and must not be
            // mistaken for one.
            while !matches!(self.src.get(o).copied(), Some(b'\n') | None) {
                o += 1;
            }
            let Some(b'\n') = self.src.get(o).copied() else {
                break;
            };
            o += 1;

            let mut p = o;
            while matches!(self.src.get(p).copied(), Some(b' ') | Some(b'\t')) {
                p += 1;
            }
            let blank = matches!(self.src.get(p).copied(), Some(b'\n') | None);
            let is_sep = {
                let mut n = 0;
                while self.src.get(p + n).copied() == Some(b'#') {
                    n += 1;
                }
                n >= 3
            };
            if blank || is_sep {
                break;
            }
        }
        let valid = Self::valid_utf8_prefix_len(&self.src[start..o]);
        let mut end = start + valid;
        // Trim a single trailing newline from the body token so a body
        // followed by a blank line doesn't absorb it into its own span.
        if end > start && self.src[end - 1] == b'\n' {
            end -= 1;
        }
        if end == start {
            return self.recover_one_byte();
        }
        self.offset = start + valid;
        Some(Token::new(TokenKind::Body, start, end))
    }

    fn step_segment(&mut self, kind: SegKind) -> Token {
        if self.peek() == Some(b'{') && self.peek_at(1) == Some(b'{') {
            let start = self.offset;
            self.offset += 2;
            self.expect = Expect::InterpIdent(kind);
            return Token::new(TokenKind::OpenInterp, start, self.offset);
        }
        if let Some(span) = self.scan_text_run(kind) {
            return Token::new(TokenKind::Text, span.start_offset, span.end_offset);
        }
        // No more text on this segment: transition out.
        match kind {
            SegKind::Url => {
                self.expect = Expect::MaybeVersion;
            }
            SegKind::HeaderValue => {
                self.skip_inline_ws();
                if self.peek() == Some(b'\n') {
                    self.offset += 1;
                }
                self.expect = Expect::LineStart;
            }
        }
        // Recurse via the state machine rather than emitting a token here;
        // `step()`'s loop in `scan()` will pick up the new `expect`.
        // Since we cannot return `None` from this `Token`-typed helper, we
        // special-case: ask the caller to re-run `step`.
        self.step_after_segment_transition()
    }

    /// Helper invoked right after a `Segment` transition decided there is
    /// no more text on the line; re-dispatches immediately so `scan()`'s
    /// external contract (always returns a real `Token`) holds without
    /// duplicating the top/headers/body dispatch logic.
    fn step_after_segment_transition(&mut self) -> Token {
        for _ in 0..MAX_INTERNAL_STEPS {
            if let Some(tok) = self.step() {
                return tok;
            }
        }
        let start = self.offset;
        self.offset = (self.offset + 1).min(self.src.len());
        self.push_diag("scanner could not make progress", Span::new(start, self.offset));
        Token::new(TokenKind::Error, start, self.offset)
    }

    fn step_interp_ident(&mut self, kind: SegKind) -> Token {
        if let Some(span) = self.scan_ident_span() {
            self.expect = Expect::AfterInterpIdent(kind);
            return Token::new(TokenKind::Ident, span.start_offset, span.end_offset);
        }
        // Unterminated / malformed interpolation identifier.
        let start = self.offset;
        self.push_diag(
            "expected an identifier after '{{'",
            Span::at(start),
        );
        self.offset = (self.offset + 1).min(self.src.len());
        self.expect = Expect::Segment(kind);
        Token::new(TokenKind::Error, start, self.offset)
    }

    fn step_after_interp_ident(&mut self, kind: SegKind) -> Token {
        if self.peek() == Some(b'}') && self.peek_at(1) == Some(b'}') {
            let start = self.offset;
            self.offset += 2;
            self.expect = Expect::Segment(kind);
            return Token::new(TokenKind::CloseInterp, start, self.offset);
        }
        let start = self.offset;
        self.push_diag("unterminated interpolation, expected '}}'", Span::at(start));
        self.offset = (self.offset + 1).min(self.src.len());
        self.expect = Expect::Segment(kind);
        Token::new(TokenKind::Error, start, self.offset)
    }

    fn step_maybe_version(&mut self) -> Token {
        self.skip_inline_ws();
        let start = self.offset;
        if self.peek() == Some(b'H')
            && self.peek_at(1) == Some(b'T')
            && self.peek_at(2) == Some(b'T')
            && self.peek_at(3) == Some(b'P')
            && self.peek_at(4) == Some(b'/')
        {
            let mut o = start + 5;
            while self.src.get(o).copied().map(|b| b.is_ascii_digit() || b == b'.').unwrap_or(false) {
                o += 1;
            }
            self.offset = o;
            self.expect = Expect::LineStart;
            self.mode = Mode::Headers;
            if self.peek() == Some(b'\n') {
                self.offset += 1;
            }
            return Token::new(TokenKind::HttpVersion, start, o);
        }
        self.expect = Expect::LineStart;
        self.mode = Mode::Headers;
        if self.peek() == Some(b'\n') {
            self.offset += 1;
        }
        self.step_after_segment_transition()
    }

    fn step_header_colon(&mut self) -> Token {
        if self.peek() == Some(b':') {
            let start = self.offset;
            self.offset += 1;
            self.skip_inline_ws();
            self.expect = Expect::Segment(SegKind::HeaderValue);
            return Token::new(TokenKind::Colon, start, self.offset);
        }
        self.expect = Expect::LineStart;
        self.step_after_segment_transition()
    }

    fn step_after_at(&mut self) -> Token {
        if let Some(span) = self.scan_ident_span() {
            let text = std::str::from_utf8(&self.src[span.start_offset..span.end_offset])
                .unwrap_or("")
                .to_ascii_lowercase();
            match lookup_keyword(&text) {
                Some(TokenKind::KwPrompt) => {
                    self.skip_inline_ws();
                    self.expect = Expect::PromptName;
                    Token::new(TokenKind::KwPrompt, span.start_offset, span.end_offset)
                }
                Some(kw) => {
                    self.skip_inline_ws();
                    self.expect = Expect::LineStart;
                    Token::new(kw, span.start_offset, span.end_offset)
                }
                None => {
                    self.skip_inline_ws();
                    self.expect = Expect::LineStart;
                    Token::new(TokenKind::Ident, span.start_offset, span.end_offset)
                }
            }
        } else {
            let start = self.offset;
            self.push_diag("expected an identifier after '@'", Span::at(start));
            self.offset = (self.offset + 1).min(self.src.len());
            self.expect = Expect::LineStart;
            Token::new(TokenKind::Error, start, self.offset)
        }
    }

    fn step_prompt_name(&mut self) -> Token {
        if let Some(span) = self.scan_ident_span() {
            self.skip_inline_ws();
            self.expect = Expect::PromptDescription;
            Token::new(TokenKind::Ident, span.start_offset, span.end_offset)
        } else {
            let start = self.offset;
            self.push_diag("expected a prompt name", Span::at(start));
            self.offset = (self.offset + 1).min(self.src.len());
            self.expect = Expect::LineStart;
            Token::new(TokenKind::Error, start, self.offset)
        }
    }

    /// Scans a prompt's optional free-text description: the rest of the
    /// line, trimmed, as a single `Text` token (not interpolated — same
    /// rule as a directive's `= value` right-hand side).
    fn step_prompt_description(&mut self) -> Token {
        let span = self.scan_line_remainder_trimmed();
        self.expect = Expect::LineStart;
        Token::new(TokenKind::Text, span.start_offset, span.end_offset)
    }

    /// Scans a `< path` / `> path` / `<> path` target: the rest of the
    /// line, trimmed, as a single `Text` token.
    fn step_path_value(&mut self) -> Token {
        let span = self.scan_line_remainder_trimmed();
        self.expect = Expect::LineStart;
        Token::new(TokenKind::Text, span.start_offset, span.end_offset)
    }

    fn step_separator_comment_tail(&mut self) -> Token {
        self.expect = Expect::LineStart;
        if self.rest_of_line_is_blank() {
            self.consume_blank_line();
            return self.step_after_segment_transition();
        }
        let span = self.scan_line_remainder_trimmed();
        Token::new(TokenKind::Comment, span.start_offset, span.end_offset)
    }

    /// Emits an `=` token and primes the directive-value segment, or a
    /// one-byte `Error` token for bytes nothing else recognizes.
    fn recover_one_byte(&mut self) -> Option<Token> {
        if self.peek() == Some(b'=') {
            let start = self.offset;
            self.offset += 1;
            self.skip_inline_ws();
            self.expect = Expect::DirectiveValue;
            return Some(Token::new(TokenKind::Eq, start, start + 1));
        }
        let start = self.offset;
        let byte = self.src[start];
        self.offset += 1;
        self.push_diag(
            format!("unexpected byte 0x{byte:02x}"),
            Span::new(start, self.offset),
        );
        Some(Token::new(TokenKind::Error, start, self.offset))
    }

    /// Directive right-hand side: the rest of the line as a single literal
    /// `Text` token. Directive values are not interpolated.
    fn step_directive_value(&mut self) -> Token {
        let span = self.scan_line_remainder_trimmed();
        self.expect = Expect::LineStart;
        Token::new(TokenKind::Text, span.start_offset, span.end_offset)
    }
}
