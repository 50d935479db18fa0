//! Token kinds and the fixed keyword/method lookup tables.
//!
//! The token kind enumeration is a closed set. Dispatch over it is explicit
//! case analysis — tagged variants, not inheritance — there is deliberately
//! no dynamic dispatch here.

use crate::position::Span;
use serde::{Deserialize, Serialize};

/// The closed set of token kinds the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// End of input.
    Eof,
    /// A lexical error; the scanner could not make sense of the byte(s) at
    /// this span and has recorded a diagnostic.
    Error,
    /// A `#`-introduced comment, running to end of line.
    Comment,
    /// The `###` request separator.
    Separator,
    /// `@`, introducing a directive.
    At,
    /// A bare identifier (ASCII letter/`_` then letters/digits/`_`/`-`).
    Ident,
    /// `=`.
    Eq,
    /// `$`, introducing a builtin variable reference.
    Dollar,
    /// `:`, separating a header name from its value.
    Colon,
    /// `<`, introducing an inline-body-from-file marker.
    LeftAngle,
    /// `>`, introducing a response-capture-to-file marker.
    RightAngle,
    /// `<>`, introducing a response-reference marker.
    ResponseRef,
    /// A run of literal text (a URL/header-value/directive-value segment
    /// not itself a `{{...}}` interpolation).
    Text,
    /// The verbatim bytes of an inline request body.
    Body,
    /// An `HTTP/x.y` version token.
    HttpVersion,
    /// A header name, scanned in `Headers` mode.
    Header,
    /// `{{`, opening an interpolation.
    OpenInterp,
    /// `}}`, closing an interpolation.
    CloseInterp,

    /// `name` directive keyword.
    KwName,
    /// `prompt` directive keyword.
    KwPrompt,
    /// `timeout` directive keyword.
    KwTimeout,
    /// `connection-timeout` directive keyword.
    KwConnectionTimeout,
    /// `no-redirect` directive keyword.
    KwNoRedirect,

    /// `GET`.
    MethodGet,
    /// `HEAD`.
    MethodHead,
    /// `POST`.
    MethodPost,
    /// `PUT`.
    MethodPut,
    /// `DELETE`.
    MethodDelete,
    /// `CONNECT`.
    MethodConnect,
    /// `PATCH`.
    MethodPatch,
    /// `OPTIONS`.
    MethodOptions,
    /// `TRACE`.
    MethodTrace,
}

impl TokenKind {
    /// True if this kind is one of the `MethodXxx` variants.
    pub fn is_method(self) -> bool {
        matches!(
            self,
            TokenKind::MethodGet
                | TokenKind::MethodHead
                | TokenKind::MethodPost
                | TokenKind::MethodPut
                | TokenKind::MethodDelete
                | TokenKind::MethodConnect
                | TokenKind::MethodPatch
                | TokenKind::MethodOptions
                | TokenKind::MethodTrace
        )
    }

    /// True if this kind is one of the `KwXxx` directive keywords.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::KwName
                | TokenKind::KwPrompt
                | TokenKind::KwTimeout
                | TokenKind::KwConnectionTimeout
                | TokenKind::KwNoRedirect
        )
    }

    /// Canonical uppercase HTTP method string for a `MethodXxx` kind.
    pub fn method_str(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::MethodGet => "GET",
            TokenKind::MethodHead => "HEAD",
            TokenKind::MethodPost => "POST",
            TokenKind::MethodPut => "PUT",
            TokenKind::MethodDelete => "DELETE",
            TokenKind::MethodConnect => "CONNECT",
            TokenKind::MethodPatch => "PATCH",
            TokenKind::MethodOptions => "OPTIONS",
            TokenKind::MethodTrace => "TRACE",
            _ => return None,
        })
    }
}

/// A single scanned token: a kind plus the byte span it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token's kind.
    pub kind: TokenKind,
    /// Byte offset of the token's first byte.
    pub start_offset: usize,
    /// Byte offset one past the token's last byte.
    pub end_offset: usize,
}

impl Token {
    /// Creates a token, normalizing an inverted range the way [`Span`] does.
    pub fn new(kind: TokenKind, start_offset: usize, end_offset: usize) -> Self {
        Self {
            kind,
            start_offset,
            end_offset: end_offset.max(start_offset),
        }
    }

    /// This token's span.
    pub fn span(&self) -> Span {
        Span::new(self.start_offset, self.end_offset)
    }
}

/// Looks up an uppercase word against the closed set of recognized HTTP
/// methods. Matching is exact-case: `get` is not `GET`.
pub fn lookup_method(word: &str) -> Option<TokenKind> {
    Some(match word {
        "GET" => TokenKind::MethodGet,
        "HEAD" => TokenKind::MethodHead,
        "POST" => TokenKind::MethodPost,
        "PUT" => TokenKind::MethodPut,
        "DELETE" => TokenKind::MethodDelete,
        "CONNECT" => TokenKind::MethodConnect,
        "PATCH" => TokenKind::MethodPatch,
        "OPTIONS" => TokenKind::MethodOptions,
        "TRACE" => TokenKind::MethodTrace,
        _ => return None,
    })
}

/// Looks up a lowercased identifier against the fixed directive-keyword
/// table. Case-insensitive by construction: callers must lowercase `ident`
/// first.
pub fn lookup_keyword(ident_lower: &str) -> Option<TokenKind> {
    Some(match ident_lower {
        "name" => TokenKind::KwName,
        "prompt" => TokenKind::KwPrompt,
        "timeout" => TokenKind::KwTimeout,
        "connection-timeout" => TokenKind::KwConnectionTimeout,
        "no-redirect" => TokenKind::KwNoRedirect,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_method_is_case_sensitive() {
        assert_eq!(lookup_method("GET"), Some(TokenKind::MethodGet));
        assert_eq!(lookup_method("get"), None);
        assert_eq!(lookup_method("Frobnicate"), None);
    }

    #[test]
    fn lookup_keyword_covers_fixed_table() {
        assert_eq!(lookup_keyword("name"), Some(TokenKind::KwName));
        assert_eq!(lookup_keyword("no-redirect"), Some(TokenKind::KwNoRedirect));
        assert_eq!(lookup_keyword("bogus"), None);
    }

    #[test]
    fn token_end_is_never_before_start() {
        let t = Token::new(TokenKind::Text, 10, 3);
        assert!(t.end_offset >= t.start_offset);
    }
}
