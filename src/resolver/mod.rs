//! AST → canonical [`spec::File`] resolution: keyword-directive dispatch,
//! lexical scoping, and semantic validation.

pub mod duration;
pub mod environment;
pub mod error;

use crate::ast::{self, BodyRef, Expression, Statement};
use crate::diagnostic::Diagnostic;
use crate::position::Span;
use crate::spec;
use environment::Environment;
use error::ResolveError;
use std::collections::BTreeSet;

/// Resolves a parsed [`ast::File`] against its source bytes into a
/// canonical [`spec::File`].
///
/// Takes the source buffer (not just the file name) because `ast`
/// expressions carry byte spans rather than owned strings — only
/// `ast::Ident` pre-extracts its text at parse time. Resolution is where
/// those spans finally get turned into the owned strings the canonical
/// model holds.
pub struct Resolver {
    name: String,
    source: Vec<u8>,
    diagnostics: Vec<Diagnostic>,
    had_error: bool,
    /// Prompt names declared anywhere in the file so far — global or
    /// request-scoped. Prompts form one flat namespace across the whole
    /// file and are rejected as duplicates rather than allowed to shadow,
    /// unlike vars, which are lexically scoped via [`Environment`].
    declared_prompts: BTreeSet<String>,
}

impl Resolver {
    pub fn new(name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            diagnostics: Vec::new(),
            had_error: false,
            declared_prompts: BTreeSet::new(),
        }
    }

    /// Diagnostics accumulated so far, in discovery order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Resolves `file`. Returns `(spec, true)` on a clean resolve, or
    /// `(spec::File::empty(name), false)` if any diagnostic was recorded —
    /// the zero-value totality guarantee a failed resolve always holds.
    /// Every statement is still visited so all diagnostics surface in one
    /// pass.
    pub fn resolve(&mut self, file: &ast::File) -> (spec::File, bool) {
        let mut out = spec::File::empty(self.name.clone());
        let mut env = Environment::new();

        for stmt in &file.statements {
            match stmt {
                Statement::Var(v) => self.resolve_global_var(v, &mut env, &mut out),
                Statement::Prompt(p) => self.resolve_global_prompt(p, &env, &mut out),
                Statement::Request(r) => {
                    let index = out.requests.len();
                    let req = self.resolve_request(r, &mut env, index);
                    out.requests.push(req);
                }
            }
        }

        if self.had_error {
            (spec::File::empty(self.name.clone()), false)
        } else {
            (out, true)
        }
    }

    fn text_at(&self, span: Span) -> String {
        let end = span.end_offset.min(self.source.len());
        let start = span.start_offset.min(end);
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }

    fn bytes_at(&self, span: Span) -> Vec<u8> {
        let end = span.end_offset.min(self.source.len());
        let start = span.start_offset.min(end);
        self.source[start..end].to_vec()
    }

    fn push_error(&mut self, err: ResolveError) {
        let diag = Diagnostic::new(self.name.clone(), err.to_string(), err.span());
        self.diagnostics.push(diag);
        self.had_error = true;
    }

    /// Declares a prompt name; returns `false` (and leaves the set
    /// unchanged) if it was already declared anywhere in the file.
    fn declare_prompt(&mut self, name: &str) -> bool {
        self.declared_prompts.insert(name.to_string())
    }

    /// Resolves a `TextLiteral`/`Url`/`Interpolation`/`Concat` expression to
    /// its string value. Unknown interpolation targets are a diagnostic
    /// but resolve to an empty string so the caller can keep going.
    fn resolve_expr(&mut self, expr: &Expression, env: &Environment) -> String {
        match expr {
            Expression::TextLiteral(span) | Expression::Url(span) => self.text_at(*span),
            Expression::Interpolation(ident) => match env.get(&ident.name) {
                Some(v) => v.to_string(),
                None => {
                    self.push_error(ResolveError::UndefinedName {
                        name: ident.name.clone(),
                        span: ident.span,
                    });
                    String::new()
                }
            },
            Expression::Concat(parts) => parts
                .iter()
                .map(|p| self.resolve_expr(p, env))
                .collect::<Vec<_>>()
                .concat(),
        }
    }

    fn resolve_global_var(&mut self, v: &ast::VarStatement, env: &mut Environment, out: &mut spec::File) {
        match v.name.name.as_str() {
            "no-redirect" => {
                if v.value.is_some() {
                    self.push_error(ResolveError::NoRedirectTakesNoValue { span: v.at_span });
                } else {
                    out.no_redirect = true;
                }
            }
            "name" => match &v.value {
                Some(e) => out.name = self.resolve_expr(e, env),
                None => self.push_error(ResolveError::MissingValue {
                    keyword: "name".into(),
                    span: v.at_span,
                }),
            },
            "timeout" | "connection-timeout" => {
                self.resolve_timeout_directive(&v.name.name, &v.value, v.at_span, env, &mut out.timeout, &mut out.connection_timeout);
            }
            _ => match &v.value {
                Some(e) => {
                    let value = self.resolve_expr(e, env);
                    if env.define(&v.name.name, &value) {
                        out.vars.insert(v.name.name.clone(), value);
                    } else {
                        self.push_error(ResolveError::DuplicateName {
                            name: v.name.name.clone(),
                            span: v.name.span,
                        });
                    }
                }
                None => self.push_error(ResolveError::MissingValue {
                    keyword: v.name.name.clone(),
                    span: v.at_span,
                }),
            },
        }
    }

    fn resolve_global_prompt(&mut self, p: &ast::PromptStatement, env: &Environment, out: &mut spec::File) {
        if self.declare_prompt(&p.name.name) {
            let description = p.description.as_ref().map(|e| self.resolve_expr(e, env));
            out.prompts
                .insert(p.name.name.clone(), spec::Prompt::new(p.name.name.clone(), description));
        } else {
            self.push_error(ResolveError::DuplicateName {
                name: p.name.name.clone(),
                span: p.name.span,
            });
        }
    }

    /// Shared by global and request-scoped `timeout`/`connection-timeout`
    /// directives: resolve the value, parse it as a duration, and assign
    /// to whichever of the two output slots matches `keyword`.
    fn resolve_timeout_directive(
        &mut self,
        keyword: &str,
        value: &Option<Expression>,
        at_span: Span,
        env: &Environment,
        timeout_slot: &mut Option<std::time::Duration>,
        connection_timeout_slot: &mut Option<std::time::Duration>,
    ) {
        let Some(expr) = value else {
            self.push_error(ResolveError::MissingValue {
                keyword: keyword.to_string(),
                span: at_span,
            });
            return;
        };
        let span = expr.start().merge(expr.end());
        let text = self.resolve_expr(expr, env);
        match duration::parse(&text) {
            Some(d) if keyword == "timeout" => *timeout_slot = Some(d),
            Some(d) => *connection_timeout_slot = Some(d),
            None => self.push_error(ResolveError::InvalidDuration { found: text, span }),
        }
    }

    /// Validates `s` as an absolute or root-relative request URI. Full RFC
    /// 7230 compliance is deliberately out of scope; `url::Url` parsing is
    /// the practical proxy for "absolute", and a leading `/` covers the
    /// common root-relative case.
    fn validate_url(s: &str) -> bool {
        url::Url::parse(s).is_ok() || s.starts_with('/')
    }

    fn resolve_request(&mut self, r: &ast::Request, env: &mut Environment, index: usize) -> spec::Request {
        env.push_child();

        let mut req = spec::Request {
            name: spec::File::default_request_name(index),
            ..Default::default()
        };

        req.comment = r.comment.map(|s| self.text_at(s)).filter(|s| !s.is_empty());

        req.method = match r.method.token.method_str() {
            Some(s) => s.to_string(),
            None => {
                self.push_error(ResolveError::InvalidMethod {
                    found: r.method.text.clone(),
                    span: r.method.span,
                });
                r.method.text.clone()
            }
        };

        let url_span = r.url.start().merge(r.url.end());
        let url_text = self.resolve_expr(&r.url, env);
        if !Self::validate_url(&url_text) {
            self.push_error(ResolveError::InvalidUrl {
                found: url_text.clone(),
                span: url_span,
            });
        }
        req.url = url_text;

        req.http_version = r.http_version.map(|s| self.text_at(s));

        for d in &r.directives {
            self.resolve_request_directive(d, env, &mut req);
        }

        for h in &r.headers {
            let value = self.resolve_expr(&h.value, env);
            req.headers.insert(h.key.name.clone(), value);
        }

        match &r.body {
            None => {}
            Some(BodyRef::Inline(span)) => req.body = Some(self.bytes_at(*span)),
            Some(BodyRef::File(e)) => req.body_file = Some(self.resolve_expr(e, env)),
        }
        req.response_file = r.response_capture.as_ref().map(|e| self.resolve_expr(e, env));
        req.response_ref = r.response_ref.as_ref().map(|e| self.resolve_expr(e, env));

        env.pop_child();
        req
    }

    fn resolve_request_directive(&mut self, d: &ast::Directive, env: &mut Environment, req: &mut spec::Request) {
        use crate::token::TokenKind;
        match d.keyword {
            TokenKind::KwNoRedirect => {
                if d.value.is_some() {
                    self.push_error(ResolveError::NoRedirectTakesNoValue { span: d.at_span });
                } else {
                    req.no_redirect = true;
                }
            }
            TokenKind::KwName => match &d.value {
                Some(e) => req.name = self.resolve_expr(e, env),
                None => self.push_error(ResolveError::MissingValue {
                    keyword: "name".into(),
                    span: d.at_span,
                }),
            },
            TokenKind::KwTimeout => {
                self.resolve_timeout_directive(
                    "timeout",
                    &d.value,
                    d.at_span,
                    env,
                    &mut req.timeout,
                    &mut req.connection_timeout,
                );
            }
            TokenKind::KwConnectionTimeout => {
                self.resolve_timeout_directive(
                    "connection-timeout",
                    &d.value,
                    d.at_span,
                    env,
                    &mut req.timeout,
                    &mut req.connection_timeout,
                );
            }
            TokenKind::KwPrompt => {
                let Some(name) = &d.name else { return };
                if self.declare_prompt(&name.name) {
                    let description = d.value.as_ref().map(|e| self.resolve_expr(e, env));
                    req.prompts
                        .insert(name.name.clone(), spec::Prompt::new(name.name.clone(), description));
                } else {
                    self.push_error(ResolveError::DuplicateName {
                        name: name.name.clone(),
                        span: name.span,
                    });
                }
            }
            _ => {
                let Some(name) = &d.name else { return };
                match &d.value {
                    Some(e) => {
                        let value = self.resolve_expr(e, env);
                        if env.define(&name.name, &value) {
                            req.vars.insert(name.name.clone(), value);
                        } else {
                            self.push_error(ResolveError::DuplicateName {
                                name: name.name.clone(),
                                span: name.span,
                            });
                        }
                    }
                    None => self.push_error(ResolveError::MissingValue {
                        keyword: name.name.clone(),
                        span: d.at_span,
                    }),
                }
            }
        }
    }
}
