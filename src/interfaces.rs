//! External collaborator interfaces: capability sets, not class
//! hierarchies.
//!
//! The CLI dispatcher, the HTTP executor, and the import/export adapters
//! are all out of scope for this crate — they are defined only by the shape
//! of the data they consume from here: a [`spec::File`] in, bytes out
//! (export) or bytes in, a [`spec::File`] out (import). This module defines
//! that boundary as two traits plus a closed format-tag registry, and ships
//! one concrete implementation (`Format::Curl`) to prove the shape out; the
//! rest are declared but left for the consuming application to wire up.

use crate::spec;
use std::fmt;

/// The closed set of interchange formats a consumer may ask for: a closed
/// registry keyed by a format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Curl,
    Json,
    Yaml,
    Toml,
    Postman,
}

impl Format {
    pub fn tag(self) -> &'static str {
        match self {
            Format::Curl => "curl",
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Postman => "postman",
        }
    }
}

/// An error raised by an [`Exporter`] or [`Importer`].
#[derive(Debug)]
pub struct InterfaceError(String);

impl fmt::Display for InterfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InterfaceError {}

/// Takes a spec file and writes bytes to a sink.
pub trait Exporter {
    fn export(&self, file: &spec::File) -> Result<Vec<u8>, InterfaceError>;
}

/// Takes a byte source and returns a spec file. Not implemented by anything
/// in this crate yet — every format is an adapter the consuming application
/// supplies, including the one with a working `Exporter` below.
pub trait Importer {
    fn import(&self, source: &[u8]) -> Result<spec::File, InterfaceError>;
}

/// Looks up the `Exporter` registered for `format`, if any.
///
/// Only `Format::Curl` is implemented in this crate; the rest are declared
/// members of the closed format-tag set with no backing adapter — a
/// template-driven exporter a consuming application can wire up later.
pub fn exporter_for(format: Format) -> Option<Box<dyn Exporter>> {
    match format {
        Format::Curl => Some(Box::new(CurlExporter::default())),
        Format::Json | Format::Yaml | Format::Toml | Format::Postman => None,
    }
}

/// Renders a [`spec::File`]'s requests as shell-ready `curl` invocations,
/// one per request, separated by blank lines.
#[derive(Debug, Clone, Default)]
pub struct CurlExporter {
    pub compact: bool,
}

impl Exporter for CurlExporter {
    fn export(&self, file: &spec::File) -> Result<Vec<u8>, InterfaceError> {
        let mut out = String::new();
        for (i, req) in file.requests.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let line = if self.compact {
                generate_curl_command_compact(req)
            } else {
                generate_curl_command(req)
            };
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

fn generate_curl_command(request: &spec::Request) -> String {
    let mut parts = vec!["curl".to_string()];

    if request.method != "GET" {
        parts.push("-X".to_string());
        parts.push(request.method.clone());
    }

    for (key, value) in &request.headers {
        parts.push("-H".to_string());
        parts.push(escape_shell_arg(&format!("{key}: {value}")));
    }

    if let Some(body) = &request.body {
        parts.push("-d".to_string());
        parts.push(escape_shell_arg(&String::from_utf8_lossy(body)));
    }

    parts.push(escape_shell_arg(&request.url));

    format_multiline(&parts)
}

fn generate_curl_command_compact(request: &spec::Request) -> String {
    let mut parts = vec!["curl".to_string()];

    if request.method != "GET" {
        parts.push(format!("-X {}", request.method));
    }

    for (key, value) in &request.headers {
        parts.push(format!("-H {}", escape_shell_arg(&format!("{key}: {value}"))));
    }

    if let Some(body) = &request.body {
        parts.push(format!("-d {}", escape_shell_arg(&String::from_utf8_lossy(body))));
    }

    parts.push(escape_shell_arg(&request.url));
    parts.join(" ")
}

/// Escapes a string for safe use in shell commands: single quotes, with
/// embedded single quotes broken out via `'\''`.
fn escape_shell_arg(arg: &str) -> String {
    if needs_quoting(arg) {
        if arg.contains('\'') {
            format!("'{}'", arg.replace('\'', "'\\''"))
        } else {
            format!("'{arg}'")
        }
    } else {
        arg.to_string()
    }
}

fn needs_quoting(s: &str) -> bool {
    const SPECIAL: [char; 23] = [
        ' ', '\t', '\n', '\r', '|', '&', ';', '<', '>', '(', ')', '$', '`', '\\', '"', '\'', '*', '?', '[', ']', '#', '~',
        '=',
    ];
    s.is_empty() || s.chars().any(|c| SPECIAL.contains(&c))
}

/// Keeps a short command on one line; wraps long commands with
/// backslash-continuations, one flag per line.
fn format_multiline(parts: &[String]) -> String {
    if parts.is_empty() {
        return String::new();
    }
    let single_line = parts.join(" ");
    if single_line.len() <= 80 {
        return single_line;
    }
    let mut result = parts[0].clone();
    for part in &parts[1..] {
        result.push_str(" \\\n  ");
        result.push_str(part);
    }
    result
}
