//! The canonical, resolved request model and its deterministic printer.
//!
//! Unlike the AST, every field here is a fully owned, already-validated
//! value: strings instead of expressions, `std::time::Duration` instead of
//! duration literals, sorted maps instead of declaration-order lists. A
//! `spec::File` has no remaining dependency on the source buffer it came
//! from and is safe to hand off across threads.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A named placeholder whose value is supplied by the caller at execution
/// time, not by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub name: String,
    pub description: Option<String>,
    /// Always `None` coming out of the resolver — prompts are filled in by
    /// whatever consumes the resolved file at execution time; evaluation of
    /// builtins/prompts is deferred to the caller after resolve.
    pub value: Option<String>,
}

impl Prompt {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            value: None,
        }
    }
}

/// A single resolved HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    pub name: String,
    pub comment: Option<String>,
    pub method: String,
    pub url: String,
    pub http_version: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub vars: BTreeMap<String, String>,
    pub prompts: BTreeMap<String, Prompt>,
    pub timeout: Option<Duration>,
    pub connection_timeout: Option<Duration>,
    pub no_redirect: bool,
    pub body: Option<Vec<u8>>,
    pub body_file: Option<String>,
    pub response_file: Option<String>,
    pub response_ref: Option<String>,
}

/// The resolved form of an entire `.http` file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct File {
    pub name: String,
    pub vars: BTreeMap<String, String>,
    pub prompts: BTreeMap<String, Prompt>,
    pub requests: Vec<Request>,
    pub timeout: Option<Duration>,
    pub connection_timeout: Option<Duration>,
    pub no_redirect: bool,
}

impl File {
    /// The zero value a failed resolve returns.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The default name assigned to the request at position `index`
    /// (0-based) when no explicit `@name` was set: `#1`, `#2`, ….
    pub fn default_request_name(index: usize) -> String {
        format!("#{}", index + 1)
    }
}

fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos % 3_600_000_000_000 == 0 {
        return format!("{}h", nanos / 3_600_000_000_000);
    }
    if nanos % 60_000_000_000 == 0 {
        return format!("{}m", nanos / 60_000_000_000);
    }
    if nanos % 1_000_000_000 == 0 {
        return format!("{}s", nanos / 1_000_000_000);
    }
    if nanos % 1_000_000 == 0 {
        return format!("{}ms", nanos / 1_000_000);
    }
    if nanos % 1_000 == 0 {
        return format!("{}us", nanos / 1_000);
    }
    format!("{}ns", nanos)
}

/// Writes the shared set of directive lines (prompts, vars, timeouts,
/// no-redirect) both `File` and `Request` print in the same canonical
/// sorted order.
fn write_directives(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    prompts: &BTreeMap<String, Prompt>,
    vars: &BTreeMap<String, String>,
    timeout: Option<Duration>,
    connection_timeout: Option<Duration>,
    no_redirect: bool,
) -> fmt::Result {
    for (key, prompt) in prompts {
        match &prompt.description {
            Some(desc) if !desc.is_empty() => {
                writeln!(f, "{prefix}@prompt {key} {desc}")?
            }
            _ => writeln!(f, "{prefix}@prompt {key}")?,
        }
    }
    for (key, value) in vars {
        writeln!(f, "{prefix}@{key} = {value}")?;
    }
    if let Some(t) = timeout {
        writeln!(f, "{prefix}@timeout = {}", format_duration(t))?;
    }
    if let Some(t) = connection_timeout {
        writeln!(f, "{prefix}@connection-timeout = {}", format_duration(t))?;
    }
    if no_redirect {
        writeln!(f, "{prefix}@no-redirect")?;
    }
    Ok(())
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comment {
            Some(c) if !c.is_empty() => writeln!(f, "### {c}")?,
            _ => writeln!(f, "###")?,
        }
        match &self.http_version {
            Some(v) => writeln!(f, "{} {} {}", self.method, self.url, v)?,
            None => writeln!(f, "{} {}", self.method, self.url)?,
        }
        if !self.name.is_empty() {
            writeln!(f, "# @name = {}", self.name)?;
        }
        write_directives(
            f,
            "# ",
            &self.prompts,
            &self.vars,
            self.timeout,
            self.connection_timeout,
            self.no_redirect,
        )?;
        for (key, value) in &self.headers {
            writeln!(f, "{key}: {value}")?;
        }
        let has_body_section =
            self.body.is_some() || self.body_file.is_some() || self.response_file.is_some() || self.response_ref.is_some();
        if has_body_section {
            writeln!(f)?;
        }
        if let Some(path) = &self.body_file {
            writeln!(f, "< {path}")?;
        } else if let Some(bytes) = &self.body {
            writeln!(f, "{}", String::from_utf8_lossy(bytes))?;
        }
        if let Some(path) = &self.response_file {
            writeln!(f, "> {path}")?;
        }
        if let Some(path) = &self.response_ref {
            writeln!(f, "<> {path}")?;
        }
        Ok(())
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            writeln!(f, "@name = {}", self.name)?;
        }
        write_directives(
            f,
            "",
            &self.prompts,
            &self.vars,
            self.timeout,
            self.connection_timeout,
            self.no_redirect,
        )?;
        for (i, req) in self.requests.iter().enumerate() {
            writeln!(f)?;
            let mut req = req.clone();
            if req.name == File::default_request_name(i) {
                req.name.clear();
            }
            write!(f, "{req}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_request_prints_method_and_url() {
        let r = Request {
            method: "GET".into(),
            url: "https://x".into(),
            ..Default::default()
        };
        assert_eq!(r.to_string(), "###\nGET https://x\n");
    }

    #[test]
    fn explicit_name_prints_as_name_directive() {
        let r = Request {
            name: "list".into(),
            method: "GET".into(),
            url: "https://x".into(),
            ..Default::default()
        };
        assert_eq!(r.to_string(), "###\n# @name = list\nGET https://x\n");
    }

    #[test]
    fn headers_print_sorted_by_key() {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "*/*".to_string());
        headers.insert("Authorization".to_string(), "Bearer t".to_string());
        let r = Request {
            method: "GET".into(),
            url: "https://x".into(),
            headers,
            ..Default::default()
        };
        let s = r.to_string();
        assert!(s.find("Accept").unwrap() < s.find("Authorization").unwrap());
    }

    #[test]
    fn file_prints_name_then_requests_separated_by_blank_lines() {
        let file = File {
            name: "my-collection".into(),
            requests: vec![
                Request {
                    name: "#1".into(),
                    method: "GET".into(),
                    url: "https://x".into(),
                    ..Default::default()
                },
                Request {
                    name: "#2".into(),
                    method: "POST".into(),
                    url: "https://y".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let s = file.to_string();
        assert!(s.starts_with("@name = my-collection\n"));
        assert_eq!(s.matches("###").count(), 2);
    }

    #[test]
    fn custom_request_name_is_preserved_not_cleared() {
        let file = File {
            requests: vec![Request {
                name: "list".into(),
                method: "GET".into(),
                url: "https://x".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(file.to_string().contains("# @name = list"));
    }

    #[test]
    fn default_request_name_is_one_indexed() {
        assert_eq!(File::default_request_name(0), "#1");
        assert_eq!(File::default_request_name(1), "#2");
    }

    #[test]
    fn format_duration_round_numbers() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
    }
}
