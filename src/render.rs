//! The pretty console diagnostic handler. External to the core proper — it
//! performs I/O (reading the source file, writing colored terminal output)
//! — but shipped alongside it as an opt-in `pretty` feature rather than a
//! separate crate, since the consuming CLI is the only other place this
//! logic could live and it is small enough to carry as a helper.
//!
//! Gated behind the `pretty` Cargo feature so a caller that only wants the
//! scanner/parser/resolver does not have to pull in `ariadne`.

use crate::diagnostic::Diagnostic;
use crate::position::LineIndex;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};

/// Renders `diagnostics` (all raised against `source`, named `filename`)
/// to stderr with ±3 lines of context, a colored underline on the
/// offending span, and a `U+2502` gutter (ariadne's default).
///
/// Spans are clamped to `source`'s length before building a report so a
/// diagnostic raised against truncated or since-modified input never
/// panics the renderer.
pub fn render_diagnostics_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let config = Config::default().with_compact(false);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let len = source.len();
        let start = diag.span.start_offset.min(len);
        let end = diag.span.end_offset.min(len).max(start);

        let report = Report::build(ReportKind::Error, (filename, start..end))
            .with_message(&diag.message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&diag.message)
                    .with_color(Color::Red),
            )
            .with_config(config)
            .finish();
        report.eprint(&mut cache).ok();
    }
}

/// Renders `diagnostics` as a JSON array to stdout — the machine-readable
/// counterpart to [`render_diagnostics_pretty`], for non-interactive
/// callers (CI logs, editor integrations).
pub fn render_diagnostics_json(diagnostics: &[Diagnostic]) {
    match serde_json::to_string_pretty(diagnostics) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize diagnostics: {e}"),
    }
}

/// Prints a one-line `N error(s)` summary to stderr, colored red. No-op on
/// an empty slice.
pub fn print_summary(diagnostics: &[Diagnostic]) {
    use ariadne::Fmt;

    if diagnostics.is_empty() {
        return;
    }
    let n = diagnostics.len();
    let suffix = if n == 1 { "" } else { "s" };
    eprintln!("{}", format!("{n} error{suffix}").fg(Color::Red));
}

/// Formats a single diagnostic using the spec's line:col contract
/// (`name:line:col[-end]: message`), without any source-context printing.
/// Cheaper than the ariadne path for a caller that just wants a one-liner,
/// e.g. for `--format json` alongside a plain stderr echo.
pub fn format_positioned(diag: &Diagnostic, index: &LineIndex) -> String {
    let pos = index.position(diag.file.clone(), diag.span.start_offset, diag.span.end_offset);
    format!("{pos}: {}", diag.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Span;

    #[test]
    fn format_positioned_uses_line_col_contract() {
        let src = b"GET not a url\n";
        let idx = LineIndex::new(src);
        let diag = Diagnostic::new("t.http", "not a valid request URL", Span::new(4, 13));
        assert_eq!(format_positioned(&diag, &idx), "t.http:1:5-13: not a valid request URL");
    }

    #[test]
    fn render_pretty_does_not_panic_on_out_of_range_span() {
        let diag = Diagnostic::new("t.http", "oops", Span::new(1000, 2000));
        render_diagnostics_pretty("short\n", "t.http", &[diag]);
    }
}
