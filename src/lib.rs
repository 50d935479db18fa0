//! Syntax pipeline for `.http` files: a human-authored, line-oriented format
//! describing one or more HTTP requests with variables, prompts, headers,
//! inline bodies, and file references.
//!
//! # Architecture
//!
//! Three stages, strictly linear, each owning its own diagnostics:
//!
//! ```text
//! bytes -> Scanner -> tokens -> Parser -> AST -> Resolver -> Spec
//! ```
//!
//! - [`scanner`]: byte stream to token stream, with mode tracking
//!   (`TopLevel`/`Headers`/`Body`) and forward-progress-guaranteed error
//!   recovery.
//! - [`parser`]: token stream to [`ast::File`], a hand-written
//!   recursive-descent parser with one token of lookahead and
//!   synchronization on error.
//! - [`resolver`]: [`ast::File`] to [`spec::File`], the lexically-scoped
//!   evaluator that substitutes interpolations, validates URLs/methods/
//!   durations, and assigns default request names.
//! - [`spec`]: the canonical, fully-owned request model and its
//!   deterministic printer.
//! - [`interfaces`]: the capability-set boundary (`Exporter`/`Importer`)
//!   external collaborators (a CLI, an HTTP executor, format adapters)
//!   consume; one concrete `curl` exporter ships here as a worked example.
//! - [`render`] (behind the `pretty` feature): an ariadne-backed console
//!   diagnostic handler.
//!
//! None of the external collaborators listed in `interfaces` — the CLI
//! dispatcher, the prompting UI, the HTTP execution engine — live in this
//! crate; they are specified only by the shape of the data they exchange
//! with it.

pub mod ast;
pub mod diagnostic;
pub mod interfaces;
pub mod parser;
pub mod position;
#[cfg(feature = "pretty")]
pub mod render;
pub mod resolver;
pub mod scanner;
pub mod spec;
pub mod token;

#[cfg(test)]
mod pipeline_tests {
    use crate::parser::Parser;
    use crate::resolver::Resolver;

    /// Runs the full bytes -> Spec pipeline, asserting a clean resolve.
    fn run(src: &str) -> crate::spec::File {
        let mut p = Parser::new_silent("t.http", src.as_bytes().to_vec());
        let (file, ok) = p.parse();
        assert!(ok, "parse failed: {:?}", p.diagnostics());
        let mut r = Resolver::new("t.http", src.as_bytes().to_vec());
        let (spec, ok) = r.resolve(&file);
        assert!(ok, "resolve failed: {:?}", r.diagnostics());
        spec
    }

    #[test]
    fn end_to_end_minimal_request() {
        let spec = run("GET https://api.example.com/items/1\n");
        assert_eq!(spec.requests[0].url, "https://api.example.com/items/1");
    }

    #[test]
    fn canonical_print_then_reresolve_round_trips() {
        let src = "@base = https://api.example.com\n\n### list\nGET {{base}}/items\nAccept: application/json\n";
        let spec = run(src);
        let printed = spec.to_string();
        let reresolved = run(&printed);
        assert_eq!(spec, reresolved);
    }
}
