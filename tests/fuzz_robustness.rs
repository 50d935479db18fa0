//! Property-based fuzz-robustness tests: for arbitrary byte input up to
//! 8 KiB, the scanner, parser, and resolver must never panic, never loop
//! without bound, and must honor "err implies zero-value result" at every
//! stage.

use httpspec_core::ast;
use httpspec_core::parser::Parser;
use httpspec_core::resolver::Resolver;
use httpspec_core::scanner::Scanner;
use httpspec_core::spec;
use httpspec_core::token::TokenKind;
use proptest::prelude::*;

fn arbitrary_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..max_len)
}

/// A strategy biased toward the grammar's own vocabulary (`###`, `@`,
/// `{{`/`}}`, method names, newlines) so a useful fraction of generated
/// inputs actually exercise deep parser/resolver states instead of
/// bottoming out at the scanner's first unrecognized byte.
fn grammar_shaped_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    let token = prop_oneof![
        Just(b"###".to_vec()),
        Just(b"@".to_vec()),
        Just(b"@prompt ".to_vec()),
        Just(b"@timeout".to_vec()),
        Just(b"@no-redirect".to_vec()),
        Just(b"{{".to_vec()),
        Just(b"}}".to_vec()),
        Just(b"GET".to_vec()),
        Just(b"POST".to_vec()),
        Just(b" ".to_vec()),
        Just(b"\n".to_vec()),
        Just(b"\n\n".to_vec()),
        Just(b":".to_vec()),
        Just(b"=".to_vec()),
        Just(b"<>".to_vec()),
        Just(b"<".to_vec()),
        Just(b">".to_vec()),
        Just(b"https://x".to_vec()),
        any::<u8>().prop_map(|b| vec![b]),
    ];
    proptest::collection::vec(token, 0..max_len / 3).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn scanner_terminates_and_respects_token_invariants(bytes in arbitrary_bytes(8192)) {
        let mut s = Scanner::new("fuzz.http", bytes);
        let mut n = 0;
        loop {
            let t = s.scan();
            prop_assert!(t.end_offset >= t.start_offset);
            n += 1;
            if t.kind == TokenKind::Eof {
                break;
            }
            prop_assert!(n <= 200_000, "scanner did not terminate");
        }
    }

    #[test]
    fn parser_is_total_err_implies_zero_value_file(bytes in arbitrary_bytes(8192)) {
        let mut p = Parser::new_silent("fuzz.http", bytes);
        let (file, ok) = p.parse();
        if !ok {
            prop_assert_eq!(file, ast::File::empty("fuzz.http"));
            prop_assert!(!p.diagnostics().is_empty());
        }
    }

    #[test]
    fn resolver_is_total_err_implies_zero_value_spec(bytes in grammar_shaped_bytes(8192)) {
        let mut p = Parser::new_silent("fuzz.http", bytes.clone());
        let (file, parse_ok) = p.parse();
        if !parse_ok {
            return Ok(());
        }
        let mut r = Resolver::new("fuzz.http", bytes);
        let (out, ok) = r.resolve(&file);
        if !ok {
            prop_assert_eq!(out, spec::File::empty("fuzz.http"));
            prop_assert!(!r.diagnostics().is_empty());
        }
    }

    #[test]
    fn full_pipeline_never_panics_on_grammar_shaped_input(bytes in grammar_shaped_bytes(8192)) {
        let mut p = Parser::new_silent("fuzz.http", bytes.clone());
        let (file, parse_ok) = p.parse();
        if parse_ok {
            let mut r = Resolver::new("fuzz.http", bytes);
            let _ = r.resolve(&file);
        }
    }
}
