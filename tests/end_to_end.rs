//! End-to-end scenarios for the full `bytes -> Spec` pipeline: the six
//! concrete cases the canonical spec calls out, plus the round-trip
//! property (`resolve(parse(canonicalize(resolve(parse(src))))) ==
//! resolve(parse(src))`).

use httpspec_core::parser::Parser;
use httpspec_core::resolver::Resolver;
use httpspec_core::spec;

fn parse_and_resolve(src: &str) -> Result<spec::File, (Vec<String>, Vec<String>)> {
    let mut p = Parser::new_silent("t.http", src.as_bytes().to_vec());
    let (file, parse_ok) = p.parse();
    if !parse_ok {
        return Err((
            p.diagnostics().iter().map(|d| d.message.clone()).collect(),
            Vec::new(),
        ));
    }
    let mut r = Resolver::new("t.http", src.as_bytes().to_vec());
    let (spec, resolve_ok) = r.resolve(&file);
    if !resolve_ok {
        return Err((
            Vec::new(),
            r.diagnostics().iter().map(|d| d.message.clone()).collect(),
        ));
    }
    Ok(spec)
}

#[test]
fn scenario_minimal_request() {
    let spec = parse_and_resolve("GET https://api.example.com/items/1\n").unwrap();
    assert_eq!(spec.requests.len(), 1);
    let r = &spec.requests[0];
    assert_eq!(r.method, "GET");
    assert_eq!(r.url, "https://api.example.com/items/1");
    assert_eq!(r.name, "#1");
    assert!(r.headers.is_empty());
    assert!(r.body.is_none());
}

#[test]
fn scenario_globals_and_interpolation() {
    let src = "@base = https://api.example.com\n@timeout = 5s\n\n### list\nGET {{base}}/items\nAccept: application/json\n";
    let spec = parse_and_resolve(src).unwrap();
    assert_eq!(spec.timeout, Some(std::time::Duration::from_secs(5)));
    assert_eq!(spec.vars.get("base").unwrap(), "https://api.example.com");
    assert_eq!(spec.requests.len(), 1);
    let r = &spec.requests[0];
    assert_eq!(r.name, "#1");
    assert_eq!(r.url, "https://api.example.com/items");
    assert_eq!(r.headers.get("Accept").unwrap(), "application/json");
}

#[test]
fn scenario_duplicate_prompt_is_a_single_diagnostic_and_zero_spec() {
    let src = "@prompt token Give me a token\n@prompt token Again\n";
    let err = parse_and_resolve(src).unwrap_err();
    let resolve_diags = err.1;
    assert_eq!(resolve_diags.len(), 1);
    assert!(resolve_diags[0].contains("token"));
}

#[test]
fn scenario_invalid_url() {
    let src = "GET not a url\n";
    let err = parse_and_resolve(src).unwrap_err();
    let resolve_diags = err.1;
    assert_eq!(resolve_diags.len(), 1);
    assert!(resolve_diags[0].contains("not a url"));
}

#[test]
fn scenario_inline_body_and_response_ref() {
    let src = "### create\nPOST https://api.example.com/items\nContent-Type: application/json\n\n{\"a\":1}\n\n<> response.200.json\n";
    let spec = parse_and_resolve(src).unwrap();
    let r = &spec.requests[0];
    assert_eq!(r.body.as_deref(), Some(b"{\"a\":1}".as_slice()));
    assert_eq!(r.response_ref.as_deref(), Some("response.200.json"));
    assert_eq!(r.headers.get("Content-Type").unwrap(), "application/json");
}

#[test]
fn scenario_fuzz_robustness_bounded_steps() {
    // A quick deterministic smoke check; tests/fuzz_robustness.rs carries
    // the property-based version over truly arbitrary input.
    let adversarial = [
        "",
        "\0\0\0\0",
        "@",
        "###",
        "GET",
        "{{",
        "}}",
        "<>",
        "GET \nAccept\n",
        "@prompt\n",
        &"#".repeat(10_000),
        &"GET https://x\n".repeat(2_000),
    ];
    for src in adversarial {
        let _ = parse_and_resolve(src);
    }
}

#[test]
fn round_trip_canonical_print_then_reresolve_is_idempotent() {
    let src = "@base = https://api.example.com\n@timeout = 5s\n\n### list\nGET {{base}}/items\nAccept: application/json\n";
    let spec = parse_and_resolve(src).unwrap();
    let printed = spec.to_string();
    let reresolved = parse_and_resolve(&printed).unwrap();
    assert_eq!(spec, reresolved);
}

#[test]
fn round_trip_preserves_explicit_request_name() {
    let src = "### \nGET https://x\n# @name = list\nAccept: */*\n";
    let spec = parse_and_resolve(src).unwrap();
    assert_eq!(spec.requests[0].name, "list");
    let printed = spec.to_string();
    assert!(printed.contains("# @name = list"));
    let reresolved = parse_and_resolve(&printed).unwrap();
    assert_eq!(spec, reresolved);
}

#[test]
fn round_trip_with_body_and_response_capture() {
    let src = "### create\nPOST https://api.example.com/items\nContent-Type: application/json\n\n{\"a\":1}\n\n> out.json\n<> golden.json\n";
    let spec = parse_and_resolve(src).unwrap();
    let printed = spec.to_string();
    let reresolved = parse_and_resolve(&printed).unwrap();
    assert_eq!(spec, reresolved);
}

#[test]
fn multiple_requests_get_sequential_default_names() {
    let src = "GET https://x\n\n###\nGET https://y\n\n###\nGET https://z\n";
    let spec = parse_and_resolve(src).unwrap();
    let names: Vec<_> = spec.requests.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["#1", "#2", "#3"]);
}

#[test]
fn undefined_interpolation_is_a_resolve_diagnostic() {
    let src = "GET https://x/{{missing}}\n";
    let err = parse_and_resolve(src).unwrap_err();
    assert!(err.1[0].contains("missing"));
}

#[test]
fn invalid_duration_is_a_resolve_diagnostic() {
    let src = "@timeout = 5\nGET https://x\n";
    let err = parse_and_resolve(src).unwrap_err();
    assert!(err.1[0].contains("duration"));
}
