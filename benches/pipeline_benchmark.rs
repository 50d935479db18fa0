//! Benchmarks for the full `bytes -> Scanner -> Parser -> Resolver -> Spec`
//! pipeline. Variable substitution and response formatting at execution
//! time are out of scope for this crate (see DESIGN.md), so those are not
//! benchmarked here.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use httpspec_core::parser::Parser;
use httpspec_core::resolver::Resolver;

/// Generates a synthetic `.http` file with `num_requests` independent
/// GET requests, each with a handful of headers.
fn generate_http_file(num_requests: usize) -> String {
    let mut content = String::new();
    for i in 0..num_requests {
        content.push_str(&format!(
            "### Request {i}\n\
             GET https://api.example.com/users/{i}\n\
             Authorization: Bearer token-{i}\n\
             Accept: application/json\n\
             X-Request-ID: req-{i}\n\
             \n"
        ));
    }
    content
}

/// Generates a synthetic `.http` file whose requests interpolate shared
/// global variables, to measure `Environment` lookup overhead.
fn generate_http_file_with_variables(num_requests: usize) -> String {
    let mut content = String::from("@baseUrl = https://api.example.com\n@authToken = secret-token\n\n");
    for i in 0..num_requests {
        content.push_str(&format!(
            "### Request {i}\n\
             GET {{{{baseUrl}}}}/resource/{i}\n\
             Authorization: Bearer {{{{authToken}}}}\n\
             Accept: application/json\n\
             \n"
        ));
    }
    content
}

/// Generates a synthetic `.http` file whose requests carry inline JSON
/// bodies, to measure the scanner's multi-line `Body` token path.
fn generate_http_file_with_bodies(num_requests: usize) -> String {
    let mut content = String::new();
    for i in 0..num_requests {
        content.push_str(&format!(
            "### Request {i}\n\
             POST https://api.example.com/resource/{i}\n\
             Content-Type: application/json\n\
             \n\
             {{\"id\": {i}, \"name\": \"resource-{i}\"}}\n\
             \n"
        ));
    }
    content
}

/// Runs the full `bytes -> Spec` pipeline once over `src`, discarding the
/// result. Panics on a failed parse/resolve so a regression shows up as a
/// benchmark failure, not a silently-skipped measurement.
fn run_pipeline(src: &str) {
    let mut p = Parser::new_silent("bench.http", src.as_bytes().to_vec());
    let (file, ok) = p.parse();
    assert!(ok, "bench fixture failed to parse: {:?}", p.diagnostics());
    let mut r = Resolver::new("bench.http", src.as_bytes().to_vec());
    let (_spec, ok) = r.resolve(&file);
    assert!(ok, "bench fixture failed to resolve: {:?}", r.diagnostics());
}

fn bench_pipeline_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_by_request_count");
    for &n in &[10usize, 100, 1_000, 5_000] {
        let content = generate_http_file(n);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &content, |b, content| {
            b.iter(|| run_pipeline(black_box(content)));
        });
    }
    group.finish();
}

fn bench_pipeline_with_variables(c: &mut Criterion) {
    let content = generate_http_file_with_variables(500);
    c.bench_function("pipeline_with_variables_500_requests", |b| {
        b.iter(|| run_pipeline(black_box(&content)));
    });
}

fn bench_pipeline_with_bodies(c: &mut Criterion) {
    let content = generate_http_file_with_bodies(500);
    c.bench_function("pipeline_with_inline_bodies_500_requests", |b| {
        b.iter(|| run_pipeline(black_box(&content)));
    });
}

fn bench_scanner_only(c: &mut Criterion) {
    use httpspec_core::scanner::Scanner;
    use httpspec_core::token::TokenKind;

    let content = generate_http_file(1_000);
    c.bench_function("scanner_only_1000_requests", |b| {
        b.iter(|| {
            let mut s = Scanner::new("bench.http", black_box(content.as_bytes()));
            loop {
                let t = s.scan();
                if t.kind == TokenKind::Eof {
                    break;
                }
            }
        });
    });
}

criterion_group!(
    benches,
    bench_pipeline_by_size,
    bench_pipeline_with_variables,
    bench_pipeline_with_bodies,
    bench_scanner_only,
);
criterion_main!(benches);
