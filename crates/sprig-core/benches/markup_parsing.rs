//! Benchmarks for the markup scanner and tree builder.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sprig_core::markup::tree_builder::{TreeBuilder, parse_document};
use sprig_core::markup::{Dialect, ParseOptions, Scanner, ScannerConfig, Token};

/// Generate a synthetic document of approximately `target_bytes` size,
/// leaning on implied end tags and entities.
fn generate_markup(target_bytes: usize) -> String {
    let header = "<!DOCTYPE html><html><head><title>Benchmark</title></head><body>\n";
    let footer = "</body></html>";
    let overhead = header.len() + footer.len();

    let section = "<div class=\"content\"><h2>Section &amp; more</h2>\
        <p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.\
        <p>Sed do eiusmod tempor incididunt ut labore &mdash; et dolore.\
        <ul><li>Item one<li>Item two<li>Item &#x41;</ul>\
        <table><tr><td>1<td>2<tr><td>3</table>\
        <!-- note --><script>if (a < b) { run(); }</script></div>\n";

    let repeats = (target_bytes.saturating_sub(overhead)) / section.len() + 1;
    let mut out = String::with_capacity(target_bytes + 256);
    out.push_str(header);
    for _ in 0..repeats {
        out.push_str(section);
        if out.len() >= target_bytes {
            break;
        }
    }
    out.push_str(footer);
    out
}

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("markup_scanner");
    let config = ScannerConfig::default();

    for size in [10_000, 50_000, 100_000] {
        let input = generate_markup(size);
        let label = format!("{size}B");

        group.bench_with_input(BenchmarkId::new("scan", &label), &input, |b, input| {
            b.iter(|| {
                let mut scanner = Scanner::from_text(input, &config);
                let mut count = 0usize;
                while scanner.next_token() != Token::EndOfInput {
                    count += 1;
                }
                count
            });
        });
    }

    group.finish();
}

fn bench_tree_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("markup_tree_builder");
    let dialect = Dialect::html();

    for size in [10_000, 50_000, 100_000] {
        let input = generate_markup(size);
        let label = format!("{size}B");

        // Pre-scan so we only measure tree building.
        let tokens = Scanner::from_text(&input, &dialect.scanner_config()).tokenize();

        group.bench_with_input(BenchmarkId::new("build", &label), &tokens, |b, tokens| {
            b.iter(|| {
                let mut builder = TreeBuilder::new(&dialect, ParseOptions::default());
                for tok in tokens {
                    builder.process_token(tok.as_token());
                }
                builder.finish()
            });
        });
    }

    group.finish();
}

fn bench_full_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("markup_full_parse");
    let dialect = Dialect::html();

    for size in [10_000, 50_000, 100_000] {
        let input = generate_markup(size);
        let label = format!("{size}B");

        group.bench_with_input(BenchmarkId::new("scan+build", &label), &input, |b, input| {
            b.iter(|| parse_document(input, &dialect, ParseOptions::default()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scanner, bench_tree_builder, bench_full_parse);
criterion_main!(benches);
