//! Criterion benchmarks for the section editor.
//!
//! Every toggle re-reads and rewrites the whole `.htaccess`, so these measure
//! the cost of an upsert and of presence detection against files padded with
//! a growing amount of unrelated, hand-written directives.
//!
//! Run with:
//! ```bash
//! cargo bench --package speedup-core --bench section_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use speedup_core::{
    upsert_text, BlockCatalog, ByteDistancePolicy, Feature, LineCountPolicy, PresencePolicy,
    SectionEdit,
};

/// Builds an `.htaccess` with `n` unrelated directive lines followed by the
/// expiry section.
fn build_htaccess(n: usize) -> String {
    let mut text = String::new();
    for i in 0..n {
        text.push_str(&format!("Redirect 301 /old-{i} /new-{i}\n"));
    }
    let body = BlockCatalog::new("example.com").render(Feature::ExpiryHeaders);
    match upsert_text(&text, Feature::ExpiryHeaders.section_name(), &body) {
        Ok(SectionEdit::Rewritten(out)) => out,
        _ => text,
    }
}

fn bench_upsert(c: &mut Criterion) {
    let catalog = BlockCatalog::new("example.com");
    let hotlinks = catalog.render(Feature::HotlinkPrevention);
    let mut group = c.benchmark_group("upsert_text");

    for n in [10usize, 1_000, 10_000] {
        let text = build_htaccess(n);
        group.bench_with_input(BenchmarkId::new("append", n), &text, |b, text| {
            let name = Feature::HotlinkPrevention.section_name();
            b.iter(|| upsert_text(black_box(text), name, &hotlinks))
        });
        group.bench_with_input(BenchmarkId::new("remove", n), &text, |b, text| {
            b.iter(|| upsert_text(black_box(text), Feature::ExpiryHeaders.section_name(), &[]))
        });
    }
    group.finish();
}

fn bench_presence(c: &mut Criterion) {
    let mut group = c.benchmark_group("presence");
    let byte = ByteDistancePolicy::default();
    let lines = LineCountPolicy::default();

    for n in [10usize, 10_000] {
        let text = build_htaccess(n);
        group.bench_with_input(BenchmarkId::new("byte_distance", n), &text, |b, text| {
            b.iter(|| byte.is_present(black_box(text), Feature::ExpiryHeaders.section_name()))
        });
        group.bench_with_input(BenchmarkId::new("line_count", n), &text, |b, text| {
            b.iter(|| lines.is_present(black_box(text), Feature::ExpiryHeaders.section_name()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_upsert, bench_presence);
criterion_main!(benches);
