use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use inline_diff::{DiffConfig, InlineDiff};

fn make_article(paragraphs: usize, seed: u64) -> String {
    let mut out = String::new();
    for p in 0..paragraphs {
        for s in 0..4 {
            let n = seed.wrapping_add((p * 4 + s) as u64).wrapping_mul(2654435761);
            out.push_str(&format!(
                "Sentence {s} of paragraph {p} carries payload {n} and some filler words. "
            ));
        }
        out.push_str("\n\n");
    }
    out
}

fn scatter_edits(text: &str) -> String {
    text.split_whitespace()
        .enumerate()
        .map(|(i, w)| {
            if i % 37 == 0 {
                format!("edited{i}")
            } else {
                w.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn move_block(text: &str) -> String {
    let paragraphs: Vec<&str> = text.split("\n\n").collect();
    if paragraphs.len() < 4 {
        return text.to_owned();
    }
    let mut reordered: Vec<&str> = Vec::with_capacity(paragraphs.len());
    reordered.extend(&paragraphs[2..]);
    reordered.extend(&paragraphs[..2]);
    reordered.join("\n\n")
}

fn bench_identical(c: &mut Criterion) {
    let engine = InlineDiff::with_defaults();
    let mut group = c.benchmark_group("identical");
    for paragraphs in [10usize, 50] {
        let text = make_article(paragraphs, 1);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(paragraphs),
            &text,
            |b, text| b.iter(|| engine.diff(text, text)),
        );
    }
    group.finish();
}

fn bench_scattered_edits(c: &mut Criterion) {
    let engine = InlineDiff::with_defaults();
    let mut group = c.benchmark_group("scattered_edits");
    for paragraphs in [10usize, 50] {
        let old = make_article(paragraphs, 1);
        let new = scatter_edits(&old);
        group.throughput(Throughput::Bytes(old.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(paragraphs),
            &(old, new),
            |b, (old, new)| b.iter(|| engine.diff(old, new)),
        );
    }
    group.finish();
}

fn bench_block_move(c: &mut Criterion) {
    let engine = InlineDiff::with_defaults();
    let mut group = c.benchmark_group("block_move");
    for paragraphs in [10usize, 50] {
        let old = make_article(paragraphs, 1);
        let new = move_block(&old);
        group.throughput(Throughput::Bytes(old.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(paragraphs),
            &(old, new),
            |b, (old, new)| b.iter(|| engine.diff(old, new)),
        );
    }
    group.finish();
}

fn bench_fastest_preset(c: &mut Criterion) {
    let engine = InlineDiff::new(DiffConfig::fastest()).expect("valid preset");
    let old = make_article(50, 1);
    let new = scatter_edits(&move_block(&old));
    c.bench_function("fastest_preset_mixed", |b| {
        b.iter(|| engine.diff(&old, &new))
    });
}

criterion_group!(
    benches,
    bench_identical,
    bench_scattered_edits,
    bench_block_move,
    bench_fastest_preset
);
criterion_main!(benches);
