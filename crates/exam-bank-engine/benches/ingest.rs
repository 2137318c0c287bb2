use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use exam_bank_engine::{ParseOptions, ingest};
use exam_bank_syntax::lex;
mod common;

fn bench_lex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lex");
    group.sample_size(20);

    for size in [30, 300] {
        let runs = common::generate_exam(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &runs, |b, runs| {
            b.iter(|| std::hint::black_box(lex(std::hint::black_box(runs))));
        });
    }

    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    group.sample_size(20);

    let options = ParseOptions::default();
    for size in [30, 300] {
        let runs = common::generate_exam(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &runs, |b, runs| {
            b.iter(|| std::hint::black_box(ingest(std::hint::black_box(runs), &options)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lex, bench_ingest);
criterion_main!(benches);
