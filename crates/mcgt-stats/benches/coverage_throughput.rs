use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mcgt_stats::{coverage, CoverageOptions, Group, Statistic};

fn synthetic_groups() -> Vec<Group> {
    (0..32)
        .map(|g| {
            let values = (0..256)
                .map(|i| ((i * 7919 + g * 104_729) % 1000) as f64 / 1000.0)
                .collect();
            Group::new(format!("g{g}"), values)
        })
        .collect()
}

fn bench_coverage(c: &mut Criterion) {
    let groups = synthetic_groups();
    let opts = CoverageOptions {
        statistic: Statistic::P95,
        n_boot: 200,
        confidence: 0.95,
    };
    c.bench_function("coverage_p95_32x256", |b| {
        b.iter(|| {
            let report = coverage(black_box(&groups), None, &opts, 5).unwrap();
            black_box(report.coverage);
        })
    });
}

criterion_group!(benches, bench_coverage);
criterion_main!(benches);
