use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mcgt_cosmo::{CosmoModel, Distances, GrowthSolver};

fn bench_growth(c: &mut Criterion) {
    let model = CosmoModel::default();
    let solver = GrowthSolver::new(&model).unwrap();
    let grid: Vec<f64> = (1..=50).map(|i| i as f64 / 50.0).collect();
    c.bench_function("growth_solve_50", |b| {
        b.iter(|| {
            let table = solver.solve(black_box(&grid)).unwrap();
            black_box(table.d.len());
        })
    });

    let distances = Distances::new(solver.background().clone(), model.numerics.distance_steps);
    c.bench_function("comoving_distance_z1", |b| {
        b.iter(|| black_box(distances.comoving_distance(black_box(1.0)).unwrap()))
    });
}

criterion_group!(benches, bench_growth);
criterion_main!(benches);
