use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ndtorus_core::prelude::*;

criterion_group!(step, count_benchmark, pattern_benchmark);
criterion_main!(step);

fn count_benchmark(c: &mut Criterion) {
    let life = CountRule::encode(8, &[3], &[2, 3]);
    let dims = vec![64, 64];
    bench_sim(c, "life_64x64", dims.clone(), RuleKind::Count, life.clone(), None);
    bench_sim(c, "life_64x64_parallel", dims, RuleKind::Count, life, Some(4));

    // B4/S4 in 3D.
    let b4s4 = CountRule::encode(26, &[4], &[4]);
    bench_sim(c, "b4s4_16x16x16", vec![16, 16, 16], RuleKind::Count, b4s4, None);
}

fn pattern_benchmark(c: &mut Criterion) {
    let rule_30 = BigUint::from(30_u32);
    let dims = vec![4096];
    bench_sim(c, "rule_30_4096", dims.clone(), RuleKind::Pattern, rule_30.clone(), None);
    bench_sim(c, "rule_30_4096_parallel", dims, RuleKind::Pattern, rule_30, Some(4));
}

fn bench_sim(
    c: &mut Criterion,
    name: &str,
    dimensions: Vec<usize>,
    kind: RuleKind,
    rule: BigUint,
    workers: Option<usize>,
) {
    let mut config = SimulationConfig::new(dimensions, kind, rule)
        .with_seed(0)
        .with_iterations(16);
    if let Some(workers) = workers {
        config = config.with_workers(workers);
    }

    c.bench_function(name, move |b| {
        b.iter_batched(
            || Simulation::new(config.clone()).expect("Invalid configuration"),
            |sim| {
                for state in sim {
                    black_box(state.expect("Simulation failed"));
                }
            },
            BatchSize::SmallInput,
        )
    });
}
