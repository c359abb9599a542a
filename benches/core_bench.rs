//! Benchmarks for sazon core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use sazon::core::cookbook::parse_definition;
use sazon::core::planner::{self, Plan};
use sazon::{Field, FieldSet, FunctionSpace, Sazon, SazonConfig};

fn fieldset(nodes: usize, levels: usize) -> FieldSet {
    let grid = FunctionSpace::new("lonlat", nodes);
    let mut fs = FieldSet::new();
    fs.add(
        Field::from_values(
            "t",
            grid.clone(),
            Array2::from_elem((nodes, levels), 287.0),
        )
        .unwrap()
        .with_units("K"),
    )
    .unwrap();
    fs.add(
        Field::from_values("ps", grid.clone(), Array2::from_elem((nodes, 1), 950.0))
            .unwrap()
            .with_units("hPa"),
    )
    .unwrap();
    fs.add(
        Field::from_values(
            "q",
            grid,
            Array2::from_elem((nodes, levels), 0.008),
        )
        .unwrap()
        .with_units("kg kg-1"),
    )
    .unwrap();
    fs
}

fn engine() -> Sazon {
    let mut config = SazonConfig::with_cookbook(
        parse_definition("pt: [t_to_pt]\ntv: [tq_to_tv]\n").unwrap(),
    );
    config.add_to_config("p0", 1000.0);
    config.add_to_config("kappa", 0.286);
    Sazon::new(config).unwrap()
}

fn bench_plan_variable(c: &mut Criterion) {
    let engine = engine();
    let fs = fieldset(64, 10);

    c.bench_function("plan_variable", |b| {
        b.iter(|| {
            let mut needed = vec!["pt".to_string(), "tv".to_string()];
            let mut plan = Plan::new();
            for target in ["pt", "tv"] {
                planner::plan_variable(
                    engine.cookbook(),
                    black_box(&fs),
                    &mut needed,
                    target,
                    false,
                    0,
                    &mut plan,
                )
                .unwrap();
            }
            black_box(plan);
        });
    });
}

fn bench_change_var(c: &mut Criterion) {
    let engine = engine();

    let mut group = c.benchmark_group("change_var");
    for nodes in [64, 1024, 16384] {
        let fs = fieldset(nodes, 10);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &fs, |b, fs| {
            b.iter(|| {
                let mut fs = fs.deep_copy();
                let mut needed = vec!["pt".to_string(), "tv".to_string()];
                let populated = engine.change_var(&mut fs, &mut needed).unwrap();
                black_box(populated);
            });
        });
    }
    group.finish();
}

fn bench_trajectory_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("trajectory_capture");
    for nodes in [64, 1024, 16384] {
        let fs = fieldset(nodes, 10);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &fs, |b, fs| {
            b.iter(|| {
                black_box(fs.deep_copy());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_plan_variable,
    bench_change_var,
    bench_trajectory_capture
);
criterion_main!(benches);
