use criterion::{Criterion, criterion_group, criterion_main};
use matrix_stress::core::models::TestUnit;
use matrix_stress::core::planner::{MatrixOptions, build_matrix};
use matrix_stress::core::worker::IndexSampler;
use matrix_stress::kinds;
use std::hint::black_box;

fn bench_build_matrix(c: &mut Criterion) {
    let registry = kinds::registry();
    let options = MatrixOptions {
        redefine: true,
        ..MatrixOptions::default()
    };

    c.bench_function("build_matrix", |b| {
        b.iter(|| build_matrix(black_box(&registry), black_box(&options)));
    });
}

fn bench_sample_and_run(c: &mut Criterion) {
    let registry = kinds::registry();
    let matrix = match build_matrix(&registry, &MatrixOptions::default()) {
        Ok(matrix) => matrix,
        Err(e) => panic!("failed to build matrix: {e}"),
    };
    let mut sampler = IndexSampler::new(42, matrix.len()).unwrap();

    c.bench_function("index_sampler", |b| {
        b.iter(|| black_box(sampler.next_index()));
    });

    c.bench_function("sample_and_run", |b| {
        b.iter(|| {
            if let Some(unit) = matrix.get(sampler.next_index()) {
                let _ = black_box(unit.run());
            }
        });
    });
}

criterion_group!(benches, bench_build_matrix, bench_sample_and_run);
criterion_main!(benches);
