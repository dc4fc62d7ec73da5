//! Basic benchmarks for the `raw_vector` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use raw_vector::{CloneRelocation, Vector};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;
const BATCH_SIZE: usize = 1_000;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("vector_basic");

    let allocs_op = allocs.operation("push_1000_growing");
    group.bench_function("push_1000_growing", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut vector: Vector<TestItem> = Vector::new();

                for _ in 0..BATCH_SIZE {
                    vector.push(black_box(TEST_VALUE));
                }

                drop(black_box(vector));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_1000_reserved");
    group.bench_function("push_1000_reserved", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut vector: Vector<TestItem> = Vector::with_capacity(BATCH_SIZE);

                for _ in 0..BATCH_SIZE {
                    vector.push(black_box(TEST_VALUE));
                }

                drop(black_box(vector));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_1000_strings_move");
    group.bench_function("push_1000_strings_move", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut vector: Vector<String> = Vector::new();

                for _ in 0..BATCH_SIZE {
                    vector.push(black_box(String::from("value")));
                }

                drop(black_box(vector));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_1000_strings_clone");
    group.bench_function("push_1000_strings_clone", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut vector: Vector<String, CloneRelocation> = Vector::new();

                for _ in 0..BATCH_SIZE {
                    vector.push(black_box(String::from("value")));
                }

                drop(black_box(vector));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("insert_front");
    group.bench_function("insert_front", |b| {
        b.iter_custom(|iters| {
            let mut vectors = iter::repeat_with(|| {
                let mut vector: Vector<TestItem> = Vector::with_capacity(BATCH_SIZE + 1);
                vector.resize(BATCH_SIZE);
                vector
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for vector in &mut vectors {
                vector.insert(0, black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("erase_front");
    group.bench_function("erase_front", |b| {
        b.iter_custom(|iters| {
            let mut vectors = iter::repeat_with(|| Vector::<TestItem>::with_len(BATCH_SIZE))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for vector in &mut vectors {
                black_box(vector.erase(0));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("clone_1000");
    group.bench_function("clone_1000", |b| {
        b.iter_custom(|iters| {
            let source: Vector<String> = iter::repeat_n(String::from("value"), BATCH_SIZE).collect();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(source.clone()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("assign_within_capacity");
    group.bench_function("assign_within_capacity", |b| {
        b.iter_custom(|iters| {
            let source: Vector<String> = iter::repeat_n(String::from("value"), BATCH_SIZE).collect();
            let mut target: Vector<String> = Vector::with_len(BATCH_SIZE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                target.clone_from(black_box(&source));
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
