//! Benchmarks for ObservableList batching and event dispatch.
//!
//! Run with: cargo bench -p dlgbind-reactive -- list

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use dlgbind_reactive::ObservableList;

// ---------------------------------------------------------------------------
// 1. Resume diff after a batch that keeps every other item
// ---------------------------------------------------------------------------

fn bench_resume_thinning(c: &mut Criterion) {
    let mut group = c.benchmark_group("list/resume_thinning");

    for count in [16u64, 128, 1_024] {
        group.throughput(Throughput::Elements(count));
        let items: Vec<u64> = (0..count).collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| {
                let list = ObservableList::from_vec(items.clone());
                let _sub = list.on_changed(|change| {
                    black_box(change.removed.len());
                });
                list.suspend_events();
                list.retain(|v| v % 2 == 0);
                list.extend((0..8).map(|v| count + v));
                list.resume_events();
                black_box(list.len())
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Resume after a pure permutation
// ---------------------------------------------------------------------------

fn bench_resume_permutation(c: &mut Criterion) {
    let mut group = c.benchmark_group("list/resume_permutation");

    for count in [16u64, 128, 1_024] {
        group.throughput(Throughput::Elements(count));
        let items: Vec<u64> = (0..count).collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| {
                let list = ObservableList::from_vec(items.clone());
                list.suspend_events();
                let mut rotated = items.clone();
                rotated.rotate_left(1);
                list.clear();
                list.extend(rotated);
                list.resume_events();
                black_box(list.len())
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 3. Unbatched pushes with subscribers attached
// ---------------------------------------------------------------------------

fn bench_push_with_subscribers(c: &mut Criterion) {
    let mut group = c.benchmark_group("list/push");

    for subscribers in [1usize, 8, 64] {
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &subscribers,
            |b, &subscribers| {
                let list = ObservableList::new();
                let _subs: Vec<_> = (0..subscribers)
                    .map(|_| {
                        list.on_changed(|change| {
                            black_box(change.added.len());
                        })
                    })
                    .collect();
                b.iter(|| {
                    list.push(black_box(1u64));
                    list.pop();
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_resume_thinning,
    bench_resume_permutation,
    bench_push_with_subscribers
);
criterion_main!(benches);
