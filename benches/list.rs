//! Benchmarks for the hooked list.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hooked_list::{Direction, List};
use std::collections::LinkedList;
use std::iter::FromIterator;

const COUNT: usize = 10_000;

// ============================================================================
// Insertion
// ============================================================================

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    group.throughput(Throughput::Elements(COUNT as u64));

    group.bench_function("hooked_list/add_node_tail", |b| {
        b.iter(|| {
            let mut list = List::new();
            for i in 0..COUNT as u64 {
                list.add_node_tail(black_box(i)).unwrap();
            }
            list
        });
    });

    group.bench_function("hooked_list/add_node_head", |b| {
        b.iter(|| {
            let mut list = List::new();
            for i in 0..COUNT as u64 {
                list.add_node_head(black_box(i)).unwrap();
            }
            list
        });
    });

    group.bench_function("std_linked_list/push_back", |b| {
        b.iter(|| {
            let mut list = LinkedList::new();
            for i in 0..COUNT as u64 {
                list.push_back(black_box(i));
            }
            list
        });
    });

    group.finish();
}

// ============================================================================
// Lookup
// ============================================================================

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let list = List::from_iter(0..COUNT as u64);

    group.bench_function("index/middle", |b| {
        b.iter(|| black_box(list.index(black_box(COUNT as isize / 2))));
    });

    group.bench_function("index/near_tail", |b| {
        b.iter(|| black_box(list.index(black_box(-2))));
    });

    group.bench_function("search_key_or_eq/last", |b| {
        b.iter(|| black_box(list.search_key_or_eq(black_box(&(COUNT as u64 - 1)))));
    });

    let mut matched = List::from_iter(0..COUNT as u64);
    matched.set_matcher(|value, key| value % 1000 == *key);
    group.bench_function("search_key/matcher", |b| {
        b.iter(|| black_box(matched.search_key(black_box(&999))));
    });

    group.finish();
}

// ============================================================================
// Iteration and deletion
// ============================================================================

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    group.throughput(Throughput::Elements(COUNT as u64));
    let list = List::from_iter(0..COUNT as u64);

    group.bench_function("iter/sum", |b| {
        b.iter(|| black_box(list.iter().sum::<u64>()));
    });

    group.bench_function("node_iter/backward", |b| {
        b.iter(|| {
            let mut iter = list.node_iter(Direction::Backward);
            let mut count = 0;
            // SAFETY: the list is not modified while walking it.
            while let Some(node) = unsafe { iter.next() } {
                black_box(node);
                count += 1;
            }
            count
        });
    });

    group.bench_function("node_iter/delete_odd", |b| {
        b.iter(|| {
            let mut list = List::from_iter(0..COUNT as u64);
            let mut iter = list.node_iter(Direction::Forward);
            // SAFETY: only the node just yielded is deleted.
            unsafe {
                while let Some(node) = iter.next() {
                    if list.value(node) % 2 == 1 {
                        list.del_node(node);
                    }
                }
            }
            list
        });
    });

    group.finish();
}

// ============================================================================
// Whole-list operations
// ============================================================================

fn bench_whole_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("whole_list");
    let list = List::from_iter(0..COUNT as u64);

    group.throughput(Throughput::Elements(COUNT as u64));
    group.bench_function("dup_or_clone", |b| {
        b.iter(|| list.dup_or_clone().unwrap());
    });

    let mut hooked = List::from_iter(0..COUNT as u64);
    hooked.set_dup(|v| Some(v + 1));
    group.bench_function("dup/hook", |b| {
        b.iter(|| hooked.dup().unwrap());
    });

    let mut rotating = List::from_iter(0..COUNT as u64);
    group.throughput(Throughput::Elements(1));
    group.bench_function("rotate_tail_to_head", |b| {
        b.iter(|| rotating.rotate_tail_to_head());
    });

    group.bench_function("join", |b| {
        let mut list = List::from_iter(0..COUNT as u64);
        let mut other = List::new();
        b.iter(|| {
            other.push_back(black_box(0));
            list.join(&mut other);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_push,
    bench_lookup,
    bench_iterate,
    bench_whole_list,
);

criterion_main!(benches);
