//! # Pool Benchmark
//!
//! REQUIREMENTS:
//! - Acquire/release of a pre-warmed instance is O(1)
//! - Registry routing adds one hash lookup per call
//!
//! Run with: `cargo bench --package shatter_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shatter_core::{Factory, Poolable, PoolRegistry, ResourcePool};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShardKind {
    Shard,
}

struct Shard {
    position: [f32; 2],
    active: bool,
}

impl Poolable for Shard {
    type Kind = ShardKind;

    fn kind(&self) -> ShardKind {
        ShardKind::Shard
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn reset(&mut self) {
        self.position = [0.0; 2];
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

fn shard_factory() -> Factory<Shard> {
    Box::new(|_| {
        Ok(Shard {
            position: [0.0; 2],
            active: false,
        })
    })
}

/// Benchmark: acquire + release against a warm pool.
fn bench_pool_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_cycle");

    for size in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut pool =
                ResourcePool::new("shards", ShardKind::Shard, shard_factory(), size, size)
                    .expect("pool config is valid");
            b.iter(|| {
                let mut shard = pool.acquire().expect("warm pool");
                shard.position = black_box([1.0, 2.0]);
                black_box(pool.release(shard))
            });
        });
    }

    group.finish();
}

/// Benchmark: the same cycle routed through the registry.
fn bench_registry_cycle(c: &mut Criterion) {
    let mut registry = PoolRegistry::new();
    registry
        .register_pool("shards", ShardKind::Shard, shard_factory(), 256, 256)
        .expect("pool config is valid");

    c.bench_function("registry_cycle", |b| {
        b.iter(|| {
            let shard = registry
                .acquire(black_box("shards"), ShardKind::Shard)
                .expect("warm pool");
            black_box(registry.release(shard).is_returned())
        });
    });
}

criterion_group!(benches, bench_pool_cycle, bench_registry_cycle);
criterion_main!(benches);
