//! Pool cache benchmarks: steady-state reuse and mixed churn.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use respawn_core::Stage;
use respawn_pool::Pools;

fn bench_steady_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("steady_reuse");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("acquire_release_warm", |b| {
        let mut stage = Stage::new();
        let proto = stage.register_prototype("bullet");
        let mut pools = Pools::new();
        pools.prepare(&mut stage, proto, 1024);

        b.iter(|| {
            let handle = pools.acquire(&mut stage, proto, None).unwrap();
            pools.release(&mut stage, black_box(handle));
        });
    });

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("mixed_acquire_release_tick", |b| {
        let mut stage = Stage::new();
        let proto = stage.register_prototype("spark");
        let mut pools = Pools::new();
        pools.prepare(&mut stage, proto, 256);

        let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
        let mut live = Vec::with_capacity(512);

        b.iter(|| {
            // Bounded random walk between acquire and release, with the
            // per-frame maintenance tick in the loop.
            if live.len() >= 512 || (!live.is_empty() && rng.gen_bool(0.5)) {
                let index = rng.gen_range(0..live.len());
                let handle: respawn_core::InstanceHandle = live.swap_remove(index);
                pools.release(&mut stage, handle);
            } else if let Some(handle) = pools.acquire(&mut stage, proto, None) {
                live.push(handle);
            }
            pools.tick(&mut stage);
            black_box(live.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_steady_reuse, bench_churn);
criterion_main!(benches);
