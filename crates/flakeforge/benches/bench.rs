use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakeforge::{
    BasicSequencer, Config, LockSequencer, Snowflake, TimeSource, codec,
};
use std::time::Instant;
use tokio::runtime::Builder;

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration. Matches a 12-bit increment
// so the lock generator never hits its backoff on the fixed clock.
const TOTAL_IDS: usize = 4096;

fn bench_codec(c: &mut Criterion) {
    let config = Config::default();
    let id: Snowflake = "397282797158964394".parse().unwrap();

    let mut group = c.benchmark_group("codec");
    group.bench_function("pack", |b| {
        b.iter(|| codec::pack(&config, black_box(1_514_790_000_000), 4, 9, black_box(3242)));
    });
    group.bench_function("unpack", |b| {
        b.iter(|| codec::unpack(black_box(&id), &config));
    });
    group.finish();
}

fn bench_basic(c: &mut Criterion) {
    let mut group = c.benchmark_group("basic");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let generator = BasicSequencer::with_time(
                    Config::default(),
                    FixedMockTime { millis: 1 << 41 },
                );
                for _ in 0..TOTAL_IDS {
                    black_box(generator.generate());
                }
            }
            start.elapsed()
        });
    });
    group.finish();
}

fn bench_lock(c: &mut Criterion) {
    let runtime = Builder::new_current_thread().enable_time().build().unwrap();

    let mut group = c.benchmark_group("lock");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.to_async(&runtime).iter_custom(|iters| async move {
            let start = Instant::now();
            for _ in 0..iters {
                let generator = LockSequencer::with_time(
                    Config::default(),
                    FixedMockTime { millis: 1 << 41 },
                );
                for _ in 0..TOTAL_IDS {
                    black_box(generator.generate().await);
                }
            }
            start.elapsed()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_codec, bench_basic, bench_lock);
criterion_main!(benches);
