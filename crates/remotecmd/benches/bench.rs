use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::future::join_all;
use remotecmd::{AtomicIdSource, IdSource, Operation, Request, Service};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};
use tokio::runtime::Builder;

// Number of ids / invocations per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;
const TOTAL_CALLS: usize = 1024;

/// Single-threaded issuance: the uncontended cost of one `fetch_add`.
fn benchmark_ids_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("ids/sequential");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let ids = AtomicIdSource::new();
                for _ in 0..TOTAL_IDS {
                    black_box(ids.next_id());
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

/// Every thread hammers one shared source.
fn benchmark_ids_contended(c: &mut Criterion) {
    let threads = num_cpus::get().max(2);
    let mut group = c.benchmark_group("ids/contended");
    group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));

    group.bench_function(format!("threads/{threads}/elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let ids = Arc::new(AtomicIdSource::new());
            let barrier = Arc::new(Barrier::new(threads + 1));

            scope(|s| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let ids = ids.clone();
                        let barrier = barrier.clone();
                        s.spawn(move || {
                            barrier.wait();
                            for _ in 0..iters as usize * TOTAL_IDS {
                                black_box(ids.next_id());
                            }
                        })
                    })
                    .collect();

                barrier.wait();
                let start = Instant::now();
                for handle in handles {
                    handle.join().unwrap();
                }
                start.elapsed()
            })
        });
    });

    group.finish();
}

/// Full tracked round trip: id, `Begin`, no-op handler, `End`.
fn benchmark_tracked_invocations(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoke/noop");
    group.throughput(Throughput::Elements(TOTAL_CALLS as u64));

    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let service = rt.block_on(async {
        Service::builder()
            .register(Operation::from_fn("/noop", "Does nothing", |_req: Request| async {
                Ok(String::new())
            }))
            .unwrap()
            .build()
    });

    group.bench_function(format!("sequential/{TOTAL_CALLS}"), |b| {
        b.to_async(&rt).iter_custom(|iters| {
            let service = service.clone();
            async move {
                let start = Instant::now();
                for _ in 0..iters {
                    for _ in 0..TOTAL_CALLS {
                        black_box(service.handle("/noop", Request::get()).await.unwrap());
                    }
                }
                start.elapsed()
            }
        });
    });

    group.bench_function(format!("concurrent/{TOTAL_CALLS}"), |b| {
        b.to_async(&rt).iter_custom(|iters| {
            let service = service.clone();
            async move {
                let start = Instant::now();
                for _ in 0..iters {
                    let calls = (0..TOTAL_CALLS).map(|_| {
                        let service = service.clone();
                        tokio::spawn(async move { service.handle("/noop", Request::get()).await })
                    });
                    black_box(join_all(calls).await);
                }
                start.elapsed()
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_ids_sequential,
    benchmark_ids_contended,
    benchmark_tracked_invocations,
);
criterion_main!(benches);
