use std::hint::black_box;

use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zenbridge::{Envelope, Gid, MessageQueue};

const DEPTHS: &[usize] = &[1, 10, 42, 1000];

fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_push_pop");
    let payload = Bytes::from_static(&[0u8; 64]);
    let gid = Gid::new([1; 16]);

    for &depth in DEPTHS {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut queue = MessageQueue::with_capacity(depth).unwrap();
            b.iter(|| {
                for seq in 0..depth as i64 {
                    queue.push(Envelope::new(seq, 0, gid), payload.clone());
                }
                while let Ok(msg) = queue.pop_front() {
                    black_box(msg);
                }
            })
        });
    }
    group.finish();
}

fn bench_push_with_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_push_evicting");
    let gid = Gid::new([1; 16]);

    for &depth in DEPTHS {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut queue = MessageQueue::with_capacity(depth).unwrap();
            for seq in 0..depth as i64 {
                queue.push(Envelope::new(seq, 0, gid), Bytes::new());
            }
            let mut seq = depth as i64;
            b.iter(|| {
                seq += 1;
                black_box(queue.push(Envelope::new(seq, 0, gid), Bytes::new()))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_push_pop, bench_push_with_eviction);
criterion_main!(benches);
