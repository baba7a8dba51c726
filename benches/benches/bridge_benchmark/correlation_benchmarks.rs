use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use zenbridge::{CorrelationKey, CorrelationMap, Gid, RequestId};
use zenbridge_error::CorrelationError;

fn make_ids(
    n: usize,
    seed: u64,
) -> Vec<RequestId> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| RequestId::new(i as i64 + 1, Gid::new(rng.gen())))
        .collect()
}

fn bench_hash(c: &mut Criterion) {
    let id = RequestId::new(42, Gid::new([7; 16]));
    c.bench_function("request_id_fnv1a", |b| {
        b.iter(|| black_box(&id).correlation_hash())
    });
}

fn bench_insert_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation_insert_extract");

    for &capacity in &[4usize, 42, 256] {
        let ids = make_ids(capacity, capacity as u64);
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &ids, |b, ids| {
            let mut map = CorrelationMap::with_capacity(ids.len()).unwrap();
            b.iter(|| {
                for (i, id) in ids.iter().enumerate() {
                    map.insert(*id, i).unwrap();
                }
                // извлекаем в обратном порядке: худший случай для линейного поиска
                for id in ids.iter().rev() {
                    black_box(map.extract(id).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_full_table_rejection(c: &mut Criterion) {
    let ids = make_ids(43, 7);
    let mut map = CorrelationMap::with_capacity(42).unwrap();
    for id in &ids[..42] {
        map.insert(*id, ()).unwrap();
    }
    c.bench_function("correlation_table_full", |b| {
        b.iter(|| {
            let result = map.check_insert(black_box(&ids[42]));
            assert!(matches!(result, Err(CorrelationError::TableFull { .. })));
        })
    });
}

criterion_group!(benches, bench_hash, bench_insert_extract, bench_full_table_rejection);
criterion_main!(benches);
