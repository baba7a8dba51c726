use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use zenbridge::{envelope::codec::ENCODED_LEN, Envelope, Gid};

fn bench_encode(c: &mut Criterion) {
    let envelope = Envelope::new(1, 1_700_000_000_000_000_000, Gid::random());
    let mut group = c.benchmark_group("envelope");
    group.throughput(Throughput::Bytes(ENCODED_LEN as u64));

    group.bench_function("encode", |b| b.iter(|| black_box(&envelope).encode()));

    let encoded = envelope.encode();
    group.bench_function("decode", |b| {
        b.iter(|| Envelope::decode(black_box(&encoded)).unwrap())
    });

    let garbage = vec![0xffu8; ENCODED_LEN];
    group.bench_function("decode_malformed", |b| {
        b.iter(|| Envelope::decode(black_box(&garbage)).is_err())
    });
    group.finish();
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
