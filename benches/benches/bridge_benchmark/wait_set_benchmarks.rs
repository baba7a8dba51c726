use std::{
    sync::{Arc, Barrier},
    thread,
    time::Duration,
};

use criterion::{criterion_group, criterion_main, Criterion};
use zenbridge::{GuardCondition, WaitSet};

fn bench_fast_path(c: &mut Criterion) {
    let guard = GuardCondition::new();
    let mut wait_set = WaitSet::new();
    c.bench_function("wait_set_fast_path", |b| {
        b.iter(|| {
            guard.trigger();
            wait_set.wait_any(&[&guard], None).unwrap()
        })
    });
}

fn bench_poll_timeout(c: &mut Criterion) {
    let guard = GuardCondition::new();
    let mut wait_set = WaitSet::new();
    c.bench_function("wait_set_poll_empty", |b| {
        b.iter(|| wait_set.wait_any(&[&guard], Some(Duration::ZERO)).is_err())
    });
}

fn bench_cross_thread_wakeup(c: &mut Criterion) {
    c.bench_function("wait_set_cross_thread_wakeup", |b| {
        b.iter(|| {
            let guard = Arc::new(GuardCondition::new());
            let barrier = Arc::new(Barrier::new(2));
            let trigger = {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    guard.trigger();
                })
            };
            let mut wait_set = WaitSet::new();
            barrier.wait();
            wait_set
                .wait_any(&[&*guard], Some(Duration::from_secs(1)))
                .unwrap();
            trigger.join().unwrap();
        })
    });
}

criterion_group!(benches, bench_fast_path, bench_poll_timeout, bench_cross_thread_wakeup);
criterion_main!(benches);
