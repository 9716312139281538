//! Framing and transaction benchmarks

use blocklink_core::{frame, transact, ScriptedChannel, BLOCK_SIZE, RESPONSE_SIZE};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::time::Duration;

fn framing_benchmark(c: &mut Criterion) {
    let message: Vec<u8> = (0..62).map(|i| (i % 256) as u8).collect();

    let mut group = c.benchmark_group("framing");
    group.throughput(Throughput::Bytes(BLOCK_SIZE as u64));

    group.bench_function("frame_max_message", |b| {
        b.iter(|| {
            let block = frame(black_box(&message), BLOCK_SIZE).unwrap();
            black_box(block)
        })
    });

    group.finish();
}

fn transaction_benchmark(c: &mut Criterion) {
    let response = vec![0x5Au8; RESPONSE_SIZE];

    let mut group = c.benchmark_group("transaction");
    group.throughput(Throughput::Bytes((BLOCK_SIZE + RESPONSE_SIZE) as u64));

    group.bench_function("scripted_exchange", |b| {
        b.iter(|| {
            let mut channel = ScriptedChannel::new().respond(&response);
            let block = frame(black_box(b"abc"), BLOCK_SIZE).unwrap();
            let got = transact(
                &mut channel,
                block,
                RESPONSE_SIZE,
                Duration::from_millis(100),
            )
            .unwrap();
            black_box(got)
        })
    });

    group.finish();
}

criterion_group!(benches, framing_benchmark, transaction_benchmark);
criterion_main!(benches);
