//! Criterion benchmarks for the streaming engine.
//!
//! Run with:
//!   cargo bench --bench stream

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xzr::{decode_bytes, encode_bytes, DecoderConfig, EncoderConfig};

/// Compressible synthetic data: a Latin-like filler repeated to `size` bytes,
/// so throughput numbers reflect the codec rather than the corpus.
fn synthetic_data(size: usize) -> Vec<u8> {
    const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
        sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \
        Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi \
        ut aliquip ex ea commodo consequat. ";

    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let rem = size - out.len();
        let take = rem.min(LOREM.len());
        out.extend_from_slice(&LOREM[..take]);
    }
    out
}

fn bench_encode_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_encode_decode");

    for &size in &[65_536usize, 1_048_576] {
        let data = synthetic_data(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &data, |b, data| {
            b.iter(|| encode_bytes(data, &EncoderConfig::default()).unwrap())
        });

        let encoded = encode_bytes(&data, &EncoderConfig::default()).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| decode_bytes(encoded, &DecoderConfig::default()).unwrap())
        });
    }

    group.finish();
}

fn bench_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_presets");
    let data = synthetic_data(262_144);

    for &preset in &[0u32, 6, 9] {
        let cfg = EncoderConfig {
            preset,
            ..EncoderConfig::default()
        };
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", preset), &data, |b, data| {
            b.iter(|| encode_bytes(data, &cfg).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode_decode, bench_presets);
criterion_main!(benches);
