//! E2E Test Suite 01: One-shot encode/decode
//!
//! Drives complete streams through single `process` calls and through the
//! in-memory helpers.  Validates:
//! - The canonical "hello world" scenario (consumed/produced/status)
//! - The round-trip law over representative inputs
//! - Empty-stream encode/decode
//! - Every preset and every content-check variant
//! - `encode_bound` as a real upper bound

use xzr::stream::header::encode_bound;
use xzr::{
    decode_bytes, encode_bytes, Action, Check, DecoderConfig, EncoderConfig, Status, Stream,
};

/// Deterministic pseudo-random bytes (no external corpus needed).
fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
            (state >> 24) as u8
        })
        .collect()
}

fn repetitive(len: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: the canonical hello-world scenario
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_hello_world_scenario() {
    let mut encoder = Stream::new();
    encoder
        .init_encoder(&EncoderConfig::default())
        .expect("init encoder");

    let mut compressed = vec![0u8; 256];
    let enc = encoder
        .process(b"hello world", &mut compressed, Action::Finish)
        .expect("encode");
    assert_eq!(enc.status, Status::StreamEnded);
    assert_eq!(enc.consumed, 11);
    assert!(enc.produced > 0);
    compressed.truncate(enc.produced);

    let mut decoder = Stream::new();
    decoder
        .init_decoder(&DecoderConfig::default())
        .expect("init decoder");
    let mut output = vec![0u8; 256];
    let dec = decoder
        .process(&compressed, &mut output, Action::Finish)
        .expect("decode");
    assert_eq!(dec.status, Status::StreamEnded);
    assert_eq!(dec.produced, 11);
    assert_eq!(&output[..11], b"hello world");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: empty-stream encode round-trips to empty output
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_stream_round_trip() {
    let mut encoder = Stream::new();
    encoder
        .init_encoder(&EncoderConfig::default())
        .expect("init encoder");
    let mut compressed = vec![0u8; 64];
    let enc = encoder
        .process(&[], &mut compressed, Action::Finish)
        .expect("encode");
    assert_eq!(enc.status, Status::StreamEnded);
    assert!(enc.produced > 0, "terminal output must be self-consistent");
    compressed.truncate(enc.produced);

    let decoded = decode_bytes(&compressed, &DecoderConfig::default()).expect("decode");
    assert!(decoded.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: round-trip law over representative inputs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_round_trip_law() {
    let corpora: Vec<Vec<u8>> = vec![
        Vec::new(),
        vec![0u8],
        b"short".to_vec(),
        repetitive(100_000),
        noise(4096, 7),
        vec![0u8; 250_000],
        noise(100_000, 42),
    ];
    for data in &corpora {
        let encoded = encode_bytes(data, &EncoderConfig::default()).expect("encode");
        let decoded = decode_bytes(&encoded, &DecoderConfig::default()).expect("decode");
        assert_eq!(&decoded, data, "round trip failed for {} bytes", data.len());
    }
}

#[test]
fn test_repetitive_data_shrinks() {
    let data = repetitive(100_000);
    let encoded = encode_bytes(&data, &EncoderConfig::default()).expect("encode");
    assert!(
        encoded.len() < data.len() / 2,
        "highly repetitive input should compress well, got {} -> {}",
        data.len(),
        encoded.len()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: all presets and all checks round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_all_presets_round_trip() {
    let data = repetitive(20_000);
    for preset in 0..=9u32 {
        let cfg = EncoderConfig {
            preset,
            ..EncoderConfig::default()
        };
        let encoded = encode_bytes(&data, &cfg).expect("encode");
        let decoded = decode_bytes(&encoded, &DecoderConfig::default()).expect("decode");
        assert_eq!(decoded, data, "preset {preset}");
    }
}

#[test]
fn test_all_checks_round_trip() {
    let data = repetitive(5_000);
    for check in [Check::None, Check::Xxh32, Check::Xxh64] {
        for block_checksums in [false, true] {
            let cfg = EncoderConfig {
                check,
                block_checksums,
                ..EncoderConfig::default()
            };
            let encoded = encode_bytes(&data, &cfg).expect("encode");
            let decoded = decode_bytes(&encoded, &DecoderConfig::default()).expect("decode");
            assert_eq!(decoded, data, "check {check:?} blk {block_checksums}");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: encode_bound is a true upper bound
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_encode_bound_holds() {
    for (data, cfg) in [
        (Vec::new(), EncoderConfig::default()),
        (noise(70_000, 3), EncoderConfig::default()),
        (
            noise(200_000, 9),
            EncoderConfig {
                dict_size: 1 << 12,
                block_checksums: true,
                ..EncoderConfig::default()
            },
        ),
    ] {
        let bound = encode_bound(data.len(), &cfg).expect("bound");
        let encoded = encode_bytes(&data, &cfg).expect("encode");
        assert!(
            encoded.len() <= bound,
            "bound {} must cover actual {}",
            bound,
            encoded.len()
        );
    }
}
