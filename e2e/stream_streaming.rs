//! E2E Test Suite 02: Incremental streaming
//!
//! Exercises the restartable-call contract: growing/shrinking buffers across
//! calls, zero-capacity outputs, multi-block streams, counter monotonicity,
//! and concatenated-stream decoding.

use xzr::{
    decode_bytes, encode_bytes, Action, DecoderConfig, EncoderConfig, Status, Stream,
};

fn sample(len: usize) -> Vec<u8> {
    b"incremental streaming exercises every suspension point "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Encode with per-call input chunks of `chunk` bytes and output capacity
/// `out_cap`, then decode the result in one shot.
fn chunked_encode(data: &[u8], chunk: usize, out_cap: usize, cfg: &EncoderConfig) -> Vec<u8> {
    let mut stream = Stream::new();
    stream.init_encoder(cfg).expect("init");
    let mut encoded = Vec::new();
    let mut out = vec![0u8; out_cap];
    let mut pos = 0usize;
    loop {
        let end = (pos + chunk).min(data.len());
        let action = if end == data.len() {
            Action::Finish
        } else {
            Action::Run
        };
        let r = stream
            .process(&data[pos..end], &mut out, action)
            .expect("process");
        pos += r.consumed;
        encoded.extend_from_slice(&out[..r.produced]);
        if r.status == Status::StreamEnded {
            break;
        }
    }
    assert_eq!(pos, data.len());
    encoded
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: chunked encoding matches one-shot encoding
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_chunked_encode_equals_oneshot() {
    let data = sample(10_000);
    let oneshot = encode_bytes(&data, &EncoderConfig::default()).expect("oneshot");
    for (chunk, out_cap) in [(1, 4096), (7, 3), (1024, 1), (10_000, 4096)] {
        let chunked = chunked_encode(&data, chunk, out_cap, &EncoderConfig::default());
        assert_eq!(
            chunked, oneshot,
            "chunk {chunk} / out_cap {out_cap} must match one-shot"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: multi-block streams round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_multi_block_round_trip() {
    // A 4 KiB dictionary clamps to the 64 KiB block floor, so 300 KB of
    // input spans several blocks.
    let cfg = EncoderConfig {
        dict_size: 1 << 12,
        ..EncoderConfig::default()
    };
    let data = sample(300_000);
    let encoded = chunked_encode(&data, 50_000, 8192, &cfg);
    let decoded = decode_bytes(&encoded, &DecoderConfig::default()).expect("decode");
    assert_eq!(decoded, data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: zero output capacity never produces bytes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_zero_output_capacity() {
    let mut stream = Stream::new();
    stream
        .init_encoder(&EncoderConfig::default())
        .expect("init");
    let mut empty_out = [0u8; 0];
    let r = stream
        .process(b"hello world", &mut empty_out, Action::Finish)
        .expect("process");
    assert_eq!(r.produced, 0);
    assert_eq!(
        r.status,
        Status::OutputReady,
        "caller must be told to supply output space"
    );

    // The staged output is recoverable in full afterwards.
    let mut out = vec![0u8; 256];
    let r2 = stream.process(&[], &mut out, Action::Finish).expect("process");
    assert_eq!(r2.status, Status::StreamEnded);
    let decoded = decode_bytes(&out[..r2.produced], &DecoderConfig::default()).expect("decode");
    assert_eq!(&decoded[..], b"hello world");
}

#[test]
fn test_zero_output_capacity_decoder() {
    let encoded = encode_bytes(b"hello world", &EncoderConfig::default()).expect("encode");
    let mut stream = Stream::new();
    stream
        .init_decoder(&DecoderConfig::default())
        .expect("init");
    let mut empty_out = [0u8; 0];
    let r = stream
        .process(&encoded, &mut empty_out, Action::Run)
        .expect("process");
    assert_eq!(r.produced, 0);
    assert_eq!(r.status, Status::OutputReady);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: counters are monotonic and exact
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_counters_monotonic() {
    let data = sample(50_000);
    let mut stream = Stream::new();
    stream
        .init_encoder(&EncoderConfig::default())
        .expect("init");

    let mut out = vec![0u8; 777];
    let mut pos = 0usize;
    let mut last_in = 0u64;
    let mut last_out = 0u64;
    loop {
        let end = (pos + 1111).min(data.len());
        let action = if end == data.len() {
            Action::Finish
        } else {
            Action::Run
        };
        let r = stream
            .process(&data[pos..end], &mut out, action)
            .expect("process");
        pos += r.consumed;

        let (total_in, total_out) = stream.progress();
        assert!(total_in >= last_in, "total_in must never decrease");
        assert!(total_out >= last_out, "total_out must never decrease");
        last_in = total_in;
        last_out = total_out;

        if r.status == Status::StreamEnded {
            break;
        }
    }
    assert_eq!(stream.total_in(), data.len() as u64);
    assert!(stream.total_out() > 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: concatenated streams
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_concatenated_streams_decode() {
    let mut joined = encode_bytes(b"first ", &EncoderConfig::default()).expect("encode");
    joined.extend(encode_bytes(b"second ", &EncoderConfig::default()).expect("encode"));
    joined.extend(encode_bytes(b"third", &EncoderConfig::default()).expect("encode"));

    let cfg = DecoderConfig {
        concatenated: true,
        ..DecoderConfig::default()
    };
    let decoded = decode_bytes(&joined, &cfg).expect("decode");
    assert_eq!(&decoded[..], b"first second third");
}

#[test]
fn test_non_concatenated_stops_at_first_stream() {
    let mut joined = encode_bytes(b"first", &EncoderConfig::default()).expect("encode");
    let first_len = joined.len();
    joined.extend(encode_bytes(b"second", &EncoderConfig::default()).expect("encode"));

    let mut stream = Stream::new();
    stream
        .init_decoder(&DecoderConfig::default())
        .expect("init");
    let mut out = vec![0u8; 64];
    let r = stream
        .process(&joined, &mut out, Action::Run)
        .expect("process");
    assert_eq!(r.status, Status::StreamEnded);
    assert_eq!(r.consumed, first_len, "must stop at the stream boundary");
    assert_eq!(&out[..r.produced], b"first");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: interleaved grow/shrink buffer sizes on decode
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_decode_with_varying_buffers() {
    let data = sample(40_000);
    let encoded = encode_bytes(&data, &EncoderConfig::default()).expect("encode");

    let mut stream = Stream::new();
    stream
        .init_decoder(&DecoderConfig::default())
        .expect("init");

    let sizes = [1usize, 13, 1, 4096, 3, 257, 65_536];
    let mut decoded = Vec::new();
    let mut pos = 0usize;
    let mut i = 0usize;
    loop {
        let in_chunk = sizes[i % sizes.len()];
        let out_chunk = sizes[(i + 3) % sizes.len()];
        i += 1;
        let end = (pos + in_chunk).min(encoded.len());
        let mut out = vec![0u8; out_chunk];
        let action = if end == encoded.len() {
            Action::Finish
        } else {
            Action::Run
        };
        let r = stream
            .process(&encoded[pos..end], &mut out, action)
            .expect("process");
        pos += r.consumed;
        decoded.extend_from_slice(&out[..r.produced]);
        if r.status == Status::StreamEnded {
            break;
        }
    }
    assert_eq!(decoded, data);
}
