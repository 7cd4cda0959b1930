//! E2E Test Suite 04: Error handling
//!
//! Corruption detection across every region of the wire format, truncation
//! semantics under Run vs Finish, configuration validation, resource limits,
//! and the Failed-state contract.

use xzr::stream::header::{
    build_flg, dict_size_code, header_checksum, STREAM_HEADER_SIZE, STREAM_MAGIC,
};
use xzr::{
    decode_bytes, encode_bytes, Action, Check, DecoderConfig, EncoderConfig, Error, ErrorKind,
    Mode, Status, Stream,
};

fn decode_err(encoded: &[u8], cfg: &DecoderConfig) -> Error {
    decode_bytes(encoded, cfg).expect_err("corrupt input must fail")
}

/// A hand-built stream header with arbitrary FLG/BD bytes and a *valid*
/// header checksum, so FLG/BD validation is what trips, not the checksum.
fn raw_header(flg: u8, bd: u8) -> Vec<u8> {
    let mut header = Vec::with_capacity(STREAM_HEADER_SIZE);
    header.extend_from_slice(&STREAM_MAGIC.to_le_bytes());
    header.extend_from_slice(&[flg, bd, header_checksum(flg, bd)]);
    header
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: header corruption
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_magic() {
    assert_eq!(
        decode_err(b"XXXXXXX trailing", &DecoderConfig::default()),
        Error::FormatUnknown
    );
}

#[test]
fn test_header_checksum_mismatch() {
    let mut encoded = encode_bytes(b"payload", &EncoderConfig::default()).expect("encode");
    encoded[6] ^= 0xFF;
    assert_eq!(
        decode_err(&encoded, &DecoderConfig::default()),
        Error::HeaderChecksumInvalid
    );
}

#[test]
fn test_unsupported_version() {
    // FLG version bits 00 with an otherwise valid header.
    let header = raw_header(0x00, dict_size_code(1 << 20));
    assert_eq!(
        decode_err(&header, &DecoderConfig::default()),
        Error::VersionUnsupported
    );
}

#[test]
fn test_reserved_flag_set() {
    let flg = build_flg(Check::Xxh32, false) | 0x20;
    let header = raw_header(flg, dict_size_code(1 << 20));
    assert_eq!(
        decode_err(&header, &DecoderConfig::default()),
        Error::ReservedFlagSet
    );
}

#[test]
fn test_unsupported_check_id() {
    // Check id 3 is reserved.
    let flg = build_flg(Check::Xxh32, false) | (3 << 3);
    let header = raw_header(flg, dict_size_code(1 << 20));
    assert_eq!(
        decode_err(&header, &DecoderConfig::default()),
        Error::CheckUnsupported
    );
}

#[test]
fn test_unsupported_dict_code() {
    // BD code 5 (32-byte dictionary) is below the supported floor.
    let header = raw_header(build_flg(Check::Xxh32, false), 5);
    assert_eq!(
        decode_err(&header, &DecoderConfig::default()),
        Error::DictSizeUnsupported
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: checksum-region corruption is always detected
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_trailer_corruption_every_byte() {
    let encoded = encode_bytes(b"hello world", &EncoderConfig::default()).expect("encode");
    // The content checksum is the final 4 bytes.
    for i in encoded.len() - 4..encoded.len() {
        let mut corrupt = encoded.clone();
        corrupt[i] ^= 0x01;
        assert_eq!(
            decode_err(&corrupt, &DecoderConfig::default()),
            Error::ContentChecksumInvalid,
            "flip at offset {i} must be detected"
        );
    }
}

#[test]
fn test_payload_corruption_detected_by_content_check() {
    let encoded = encode_bytes(b"hello world", &EncoderConfig::default()).expect("encode");
    // Stored-block payload begins after header (7) + block header (4).
    let mut corrupt = encoded.clone();
    corrupt[STREAM_HEADER_SIZE + 4] ^= 0x01;
    assert_eq!(
        decode_err(&corrupt, &DecoderConfig::default()),
        Error::ContentChecksumInvalid
    );
}

#[test]
fn test_payload_corruption_detected_by_block_check() {
    let cfg = EncoderConfig {
        block_checksums: true,
        ..EncoderConfig::default()
    };
    let encoded = encode_bytes(b"hello world", &cfg).expect("encode");
    let mut corrupt = encoded.clone();
    corrupt[STREAM_HEADER_SIZE + 4] ^= 0x01;
    // The per-block checksum fires before the stream trailer is reached.
    assert_eq!(
        decode_err(&corrupt, &DecoderConfig::default()),
        Error::BlockChecksumInvalid
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: structural block corruption
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_oversized_block_rejected() {
    // Valid header (1 MiB dictionary), then a stored block claiming 2 MiB.
    let mut stream_bytes = raw_header(build_flg(Check::None, false), dict_size_code(1 << 20));
    stream_bytes.extend_from_slice(&((2u32 << 20) | 0x8000_0000).to_le_bytes());
    assert_eq!(
        decode_err(&stream_bytes, &DecoderConfig::default()),
        Error::BlockOversized
    );
}

#[test]
fn test_malformed_coded_payload_rejected() {
    // Valid header, then a 1-byte coded block whose token demands a length
    // extension that never arrives.
    let mut stream_bytes = raw_header(build_flg(Check::None, false), dict_size_code(1 << 20));
    stream_bytes.extend_from_slice(&1u32.to_le_bytes());
    stream_bytes.push(0xF0);
    assert_eq!(
        decode_err(&stream_bytes, &DecoderConfig::default()),
        Error::PayloadMalformed
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: truncation semantics
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_truncation_is_soft_without_finish() {
    let encoded = encode_bytes(b"hello world", &EncoderConfig::default()).expect("encode");
    let mut stream = Stream::new();
    stream
        .init_decoder(&DecoderConfig::default())
        .expect("init");
    let mut out = vec![0u8; 64];
    let r = stream
        .process(&encoded[..encoded.len() - 3], &mut out, Action::Run)
        .expect("truncation without finish is not an error");
    assert_eq!(r.status, Status::NeedsMoreInput);

    // Supplying the remainder under Finish completes the stream.
    let r2 = stream
        .process(&encoded[encoded.len() - 3..], &mut out[r.produced..], Action::Finish)
        .expect("resume");
    assert_eq!(r2.status, Status::StreamEnded);
    assert_eq!(&out[..r.produced + r2.produced], b"hello world");
}

#[test]
fn test_truncation_is_hard_under_finish() {
    let encoded = encode_bytes(b"hello world", &EncoderConfig::default()).expect("encode");
    for cut in [3usize, STREAM_HEADER_SIZE + 1, encoded.len() - 1] {
        let err = decode_err(&encoded[..cut], &DecoderConfig::default());
        assert_eq!(err, Error::TruncatedStream, "cut at {cut}");
        assert_eq!(err.kind(), ErrorKind::Data);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: configuration validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_errors_are_synchronous() {
    let mut stream = Stream::new();

    let bad_preset = EncoderConfig {
        preset: 10,
        ..EncoderConfig::default()
    };
    let err = stream.init_encoder(&bad_preset).unwrap_err();
    assert_eq!(err, Error::PresetInvalid);
    assert_eq!(err.kind(), ErrorKind::Config);
    // A rejected configuration fails the handle until teardown.
    assert_eq!(stream.mode(), Mode::Failed);
    stream.end();

    let bad_dict = EncoderConfig {
        dict_size: (1 << 20) + 1,
        ..EncoderConfig::default()
    };
    assert_eq!(
        stream.init_encoder(&bad_dict).unwrap_err(),
        Error::DictSizeInvalid
    );
    stream.end();

    let huge_dict = EncoderConfig {
        dict_size: 1 << 31,
        ..EncoderConfig::default()
    };
    assert_eq!(
        stream.init_encoder(&huge_dict).unwrap_err(),
        Error::DictSizeInvalid
    );
    stream.end();

    stream
        .init_encoder(&EncoderConfig::default())
        .expect("valid config accepted after teardown");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: resource limits
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_memlimit_enforced() {
    let encoded = encode_bytes(b"data", &EncoderConfig::default()).expect("encode");
    let tight = DecoderConfig {
        memlimit: 4096,
        ..DecoderConfig::default()
    };
    let err = decode_err(&encoded, &tight);
    assert_eq!(err, Error::MemLimitExceeded);
    assert_eq!(err.kind(), ErrorKind::Resource);
}

#[test]
fn test_memlimit_failure_poisons_handle() {
    let encoded = encode_bytes(b"data", &EncoderConfig::default()).expect("encode");
    let mut stream = Stream::new();
    stream
        .init_decoder(&DecoderConfig {
            memlimit: 1,
            ..DecoderConfig::default()
        })
        .expect("init");
    let mut out = vec![0u8; 64];
    stream
        .process(&encoded, &mut out, Action::Run)
        .expect_err("memlimit must trip");
    assert_eq!(stream.mode(), Mode::Failed);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 7: skip_checksums suppresses verification, not structure
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_skip_checksums_tolerates_bad_trailer() {
    let data = b"checksum skipping";
    let mut encoded = encode_bytes(data, &EncoderConfig::default()).expect("encode");
    let last = encoded.len() - 1;
    encoded[last] ^= 0xFF;

    let lenient = DecoderConfig {
        skip_checksums: true,
        ..DecoderConfig::default()
    };
    let decoded = decode_bytes(&encoded, &lenient).expect("decode");
    assert_eq!(&decoded[..], data);

    // Structural corruption still fails.
    let mut structural = encode_bytes(data, &EncoderConfig::default()).expect("encode");
    structural[0] ^= 0xFF;
    assert_eq!(decode_err(&structural, &lenient), Error::FormatUnknown);
}
