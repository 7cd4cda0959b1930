//! E2E Test Suite 05: I/O engine
//!
//! Writer/reader adapters and the whole-file helpers, exercised against real
//! files in a temporary directory.

use std::fs;
use std::io::{Read, Write};

use tempfile::tempdir;
use xzr::io::{compress_file, decompress_file, set_notification_level, XzrReader, XzrWriter};
use xzr::{DecoderConfig, EncoderConfig};

fn sample(len: usize) -> Vec<u8> {
    b"file engine round trip payload, moderately compressible. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: writer → reader round trip over a real file
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_writer_reader_file_round_trip() {
    set_notification_level(0);
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("payload.xzr");
    let data = sample(500_000);

    let file = fs::File::create(&path).expect("create");
    let mut writer = XzrWriter::new(file, &EncoderConfig::default()).expect("writer");
    // Write in awkward chunk sizes to cross block boundaries mid-call.
    for chunk in data.chunks(37_777) {
        writer.write_all(chunk).expect("write");
    }
    writer.finish().expect("finish");

    let compressed_len = fs::metadata(&path).expect("metadata").len();
    assert!(compressed_len > 0);
    assert!(
        compressed_len < data.len() as u64,
        "compressible payload must shrink on disk"
    );

    let file = fs::File::open(&path).expect("open");
    let mut reader = XzrReader::new(file).expect("reader");
    let mut decoded = Vec::new();
    reader.read_to_end(&mut decoded).expect("read_to_end");
    assert_eq!(decoded, data);

    let (bytes_in, bytes_out) = reader.progress();
    assert_eq!(bytes_in, compressed_len);
    assert_eq!(bytes_out, data.len() as u64);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: whole-file helpers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compress_and_decompress_file() {
    set_notification_level(0);
    let dir = tempdir().expect("tempdir");
    let plain = dir.path().join("input.bin");
    let packed = dir.path().join("input.bin.xzr");
    let unpacked = dir.path().join("output.bin");

    let data = sample(2_500_000); // spans several copy-loop chunks
    fs::write(&plain, &data).expect("write input");

    let (read, written) =
        compress_file(&plain, &packed, &EncoderConfig::default()).expect("compress_file");
    assert_eq!(read, data.len() as u64);
    assert_eq!(written, fs::metadata(&packed).expect("metadata").len());

    let (packed_read, restored) = decompress_file(&packed, &unpacked).expect("decompress_file");
    assert_eq!(packed_read, written);
    assert_eq!(restored, data.len() as u64);
    assert_eq!(fs::read(&unpacked).expect("read output"), data);
}

#[test]
fn test_empty_file_round_trip() {
    set_notification_level(0);
    let dir = tempdir().expect("tempdir");
    let plain = dir.path().join("empty.bin");
    let packed = dir.path().join("empty.bin.xzr");
    let unpacked = dir.path().join("empty.out");

    fs::write(&plain, b"").expect("write input");
    compress_file(&plain, &packed, &EncoderConfig::default()).expect("compress_file");
    assert!(fs::metadata(&packed).expect("metadata").len() > 0);

    let (_, restored) = decompress_file(&packed, &unpacked).expect("decompress_file");
    assert_eq!(restored, 0);
    assert!(fs::read(&unpacked).expect("read output").is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: the reader accepts appended (concatenated) streams
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_reader_handles_appended_streams() {
    set_notification_level(0);
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("appended.xzr");

    // Two independent compression sessions appended to the same file.
    let mut bytes = Vec::new();
    for part in [&b"first part "[..], &b"second part"[..]] {
        let mut writer = XzrWriter::new(Vec::new(), &EncoderConfig::default()).expect("writer");
        writer.write_all(part).expect("write");
        bytes.extend(writer.finish().expect("finish"));
    }
    fs::write(&path, &bytes).expect("write file");

    let file = fs::File::open(&path).expect("open");
    let mut reader = XzrReader::new(file).expect("reader");
    let mut decoded = String::new();
    reader.read_to_string(&mut decoded).expect("read");
    assert_eq!(decoded, "first part second part");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: reader with an explicit single-stream config stops early
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_reader_single_stream_config() {
    let mut writer = XzrWriter::new(Vec::new(), &EncoderConfig::default()).expect("writer");
    writer.write_all(b"only this").expect("write");
    let mut bytes = writer.finish().expect("finish");
    bytes.extend_from_slice(b"trailing junk the reader must not touch");

    let cfg = DecoderConfig::default(); // concatenated: false
    let mut reader = XzrReader::with_config(&bytes[..], &cfg).expect("reader");
    let mut decoded = Vec::new();
    reader.read_to_end(&mut decoded).expect("read_to_end");
    assert_eq!(&decoded[..], b"only this");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: a truncated file surfaces as an I/O error
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_truncated_file_errors() {
    set_notification_level(0);
    let dir = tempdir().expect("tempdir");
    let plain = dir.path().join("in.bin");
    let packed = dir.path().join("in.bin.xzr");

    fs::write(&plain, sample(10_000)).expect("write input");
    compress_file(&plain, &packed, &EncoderConfig::default()).expect("compress_file");

    // Chop the tail off.
    let mut bytes = fs::read(&packed).expect("read");
    bytes.truncate(bytes.len() - 5);
    fs::write(&packed, &bytes).expect("rewrite");

    let out = dir.path().join("out.bin");
    let err = decompress_file(&packed, &out).expect_err("truncated input must fail");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}
