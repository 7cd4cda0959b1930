//! E2E Test Suite 03: Handle lifecycle
//!
//! The teardown-idempotence contract, the mode transition matrix, usage
//! errors from every forbidden state, and descriptor-size introspection.

use xzr::{
    size_of_mt_config_descriptor, size_of_stream_descriptor, Action, DecoderConfig,
    EncoderConfig, Error, ErrorKind, Mode, MtConfig, Status, Stream,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: teardown is idempotent from every state
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_triple_teardown_on_fresh_handle() {
    let mut stream = Stream::new();
    stream.end();
    stream.end();
    stream.end();
    assert_eq!(stream.mode(), Mode::Idle);
    assert_eq!(stream.progress(), (0, 0));
}

#[test]
fn test_triple_teardown_after_active_use() {
    let mut stream = Stream::new();
    stream
        .init_encoder(&EncoderConfig::default())
        .expect("init");
    let mut out = vec![0u8; 64];
    stream.process(b"abc", &mut out, Action::Run).expect("run");

    for _ in 0..3 {
        stream.end();
        assert_eq!(stream.mode(), Mode::Idle);
        assert_eq!(stream.progress(), (0, 0));
    }
}

#[test]
fn test_triple_teardown_after_clean_end() {
    let mut stream = Stream::new();
    stream
        .init_encoder(&EncoderConfig::default())
        .expect("init");
    let mut out = vec![0u8; 64];
    let r = stream.process(&[], &mut out, Action::Finish).expect("finish");
    assert_eq!(r.status, Status::StreamEnded);

    for _ in 0..3 {
        stream.end();
        assert_eq!(stream.mode(), Mode::Idle);
    }
}

#[test]
fn test_triple_teardown_after_failure() {
    let mut stream = Stream::new();
    stream
        .init_decoder(&DecoderConfig::default())
        .expect("init");
    let mut out = vec![0u8; 64];
    stream
        .process(b"garbage that is long enough", &mut out, Action::Run)
        .expect_err("garbage must fail");
    assert_eq!(stream.mode(), Mode::Failed);

    for _ in 0..3 {
        stream.end();
        assert_eq!(stream.mode(), Mode::Idle);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: the mode transition matrix
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_mode_transitions() {
    let mut stream = Stream::new();
    assert_eq!(stream.mode(), Mode::Idle);

    stream
        .init_encoder(&EncoderConfig::default())
        .expect("init");
    assert_eq!(stream.mode(), Mode::Encoding);

    let mut out = vec![0u8; 64];
    let r = stream.process(&[], &mut out, Action::Finish).expect("finish");
    assert_eq!(r.status, Status::StreamEnded);
    assert_eq!(stream.mode(), Mode::Ended);

    stream.end();
    assert_eq!(stream.mode(), Mode::Idle);

    stream
        .init_decoder(&DecoderConfig::default())
        .expect("reinit as decoder");
    assert_eq!(stream.mode(), Mode::Decoding);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: forbidden operations per state
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_usage_errors() {
    let mut out = vec![0u8; 64];

    // Idle: process forbidden, init permitted.
    let mut stream = Stream::new();
    let err = stream.process(b"x", &mut out, Action::Run).unwrap_err();
    assert_eq!(err, Error::NotInitialized);
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(stream.mode(), Mode::Idle, "usage errors do not poison");

    // Active: re-init forbidden.
    stream
        .init_encoder(&EncoderConfig::default())
        .expect("init");
    assert_eq!(
        stream.init_decoder(&DecoderConfig::default()).unwrap_err(),
        Error::AlreadyInitialized
    );

    // Ended: process forbidden.
    let r = stream.process(&[], &mut out, Action::Finish).expect("finish");
    assert_eq!(r.status, Status::StreamEnded);
    assert_eq!(
        stream.process(&[], &mut out, Action::Run).unwrap_err(),
        Error::HandleEnded
    );

    // Failed: process forbidden until teardown.
    let mut bad = Stream::new();
    bad.init_decoder(&DecoderConfig::default()).expect("init");
    bad.process(b"definitely not a stream", &mut out, Action::Run)
        .expect_err("garbage must fail");
    assert_eq!(
        bad.process(&[], &mut out, Action::Run).unwrap_err(),
        Error::HandleFailed
    );
    bad.end();
    bad.init_encoder(&EncoderConfig::default())
        .expect("reusable after teardown");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: teardown mid-stream preserves already-written output
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_teardown_aborts_mid_stream() {
    let mut stream = Stream::new();
    stream
        .init_encoder(&EncoderConfig::default())
        .expect("init");
    let mut out = vec![0u8; 4];
    let r = stream
        .process(b"some partial data", &mut out, Action::Finish)
        .expect("process");
    // Output written so far stays valid in the caller's buffer.
    assert!(r.produced <= out.len());
    stream.end();
    assert_eq!(stream.mode(), Mode::Idle);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: descriptor-size introspection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_descriptor_sizes() {
    assert_eq!(
        size_of_stream_descriptor(),
        core::mem::size_of::<Stream>()
    );
    assert_eq!(
        size_of_mt_config_descriptor(),
        core::mem::size_of::<MtConfig>()
    );
    assert!(size_of_stream_descriptor() > 0);
    assert!(size_of_mt_config_descriptor() > 0);
}
