//! One-shot in-memory helpers over the streaming engine.
//!
//! Both helpers drive a private handle through a fixed-size buffer loop, the
//! same way an embedding application would, rather than special-casing a
//! buffer-to-buffer path in the engine.

use crate::stream::types::{Action, DecoderConfig, EncoderConfig, Error, Status};
use crate::stream::Stream;

/// Working buffer for the drive loop.
const CODE_BUFSIZE: usize = 4096;

fn drive_to_end(stream: &mut Stream, input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; CODE_BUFSIZE];
    let mut pos = 0usize;
    loop {
        let r = stream.process(&input[pos..], &mut buf, Action::Finish)?;
        pos += r.consumed;
        out.extend_from_slice(&buf[..r.produced]);
        if r.status == Status::StreamEnded {
            return Ok(out);
        }
    }
}

/// Compress `data` in memory.
pub fn encode_bytes(data: &[u8], cfg: &EncoderConfig) -> Result<Vec<u8>, Error> {
    let mut stream = Stream::new();
    stream.init_encoder(cfg)?;
    drive_to_end(&mut stream, data)
}

/// Decompress `data` in memory.
pub fn decode_bytes(data: &[u8], cfg: &DecoderConfig) -> Result<Vec<u8>, Error> {
    let mut stream = Stream::new();
    stream.init_decoder(cfg)?;
    drive_to_end(&mut stream, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_law() {
        for data in [
            &b""[..],
            b"a",
            b"hello world",
            b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        ] {
            let encoded = encode_bytes(data, &EncoderConfig::default()).expect("encode");
            let decoded = decode_bytes(&encoded, &DecoderConfig::default()).expect("decode");
            assert_eq!(&decoded[..], data);
        }
    }

    #[test]
    fn round_trip_spans_many_drive_buffers() {
        // Larger than CODE_BUFSIZE on both sides of the loop.
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();
        let encoded = encode_bytes(&data, &EncoderConfig::default()).expect("encode");
        let decoded = decode_bytes(&encoded, &DecoderConfig::default()).expect("decode");
        assert_eq!(decoded, data);
    }

    #[test]
    fn decode_of_garbage_is_an_error() {
        let err = decode_bytes(b"not an xzr stream", &DecoderConfig::default()).unwrap_err();
        assert_eq!(err, Error::FormatUnknown);
    }
}
