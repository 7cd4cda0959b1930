//! The stream handle — lifecycle state machine over the encoder and decoder.
//!
//! A handle is created without allocating, initialized into exactly one of
//! the two processing modes, advanced by `process`, and torn down by `end`.
//! The internal context is a tagged union: each lifecycle state carries
//! exactly the data valid for it, so a handle in `Idle` simply has no buffer
//! fields to misuse.
//!
//! `end` is the one operation that can never fail, from any state, any
//! number of times — defensive cleanup paths may call it freely.

use crate::stream::decode::Decoder;
use crate::stream::encode::Encoder;
use crate::stream::types::{
    Action, DecoderConfig, EncoderConfig, Error, ErrorKind, Mode, Processed, Status,
};

enum State {
    Idle,
    Encoding(Box<Encoder>),
    Decoding(Box<Decoder>),
    Ended,
    Failed,
}

/// Streaming compression/decompression handle.
///
/// One handle is operated by at most one logical caller at a time; the
/// `&mut self` receivers make that discipline structural.  There is no
/// internal locking and no internal threading.
pub struct Stream {
    state: State,
    total_in: u64,
    total_out: u64,
}

impl Stream {
    /// Create an idle handle.  Allocates nothing; internal state appears on
    /// the first successful `init_*` call.
    pub fn new() -> Self {
        Stream {
            state: State::Idle,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Current lifecycle mode.
    pub fn mode(&self) -> Mode {
        match self.state {
            State::Idle => Mode::Idle,
            State::Encoding(_) => Mode::Encoding,
            State::Decoding(_) => Mode::Decoding,
            State::Ended => Mode::Ended,
            State::Failed => Mode::Failed,
        }
    }

    /// Total bytes consumed from caller input since initialization.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total bytes written to caller output since initialization.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Running `(total_in, total_out)` pair.
    pub fn progress(&self) -> (u64, u64) {
        (self.total_in, self.total_out)
    }

    /// Initialize for compression.  Valid only from `Idle`; allocates the
    /// encoder context sized per `cfg`.  A rejected configuration moves the
    /// handle to `Failed`; tear down to make it initializable again.
    pub fn init_encoder(&mut self, cfg: &EncoderConfig) -> Result<(), Error> {
        if !matches!(self.state, State::Idle) {
            return Err(Error::AlreadyInitialized);
        }
        match Encoder::new(cfg) {
            Ok(encoder) => {
                self.state = State::Encoding(encoder);
                self.total_in = 0;
                self.total_out = 0;
                Ok(())
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    /// Initialize for decompression.  Valid only from `Idle`.
    pub fn init_decoder(&mut self, cfg: &DecoderConfig) -> Result<(), Error> {
        if !matches!(self.state, State::Idle) {
            return Err(Error::AlreadyInitialized);
        }
        self.state = State::Decoding(Decoder::new(cfg));
        self.total_in = 0;
        self.total_out = 0;
        Ok(())
    }

    /// Advance the stream: consume from `src`, write into `dst`, as far as
    /// either buffer allows.
    ///
    /// Restartable across calls with arbitrary buffer sizes (including
    /// zero); not restartable across a completed stream.  A data or resource
    /// error moves the handle to `Failed` and releases its internal state;
    /// the clean end of the stream moves it to `Ended` likewise.
    pub fn process(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        action: Action,
    ) -> Result<Processed, Error> {
        let result = match &mut self.state {
            State::Idle => return Err(Error::NotInitialized),
            State::Ended => return Err(Error::HandleEnded),
            State::Failed => return Err(Error::HandleFailed),
            State::Encoding(encoder) => encoder.process(src, dst, action),
            State::Decoding(decoder) => decoder.process(src, dst, action),
        };

        match result {
            Ok((consumed, produced, status)) => {
                self.total_in += consumed as u64;
                self.total_out += produced as u64;
                if status == Status::StreamEnded {
                    // Internal state is released on the transition out of the
                    // processing modes; counters stay readable.
                    self.state = State::Ended;
                }
                Ok(Processed {
                    status,
                    consumed,
                    produced,
                })
            }
            Err(err) => {
                if matches!(err.kind(), ErrorKind::Data | ErrorKind::Resource) {
                    self.state = State::Failed;
                }
                Err(err)
            }
        }
    }

    /// Tear the handle down: release internal state and return to `Idle`
    /// with zeroed counters.
    ///
    /// Idempotent and infallible — calling it on a never-initialized,
    /// active, ended, failed, or already-torn-down handle is always a safe
    /// no-op beyond the reset itself.
    pub fn end(&mut self) {
        self.state = State::Idle;
        self.total_in = 0;
        self.total_out = 0;
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handle_is_idle_with_zero_counters() {
        let stream = Stream::new();
        assert_eq!(stream.mode(), Mode::Idle);
        assert_eq!(stream.progress(), (0, 0));
    }

    #[test]
    fn repeated_end_is_a_safe_no_op() {
        let mut stream = Stream::new();
        stream.end();
        stream.end();
        stream.end();
        assert_eq!(stream.mode(), Mode::Idle);
        assert_eq!(stream.progress(), (0, 0));
    }

    #[test]
    fn process_before_init_is_a_usage_error() {
        let mut stream = Stream::new();
        let mut dst = [0u8; 16];
        let err = stream.process(b"x", &mut dst, Action::Run).unwrap_err();
        assert_eq!(err, Error::NotInitialized);
        assert_eq!(err.kind(), ErrorKind::Usage);
        // Usage errors do not poison the handle.
        assert_eq!(stream.mode(), Mode::Idle);
    }

    #[test]
    fn double_init_is_rejected() {
        let mut stream = Stream::new();
        stream.init_encoder(&EncoderConfig::default()).expect("init");
        assert_eq!(
            stream.init_encoder(&EncoderConfig::default()).unwrap_err(),
            Error::AlreadyInitialized
        );
        assert_eq!(
            stream.init_decoder(&DecoderConfig::default()).unwrap_err(),
            Error::AlreadyInitialized
        );
        assert_eq!(stream.mode(), Mode::Encoding);
    }

    #[test]
    fn failed_config_moves_handle_to_failed() {
        let mut stream = Stream::new();
        let cfg = EncoderConfig {
            preset: 99,
            ..EncoderConfig::default()
        };
        assert_eq!(stream.init_encoder(&cfg).unwrap_err(), Error::PresetInvalid);
        assert_eq!(stream.mode(), Mode::Failed);
        let mut dst = [0u8; 16];
        assert_eq!(
            stream.process(&[], &mut dst, Action::Run).unwrap_err(),
            Error::HandleFailed
        );
        // Teardown makes the handle initializable again.
        stream.end();
        stream.init_encoder(&EncoderConfig::default()).expect("init");
    }

    #[test]
    fn ended_handle_rejects_process_until_torn_down() {
        let mut stream = Stream::new();
        stream.init_encoder(&EncoderConfig::default()).expect("init");
        let mut dst = [0u8; 64];
        let r = stream.process(&[], &mut dst, Action::Finish).expect("finish");
        assert_eq!(r.status, Status::StreamEnded);
        assert_eq!(stream.mode(), Mode::Ended);

        assert_eq!(
            stream.process(&[], &mut dst, Action::Run).unwrap_err(),
            Error::HandleEnded
        );

        stream.end();
        assert_eq!(stream.mode(), Mode::Idle);
        stream.init_decoder(&DecoderConfig::default()).expect("reinit");
    }

    #[test]
    fn counters_track_process_calls() {
        let mut stream = Stream::new();
        stream.init_encoder(&EncoderConfig::default()).expect("init");
        let mut dst = [0u8; 256];
        let r1 = stream.process(b"abcdef", &mut dst, Action::Run).expect("run");
        assert_eq!(stream.total_in(), r1.consumed as u64);
        let r2 = stream.process(&[], &mut dst, Action::Finish).expect("finish");
        assert_eq!(stream.total_in(), 6);
        assert_eq!(stream.total_out(), (r1.produced + r2.produced) as u64);
        assert!(stream.total_out() > 0);
    }
}
