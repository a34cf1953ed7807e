//! Fake capture streams.
//!
//! A raw input stream replays a deterministic sawtooth signal through its
//! callback the moment it is started, synchronously, then reports one final
//! zero-length block so consumers can observe end of capture. There is no
//! real clock: callback timestamps advance by `blocksize / samplerate` per
//! block.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use tracing::debug;

use crate::error::{AudioError, AudioResult};
use crate::waveform::sawtooth_wave;

/// Seconds of signal a started stream replays.
pub const REPLAY_SECONDS: f64 = 2.0;
/// Period argument of the replayed sawtooth.
pub const REPLAY_PERIOD: f64 = 0.1;

/// Sample encoding, named by its dtype string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    Int8,
    Int16,
    Int24,
    #[default]
    Int32,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Int8 => 1,
            SampleFormat::Int16 => 2,
            SampleFormat::Int24 => 3,
            SampleFormat::Int32 => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::Int8 => "int8",
            SampleFormat::Int16 => "int16",
            SampleFormat::Int24 => "int24",
            SampleFormat::Int32 => "int32",
        }
    }
}

impl FromStr for SampleFormat {
    type Err = AudioError;

    fn from_str(s: &str) -> AudioResult<Self> {
        match s {
            "int8" => Ok(SampleFormat::Int8),
            "int16" => Ok(SampleFormat::Int16),
            "int24" => Ok(SampleFormat::Int24),
            "int32" => Ok(SampleFormat::Int32),
            other => Err(AudioError::unsupported_format(other)),
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamps handed to the stream callback with every block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StreamTime {
    pub current_time: f64,
    pub input_adc_time: f64,
    pub output_dac_time: f64,
}

/// Status bits handed to the stream callback. The fake never raises any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallbackFlags(u32);

impl CallbackFlags {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Block handler: raw bytes, frame count, timestamps, status flags.
pub type AudioCallback = Box<dyn FnMut(&[u8], usize, StreamTime, CallbackFlags) + Send>;

/// Open parameters. `None` fields fall back to the session defaults at
/// stream creation.
#[derive(Default)]
pub struct StreamConfig {
    pub samplerate: Option<f64>,
    pub blocksize: Option<usize>,
    pub device: Option<usize>,
    pub channels: Option<u16>,
    pub dtype: Option<String>,
    pub latency: Option<f64>,
    pub callback: Option<AudioCallback>,
}

impl fmt::Debug for StreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConfig")
            .field("samplerate", &self.samplerate)
            .field("blocksize", &self.blocksize)
            .field("device", &self.device)
            .field("channels", &self.channels)
            .field("dtype", &self.dtype)
            .field("latency", &self.latency)
            .field("callback", &self.callback.as_ref().map(|_| "FnMut"))
            .finish()
    }
}

/// State shared by every stream flavor.
pub struct FakeStream {
    samplerate: f64,
    blocksize: usize,
    device: usize,
    channels: u16,
    format: SampleFormat,
    latency: f64,
    callback: Option<AudioCallback>,
    active: bool,
    closed: bool,
}

impl fmt::Debug for FakeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeStream")
            .field("samplerate", &self.samplerate)
            .field("blocksize", &self.blocksize)
            .field("device", &self.device)
            .field("channels", &self.channels)
            .field("format", &self.format)
            .field("latency", &self.latency)
            .field("active", &self.active)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl FakeStream {
    /// Build a stream from open parameters, filling unset fields with the
    /// built-in defaults. Zero counts as unset, like the falsy defaulting a
    /// real binding applies to its open parameters.
    pub fn new(config: StreamConfig) -> AudioResult<Self> {
        let format = match config.dtype.as_deref() {
            Some(dtype) => dtype.parse()?,
            None => SampleFormat::default(),
        };
        Ok(Self {
            samplerate: config.samplerate.filter(|rate| *rate != 0.0).unwrap_or(44100.0),
            blocksize: config.blocksize.filter(|size| *size != 0).unwrap_or(128),
            device: config.device.unwrap_or(0),
            channels: config.channels.filter(|count| *count != 0).unwrap_or(1),
            format,
            latency: config.latency.filter(|latency| *latency != 0.0).unwrap_or(0.1),
            callback: config.callback,
            active: false,
            closed: false,
        })
    }

    pub fn samplerate(&self) -> f64 {
        self.samplerate
    }

    pub fn blocksize(&self) -> usize {
        self.blocksize
    }

    pub fn device(&self) -> usize {
        self.device
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn dtype(&self) -> &'static str {
        self.format.as_str()
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }

    /// Simulated processor load, a constant.
    pub fn cpu_load(&self) -> f64 {
        0.1
    }

    /// The fake has no running clock.
    pub fn time(&self) -> Option<f64> {
        None
    }

    pub fn active(&self) -> bool {
        self.active && !self.closed
    }

    pub fn stopped(&self) -> bool {
        !self.active()
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Mark the stream running. Fails like a dead driver once closed.
    pub fn start(&mut self) -> AudioResult<()> {
        if self.closed {
            return Err(AudioError::driver("Error starting stream pointer", -9988));
        }
        self.active = true;
        debug!(
            samplerate = self.samplerate,
            blocksize = self.blocksize,
            dtype = self.format.as_str(),
            "stream started"
        );
        Ok(())
    }

    /// Stop without closing. Only the error-ignoring flavor is supported;
    /// a stopped stream can be started again.
    pub fn stop(&mut self, ignore_errors: bool) -> AudioResult<()> {
        if !ignore_errors {
            return Err(AudioError::not_implemented("stop with error reporting"));
        }
        self.active = false;
        Ok(())
    }

    /// Close the stream. Only the error-ignoring flavor is supported, and it
    /// is idempotent.
    pub fn close(&mut self, ignore_errors: bool) -> AudioResult<()> {
        if !ignore_errors {
            return Err(AudioError::not_implemented("close with error reporting"));
        }
        self.active = false;
        self.closed = true;
        debug!("stream closed");
        Ok(())
    }
}

/// Input stream delivering raw bytes to its callback.
pub struct FakeRawInputStream {
    stream: FakeStream,
}

impl Deref for FakeRawInputStream {
    type Target = FakeStream;

    fn deref(&self) -> &FakeStream {
        &self.stream
    }
}

impl DerefMut for FakeRawInputStream {
    fn deref_mut(&mut self) -> &mut FakeStream {
        &mut self.stream
    }
}

impl FakeRawInputStream {
    pub fn new(config: StreamConfig) -> AudioResult<Self> {
        Ok(Self {
            stream: FakeStream::new(config)?,
        })
    }

    /// Start the stream and synchronously replay the sawtooth signal
    /// through the callback, block by block, ending with a zero-length
    /// block carrying the next timestamp.
    pub fn start(&mut self) -> AudioResult<()> {
        self.stream.start()?;

        let samplerate = self.stream.samplerate;
        let blocksize = self.stream.blocksize;
        let bytes_per_sample = self.stream.format.bytes_per_sample();
        let Some(callback) = self.stream.callback.as_mut() else {
            return Ok(());
        };

        let signal = sawtooth_wave(REPLAY_PERIOD, REPLAY_SECONDS, samplerate, bytes_per_sample, 0.0);
        let block_bytes = blocksize * bytes_per_sample;
        let block_seconds = blocksize as f64 / samplerate;

        let mut index = 0usize;
        for block in signal.chunks(block_bytes) {
            let time = StreamTime {
                input_adc_time: index as f64 * block_seconds,
                ..StreamTime::default()
            };
            callback(block, blocksize, time, CallbackFlags::empty());
            index += 1;
        }
        // End of capture marker.
        let time = StreamTime {
            input_adc_time: index as f64 * block_seconds,
            ..StreamTime::default()
        };
        callback(&[], 0, time, CallbackFlags::empty());
        debug!(blocks = index, "replayed capture signal");
        Ok(())
    }

    /// Polling reads are reserved, this stream only delivers via callback.
    pub fn read_available(&self) -> AudioResult<usize> {
        Err(AudioError::not_implemented("unbuffered read"))
    }
}

/// Typed-sample flavor of the input stream. It shares the raw stream's
/// lifecycle and reserves the typed read path.
pub struct FakeInputStream {
    raw: FakeRawInputStream,
}

impl Deref for FakeInputStream {
    type Target = FakeRawInputStream;

    fn deref(&self) -> &FakeRawInputStream {
        &self.raw
    }
}

impl DerefMut for FakeInputStream {
    fn deref_mut(&mut self) -> &mut FakeRawInputStream {
        &mut self.raw
    }
}

impl FakeInputStream {
    pub fn new(config: StreamConfig) -> AudioResult<Self> {
        Ok(Self {
            raw: FakeRawInputStream::new(config)?,
        })
    }

    pub fn start(&mut self) -> AudioResult<()> {
        self.raw.start()
    }

    /// Reading typed frames is reserved.
    pub fn read(&mut self, _frames: usize) -> AudioResult<Vec<u8>> {
        Err(AudioError::not_implemented("typed read"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn test_config_defaults() {
        let stream = FakeStream::new(StreamConfig::default()).unwrap();
        assert_eq!(stream.samplerate(), 44100.0);
        assert_eq!(stream.blocksize(), 128);
        assert_eq!(stream.device(), 0);
        assert_eq!(stream.channels(), 1);
        assert_eq!(stream.dtype(), "int32");
        assert_eq!(stream.latency(), 0.1);
        assert_eq!(stream.cpu_load(), 0.1);
        assert_eq!(stream.time(), None);
    }

    #[test]
    fn test_zero_parameters_count_as_unset() {
        let stream = FakeStream::new(StreamConfig {
            samplerate: Some(0.0),
            blocksize: Some(0),
            channels: Some(0),
            latency: Some(0.0),
            ..StreamConfig::default()
        })
        .unwrap();
        assert_eq!(stream.samplerate(), 44100.0);
        assert_eq!(stream.blocksize(), 128);
        assert_eq!(stream.channels(), 1);
        assert_eq!(stream.latency(), 0.1);
    }

    #[test]
    fn test_zero_blocksize_starts_and_replays_at_default() {
        let calls = Arc::new(Mutex::new(0usize));
        let seen = calls.clone();
        let mut stream = FakeRawInputStream::new(StreamConfig {
            samplerate: Some(0.0),
            blocksize: Some(0),
            dtype: Some("int16".to_string()),
            callback: Some(Box::new(move |data, frames, time, _| {
                if !data.is_empty() {
                    assert_eq!(frames, 128);
                }
                assert!(time.input_adc_time.is_finite());
                *seen.lock() += 1;
            })),
            ..StreamConfig::default()
        })
        .unwrap();

        stream.start().unwrap();
        // 88200 samples in 128-frame blocks: 690 data blocks (the last one
        // short) plus the end marker.
        assert_eq!(*calls.lock(), 691);
    }

    #[test]
    fn test_unknown_dtype_rejected() {
        let config = StreamConfig {
            dtype: Some("float32".to_string()),
            ..StreamConfig::default()
        };
        let err = FakeStream::new(config).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported dtype: 'float32'");
    }

    #[test]
    fn test_lifecycle_states() {
        let mut stream = FakeStream::new(StreamConfig::default()).unwrap();
        assert!(!stream.active());
        assert!(stream.stopped());
        assert!(!stream.closed());

        stream.start().unwrap();
        assert!(stream.active());
        assert!(!stream.stopped());

        stream.close(true).unwrap();
        assert!(!stream.active());
        assert!(stream.stopped());
        assert!(stream.closed());
    }

    #[test]
    fn test_start_after_close_is_driver_error() {
        let mut stream = FakeStream::new(StreamConfig::default()).unwrap();
        stream.close(true).unwrap();
        let err = stream.start().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error starting stream pointer [PaErrorCode -9988]"
        );
    }

    #[test]
    fn test_close_is_idempotent_only_when_ignoring_errors() {
        let mut stream = FakeStream::new(StreamConfig::default()).unwrap();
        let err = stream.close(false).unwrap_err();
        assert!(matches!(err, AudioError::NotImplemented { .. }));

        stream.close(true).unwrap();
        stream.close(true).unwrap();
        assert!(stream.closed());
    }

    #[test]
    fn test_stop_and_resume() {
        let mut stream = FakeStream::new(StreamConfig::default()).unwrap();
        stream.start().unwrap();
        assert!(matches!(
            stream.stop(false).unwrap_err(),
            AudioError::NotImplemented { .. }
        ));
        assert!(stream.active());

        stream.stop(true).unwrap();
        stream.stop(true).unwrap();
        assert!(stream.stopped());
        assert!(!stream.closed());

        stream.start().unwrap();
        assert!(stream.active());
    }

    #[test]
    fn test_raw_stream_without_callback_starts_clean() {
        let mut stream = FakeRawInputStream::new(StreamConfig::default()).unwrap();
        stream.start().unwrap();
        assert!(stream.active());
    }

    #[test]
    fn test_read_paths_reserved() {
        let raw = FakeRawInputStream::new(StreamConfig::default()).unwrap();
        assert!(matches!(
            raw.read_available().unwrap_err(),
            AudioError::NotImplemented { .. }
        ));

        let mut typed = FakeInputStream::new(StreamConfig::default()).unwrap();
        assert!(matches!(
            typed.read(128).unwrap_err(),
            AudioError::NotImplemented { .. }
        ));
    }

    #[test]
    fn test_config_debug_hides_callback_body() {
        let config = StreamConfig {
            callback: Some(Box::new(|_, _, _, _| {})),
            ..StreamConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("callback: Some(\"FnMut\")"));
    }
}
