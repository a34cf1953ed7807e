//! # Fakertc-Audio-Core: Fake Audio Devices and Streams
//!
//! Memory-backed stand-ins for an audio backend, so applications can be
//! tested without audio hardware:
//!
//! - **Device catalog** ([`device`]): a registry of fake endpoints grouped
//!   under host APIs, with the first-capable-device-wins default inference a
//!   real driver layer performs.
//! - **Waveform synthesis** ([`waveform`]): a deterministic sawtooth signal,
//!   stitchable across start offsets so block-wise replay is byte-identical
//!   to one long synthesis.
//! - **Stream simulation** ([`stream`]): start/stop/close lifecycle and a
//!   synchronous block-replay callback with accurate timing metadata,
//!   terminated by a zero-length sentinel call.
//! - **Harness entry points** ([`harness`]): the `query devices` / `open
//!   stream` surface production-like code calls into, with patchable stream
//!   defaults ([`defaults`]).
//! - **Bridge pipeline** ([`pipeline`]): marshals the synchronous replay
//!   callback onto an async queue and forwards it into the fake realtime
//!   model with size-triggered commits.
//!
//! No real audio driver is touched anywhere; replay happens synchronously on
//! the caller's thread.

pub mod defaults;
pub mod device;
pub mod error;
pub mod harness;
pub mod pipeline;
pub mod stream;
pub mod waveform;

pub use defaults::StreamDefaults;
pub use device::{
    DeviceInfo, DeviceKind, DeviceManager, DeviceOptions, DeviceQuery, DeviceSelector, HostApiInfo,
};
pub use error::{AudioError, AudioResult};
pub use harness::FakeSoundDevice;
pub use pipeline::{audio_sender, queueing_callback, reader_queuer, RawAudio, DEFAULT_COMMIT_SIZE};
pub use stream::{
    AudioCallback, CallbackFlags, FakeInputStream, FakeRawInputStream, FakeStream, SampleFormat,
    StreamConfig, StreamTime, REPLAY_PERIOD, REPLAY_SECONDS,
};
pub use waveform::sawtooth_wave;
