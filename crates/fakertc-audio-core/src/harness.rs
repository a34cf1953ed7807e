//! Front door of the fake audio backend.
//!
//! [`FakeSoundDevice`] bundles a device catalog with a shared set of stream
//! defaults and opens streams from them, mirroring the module-level API of
//! a real audio binding closely enough that pipeline code under test cannot
//! tell the difference.

use std::sync::Arc;

use parking_lot::Mutex;

use fakertc_infra_common::patch::PatchTarget;

use crate::defaults::StreamDefaults;
use crate::device::{DeviceKind, DeviceManager, DeviceQuery};
use crate::error::AudioResult;
use crate::stream::{FakeInputStream, FakeRawInputStream, StreamConfig};

/// A complete fake backend: device catalog plus mutable stream defaults.
pub struct FakeSoundDevice {
    manager: DeviceManager,
    defaults: Arc<Mutex<StreamDefaults>>,
}

impl FakeSoundDevice {
    /// Build a backend over the given catalog, or the basic four-device
    /// catalog when none is supplied.
    pub fn setup(manager: Option<DeviceManager>) -> Self {
        Self {
            manager: manager.unwrap_or_else(|| DeviceManager::new_basic(4)),
            defaults: Arc::new(Mutex::new(StreamDefaults::default())),
        }
    }

    pub fn manager(&self) -> &DeviceManager {
        &self.manager
    }

    /// Query the catalog, parsing the kind filter from its string form.
    pub fn query_devices(
        &self,
        device: Option<usize>,
        kind: Option<&str>,
    ) -> AudioResult<DeviceQuery> {
        let kind = kind.map(str::parse::<DeviceKind>).transpose()?;
        self.manager.query_devices(device, kind)
    }

    /// Snapshot of the current stream defaults.
    pub fn defaults(&self) -> StreamDefaults {
        self.defaults.lock().clone()
    }

    /// The defaults as a patch target, for tests that override them.
    pub fn defaults_target(&self) -> PatchTarget {
        let target: PatchTarget = self.defaults.clone();
        target
    }

    /// Open a typed input stream, filling unset parameters from the
    /// session defaults.
    pub fn input_stream(&self, config: StreamConfig) -> AudioResult<FakeInputStream> {
        FakeInputStream::new(self.fill_config(config))
    }

    /// Open a raw input stream, filling unset parameters the same way.
    pub fn raw_input_stream(&self, config: StreamConfig) -> AudioResult<FakeRawInputStream> {
        FakeRawInputStream::new(self.fill_config(config))
    }

    fn fill_config(&self, mut config: StreamConfig) -> StreamConfig {
        let defaults = self.defaults.lock().clone();
        config.samplerate.get_or_insert(defaults.samplerate);
        config.blocksize.get_or_insert(defaults.blocksize);
        config.device.get_or_insert(defaults.device);
        config.channels.get_or_insert(defaults.channels);
        config.dtype.get_or_insert(defaults.dtype);
        config.latency.get_or_insert(defaults.latency);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use fakertc_infra_common::patch::Patcher;
    use serde_json::json;

    #[test]
    fn test_setup_uses_basic_catalog() {
        let backend = FakeSoundDevice::setup(None);
        assert_eq!(backend.manager().device_count(), 4);
        let info = backend.query_devices(None, Some("input")).unwrap().into_one();
        assert_eq!(info.name, "Input device 0");
    }

    #[test]
    fn test_setup_accepts_custom_catalog() {
        let mut manager = DeviceManager::new();
        manager.add_hostapi("Solo");
        manager
            .add_device(
                "Only mic",
                0,
                crate::device::DeviceOptions {
                    max_input_channels: 1,
                    ..Default::default()
                },
            )
            .unwrap();

        let backend = FakeSoundDevice::setup(Some(manager));
        assert_eq!(backend.manager().device_count(), 1);
    }

    #[test]
    fn test_query_rejects_unknown_kind() {
        let backend = FakeSoundDevice::setup(None);
        let err = backend.query_devices(None, Some("duplex")).unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument { .. }));
    }

    #[test]
    fn test_stream_inherits_defaults() {
        let backend = FakeSoundDevice::setup(None);
        let stream = backend.input_stream(StreamConfig::default()).unwrap();
        assert_eq!(stream.samplerate(), 44100.0);
        assert_eq!(stream.blocksize(), 128);
        assert_eq!(stream.dtype(), "int32");
    }

    #[test]
    fn test_explicit_config_beats_defaults() {
        let backend = FakeSoundDevice::setup(None);
        let stream = backend
            .input_stream(StreamConfig {
                samplerate: Some(24000.0),
                dtype: Some("int16".to_string()),
                ..StreamConfig::default()
            })
            .unwrap();
        assert_eq!(stream.samplerate(), 24000.0);
        assert_eq!(stream.dtype(), "int16");
        assert_eq!(stream.blocksize(), 128);
    }

    #[test]
    fn test_patched_defaults_flow_into_new_streams() {
        let backend = FakeSoundDevice::setup(None);
        let target = backend.defaults_target();

        let mut patcher = Patcher::new();
        patcher.patch(&target, "samplerate", json!(8000.0)).unwrap();
        patcher.patch(&target, "dtype", json!("int16")).unwrap();

        let patched = backend.input_stream(StreamConfig::default()).unwrap();
        assert_eq!(patched.samplerate(), 8000.0);
        assert_eq!(patched.dtype(), "int16");

        patcher.reset().unwrap();
        let restored = backend.input_stream(StreamConfig::default()).unwrap();
        assert_eq!(restored.samplerate(), 44100.0);
        assert_eq!(restored.dtype(), "int32");
    }
}
