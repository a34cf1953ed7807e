//! Fake device registry.
//!
//! Mirrors the catalog a PortAudio-style backend exposes: a flat list of
//! devices, a list of host APIs that index into it, and mutable default
//! pointers for the preferred input and output device. Registration order
//! decides the defaults: the first device capable of a direction wins and
//! later registrations never displace it.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AudioError, AudioResult};

/// Direction a device query can filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Input,
    Output,
}

impl FromStr for DeviceKind {
    type Err = AudioError;

    fn from_str(s: &str) -> AudioResult<Self> {
        match s {
            "input" => Ok(DeviceKind::Input),
            "output" => Ok(DeviceKind::Output),
            other => Err(AudioError::invalid_argument(format!(
                "Invalid kind: {other:?}"
            ))),
        }
    }
}

/// How a caller names a device: by catalog index or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceSelector {
    Index(usize),
    Name(String),
}

impl From<usize> for DeviceSelector {
    fn from(index: usize) -> Self {
        DeviceSelector::Index(index)
    }
}

impl From<&str> for DeviceSelector {
    fn from(name: &str) -> Self {
        DeviceSelector::Name(name.to_string())
    }
}

impl From<String> for DeviceSelector {
    fn from(name: String) -> Self {
        DeviceSelector::Name(name)
    }
}

/// Capability and latency figures supplied when registering a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceOptions {
    pub max_input_channels: u16,
    pub max_output_channels: u16,
    pub default_low_input_latency: f64,
    pub default_low_output_latency: f64,
    pub default_high_input_latency: f64,
    pub default_high_output_latency: f64,
    pub default_samplerate: f64,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            max_input_channels: 0,
            max_output_channels: 0,
            default_low_input_latency: 0.05,
            default_low_output_latency: 0.01,
            default_high_input_latency: 0.06,
            default_high_output_latency: 0.02,
            default_samplerate: 48000.0,
        }
    }
}

/// One entry in the device catalog. `index` always equals the entry's
/// position in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub index: usize,
    pub hostapi: usize,
    pub max_input_channels: u16,
    pub max_output_channels: u16,
    pub default_low_input_latency: f64,
    pub default_low_output_latency: f64,
    pub default_high_input_latency: f64,
    pub default_high_output_latency: f64,
    pub default_samplerate: f64,
}

/// One entry in the host API catalog. Default pointers are catalog indices,
/// `-1` while unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostApiInfo {
    pub name: String,
    pub devices: Vec<usize>,
    pub default_input_device: i64,
    pub default_output_device: i64,
}

/// Result shape of a device query.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceQuery {
    One(DeviceInfo),
    All(Vec<DeviceInfo>),
}

impl DeviceQuery {
    /// Unwrap a single-device result. Panics on `All`, test convenience.
    pub fn into_one(self) -> DeviceInfo {
        match self {
            DeviceQuery::One(info) => info,
            DeviceQuery::All(_) => panic!("expected a single device"),
        }
    }

    pub fn into_all(self) -> Vec<DeviceInfo> {
        match self {
            DeviceQuery::One(_) => panic!("expected the full catalog"),
            DeviceQuery::All(infos) => infos,
        }
    }
}

/// The registry itself: devices, host APIs, and the global default pointers.
#[derive(Debug, Clone)]
pub struct DeviceManager {
    devices: Vec<DeviceInfo>,
    hostapis: Vec<HostApiInfo>,
    default_input_device: i64,
    default_output_device: i64,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceManager {
    /// Empty registry with both default pointers unset.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            hostapis: Vec::new(),
            default_input_device: -1,
            default_output_device: -1,
        }
    }

    /// Pre-populated registry used by test setups that do not care about the
    /// exact catalog: one host API with `count` devices cycling through
    /// input-only, output-only, and bidirectional.
    pub fn new_basic(count: usize) -> Self {
        let mut manager = Self::new();
        manager.add_hostapi("Test hostapi");
        for i in 0..count {
            let channels = (i / 3 + 1) as u16;
            let (name, input, output) = match i % 3 {
                0 => (format!("Input device {i}"), channels, 0),
                1 => (format!("Output device {i}"), 0, channels),
                _ => (format!("Input/Output device {i}"), channels, channels),
            };
            manager
                .add_device(
                    &name,
                    0,
                    DeviceOptions {
                        max_input_channels: input,
                        max_output_channels: output,
                        ..DeviceOptions::default()
                    },
                )
                .expect("basic catalog is well formed");
        }
        manager
    }

    /// Register a host API and return its index.
    pub fn add_hostapi(&mut self, name: &str) -> usize {
        self.hostapis.push(HostApiInfo {
            name: name.to_string(),
            devices: Vec::new(),
            default_input_device: -1,
            default_output_device: -1,
        });
        self.hostapis.len() - 1
    }

    /// Register a device under an existing host API and return its catalog
    /// index. The first device capable of a direction becomes the default
    /// for that direction, both on the host API and globally.
    pub fn add_device(
        &mut self,
        name: &str,
        hostapi: usize,
        options: DeviceOptions,
    ) -> AudioResult<usize> {
        if hostapi >= self.hostapis.len() {
            return Err(AudioError::HostApiNotFound { index: hostapi });
        }
        if options.max_input_channels == 0 && options.max_output_channels == 0 {
            return Err(AudioError::invalid_config(
                "max_input_channels and max_output_channels cannot both be zero",
            ));
        }

        let index = self.devices.len();
        self.devices.push(DeviceInfo {
            name: name.to_string(),
            index,
            hostapi,
            max_input_channels: options.max_input_channels,
            max_output_channels: options.max_output_channels,
            default_low_input_latency: options.default_low_input_latency,
            default_low_output_latency: options.default_low_output_latency,
            default_high_input_latency: options.default_high_input_latency,
            default_high_output_latency: options.default_high_output_latency,
            default_samplerate: options.default_samplerate,
        });

        let api = &mut self.hostapis[hostapi];
        api.devices.push(index);
        if options.max_input_channels > 0 {
            if api.default_input_device < 0 {
                api.default_input_device = index as i64;
            }
            if self.default_input_device < 0 {
                self.default_input_device = index as i64;
            }
        }
        if options.max_output_channels > 0 {
            if api.default_output_device < 0 {
                api.default_output_device = index as i64;
            }
            if self.default_output_device < 0 {
                self.default_output_device = index as i64;
            }
        }

        Ok(index)
    }

    /// Look up one device by selector, returning an independent copy.
    /// Lookup by name is reserved.
    pub fn lookup_device(&self, selector: impl Into<DeviceSelector>) -> AudioResult<DeviceInfo> {
        match selector.into() {
            DeviceSelector::Index(index) => self
                .devices
                .get(index)
                .cloned()
                .ok_or(AudioError::DeviceNotFound { index: index as i64 }),
            DeviceSelector::Name(_) => Err(AudioError::not_implemented("lookup by name")),
        }
    }

    /// Look up one host API, returning an independent copy.
    pub fn lookup_hostapi(&self, index: usize) -> AudioResult<HostApiInfo> {
        self.hostapis
            .get(index)
            .cloned()
            .ok_or(AudioError::HostApiNotFound { index })
    }

    /// Query the catalog the way the harness front door does.
    ///
    /// With neither argument the full catalog is returned. With only a
    /// device index, that device. With only a kind, the default device for
    /// that direction, failing with the unset pointer value when no capable
    /// device was ever registered. Combining both filters is reserved.
    pub fn query_devices(
        &self,
        device: Option<usize>,
        kind: Option<DeviceKind>,
    ) -> AudioResult<DeviceQuery> {
        match (device, kind) {
            (None, None) => Ok(DeviceQuery::All(self.devices.clone())),
            (Some(_), Some(_)) => {
                Err(AudioError::not_implemented("query by both device and kind"))
            }
            (Some(index), None) => self.lookup_device(index).map(DeviceQuery::One),
            (None, Some(kind)) => {
                let index = match kind {
                    DeviceKind::Input => self.default_input_device,
                    DeviceKind::Output => self.default_output_device,
                };
                if index < 0 {
                    return Err(AudioError::DeviceNotFound { index });
                }
                self.lookup_device(index as usize).map(DeviceQuery::One)
            }
        }
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn hostapi_count(&self) -> usize {
        self.hostapis.len()
    }

    pub fn default_input_device(&self) -> i64 {
        self.default_input_device
    }

    pub fn default_output_device(&self) -> i64 {
        self.default_output_device
    }

    /// Name-to-index map over the catalog, duplicate names keep the last.
    pub fn device_names(&self) -> HashMap<String, usize> {
        self.devices
            .iter()
            .enumerate()
            .map(|(index, info)| (info.name.clone(), index))
            .collect()
    }
}
