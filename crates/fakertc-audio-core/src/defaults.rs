//! Mutable session defaults for stream open parameters.
//!
//! Tests reach in and patch these through [`Patchable`] the same way they
//! patch any other attribute table, so every field is exposed as a JSON
//! value keyed by name.

use fakertc_infra_common::patch::{AttrError, Patchable};
use serde_json::{Value, json};

/// Fallback open parameters for streams created without explicit values.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDefaults {
    pub samplerate: f64,
    pub blocksize: usize,
    pub device: usize,
    pub channels: u16,
    pub dtype: String,
    pub latency: f64,
}

impl Default for StreamDefaults {
    fn default() -> Self {
        Self {
            samplerate: 44100.0,
            blocksize: 128,
            device: 0,
            channels: 1,
            dtype: "int32".to_string(),
            latency: 0.1,
        }
    }
}

const ATTR_NAMES: [&str; 6] = [
    "samplerate",
    "blocksize",
    "device",
    "channels",
    "dtype",
    "latency",
];

impl Patchable for StreamDefaults {
    fn attr_names(&self) -> Vec<String> {
        ATTR_NAMES.iter().map(|name| name.to_string()).collect()
    }

    fn get_attr(&self, name: &str) -> Option<Value> {
        match name {
            "samplerate" => Some(json!(self.samplerate)),
            "blocksize" => Some(json!(self.blocksize)),
            "device" => Some(json!(self.device)),
            "channels" => Some(json!(self.channels)),
            "dtype" => Some(json!(self.dtype)),
            "latency" => Some(json!(self.latency)),
            _ => None,
        }
    }

    fn set_attr(&mut self, name: &str, value: Value) -> Result<(), AttrError> {
        match name {
            "samplerate" => {
                self.samplerate = value.as_f64().ok_or(AttrError::InvalidValue)?;
            }
            "blocksize" => {
                self.blocksize = value.as_u64().ok_or(AttrError::InvalidValue)? as usize;
            }
            "device" => {
                self.device = value.as_u64().ok_or(AttrError::InvalidValue)? as usize;
            }
            "channels" => {
                let channels = value.as_u64().ok_or(AttrError::InvalidValue)?;
                self.channels = u16::try_from(channels).map_err(|_| AttrError::InvalidValue)?;
            }
            "dtype" => {
                self.dtype = value
                    .as_str()
                    .ok_or(AttrError::InvalidValue)?
                    .to_string();
            }
            "latency" => {
                self.latency = value.as_f64().ok_or(AttrError::InvalidValue)?;
            }
            _ => return Err(AttrError::Missing),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_values() {
        let defaults = StreamDefaults::default();
        assert_eq!(defaults.samplerate, 44100.0);
        assert_eq!(defaults.blocksize, 128);
        assert_eq!(defaults.device, 0);
        assert_eq!(defaults.channels, 1);
        assert_eq!(defaults.dtype, "int32");
        assert_eq!(defaults.latency, 0.1);
    }

    #[test]
    fn test_attr_round_trip() {
        let mut defaults = StreamDefaults::default();
        defaults.set_attr("samplerate", json!(24000.0)).unwrap();
        defaults.set_attr("dtype", json!("int16")).unwrap();
        assert_eq!(defaults.get_attr("samplerate"), Some(json!(24000.0)));
        assert_eq!(defaults.get_attr("dtype"), Some(json!("int16")));
    }

    #[test]
    fn test_set_rejects_wrong_shape() {
        let mut defaults = StreamDefaults::default();
        assert_eq!(
            defaults.set_attr("blocksize", json!("many")),
            Err(AttrError::InvalidValue)
        );
        assert_eq!(
            defaults.set_attr("channels", json!(70000)),
            Err(AttrError::InvalidValue)
        );
        assert_eq!(defaults.set_attr("volume", json!(11)), Err(AttrError::Missing));
    }

    #[test]
    fn test_attr_names_cover_every_field() {
        let defaults = StreamDefaults::default();
        for name in defaults.attr_names() {
            assert!(defaults.get_attr(&name).is_some(), "missing {name}");
        }
    }
}
