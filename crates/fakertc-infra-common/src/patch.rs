//! Scoped attribute patching with guaranteed restoration.
//!
//! A [`Patcher`] temporarily replaces named attributes on shared targets and
//! restores the originals on [`Patcher::reset`] or when the patcher is
//! dropped. Targets expose their attributes through the [`Patchable`] trait
//! as JSON values, and are identified by the address of the `Arc` that owns
//! them, so the same value patched through two different `Arc`s counts as two
//! targets.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

/// Result type alias for patch operations
pub type PatchResult<T> = std::result::Result<T, PatchError>;

/// Errors surfaced by attribute patching
#[derive(Error, Debug)]
pub enum PatchError {
    /// The attribute does not exist on the target
    #[error("Attribute '{name}' does not exist on target {target:#x}")]
    AttributeNotFound { target: usize, name: String },

    /// The (target, attribute) pair is already tracked
    #[error("Attribute '{name}' on target {target:#x} is already patched")]
    AlreadyPatched { target: usize, name: String },

    /// The target rejected the assignment
    #[error("Attribute '{name}' on target {target:#x} is unsupported")]
    Unsupported { target: usize, name: String },

    /// One or more attributes could not be restored during reset
    #[error("Failed to restore {} patches: {}", failures.len(), failures.join("; "))]
    RestoreFailed { failures: Vec<String> },
}

/// Why a [`Patchable`] target rejected an attribute assignment
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrError {
    /// No attribute with that name
    #[error("attribute missing")]
    Missing,
    /// The attribute exists but cannot be assigned
    #[error("attribute is read-only")]
    ReadOnly,
    /// The value has the wrong shape for this attribute
    #[error("invalid value for attribute")]
    InvalidValue,
}

/// Attribute access over JSON values.
///
/// Implementors decide which names exist and which values they accept;
/// the patcher only reads originals and writes replacements through this
/// interface.
pub trait Patchable {
    /// Names of all attributes on this target, in a stable order.
    fn attr_names(&self) -> Vec<String>;

    /// Current value of the named attribute, or `None` if it does not exist.
    fn get_attr(&self, name: &str) -> Option<Value>;

    /// Assign the named attribute.
    fn set_attr(&mut self, name: &str, value: Value) -> Result<(), AttrError>;

    /// Whether the named attribute exists on this target.
    fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }
}

/// Shared handle to a patchable target.
pub type PatchTarget = Arc<Mutex<dyn Patchable + Send>>;

/// Key identifying one tracked patch: (target identity, attribute name).
pub type PatchKey = (usize, String);

/// Original value recorded for one patched attribute.
#[derive(Debug, Clone)]
struct Patch {
    original: Value,
}

fn target_id(target: &PatchTarget) -> usize {
    Arc::as_ptr(target) as *const () as usize
}

/// Tracks patched attributes and restores them on reset or drop.
pub struct Patcher {
    patches: BTreeMap<PatchKey, Patch>,
    targets: HashMap<usize, PatchTarget>,
}

impl Patcher {
    /// Create a patcher with no tracked patches.
    pub fn new() -> Self {
        Self {
            patches: BTreeMap::new(),
            targets: HashMap::new(),
        }
    }

    /// Sorted (target identity, attribute name) pairs for all tracked patches.
    pub fn patched_objects(&self) -> Vec<PatchKey> {
        self.patches.keys().cloned().collect()
    }

    /// Replace `name` on `target` with `replacement`, recording the original.
    ///
    /// # Errors
    ///
    /// [`PatchError::AttributeNotFound`] if the attribute does not exist,
    /// [`PatchError::AlreadyPatched`] if this (target, name) pair is already
    /// tracked, and [`PatchError::Unsupported`] if the target rejects the
    /// assignment. A failed call records nothing.
    pub fn patch(&mut self, target: &PatchTarget, name: &str, replacement: Value) -> PatchResult<()> {
        let id = target_id(target);
        let key = (id, name.to_string());

        if self.patches.contains_key(&key) {
            return Err(PatchError::AlreadyPatched {
                target: id,
                name: name.to_string(),
            });
        }

        let mut guard = target.lock();
        let Some(original) = guard.get_attr(name) else {
            return Err(PatchError::AttributeNotFound {
                target: id,
                name: name.to_string(),
            });
        };

        match guard.set_attr(name, replacement) {
            Ok(()) => {}
            Err(AttrError::Missing) => {
                return Err(PatchError::AttributeNotFound {
                    target: id,
                    name: name.to_string(),
                });
            }
            Err(AttrError::ReadOnly | AttrError::InvalidValue) => {
                return Err(PatchError::Unsupported {
                    target: id,
                    name: name.to_string(),
                });
            }
        }
        drop(guard);

        self.patches.insert(key, Patch { original });
        self.targets.insert(id, Arc::clone(target));
        Ok(())
    }

    /// Restore every tracked attribute to its original value.
    ///
    /// Each individual restoration failure is logged and collected;
    /// remaining patches still get an attempt. Tracking is cleared regardless
    /// of outcome.
    ///
    /// # Errors
    ///
    /// [`PatchError::RestoreFailed`] listing every failed restoration, if any.
    pub fn reset(&mut self) -> PatchResult<()> {
        let patches = std::mem::take(&mut self.patches);
        let targets = std::mem::take(&mut self.targets);

        let mut failures = Vec::new();
        for ((id, name), patch) in patches {
            let restored = match targets.get(&id) {
                Some(target) => target
                    .lock()
                    .set_attr(&name, patch.original.clone())
                    .map_err(|error| error.to_string()),
                None => Err("target no longer tracked".to_string()),
            };

            if let Err(reason) = restored {
                let message = format!("Failed to restore '{name}' on target {id:#x}: {reason}");
                tracing::error!("{message}");
                failures.push(message);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PatchError::RestoreFailed { failures })
        }
    }
}

impl Default for Patcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Patcher {
    fn drop(&mut self) {
        if !self.patches.is_empty() {
            if let Err(error) = self.reset() {
                tracing::error!("patcher dropped with unrestorable patches: {error}");
            }
        }
    }
}

/// A string-keyed attribute map implementing [`Patchable`].
///
/// Individual attributes can be frozen read-only to exercise restoration
/// failure paths in tests.
#[derive(Debug, Clone, Default)]
pub struct AttrTable {
    values: BTreeMap<String, Value>,
    frozen: std::collections::BTreeSet<String>,
}

impl AttrTable {
    /// Create an empty attribute table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an attribute.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Mark an attribute read-only; later assignments fail.
    pub fn freeze(&mut self, name: impl Into<String>) {
        self.frozen.insert(name.into());
    }

    /// Current value of an attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

impl Patchable for AttrTable {
    fn attr_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn get_attr(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn set_attr(&mut self, name: &str, value: Value) -> Result<(), AttrError> {
        if !self.values.contains_key(name) {
            return Err(AttrError::Missing);
        }
        if self.frozen.contains(name) {
            return Err(AttrError::ReadOnly);
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }
}
