//! # Fakertc-Infra-Common: Shared Test-Harness Infrastructure
//!
//! Cross-cutting utilities used by the fakertc crates:
//!
//! - **Attribute patching**: temporarily replace a named attribute on a
//!   shared target with guaranteed restoration, duplicate protection, and
//!   aggregate error reporting ([`patch`]).
//! - **Byte-queue plumbing**: non-blocking readers over channel-fed byte
//!   chunks, plus queue population/drain helpers for tests ([`queues`]).
//!
//! Nothing here touches hardware or the network; everything is in-memory
//! state intended for deterministic tests.

pub mod patch;
pub mod queues;

pub use patch::{AttrError, AttrTable, Patchable, PatchError, PatchResult, PatchTarget, Patcher};
pub use queues::{BytesReader, QueueReader};
