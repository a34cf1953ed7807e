//! # Fakertc-Session-Core: Fake Realtime Model Engine
//!
//! A deterministic, in-memory stand-in for a realtime voice-agent backend.
//! [`FakeRealtimeModel`] fabricates the protocol events a live service would
//! emit (session creation and the negotiated reconfiguration that follows),
//! fans them out to registered listeners through a background dispatch loop,
//! and implements the pending/committed audio buffer protocol used by
//! client-side audio senders.
//!
//! Everything here is ephemeral: no network transport, no audio driver, no
//! persistence. The engine exists so tests can exercise production-like
//! session code quickly and without hardware.
//!
//! ## Ordering guarantees
//!
//! Events are delivered in strict enqueue order. For each event, every
//! listener receives it (concurrently relative to the other listeners)
//! before the next event is dequeued. Closing the engine stops the dispatch
//! loop before returning and discards any still-queued events; they are
//! never replayed on a later connect.

pub mod error;
pub mod events;
pub mod idgen;
pub mod model;

pub use error::{ModelError, ModelResult};
pub use events::{ClientEvent, ModelConfig, ModelEvent, Session, TurnDetection};
pub use idgen::IdGenerator;
pub use model::{FakeRealtimeModel, ModelListener};
