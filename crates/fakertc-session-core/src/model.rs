//! The fake realtime model engine.
//!
//! Connection lifecycle, session-create/update event synthesis, listener
//! fan-out through a background dispatch loop, and the pending/committed
//! audio buffer protocol.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ModelError, ModelResult};
use crate::events::{ClientEvent, ModelConfig, ModelEvent, Session, TurnDetection};
use crate::idgen::IdGenerator;

/// Instructions applied by the simulated post-connect reconfiguration.
const UPDATED_INSTRUCTIONS: &str =
    "You are a helpful voice assistant. Keep responses short and conversational.";

/// A capability accepting one event at a time, asynchronously.
///
/// Listener identity is `Arc` pointer identity: registering the same `Arc`
/// twice is a no-op, while two `Arc`s wrapping equal values are distinct
/// listeners.
#[async_trait]
pub trait ModelListener: Send + Sync {
    /// Receive one event. Deliveries for a single event run concurrently
    /// across listeners; the next event is not dispatched until all
    /// deliveries for the current one complete.
    async fn on_event(&self, event: ModelEvent);
}

type ListenerSet = Arc<Mutex<Vec<Arc<dyn ModelListener>>>>;

/// State that exists only while connected.
struct Connection {
    queue: mpsc::UnboundedSender<ModelEvent>,
    dispatch: JoinHandle<()>,
}

#[derive(Default)]
struct AudioBuffers {
    pending: BytesMut,
    committed: BytesMut,
}

/// Sole consumer of the event queue. Dropped (with any still-queued events)
/// when the owning connection closes.
async fn dispatch_loop(mut queue: mpsc::UnboundedReceiver<ModelEvent>, listeners: ListenerSet) {
    while let Some(event) = queue.recv().await {
        let snapshot: Vec<Arc<dyn ModelListener>> = listeners.lock().clone();
        join_all(snapshot.iter().map(|listener| listener.on_event(event.clone()))).await;
    }
}

/// Deterministic, in-memory stand-in for a realtime voice-agent backend.
///
/// See the crate-level documentation for the ordering and lifecycle
/// guarantees.
pub struct FakeRealtimeModel {
    listeners: ListenerSet,
    connection: Mutex<Option<Connection>>,
    sessions: Mutex<HashMap<String, Session>>,
    audio: Mutex<AudioBuffers>,
    session_ids: Mutex<IdGenerator>,
    event_ids: Mutex<IdGenerator>,
}

impl FakeRealtimeModel {
    /// Create a disconnected engine with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Vec::new())),
            connection: Mutex::new(None),
            sessions: Mutex::new(HashMap::new()),
            audio: Mutex::new(AudioBuffers::default()),
            session_ids: Mutex::new(IdGenerator::new("sess")),
            event_ids: Mutex::new(IdGenerator::new("event")),
        }
    }

    /// Whether the engine is currently connected.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    /// Registered listeners, in insertion order.
    pub fn listeners(&self) -> Vec<Arc<dyn ModelListener>> {
        self.listeners.lock().clone()
    }

    /// Register a listener. Adding a duplicate is a no-op.
    pub fn add_listener(&self, listener: Arc<dyn ModelListener>) {
        let mut listeners = self.listeners.lock();
        if !listeners.iter().any(|existing| Arc::ptr_eq(existing, &listener)) {
            listeners.push(listener);
        }
    }

    /// Remove a listener. Removing a non-member is a no-op.
    pub fn remove_listener(&self, listener: &Arc<dyn ModelListener>) {
        self.listeners
            .lock()
            .retain(|existing| !Arc::ptr_eq(existing, listener));
    }

    /// Connect the engine.
    ///
    /// Clears residual audio buffers, starts the dispatch loop, creates the
    /// default session, and queues the `session.created` and
    /// `session.updated` events. Both events are already queued (though not
    /// necessarily delivered) when this returns.
    ///
    /// # Errors
    ///
    /// [`ModelError::AlreadyConnected`] if currently connected; the engine
    /// state is unchanged.
    pub async fn connect(&self, config: ModelConfig) -> ModelResult<()> {
        let mut connection = self.connection.lock();
        if connection.is_some() {
            return Err(ModelError::AlreadyConnected);
        }

        {
            let mut audio = self.audio.lock();
            audio.pending.clear();
            audio.committed.clear();
        }

        let (queue, receiver) = mpsc::unbounded_channel();
        let dispatch = tokio::spawn(dispatch_loop(receiver, Arc::clone(&self.listeners)));

        let session_id = self.session_ids.lock().next_id();
        let mut session = Session::from_config(session_id.clone(), &config);
        self.sessions
            .lock()
            .insert(session_id.clone(), session.clone());
        let created = ModelEvent::SessionCreated {
            event_id: self.event_ids.lock().next_id(),
            session: session.clone(),
        };
        let _ = queue.send(created);

        // Simulated negotiated reconfiguration: same session, new event id.
        session.instructions = UPDATED_INSTRUCTIONS.to_string();
        session.turn_detection = Some(TurnDetection::server_vad());
        self.sessions
            .lock()
            .insert(session_id.clone(), session.clone());
        let updated = ModelEvent::SessionUpdated {
            event_id: self.event_ids.lock().next_id(),
            session,
        };
        let _ = queue.send(updated);

        *connection = Some(Connection { queue, dispatch });
        tracing::debug!(session = %session_id, "fake realtime model connected");
        Ok(())
    }

    /// Submit an outbound command.
    ///
    /// [`ClientEvent::InputAudio`] appends to the pending buffer; when its
    /// commit flag is set, the entire pending buffer moves to the committed
    /// buffer.
    ///
    /// # Errors
    ///
    /// [`ModelError::NotConnected`] unless connected;
    /// [`ModelError::NotImplemented`] for every other command kind.
    pub async fn send_event(&self, event: ClientEvent) -> ModelResult<()> {
        if !self.is_connected() {
            return Err(ModelError::NotConnected);
        }
        match event {
            ClientEvent::InputAudio { audio, commit } => {
                let mut buffers = self.audio.lock();
                buffers.pending.extend_from_slice(&audio);
                if commit {
                    let pending = std::mem::take(&mut buffers.pending);
                    buffers.committed.extend_from_slice(&pending);
                }
                Ok(())
            }
            other => Err(ModelError::not_implemented(other.kind())),
        }
    }

    /// Queue an arbitrary pre-built event for delivery.
    ///
    /// # Errors
    ///
    /// [`ModelError::NotConnected`] when disconnected; the event is
    /// rejected, not buffered.
    pub fn return_message(&self, event: ModelEvent) -> ModelResult<()> {
        let connection = self.connection.lock();
        let Some(connection) = connection.as_ref() else {
            return Err(ModelError::NotConnected);
        };
        connection.queue.send(event).map_err(|_| ModelError::NotConnected)
    }

    /// Disconnect the engine. No-op when already disconnected.
    ///
    /// Stops the dispatch loop and waits for it to finish before returning,
    /// so no delivery is in flight afterwards. Still-queued events are
    /// discarded. Listeners stay registered for a later reconnect.
    pub async fn close(&self) {
        let connection = self.connection.lock().take();
        let Some(Connection { queue, dispatch }) = connection else {
            return;
        };

        dispatch.abort();
        // Cancellation is the expected shutdown signal; suppress it.
        let _ = dispatch.await;
        drop(queue);

        self.sessions.lock().clear();
        tracing::debug!("fake realtime model closed");
    }

    /// Copy of the pending (uncommitted) audio buffer.
    pub fn pending_audio(&self) -> Bytes {
        Bytes::copy_from_slice(&self.audio.lock().pending)
    }

    /// Copy of the committed audio buffer.
    pub fn committed_audio(&self) -> Bytes {
        Bytes::copy_from_slice(&self.audio.lock().committed)
    }

    /// Number of live sessions (0 or 1).
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Copy of the stored session with the given id.
    pub fn session(&self, id: &str) -> Option<Session> {
        self.sessions.lock().get(id).cloned()
    }
}

impl Default for FakeRealtimeModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullListener;

    #[async_trait]
    impl ModelListener for NullListener {
        async fn on_event(&self, _event: ModelEvent) {}
    }

    #[tokio::test]
    async fn test_listener_identity_is_pointer_identity() {
        let model = FakeRealtimeModel::new();
        let listener: Arc<dyn ModelListener> = Arc::new(NullListener);
        let twin: Arc<dyn ModelListener> = Arc::new(NullListener);

        model.add_listener(Arc::clone(&listener));
        model.add_listener(Arc::clone(&listener));
        assert_eq!(model.listeners().len(), 1);

        model.add_listener(Arc::clone(&twin));
        assert_eq!(model.listeners().len(), 2);

        model.remove_listener(&listener);
        assert_eq!(model.listeners().len(), 1);
        assert!(Arc::ptr_eq(&model.listeners()[0], &twin));

        // Removing a non-member is a no-op.
        model.remove_listener(&listener);
        assert_eq!(model.listeners().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_twice_fails() {
        let model = FakeRealtimeModel::new();
        model.connect(ModelConfig::default()).await.unwrap();

        let error = model.connect(ModelConfig::default()).await.unwrap_err();
        assert_eq!(error, ModelError::AlreadyConnected);
        assert!(model.is_connected());

        model.close().await;
    }

    #[tokio::test]
    async fn test_send_event_requires_connection() {
        let model = FakeRealtimeModel::new();
        let event = ClientEvent::InputAudio {
            audio: Bytes::from_static(b"block"),
            commit: false,
        };

        assert_eq!(
            model.send_event(event.clone()).await.unwrap_err(),
            ModelError::NotConnected
        );

        model.connect(ModelConfig::default()).await.unwrap();
        model.send_event(event.clone()).await.unwrap();
        model.close().await;

        assert_eq!(
            model.send_event(event).await.unwrap_err(),
            ModelError::NotConnected
        );
    }

    #[tokio::test]
    async fn test_unimplemented_commands() {
        let model = FakeRealtimeModel::new();
        model.connect(ModelConfig::default()).await.unwrap();

        let error = model.send_event(ClientEvent::Interrupt).await.unwrap_err();
        assert_eq!(error, ModelError::not_implemented("interrupt"));

        let error = model
            .send_event(ClientEvent::UserInput {
                text: "hello".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(error, ModelError::not_implemented("user_input"));

        model.close().await;
    }

    #[tokio::test]
    async fn test_audio_commit_boundary() {
        let model = FakeRealtimeModel::new();
        model.connect(ModelConfig::default()).await.unwrap();

        model
            .send_event(ClientEvent::InputAudio {
                audio: Bytes::from_static(b"block1"),
                commit: false,
            })
            .await
            .unwrap();
        assert_eq!(model.pending_audio(), Bytes::from_static(b"block1"));
        assert_eq!(model.committed_audio(), Bytes::new());

        model
            .send_event(ClientEvent::InputAudio {
                audio: Bytes::from_static(b"block2"),
                commit: true,
            })
            .await
            .unwrap();
        assert_eq!(model.pending_audio(), Bytes::new());
        assert_eq!(model.committed_audio(), Bytes::from_static(b"block1block2"));

        model.close().await;
    }

    #[tokio::test]
    async fn test_return_message_requires_connection() {
        let model = FakeRealtimeModel::new();
        let event = ModelEvent::Other(serde_json::json!({"type": "custom"}));

        assert_eq!(
            model.return_message(event.clone()).unwrap_err(),
            ModelError::NotConnected
        );

        model.connect(ModelConfig::default()).await.unwrap();
        model.return_message(event).unwrap();
        model.close().await;
    }

    #[tokio::test]
    async fn test_close_idempotent() {
        let model = FakeRealtimeModel::new();
        model.close().await;
        assert!(!model.is_connected());

        model.connect(ModelConfig::default()).await.unwrap();
        model.close().await;
        model.close().await;
        assert!(!model.is_connected());
        assert_eq!(model.session_count(), 0);
    }
}
