//! Bridging captured audio into the realtime model.
//!
//! The capture side pushes [`RawAudio`] blocks onto an unbounded channel,
//! either from a stream callback or from a byte reader, and
//! [`audio_sender`] drains that channel into the model as input-audio
//! events. The commit decision is cumulative: once the total bytes sent
//! cross the threshold, every block from then on commits.

use bytes::Bytes;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

use fakertc_infra_common::queues::BytesReader;
use fakertc_session_core::events::ClientEvent;
use fakertc_session_core::model::FakeRealtimeModel;
use fakertc_session_core::ModelResult;

use crate::stream::{AudioCallback, CallbackFlags};

/// Byte total after which input audio starts committing.
pub const DEFAULT_COMMIT_SIZE: usize = 1 << 16;

/// One captured block with its frame count and capture timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudio {
    pub buffer: Bytes,
    pub frames: usize,
    pub time: f64,
}

/// Stream callback that forwards every block onto `tx`.
///
/// The zero-length end-of-capture block is not forwarded; dropping the
/// sender is what closes the channel.
pub fn queueing_callback(tx: UnboundedSender<RawAudio>) -> AudioCallback {
    Box::new(move |data, frames, time, _flags: CallbackFlags| {
        if data.is_empty() {
            return;
        }
        let block = RawAudio {
            buffer: Bytes::copy_from_slice(data),
            frames,
            time: time.input_adc_time,
        };
        // Receiver gone means the consumer stopped caring, not an error.
        let _ = tx.send(block);
    })
}

/// Chop a byte reader into fixed blocks and enqueue them as [`RawAudio`].
///
/// Frame counts assume 16-bit mono samples. The running timestamp advances
/// by one block duration per block, matching what a capture stream would
/// report. Stops when the reader runs dry.
pub fn reader_queuer(
    reader: &mut dyn BytesReader,
    tx: &UnboundedSender<RawAudio>,
    block_size: usize,
    samplerate: f64,
) -> usize {
    let mut blocks = 0usize;
    loop {
        let buffer = reader.read(Some(block_size));
        if buffer.is_empty() {
            break;
        }
        let frames = buffer.len() / 2;
        let block = RawAudio {
            buffer,
            frames,
            time: blocks as f64 * block_size as f64 / 2.0 / samplerate,
        };
        if tx.send(block).is_err() {
            break;
        }
        blocks += 1;
    }
    blocks
}

/// Drain captured blocks into the model as input-audio events.
///
/// Runs until every sender for `queue` is dropped. Each block is sent with
/// `commit` set once the cumulative byte count reaches `commit_size`; the
/// count never resets, so commits keep flowing for the rest of the session.
pub async fn audio_sender(
    model: &FakeRealtimeModel,
    mut queue: UnboundedReceiver<RawAudio>,
    commit_size: usize,
) -> ModelResult<()> {
    let mut sent_bytes = 0usize;
    while let Some(block) = queue.recv().await {
        sent_bytes += block.buffer.len();
        let commit = sent_bytes >= commit_size;
        debug!(
            bytes = block.buffer.len(),
            total = sent_bytes,
            commit,
            "forwarding captured audio"
        );
        model
            .send_event(ClientEvent::InputAudio {
                audio: block.buffer,
                commit,
            })
            .await?;
    }
    Ok(())
}
