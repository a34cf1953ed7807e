//! Byte-queue plumbing for audio pipelines and tests.
//!
//! Audio arrives from fake capture callbacks as discrete chunks on an
//! unbounded channel; [`QueueReader`] presents those chunks as a flat,
//! non-blocking byte stream with partial-chunk tracking. The populate/drain
//! helpers make it easy to stage and inspect queue contents from tests.

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;

/// A non-blocking source of bytes.
pub trait BytesReader {
    /// Read up to `count` bytes; `None` drains everything currently
    /// available. Returns fewer bytes (possibly none) when the source is
    /// momentarily empty.
    fn read(&mut self, count: Option<usize>) -> Bytes;
}

/// Flattens channel-fed byte chunks into a [`BytesReader`].
///
/// Reads never block: when the channel has no more chunks queued, the reader
/// returns whatever it has accumulated so far. Partially consumed chunks are
/// carried over to the next read.
pub struct QueueReader {
    queue: mpsc::UnboundedReceiver<Bytes>,
    current: Bytes,
    offset: usize,
}

impl QueueReader {
    /// Wrap a channel receiver.
    pub fn new(queue: mpsc::UnboundedReceiver<Bytes>) -> Self {
        Self {
            queue,
            current: Bytes::new(),
            offset: 0,
        }
    }
}

impl BytesReader for QueueReader {
    fn read(&mut self, count: Option<usize>) -> Bytes {
        let mut result = BytesMut::new();
        let mut remaining = count;

        loop {
            if remaining == Some(0) {
                break;
            }
            if self.offset >= self.current.len() {
                self.offset = 0;
                match self.queue.try_recv() {
                    Ok(chunk) => self.current = chunk,
                    Err(_) => {
                        self.current = Bytes::new();
                        break;
                    }
                }
            }

            let available = self.current.len() - self.offset;
            let take = remaining.map_or(available, |left| left.min(available));
            result.extend_from_slice(&self.current[self.offset..self.offset + take]);
            self.offset += take;
            if let Some(left) = remaining.as_mut() {
                *left -= take;
            }
        }

        result.freeze()
    }
}

/// Send `items` into `queue`, stopping early if the receiver is gone.
///
/// Returns the number of items actually queued.
pub fn populate_queue<T>(
    queue: &mpsc::UnboundedSender<T>,
    items: impl IntoIterator<Item = T>,
) -> usize {
    let mut count = 0;
    for item in items {
        if queue.send(item).is_err() {
            break;
        }
        count += 1;
    }
    count
}

/// Build a channel pre-loaded with `items`.
pub fn populated_queue<T>(
    items: impl IntoIterator<Item = T>,
) -> (mpsc::UnboundedSender<T>, mpsc::UnboundedReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    populate_queue(&tx, items);
    (tx, rx)
}

/// Remove and return everything currently queued, without waiting.
pub fn drain_queue<T>(queue: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut result = Vec::new();
    while let Ok(item) = queue.try_recv() {
        result.push(item);
    }
    result
}
