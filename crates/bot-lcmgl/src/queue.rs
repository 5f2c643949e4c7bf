//! Hand-off between network threads and the thread that owns the rendering context.
//!
//! Producers submit buffers through a cloneable [`LcmglSubmitter`]; the owning thread calls
//! [`DecodeQueue::drain`] once per frame. Buffers are decoded strictly in arrival order and never
//! interleave. Each channel keeps its own [`LcmglDecoder`], so one producer's textures, lists and
//! errors do not leak into another's. When a buffer fails, whatever it left open on the sink
//! (primitive, stack levels, display list) is closed before the next buffer runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use crate::config::DecoderConfig;
use crate::decoder::LcmglDecoder;
use crate::error::DecodeError;
use crate::sink::GraphicsSink;

/// One received buffer, tagged with the channel it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcmglBuffer {
    pub channel: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("lcmgl decode queue has been dropped")]
pub struct QueueClosed;

/// Sending half of a [`DecodeQueue`]. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct LcmglSubmitter {
    tx: mpsc::Sender<LcmglBuffer>,
    pending: Arc<AtomicUsize>,
}

impl LcmglSubmitter {
    pub fn submit(&self, channel: impl Into<String>, bytes: Vec<u8>) -> Result<(), QueueClosed> {
        // Counted before sending so the receiver never sees more buffers than `pending`.
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.tx
            .send(LcmglBuffer {
                channel: channel.into(),
                bytes,
            })
            .map_err(|_| {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                QueueClosed
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub channel: String,
    pub error: DecodeError,
}

/// Outcome of one [`DecodeQueue::drain`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub decoded: usize,
    pub failures: Vec<ChannelFailure>,
}

impl DrainReport {
    pub fn buffers(&self) -> usize {
        self.decoded + self.failures.len()
    }
}

/// Receiving half, owned by the rendering thread.
#[derive(Debug)]
pub struct DecodeQueue {
    rx: mpsc::Receiver<LcmglBuffer>,
    pending: Arc<AtomicUsize>,
    config: DecoderConfig,
    decoders: BTreeMap<String, LcmglDecoder>,
}

impl DecodeQueue {
    pub fn new(config: DecoderConfig) -> (Self, LcmglSubmitter) {
        let (tx, rx) = mpsc::channel();
        let pending = Arc::new(AtomicUsize::new(0));
        (
            Self {
                rx,
                pending: Arc::clone(&pending),
                config,
                decoders: BTreeMap::new(),
            },
            LcmglSubmitter { tx, pending },
        )
    }

    /// Number of buffers submitted and not yet drained.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Decodes the buffers queued when the call starts against `sink`. Buffers submitted while
    /// draining wait for the next call.
    ///
    /// A failing buffer is logged and reported, and anything it left open on the sink is closed;
    /// the remaining buffers still run.
    pub fn drain<S: GraphicsSink + ?Sized>(&mut self, sink: &mut S) -> DrainReport {
        let mut report = DrainReport::default();
        let batch = self.pending();
        for _ in 0..batch {
            let Ok(buf) = self.rx.try_recv() else {
                break;
            };
            self.pending.fetch_sub(1, Ordering::AcqRel);
            let config = self.config;
            let decoder = self
                .decoders
                .entry(buf.channel.clone())
                .or_insert_with(|| LcmglDecoder::new(config));
            match decoder.decode(&buf.bytes, sink) {
                Ok(_) => report.decoded += 1,
                Err(error) => {
                    tracing::warn!(channel = %buf.channel, "discarding lcmgl buffer: {error}");
                    decoder.close_left_open(sink);
                    report.failures.push(ChannelFailure {
                        channel: buf.channel,
                        error,
                    });
                }
            }
        }
        report
    }

    pub fn decoder(&self, channel: &str) -> Option<&LcmglDecoder> {
        self.decoders.get(channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    /// Frees the resources of one channel and forgets its state.
    pub fn release_channel<S: GraphicsSink + ?Sized>(&mut self, channel: &str, sink: &mut S) -> bool {
        match self.decoders.remove(channel) {
            Some(mut decoder) => {
                decoder.release_all(sink);
                true
            }
            None => false,
        }
    }

    /// Frees every channel's resources (session teardown).
    pub fn release_all<S: GraphicsSink + ?Sized>(&mut self, sink: &mut S) {
        for (_, mut decoder) in std::mem::take(&mut self.decoders) {
            decoder.release_all(sink);
        }
    }
}
