//! Streaming deduplication keyed by message id.
//!
//! A single model call can surface as several log lines: streaming partials,
//! one final frame, and a mirrored progress record in the parent log. The
//! buffer turns all of them into exactly one emitted [`UsageRecord`].
//!
//! Later partials replace earlier ones on the assumption that `output_tokens`
//! only grows while a response streams. That ordering is not checked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::parser::ParsedFrame;
use crate::usage::UsageRecord;

/// Marker count above which old markers are swept.
pub const DEFAULT_MARKER_LIMIT: usize = 50_000;

/// Markers this far behind the newest timestamp seen may be swept.
pub const MARKER_RETENTION_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
enum Slot {
    /// Best-known partial for a call still streaming.
    Pending(UsageRecord),
    /// The last partial went out in a flush. Only a final is emitted after this.
    Flushed(i64),
    /// A final frame was emitted; nothing for this id is emitted again.
    Finalized(i64),
}

impl Slot {
    /// Timestamp of a settled marker; `None` while pending.
    const fn marker_ms(&self) -> Option<i64> {
        match self {
            Self::Pending(_) => None,
            Self::Flushed(ts) | Self::Finalized(ts) => Some(*ts),
        }
    }
}

/// Per-message-id dedup state.
#[derive(Debug)]
pub struct DedupBuffer {
    /// One entry per call seen. Settled markers stay until a sweep finds
    /// them older than [`MARKER_RETENTION_MS`]; pending entries always stay.
    slots: HashMap<String, Slot>,
    newest_ms: i64,
    marker_limit: usize,
    sweep_at: usize,
}

impl Default for DedupBuffer {
    fn default() -> Self {
        Self::with_marker_limit(DEFAULT_MARKER_LIMIT)
    }
}

impl DedupBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker_limit(marker_limit: usize) -> Self {
        Self {
            slots: HashMap::new(),
            newest_ms: i64::MIN,
            marker_limit,
            sweep_at: marker_limit,
        }
    }

    /// Feeds one parsed frame, returning the record to emit, if any.
    pub fn offer(&mut self, frame: ParsedFrame) -> Option<UsageRecord> {
        let ParsedFrame {
            message_id,
            stop_reason,
            usage,
        } = frame;
        self.newest_ms = self.newest_ms.max(usage.timestamp);

        let emitted = if stop_reason.is_some() {
            match self
                .slots
                .insert(message_id, Slot::Finalized(usage.timestamp))
            {
                Some(Slot::Finalized(_)) => {
                    tracing::trace!(message_id = %usage.message_id, "duplicate final frame suppressed");
                    None
                }
                Some(Slot::Flushed(_)) => {
                    tracing::debug!(message_id = %usage.message_id, "final frame supersedes flushed partial");
                    Some(usage)
                }
                Some(Slot::Pending(_)) | None => Some(usage),
            }
        } else {
            match self.slots.get_mut(&message_id) {
                Some(Slot::Finalized(_) | Slot::Flushed(_)) => {
                    tracing::trace!(message_id, "partial after final or flush ignored");
                }
                Some(Slot::Pending(pending)) => *pending = usage,
                None => {
                    self.slots.insert(message_id, Slot::Pending(usage));
                }
            }
            None
        };

        if self.slots.len() > self.sweep_at {
            self.sweep();
        }
        emitted
    }

    fn sweep(&mut self) {
        let cutoff = self.newest_ms.saturating_sub(MARKER_RETENTION_MS);
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| slot.marker_ms().is_none_or(|ts| ts >= cutoff));
        self.sweep_at = self.marker_limit.max(self.slots.len().saturating_mul(2));
        tracing::debug!(
            swept = before - self.slots.len(),
            kept = self.slots.len(),
            "old dedup markers swept"
        );
    }

    /// Number of calls still waiting for a final frame.
    pub fn pending_len(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Pending(_)))
            .count()
    }

    /// Number of message ids currently remembered, pending or settled.
    pub fn tracked_len(&self) -> usize {
        self.slots.len()
    }

    /// Emits every buffered partial as a best-effort record.
    ///
    /// A second flush emits nothing. A final that shows up later for a flushed
    /// id is still emitted, with `is_partial` unset, so it can replace the
    /// best-effort record downstream.
    pub fn flush(&mut self) -> Vec<UsageRecord> {
        let mut flushed: Vec<UsageRecord> = self
            .slots
            .values_mut()
            .filter_map(|slot| {
                let Slot::Pending(record) = slot else {
                    return None;
                };
                let mut record = record.clone();
                *slot = Slot::Flushed(record.timestamp);
                record.is_partial = true;
                Some(record)
            })
            .collect();
        flushed.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.message_id.cmp(&b.message_id))
        });
        flushed
    }
}

#[derive(Debug, Default)]
struct Shared {
    buffer: DedupBuffer,
    /// Running tailers feeding this buffer.
    attached: usize,
}

/// A dedup buffer shared between tailer instances.
///
/// Hand the same `SharedDedup` to the primary-log tailer and the sub-task-log
/// tailer so a call mirrored in both is counted once. Tailers attach on start
/// and detach on stop; partials are flushed only when the last one detaches,
/// so stopping one tailer never cuts short a call another is still reading.
#[derive(Debug, Clone, Default)]
pub struct SharedDedup(Arc<Mutex<Shared>>);

impl SharedDedup {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn offer(&self, frame: ParsedFrame) -> Option<UsageRecord> {
        self.lock().buffer.offer(frame)
    }

    /// Flushes regardless of attached tailers.
    pub fn flush(&self) -> Vec<UsageRecord> {
        self.lock().buffer.flush()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().buffer.pending_len()
    }

    pub fn attached(&self) -> usize {
        self.lock().attached
    }

    pub(crate) fn attach(&self) {
        self.lock().attached += 1;
    }

    /// Detaches one tailer, flushing if it was the last.
    pub(crate) fn detach(&self) -> Vec<UsageRecord> {
        let mut shared = self.lock();
        shared.attached = shared.attached.saturating_sub(1);
        if shared.attached == 0 {
            shared.buffer.flush()
        } else {
            tracing::debug!(
                attached = shared.attached,
                pending = shared.buffer.pending_len(),
                "dedup buffer still in use; flush deferred"
            );
            Vec::new()
        }
    }
}
