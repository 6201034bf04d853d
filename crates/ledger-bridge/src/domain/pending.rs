//! Pending Request Table - matches engine completions to waiting callers.
//!
//! Flow:
//! 1. The submitting thread builds a [`PendingRequest`] holding the packet
//!    lease and a continuation (blocking slot or async sender)
//! 2. It calls `register()` before the engine sees the packet
//! 3. The completion dispatcher calls `resolve()` on an engine thread,
//!    decodes the result, and calls `fulfil()`
//! 4. The caller wakes up with the outcome
//!
//! Every tag is resolved at most once: a second completion for the same tag
//! finds nothing and is a protocol violation.

use crate::domain::correlation::CorrelationTag;
use crate::domain::decoder::DecodedBatch;
use crate::domain::error::{ProtocolViolation, RequestError};
use crate::domain::packet::PacketLease;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::debug;

/// A successfully completed packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    /// Engine timestamp of the reply.
    pub timestamp: u64,
    pub batch: DecodedBatch,
}

/// What a waiting caller receives.
pub type Outcome = Result<Completed, RequestError>;

/// One-shot rendezvous for a parked thread.
#[derive(Debug, Default)]
pub struct BlockingSlot {
    outcome: Mutex<Option<Outcome>>,
    ready: Condvar,
}

impl BlockingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the outcome and wake the waiter.
    pub fn fulfil(&self, outcome: Outcome) {
        let mut slot = self.outcome.lock();
        *slot = Some(outcome);
        self.ready.notify_one();
    }

    /// Park until an outcome is present. Spurious wake-ups loop back.
    pub fn wait(&self) -> Outcome {
        let mut slot = self.outcome.lock();
        loop {
            if let Some(outcome) = slot.take() {
                return outcome;
            }
            self.ready.wait(&mut slot);
        }
    }

    /// Outcome if already delivered, without blocking.
    pub fn try_take(&self) -> Option<Outcome> {
        self.outcome.lock().take()
    }
}

/// How to resume the caller.
#[derive(Debug)]
pub enum Continuation {
    Blocking(Arc<BlockingSlot>),
    Async(oneshot::Sender<Outcome>),
}

impl Continuation {
    /// Deliver the outcome. Returns false if an async receiver was dropped.
    fn deliver(self, outcome: Outcome) -> bool {
        match self {
            Continuation::Blocking(slot) => {
                slot.fulfil(outcome);
                true
            }
            Continuation::Async(sender) => sender.send(outcome).is_ok(),
        }
    }
}

/// A registered request awaiting its completion.
#[derive(Debug)]
pub struct PendingRequest {
    continuation: Continuation,
    /// Operation code (for logging)
    operation: u8,
    /// Size of one result record
    record_size: usize,
    lease: PacketLease,
    registered_at: Instant,
}

impl PendingRequest {
    pub fn new(
        continuation: Continuation,
        operation: u8,
        record_size: usize,
        lease: PacketLease,
    ) -> Self {
        Self {
            continuation,
            operation,
            record_size,
            lease,
            registered_at: Instant::now(),
        }
    }

    pub fn operation(&self) -> u8 {
        self.operation
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn lease_mut(&mut self) -> &mut PacketLease {
        &mut self.lease
    }
}

/// Statistics for the pending request table
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests completed with an ok status
    pub total_completed: AtomicU64,
    /// Total requests completed with a failure (packet status or shutdown)
    pub total_failed: AtomicU64,
    /// Total requests the engine refused at submit
    pub total_cancelled: AtomicU64,
    /// Total requests still pending when the session shut down
    pub total_drained: AtomicU64,
    /// Total outcomes whose async receiver was already gone
    pub total_abandoned: AtomicU64,
}

/// Point-in-time copy of [`PendingStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub registered: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub drained: u64,
    pub abandoned: u64,
    pub pending: u64,
}

/// Sharded tag → pending request map.
#[derive(Debug, Default)]
pub struct PendingRequestTable {
    pending: DashMap<CorrelationTag, PendingRequest>,
    stats: PendingStats,
}

impl PendingRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request. Must happen before the engine sees its packet.
    pub fn register(
        &self,
        tag: CorrelationTag,
        request: PendingRequest,
    ) -> Result<(), ProtocolViolation> {
        match self.pending.entry(tag) {
            Entry::Occupied(_) => Err(ProtocolViolation::DuplicateTag(tag)),
            Entry::Vacant(slot) => {
                debug!(
                    tag = %tag,
                    operation = request.operation,
                    len = request.lease.body().len(),
                    "Registered pending request"
                );
                slot.insert(request);
                self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        }
    }

    /// Remove the entry for `tag`. Each tag resolves at most once.
    pub fn resolve(&self, tag: CorrelationTag) -> Result<PendingRequest, ProtocolViolation> {
        self.pending
            .remove(&tag)
            .map(|(_, request)| request)
            .ok_or(ProtocolViolation::UnknownTag(tag))
    }

    /// Hand `outcome` to the caller of a resolved request.
    ///
    /// Consumes the request, which ends the packet lease.
    pub fn fulfil(&self, tag: CorrelationTag, request: PendingRequest, outcome: Outcome) {
        let PendingRequest {
            continuation,
            operation,
            registered_at,
            lease,
            ..
        } = request;

        match &outcome {
            Ok(_) => self.stats.total_completed.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.stats.total_failed.fetch_add(1, Ordering::Relaxed),
        };
        let failed = outcome.as_ref().err().copied();

        // Decoded bytes are owned by the outcome; the lease can go first.
        drop(lease);

        if continuation.deliver(outcome) {
            debug!(
                tag = %tag,
                operation = operation,
                error = ?failed,
                elapsed_us = registered_at.elapsed().as_micros() as u64,
                "Completed pending request"
            );
        } else {
            self.stats.total_abandoned.fetch_add(1, Ordering::Relaxed);
            debug!(
                tag = %tag,
                operation = operation,
                "Pending request receiver dropped"
            );
        }
    }

    /// Remove a request the engine refused to take.
    pub fn cancel(&self, tag: CorrelationTag) -> Option<PendingRequest> {
        let removed = self.pending.remove(&tag).map(|(_, request)| request);
        if removed.is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Remove every remaining request.
    pub fn drain(&self) -> Vec<(CorrelationTag, PendingRequest)> {
        let tags: Vec<CorrelationTag> = self.pending.iter().map(|entry| *entry.key()).collect();
        let drained: Vec<_> = tags
            .into_iter()
            .filter_map(|tag| self.pending.remove(&tag))
            .collect();
        self.stats
            .total_drained
            .fetch_add(drained.len() as u64, Ordering::Relaxed);
        drained
    }

    /// Get number of currently pending requests
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a tag is pending
    pub fn is_pending(&self, tag: CorrelationTag) -> bool {
        self.pending.contains_key(&tag)
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            registered: self.stats.total_registered.load(Ordering::Relaxed),
            completed: self.stats.total_completed.load(Ordering::Relaxed),
            failed: self.stats.total_failed.load(Ordering::Relaxed),
            cancelled: self.stats.total_cancelled.load(Ordering::Relaxed),
            drained: self.stats.total_drained.load(Ordering::Relaxed),
            abandoned: self.stats.total_abandoned.load(Ordering::Relaxed),
            pending: self.pending.len() as u64,
        }
    }
}
