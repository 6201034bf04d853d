//! # Completion Dispatcher
//!
//! The single `extern "C"` entry point the engine calls when a packet
//! completes. It runs on engine threads, in any order, concurrently.
//!
//! For each completion, in order:
//! 1. resolve the pending entry by the tag in `packet.user_data`
//! 2. on a non-ok packet status, fail the request with that status
//! 3. otherwise check the result length and copy the records out
//! 4. deliver the outcome to the waiting caller
//!
//! Nothing unwinds across the boundary. A broken engine contract or a panic
//! is logged and the process aborts: continuing would risk handing one
//! caller another caller's result.

use crate::domain::correlation::CorrelationTag;
use crate::domain::decoder::ResultDecoder;
use crate::domain::error::{ProtocolViolation, RequestError};
use crate::domain::packet::PacketState;
use crate::domain::pending::{Completed, PendingRequestTable};
use crate::domain::status::PacketStatus;
use crate::ffi::abi::RawPacket;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::slice;
use std::sync::Arc;
use tracing::error;

/// Completion context shared with the engine for the session's lifetime.
#[derive(Debug)]
pub struct CompletionDispatcher {
    table: Arc<PendingRequestTable>,
}

impl CompletionDispatcher {
    pub fn new(table: Arc<PendingRequestTable>) -> Self {
        Self { table }
    }

    /// Leak an `Arc` as the integer context passed to the engine's `init`.
    pub fn into_context(self: Arc<Self>) -> usize {
        Arc::into_raw(self) as usize
    }

    /// Take back the reference leaked by [`into_context`](Self::into_context).
    ///
    /// # Safety
    ///
    /// `ctx` must come from `into_context` and must not be reclaimed twice.
    /// The engine must no longer invoke the callback with it.
    pub unsafe fn reclaim_context(ctx: usize) -> Arc<Self> {
        Arc::from_raw(ctx as *const Self)
    }

    /// Process one completion.
    ///
    /// # Safety
    ///
    /// `packet`, if non-null, must be a packet previously submitted through
    /// this dispatcher's session. `result_ptr`, if non-null, must be valid
    /// for `result_len` bytes for the duration of the call.
    pub unsafe fn dispatch(
        &self,
        packet: *mut RawPacket,
        timestamp: u64,
        result_ptr: *const u8,
        result_len: u32,
    ) -> Result<(), ProtocolViolation> {
        if packet.is_null() {
            return Err(ProtocolViolation::NullPacket);
        }

        let (tag, status) = {
            let packet = &*packet;
            (
                CorrelationTag::from_user_data(packet.user_data),
                PacketStatus::from_code(packet.status),
            )
        };

        let mut request = self.table.resolve(tag)?;

        if !status.is_ok() {
            request.lease_mut().finish(PacketState::Failed)?;
            self.table
                .fulfil(tag, request, Err(RequestError::PacketFailed(status)));
            return Ok(());
        }

        if result_ptr.is_null() && result_len > 0 {
            return Err(ProtocolViolation::NullResult { len: result_len });
        }
        let raw: &[u8] = if result_len == 0 {
            &[]
        } else {
            slice::from_raw_parts(result_ptr, result_len as usize)
        };

        // The result may point into the lease's own body, so it is copied
        // out before the request (and its lease) is released.
        let batch = ResultDecoder::decode(raw, request.record_size())?;
        request.lease_mut().finish(PacketState::Completed)?;
        self.table
            .fulfil(tag, request, Ok(Completed { timestamp, batch }));
        Ok(())
    }
}

/// Engine completion callback.
///
/// # Safety
///
/// Called by the engine only, with `ctx` from
/// [`CompletionDispatcher::into_context`].
pub unsafe extern "C" fn on_completion(
    ctx: usize,
    packet: *mut RawPacket,
    timestamp: u64,
    result_ptr: *const u8,
    result_len: u32,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        if ctx == 0 {
            return Err(ProtocolViolation::NullContext);
        }
        let dispatcher = &*(ctx as *const CompletionDispatcher);
        dispatcher.dispatch(packet, timestamp, result_ptr, result_len)
    }));

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(violation)) => abort_on_violation(&violation),
        Err(payload) => abort_on_violation(&ProtocolViolation::Panicked(panic_message(&*payload))),
    }
}

/// Log the violation and abort the process.
pub fn abort_on_violation(violation: &ProtocolViolation) -> ! {
    error!(violation = %violation, "protocol violation at engine boundary, aborting");
    eprintln!("ledger-bridge: protocol violation: {violation}");
    std::process::abort()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
