//! Blocking request: the submitting thread parks until the completion
//! dispatcher fulfils its slot.

use crate::domain::correlation::CorrelationTag;
use crate::domain::decoder::Record;
use crate::domain::error::{RequestError, SubmissionError};
use crate::domain::pending::{BlockingSlot, Continuation};
use crate::request::{encode_events, into_reply, Reply};
use crate::session::ClientHandle;
use ledger_types::Operation;
use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;

/// A submitted request whose caller will block for the result.
#[derive(Debug)]
pub struct BlockingRequest<R> {
    tag: CorrelationTag,
    slot: Arc<BlockingSlot>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> BlockingRequest<R> {
    /// Register and submit `events`; results decode as `R`.
    pub fn submit<E: Record>(
        handle: &ClientHandle,
        operation: Operation,
        events: &[E],
    ) -> Result<Self, SubmissionError> {
        let slot = Arc::new(BlockingSlot::new());
        let tag = handle.submit(
            operation,
            encode_events(events),
            size_of::<R>(),
            Continuation::Blocking(Arc::clone(&slot)),
        )?;
        Ok(Self {
            tag,
            slot,
            _record: PhantomData,
        })
    }

    pub fn tag(&self) -> CorrelationTag {
        self.tag
    }

    /// Park until the engine completes the packet.
    pub fn wait(self) -> Result<Reply<R>, RequestError> {
        into_reply(self.slot.wait())
    }
}
