//! Async request: a future resolved from whichever engine thread runs the
//! completion dispatcher.
//!
//! The future does not own the packet. Dropping it early leaves the entry
//! registered until the engine completes the packet; the outcome is then
//! discarded.

use crate::domain::correlation::CorrelationTag;
use crate::domain::decoder::Record;
use crate::domain::error::{RequestError, SubmissionError};
use crate::domain::pending::{Continuation, Outcome};
use crate::request::{encode_events, into_reply, Reply};
use crate::session::ClientHandle;
use ledger_types::Operation;
use std::future::Future;
use std::marker::PhantomData;
use std::mem::size_of;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// A submitted request awaiting its completion.
#[derive(Debug)]
pub struct AsyncRequest<R> {
    tag: CorrelationTag,
    receiver: oneshot::Receiver<Outcome>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> AsyncRequest<R> {
    /// Register and submit `events`; results decode as `R`.
    pub fn submit<E: Record>(
        handle: &ClientHandle,
        operation: Operation,
        events: &[E],
    ) -> Result<Self, SubmissionError> {
        let (sender, receiver) = oneshot::channel();
        let tag = handle.submit(
            operation,
            encode_events(events),
            size_of::<R>(),
            Continuation::Async(sender),
        )?;
        Ok(Self {
            tag,
            receiver,
            _record: PhantomData,
        })
    }

    pub fn tag(&self) -> CorrelationTag {
        self.tag
    }
}

impl<R: Record> Future for AsyncRequest<R> {
    type Output = Result<Reply<R>, RequestError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => Poll::Ready(into_reply(outcome)),
            // Sender dropped without an outcome: the entry was discarded.
            Poll::Ready(Err(_)) => Poll::Ready(Err(RequestError::ClientClosed)),
        }
    }
}
