//! Request types: submit a packet, then wait for its completion.
//!
//! Both paths share registration, decoding and error mapping; they differ
//! only in how the caller is resumed.

pub mod asynchronous;
pub mod blocking;

pub use asynchronous::AsyncRequest;
pub use blocking::BlockingRequest;

use crate::domain::decoder::Record;
use crate::domain::error::RequestError;
use crate::domain::pending::Outcome;

/// Decoded reply to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<R> {
    /// Engine timestamp of the reply.
    pub timestamp: u64,
    /// Result records in buffer order.
    pub records: Vec<R>,
}

pub(crate) fn into_reply<R: Record>(outcome: Outcome) -> Result<Reply<R>, RequestError> {
    outcome.map(|completed| Reply {
        timestamp: completed.timestamp,
        records: completed.batch.records::<R>(),
    })
}

pub(crate) fn encode_events<E: Record>(events: &[E]) -> Vec<u8> {
    bytemuck::cast_slice::<E, u8>(events).to_vec()
}
