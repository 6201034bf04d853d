//! Result decoding.
//!
//! The engine hands back a raw byte range. A valid range is an exact
//! multiple of the operation's record size. Decoding copies the bytes out of
//! engine-owned memory before the completion callback returns; typed
//! reinterpretation happens later on the caller's side.

use crate::domain::error::ProtocolViolation;
use bytemuck::Pod;
use std::mem::size_of;

/// A fixed-size result or event record.
pub trait Record: Pod + Send + Sync + 'static {}

impl<T: Pod + Send + Sync + 'static> Record for T {}

/// Validated, owned copy of a completion's result bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBatch {
    bytes: Vec<u8>,
    record_size: usize,
}

impl DecodedBatch {
    /// Number of records.
    pub fn len(&self) -> usize {
        if self.record_size == 0 {
            0
        } else {
            self.bytes.len() / self.record_size
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reinterpret as records of type `R`, in buffer order.
    ///
    /// The copy is alignment-safe: engine buffers carry no alignment
    /// guarantee.
    pub fn records<R: Record>(&self) -> Vec<R> {
        debug_assert_eq!(size_of::<R>(), self.record_size);
        if self.bytes.is_empty() {
            return Vec::new();
        }
        bytemuck::pod_collect_to_vec::<u8, R>(self.bytes.as_slice())
    }
}

/// Stateless decoder shared by the blocking and async paths.
pub struct ResultDecoder;

impl ResultDecoder {
    /// Validate and copy `raw` as a sequence of `record_size`-byte records.
    pub fn decode(raw: &[u8], record_size: usize) -> Result<DecodedBatch, ProtocolViolation> {
        if raw.is_empty() {
            return Ok(DecodedBatch {
                bytes: Vec::new(),
                record_size,
            });
        }

        if record_size == 0 || raw.len() % record_size != 0 {
            return Err(ProtocolViolation::MalformedLength {
                len: raw.len(),
                record_size,
            });
        }

        Ok(DecodedBatch {
            bytes: raw.to_vec(),
            record_size,
        })
    }
}
