//! # Packet Lifecycle
//!
//! ```text
//! [Created] ──submit──→ [Submitted] ──status ok──→ [Completed]
//!                            │
//!                            └──status != ok──→ [Failed]
//! ```
//!
//! Both terminal states are final. There is no retry edge: a failed packet
//! is reported to its caller, never resubmitted.
//!
//! A [`PacketLease`] owns the packet and its request body for as long as the
//! engine may read them. It lives inside the pending request entry, so the
//! lease ends exactly when the entry is resolved.

use crate::domain::correlation::CorrelationTag;
use crate::domain::error::ProtocolViolation;
use crate::ffi::abi::RawPacket;
use serde::Serialize;
use std::ffi::c_void;
use std::ptr::NonNull;

/// Where a packet is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PacketState {
    Created,
    Submitted,
    Completed,
    Failed,
}

impl PacketState {
    /// Apply a transition, rejecting every edge not in the lifecycle.
    pub fn transition(self, to: PacketState) -> Result<PacketState, ProtocolViolation> {
        use PacketState::*;
        match (self, to) {
            (Created, Submitted) | (Submitted, Completed) | (Submitted, Failed) => Ok(to),
            (from, to) => Err(ProtocolViolation::IllegalTransition { from, to }),
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, PacketState::Completed | PacketState::Failed)
    }
}

/// Owner of one packet and its request body.
///
/// The packet sits at a fixed heap address from construction until drop,
/// and `packet.data` points into `body`, whose heap buffer never moves
/// because the vector is never resized.
pub struct PacketLease {
    packet: NonNull<RawPacket>,
    body: Vec<u8>,
    state: PacketState,
}

// SAFETY: the lease exclusively owns the packet allocation and the body.
// While the engine holds the packet the bridge never touches either; the
// engine reads them from its own threads, which is the point of the lease.
// After completion the lease is only read by whoever resolved its entry.
unsafe impl Send for PacketLease {}
// SAFETY: shared access never mutates through the packet pointer.
unsafe impl Sync for PacketLease {}

impl PacketLease {
    /// Build a packet for `operation` carrying `body`.
    pub fn new(tag: CorrelationTag, operation: u8, body: Vec<u8>) -> Self {
        let data_size = body.len() as u32;
        let data = body.as_ptr() as *mut c_void;
        let packet = Box::new(RawPacket::new(tag.to_user_data(), operation, data, data_size));
        Self {
            packet: NonNull::from(Box::leak(packet)),
            body,
            state: PacketState::Created,
        }
    }

    /// Mark as handed to the engine and return the packet address to pass
    /// to `submit`.
    pub fn submit(&mut self) -> Result<*mut RawPacket, ProtocolViolation> {
        self.state = self.state.transition(PacketState::Submitted)?;
        Ok(self.packet.as_ptr())
    }

    /// Record the packet's terminal state.
    pub fn finish(&mut self, to: PacketState) -> Result<(), ProtocolViolation> {
        self.state = self.state.transition(to)?;
        Ok(())
    }

    pub fn state(&self) -> PacketState {
        self.state
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn packet_ptr(&self) -> *const RawPacket {
        self.packet.as_ptr()
    }
}

impl Drop for PacketLease {
    fn drop(&mut self) {
        // SAFETY: `packet` came from `Box::leak` in `new` and is freed only here.
        unsafe { drop(Box::from_raw(self.packet.as_ptr())) };
    }
}

impl std::fmt::Debug for PacketLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketLease")
            .field("packet", &self.packet)
            .field("body_len", &self.body.len())
            .field("state", &self.state)
            .finish()
    }
}
