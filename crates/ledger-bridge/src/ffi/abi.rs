//! # Boundary ABI
//!
//! Layouts and entry-point signatures shared with the engine's C header.
//! Everything here is `#[repr(C)]` and must stay byte-compatible with it.
//!
//! ```text
//! init(client_out, cluster_id[16], address_ptr, address_len, ctx, completion) -> InitStatus
//! submit(client, packet)                                                      -> ClientStatus
//! deinit(client)
//! completion(ctx, packet, timestamp, result_ptr, result_len)        (engine thread, must not unwind)
//! ```

use std::ffi::{c_char, c_void};
use std::ptr;

/// Opaque session storage owned by the engine.
///
/// The bridge allocates it and keeps it at a fixed address from before
/// `init` until after `deinit` has returned.
#[repr(C)]
#[derive(Debug)]
pub struct RawClient {
    pub opaque: [usize; 4],
}

impl RawClient {
    pub const fn zeroed() -> Self {
        Self { opaque: [0; 4] }
    }
}

/// One unit of submission.
#[repr(C)]
#[derive(Debug)]
pub struct RawPacket {
    /// Carries the correlation tag.
    pub user_data: *mut c_void,
    /// Request body.
    pub data: *mut c_void,
    pub data_size: u32,
    pub user_tag: u16,
    pub operation: u8,
    /// Written by the engine before completion.
    pub status: u8,
    /// Engine scratch space.
    pub opaque: [u8; 64],
}

impl RawPacket {
    pub fn new(user_data: *mut c_void, operation: u8, data: *mut c_void, data_size: u32) -> Self {
        Self {
            user_data,
            data,
            data_size,
            user_tag: 0,
            operation,
            status: 0,
            opaque: [0; 64],
        }
    }
}

impl Default for RawPacket {
    fn default() -> Self {
        Self::new(ptr::null_mut(), 0, ptr::null_mut(), 0)
    }
}

const _: () = assert!(std::mem::size_of::<RawClient>() == 4 * std::mem::size_of::<usize>());
#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<RawPacket>() == 88);

/// Completion callback invoked by the engine on its own threads.
pub type CompletionFn = unsafe extern "C" fn(
    ctx: usize,
    packet: *mut RawPacket,
    timestamp: u64,
    result_ptr: *const u8,
    result_len: u32,
);

pub type InitFn = unsafe extern "C" fn(
    client_out: *mut RawClient,
    cluster_id: *const u8,
    address_ptr: *const c_char,
    address_len: u32,
    completion_ctx: usize,
    completion_fn: CompletionFn,
) -> u32;

pub type SubmitFn = unsafe extern "C" fn(client: *mut RawClient, packet: *mut RawPacket) -> u32;

pub type DeinitFn = unsafe extern "C" fn(client: *mut RawClient);

/// The three engine entry points.
///
/// Any implementation must honor the engine contract:
/// - every packet accepted by `submit` is completed exactly once;
/// - completions may run on any thread, in any order;
/// - `deinit` completes or releases all outstanding packets and returns
///   only after the last completion callback has returned.
#[derive(Debug, Clone, Copy)]
pub struct EngineApi {
    /// Short name for logs.
    pub name: &'static str,
    pub init: InitFn,
    pub submit: SubmitFn,
    pub deinit: DeinitFn,
}
