//! Binding to the engine's `tb_client` library.
//!
//! Compiled only with the `native` feature. Set `TB_CLIENT_LIB_DIR` to the
//! directory holding the library when it is not on the default search path.

use crate::ffi::abi::{CompletionFn, EngineApi, RawClient, RawPacket};
use std::ffi::c_char;

#[link(name = "tb_client")]
extern "C" {
    fn tb_client_init(
        client_out: *mut RawClient,
        cluster_id: *const u8,
        address_ptr: *const c_char,
        address_len: u32,
        completion_ctx: usize,
        completion_fn: CompletionFn,
    ) -> u32;

    fn tb_client_submit(client: *mut RawClient, packet: *mut RawPacket) -> u32;

    fn tb_client_deinit(client: *mut RawClient);
}

/// Native engine entry points.
pub const NATIVE_ENGINE: EngineApi = EngineApi {
    name: "native",
    init: tb_client_init,
    submit: tb_client_submit,
    deinit: tb_client_deinit,
};
