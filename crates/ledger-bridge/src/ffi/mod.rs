//! Foreign boundary: the engine's C ABI and the completion callback.

pub mod abi;
pub mod dispatcher;

pub use abi::{CompletionFn, EngineApi, RawClient, RawPacket};
pub use dispatcher::{abort_on_violation, on_completion, CompletionDispatcher};
