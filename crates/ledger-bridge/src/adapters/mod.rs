//! Engine implementations of the boundary ABI.

pub mod echo;
#[cfg(feature = "native")]
pub mod native;

use crate::domain::config::EngineMode;
use crate::domain::error::InitializationError;
use crate::ffi::abi::EngineApi;

pub use echo::ECHO_ENGINE;
#[cfg(feature = "native")]
pub use native::NATIVE_ENGINE;

/// Entry points for `mode`.
pub fn engine_for(mode: EngineMode) -> Result<EngineApi, InitializationError> {
    match mode {
        EngineMode::Echo => Ok(ECHO_ENGINE),
        EngineMode::Native => native_engine(),
    }
}

#[cfg(feature = "native")]
fn native_engine() -> Result<EngineApi, InitializationError> {
    Ok(NATIVE_ENGINE)
}

#[cfg(not(feature = "native"))]
fn native_engine() -> Result<EngineApi, InitializationError> {
    Err(InitializationError::EngineUnavailable)
}
