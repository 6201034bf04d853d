//! # Error Types
//!
//! Caller-facing errors are split by the stage that produces them:
//! configuration, session initialization, submission, and request
//! completion. [`ProtocolViolation`] is different: it is never returned to a
//! caller. It describes a broken engine contract detected inside the
//! completion dispatcher, and the process aborts on it.

use crate::domain::correlation::CorrelationTag;
use crate::domain::packet::PacketState;
use crate::domain::status::PacketStatus;
use thiserror::Error;

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No replica address was given.
    #[error("at least one address is required")]
    NoAddresses,

    /// An address entry is empty or contains a reserved byte.
    #[error("invalid address entry {0:?}")]
    InvalidAddress(String),

    /// More addresses than the engine accepts.
    #[error("too many addresses: {count} given, at most {max} allowed")]
    TooManyAddresses { count: usize, max: usize },

    /// Cluster id could not be parsed.
    #[error("invalid cluster id {0:?}")]
    InvalidClusterId(String),

    /// Engine mode name not recognized.
    #[error("invalid engine mode {0:?} (expected \"native\" or \"echo\")")]
    InvalidMode(String),

    /// Invalid size or count limit.
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

/// Failure to open a session with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitializationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("engine rejected the address list")]
    AddressInvalid,

    #[error("engine address limit exceeded")]
    AddressLimitExceeded,

    #[error("engine out of memory")]
    OutOfMemory,

    #[error("engine could not acquire system resources")]
    SystemResources,

    #[error("engine network subsystem failed")]
    NetworkSubsystem,

    /// The engine reported an unexpected failure, or a status code this
    /// client does not know.
    #[error("unexpected engine init status {0}")]
    Unexpected(u32),

    /// Native mode was requested but the crate was built without the
    /// `native` feature.
    #[error("native engine not available in this build (enable the `native` feature)")]
    EngineUnavailable,
}

/// A request the bridge refused before any engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The session is shut down (or the engine reported it invalid).
    #[error("client is closed")]
    ClientClosed,

    /// The batch exceeds the configured limit.
    #[error("batch of {len} events exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },
}

/// Failure of a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The engine completed the packet with a non-ok status.
    #[error("packet failed: {0}")]
    PacketFailed(PacketStatus),

    /// The session shut down before the engine completed the packet.
    #[error("client closed before the request completed")]
    ClientClosed,
}

/// A broken engine contract observed at the completion boundary.
///
/// The dispatcher aborts the process on any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("completion delivered with a null context")]
    NullContext,

    #[error("completion delivered with a null packet")]
    NullPacket,

    /// No pending request carries this tag: a duplicate or bogus completion.
    #[error("completion for unknown tag {0}")]
    UnknownTag(CorrelationTag),

    /// A tag was registered twice.
    #[error("tag {0} registered twice")]
    DuplicateTag(CorrelationTag),

    #[error("result length {len} is not a multiple of record size {record_size}")]
    MalformedLength { len: usize, record_size: usize },

    #[error("null result pointer with length {len}")]
    NullResult { len: u32 },

    #[error("illegal packet transition {from:?} -> {to:?}")]
    IllegalTransition { from: PacketState, to: PacketState },

    #[error("completion handler panicked: {0}")]
    Panicked(String),
}
