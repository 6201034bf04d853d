//! Status codes reported by the engine across the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of the engine's `init` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStatus {
    Success,
    Unexpected,
    OutOfMemory,
    AddressInvalid,
    AddressLimitExceeded,
    SystemResources,
    NetworkSubsystem,
}

impl InitStatus {
    pub const fn code(self) -> u32 {
        match self {
            InitStatus::Success => 0,
            InitStatus::Unexpected => 1,
            InitStatus::OutOfMemory => 2,
            InitStatus::AddressInvalid => 3,
            InitStatus::AddressLimitExceeded => 4,
            InitStatus::SystemResources => 5,
            InitStatus::NetworkSubsystem => 6,
        }
    }

    /// `None` for codes this client does not know.
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(InitStatus::Success),
            1 => Some(InitStatus::Unexpected),
            2 => Some(InitStatus::OutOfMemory),
            3 => Some(InitStatus::AddressInvalid),
            4 => Some(InitStatus::AddressLimitExceeded),
            5 => Some(InitStatus::SystemResources),
            6 => Some(InitStatus::NetworkSubsystem),
            _ => None,
        }
    }
}

/// Result of the engine's `submit` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientStatus {
    /// The engine accepted the packet and will complete it exactly once.
    Ok,
    /// The session is no longer valid; the packet was not taken.
    Invalid,
}

impl ClientStatus {
    pub const fn code(self) -> u32 {
        match self {
            ClientStatus::Ok => 0,
            ClientStatus::Invalid => 1,
        }
    }

    /// Any non-zero code is treated as a refusal.
    pub const fn from_code(code: u32) -> Self {
        if code == 0 {
            ClientStatus::Ok
        } else {
            ClientStatus::Invalid
        }
    }
}

/// Per-packet status byte written by the engine before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketStatus {
    Ok,
    TooMuchData,
    ClientEvicted,
    ClientReleaseTooLow,
    ClientReleaseTooHigh,
    ClientShutdown,
    InvalidOperation,
    InvalidDataSize,
    /// A status byte this client does not know.
    Unknown(u8),
}

impl PacketStatus {
    pub const fn code(self) -> u8 {
        match self {
            PacketStatus::Ok => 0,
            PacketStatus::TooMuchData => 1,
            PacketStatus::ClientEvicted => 2,
            PacketStatus::ClientReleaseTooLow => 3,
            PacketStatus::ClientReleaseTooHigh => 4,
            PacketStatus::ClientShutdown => 5,
            PacketStatus::InvalidOperation => 6,
            PacketStatus::InvalidDataSize => 7,
            PacketStatus::Unknown(code) => code,
        }
    }

    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => PacketStatus::Ok,
            1 => PacketStatus::TooMuchData,
            2 => PacketStatus::ClientEvicted,
            3 => PacketStatus::ClientReleaseTooLow,
            4 => PacketStatus::ClientReleaseTooHigh,
            5 => PacketStatus::ClientShutdown,
            6 => PacketStatus::InvalidOperation,
            7 => PacketStatus::InvalidDataSize,
            other => PacketStatus::Unknown(other),
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, PacketStatus::Ok)
    }
}

impl fmt::Display for PacketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketStatus::Ok => f.write_str("ok"),
            PacketStatus::TooMuchData => f.write_str("too much data"),
            PacketStatus::ClientEvicted => f.write_str("client evicted"),
            PacketStatus::ClientReleaseTooLow => f.write_str("client release too low"),
            PacketStatus::ClientReleaseTooHigh => f.write_str("client release too high"),
            PacketStatus::ClientShutdown => f.write_str("client shutdown"),
            PacketStatus::InvalidOperation => f.write_str("invalid operation"),
            PacketStatus::InvalidDataSize => f.write_str("invalid data size"),
            PacketStatus::Unknown(code) => write!(f, "unknown status {code}"),
        }
    }
}
