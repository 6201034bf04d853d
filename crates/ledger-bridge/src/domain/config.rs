//! Client configuration with validation.

use crate::domain::error::ConfigError;
use ledger_types::BATCH_EVENTS_MAX;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::CString;
use std::fmt;
use std::str::FromStr;

/// Largest replica set the engine accepts.
pub const ADDRESSES_MAX: usize = 6;

/// Which engine backs the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// The linked `tb_client` engine (requires the `native` feature).
    Native,
    /// Diagnostic engine that returns every request body unchanged.
    #[default]
    Echo,
}

impl FromStr for EngineMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(EngineMode::Native),
            "echo" => Ok(EngineMode::Echo),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineMode::Native => f.write_str("native"),
            EngineMode::Echo => f.write_str("echo"),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cluster the replicas belong to
    pub cluster_id: u128,
    /// Replica addresses, `host:port` or a bare port
    pub addresses: Vec<String>,
    /// Engine backing the session
    pub mode: EngineMode,
    /// Largest batch a single request may carry
    pub max_batch_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cluster_id: 0,
            addresses: vec!["3000".to_string()],
            mode: EngineMode::default(),
            max_batch_size: BATCH_EVENTS_MAX as u32,
        }
    }
}

impl ClientConfig {
    pub fn new(cluster_id: u128, addresses: Vec<String>, mode: EngineMode) -> Self {
        Self {
            cluster_id,
            addresses,
            mode,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LEDGER_CLUSTER_ID`: Cluster id, decimal or `0x` hex (default: 0)
    /// - `LEDGER_ADDRESSES`: Comma-separated replica addresses (default: 3000)
    /// - `LEDGER_MODE`: `native` or `echo` (default: echo)
    /// - `LEDGER_MAX_BATCH_SIZE`: Events per request (default: 8190)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var("LEDGER_CLUSTER_ID") {
            config.cluster_id = parse_cluster_id(&value)?;
        }
        if let Ok(value) = env::var("LEDGER_ADDRESSES") {
            config.addresses = split_addresses(&value);
        }
        if let Ok(value) = env::var("LEDGER_MODE") {
            config.mode = value.parse()?;
        }
        if let Ok(value) = env::var("LEDGER_MAX_BATCH_SIZE") {
            config.max_batch_size = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidLimit(format!("max_batch_size {value:?}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addresses.is_empty() {
            return Err(ConfigError::NoAddresses);
        }

        if self.addresses.len() > ADDRESSES_MAX {
            return Err(ConfigError::TooManyAddresses {
                count: self.addresses.len(),
                max: ADDRESSES_MAX,
            });
        }

        for address in &self.addresses {
            let trimmed = address.trim();
            if trimmed.is_empty() || trimmed.contains(',') || trimmed.contains('\0') {
                return Err(ConfigError::InvalidAddress(address.clone()));
            }
        }

        if self.max_batch_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_batch_size cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// The address list as the engine expects it: comma-joined, UTF-8,
    /// NUL-terminated. Pass `as_bytes().len()` (no terminator) as the length.
    pub fn encoded_addresses(&self) -> Result<CString, ConfigError> {
        let joined = self
            .addresses
            .iter()
            .map(|address| address.trim())
            .collect::<Vec<_>>()
            .join(",");
        CString::new(joined).map_err(|error| {
            ConfigError::InvalidAddress(String::from_utf8_lossy(&error.into_vec()).into_owned())
        })
    }

    /// Cluster id in the engine's 16-byte little-endian form.
    pub fn cluster_id_bytes(&self) -> [u8; 16] {
        self.cluster_id.to_le_bytes()
    }
}

/// Parse a cluster id given in decimal or `0x`-prefixed hex.
pub fn parse_cluster_id(value: &str) -> Result<u128, ConfigError> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| ConfigError::InvalidClusterId(value.to_string()))
}

/// Split a comma-separated address list, dropping surrounding whitespace.
pub fn split_addresses(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|address| address.trim().to_string())
        .collect()
}
