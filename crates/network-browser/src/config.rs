// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Network browser configuration.

use crate::poll::PollConfig;
use crate::registry::RegistryAddresses;
use alloy_primitives::Address;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default idle time after a saved snapshot (3 hours).
pub const DEFAULT_BROWSER_DELAY_SECS: u64 = 10800;

/// Default idle time after a failed iteration.
pub const DEFAULT_POST_ERROR_DELAY_SECS: u64 = 5;

/// Default deadline for one assembly (20 minutes).
pub const DEFAULT_BROWSER_TIMEOUT_SECS: u64 = 1200;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value: {0}")]
    Invalid(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Process configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Primary network RPC endpoint (registry host).
    pub mainnet_rpc_url: String,

    /// Peer network RPC endpoint (connectivity checks).
    pub schain_rpc_url: String,

    /// Name of the peer network this instance runs on.
    pub schain_name: String,

    /// Registry address descriptor (JSON).
    pub manager_abi_path: PathBuf,

    /// Peer network message proxy descriptor (JSON).
    pub schain_proxy_path: PathBuf,

    /// Output snapshot path.
    pub data_path: PathBuf,

    /// Batch registry calls through Multicall3 where available.
    pub multicall: bool,

    /// Keep only sChains connected to the peer network.
    pub connected_only: bool,

    pub browser_delay_secs: u64,

    pub post_error_delay_secs: u64,

    pub browser_timeout_secs: u64,
}

impl BrowserConfig {
    pub fn browser_delay(&self) -> Duration {
        Duration::from_secs(self.browser_delay_secs)
    }

    pub fn post_error_delay(&self) -> Duration {
        Duration::from_secs(self.post_error_delay_secs)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_secs)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            success_delay: self.browser_delay(),
            error_delay: self.post_error_delay(),
            timeout: self.browser_timeout(),
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("MAINNET_RPC_URL", &self.mainnet_rpc_url)?;
        check_url("SCHAIN_RPC_URL", &self.schain_rpc_url)?;
        if self.schain_name.trim().is_empty() {
            return Err(ConfigError::Missing("SCHAIN_NAME"));
        }
        for (name, path) in [
            ("MANAGER_ABI_PATH", &self.manager_abi_path),
            ("SCHAIN_PROXY_PATH", &self.schain_proxy_path),
            ("IMA_NETWORK_BROWSER_DATA_PATH", &self.data_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        if self.browser_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "NETWORK_BROWSER_TIMEOUT cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

fn check_url(name: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::Missing(name));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid(format!(
            "{} must be an http(s) URL, got {:?}",
            name, url
        )));
    }
    Ok(())
}

/// Boolean flag parser: `true` in any case is true, anything else false.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_address(field: &str, value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| ConfigError::Invalid(format!("{}: {}: {:?}", field, e, value)))
}

/// Registry deployment descriptor. Keys other than the addresses (ABIs) are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerDescriptor {
    pub nodes_address: String,
    pub schains_internal_address: String,
}

impl ManagerDescriptor {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }

    pub fn addresses(&self) -> Result<RegistryAddresses, ConfigError> {
        Ok(RegistryAddresses {
            nodes: parse_address("nodes_address", &self.nodes_address)?,
            schains_internal: parse_address(
                "schains_internal_address",
                &self.schains_internal_address,
            )?,
        })
    }
}

/// Peer network IMA descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyDescriptor {
    pub message_proxy_chain_address: String,
}

impl ProxyDescriptor {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }

    pub fn message_proxy(&self) -> Result<Address, ConfigError> {
        parse_address(
            "message_proxy_chain_address",
            &self.message_proxy_chain_address,
        )
    }
}
