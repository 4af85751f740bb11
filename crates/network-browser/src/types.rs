// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Snapshot data model.
//!
//! Field names serialize in camelCase to match the document consumers read.
//! Registry `uint256` values are held as [`U256`] and, like the base port,
//! written as decimal strings.

use alloy_primitives::{keccak256, B256, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// sChain identifier: keccak256 of the chain name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchainHash(pub B256);

impl SchainHash {
    pub fn from_name(name: &str) -> Self {
        Self(keccak256(name.as_bytes()))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.as_slice()))
    }
}

impl From<B256> for SchainHash {
    fn from(hash: B256) -> Self {
        Self(hash)
    }
}

impl fmt::Display for SchainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for SchainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchainHash({})", self.to_hex())
    }
}

impl FromStr for SchainHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| format!("invalid sChain hash {s:?}: {e}"))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| format!("sChain hash {s:?} is not 32 bytes"))?;
        Ok(Self(B256::from(hash)))
    }
}

impl Serialize for SchainHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SchainHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Serde adapter writing an integer as a decimal string.
pub(crate) mod wide {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Port of each public protocol for one (node, sChain) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchainPorts {
    pub http: u16,
    pub https: u16,
    pub ws: u16,
    pub wss: u16,
    pub info_http: u16,
}

/// One URL per public protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSet {
    pub http: String,
    pub https: String,
    pub ws: String,
    pub wss: String,
    pub info_http: String,
}

/// Endpoints of a node for one specific sChain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEndpoints {
    pub ports: SchainPorts,
    /// URLs built on the node's domain name.
    pub domain: EndpointSet,
    /// URLs built on the node's public IP.
    pub ip: EndpointSet,
}

/// Registered node as seen from one sChain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    pub ip: String,
    #[serde(rename = "publicIP")]
    pub public_ip: String,
    /// Base port; each hosted sChain gets a 64-port window above it.
    #[serde(with = "wide")]
    pub port: u16,
    #[serde(with = "wide")]
    pub start_block: U256,
    #[serde(with = "wide")]
    pub last_reward_date: U256,
    #[serde(with = "wide")]
    pub finish_time: U256,
    pub status: u8,
    #[serde(with = "wide")]
    pub validator_id: U256,
    pub domain_name: String,
    /// sChains currently hosted by this node, in slot order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schain_hashes: Option<Vec<SchainHash>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<NodeEndpoints>,
}

/// sChain record with its resolved member nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SChain {
    pub name: String,
    pub mainnet_owner: String,
    #[serde(with = "wide")]
    pub index_in_owner_list: U256,
    #[serde(with = "wide")]
    pub part_of_node: U256,
    #[serde(with = "wide")]
    pub lifetime: U256,
    #[serde(with = "wide")]
    pub start_date: U256,
    #[serde(with = "wide")]
    pub start_block: U256,
    #[serde(with = "wide")]
    pub deposit: U256,
    #[serde(with = "wide")]
    pub index: U256,
    #[serde(with = "wide")]
    pub generation: U256,
    pub originator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
}

/// Complete topology document written by one browse run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    /// Unix seconds at completion.
    pub updated_at: u64,
    pub schains: Vec<SChain>,
}
