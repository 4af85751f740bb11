// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry query layer.
//!
//! Typed wrappers over the read-only registry methods. Every call is
//! idempotent and is issued exactly once; transport failures propagate to
//! the caller tagged with the method and its arguments.

use crate::contracts::{MessageProxyForSchain, Nodes, SchainsInternal};
use crate::decode;
use crate::error::BrowserError;
use crate::rpc::{RpcError, Transport};
use crate::types::{SChain, SchainHash};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use futures::future::try_join_all;
use std::sync::Arc;

/// Contract addresses of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryAddresses {
    pub nodes: Address,
    pub schains_internal: Address,
}

/// One deployed contract reached through a shared transport.
pub struct Contract<T> {
    transport: Arc<T>,
    address: Address,
}

impl<T: Transport> Contract<T> {
    pub fn new(transport: Arc<T>, address: Address) -> Self {
        Self { transport, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Issue `call` and decode its return values. `args` labels the call in
    /// errors.
    pub async fn call<C: SolCall>(&self, call: C, args: String) -> Result<C::Return, BrowserError> {
        let raw = self
            .transport
            .call(self.address, call.abi_encode())
            .await
            .map_err(|source| RpcError::Call {
                method: C::SIGNATURE,
                args,
                source: Box::new(source),
            })?;
        Ok(decode::returns::<C>(&raw)?)
    }
}

/// Raw node record plus the two side lookups that complete it.
#[derive(Debug, Clone)]
pub struct RawNodeDetails {
    pub record: Nodes::nodesReturn,
    pub domain_name: String,
    pub schain_hashes: Vec<SchainHash>,
}

/// Registry contracts on the primary network.
pub struct Registry<T> {
    nodes: Contract<T>,
    schains_internal: Contract<T>,
}

impl<T: Transport> Registry<T> {
    pub fn new(transport: Arc<T>, addresses: RegistryAddresses) -> Self {
        Self {
            nodes: Contract::new(Arc::clone(&transport), addresses.nodes),
            schains_internal: Contract::new(transport, addresses.schains_internal),
        }
    }

    /// All registered sChain identifiers, in registry order.
    pub async fn schain_hashes(&self) -> Result<Vec<SchainHash>, BrowserError> {
        let output = self
            .schains_internal
            .call(SchainsInternal::getSchainsCall {}, String::new())
            .await?;
        Ok(output.hashes.into_iter().map(SchainHash::from).collect())
    }

    pub async fn schain_record(
        &self,
        hash: &SchainHash,
    ) -> Result<SchainsInternal::schainsReturn, BrowserError> {
        self.schains_internal
            .call(
                SchainsInternal::schainsCall { schainHash: hash.0 },
                hash.to_string(),
            )
            .await
    }

    /// Raw records for `hashes`, fetched concurrently; output order matches.
    pub async fn schain_records(
        &self,
        hashes: &[SchainHash],
    ) -> Result<Vec<SchainsInternal::schainsReturn>, BrowserError> {
        try_join_all(hashes.iter().map(|hash| self.schain_record(hash))).await
    }

    pub async fn schain(&self, hash: &SchainHash) -> Result<SChain, BrowserError> {
        let record = self.schain_record(hash).await?;
        Ok(decode::schain_from_record(record))
    }

    pub async fn schain_by_name(&self, name: &str) -> Result<SChain, BrowserError> {
        self.schain(&SchainHash::from_name(name)).await
    }

    /// Member node ids of one sChain.
    pub async fn node_ids_in_group(&self, hash: &SchainHash) -> Result<Vec<U256>, BrowserError> {
        let output = self
            .schains_internal
            .call(
                SchainsInternal::getNodesInGroupCall { schainHash: hash.0 },
                hash.to_string(),
            )
            .await?;
        Ok(output.nodeIds)
    }

    pub async fn node_ids_in_groups(&self, hashes: &[SchainHash]) -> Result<Vec<Vec<U256>>, BrowserError> {
        try_join_all(hashes.iter().map(|hash| self.node_ids_in_group(hash))).await
    }

    pub async fn node_record(&self, id: U256) -> Result<Nodes::nodesReturn, BrowserError> {
        self.nodes
            .call(Nodes::nodesCall { nodeIndex: id }, id.to_string())
            .await
    }

    pub async fn node_domain_name(&self, id: U256) -> Result<String, BrowserError> {
        let output = self
            .nodes
            .call(Nodes::getNodeDomainNameCall { nodeIndex: id }, id.to_string())
            .await?;
        Ok(output.domainName)
    }

    /// sChains hosted by a node, in slot order.
    pub async fn node_schain_hashes(&self, id: U256) -> Result<Vec<SchainHash>, BrowserError> {
        let output = self
            .schains_internal
            .call(
                SchainsInternal::getSchainHashesForNodeCall { nodeIndex: id },
                id.to_string(),
            )
            .await?;
        Ok(output.hashes.into_iter().map(SchainHash::from).collect())
    }

    /// Record, domain name and hosted list of one node, fetched together.
    pub async fn node_details(&self, id: U256) -> Result<RawNodeDetails, BrowserError> {
        let (record, domain_name, schain_hashes) = tokio::try_join!(
            self.node_record(id),
            self.node_domain_name(id),
            self.node_schain_hashes(id),
        )?;
        Ok(RawNodeDetails {
            record,
            domain_name,
            schain_hashes,
        })
    }
}

/// Connectivity lookups against the peer network's message proxy.
pub struct ConnectivityChecker<C> {
    message_proxy: Contract<C>,
}

impl<C: Transport> ConnectivityChecker<C> {
    pub fn new(transport: Arc<C>, message_proxy: Address) -> Self {
        Self {
            message_proxy: Contract::new(transport, message_proxy),
        }
    }

    pub async fn is_connected(&self, name: &str) -> Result<bool, BrowserError> {
        let output = self
            .message_proxy
            .call(
                MessageProxyForSchain::isConnectedChainCall {
                    schainName: name.to_string(),
                },
                name.to_string(),
            )
            .await?;
        Ok(output.connected)
    }
}
