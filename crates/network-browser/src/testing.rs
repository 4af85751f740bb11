// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory registry for tests.
//!
//! [`MockRegistry`] answers ABI-encoded calls the way the deployed contracts
//! do, including `aggregate3` batches addressed to Multicall3.

use crate::contracts::{MessageProxyForSchain, Multicall3, Nodes, SchainsInternal};
use crate::registry::RegistryAddresses;
use crate::rpc::{RpcError, Transport, MULTICALL3_ADDRESS};
use crate::types::SchainHash;
use alloy_primitives::{Address, FixedBytes, B256, U256};
use alloy_sol_types::SolCall;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

const NODES_ADDRESS: Address = Address::new([0x01; 20]);
const SCHAINS_INTERNAL_ADDRESS: Address = Address::new([0x02; 20]);
const MESSAGE_PROXY_ADDRESS: Address = Address::new([0x03; 20]);

#[derive(Debug, Clone)]
pub struct MockSchain {
    pub name: String,
    pub members: Vec<U256>,
}

impl MockSchain {
    pub fn new(name: &str, members: &[u64]) -> Self {
        Self {
            name: name.to_string(),
            members: members.iter().map(|id| U256::from(*id)).collect(),
        }
    }

    fn hash(&self) -> SchainHash {
        SchainHash::from_name(&self.name)
    }

    fn record(&self) -> Vec<u8> {
        SchainsInternal::schainsCall::abi_encode_returns(&(
            self.name.clone(),
            Address::repeat_byte(0xaa),
            U256::ZERO,
            U256::from(1u64),
            U256::from(5u64),
            U256::from(1_700_000_000u64),
            U256::from(100u64),
            U256::from(u64::MAX) + U256::from(1u64),
            U256::from(self.name.len() as u64),
            U256::ZERO,
            Address::ZERO,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct MockNode {
    pub id: U256,
    pub port: u16,
    pub hosted: Vec<String>,
}

impl MockNode {
    pub fn new(id: u64, port: u16, hosted: &[&str]) -> Self {
        Self {
            id: U256::from(id),
            port,
            hosted: hosted.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn domain_name(&self) -> String {
        format!("node{}.skale.test", self.id)
    }

    fn record(&self) -> Vec<u8> {
        let octet = self.id.to::<u8>();
        Nodes::nodesCall::abi_encode_returns(&(
            format!("node-{}", self.id),
            FixedBytes::new([10, 0, 0, octet]),
            FixedBytes::new([94, 12, 56, octet]),
            self.port,
            U256::from(10u64),
            U256::from(20u64),
            U256::ZERO,
            0u8,
            self.id,
        ))
    }
}

/// Registry transport backed by in-memory records.
#[derive(Debug, Default)]
pub struct MockRegistry {
    schains: Vec<MockSchain>,
    nodes: Vec<MockNode>,
    connected: HashSet<String>,
    failing: Vec<[u8; 4]>,
    truncating: HashMap<[u8; 4], usize>,
    chain_id: u64,
    calls: AtomicUsize,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            chain_id: 1,
            ..Default::default()
        }
    }

    pub fn with_schain(mut self, schain: MockSchain) -> Self {
        self.schains.push(schain);
        self
    }

    pub fn with_node(mut self, node: MockNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_connected(mut self, names: &[&str]) -> Self {
        self.connected.extend(names.iter().map(|s| s.to_string()));
        self
    }

    /// Make every `C` call fail with a JSON-RPC error.
    pub fn failing_on<C: SolCall>(mut self) -> Self {
        self.failing.push(C::SELECTOR);
        self
    }

    /// Cut the output of every `C` call to `len` bytes.
    pub fn truncating_on<C: SolCall>(mut self, len: usize) -> Self {
        self.truncating.insert(C::SELECTOR, len);
        self
    }

    pub fn addresses(&self) -> RegistryAddresses {
        RegistryAddresses {
            nodes: NODES_ADDRESS,
            schains_internal: SCHAINS_INTERNAL_ADDRESS,
        }
    }

    pub fn message_proxy(&self) -> Address {
        MESSAGE_PROXY_ADDRESS
    }

    /// Number of transport-level calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn schain(&self, hash: B256) -> Option<&MockSchain> {
        self.schains.iter().find(|s| s.hash().0 == hash)
    }

    fn node(&self, id: U256) -> Option<&MockNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn respond(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, RpcError> {
        let reverted = || RpcError::Reverted {
            target: to.to_checksum(None),
        };
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(reverted)?;
        if self.failing.contains(&selector) {
            return Err(RpcError::Rpc {
                method: "eth_call",
                code: -32000,
                message: "injected failure".into(),
            });
        }

        let mut output = self.dispatch(to, selector, data).ok_or_else(reverted)?;
        if let Some(len) = self.truncating.get(&selector) {
            output.truncate(*len);
        }
        Ok(output)
    }

    fn dispatch(&self, to: Address, selector: [u8; 4], data: &[u8]) -> Option<Vec<u8>> {
        fn decoded<C: SolCall>(selector: [u8; 4], data: &[u8]) -> Option<C> {
            if selector != C::SELECTOR {
                return None;
            }
            C::abi_decode(data, true).ok()
        }

        if to == SCHAINS_INTERNAL_ADDRESS {
            if decoded::<SchainsInternal::getSchainsCall>(selector, data).is_some() {
                let all: Vec<B256> = self.schains.iter().map(|s| s.hash().0).collect();
                return Some(SchainsInternal::getSchainsCall::abi_encode_returns(&(all,)));
            }
            if let Some(call) = decoded::<SchainsInternal::schainsCall>(selector, data) {
                return self.schain(call.schainHash).map(MockSchain::record);
            }
            if let Some(call) = decoded::<SchainsInternal::getNodesInGroupCall>(selector, data) {
                let members = self.schain(call.schainHash)?.members.clone();
                return Some(SchainsInternal::getNodesInGroupCall::abi_encode_returns(&(members,)));
            }
            if let Some(call) = decoded::<SchainsInternal::getSchainHashesForNodeCall>(selector, data) {
                let node = self.node(call.nodeIndex)?;
                let hosted: Vec<B256> = node.hosted.iter().map(|n| SchainHash::from_name(n).0).collect();
                return Some(SchainsInternal::getSchainHashesForNodeCall::abi_encode_returns(&(
                    hosted,
                )));
            }
        } else if to == NODES_ADDRESS {
            if let Some(call) = decoded::<Nodes::nodesCall>(selector, data) {
                return self.node(call.nodeIndex).map(MockNode::record);
            }
            if let Some(call) = decoded::<Nodes::getNodeDomainNameCall>(selector, data) {
                let domain = self.node(call.nodeIndex)?.domain_name();
                return Some(Nodes::getNodeDomainNameCall::abi_encode_returns(&(domain,)));
            }
        } else if to == MESSAGE_PROXY_ADDRESS {
            if let Some(call) = decoded::<MessageProxyForSchain::isConnectedChainCall>(selector, data) {
                let connected = self.connected.contains(&call.schainName);
                return Some(MessageProxyForSchain::isConnectedChainCall::abi_encode_returns(&(
                    connected,
                )));
            }
        } else if to == MULTICALL3_ADDRESS {
            if let Some(call) = decoded::<Multicall3::aggregate3Call>(selector, data) {
                return Some(self.aggregate(call));
            }
        }
        None
    }

    fn aggregate(&self, call: Multicall3::aggregate3Call) -> Vec<u8> {
        let results: Vec<Multicall3::Call3Result> = call
            .calls
            .into_iter()
            .map(|inner| match self.respond(inner.target, &inner.callData) {
                Ok(output) => Multicall3::Call3Result {
                    success: true,
                    returnData: output.into(),
                },
                Err(_) => Multicall3::Call3Result {
                    success: false,
                    returnData: Default::default(),
                },
            })
            .collect();
        Multicall3::aggregate3Call::abi_encode_returns(&(results,))
    }
}

impl Transport for MockRegistry {
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.respond(to, &data)
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(1)
    }
}
