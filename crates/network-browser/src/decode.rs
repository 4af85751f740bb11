// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry record decoding.
//!
//! Raw call output is decoded against the declared return types in
//! [`contracts`](crate::contracts) with validation on, so short, oversized
//! or out-of-range records are rejected here rather than truncated. The
//! typed records are then mapped field by field into the snapshot model.

use crate::contracts::{Nodes, SchainsInternal};
use crate::types::{Node, SChain, SchainHash};
use alloy_primitives::keccak256;
use alloy_sol_types::SolCall;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Record decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid hex in IP field: {0:?}")]
    InvalidHex(String),

    #[error("malformed {method} output: {source}")]
    Abi {
        method: &'static str,
        #[source]
        source: alloy_sol_types::Error,
    },
}

/// Decode the return data of call `C`.
pub fn returns<C: SolCall>(raw: &[u8]) -> Result<C::Return, DecodeError> {
    C::abi_decode_returns(raw, true).map_err(|source| DecodeError::Abi {
        method: C::SIGNATURE,
        source,
    })
}

/// Decode a packed IPv4 hex string into dotted-quad notation.
///
/// Accepts an optional `0x` prefix. Shorter input is left-padded with zeros;
/// longer input keeps its low four bytes.
pub fn hex_to_ip(value: &str) -> Result<String, DecodeError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHex(value.to_string()));
    }
    let low = &digits[digits.len().saturating_sub(8)..];
    let packed = u32::from_str_radix(&format!("{:0>8}", low), 16)
        .map_err(|_| DecodeError::InvalidHex(value.to_string()))?;
    Ok(Ipv4Addr::from(packed).to_string())
}

/// Chain id the network assigns to an sChain: the first 13 hex digits of
/// `keccak256(name)`.
pub fn chain_id_from_name(name: &str) -> u64 {
    let hash = keccak256(name.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash[..8]);
    // 64 bits = 16 hex digits, drop the last 3
    u64::from_be_bytes(head) >> 12
}

/// Map a `schains(bytes32)` record.
pub fn schain_from_record(record: SchainsInternal::schainsReturn) -> SChain {
    SChain {
        chain_id: Some(chain_id_from_name(&record.name)),
        name: record.name,
        mainnet_owner: record.mainnetOwner.to_checksum(None),
        index_in_owner_list: record.indexInOwnerList,
        part_of_node: record.partOfNode,
        lifetime: record.lifetime,
        start_date: record.startDate,
        start_block: record.startBlock,
        deposit: record.deposit,
        index: record.index,
        generation: record.generation,
        originator: record.originator.to_checksum(None),
        nodes: None,
    }
}

/// Map a `nodes(uint256)` record. Endpoints are attached separately, in the
/// context of one sChain.
pub fn node_from_record(
    record: Nodes::nodesReturn,
    domain_name: String,
    schain_hashes: Option<Vec<SchainHash>>,
) -> Result<Node, DecodeError> {
    Ok(Node {
        name: record.name,
        ip: hex_to_ip(&hex::encode(record.ip.as_slice()))?,
        public_ip: hex_to_ip(&hex::encode(record.publicIP.as_slice()))?,
        port: record.port,
        start_block: record.startBlock,
        last_reward_date: record.lastRewardDate,
        finish_time: record.finishTime,
        status: record.status,
        validator_id: record.validatorId,
        domain_name,
        schain_hashes,
        endpoints: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, FixedBytes, U256};

    fn schain_record(name: &str) -> SchainsInternal::schainsReturn {
        SchainsInternal::schainsReturn {
            name: name.into(),
            mainnetOwner: Address::repeat_byte(0x11),
            indexInOwnerList: U256::ZERO,
            partOfNode: U256::from(4u64),
            lifetime: U256::from(5u64),
            startDate: U256::from(1_700_000_000u64),
            startBlock: U256::from(120u64),
            deposit: U256::from(1_000_000_000_000_000_000u64),
            index: U256::from(7u64),
            generation: U256::ZERO,
            originator: Address::ZERO,
        }
    }

    fn node_record() -> Nodes::nodesReturn {
        Nodes::nodesReturn {
            name: "node-1".into(),
            ip: FixedBytes::new([0x0a, 0, 0, 1]),
            publicIP: FixedBytes::new([0x5e, 0x0c, 0x38, 0x80]),
            port: 10000,
            startBlock: U256::from(11u64),
            lastRewardDate: U256::from(12u64),
            finishTime: U256::ZERO,
            status: 0,
            validatorId: U256::from(3u64),
        }
    }

    fn encoded_node() -> Vec<u8> {
        let r = node_record();
        Nodes::nodesCall::abi_encode_returns(&(
            r.name,
            r.ip,
            r.publicIP,
            r.port,
            r.startBlock,
            r.lastRewardDate,
            r.finishTime,
            r.status,
            r.validatorId,
        ))
    }

    #[test]
    fn test_hex_to_ip_known_values() {
        assert_eq!(hex_to_ip("0x5E0C3880").unwrap(), "94.12.56.128");
        assert_eq!(hex_to_ip("01010101").unwrap(), "1.1.1.1");
        assert_eq!(hex_to_ip("0x7f000001").unwrap(), "127.0.0.1");
    }

    #[test]
    fn test_hex_to_ip_padding_and_truncation() {
        assert_eq!(hex_to_ip("0x101").unwrap(), "0.0.1.1");
        assert_eq!(hex_to_ip("").unwrap(), "0.0.0.0");
        assert_eq!(hex_to_ip("0xffff5e0c3880").unwrap(), "94.12.56.128");
    }

    #[test]
    fn test_hex_to_ip_octets_match_bytes() {
        for value in [0u32, 1, 0x00ff_00ff, 0xdead_beef, u32::MAX] {
            let ip = hex_to_ip(&format!("{:08x}", value)).unwrap();
            let octets: Vec<u8> = ip.split('.').map(|o| o.parse().unwrap()).collect();
            assert_eq!(octets, value.to_be_bytes().to_vec());
        }
    }

    #[test]
    fn test_hex_to_ip_rejects_non_hex() {
        assert!(matches!(
            hex_to_ip("0xzz000001"),
            Err(DecodeError::InvalidHex(v)) if v == "0xzz000001"
        ));
        assert!(hex_to_ip("1.1.1.1").is_err());
    }

    #[test]
    fn test_schain_from_record() {
        let schain = schain_from_record(schain_record("alpha"));
        assert_eq!(schain.name, "alpha");
        assert_eq!(
            schain.mainnet_owner,
            Address::repeat_byte(0x11).to_checksum(None)
        );
        assert_eq!(schain.part_of_node, U256::from(4u64));
        assert_eq!(schain.deposit, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(schain.index, U256::from(7u64));
        assert_eq!(schain.chain_id, Some(chain_id_from_name("alpha")));
        assert!(schain.nodes.is_none());
    }

    #[test]
    fn test_schain_keeps_values_above_u128() {
        let mut record = schain_record("alpha");
        record.deposit = U256::MAX;
        record.lifetime = U256::from(u128::MAX) + U256::from(1u64);

        let schain = schain_from_record(record);
        assert_eq!(schain.deposit, U256::MAX);
        assert_eq!(schain.lifetime.to_string(), "340282366920938463463374607431768211456");
    }

    #[test]
    fn test_node_from_record() {
        let hosted = vec![SchainHash::from_name("alpha")];
        let node = node_from_record(node_record(), "node1.test".into(), Some(hosted.clone())).unwrap();
        assert_eq!(node.name, "node-1");
        assert_eq!(node.ip, "10.0.0.1");
        assert_eq!(node.public_ip, "94.12.56.128");
        assert_eq!(node.port, 10000);
        assert_eq!(node.validator_id, U256::from(3u64));
        assert_eq!(node.domain_name, "node1.test");
        assert_eq!(node.schain_hashes, Some(hosted));
        assert!(node.endpoints.is_none());
    }

    #[test]
    fn test_returns_decodes_record() {
        let record = returns::<Nodes::nodesCall>(&encoded_node()).unwrap();
        assert_eq!(record, node_record());
    }

    #[test]
    fn test_truncated_output_rejected() {
        let raw = encoded_node();
        for len in [0, 31, 40, 9 * 32] {
            let err = returns::<Nodes::nodesCall>(&raw[..len]).unwrap_err();
            assert!(matches!(
                err,
                DecodeError::Abi {
                    method: "nodes(uint256)",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_port_out_of_range_rejected() {
        let mut raw = encoded_node();
        // port is the fourth head word; 70000 needs more than 16 bits
        let word = &mut raw[3 * 32..4 * 32];
        word.copy_from_slice(&U256::from(70_000u64).to_be_bytes::<32>());
        assert!(returns::<Nodes::nodesCall>(&raw).is_err());
    }

    #[test]
    fn test_chain_id_from_name() {
        let hash = keccak256(b"alpha");
        let expected = u64::from_str_radix(&hex::encode(hash.as_slice())[..13], 16).unwrap();
        assert_eq!(chain_id_from_name("alpha"), expected);
        assert!(chain_id_from_name("alpha") < 1 << 52);
    }
}
