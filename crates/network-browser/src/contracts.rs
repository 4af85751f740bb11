// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Contract bindings.
//!
//! Only the read-only methods the browser calls are declared. Output names
//! and order follow the deployed getters; the struct getters (`schains`,
//! `nodes`) return their fields positionally, so the declarations below are
//! the record layouts.

use alloy_sol_types::sol;

sol! {
    #![sol(all_derives)]
    interface SchainsInternal {
        function getSchains() external view returns (bytes32[] memory hashes);

        function schains(bytes32 schainHash) external view returns (
            string memory name,
            address mainnetOwner,
            uint256 indexInOwnerList,
            uint256 partOfNode,
            uint256 lifetime,
            uint256 startDate,
            uint256 startBlock,
            uint256 deposit,
            uint256 index,
            uint256 generation,
            address originator
        );

        function getNodesInGroup(bytes32 schainHash) external view returns (uint256[] memory nodeIds);

        function getSchainHashesForNode(uint256 nodeIndex) external view returns (bytes32[] memory hashes);
    }
}

sol! {
    #![sol(all_derives)]
    interface Nodes {
        function nodes(uint256 nodeIndex) external view returns (
            string memory name,
            bytes4 ip,
            bytes4 publicIP,
            uint16 port,
            uint256 startBlock,
            uint256 lastRewardDate,
            uint256 finishTime,
            uint8 status,
            uint256 validatorId
        );

        function getNodeDomainName(uint256 nodeIndex) external view returns (string memory domainName);
    }
}

sol! {
    #![sol(all_derives)]
    interface MessageProxyForSchain {
        function isConnectedChain(string calldata schainName) external view returns (bool connected);
    }
}

sol! {
    #![sol(all_derives)]
    interface Multicall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Call3Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) external payable returns (Call3Result[] memory returnData);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;
    use alloy_sol_types::SolCall;

    fn assert_selector<C: SolCall>(signature: &str) {
        assert_eq!(C::SIGNATURE, signature);
        assert_eq!(C::SELECTOR[..], keccak256(signature.as_bytes())[..4]);
    }

    #[test]
    fn test_registry_signatures() {
        assert_selector::<SchainsInternal::getSchainsCall>("getSchains()");
        assert_selector::<SchainsInternal::schainsCall>("schains(bytes32)");
        assert_selector::<SchainsInternal::getNodesInGroupCall>("getNodesInGroup(bytes32)");
        assert_selector::<SchainsInternal::getSchainHashesForNodeCall>(
            "getSchainHashesForNode(uint256)",
        );
        assert_selector::<Nodes::nodesCall>("nodes(uint256)");
        assert_selector::<Nodes::getNodeDomainNameCall>("getNodeDomainName(uint256)");
        assert_selector::<MessageProxyForSchain::isConnectedChainCall>("isConnectedChain(string)");
    }

    #[test]
    fn test_aggregate3_signature() {
        assert_selector::<Multicall3::aggregate3Call>("aggregate3((address,bool,bytes)[])");
        // well-known selector
        assert_eq!(Multicall3::aggregate3Call::SELECTOR, [0x82, 0xad, 0x56, 0xcb]);
    }
}
