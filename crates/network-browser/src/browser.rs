// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Snapshot assembly.
//!
//! One browse run walks the registry in phases; every phase fans out all its
//! remote calls at once and results are always matched back by position:
//!
//! ```text
//! getSchains -> schains(h)* -> [isConnectedChain(name)*] -> getNodesInGroup(h)*
//!            -> per sChain, per member: nodes(id) | getNodeDomainName(id)
//!                                       | getSchainHashesForNode(id)
//! ```
//!
//! Any failure aborts the run; nothing partial is ever returned.

use crate::decode;
use crate::endpoints;
use crate::error::BrowserError;
use crate::registry::{ConnectivityChecker, Registry};
use crate::rpc::Transport;
use crate::tools;
use crate::types::{NetworkSnapshot, Node, SChain, SchainHash};
use alloy_primitives::U256;
use futures::future::try_join_all;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Anything that can produce a complete network snapshot.
pub trait SnapshotSource: Send + Sync {
    fn assemble(&self) -> impl Future<Output = Result<NetworkSnapshot, BrowserError>> + Send;
}

/// Snapshot assembler over the registry and an optional connectivity check.
pub struct Browser<T, C = T> {
    registry: Registry<T>,
    connectivity: Option<ConnectivityChecker<C>>,
}

impl<T: Transport, C: Transport> Browser<T, C> {
    /// `connectivity` of `None` keeps every registered sChain.
    pub fn new(registry: Registry<T>, connectivity: Option<ConnectivityChecker<C>>) -> Self {
        Self {
            registry,
            connectivity,
        }
    }

    /// Assemble one snapshot of every (connected) sChain and its nodes.
    pub async fn browse(&self) -> Result<NetworkSnapshot, BrowserError> {
        let started = Instant::now();

        let hashes = self.registry.schain_hashes().await?;
        debug!(count = hashes.len(), "Enumerated sChains");

        let records = self.registry.schain_records(&hashes).await.map_err(|e| {
            warn!(error = %e, "Failed to fetch sChain records");
            e
        })?;
        let schains: Vec<SChain> = records.into_iter().map(decode::schain_from_record).collect();

        let (hashes, mut schains) = self.filter_connected(hashes, schains).await?;
        info!("Going to gather information about {} chains", schains.len());

        let groups = self.registry.node_ids_in_groups(&hashes).await?;
        let node_lists = try_join_all(
            hashes
                .iter()
                .zip(&groups)
                .map(|(hash, ids)| self.schain_nodes(hash, ids)),
        )
        .await?;

        for (schain, nodes) in schains.iter_mut().zip(node_lists) {
            schain.nodes = Some(nodes);
        }

        let snapshot = NetworkSnapshot {
            updated_at: tools::current_timestamp(),
            schains,
        };
        let elapsed = started.elapsed();
        info!(
            "Browse execution time: {} ms ({:.3} s) for {} chains",
            elapsed.as_millis(),
            elapsed.as_secs_f64(),
            snapshot.schains.len()
        );
        Ok(snapshot)
    }

    /// Keep connected sChains in registry order. Hashes are filtered in
    /// lock-step so later phases stay aligned with the records.
    async fn filter_connected(
        &self,
        hashes: Vec<SchainHash>,
        schains: Vec<SChain>,
    ) -> Result<(Vec<SchainHash>, Vec<SChain>), BrowserError> {
        let Some(checker) = &self.connectivity else {
            return Ok((hashes, schains));
        };
        let flags = try_join_all(schains.iter().map(|s| checker.is_connected(&s.name))).await?;
        let total = schains.len();
        let kept: (Vec<_>, Vec<_>) = hashes
            .into_iter()
            .zip(schains)
            .zip(flags)
            .filter_map(|(pair, connected)| connected.then_some(pair))
            .unzip();
        debug!(total, connected = kept.1.len(), "Filtered connected sChains");
        Ok(kept)
    }

    async fn schain_nodes(&self, hash: &SchainHash, ids: &[U256]) -> Result<Vec<Node>, BrowserError> {
        try_join_all(ids.iter().map(|id| self.node_for_schain(*id, hash))).await
    }

    /// Resolve one member node with endpoints for the sChain `hash`.
    async fn node_for_schain(&self, id: U256, hash: &SchainHash) -> Result<Node, BrowserError> {
        let details = self.registry.node_details(id).await.map_err(|e| {
            warn!(node_id = %id, schain = %hash, error = %e, "Failed to fetch node details");
            e
        })?;
        let mut node = decode::node_from_record(
            details.record,
            details.domain_name,
            Some(details.schain_hashes),
        )
        .map_err(|e| {
            warn!(node_id = %id, error = %e, "Failed to decode node record");
            BrowserError::from(e)
        })?;
        let endpoints = endpoints::calc_endpoints(&node, hash).map_err(|e| {
            warn!(node_id = %id, schain = %hash, error = %e, "Failed to derive endpoints");
            BrowserError::from(e)
        })?;
        node.endpoints = Some(endpoints);
        Ok(node)
    }
}

impl<T: Transport, C: Transport> SnapshotSource for Browser<T, C> {
    fn assemble(&self) -> impl Future<Output = Result<NetworkSnapshot, BrowserError>> + Send {
        self.browse()
    }
}
