// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Network Browser
//!
//! Periodically snapshots the topology of a SKALE network: every registered
//! sChain, its member nodes and the public endpoints each node serves for
//! that sChain. The snapshot is written atomically to a JSON file for other
//! processes to read.
//!
//! # Pipeline
//!
//! ```text
//! PollLoop --> Browser --> Registry --> Transport (HTTP | Multicall3)
//!    |            |
//!    |            +--> decode / endpoints
//!    +--> SnapshotStore (<path>.tmp + rename)
//! ```

pub mod browser;
pub mod config;
pub mod contracts;
pub mod decode;
pub mod endpoints;
pub mod error;
pub mod poll;
pub mod registry;
pub mod rpc;
pub mod store;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{Browser, SnapshotSource};
pub use config::{BrowserConfig, ConfigError, ManagerDescriptor, ProxyDescriptor};
pub use error::BrowserError;
pub use poll::{PollConfig, PollLoop};
pub use registry::{ConnectivityChecker, Registry, RegistryAddresses};
pub use rpc::{HttpTransport, MulticallTransport, RegistryTransport, RpcError, Transport};
pub use store::{PersistenceError, SnapshotStore};
pub use types::{NetworkSnapshot, Node, NodeEndpoints, SChain, SchainHash};
