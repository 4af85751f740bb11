// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint derivation.
//!
//! A node reserves a window of [`PORTS_PER_SCHAIN`] ports above its base port
//! for every sChain it hosts, in the order of its hosted list. Within a window
//! each service sits at a fixed offset (see [`SkaledPort`]).
//!
//! ```text
//! base port                 base + 64                 base + 128
//! |-- sChain slot 0 -------|-- sChain slot 1 --------|-- ...
//!   +2 ws  +3 http  +7 wss  +8 https  +9 info-http
//! ```

use crate::types::{EndpointSet, Node, NodeEndpoints, SchainHash, SchainPorts};
use thiserror::Error;

/// Size of the port window reserved per hosted sChain.
pub const PORTS_PER_SCHAIN: u64 = 64;

/// Endpoint derivation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("sChain {schain} is not found in the list: {hosted:?}")]
    NotFound { schain: String, hosted: Vec<String> },

    #[error("node {node} has no hosted sChain list")]
    MissingHashes { node: String },

    #[error("port {port} for {protocol} is outside the valid port range")]
    PortOutOfRange { port: u64, protocol: &'static str },
}

/// Port offsets inside one sChain window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SkaledPort {
    Proposal = 0,
    Catchup = 1,
    WsJson = 2,
    HttpJson = 3,
    BinaryConsensus = 4,
    ZmqBroadcast = 5,
    ImaMonitoring = 6,
    WssJson = 7,
    HttpsJson = 8,
    InfoHttpJson = 9,
}

impl SkaledPort {
    pub const fn offset(self) -> u64 {
        self as u64
    }
}

/// Public protocols exposed in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
    Ws,
    Wss,
    InfoHttp,
}

impl Protocol {
    pub const ALL: [Protocol; 5] = [
        Protocol::Http,
        Protocol::Https,
        Protocol::Ws,
        Protocol::Wss,
        Protocol::InfoHttp,
    ];

    /// URL scheme; the info endpoint is plain HTTP.
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Http | Self::InfoHttp => "http",
            Self::Https => "https",
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }

    pub fn port(self) -> SkaledPort {
        match self {
            Self::Http => SkaledPort::HttpJson,
            Self::Https => SkaledPort::HttpsJson,
            Self::Ws => SkaledPort::WsJson,
            Self::Wss => SkaledPort::WssJson,
            Self::InfoHttp => SkaledPort::InfoHttpJson,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Ws => "ws",
            Self::Wss => "wss",
            Self::InfoHttp => "infoHttp",
        }
    }
}

impl SchainPorts {
    pub fn get(&self, protocol: Protocol) -> u16 {
        match protocol {
            Protocol::Http => self.http,
            Protocol::Https => self.https,
            Protocol::Ws => self.ws,
            Protocol::Wss => self.wss,
            Protocol::InfoHttp => self.info_http,
        }
    }
}

impl EndpointSet {
    pub fn get(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::Http => &self.http,
            Protocol::Https => &self.https,
            Protocol::Ws => &self.ws,
            Protocol::Wss => &self.wss,
            Protocol::InfoHttp => &self.info_http,
        }
    }
}

/// Zero-based slot of `schain` in the node's hosted list.
pub fn schain_index_in_node(schain: &SchainHash, hosted: &[SchainHash]) -> Result<usize, EndpointError> {
    hosted
        .iter()
        .position(|h| h == schain)
        .ok_or_else(|| EndpointError::NotFound {
            schain: schain.to_hex(),
            hosted: hosted.iter().map(SchainHash::to_hex).collect(),
        })
}

/// First port of the window for the sChain at `index`.
pub fn schain_base_port(node_base_port: u16, index: usize) -> u64 {
    u64::from(node_base_port) + (index as u64).saturating_mul(PORTS_PER_SCHAIN)
}

pub fn calc_ports(schain_base_port: u64) -> Result<SchainPorts, EndpointError> {
    let port = |protocol: Protocol| -> Result<u16, EndpointError> {
        let value = schain_base_port.saturating_add(protocol.port().offset());
        u16::try_from(value).map_err(|_| EndpointError::PortOutOfRange {
            port: value,
            protocol: protocol.name(),
        })
    };
    Ok(SchainPorts {
        http: port(Protocol::Http)?,
        https: port(Protocol::Https)?,
        ws: port(Protocol::Ws)?,
        wss: port(Protocol::Wss)?,
        info_http: port(Protocol::InfoHttp)?,
    })
}

fn compose(host: &str, ports: &SchainPorts) -> EndpointSet {
    let url = |protocol: Protocol| format!("{}://{}:{}", protocol.scheme(), host, ports.get(protocol));
    EndpointSet {
        http: url(Protocol::Http),
        https: url(Protocol::Https),
        ws: url(Protocol::Ws),
        wss: url(Protocol::Wss),
        info_http: url(Protocol::InfoHttp),
    }
}

/// Endpoints of `node` for the sChain `schain`.
///
/// Fails when the node carries no hosted list, when `schain` is not in it, or
/// when the resulting ports leave the 16-bit range.
pub fn calc_endpoints(node: &Node, schain: &SchainHash) -> Result<NodeEndpoints, EndpointError> {
    let hosted = node
        .schain_hashes
        .as_deref()
        .ok_or_else(|| EndpointError::MissingHashes {
            node: node.name.clone(),
        })?;
    let index = schain_index_in_node(schain, hosted)?;
    let ports = calc_ports(schain_base_port(node.port, index))?;
    Ok(NodeEndpoints {
        domain: compose(&node.domain_name, &ports),
        ip: compose(&node.public_ip, &ports),
        ports,
    })
}
