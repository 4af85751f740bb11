// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level error taxonomy.

use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::endpoints::EndpointError;
use crate::rpc::RpcError;
use crate::store::PersistenceError;
use std::time::Duration;
use thiserror::Error;

/// Any failure of one browse iteration or of startup.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("remote call failed: {0}")]
    RemoteCall(#[from] RpcError),

    #[error("endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("browse timed out after {0:?}")]
    Timeout(Duration),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl BrowserError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Decode(_) => "decode",
            Self::RemoteCall(_) => "remote_call",
            Self::Endpoint(_) => "endpoint",
            Self::Timeout(_) => "timeout",
            Self::Persistence(_) => "persistence",
        }
    }
}
