// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry transport.
//!
//! A [`Transport`] executes read-only contract calls against one network.
//! Two implementations are provided:
//!
//! - [`HttpTransport`] -- plain JSON-RPC 2.0 over HTTP (`eth_call` at `latest`)
//! - [`MulticallTransport`] -- decorator that coalesces concurrently issued
//!   calls into Multicall3 `aggregate3` batches
//!
//! [`RegistryTransport`] picks one of them at connect time based on the
//! network's chain id.

use crate::contracts::Multicall3;
use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

/// Per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Canonical Multicall3 deployment address.
pub const MULTICALL3_ADDRESS: Address = Address::new([
    0xca, 0x11, 0xbd, 0xe0, 0x59, 0x77, 0xb3, 0x63, 0x11, 0x67, 0x02, 0x88, 0x62, 0xbe, 0x2a,
    0x17, 0x39, 0x76, 0xca, 0x11,
]);

/// Chain ids where Multicall3 is known to be deployed.
pub const NETWORKS_WITH_MULTICALL: &[u64] = &[1, 5, 17000, 11155111];

/// Maximum number of calls folded into one `aggregate3`.
pub const MAX_BATCH_SIZE: usize = 100;

/// Remote call errors.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("{method} returned JSON-RPC error {code}: {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },

    #[error("malformed {method} response: {reason}")]
    Malformed { method: &'static str, reason: String },

    #[error("ABI error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("{method}({args}) failed: {source}")]
    Call {
        method: &'static str,
        args: String,
        #[source]
        source: Box<RpcError>,
    },

    #[error("call to {target} reverted")]
    Reverted { target: String },

    #[error("multicall batch failed: {message}")]
    Batch { message: String },

    #[error("multicall batcher is closed")]
    BatcherClosed,
}

/// Read-only access to one network.
pub trait Transport: Send + Sync + 'static {
    /// `eth_call` of `data` against contract `to`, returning the raw output.
    fn call(
        &self,
        to: Address,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, RpcError>> + Send;

    fn chain_id(&self) -> impl Future<Output = Result<u64, RpcError>> + Send;

    fn block_number(&self) -> impl Future<Output = Result<u64, RpcError>> + Send;
}

// ============================================================================
// HTTP JSON-RPC
// ============================================================================

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 client over HTTP.
#[derive(Debug)]
pub struct HttpTransport {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RpcError::Http {
                url: url.clone(),
                source,
            })?;
        Ok(Self {
            url,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &'static str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(method, id, url = %self.url, "JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|source| RpcError::Http {
                url: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RpcError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let reply: JsonRpcResponse = response.json().await.map_err(|source| RpcError::Http {
            url: self.url.clone(),
            source,
        })?;
        if let Some(error) = reply.error {
            return Err(RpcError::Rpc {
                method,
                code: error.code,
                message: error.message,
            });
        }
        reply.result.ok_or(RpcError::Malformed {
            method,
            reason: "missing result".into(),
        })
    }
}

/// Parse a hex quantity such as `0x1a`.
pub(crate) fn parse_quantity(method: &'static str, value: &Value) -> Result<u64, RpcError> {
    let malformed = || RpcError::Malformed {
        method,
        reason: format!("expected hex quantity, got {}", value),
    };
    let text = value.as_str().ok_or_else(malformed)?;
    let digits = text.strip_prefix("0x").ok_or_else(malformed)?;
    u64::from_str_radix(digits, 16).map_err(|_| malformed())
}

/// Parse hex data such as `0xdeadbeef`.
pub(crate) fn parse_data(method: &'static str, value: &Value) -> Result<Vec<u8>, RpcError> {
    let malformed = || RpcError::Malformed {
        method,
        reason: format!("expected hex data, got {}", value),
    };
    let text = value.as_str().ok_or_else(malformed)?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|_| malformed())
}

impl Transport for HttpTransport {
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let params = json!([
            {
                "to": format!("0x{}", hex::encode(to.as_slice())),
                "data": format!("0x{}", hex::encode(&data)),
            },
            "latest"
        ]);
        let result = self.request("eth_call", params).await?;
        parse_data("eth_call", &result)
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        let result = self.request("eth_chainId", json!([])).await?;
        parse_quantity("eth_chainId", &result)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let result = self.request("eth_blockNumber", json!([])).await?;
        parse_quantity("eth_blockNumber", &result)
    }
}

// ============================================================================
// Multicall batching
// ============================================================================

struct PendingCall {
    target: Address,
    data: Vec<u8>,
    reply: oneshot::Sender<Result<Vec<u8>, RpcError>>,
}

/// Batching decorator over another transport.
///
/// Calls issued while the batcher is busy are queued and sent together as
/// one `aggregate3` with `allowFailure` set, so a reverted inner call only
/// fails its own caller. Must be created inside a tokio runtime.
pub struct MulticallTransport<T> {
    inner: Arc<T>,
    queue: mpsc::UnboundedSender<PendingCall>,
}

impl<T: Transport> MulticallTransport<T> {
    pub fn new(inner: T) -> Self {
        let inner = Arc::new(inner);
        let (queue, pending) = mpsc::unbounded_channel();
        tokio::spawn(run_batcher(Arc::clone(&inner), pending));
        Self { inner, queue }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

async fn run_batcher<T: Transport>(inner: Arc<T>, mut pending: mpsc::UnboundedReceiver<PendingCall>) {
    while let Some(first) = pending.recv().await {
        // let concurrently spawned callers enqueue before the batch is cut
        tokio::task::yield_now().await;

        let mut batch = vec![first];
        while batch.len() < MAX_BATCH_SIZE {
            match pending.try_recv() {
                Ok(call) => batch.push(call),
                Err(_) => break,
            }
        }
        tokio::spawn(execute_batch(Arc::clone(&inner), batch));
    }
    debug!("Multicall batcher stopped");
}

async fn execute_batch<T: Transport>(inner: Arc<T>, mut batch: Vec<PendingCall>) {
    if batch.len() == 1 {
        if let Some(call) = batch.pop() {
            let result = inner.call(call.target, call.data).await;
            let _ = call.reply.send(result);
        }
        return;
    }

    let calls = batch
        .iter()
        .map(|call| Multicall3::Call3 {
            target: call.target,
            allowFailure: true,
            callData: call.data.clone().into(),
        })
        .collect();
    let data = Multicall3::aggregate3Call { calls }.abi_encode();
    trace!(calls = batch.len(), "Sending aggregate3 batch");

    let outcome = match inner.call(MULTICALL3_ADDRESS, data).await {
        Ok(raw) => decode_aggregate(&raw, batch.len()),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(results) => {
            for (call, (success, output)) in batch.into_iter().zip(results) {
                let result = if success {
                    Ok(output)
                } else {
                    Err(RpcError::Reverted {
                        target: call.target.to_checksum(None),
                    })
                };
                let _ = call.reply.send(result);
            }
        }
        Err(err) => {
            warn!(calls = batch.len(), error = %err, "Multicall batch failed");
            let message = err.to_string();
            for call in batch {
                let _ = call.reply.send(Err(RpcError::Batch {
                    message: message.clone(),
                }));
            }
        }
    }
}

fn decode_aggregate(raw: &[u8], expected: usize) -> Result<Vec<(bool, Vec<u8>)>, RpcError> {
    let results = Multicall3::aggregate3Call::abi_decode_returns(raw, true)?.returnData;
    if results.len() != expected {
        return Err(RpcError::Malformed {
            method: "aggregate3",
            reason: format!("{} results for {} calls", results.len(), expected),
        });
    }
    Ok(results
        .into_iter()
        .map(|result| (result.success, result.returnData.to_vec()))
        .collect())
}

impl<T: Transport> Transport for MulticallTransport<T> {
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let (reply, response) = oneshot::channel();
        self.queue
            .send(PendingCall {
                target: to,
                data,
                reply,
            })
            .map_err(|_| RpcError::BatcherClosed)?;
        response.await.map_err(|_| RpcError::BatcherClosed)?
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        self.inner.chain_id().await
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        self.inner.block_number().await
    }
}

// ============================================================================
// Transport selection
// ============================================================================

pub fn supports_multicall(chain_id: u64) -> bool {
    NETWORKS_WITH_MULTICALL.contains(&chain_id)
}

/// Registry transport chosen at connect time.
pub enum RegistryTransport {
    Direct(HttpTransport),
    Multicall(MulticallTransport<HttpTransport>),
}

impl RegistryTransport {
    /// Connect to `url`, batching through Multicall3 when `multicall` is set
    /// and the network is known to have it.
    pub async fn connect(url: &str, multicall: bool) -> Result<Self, RpcError> {
        let http = HttpTransport::new(url)?;
        if !multicall {
            return Ok(Self::Direct(http));
        }
        let chain_id = http.chain_id().await?;
        if supports_multicall(chain_id) {
            info!(chain_id, "Multicall batching enabled");
            Ok(Self::Multicall(MulticallTransport::new(http)))
        } else {
            info!(chain_id, "Multicall not available on this network, using direct calls");
            Ok(Self::Direct(http))
        }
    }

    pub fn is_multicall(&self) -> bool {
        matches!(self, Self::Multicall(_))
    }
}

impl Transport for RegistryTransport {
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        match self {
            Self::Direct(t) => t.call(to, data).await,
            Self::Multicall(t) => t.call(to, data).await,
        }
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        match self {
            Self::Direct(t) => t.chain_id().await,
            Self::Multicall(t) => t.chain_id().await,
        }
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        match self {
            Self::Direct(t) => t.block_number().await,
            Self::Multicall(t) => t.block_number().await,
        }
    }
}
