// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Poll loop.
//!
//! Alternates between a running phase (one assembly under a deadline, then
//! persistence) and an idle phase whose length depends on the outcome. A
//! timed-out assembly is dropped, which abandons its in-flight requests.

use crate::browser::SnapshotSource;
use crate::error::BrowserError;
use crate::store::SnapshotStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Idle time after a saved snapshot.
    pub success_delay: Duration,
    /// Idle time after a failed or timed-out iteration.
    pub error_delay: Duration,
    /// Deadline for one assembly.
    pub timeout: Duration,
}

/// Periodic snapshot producer.
pub struct PollLoop<S> {
    source: S,
    store: SnapshotStore,
    config: PollConfig,
    shutdown: Arc<Notify>,
}

impl<S: SnapshotSource> PollLoop<S> {
    pub fn new(source: S, store: SnapshotStore, config: PollConfig) -> Self {
        Self {
            source,
            store,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle that stops [`run`](Self::run) when notified.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Assemble under the deadline and persist. Returns the sChain count.
    pub async fn run_once(&self) -> Result<usize, BrowserError> {
        let snapshot = tokio::time::timeout(self.config.timeout, self.source.assemble())
            .await
            .map_err(|_| BrowserError::Timeout(self.config.timeout))??;
        self.store.save(&snapshot)?;
        Ok(snapshot.schains.len())
    }

    /// One running phase; returns how long to stay idle afterwards.
    pub async fn step(&self) -> Duration {
        match self.run_once().await {
            Ok(schains) => {
                info!(
                    schains,
                    next_in = ?self.config.success_delay,
                    "Network browser iteration finished"
                );
                self.config.success_delay
            }
            Err(BrowserError::Timeout(limit)) => {
                warn!(timeout = ?limit, retry_in = ?self.config.error_delay, "Network browser iteration timed out");
                self.config.error_delay
            }
            Err(e) => {
                error!(
                    kind = e.kind(),
                    error = %e,
                    retry_in = ?self.config.error_delay,
                    "Network browser iteration failed"
                );
                self.config.error_delay
            }
        }
    }

    /// Run until the shutdown handle is notified.
    pub async fn run(&self) {
        info!(path = %self.store.path().display(), "Network browser loop started");
        loop {
            let idle = tokio::select! {
                idle = self.step() => idle,
                _ = self.shutdown.notified() => break,
            };
            tokio::select! {
                _ = tokio::time::sleep(idle) => {}
                _ = self.shutdown.notified() => break,
            }
        }
        debug!("Network browser loop stopped");
    }
}
