// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Small runtime helpers.

use crate::rpc::Transport;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

/// Delay between startup availability attempts.
pub const DEFAULT_PING_DELAY: Duration = Duration::from_secs(10);

/// Maximum number of startup availability attempts.
pub const DEFAULT_PING_ITERATIONS: u64 = 50_000;

/// Current Unix time in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Block until `transport` reports a positive block number.
///
/// Tries up to `max_attempts` times, sleeping `delay` between attempts.
/// Returns `None` once the attempts are exhausted; startup goes on and the
/// poll loop's own retries take over from there.
pub async fn wait_for_endpoint<T: Transport>(
    transport: &T,
    label: &str,
    max_attempts: u64,
    delay: Duration,
) -> Option<u64> {
    for attempt in 1..=max_attempts {
        match transport.block_number().await {
            Ok(block) if block > 0 => {
                info!(endpoint = label, block, "Endpoint is available");
                return Some(block);
            }
            Ok(_) => warn!(endpoint = label, attempt, "Endpoint reports block 0, retrying"),
            Err(e) => warn!(endpoint = label, attempt, error = %e, "Endpoint is not available"),
        }
        if attempt < max_attempts {
            tokio::time::sleep(delay).await;
        }
    }
    error!(endpoint = label, attempts = max_attempts, "Max attempts reached, endpoint is not available");
    None
}
