// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Network Browser
//!
//! Snapshots sChain and node topology from the on-chain registry into a JSON
//! file, refreshing it periodically.
//!
//! # Usage
//!
//! ```bash
//! # Everything from the environment
//! MAINNET_RPC_URL=http://mainnet:8545 SCHAIN_RPC_URL=http://schain:10003 \
//! SCHAIN_NAME=alpha MANAGER_ABI_PATH=/data/manager.json \
//! SCHAIN_PROXY_PATH=/data/proxy.json \
//! IMA_NETWORK_BROWSER_DATA_PATH=/data/schains.json network-browser
//!
//! # One iteration, then exit
//! network-browser --once --connected-only false
//! ```

use clap::{ArgAction, Parser, ValueEnum};
use network_browser::config::{
    parse_flag, DEFAULT_BROWSER_DELAY_SECS, DEFAULT_BROWSER_TIMEOUT_SECS,
    DEFAULT_POST_ERROR_DELAY_SECS,
};
use network_browser::tools::{self, DEFAULT_PING_DELAY, DEFAULT_PING_ITERATIONS};
use network_browser::{
    Browser, BrowserConfig, ConnectivityChecker, HttpTransport, ManagerDescriptor, PollLoop,
    ProxyDescriptor, Registry, RegistryTransport, SnapshotStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogFormat {
    Full,
    Compact,
}

/// Network Browser - sChain topology snapshots from the on-chain registry
#[derive(Parser, Debug)]
#[command(name = "network-browser")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Primary network RPC endpoint
    #[arg(long, env = "MAINNET_RPC_URL")]
    mainnet_rpc_url: String,

    /// sChain RPC endpoint
    #[arg(long, env = "SCHAIN_RPC_URL")]
    schain_rpc_url: String,

    /// Name of the sChain this instance runs on
    #[arg(long, env = "SCHAIN_NAME")]
    schain_name: String,

    /// Registry address descriptor (JSON)
    #[arg(long, env = "MANAGER_ABI_PATH")]
    manager_abi_path: PathBuf,

    /// sChain message proxy descriptor (JSON)
    #[arg(long, env = "SCHAIN_PROXY_PATH")]
    schain_proxy_path: PathBuf,

    /// Output snapshot path
    #[arg(long, env = "IMA_NETWORK_BROWSER_DATA_PATH")]
    data_path: PathBuf,

    /// Batch registry calls through Multicall3 where the network supports it
    #[arg(long, env = "MULTICALL", default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    multicall: bool,

    /// Keep only sChains connected to this sChain
    #[arg(long, env = "CONNECTED_ONLY", default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    connected_only: bool,

    /// Seconds between successful iterations
    #[arg(long, env = "NETWORK_BROWSER_DELAY", default_value_t = DEFAULT_BROWSER_DELAY_SECS)]
    browser_delay: u64,

    /// Seconds to wait after a failed iteration
    #[arg(long, env = "POST_ERROR_DELAY", default_value_t = DEFAULT_POST_ERROR_DELAY_SECS)]
    post_error_delay: u64,

    /// Deadline for one iteration in seconds
    #[arg(long, env = "NETWORK_BROWSER_TIMEOUT", default_value_t = DEFAULT_BROWSER_TIMEOUT_SECS)]
    browser_timeout: u64,

    /// Log filter (trace, debug, info, warn, error, or a full directive)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Colored log output
    #[arg(long, env = "LOG_PRETTY", default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    log_pretty: bool,

    /// Log event layout
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "full")]
    log_format: LogFormat,

    /// Run a single iteration and exit
    #[arg(long)]
    once: bool,
}

impl Args {
    fn config(&self) -> BrowserConfig {
        BrowserConfig {
            mainnet_rpc_url: self.mainnet_rpc_url.clone(),
            schain_rpc_url: self.schain_rpc_url.clone(),
            schain_name: self.schain_name.clone(),
            manager_abi_path: self.manager_abi_path.clone(),
            schain_proxy_path: self.schain_proxy_path.clone(),
            data_path: self.data_path.clone(),
            multicall: self.multicall,
            connected_only: self.connected_only,
            browser_delay_secs: self.browser_delay,
            post_error_delay_secs: self.post_error_delay,
            browser_timeout_secs: self.browser_timeout,
        }
    }
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(args.log_pretty)
        .with_target(true);
    match args.log_format {
        LogFormat::Full => builder.init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(_) => {
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args);

    let config = args.config();
    config.validate()?;

    info!("+----------------------------------------------------+");
    info!(
        "|       Network Browser v{}                      |",
        env!("CARGO_PKG_VERSION")
    );
    info!("+----------------------------------------------------+");
    info!("|  sChain:    {:38} |", config.schain_name);
    info!("|  Output:    {:38} |", config.data_path.display().to_string());
    info!("|  Multicall: {:38} |", on_off(config.multicall));
    info!("|  Connected: {:38} |", on_off(config.connected_only));
    info!("|  Delay:     {:38} |", format!("{}s", config.browser_delay_secs));
    info!("|  Error:     {:38} |", format!("{}s", config.post_error_delay_secs));
    info!("|  Timeout:   {:38} |", format!("{}s", config.browser_timeout_secs));
    info!("+----------------------------------------------------+");

    let addresses = ManagerDescriptor::from_file(&config.manager_abi_path)?.addresses()?;
    let message_proxy = ProxyDescriptor::from_file(&config.schain_proxy_path)?.message_proxy()?;

    let schain = HttpTransport::new(config.schain_rpc_url.as_str())?;
    tools::wait_for_endpoint(
        &HttpTransport::new(config.mainnet_rpc_url.as_str())?,
        "mainnet",
        DEFAULT_PING_ITERATIONS,
        DEFAULT_PING_DELAY,
    )
    .await;
    tools::wait_for_endpoint(&schain, "schain", DEFAULT_PING_ITERATIONS, DEFAULT_PING_DELAY).await;

    let mainnet = Arc::new(RegistryTransport::connect(&config.mainnet_rpc_url, config.multicall).await?);
    let registry = Registry::new(mainnet, addresses);
    let connectivity = config
        .connected_only
        .then(|| ConnectivityChecker::new(Arc::new(schain), message_proxy));
    let browser = Browser::new(registry, connectivity);

    let poll = PollLoop::new(browser, SnapshotStore::new(&config.data_path), config.poll_config());

    if args.once {
        let schains = poll.run_once().await?;
        info!(schains, "Single iteration finished");
        return Ok(());
    }

    let shutdown = poll.shutdown_handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping network browser...");
        shutdown.notify_one();
    });

    poll.run().await;

    info!("Network browser stopped");
    Ok(())
}
