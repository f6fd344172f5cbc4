// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker and RPC startup parameters
//!
//! These are immutable once handed to a supervisor. The argument builders
//! produce the command lines the node and farmer executables expect.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_NETWORK_ID: &str = "archivas-devnet-v4";
pub const DEFAULT_RPC_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_BOOTNODE: &str = "seed.archivas.ai:9090";
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_FALLBACK_URL: &str = "https://seed.archivas.ai";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Base directory for worker data: `~/.archivas`
pub fn data_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".archivas")
}

/// Directory holding the worker executables: `~/.archivas-core/binaries`
pub fn binaries_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".archivas-core")
        .join("binaries")
}

/// Startup parameters for the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub network_id: String,
    pub rpc_bind: String,
    pub data_dir: PathBuf,
    pub bootnodes: Vec<String>,
    /// Only consumed by the in-process engine
    pub genesis_path: Option<PathBuf>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID.to_string(),
            rpc_bind: DEFAULT_RPC_BIND.to_string(),
            data_dir: data_root().join("data"),
            bootnodes: vec![DEFAULT_BOOTNODE.to_string()],
            genesis_path: None,
        }
    }
}

impl NodeConfig {
    /// Comma-joined bootnode list, empty when there are none
    pub fn bootnodes_joined(&self) -> String {
        self.bootnodes
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Command line for the node executable
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--network-id".to_string(),
            self.network_id.clone(),
            "--rpc".to_string(),
            self.rpc_bind.clone(),
            "--data-dir".to_string(),
            path_arg(&self.data_dir),
        ];
        let bootnodes = self.bootnodes_joined();
        if !bootnodes.is_empty() {
            args.push("--bootnodes".to_string());
            args.push(bootnodes);
        }
        args
    }
}

/// Startup parameters for the farmer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmerConfig {
    pub plots_path: PathBuf,
    pub farmer_key_path: PathBuf,
    pub node_url: String,
}

impl Default for FarmerConfig {
    fn default() -> Self {
        let root = data_root();
        Self {
            plots_path: root.join("plots"),
            farmer_key_path: root.join("farmer.key"),
            node_url: DEFAULT_NODE_URL.to_string(),
        }
    }
}

impl FarmerConfig {
    /// Command line for the farmer executable
    pub fn args(&self) -> Vec<String> {
        vec![
            "farm".to_string(),
            "--node".to_string(),
            self.node_url.clone(),
            "--plots".to_string(),
            path_arg(&self.plots_path),
            "--farmer-privkey".to_string(),
            path_arg(&self.farmer_key_path),
        ]
    }
}

/// Endpoints and timing for the RPC client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub primary_url: String,
    /// `None` disables failover
    pub fallback_url: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_NODE_URL.to_string(),
            fallback_url: Some(DEFAULT_FALLBACK_URL.to_string()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Trim whitespace and trailing slashes from a base URL
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
