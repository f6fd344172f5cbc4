// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flags shared between commands, each with an `AV_*` environment fallback

use anyhow::Result;
use av_adapters::RpcClient;
use av_core::config::{
    data_root, DEFAULT_FALLBACK_URL, DEFAULT_NETWORK_ID, DEFAULT_NODE_URL, DEFAULT_RPC_BIND,
};
use av_core::{FarmerConfig, NodeConfig, RpcConfig};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct RpcArgs {
    /// Primary RPC endpoint
    #[arg(long, env = "AV_RPC_URL", default_value = DEFAULT_NODE_URL)]
    pub rpc_url: String,

    /// Fallback RPC endpoint (empty disables failover)
    #[arg(long, env = "AV_FALLBACK_URL", default_value = DEFAULT_FALLBACK_URL)]
    pub fallback_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "AV_REQUEST_TIMEOUT_MS", default_value = "10000")]
    pub request_timeout_ms: u64,

    /// Interval between status and chain polls in milliseconds
    #[arg(long, env = "AV_POLL_INTERVAL_MS", default_value = "5000")]
    pub poll_interval_ms: u64,
}

impl RpcArgs {
    pub fn config(&self) -> RpcConfig {
        let fallback = self.fallback_url.trim();
        RpcConfig {
            primary_url: self.rpc_url.clone(),
            fallback_url: (!fallback.is_empty()).then(|| fallback.to_string()),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn client(&self) -> Result<RpcClient> {
        Ok(RpcClient::new(&self.config())?)
    }
}

#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    #[arg(long, env = "AV_NETWORK_ID", default_value = DEFAULT_NETWORK_ID)]
    pub network_id: String,

    /// Address the node's RPC server binds to
    #[arg(long, env = "AV_RPC_BIND", default_value = DEFAULT_RPC_BIND)]
    pub rpc_bind: String,

    /// Node data directory [default: ~/.archivas/data]
    #[arg(long, env = "AV_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Comma-separated bootnodes [default: seed.archivas.ai:9090]
    #[arg(long = "bootnodes", env = "AV_BOOTNODES", value_delimiter = ',')]
    pub bootnodes: Option<Vec<String>>,

    #[arg(long, env = "AV_GENESIS")]
    pub genesis: Option<PathBuf>,
}

impl NodeArgs {
    pub fn config(&self) -> NodeConfig {
        let defaults = NodeConfig::default();
        NodeConfig {
            network_id: self.network_id.clone(),
            rpc_bind: self.rpc_bind.clone(),
            data_dir: self.data_dir.clone().unwrap_or(defaults.data_dir),
            bootnodes: self.bootnodes.clone().unwrap_or(defaults.bootnodes),
            genesis_path: self.genesis.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FarmerArgs {
    /// Plot directory [default: ~/.archivas/plots]
    #[arg(long, env = "AV_PLOTS")]
    pub plots: Option<PathBuf>,

    /// Farmer private key file [default: ~/.archivas/farmer.key]
    #[arg(long, env = "AV_FARMER_KEY")]
    pub farmer_key: Option<PathBuf>,

    /// Node the farmer connects to
    #[arg(long, env = "AV_NODE_URL", default_value = DEFAULT_NODE_URL)]
    pub node_url: String,
}

impl FarmerArgs {
    pub fn config(&self) -> FarmerConfig {
        let root = data_root();
        FarmerConfig {
            plots_path: self.plots.clone().unwrap_or_else(|| root.join("plots")),
            farmer_key_path: self
                .farmer_key
                .clone()
                .unwrap_or_else(|| root.join("farmer.key")),
            node_url: self.node_url.clone(),
        }
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
