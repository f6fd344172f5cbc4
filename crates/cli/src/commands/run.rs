// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `av run` - Supervise the node and farmer until interrupted

use super::args::{FarmerArgs, NodeArgs, RpcArgs};
use crate::output::{print_notification, OutputFormat};
use anyhow::{Context, Result};
use av_core::Notification;
use av_engine::{
    default_farmer_executable, default_node_executable, ChainPoller, Dispatcher, ProcessBackend,
    ProcessTimeouts, StatusPoller, Supervisor,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Args)]
pub struct RunArgs {
    /// Node executable [default: ~/.archivas-core/binaries/archivas-node]
    #[arg(long, env = "AV_NODE_BIN")]
    node_bin: Option<PathBuf>,

    /// Farmer executable [default: ~/.archivas-core/binaries/archivas-farmer]
    #[arg(long, env = "AV_FARMER_BIN")]
    farmer_bin: Option<PathBuf>,

    /// Run the node only
    #[arg(long)]
    no_farmer: bool,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    node: NodeArgs,

    #[command(flatten)]
    farmer: FarmerArgs,

    #[command(flatten)]
    rpc: RpcArgs,
}

pub async fn handle(args: RunArgs) -> Result<()> {
    let shutdown = Arc::new(Notify::new());
    let s = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        eprintln!("\nShutting down...");
        s.notify_one();
    })?;

    let mut dispatcher = Dispatcher::new();
    let format = args.format;
    dispatcher.subscribe(move |n: &Notification| print_notification(n, format));

    let rpc = args.rpc.config();
    let backend = Arc::new(
        ProcessBackend::new(
            dispatcher.sender(),
            args.node_bin.unwrap_or_else(default_node_executable),
            args.farmer_bin.unwrap_or_else(default_farmer_executable),
        )
        .with_timeouts(ProcessTimeouts::from_env()),
    );

    let farmer = (!args.no_farmer).then_some(&args.farmer);
    tracing::info!(
        network = %args.node.network_id,
        farmer = farmer.is_some(),
        rpc = %rpc.primary_url,
        "starting workers"
    );
    if let Err(e) = start_workers(&backend, &args.node, farmer).await {
        stop_workers(&backend).await;
        dispatcher.dispatch_pending();
        return Err(e);
    }

    let client = Arc::new(args.rpc.client()?.with_events(dispatcher.sender()));
    let status = tokio::spawn(
        StatusPoller::new(Arc::clone(&backend), dispatcher.sender())
            .with_interval(rpc.poll_interval)
            .run(),
    );
    let chain = tokio::spawn(ChainPoller::new(client).with_interval(rpc.poll_interval).run());

    loop {
        tokio::select! {
            _ = shutdown.notified() => break,
            next = dispatcher.next() => {
                if next.is_none() {
                    break;
                }
            }
        }
    }

    status.abort();
    chain.abort();
    stop_workers(&backend).await;
    dispatcher.dispatch_pending();
    Ok(())
}

async fn start_workers(
    backend: &ProcessBackend,
    node: &NodeArgs,
    farmer: Option<&FarmerArgs>,
) -> Result<()> {
    backend
        .start_node(&node.config())
        .await
        .context("failed to start node")?;
    if let Some(farmer) = farmer {
        backend
            .start_farmer(&farmer.config())
            .await
            .context("failed to start farmer")?;
    }
    Ok(())
}

/// Farmer first, it depends on the node
async fn stop_workers(backend: &ProcessBackend) {
    backend.stop_farmer().await;
    backend.stop_node().await;
}
