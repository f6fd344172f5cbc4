// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node and farmer as external executables

use crate::error::PlotError;
use crate::process::ProcessSupervisor;
use crate::supervisor::Supervisor;
use crate::timeouts::ProcessTimeouts;
use async_trait::async_trait;
use av_core::config::binaries_dir;
use av_core::{EventSender, FarmerConfig, NodeConfig, StartError, WorkerKind};
use std::path::{Path, PathBuf};

pub const NODE_EXECUTABLE: &str = "archivas-node";
pub const FARMER_EXECUTABLE: &str = "archivas-farmer";

/// Default node executable under the binaries directory
pub fn default_node_executable() -> PathBuf {
    binaries_dir().join(NODE_EXECUTABLE)
}

/// Default farmer executable under the binaries directory
pub fn default_farmer_executable() -> PathBuf {
    binaries_dir().join(FARMER_EXECUTABLE)
}

/// Runs each worker as a child process.
///
/// Chain counters live in the node's RPC, not in the process, so the
/// status getters report sentinels.
pub struct ProcessBackend {
    node: ProcessSupervisor,
    farmer: ProcessSupervisor,
    node_executable: PathBuf,
    farmer_executable: PathBuf,
}

impl ProcessBackend {
    pub fn new(events: EventSender, node_executable: PathBuf, farmer_executable: PathBuf) -> Self {
        Self {
            node: ProcessSupervisor::new(WorkerKind::Node, events.clone()),
            farmer: ProcessSupervisor::new(WorkerKind::Farmer, events),
            node_executable,
            farmer_executable,
        }
    }

    pub fn with_timeouts(mut self, timeouts: ProcessTimeouts) -> Self {
        self.node = self.node.with_timeouts(timeouts);
        self.farmer = self.farmer.with_timeouts(timeouts);
        self
    }

    pub fn node(&self) -> &ProcessSupervisor {
        &self.node
    }

    pub fn farmer(&self) -> &ProcessSupervisor {
        &self.farmer
    }
}

#[async_trait]
impl Supervisor for ProcessBackend {
    async fn start_node(&self, config: &NodeConfig) -> Result<(), StartError> {
        self.node.start(&self.node_executable, &config.args()).await
    }

    async fn stop_node(&self) {
        self.node.stop().await
    }

    fn is_node_running(&self) -> bool {
        self.node.is_running()
    }

    async fn start_farmer(&self, config: &FarmerConfig) -> Result<(), StartError> {
        self.farmer
            .start(&self.farmer_executable, &config.args())
            .await
    }

    async fn stop_farmer(&self) {
        self.farmer.stop().await
    }

    fn is_farmer_running(&self) -> bool {
        self.farmer.is_running()
    }

    async fn create_plot(
        &self,
        _path: &Path,
        _size: u32,
        _key_path: &Path,
    ) -> Result<(), PlotError> {
        Err(PlotError::Unsupported)
    }

    fn height(&self) -> u64 {
        0
    }

    fn tip_hash(&self) -> String {
        String::new()
    }

    fn peer_count(&self) -> u32 {
        0
    }

    fn plot_count(&self) -> u32 {
        0
    }

    fn last_proof(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
#[path = "process_backend_tests.rs"]
mod tests;
