// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker control surface shared by both backends

use crate::error::PlotError;
use async_trait::async_trait;
use av_core::{FarmerConfig, NodeConfig, StartError, StatusSnapshot};
use std::path::Path;

/// Start, stop, and query the node and farmer.
///
/// Lifecycle changes and failures are also delivered as notifications.
/// Status getters never fail; backends without a value report zero or an
/// empty string.
#[async_trait]
pub trait Supervisor: Send + Sync + 'static {
    async fn start_node(&self, config: &NodeConfig) -> Result<(), StartError>;

    /// No-op when the node is stopped
    async fn stop_node(&self);

    fn is_node_running(&self) -> bool;

    async fn start_farmer(&self, config: &FarmerConfig) -> Result<(), StartError>;

    /// No-op when the farmer is stopped
    async fn stop_farmer(&self);

    fn is_farmer_running(&self) -> bool;

    async fn create_plot(&self, path: &Path, size: u32, key_path: &Path) -> Result<(), PlotError>;

    fn height(&self) -> u64;

    fn tip_hash(&self) -> String;

    fn peer_count(&self) -> u32;

    fn plot_count(&self) -> u32;

    fn last_proof(&self) -> String;

    /// Reconcile tracked state with the backend before a status sample
    fn refresh(&self) {}

    /// Sample every getter into one snapshot
    fn snapshot(&self) -> StatusSnapshot {
        self.refresh();
        StatusSnapshot {
            node_running: self.is_node_running(),
            farmer_running: self.is_farmer_running(),
            height: self.height(),
            tip_hash: self.tip_hash(),
            peer_count: self.peer_count(),
            plot_count: self.plot_count(),
            last_proof: self.last_proof(),
        }
    }
}
