// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::bridge::{BridgeEngine, EngineCode, LogSink};
use av_core::{FarmerConfig, NodeConfig, WorkerKind};
use std::path::Path;

/// Wrapper that adds tracing to any BridgeEngine
#[derive(Clone)]
pub struct TracedEngine<E> {
    inner: E,
}

impl<E> TracedEngine<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: BridgeEngine> BridgeEngine for TracedEngine<E> {
    fn start_node(&self, config: &NodeConfig) -> Result<(), EngineCode> {
        let span = tracing::info_span!(
            "engine.start_node",
            network = %config.network_id,
            rpc = %config.rpc_bind,
        );
        let _guard = span.enter();

        tracing::info!(
            data_dir = %config.data_dir.display(),
            bootnodes = config.bootnodes.len(),
            "starting"
        );

        let start = std::time::Instant::now();
        let result = self.inner.start_node(config);
        log_start_result(&result, start.elapsed());
        result
    }

    fn stop_node(&self) {
        let span = tracing::info_span!("engine.stop_node");
        let _guard = span.enter();

        let start = std::time::Instant::now();
        self.inner.stop_node();
        tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "stopped");
    }

    fn node_running(&self) -> bool {
        let running = self.inner.node_running();
        tracing::trace!(running, "node checked");
        running
    }

    fn node_height(&self) -> u64 {
        self.inner.node_height()
    }

    fn tip_hash(&self) -> String {
        self.inner.tip_hash()
    }

    fn peer_count(&self) -> u32 {
        self.inner.peer_count()
    }

    fn start_farmer(&self, config: &FarmerConfig) -> Result<(), EngineCode> {
        let span = tracing::info_span!("engine.start_farmer", node = %config.node_url);
        let _guard = span.enter();

        tracing::info!(plots = %config.plots_path.display(), "starting");

        // Precondition: the key file must exist before the engine reads it
        if !config.farmer_key_path.exists() {
            tracing::warn!(
                key = %config.farmer_key_path.display(),
                "farmer key file does not exist"
            );
        }

        let start = std::time::Instant::now();
        let result = self.inner.start_farmer(config);
        log_start_result(&result, start.elapsed());
        result
    }

    fn stop_farmer(&self) {
        let span = tracing::info_span!("engine.stop_farmer");
        let _guard = span.enter();

        let start = std::time::Instant::now();
        self.inner.stop_farmer();
        tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "stopped");
    }

    fn farmer_running(&self) -> bool {
        let running = self.inner.farmer_running();
        tracing::trace!(running, "farmer checked");
        running
    }

    fn plot_count(&self) -> u32 {
        self.inner.plot_count()
    }

    fn last_proof(&self) -> String {
        self.inner.last_proof()
    }

    fn create_plot(&self, path: &Path, size: u32, key_path: &Path) -> Result<(), EngineCode> {
        let span = tracing::info_span!("engine.create_plot", path = %path.display(), size);
        let _guard = span.enter();

        tracing::info!("plotting");

        let start = std::time::Instant::now();
        let result = self.inner.create_plot(path, size, key_path);
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "plot created"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "plot failed"
            ),
        }

        result
    }

    fn set_log_sink(&self, kind: WorkerKind, sink: Option<LogSink>) {
        tracing::debug!(%kind, registered = sink.is_some(), "log sink updated");
        self.inner.set_log_sink(kind, sink);
    }
}

fn log_start_result(result: &Result<(), EngineCode>, elapsed: std::time::Duration) {
    match result {
        Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "started"),
        // Already running is a rejected call, not an engine fault
        Err(e) if *e == EngineCode::ALREADY_RUNNING => {
            tracing::warn!(error = %e, "already running")
        }
        Err(e) => tracing::error!(
            elapsed_ms = elapsed.as_millis() as u64,
            error = %e,
            "start failed"
        ),
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
