// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake engine for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BridgeEngine, EngineCode, LogSink};
use av_core::{FarmerConfig, NodeConfig, WorkerKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Recorded engine call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    StartNode(NodeConfig),
    StopNode,
    StartFarmer(FarmerConfig),
    StopFarmer,
    CreatePlot {
        path: PathBuf,
        size: u32,
        key_path: PathBuf,
    },
    SetLogSink {
        kind: WorkerKind,
        registered: bool,
    },
}

#[derive(Default)]
struct FakeState {
    node_running: bool,
    farmer_running: bool,
    height: u64,
    tip_hash: String,
    peer_count: u32,
    plot_count: u32,
    last_proof: String,
    node_start_code: Option<i32>,
    farmer_start_code: Option<i32>,
    plot_code: Option<i32>,
    node_sink: Option<LogSink>,
    farmer_sink: Option<LogSink>,
}

/// Fake engine with settable counters and scripted failures
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_height(&self, height: u64) {
        self.with_state(|s| s.height = height);
    }

    pub fn set_tip_hash(&self, hash: &str) {
        self.with_state(|s| s.tip_hash = hash.to_string());
    }

    pub fn set_peer_count(&self, peers: u32) {
        self.with_state(|s| s.peer_count = peers);
    }

    pub fn set_plot_count(&self, plots: u32) {
        self.with_state(|s| s.plot_count = plots);
    }

    pub fn set_last_proof(&self, proof: &str) {
        self.with_state(|s| s.last_proof = proof.to_string());
    }

    /// Make the next `start_node` calls return `code` (0 succeeds)
    pub fn fail_node_start(&self, code: i32) {
        self.with_state(|s| s.node_start_code = Some(code));
    }

    /// Make the next `start_farmer` calls return `code` (0 succeeds)
    pub fn fail_farmer_start(&self, code: i32) {
        self.with_state(|s| s.farmer_start_code = Some(code));
    }

    pub fn fail_create_plot(&self, code: i32) {
        self.with_state(|s| s.plot_code = Some(code));
    }

    /// Simulate the worker dying inside the engine
    pub fn crash(&self, kind: WorkerKind) {
        self.with_state(|s| match kind {
            WorkerKind::Node => s.node_running = false,
            WorkerKind::Farmer => s.farmer_running = false,
        });
    }

    pub fn has_log_sink(&self, kind: WorkerKind) -> bool {
        self.with_state(|s| Self::sink_slot(s, kind).is_some())
    }

    /// Invoke the registered sink on the calling thread
    pub fn emit_log(&self, kind: WorkerKind, level: &str, message: &str) {
        // Clone out so the sink runs without the state lock held
        let sink = self.with_state(|s| Self::sink_slot(s, kind).clone());
        if let Some(sink) = sink {
            sink(level, message);
        }
    }

    /// Invoke the registered sink from a fresh OS thread, one call per message
    pub fn emit_logs_from_thread(&self, kind: WorkerKind, messages: Vec<String>) -> JoinHandle<()> {
        let engine = self.clone();
        std::thread::spawn(move || {
            for message in messages {
                engine.emit_log(kind, "INFO", &message);
            }
        })
    }

    fn sink_slot(state: &mut FakeState, kind: WorkerKind) -> &mut Option<LogSink> {
        match kind {
            WorkerKind::Node => &mut state.node_sink,
            WorkerKind::Farmer => &mut state.farmer_sink,
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    fn record(&self, call: EngineCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl BridgeEngine for FakeEngine {
    fn start_node(&self, config: &NodeConfig) -> Result<(), EngineCode> {
        self.record(EngineCall::StartNode(config.clone()));
        self.with_state(|s| {
            if s.node_running {
                return Err(EngineCode::ALREADY_RUNNING);
            }
            EngineCode::check(s.node_start_code.unwrap_or(0))?;
            s.node_running = true;
            Ok(())
        })
    }

    fn stop_node(&self) {
        self.record(EngineCall::StopNode);
        self.with_state(|s| s.node_running = false);
    }

    fn node_running(&self) -> bool {
        self.with_state(|s| s.node_running)
    }

    fn node_height(&self) -> u64 {
        self.with_state(|s| s.height)
    }

    fn tip_hash(&self) -> String {
        self.with_state(|s| s.tip_hash.clone())
    }

    fn peer_count(&self) -> u32 {
        self.with_state(|s| s.peer_count)
    }

    fn start_farmer(&self, config: &FarmerConfig) -> Result<(), EngineCode> {
        self.record(EngineCall::StartFarmer(config.clone()));
        self.with_state(|s| {
            if s.farmer_running {
                return Err(EngineCode::ALREADY_RUNNING);
            }
            EngineCode::check(s.farmer_start_code.unwrap_or(0))?;
            s.farmer_running = true;
            Ok(())
        })
    }

    fn stop_farmer(&self) {
        self.record(EngineCall::StopFarmer);
        self.with_state(|s| s.farmer_running = false);
    }

    fn farmer_running(&self) -> bool {
        self.with_state(|s| s.farmer_running)
    }

    fn plot_count(&self) -> u32 {
        self.with_state(|s| s.plot_count)
    }

    fn last_proof(&self) -> String {
        self.with_state(|s| s.last_proof.clone())
    }

    fn create_plot(&self, path: &Path, size: u32, key_path: &Path) -> Result<(), EngineCode> {
        self.record(EngineCall::CreatePlot {
            path: path.to_path_buf(),
            size,
            key_path: key_path.to_path_buf(),
        });
        self.with_state(|s| {
            EngineCode::check(s.plot_code.unwrap_or(0))?;
            s.plot_count += 1;
            Ok(())
        })
    }

    fn set_log_sink(&self, kind: WorkerKind, sink: Option<LogSink>) {
        self.record(EngineCall::SetLogSink {
            kind,
            registered: sink.is_some(),
        });
        self.with_state(|s| *Self::sink_slot(s, kind) = sink);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
