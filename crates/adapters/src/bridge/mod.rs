// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous call interface to an in-process worker engine
//!
//! Every call blocks the caller. Status reads are cheap and never fail,
//! returning zero or empty values when the engine has nothing to report.
//! Log output arrives through a [`LogSink`] that the engine may invoke from
//! any of its internal threads.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EngineCall, FakeEngine};

use av_core::{FarmerConfig, NodeConfig, WorkerKind};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Non-zero status returned by an engine call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("engine returned error code {0}")]
pub struct EngineCode(pub i32);

impl EngineCode {
    /// The worker was already running when start was called
    pub const ALREADY_RUNNING: EngineCode = EngineCode(1);

    /// Map a raw engine status to a result
    pub fn check(code: i32) -> Result<(), EngineCode> {
        if code == 0 {
            Ok(())
        } else {
            Err(EngineCode(code))
        }
    }
}

/// Receives `(level, message)` pairs from the engine.
///
/// May be called from any thread, concurrently with other engine calls.
/// Implementations must not block.
pub type LogSink = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// In-process engine running the node and farmer
pub trait BridgeEngine: Send + Sync + 'static {
    fn start_node(&self, config: &NodeConfig) -> Result<(), EngineCode>;

    /// Idempotent
    fn stop_node(&self);

    fn node_running(&self) -> bool;

    fn node_height(&self) -> u64;

    fn tip_hash(&self) -> String;

    fn peer_count(&self) -> u32;

    fn start_farmer(&self, config: &FarmerConfig) -> Result<(), EngineCode>;

    /// Idempotent
    fn stop_farmer(&self);

    fn farmer_running(&self) -> bool;

    fn plot_count(&self) -> u32;

    fn last_proof(&self) -> String;

    /// Build a plot file. Runs for minutes on realistic sizes.
    fn create_plot(&self, path: &Path, size: u32, key_path: &Path) -> Result<(), EngineCode>;

    /// Register (or with `None`, clear) the log sink for one worker.
    ///
    /// The sink is owned by the engine until replaced or cleared.
    fn set_log_sink(&self, kind: WorkerKind, sink: Option<LogSink>);
}
