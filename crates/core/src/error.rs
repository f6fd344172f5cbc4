// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by supervisors, the RPC client, and consumers

use crate::worker::WorkerKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Why a worker could not be started
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("{0} is already running")]
    AlreadyRunning(WorkerKind),
    #[error("executable not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("file is not executable: {}", .0.display())]
    NotExecutable(PathBuf),
    #[error("timed out waiting for process to start")]
    TimedOut,
    #[error("process exited immediately (exit code: {exit_code:?})")]
    ExitedImmediately { exit_code: Option<i32> },
    #[error("failed to spawn: {0}")]
    Spawn(String),
    #[error("engine returned error code {0}")]
    Engine(i32),
}

/// Failures surfaced to the consumer as notifications
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum WorkerError {
    #[error("failed to start: {0}")]
    FailedToStart(String),
    #[error("process crashed (exit code: {exit_code:?})")]
    Crashed { exit_code: Option<i32> },
    #[error("process timed out")]
    TimedOut,
    #[error("process did not exit within the grace period and was killed")]
    StopTimedOut,
    #[error("write error: {0}")]
    WriteError(String),
    #[error("read error: {0}")]
    ReadError(String),
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<&StartError> for WorkerError {
    fn from(err: &StartError) -> Self {
        match err {
            StartError::TimedOut => WorkerError::TimedOut,
            other => WorkerError::FailedToStart(other.to_string()),
        }
    }
}

/// Failures of a single RPC request
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request failed with status {status}: {body}")]
    Application { status: u16, body: String },
    #[error("failed to parse JSON response: {0}")]
    Decode(String),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl RpcError {
    /// Transport and protocol failures trigger failover; decode failures do not
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Transport(_) | RpcError::Application { .. })
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
