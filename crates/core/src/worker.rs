// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker state machine
//!
//! A worker is one of the two supervised backends (node or farmer). The
//! handle tracks lifecycle state, the output captured during the current
//! run, and the last error reported for it.

use crate::error::WorkerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on retained output per run (bytes)
pub const OUTPUT_RETAIN_BYTES: usize = 64 * 1024;

/// Which backend service a worker is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Node,
    Farmer,
}

impl WorkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Node => "node",
            WorkerKind::Farmer => "farmer",
        }
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Crashed,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerState::Stopped => "stopped",
            WorkerState::Starting => "starting",
            WorkerState::Running => "running",
            WorkerState::Stopping => "stopping",
            WorkerState::Crashed => "crashed",
        };
        f.write_str(s)
    }
}

/// Inputs that move a worker between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `start()` accepted
    Start,
    /// Backend acknowledged the start
    Ack,
    /// Start failed before the worker came up
    Abort,
    /// `stop()` accepted
    Stop,
    /// Worker exited (requested or clean)
    Exit,
    /// Worker died on its own
    Crash,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition {transition:?} from {from} for {kind}")]
pub struct TransitionError {
    pub kind: WorkerKind,
    pub from: WorkerState,
    pub transition: Transition,
}

/// State of one supervised worker
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    kind: WorkerKind,
    state: WorkerState,
    pid: Option<u32>,
    output: String,
    last_error: Option<WorkerError>,
}

impl WorkerHandle {
    pub fn new(kind: WorkerKind) -> Self {
        Self {
            kind,
            state: WorkerState::Stopped,
            pid: None,
            output: String::new(),
            last_error: None,
        }
    }

    pub fn kind(&self) -> WorkerKind {
        self.kind
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// True only once the backend acknowledged the start
    pub fn is_running(&self) -> bool {
        self.state == WorkerState::Running
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn set_pid(&mut self, pid: Option<u32>) {
        self.pid = pid;
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn last_error(&self) -> Option<&WorkerError> {
        self.last_error.as_ref()
    }

    pub fn record_error(&mut self, error: WorkerError) {
        self.last_error = Some(error);
    }

    /// Append raw output, keeping only the most recent bytes
    pub fn append_output(&mut self, chunk: &str) {
        self.output.push_str(chunk);
        if self.output.len() > OUTPUT_RETAIN_BYTES {
            let mut cut = self.output.len() - OUTPUT_RETAIN_BYTES;
            while !self.output.is_char_boundary(cut) {
                cut += 1;
            }
            self.output.drain(..cut);
        }
    }

    /// Apply a transition, returning the new state.
    ///
    /// A rejected transition leaves the handle untouched.
    pub fn apply(&mut self, transition: Transition) -> Result<WorkerState, TransitionError> {
        let next = match (self.state, transition) {
            (WorkerState::Stopped, Transition::Start) => WorkerState::Starting,
            (WorkerState::Starting, Transition::Ack) => WorkerState::Running,
            (WorkerState::Starting, Transition::Abort) => WorkerState::Stopped,
            (WorkerState::Running, Transition::Stop) => WorkerState::Stopping,
            (WorkerState::Running, Transition::Exit) => WorkerState::Stopped,
            (WorkerState::Stopping, Transition::Exit) => WorkerState::Stopped,
            (WorkerState::Running, Transition::Crash) => WorkerState::Crashed,
            (WorkerState::Crashed, Transition::Exit) => WorkerState::Stopped,
            (from, transition) => {
                return Err(TransitionError {
                    kind: self.kind,
                    from,
                    transition,
                })
            }
        };

        if transition == Transition::Start {
            self.output.clear();
            self.last_error = None;
        }
        if next == WorkerState::Stopped {
            self.pid = None;
        }
        self.state = next;
        Ok(next)
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
