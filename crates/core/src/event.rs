// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw events produced on worker and I/O contexts
//!
//! Producers only ever send into an [`EventSender`]. The single update
//! context owns the matching [`EventReceiver`] and turns each event into a
//! [`Notification`](crate::Notification) before any listener sees it.

use crate::error::{RpcError, WorkerError};
use crate::notification::StatusSnapshot;
use crate::records::{AccountSummary, BlockSummary, ChainTip, TransactionSummary};
use crate::worker::WorkerKind;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Sender half handed to supervisors, pollers, and the RPC client
pub type EventSender = mpsc::UnboundedSender<Event>;
/// Receiver half owned by the update context
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Create a connected sender/receiver pair
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    WorkerStarted { kind: WorkerKind },
    WorkerStopped { kind: WorkerKind },
    WorkerError { kind: WorkerKind, error: WorkerError },

    /// One line of worker output, not yet timestamped
    WorkerLog {
        kind: WorkerKind,
        level: String,
        message: String,
    },

    StatusUpdated(StatusSnapshot),

    ChainTipUpdated(ChainTip),
    BlocksUpdated(Vec<BlockSummary>),
    TransactionsUpdated(Vec<TransactionSummary>),
    AccountUpdated(AccountSummary),

    RpcConnected,
    RpcDisconnected,
    RpcError(RpcError),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::WorkerStarted { .. } => "worker:started",
            Event::WorkerStopped { .. } => "worker:stopped",
            Event::WorkerError { .. } => "worker:error",
            Event::WorkerLog { .. } => "worker:log",
            Event::StatusUpdated(_) => "status:updated",
            Event::ChainTipUpdated(_) => "chain:tip",
            Event::BlocksUpdated(_) => "chain:blocks",
            Event::TransactionsUpdated(_) => "chain:transactions",
            Event::AccountUpdated(_) => "chain:account",
            Event::RpcConnected => "rpc:connected",
            Event::RpcDisconnected => "rpc:disconnected",
            Event::RpcError(_) => "rpc:error",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
