// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifications as delivered to listeners on the update context

use crate::error::{RpcError, WorkerError};
use crate::event::Event;
use crate::records::{AccountSummary, BlockSummary, ChainTip, TransactionSummary};
use crate::worker::WorkerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A worker log line, timestamped when the update context receives it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub kind: WorkerKind,
    pub level: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated worker status, recomputed wholesale on every poll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub node_running: bool,
    pub farmer_running: bool,
    pub height: u64,
    pub tip_hash: String,
    pub peer_count: u32,
    pub plot_count: u32,
    pub last_proof: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notification {
    Started(WorkerKind),
    Stopped(WorkerKind),
    Error { kind: WorkerKind, error: WorkerError },
    Log(LogEvent),
    Status(StatusSnapshot),
    ChainTip(ChainTip),
    Blocks(Vec<BlockSummary>),
    Transactions(Vec<TransactionSummary>),
    Account(AccountSummary),
    RpcConnected,
    RpcDisconnected,
    RpcError(RpcError),
}

impl Notification {
    /// Convert a raw event, assigning `now` to log lines
    pub fn stamp(event: Event, now: DateTime<Utc>) -> Self {
        match event {
            Event::WorkerStarted { kind } => Notification::Started(kind),
            Event::WorkerStopped { kind } => Notification::Stopped(kind),
            Event::WorkerError { kind, error } => Notification::Error { kind, error },
            Event::WorkerLog {
                kind,
                level,
                message,
            } => Notification::Log(LogEvent {
                kind,
                level,
                message,
                timestamp: now,
            }),
            Event::StatusUpdated(snapshot) => Notification::Status(snapshot),
            Event::ChainTipUpdated(tip) => Notification::ChainTip(tip),
            Event::BlocksUpdated(blocks) => Notification::Blocks(blocks),
            Event::TransactionsUpdated(txs) => Notification::Transactions(txs),
            Event::AccountUpdated(account) => Notification::Account(account),
            Event::RpcConnected => Notification::RpcConnected,
            Event::RpcDisconnected => Notification::RpcDisconnected,
            Event::RpcError(e) => Notification::RpcError(e),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::Started(kind) => write!(f, "{kind} started"),
            Notification::Stopped(kind) => write!(f, "{kind} stopped"),
            Notification::Error { kind, error } => write!(f, "{kind} error: {error}"),
            Notification::Log(log) => write!(
                f,
                "[{}] {} {}: {}",
                log.timestamp.format("%H:%M:%S"),
                log.kind,
                log.level,
                log.message
            ),
            Notification::Status(s) => write!(
                f,
                "status node={} farmer={} height={} peers={} plots={}",
                s.node_running, s.farmer_running, s.height, s.peer_count, s.plot_count
            ),
            Notification::ChainTip(tip) => write!(f, "tip height={} hash={}", tip.height, tip.hash),
            Notification::Blocks(blocks) => write!(f, "{} recent blocks", blocks.len()),
            Notification::Transactions(txs) => write!(f, "{} recent transactions", txs.len()),
            Notification::Account(a) => write!(f, "account {} balance={}", a.address, a.balance),
            Notification::RpcConnected => f.write_str("rpc connected"),
            Notification::RpcDisconnected => f.write_str("rpc disconnected"),
            Notification::RpcError(e) => write!(f, "rpc error: {e}"),
        }
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
