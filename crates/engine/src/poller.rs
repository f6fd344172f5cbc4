// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer-driven sampling of supervisor status and chain data

use crate::supervisor::Supervisor;
use av_adapters::RpcClient;
use av_core::config::DEFAULT_POLL_INTERVAL;
use av_core::{Event, EventSender, StatusSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_BLOCK_LIMIT: u32 = 20;
pub const DEFAULT_TRANSACTION_LIMIT: u32 = 50;

/// Emits one aggregated status notification per tick.
///
/// Performs no I/O of its own. A worker still `Starting` reads as not
/// running.
pub struct StatusPoller<S: ?Sized> {
    supervisor: Arc<S>,
    events: EventSender,
    interval: Duration,
}

impl<S: Supervisor + ?Sized> StatusPoller<S> {
    pub fn new(supervisor: Arc<S>, events: EventSender) -> Self {
        Self {
            supervisor,
            events,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sample the supervisor once and emit the snapshot
    pub fn poll_once(&self) -> StatusSnapshot {
        let snapshot = self.supervisor.snapshot();
        tracing::trace!(
            node = snapshot.node_running,
            farmer = snapshot.farmer_running,
            height = snapshot.height,
            "status sampled"
        );
        let _ = self.events.send(Event::StatusUpdated(snapshot.clone()));
        snapshot
    }

    /// Poll every interval, starting one interval from now. Runs until the
    /// task is dropped.
    pub async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll_once();
        }
    }
}

/// Fixed-interval driver for chain-tip, block and transaction queries.
///
/// Results and failures reach the consumer through the client's own
/// notifications.
pub struct ChainPoller {
    client: Arc<RpcClient>,
    interval: Duration,
    block_limit: u32,
    transaction_limit: u32,
}

impl ChainPoller {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self {
            client,
            interval: DEFAULT_POLL_INTERVAL,
            block_limit: DEFAULT_BLOCK_LIMIT,
            transaction_limit: DEFAULT_TRANSACTION_LIMIT,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_limits(mut self, blocks: u32, transactions: u32) -> Self {
        self.block_limit = blocks;
        self.transaction_limit = transactions;
        self
    }

    /// Issue the three queries concurrently; returns how many failed
    pub async fn poll_once(&self) -> usize {
        let (tip, blocks, transactions) = tokio::join!(
            self.client.get_chain_tip(),
            self.client.get_recent_blocks(self.block_limit),
            self.client.get_recent_transactions(self.transaction_limit),
        );
        let failures = [tip.err(), blocks.err(), transactions.err()]
            .into_iter()
            .flatten()
            .inspect(|e| tracing::debug!(error = %e, "chain poll request failed"))
            .count();
        if failures > 0 {
            tracing::warn!(failures, active = self.client.active_url(), "chain poll incomplete");
        }
        failures
    }

    /// Poll immediately, then every interval. Runs until the task is dropped.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
