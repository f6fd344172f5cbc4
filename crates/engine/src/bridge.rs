// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervision of workers hosted by an in-process [`BridgeEngine`].
//!
//! Engine calls block, so start, stop and plot creation run on the blocking
//! pool. The engine's log callback is a per-worker closure that only
//! enqueues onto the event channel; nothing consumer-visible runs on the
//! engine's threads.
//!
//! The engine holds one sink per worker kind, so at most one
//! `BridgeSupervisor` may be attached to a given engine at a time.

use crate::error::PlotError;
use crate::supervisor::Supervisor;
use async_trait::async_trait;
use av_adapters::{BridgeEngine, EngineCode, LogSink};
use av_core::{
    Event, EventSender, FarmerConfig, NodeConfig, StartError, Transition, WorkerError,
    WorkerHandle, WorkerKind, WorkerState,
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

struct Shared<E> {
    engine: Arc<E>,
    node: Mutex<WorkerHandle>,
    farmer: Mutex<WorkerHandle>,
    events: EventSender,
}

impl<E: BridgeEngine> Shared<E> {
    fn handle(&self, kind: WorkerKind) -> MutexGuard<'_, WorkerHandle> {
        let slot = match kind {
            WorkerKind::Node => &self.node,
            WorkerKind::Farmer => &self.farmer,
        };
        slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: Event) {
        let _ = self.events.send(event);
    }

    fn apply(&self, handle: &mut WorkerHandle, transition: Transition) {
        if let Err(e) = handle.apply(transition) {
            tracing::error!(kind = %handle.kind(), error = %e, "rejected worker transition");
        }
    }

    fn report(&self, handle: &mut WorkerHandle, error: WorkerError) {
        handle.record_error(error.clone());
        self.emit(Event::WorkerError {
            kind: handle.kind(),
            error,
        });
    }

    fn engine_running(&self, kind: WorkerKind) -> bool {
        match kind {
            WorkerKind::Node => self.engine.node_running(),
            WorkerKind::Farmer => self.engine.farmer_running(),
        }
    }
}

/// Runs the node and farmer inside a [`BridgeEngine`]
pub struct BridgeSupervisor<E: BridgeEngine> {
    shared: Arc<Shared<E>>,
}

impl<E: BridgeEngine> BridgeSupervisor<E> {
    /// Attach to `engine` and register its log sinks.
    pub fn new(engine: E, events: EventSender) -> Self {
        let engine = Arc::new(engine);
        for kind in [WorkerKind::Node, WorkerKind::Farmer] {
            engine.set_log_sink(kind, Some(log_sink(kind, events.clone())));
        }
        Self {
            shared: Arc::new(Shared {
                engine,
                node: Mutex::new(WorkerHandle::new(WorkerKind::Node)),
                farmer: Mutex::new(WorkerHandle::new(WorkerKind::Farmer)),
                events,
            }),
        }
    }

    pub fn engine(&self) -> &E {
        &self.shared.engine
    }

    pub fn state(&self, kind: WorkerKind) -> WorkerState {
        self.shared.handle(kind).state()
    }

    pub fn last_error(&self, kind: WorkerKind) -> Option<WorkerError> {
        self.shared.handle(kind).last_error().cloned()
    }

    async fn start_worker<F>(&self, kind: WorkerKind, call: F) -> Result<(), StartError>
    where
        F: FnOnce(&E) -> Result<(), EngineCode> + Send + 'static,
    {
        {
            let mut handle = self.shared.handle(kind);
            if handle.state() != WorkerState::Stopped {
                return Err(StartError::AlreadyRunning(kind));
            }
            self.shared.apply(&mut handle, Transition::Start);
        }
        let guard = StartGuard {
            shared: Arc::clone(&self.shared),
            kind,
            armed: true,
        };

        // The start settles on the blocking task, even if this future is dropped
        let engine = Arc::clone(&self.shared.engine);
        tokio::task::spawn_blocking(move || {
            let result = match call(&engine) {
                Ok(()) => Ok(()),
                Err(EngineCode::ALREADY_RUNNING) => Err(StartError::AlreadyRunning(kind)),
                Err(EngineCode(code)) => Err(StartError::Engine(code)),
            };
            guard.settle(&result);
            result
        })
        .await
        .unwrap_or_else(|e| Err(StartError::Spawn(e.to_string())))
    }

    async fn stop_worker<F>(&self, kind: WorkerKind, call: F)
    where
        F: FnOnce(&E) + Send + 'static,
    {
        {
            let mut handle = self.shared.handle(kind);
            match handle.state() {
                WorkerState::Running => self.shared.apply(&mut handle, Transition::Stop),
                WorkerState::Starting => {
                    tracing::warn!(%kind, "stop ignored while starting");
                    return;
                }
                _ => return,
            }
        }

        tracing::info!(%kind, "stopping worker");
        let engine = Arc::clone(&self.shared.engine);
        if let Err(e) = tokio::task::spawn_blocking(move || call(&engine)).await {
            tracing::error!(%kind, error = %e, "engine stop call failed");
        }

        let mut handle = self.shared.handle(kind);
        self.shared.apply(&mut handle, Transition::Exit);
        tracing::info!(%kind, "worker stopped");
        self.shared.emit(Event::WorkerStopped { kind });
    }

    /// Treat a worker the engine no longer runs as crashed
    fn reconcile(&self, kind: WorkerKind) {
        let mut handle = self.shared.handle(kind);
        if handle.state() != WorkerState::Running || self.shared.engine_running(kind) {
            return;
        }
        tracing::error!(%kind, "worker stopped inside engine");
        self.shared.apply(&mut handle, Transition::Crash);
        self.shared
            .report(&mut handle, WorkerError::Crashed { exit_code: None });
        self.shared.apply(&mut handle, Transition::Exit);
        self.shared.emit(Event::WorkerStopped { kind });
    }
}

/// Applies the outcome of an engine start call.
///
/// Dropped unsettled (the engine call panicked, or never ran because the
/// runtime shut down), it aborts the start instead.
struct StartGuard<E: BridgeEngine> {
    shared: Arc<Shared<E>>,
    kind: WorkerKind,
    armed: bool,
}

impl<E: BridgeEngine> StartGuard<E> {
    fn settle(mut self, result: &Result<(), StartError>) {
        self.armed = false;
        let kind = self.kind;
        let mut handle = self.shared.handle(kind);
        match result {
            Ok(()) => {
                self.shared.apply(&mut handle, Transition::Ack);
                tracing::info!(%kind, "worker started");
                self.shared.emit(Event::WorkerStarted { kind });
            }
            Err(e) => {
                tracing::error!(%kind, error = %e, "start failed");
                self.shared.apply(&mut handle, Transition::Abort);
                self.shared.report(&mut handle, WorkerError::from(e));
            }
        }
    }
}

impl<E: BridgeEngine> Drop for StartGuard<E> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut handle = self.shared.handle(self.kind);
        if handle.state() == WorkerState::Starting {
            tracing::warn!(kind = %self.kind, "start abandoned");
            self.shared.apply(&mut handle, Transition::Abort);
            self.shared.report(
                &mut handle,
                WorkerError::FailedToStart("start abandoned".to_string()),
            );
        }
    }
}

impl<E: BridgeEngine> Drop for BridgeSupervisor<E> {
    /// Stops whatever this supervisor started, farmer first, then detaches
    fn drop(&mut self) {
        for kind in [WorkerKind::Farmer, WorkerKind::Node] {
            let mut handle = self.shared.handle(kind);
            if handle.state() == WorkerState::Stopped {
                continue;
            }
            tracing::info!(%kind, "stopping worker on detach");
            match kind {
                WorkerKind::Node => self.shared.engine.stop_node(),
                WorkerKind::Farmer => self.shared.engine.stop_farmer(),
            }
            if handle.state() == WorkerState::Running {
                self.shared.apply(&mut handle, Transition::Stop);
                self.shared.apply(&mut handle, Transition::Exit);
                self.shared.emit(Event::WorkerStopped { kind });
            }
        }
        for kind in [WorkerKind::Node, WorkerKind::Farmer] {
            self.shared.engine.set_log_sink(kind, None);
        }
    }
}

/// Sink that hands engine log lines to the event channel
fn log_sink(kind: WorkerKind, events: EventSender) -> LogSink {
    Arc::new(move |level: &str, message: &str| {
        let _ = events.send(Event::WorkerLog {
            kind,
            level: level.to_string(),
            message: message.to_string(),
        });
    })
}

#[async_trait]
impl<E: BridgeEngine> Supervisor for BridgeSupervisor<E> {
    async fn start_node(&self, config: &NodeConfig) -> Result<(), StartError> {
        let config = config.clone();
        self.start_worker(WorkerKind::Node, move |engine| engine.start_node(&config))
            .await
    }

    async fn stop_node(&self) {
        self.stop_worker(WorkerKind::Node, |engine| engine.stop_node())
            .await
    }

    fn is_node_running(&self) -> bool {
        self.reconcile(WorkerKind::Node);
        self.shared.handle(WorkerKind::Node).is_running()
    }

    async fn start_farmer(&self, config: &FarmerConfig) -> Result<(), StartError> {
        let config = config.clone();
        self.start_worker(WorkerKind::Farmer, move |engine| {
            engine.start_farmer(&config)
        })
        .await
    }

    async fn stop_farmer(&self) {
        self.stop_worker(WorkerKind::Farmer, |engine| engine.stop_farmer())
            .await
    }

    fn is_farmer_running(&self) -> bool {
        self.reconcile(WorkerKind::Farmer);
        self.shared.handle(WorkerKind::Farmer).is_running()
    }

    async fn create_plot(&self, path: &Path, size: u32, key_path: &Path) -> Result<(), PlotError> {
        let engine = Arc::clone(&self.shared.engine);
        let path = path.to_path_buf();
        let key_path = key_path.to_path_buf();
        tokio::task::spawn_blocking(move || engine.create_plot(&path, size, &key_path))
            .await
            .map_err(|e| PlotError::Task(e.to_string()))??;
        Ok(())
    }

    fn height(&self) -> u64 {
        self.shared.engine.node_height()
    }

    fn tip_hash(&self) -> String {
        self.shared.engine.tip_hash()
    }

    fn peer_count(&self) -> u32 {
        self.shared.engine.peer_count()
    }

    fn plot_count(&self) -> u32 {
        self.shared.engine.plot_count()
    }

    fn last_proof(&self) -> String {
        self.shared.engine.last_proof()
    }

    fn refresh(&self) {
        self.reconcile(WorkerKind::Node);
        self.reconcile(WorkerKind::Farmer);
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
