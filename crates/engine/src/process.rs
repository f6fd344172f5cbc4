// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process supervision for one worker.
//!
//! The child's stdout and stderr share a single pipe, so output reaches the
//! reader in the order the child wrote it. A monitor task owns the child
//! and is the only place exit is observed, which keeps signal delivery and
//! reaping on the same task.

use crate::timeouts::ProcessTimeouts;
use av_core::{
    Event, EventSender, LineBuffer, NoiseFilter, StartError, Transition, WorkerError,
    WorkerHandle, WorkerKind, WorkerState,
};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe;
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Level assigned to every line of merged process output
pub const OUTPUT_LEVEL: &str = "INFO";

struct Inner {
    handle: WorkerHandle,
    stop_tx: Option<oneshot::Sender<()>>,
    exited: Option<watch::Receiver<bool>>,
}

struct Shared {
    kind: WorkerKind,
    inner: Mutex<Inner>,
    events: EventSender,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: Event) {
        let _ = self.events.send(event);
    }

    fn apply(&self, inner: &mut Inner, transition: Transition) {
        if let Err(e) = inner.handle.apply(transition) {
            tracing::error!(kind = %self.kind, error = %e, "rejected worker transition");
        }
    }

    fn report(&self, inner: &mut Inner, error: WorkerError) {
        inner.handle.record_error(error.clone());
        self.emit(Event::WorkerError {
            kind: self.kind,
            error,
        });
    }
}

/// Runs one worker as a child process
pub struct ProcessSupervisor {
    shared: Arc<Shared>,
    timeouts: ProcessTimeouts,
    filter: NoiseFilter,
}

impl ProcessSupervisor {
    pub fn new(kind: WorkerKind, events: EventSender) -> Self {
        Self {
            shared: Arc::new(Shared {
                kind,
                inner: Mutex::new(Inner {
                    handle: WorkerHandle::new(kind),
                    stop_tx: None,
                    exited: None,
                }),
                events,
            }),
            timeouts: ProcessTimeouts::default(),
            filter: NoiseFilter::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: ProcessTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_noise_filter(mut self, filter: NoiseFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn kind(&self) -> WorkerKind {
        self.shared.kind
    }

    pub fn state(&self) -> WorkerState {
        self.shared.lock().handle.state()
    }

    /// True only while a started process is live
    pub fn is_running(&self) -> bool {
        self.shared.lock().handle.is_running()
    }

    pub fn pid(&self) -> Option<u32> {
        self.shared.lock().handle.pid()
    }

    /// Output captured during the current (or last) run
    pub fn output(&self) -> String {
        self.shared.lock().handle.output().to_string()
    }

    pub fn last_error(&self) -> Option<WorkerError> {
        self.shared.lock().handle.last_error().cloned()
    }

    /// Spawn `executable` with `args`.
    ///
    /// Rejected unless the worker is `Stopped`. Returns once the process is
    /// running; failures are also reported as a worker error notification.
    pub async fn start(&self, executable: &Path, args: &[String]) -> Result<(), StartError> {
        let kind = self.shared.kind;
        {
            let mut inner = self.shared.lock();
            if inner.handle.state() != WorkerState::Stopped {
                return Err(StartError::AlreadyRunning(kind));
            }
            self.shared.apply(&mut inner, Transition::Start);
        }
        let guard = StartGuard::new(&self.shared);

        let (child, output) = match self.launch(executable, args).await {
            Ok(launched) => launched,
            Err(e) => {
                tracing::error!(%kind, executable = %executable.display(), error = %e, "start failed");
                guard.disarm();
                let mut inner = self.shared.lock();
                self.shared.apply(&mut inner, Transition::Abort);
                self.shared.report(&mut inner, WorkerError::from(&e));
                return Err(e);
            }
        };

        let pid = child.id();
        let (stop_tx, stop_rx) = oneshot::channel();
        let (exited_tx, exited_rx) = watch::channel(false);
        {
            let mut inner = self.shared.lock();
            inner.handle.set_pid(pid);
            self.shared.apply(&mut inner, Transition::Ack);
            inner.stop_tx = Some(stop_tx);
            inner.exited = Some(exited_rx);
            self.shared.emit(Event::WorkerStarted { kind });
        }
        guard.disarm();
        tracing::info!(%kind, pid = ?pid, executable = %executable.display(), "worker started");

        let reader = tokio::spawn(read_output(
            Arc::clone(&self.shared),
            output,
            LineBuffer::new(self.filter.clone()),
        ));
        tokio::spawn(monitor(
            Arc::clone(&self.shared),
            self.timeouts,
            child,
            stop_rx,
            reader,
            exited_tx,
        ));

        Ok(())
    }

    /// Terminate the worker and wait for it to exit.
    ///
    /// SIGTERM first; SIGKILL once the grace period lapses. A no-op when
    /// the worker is already stopped.
    pub async fn stop(&self) {
        let kind = self.shared.kind;
        let (stop_tx, exited) = {
            let mut inner = self.shared.lock();
            match inner.handle.state() {
                WorkerState::Stopped => return,
                WorkerState::Starting => {
                    tracing::warn!(%kind, "stop ignored while starting");
                    return;
                }
                WorkerState::Running => {
                    self.shared.apply(&mut inner, Transition::Stop);
                    (inner.stop_tx.take(), inner.exited.clone())
                }
                WorkerState::Stopping | WorkerState::Crashed => (None, inner.exited.clone()),
            }
        };

        if let Some(stop_tx) = stop_tx {
            tracing::info!(%kind, "stopping worker");
            let _ = stop_tx.send(());
        }
        if let Some(mut exited) = exited {
            let _ = exited.wait_for(|done| *done).await;
        }
    }

    async fn launch(
        &self,
        executable: &Path,
        args: &[String],
    ) -> Result<(Child, pipe::Receiver), StartError> {
        check_executable(executable)?;

        let (reader, writer) = io::pipe().map_err(|e| StartError::Spawn(e.to_string()))?;
        let stderr = writer
            .try_clone()
            .map_err(|e| StartError::Spawn(e.to_string()))?;
        let output = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))
            .map_err(|e| StartError::Spawn(e.to_string()))?;

        let mut command = Command::new(executable);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr)
            .kill_on_drop(true);

        // The command (and the parent's write ends) is dropped with the closure
        let mut spawn = tokio::task::spawn_blocking(move || command.spawn());
        let mut child = match timeout(self.timeouts.start, &mut spawn).await {
            Ok(Ok(Ok(child))) => child,
            Ok(Ok(Err(e))) => return Err(spawn_error(e, executable)),
            Ok(Err(e)) => return Err(StartError::Spawn(e.to_string())),
            Err(_) => {
                tokio::spawn(async move {
                    if let Ok(Ok(mut child)) = spawn.await {
                        let _ = child.kill().await;
                    }
                });
                return Err(StartError::TimedOut);
            }
        };

        if let Ok(Some(status)) = child.try_wait() {
            return Err(StartError::ExitedImmediately {
                exit_code: status.code(),
            });
        }

        Ok((child, output))
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if let Some(stop_tx) = inner.stop_tx.take() {
            if inner.handle.state() == WorkerState::Running {
                self.shared.apply(&mut inner, Transition::Stop);
            }
            let _ = stop_tx.send(());
        }
    }
}

/// Aborts a start whose future was dropped before the worker came up.
///
/// A child spawned by the abandoned launch is killed on drop.
struct StartGuard<'a> {
    shared: &'a Shared,
    armed: bool,
}

impl<'a> StartGuard<'a> {
    fn new(shared: &'a Shared) -> Self {
        Self {
            shared,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.shared.lock();
        if inner.handle.state() == WorkerState::Starting {
            tracing::warn!(kind = %self.shared.kind, "start abandoned");
            self.shared.apply(&mut inner, Transition::Abort);
            self.shared.report(
                &mut inner,
                WorkerError::FailedToStart("start abandoned".to_string()),
            );
        }
    }
}

fn check_executable(path: &Path) -> Result<(), StartError> {
    let metadata = std::fs::metadata(path).map_err(|e| spawn_error(e, path))?;
    if !metadata.is_file() || metadata.permissions().mode() & 0o111 == 0 {
        return Err(StartError::NotExecutable(path.to_path_buf()));
    }
    Ok(())
}

fn spawn_error(error: io::Error, path: &Path) -> StartError {
    let path = PathBuf::from(path);
    match error.kind() {
        io::ErrorKind::NotFound => StartError::NotFound(path),
        io::ErrorKind::PermissionDenied => StartError::PermissionDenied(path),
        _ => StartError::Spawn(error.to_string()),
    }
}

async fn read_output(shared: Arc<Shared>, mut output: pipe::Receiver, mut lines: LineBuffer) {
    let kind = shared.kind;
    let log = |message: String| Event::WorkerLog {
        kind,
        level: OUTPUT_LEVEL.to_string(),
        message,
    };

    let mut buf = vec![0u8; 8192];
    loop {
        match output.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = &buf[..n];
                shared
                    .lock()
                    .handle
                    .append_output(&String::from_utf8_lossy(chunk));
                for line in lines.push(chunk) {
                    shared.emit(log(line));
                }
            }
            Err(e) => {
                tracing::warn!(%kind, error = %e, "output read failed");
                let mut inner = shared.lock();
                shared.report(&mut inner, WorkerError::ReadError(e.to_string()));
                break;
            }
        }
    }

    if let Some(line) = lines.finish() {
        shared.emit(log(line));
    }
}

async fn monitor(
    shared: Arc<Shared>,
    timeouts: ProcessTimeouts,
    mut child: Child,
    stop_rx: oneshot::Receiver<()>,
    mut reader: JoinHandle<()>,
    exited: watch::Sender<bool>,
) {
    let kind = shared.kind;
    let (status, escalated) = tokio::select! {
        status = child.wait() => (status, false),
        _ = stop_rx => terminate(kind, &mut child, timeouts).await,
    };

    // Every line the child wrote goes out before `stopped`
    if timeout(timeouts.kill, &mut reader).await.is_err() {
        tracing::warn!(%kind, "output still open after exit, abandoning reader");
        reader.abort();
    }

    let mut inner = shared.lock();
    inner.stop_tx = None;
    let requested = inner.handle.state() == WorkerState::Stopping;

    match (requested, status) {
        (true, status) => {
            if let Err(e) = &status {
                tracing::error!(%kind, error = %e, "worker may still be alive");
            }
            if escalated {
                shared.report(&mut inner, WorkerError::StopTimedOut);
            }
            shared.apply(&mut inner, Transition::Exit);
            tracing::info!(%kind, "worker stopped");
        }
        (false, Ok(status)) if status.success() => {
            shared.apply(&mut inner, Transition::Exit);
            tracing::info!(%kind, "worker exited");
        }
        (false, Ok(status)) => {
            tracing::error!(%kind, exit_code = ?status.code(), "worker crashed");
            crash(&shared, &mut inner, WorkerError::Crashed {
                exit_code: status.code(),
            });
        }
        (false, Err(e)) => {
            tracing::error!(%kind, error = %e, "failed waiting on worker");
            crash(&shared, &mut inner, WorkerError::Unknown(e.to_string()));
        }
    }

    shared.emit(Event::WorkerStopped { kind });
    drop(inner);
    let _ = exited.send(true);
}

fn crash(shared: &Shared, inner: &mut Inner, error: WorkerError) {
    shared.apply(inner, Transition::Crash);
    shared.report(inner, error);
    shared.apply(inner, Transition::Exit);
}

/// SIGTERM, then SIGKILL after the grace period. The flag reports escalation.
async fn terminate(
    kind: WorkerKind,
    child: &mut Child,
    timeouts: ProcessTimeouts,
) -> (io::Result<ExitStatus>, bool) {
    if let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) {
        if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
            tracing::warn!(%kind, pid, error = %e, "SIGTERM failed");
        }
    }

    if let Ok(status) = timeout(timeouts.grace, child.wait()).await {
        return (status, false);
    }

    tracing::warn!(
        %kind,
        grace_ms = timeouts.grace.as_millis() as u64,
        "worker ignored SIGTERM, killing"
    );
    if let Err(e) = child.start_kill() {
        tracing::warn!(%kind, error = %e, "SIGKILL failed");
    }

    match timeout(timeouts.kill, child.wait()).await {
        Ok(status) => (status, true),
        Err(_) => (
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "process did not exit after SIGKILL",
            )),
            true,
        ),
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
