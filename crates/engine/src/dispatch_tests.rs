// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::bridge::BridgeSupervisor;
use av_adapters::FakeEngine;
use av_core::{FakeClock, LogEvent, WorkerKind};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

/// Listener that records notifications and the thread it ran on
#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<(Notification, ThreadId)>>>,
}

impl Recorder {
    fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    fn threads(&self) -> Vec<ThreadId> {
        self.seen.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

impl Listener for Recorder {
    fn notify(&mut self, notification: &Notification) {
        self.seen
            .lock()
            .unwrap()
            .push((notification.clone(), std::thread::current().id()));
    }
}

#[test]
fn log_lines_are_stamped_at_dispatch() {
    let clock = FakeClock::new();
    let mut dispatcher = Dispatcher::with_clock(clock.clone());
    let recorder = Recorder::default();
    dispatcher.subscribe(recorder.clone());
    let tx = dispatcher.sender();

    tx.send(Event::WorkerLog {
        kind: WorkerKind::Node,
        level: "INFO".into(),
        message: "hello".into(),
    })
    .unwrap();
    clock.advance(chrono::Duration::seconds(30));
    let stamped_at = clock.now();

    assert_eq!(dispatcher.dispatch_pending(), 1);
    assert_eq!(
        recorder.notifications(),
        vec![Notification::Log(LogEvent {
            kind: WorkerKind::Node,
            level: "INFO".into(),
            message: "hello".into(),
            timestamp: stamped_at,
        })]
    );
}

#[test]
fn every_listener_sees_every_notification_once() {
    let mut dispatcher = Dispatcher::new();
    let first = Recorder::default();
    let second = Recorder::default();
    dispatcher.subscribe(first.clone());
    dispatcher.subscribe(second.clone());
    let tx = dispatcher.sender();

    tx.send(Event::RpcConnected).unwrap();
    tx.send(Event::WorkerStarted {
        kind: WorkerKind::Farmer,
    })
    .unwrap();
    dispatcher.dispatch_pending();
    assert_eq!(dispatcher.dispatch_pending(), 0);

    let expected = vec![
        Notification::RpcConnected,
        Notification::Started(WorkerKind::Farmer),
    ];
    assert_eq!(first.notifications(), expected);
    assert_eq!(second.notifications(), expected);
}

#[test]
fn closures_are_listeners() {
    let mut dispatcher = Dispatcher::new();
    let count = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&count);
    dispatcher.subscribe(move |_: &Notification| *counter.lock().unwrap() += 1);

    dispatcher.sender().send(Event::RpcDisconnected).unwrap();
    dispatcher.dispatch_pending();

    assert_eq!(*count.lock().unwrap(), 1);
}

#[tokio::test]
async fn engine_thread_logs_reach_listeners_only_on_dispatch() {
    let engine = FakeEngine::new();
    let mut dispatcher = Dispatcher::new();
    let recorder = Recorder::default();
    dispatcher.subscribe(recorder.clone());
    let _supervisor = BridgeSupervisor::new(engine.clone(), dispatcher.sender());

    let messages: Vec<String> = (0..10).map(|i| format!("plotting {i}")).collect();
    engine
        .emit_logs_from_thread(WorkerKind::Farmer, messages.clone())
        .join()
        .unwrap();

    assert!(recorder.notifications().is_empty());

    assert_eq!(dispatcher.dispatch_pending(), messages.len());
    let delivered: Vec<String> = recorder
        .notifications()
        .into_iter()
        .map(|n| match n {
            Notification::Log(log) => log.message,
            other => panic!("unexpected notification {other:?}"),
        })
        .collect();
    assert_eq!(delivered, messages);
    let here = std::thread::current().id();
    assert!(recorder.threads().iter().all(|t| *t == here));
}

#[tokio::test]
async fn close_drains_then_ends() {
    let mut dispatcher = Dispatcher::new();
    let tx = dispatcher.sender();
    tx.send(Event::RpcConnected).unwrap();
    dispatcher.close();

    assert!(tx.send(Event::RpcDisconnected).is_err());
    assert_eq!(dispatcher.next().await, Some(Notification::RpcConnected));
    assert_eq!(dispatcher.next().await, None);
}
