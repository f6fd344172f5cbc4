// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use av_adapters::{EngineCall, FakeEngine, TracedEngine};
use av_core::event::{channel, EventReceiver};
use av_core::StatusSnapshot;
use std::path::PathBuf;
use std::time::Duration;

fn supervisor() -> (BridgeSupervisor<FakeEngine>, FakeEngine, EventReceiver) {
    let engine = FakeEngine::new();
    let (tx, rx) = channel();
    (BridgeSupervisor::new(engine.clone(), tx), engine, rx)
}

fn drain(rx: &mut EventReceiver) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn engine_starts(engine: &FakeEngine) -> usize {
    engine
        .calls()
        .iter()
        .filter(|c| matches!(c, EngineCall::StartNode(_) | EngineCall::StartFarmer(_)))
        .count()
}

#[test]
fn sinks_are_registered_on_attach_and_cleared_on_drop() {
    let (sup, engine, _rx) = supervisor();
    assert!(engine.has_log_sink(WorkerKind::Node));
    assert!(engine.has_log_sink(WorkerKind::Farmer));

    drop(sup);

    assert!(!engine.has_log_sink(WorkerKind::Node));
    assert!(!engine.has_log_sink(WorkerKind::Farmer));
    assert!(engine.calls().contains(&EngineCall::SetLogSink {
        kind: WorkerKind::Node,
        registered: false,
    }));
}

#[tokio::test]
async fn drop_stops_running_workers_farmer_first() {
    let (sup, engine, mut rx) = supervisor();
    sup.start_node(&NodeConfig::default()).await.unwrap();
    sup.start_farmer(&FarmerConfig::default()).await.unwrap();
    drain(&mut rx);

    drop(sup);

    assert!(!engine.node_running());
    assert!(!engine.farmer_running());
    let stops: Vec<EngineCall> = engine
        .calls()
        .into_iter()
        .filter(|c| matches!(c, EngineCall::StopNode | EngineCall::StopFarmer))
        .collect();
    assert_eq!(stops, vec![EngineCall::StopFarmer, EngineCall::StopNode]);
    assert_eq!(
        drain(&mut rx),
        vec![
            Event::WorkerStopped {
                kind: WorkerKind::Farmer
            },
            Event::WorkerStopped {
                kind: WorkerKind::Node
            },
        ]
    );
    assert!(!engine.has_log_sink(WorkerKind::Node));
}

#[test]
fn drop_leaves_stopped_workers_alone() {
    let (sup, engine, _rx) = supervisor();
    drop(sup);
    assert!(!engine.calls().contains(&EngineCall::StopNode));
    assert!(!engine.calls().contains(&EngineCall::StopFarmer));
}

#[tokio::test]
async fn start_forwards_config_and_emits_started() {
    let (sup, engine, mut rx) = supervisor();
    let config = NodeConfig {
        network_id: "archivas-testnet".into(),
        ..NodeConfig::default()
    };

    sup.start_node(&config).await.unwrap();

    assert!(sup.is_node_running());
    assert!(engine.calls().contains(&EngineCall::StartNode(config)));
    assert_eq!(
        drain(&mut rx),
        vec![Event::WorkerStarted {
            kind: WorkerKind::Node
        }]
    );
}

#[tokio::test]
async fn second_start_is_rejected_without_calling_engine() {
    let (sup, engine, mut rx) = supervisor();
    sup.start_farmer(&FarmerConfig::default()).await.unwrap();

    let err = sup
        .start_farmer(&FarmerConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err, StartError::AlreadyRunning(WorkerKind::Farmer));
    assert_eq!(engine_starts(&engine), 1);
    assert!(sup.is_farmer_running());
    assert_eq!(drain(&mut rx).len(), 1);
}

#[tokio::test]
async fn engine_failure_leaves_worker_stopped() {
    let (sup, engine, mut rx) = supervisor();
    engine.fail_node_start(7);

    let err = sup.start_node(&NodeConfig::default()).await.unwrap_err();

    assert_eq!(err, StartError::Engine(7));
    assert_eq!(sup.state(WorkerKind::Node), WorkerState::Stopped);
    assert!(!sup.is_node_running());
    let expected = WorkerError::FailedToStart(StartError::Engine(7).to_string());
    assert_eq!(sup.last_error(WorkerKind::Node), Some(expected.clone()));
    assert_eq!(
        drain(&mut rx),
        vec![Event::WorkerError {
            kind: WorkerKind::Node,
            error: expected,
        }]
    );
}

#[tokio::test]
async fn stop_when_stopped_is_silent() {
    let (sup, engine, mut rx) = supervisor();
    sup.stop_node().await;
    sup.stop_farmer().await;

    assert!(drain(&mut rx).is_empty());
    assert!(!engine.calls().contains(&EngineCall::StopNode));
}

#[tokio::test]
async fn stop_emits_stopped_once() {
    let (sup, engine, mut rx) = supervisor();
    sup.start_node(&NodeConfig::default()).await.unwrap();
    sup.stop_node().await;
    sup.stop_node().await;

    assert!(!sup.is_node_running());
    assert!(!engine.node_running());
    assert_eq!(
        drain(&mut rx),
        vec![
            Event::WorkerStarted {
                kind: WorkerKind::Node
            },
            Event::WorkerStopped {
                kind: WorkerKind::Node
            },
        ]
    );
}

#[tokio::test]
async fn refresh_turns_engine_side_exit_into_crash_then_stopped() {
    let (sup, engine, mut rx) = supervisor();
    sup.start_farmer(&FarmerConfig::default()).await.unwrap();
    drain(&mut rx);

    engine.crash(WorkerKind::Farmer);
    let snapshot = sup.snapshot();

    assert!(!snapshot.farmer_running);
    assert_eq!(
        drain(&mut rx),
        vec![
            Event::WorkerError {
                kind: WorkerKind::Farmer,
                error: WorkerError::Crashed { exit_code: None },
            },
            Event::WorkerStopped {
                kind: WorkerKind::Farmer
            },
        ]
    );

    // Already reconciled
    sup.refresh();
    assert!(drain(&mut rx).is_empty());
    assert_eq!(sup.state(WorkerKind::Farmer), WorkerState::Stopped);
}

#[tokio::test]
async fn snapshot_reads_engine_counters() {
    let (sup, engine, _rx) = supervisor();
    engine.set_height(42);
    engine.set_tip_hash("abc");
    engine.set_peer_count(3);
    engine.set_plot_count(2);
    engine.set_last_proof("proof");
    sup.start_node(&NodeConfig::default()).await.unwrap();

    let snapshot = sup.snapshot();

    assert_eq!(
        snapshot,
        StatusSnapshot {
            node_running: true,
            farmer_running: false,
            height: 42,
            tip_hash: "abc".into(),
            peer_count: 3,
            plot_count: 2,
            last_proof: "proof".into(),
        }
    );
}

#[tokio::test]
async fn logs_from_engine_threads_are_queued_in_order() {
    let (sup, engine, mut rx) = supervisor();
    let messages: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();

    engine
        .emit_logs_from_thread(WorkerKind::Node, messages.clone())
        .join()
        .unwrap();

    let received: Vec<String> = drain(&mut rx)
        .into_iter()
        .map(|event| match event {
            Event::WorkerLog { kind, level, message } => {
                assert_eq!(kind, WorkerKind::Node);
                assert_eq!(level, "INFO");
                message
            }
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(received, messages);
    drop(sup);
}

#[tokio::test]
async fn create_plot_runs_on_engine() {
    let (sup, engine, _rx) = supervisor();

    sup.create_plot(Path::new("/plots/a.plot"), 28, Path::new("/farmer.key"))
        .await
        .unwrap();

    assert_eq!(sup.plot_count(), 1);
    assert!(engine.calls().contains(&EngineCall::CreatePlot {
        path: PathBuf::from("/plots/a.plot"),
        size: 28,
        key_path: PathBuf::from("/farmer.key"),
    }));
}

#[tokio::test]
async fn create_plot_failure_carries_engine_code() {
    let (sup, engine, _rx) = supervisor();
    engine.fail_create_plot(9);

    let err = sup
        .create_plot(Path::new("/plots/a.plot"), 28, Path::new("/farmer.key"))
        .await
        .unwrap_err();

    assert_eq!(err, PlotError::Engine(EngineCode(9)));
}

#[tokio::test]
async fn traced_engine_is_transparent_to_supervision() {
    let engine = FakeEngine::new();
    let (tx, mut rx) = channel();
    let sup = BridgeSupervisor::new(TracedEngine::new(engine.clone()), tx);

    sup.start_node(&NodeConfig::default()).await.unwrap();
    engine.emit_log(WorkerKind::Node, "WARN", "peer dropped");
    sup.stop_node().await;

    assert_eq!(
        drain(&mut rx),
        vec![
            Event::WorkerStarted {
                kind: WorkerKind::Node
            },
            Event::WorkerLog {
                kind: WorkerKind::Node,
                level: "WARN".into(),
                message: "peer dropped".into(),
            },
            Event::WorkerStopped {
                kind: WorkerKind::Node
            },
        ]
    );
    drop(sup);
    assert!(!engine.has_log_sink(WorkerKind::Node));
}

#[tokio::test]
async fn running_flag_follows_engine_without_refresh() {
    let (sup, engine, mut rx) = supervisor();
    sup.start_node(&NodeConfig::default()).await.unwrap();
    drain(&mut rx);

    engine.crash(WorkerKind::Node);

    assert!(!sup.is_node_running());
    assert_eq!(sup.state(WorkerKind::Node), WorkerState::Stopped);
    assert_eq!(
        drain(&mut rx),
        vec![
            Event::WorkerError {
                kind: WorkerKind::Node,
                error: WorkerError::Crashed { exit_code: None },
            },
            Event::WorkerStopped {
                kind: WorkerKind::Node
            },
        ]
    );
}

#[tokio::test]
async fn dropped_start_still_settles() {
    let (sup, engine, _rx) = supervisor();

    let cfg = NodeConfig::default();
    let _ = tokio::select! {
        biased;
        _ = sup.start_node(&cfg) => false,
        _ = tokio::task::yield_now() => true,
    };

    let mut waited = 0;
    while sup.state(WorkerKind::Node) == WorkerState::Starting && waited < 200 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        waited += 1;
    }
    assert_eq!(sup.state(WorkerKind::Node), WorkerState::Running);
    assert!(engine.node_running());

    sup.stop_node().await;
    assert_eq!(sup.state(WorkerKind::Node), WorkerState::Stopped);
    sup.start_node(&NodeConfig::default()).await.unwrap();
    assert!(sup.is_node_running());
}
