// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! av-core: data model for the Archivas worker supervisor
//!
//! This crate provides:
//! - Worker configuration and command-line builders
//! - The worker lifecycle state machine
//! - Output line assembly with noise filtering
//! - Chain records with lenient JSON decoding
//! - Raw events and the notifications listeners receive

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod notification;
pub mod output;
pub mod records;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{FarmerConfig, NodeConfig, RpcConfig};
pub use error::{RpcError, StartError, WorkerError};
pub use event::{Event, EventReceiver, EventSender};
pub use notification::{LogEvent, Notification, StatusSnapshot};
pub use output::{LineBuffer, NoiseFilter};
pub use records::{AccountSummary, BlockSummary, ChainTip, TransactionSummary};
pub use worker::{Transition, TransitionError, WorkerHandle, WorkerKind, WorkerState};
